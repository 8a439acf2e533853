// src/config/mod.rs

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

pub mod defaults;

/// Largest accepted `backoff_factor`, in seconds.
pub const MAX_BACKOFF_FACTOR: f64 = 60.0;

/// What to do with a row whose update label matches a cutoff label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CutoffPolicy {
    /// Stop the whole run at the first stale row.
    #[default]
    StopAll,
    /// Abandon the rest of the current page, carry on with the next one.
    StopPage,
    /// Drop the stale row only.
    Skip,
    /// Cutoff labels have no effect.
    Ignore,
}

/// Keyword sets applied to each listing row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub inclusion_terms: BTreeSet<String>,
    #[serde(default)]
    pub exclusion_terms: BTreeSet<String>,
    #[serde(default)]
    pub cutoff_labels: BTreeSet<String>,
}

impl FilterConfig {
    pub fn new<I, E, C, S>(inclusion: I, exclusion: E, cutoff: C) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inclusion_terms: inclusion.into_iter().map(Into::into).collect(),
            exclusion_terms: exclusion.into_iter().map(Into::into).collect(),
            cutoff_labels: cutoff.into_iter().map(Into::into).collect(),
        }
    }

    /// The historical Bioconda keyword lists.
    pub fn bioconda() -> Self {
        Self::new(
            defaults::INCLUSION_TERMS.iter().copied(),
            defaults::EXCLUSION_TERMS.iter().copied(),
            defaults::CUTOFF_LABELS.iter().copied(),
        )
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::bioconda()
    }
}

/// Process-wide settings for one scraping run. Every field has a default, so a
/// YAML file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub output: PathBuf,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_factor: f64,
    pub page_delay_secs: u64,
    pub max_pages: Option<u32>,
    pub cutoff_policy: CutoffPolicy,
    pub filter: FilterConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BASE_URL.to_string(),
            output: PathBuf::from(defaults::OUTPUT_FILE),
            timeout_secs: defaults::TIMEOUT_SECS,
            max_retries: defaults::MAX_RETRIES,
            backoff_factor: defaults::BACKOFF_FACTOR,
            page_delay_secs: defaults::PAGE_DELAY_SECS,
            max_pages: None,
            cutoff_policy: CutoffPolicy::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl ScrapeConfig {
    /// Read a YAML config file. Missing keys fall back to the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Defaults, or the given file when there is one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url).with_context(|| format!("invalid base_url {}", self.base_url))?;
        if self.filter.inclusion_terms.is_empty() {
            bail!("filter.inclusion_terms is empty; no row could ever be accepted");
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be positive");
        }
        if !self.backoff_factor.is_finite()
            || !(0.0..=MAX_BACKOFF_FACTOR).contains(&self.backoff_factor)
        {
            bail!("backoff_factor must be between 0 and {MAX_BACKOFF_FACTOR}");
        }
        if self.max_pages == Some(0) {
            bail!("max_pages must be at least 1 when set");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_secs(self.page_delay_secs)
    }
}
