// src/audit/mod.rs
//! Which dependencies of a set of conda environments come from Bioconda, and
//! whether their pins are current.

use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fmt,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::{info, warn};

pub mod manifest;
pub mod registry;

pub use manifest::{collect_dependencies, parse_manifest, parse_spec, Dependency};
pub use registry::Registry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionStatus {
    UpToDate,
    Outdated { latest: String },
    /// No pin to compare against.
    Unpinned { latest: String },
    Unknown,
}

impl VersionStatus {
    pub fn compare(pinned: Option<&str>, latest: Option<&str>) -> Self {
        match (pinned, latest) {
            (_, None) => VersionStatus::Unknown,
            (None, Some(latest)) => VersionStatus::Unpinned {
                latest: latest.to_string(),
            },
            (Some(p), Some(l)) if p == l => VersionStatus::UpToDate,
            (Some(_), Some(latest)) => VersionStatus::Outdated {
                latest: latest.to_string(),
            },
        }
    }

    pub fn latest(&self) -> Option<&str> {
        match self {
            VersionStatus::Outdated { latest } | VersionStatus::Unpinned { latest } => {
                Some(latest.as_str())
            }
            VersionStatus::UpToDate | VersionStatus::Unknown => None,
        }
    }
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VersionStatus::UpToDate => "up-to-date",
            VersionStatus::Outdated { .. } => "outdated",
            VersionStatus::Unpinned { .. } => "unpinned",
            VersionStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub name: String,
    pub pinned: Option<String>,
    pub hosted: bool,
    /// Only filled in for hosted packages when latest checking is on.
    pub status: Option<VersionStatus>,
}

/// Check every dependency against the registry, one request at a time.
pub async fn audit(
    registry: &Registry,
    deps: &BTreeMap<String, Option<String>>,
    check_latest: bool,
) -> Vec<AuditEntry> {
    let mut entries = Vec::with_capacity(deps.len());

    for (name, pinned) in deps {
        let hosted = registry.is_hosted(name).await;
        info!(package = %name, hosted, "checked");

        let status = if hosted && check_latest {
            let latest = match registry.latest_version(name).await {
                Ok(v) => v,
                Err(e) => {
                    warn!(package = %name, error = %e, "latest version lookup failed");
                    None
                }
            };
            Some(VersionStatus::compare(pinned.as_deref(), latest.as_deref()))
        } else {
            None
        };

        entries.push(AuditEntry {
            name: name.clone(),
            pinned: pinned.clone(),
            hosted,
            status,
        });
    }

    entries
}

/// One hosted package name per line.
pub fn write_hosted_list(path: &Path, entries: &[AuditEntry]) -> Result<usize> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    let mut n = 0;
    for e in entries.iter().filter(|e| e.hosted) {
        writeln!(w, "{}", e.name)?;
        n += 1;
    }
    w.flush()?;
    Ok(n)
}

pub const REPORT_HEADER: &str = "Package\tPinned\tLatest\tStatus";

pub fn write_report(path: &Path, entries: &[AuditEntry]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    writeln!(w, "{REPORT_HEADER}")?;
    for e in entries.iter().filter(|e| e.hosted) {
        let latest = e.status.as_ref().and_then(|s| s.latest()).unwrap_or("-");
        let status = e
            .status
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unchecked".to_string());
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            e.name,
            e.pinned.as_deref().unwrap_or("-"),
            latest,
            status
        )?;
    }
    w.flush()?;
    Ok(())
}
