// src/audit/registry.rs

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const RECIPES_BASE: &str = "https://bioconda.github.io/recipes/";
pub const PACKAGE_API_BASE: &str = "https://api.anaconda.org/package/bioconda/";

#[derive(Debug, Deserialize)]
struct PackageInfo {
    latest_version: Option<String>,
}

/// Lookups against the Bioconda recipe index and the anaconda.org package API.
#[derive(Debug, Clone)]
pub struct Registry {
    client: Client,
    recipes_base: Url,
    api_base: Url,
}

impl Registry {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bioscraper/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Self::with_bases(client, RECIPES_BASE, PACKAGE_API_BASE)
    }

    /// Both bases must end in `/` so package names join under them.
    pub fn with_bases(client: Client, recipes_base: &str, api_base: &str) -> Result<Self> {
        Ok(Self {
            client,
            recipes_base: Url::parse(recipes_base)
                .with_context(|| format!("parsing {}", recipes_base))?,
            api_base: Url::parse(api_base).with_context(|| format!("parsing {}", api_base))?,
        })
    }

    pub fn recipe_url(&self, name: &str) -> Result<Url> {
        Ok(self.recipes_base.join(&format!("{name}/README.html"))?)
    }

    /// A package is hosted when its recipe page answers 200. Transport errors
    /// count as not hosted.
    pub async fn is_hosted(&self, name: &str) -> bool {
        let url = match self.recipe_url(name) {
            Ok(u) => u,
            Err(e) => {
                warn!(package = name, error = %e, "cannot build recipe URL");
                return false;
            }
        };
        debug!(%url, "checking recipe");
        match self.client.get(url).send().await {
            Ok(resp) => resp.status() == StatusCode::OK,
            Err(e) => {
                warn!(package = name, error = %e, "recipe lookup failed");
                false
            }
        }
    }

    /// Latest published version, `None` when the API does not know the package.
    pub async fn latest_version(&self, name: &str) -> Result<Option<String>> {
        let url = self.api_base.join(name)?;
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let info: PackageInfo = resp
            .error_for_status()
            .with_context(|| format!("non-success status from {}", url))?
            .json()
            .await
            .with_context(|| format!("decoding package info from {}", url))?;
        Ok(info.latest_version)
    }
}
