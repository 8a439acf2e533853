// src/audit/manifest.rs

use anyhow::{Context, Result};
use glob::glob;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// `[channel::]name[ op version[=build]]`, e.g. `bioconda::samtools=1.17=h00cdaf9_0`.
static MATCH_SPEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[^:\s]+::)?([A-Za-z0-9_][A-Za-z0-9_.+\-]*)\s*(?:(==|=|>=|<=|!=|~=|>|<)\s*([^=,|\s]+))?")
        .expect("match spec regex should compile")
});

/// A package named in an environment file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    /// Exact pin (`=`/`==`) if there is one.
    pub version: Option<String>,
}

impl Dependency {
    pub fn unpinned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Environment {
    #[serde(default)]
    dependencies: Option<Vec<Value>>,
}

/// Parse one conda match spec string.
pub fn parse_spec(spec: &str) -> Option<Dependency> {
    let caps = MATCH_SPEC.captures(spec)?;
    let name = caps.get(1)?.as_str().to_string();
    let version = match (caps.get(2), caps.get(3)) {
        (Some(op), Some(v)) if op.as_str() == "=" || op.as_str() == "==" => {
            Some(v.as_str().to_string())
        }
        _ => None,
    };
    Some(Dependency { name, version })
}

/// Dependencies of one environment file, in file order. Mapping entries such
/// as `pip: [...]` contribute their keys.
pub fn parse_manifest(text: &str) -> Result<Vec<Dependency>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let env: Environment = serde_yaml::from_str(text).context("parsing environment YAML")?;
    let mut deps = Vec::new();

    for entry in env.dependencies.unwrap_or_default() {
        match entry {
            Value::String(spec) => match parse_spec(&spec) {
                Some(dep) => deps.push(dep),
                None => warn!(spec = %spec, "unrecognised dependency"),
            },
            Value::Mapping(map) => {
                for key in map.keys() {
                    if let Some(name) = key.as_str() {
                        deps.push(Dependency::unpinned(name));
                    }
                }
            }
            other => warn!(?other, "ignoring non-string dependency"),
        }
    }

    Ok(deps)
}

/// Environment files (`*.yaml`, `*.yml`) directly under `dir`, sorted.
pub fn manifest_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for ext in ["yaml", "yml"] {
        let pattern = format!("{}/*.{}", dir.display(), ext);
        for entry in glob(&pattern).with_context(|| format!("bad glob {}", pattern))? {
            paths.push(entry?);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Unique dependencies across every manifest in `dir`, keyed by name. The
/// first pinned version seen for a name is kept.
pub fn collect_dependencies(dir: &Path) -> Result<BTreeMap<String, Option<String>>> {
    let mut unique: BTreeMap<String, Option<String>> = BTreeMap::new();

    for path in manifest_paths(dir)? {
        info!(file = %path.display(), "processing manifest");
        let text =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let deps = parse_manifest(&text).with_context(|| format!("in {}", path.display()))?;
        debug!(file = %path.display(), count = deps.len(), "dependencies");

        for dep in deps {
            let slot = unique.entry(dep.name).or_insert(None);
            if slot.is_none() {
                *slot = dep.version;
            }
        }
    }

    Ok(unique)
}
