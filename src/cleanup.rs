// src/cleanup.rs
//! Remove executables shadowing packages from a package list, across every
//! environment of a conda install.

use anyhow::{Context, Result};
use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};

#[derive(Debug, Default)]
pub struct CleanupReport {
    pub environments: usize,
    /// Removed, or would be removed on a dry run.
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// One package name per line; blank lines are dropped.
pub fn load_package_list(path: &Path) -> Result<BTreeSet<String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(parse_package_list(&text))
}

pub fn parse_package_list(text: &str) -> BTreeSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// First package whose name occurs in `binary`.
pub fn matching_package<'a>(binary: &str, packages: &'a BTreeSet<String>) -> Option<&'a str> {
    packages
        .iter()
        .find(|p| !p.is_empty() && binary.contains(p.as_str()))
        .map(String::as_str)
}

/// Entries of `dir`, sorted. Entries that cannot be read are logged and skipped.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        match entry {
            Ok(entry) => paths.push(entry.path()),
            Err(e) => warn!(dir = %dir.display(), error = %e, "unreadable directory entry"),
        }
    }
    paths.sort();
    Ok(paths)
}

/// Walk `envs_dir/<env>/bin` and delete matching entries. Only an unlistable
/// `envs_dir` is an error; per-environment failures land in the report.
pub fn clean_envs(
    envs_dir: &Path,
    packages: &BTreeSet<String>,
    dry_run: bool,
) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    for env in sorted_entries(envs_dir)? {
        if !env.is_dir() {
            continue;
        }
        report.environments += 1;
        info!(env = %env.display(), "processing environment");

        let bin_dir = env.join("bin");
        if bin_dir.is_dir() {
            sweep_bin_dir(&bin_dir, packages, dry_run, &mut report);
        }
    }

    Ok(report)
}

fn sweep_bin_dir(
    bin_dir: &Path,
    packages: &BTreeSet<String>,
    dry_run: bool,
    report: &mut CleanupReport,
) {
    let binaries = match sorted_entries(bin_dir) {
        Ok(binaries) => binaries,
        Err(e) => {
            error!(dir = %bin_dir.display(), error = %e, "cannot list bin directory");
            report.failed.push((bin_dir.to_path_buf(), format!("{e:#}")));
            return;
        }
    };

    for binary in binaries {
        let Some(file_name) = binary.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(package) = matching_package(file_name, packages) else {
            continue;
        };

        if dry_run {
            info!(path = %binary.display(), package, "would remove");
            report.removed.push(binary);
            continue;
        }

        info!(path = %binary.display(), package, "removing");
        match fs::remove_file(&binary) {
            Ok(()) => report.removed.push(binary),
            Err(e) => {
                error!(path = %binary.display(), error = %e, "remove failed");
                report.failed.push((binary, e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"#!/bin/sh\n").unwrap();
    }

    #[test]
    fn package_list_ignores_blank_lines() {
        let pkgs = parse_package_list("samtools\n\n  \nbwa  \n");
        assert_eq!(pkgs.len(), 2);
        assert!(pkgs.contains("bwa"));
        assert_eq!(matching_package("anything", &pkgs), None);
    }

    #[test]
    fn matches_by_substring() {
        let pkgs = parse_package_list("samtools\nbwa\n");
        assert_eq!(matching_package("samtools.pl", &pkgs), Some("samtools"));
        assert_eq!(matching_package("bwa-mem2", &pkgs), Some("bwa"));
        assert_eq!(matching_package("python3", &pkgs), None);
    }

    #[test]
    fn removes_only_matching_binaries() {
        let envs = tempdir().unwrap();
        touch(&envs.path().join("qc/bin/samtools"));
        touch(&envs.path().join("qc/bin/python3"));
        touch(&envs.path().join("align/bin/bwa"));
        fs::create_dir_all(envs.path().join("empty")).unwrap();
        fs::write(envs.path().join("stray.txt"), "").unwrap();

        let pkgs = parse_package_list("samtools\nbwa\n");
        let report = clean_envs(envs.path(), &pkgs, false).unwrap();

        assert_eq!(report.environments, 3);
        assert_eq!(report.removed.len(), 2);
        assert!(report.failed.is_empty());
        assert!(!envs.path().join("qc/bin/samtools").exists());
        assert!(!envs.path().join("align/bin/bwa").exists());
        assert!(envs.path().join("qc/bin/python3").exists());
    }

    #[test]
    fn dry_run_deletes_nothing() {
        let envs = tempdir().unwrap();
        touch(&envs.path().join("qc/bin/samtools"));

        let pkgs = parse_package_list("samtools\n");
        let report = clean_envs(envs.path(), &pkgs, true).unwrap();

        assert_eq!(report.removed, vec![envs.path().join("qc/bin/samtools")]);
        assert!(envs.path().join("qc/bin/samtools").exists());
    }

    #[test]
    fn directories_are_reported_as_failures() {
        let envs = tempdir().unwrap();
        fs::create_dir_all(envs.path().join("qc/bin/samtools-plugins")).unwrap();

        let pkgs = parse_package_list("samtools\n");
        let report = clean_envs(envs.path(), &pkgs, false).unwrap();

        assert!(report.removed.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(envs.path().join("qc/bin/samtools-plugins").exists());
    }

    #[test]
    fn unlistable_bin_dir_is_reported_and_sweep_continues() {
        let envs = tempdir().unwrap();
        let missing = envs.path().join("gone/bin");
        let pkgs = parse_package_list("samtools
");

        let mut report = CleanupReport::default();
        sweep_bin_dir(&missing, &pkgs, false, &mut report);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, missing);
        assert!(report.removed.is_empty());

        touch(&envs.path().join("qc/bin/samtools"));
        sweep_bin_dir(&envs.path().join("qc/bin"), &pkgs, false, &mut report);
        assert_eq!(report.removed, vec![envs.path().join("qc/bin/samtools")]);
        assert_eq!(report.failed.len(), 1);
    }
}
