use anyhow::Result;
use bioscraper::cleanup::{clean_envs, load_package_list};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Delete binaries in every conda environment whose name contains a listed package.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// The `envs` directory of a conda installation.
    envs_dir: PathBuf,
    #[arg(short, long, default_value = "bioconda_only_packages.txt")]
    packages: PathBuf,
    /// Only report what would be removed.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    let packages = load_package_list(&args.packages)?;
    info!(count = packages.len(), "loaded package list");

    let report = clean_envs(&args.envs_dir, &packages, args.dry_run)?;
    for (path, err) in &report.failed {
        warn!(path = %path.display(), error = %err, "not removed");
    }
    info!(
        environments = report.environments,
        removed = report.removed.len(),
        failed = report.failed.len(),
        dry_run = args.dry_run,
        "cleanup completed"
    );
    Ok(())
}
