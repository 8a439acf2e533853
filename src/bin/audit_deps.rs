use anyhow::Result;
use bioscraper::audit::{self, Registry};
use clap::Parser;
use std::{path::PathBuf, time::Duration};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// List the dependencies of a directory of conda environment files that are
/// published on Bioconda.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Directory holding `*.yaml` / `*.yml` environment files.
    #[arg(default_value = "env")]
    env_dir: PathBuf,
    #[arg(short, long, default_value = "bioconda_only_packages.txt")]
    output: PathBuf,
    /// Also look up the latest published version of each hosted package.
    #[arg(long)]
    check_latest: bool,
    /// Write a per-package TSV report here.
    #[arg(long)]
    report: Option<PathBuf>,
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();

    let deps = audit::collect_dependencies(&args.env_dir)?;
    info!(count = deps.len(), dir = %args.env_dir.display(), "unique dependencies");

    let registry = Registry::new(Duration::from_secs(args.timeout_secs))?;
    let entries = audit::audit(&registry, &deps, args.check_latest).await;

    let hosted = audit::write_hosted_list(&args.output, &entries)?;
    info!(hosted, output = %args.output.display(), "wrote Bioconda packages");

    if let Some(report) = &args.report {
        audit::write_report(report, &entries)?;
        info!(report = %report.display(), "wrote version report");
    }

    Ok(())
}
