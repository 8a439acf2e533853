use anyhow::Result;
use bioscraper::{
    config::{CutoffPolicy, ScrapeConfig},
    fetch::{PageFetcher, RetryPolicy},
    pipeline::Pipeline,
    sink::TsvSink,
};
use clap::Parser;
use std::{path::PathBuf, process::ExitCode, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Page through the Bioconda listing and keep packages matching the keyword filters.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// YAML config file; built-in defaults are used for anything it leaves out.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output TSV (recreated on every run).
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long, value_enum)]
    cutoff_policy: Option<CutoffPolicy>,
    #[arg(long)]
    page_delay_secs: Option<u64>,
    #[arg(long)]
    max_pages: Option<u32>,
}

impl Args {
    fn into_config(self) -> Result<ScrapeConfig> {
        let mut cfg = ScrapeConfig::load(self.config.as_deref())?;
        if let Some(output) = self.output {
            cfg.output = output;
        }
        if let Some(base_url) = self.base_url {
            cfg.base_url = base_url;
        }
        if let Some(policy) = self.cutoff_policy {
            cfg.cutoff_policy = policy;
        }
        if let Some(delay) = self.page_delay_secs {
            cfg.page_delay_secs = delay;
        }
        if self.max_pages.is_some() {
            cfg.max_pages = self.max_pages;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    // ─── 2) configuration ────────────────────────────────────────────
    let cfg = Args::parse().into_config()?;
    info!(
        base_url = %cfg.base_url,
        output = %cfg.output.display(),
        policy = ?cfg.cutoff_policy,
        inclusion = cfg.filter.inclusion_terms.len(),
        exclusion = cfg.filter.exclusion_terms.len(),
        "startup"
    );

    // ─── 3) fetcher + output ─────────────────────────────────────────
    let fetcher = PageFetcher::new(
        &cfg.base_url,
        cfg.timeout(),
        RetryPolicy::new(cfg.max_retries, cfg.backoff_factor),
    )?;
    let mut sink = TsvSink::create(&cfg.output)?;

    // ─── 4) run ──────────────────────────────────────────────────────
    let start = Instant::now();
    let summary = Pipeline::new(fetcher, &cfg).run(&mut sink).await?;
    info!(
        pages = summary.pages_fetched,
        examined = summary.rows_examined,
        accepted = summary.rows_accepted,
        written = sink.records(),
        elapsed = ?start.elapsed(),
        "wrote {}",
        cfg.output.display()
    );

    Ok(if summary.reason.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
