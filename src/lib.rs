pub mod audit;
pub mod cleanup;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod pipeline;
pub mod sink;

#[cfg(test)]
pub(crate) mod test_server;

pub use config::{CutoffPolicy, FilterConfig, ScrapeConfig};
pub use extract::{extract, Listing, NoTableFound, PackageRow};
pub use fetch::{FetchError, PageFetcher, PageSource, RetryPolicy};
pub use filter::{process, KeywordFilter, PageOutcome};
pub use pipeline::{Pipeline, RunSummary, StopReason};
pub use sink::TsvSink;
