// src/pipeline.rs

use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::{fmt, io::Write, time::Duration};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::{
    config::{CutoffPolicy, ScrapeConfig},
    extract::{extract, NoTableFound},
    fetch::{FetchError, PageSource},
    filter::{process, CutoffStop, KeywordFilter},
    sink::TsvSink,
};

/// Terminal state of a scraping run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The very first page had no listing table.
    NoListing,
    /// Ran past the last listing page.
    Exhausted { last_page: u32 },
    /// A listing table without any valid rows.
    EmptyPage { page: u32 },
    /// A stale row under the stop-all cutoff policy.
    Cutoff { page: u32, label: String },
    PageLimit { pages: u32 },
    Http { page: u32, status: StatusCode },
    Network { page: u32, message: String },
    /// Every attempt at the same page timed out.
    Timeout { page: u32 },
}

impl StopReason {
    /// True when the run ended before the listing was worked through.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            StopReason::Http { .. } | StopReason::Network { .. } | StopReason::Timeout { .. }
        )
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::NoListing => write!(f, "no listing table on the first page"),
            StopReason::Exhausted { last_page } => {
                write!(f, "listing exhausted after page {last_page}")
            }
            StopReason::EmptyPage { page } => write!(f, "page {page} had no package rows"),
            StopReason::Cutoff { page, label } => {
                write!(f, "cutoff label {label:?} reached on page {page}")
            }
            StopReason::PageLimit { pages } => write!(f, "page limit of {pages} reached"),
            StopReason::Http { page, status } => write!(f, "page {page}: HTTP {status}"),
            StopReason::Network { page, message } => {
                write!(f, "page {page}: network error: {message}")
            }
            StopReason::Timeout { page } => write!(f, "page {page}: timed out repeatedly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub rows_examined: u64,
    pub rows_accepted: u64,
    pub reason: StopReason,
}

/// Page-by-page driver: fetch, extract, filter, write, wait, repeat.
pub struct Pipeline<S> {
    source: S,
    filter: KeywordFilter,
    cutoff_policy: CutoffPolicy,
    page_delay: Duration,
    max_pages: Option<u32>,
    timeout_retries: u32,
}

impl<S: PageSource> Pipeline<S> {
    pub fn new(source: S, config: &ScrapeConfig) -> Self {
        Self {
            source,
            filter: KeywordFilter::new(&config.filter),
            cutoff_policy: config.cutoff_policy,
            page_delay: config.page_delay(),
            max_pages: config.max_pages,
            timeout_retries: config.max_retries,
        }
    }

    /// Drive the listing from page 1 until a stop condition. Remote failures
    /// end the run with a [`StopReason`]; only local write errors are `Err`.
    #[instrument(level = "info", skip_all, fields(policy = ?self.cutoff_policy))]
    pub async fn run<W: Write>(&self, sink: &mut TsvSink<W>) -> Result<RunSummary> {
        let mut page: u32 = 1;
        let mut pages_fetched: u32 = 0;
        let mut listing_pages: u32 = 0;
        let mut timeouts: u32 = 0;
        let mut rows_examined: u64 = 0;
        let mut rows_accepted: u64 = 0;

        let reason = loop {
            info!(page, "searching page");
            let markup = match self.source.fetch_page(page).await {
                Ok(markup) => {
                    timeouts = 0;
                    markup
                }
                Err(FetchError::Timeout { page }) if timeouts < self.timeout_retries => {
                    timeouts += 1;
                    warn!(page, attempt = timeouts, "page timed out, trying again");
                    continue;
                }
                Err(e) => {
                    error!(page = e.page(), error = %e, "fetch failed");
                    break match e {
                        FetchError::Timeout { page } => StopReason::Timeout { page },
                        FetchError::Http { page, status } => StopReason::Http { page, status },
                        FetchError::Network { page, message } => {
                            StopReason::Network { page, message }
                        }
                    };
                }
            };
            pages_fetched += 1;

            let outcome = match extract(&markup) {
                Err(NoTableFound) if listing_pages == 0 => {
                    info!(page, "package table not found");
                    break StopReason::NoListing;
                }
                Err(NoTableFound) => {
                    info!(page, "no more listing pages");
                    break StopReason::Exhausted {
                        last_page: page - 1,
                    };
                }
                Ok(listing) => {
                    listing_pages += 1;
                    process(listing.rows(), &self.filter, self.cutoff_policy, sink)
                        .with_context(|| format!("writing rows from page {page}"))?
                }
            };

            rows_examined += outcome.examined as u64;
            rows_accepted += outcome.accepted as u64;
            info!(
                page,
                examined = outcome.examined,
                accepted = outcome.accepted,
                "page done"
            );

            if let Some(CutoffStop::Run { label }) = outcome.stop {
                break StopReason::Cutoff { page, label };
            }
            if outcome.examined == 0 {
                break StopReason::EmptyPage { page };
            }
            if self.max_pages.is_some_and(|max| pages_fetched >= max) {
                break StopReason::PageLimit {
                    pages: pages_fetched,
                };
            }

            page += 1;
            if !self.page_delay.is_zero() {
                sleep(self.page_delay).await;
            }
        };

        if reason.is_failure() {
            error!(%reason, "run aborted");
        } else {
            info!(%reason, "run finished");
        }

        Ok(RunSummary {
            pages_fetched,
            rows_examined,
            rows_accepted,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use std::{cell::RefCell, collections::VecDeque};

    /// Serves scripted results in order; anything past the script is "no table".
    struct ScriptedSource {
        script: RefCell<VecDeque<Result<String, FetchError>>>,
        requested: RefCell<Vec<u32>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<String, FetchError>>) -> Self {
            Self {
                script: RefCell::new(script.into()),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageSource for ScriptedSource {
        async fn fetch_page(&self, page: u32) -> Result<String, FetchError> {
            self.requested.borrow_mut().push(page);
            self.script
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok("<html><body>end</body></html>".to_string()))
        }
    }

    fn table(rows: &[(&str, &str, &str)]) -> String {
        let mut html = String::from(
            "<table><tr><th>Package</th><th>Access</th><th>Summary</th><th>Updated</th></tr>",
        );
        for (name, desc, updated) in rows {
            html.push_str(&format!(
                "<tr><td><a href=\"#\">{name}</a></td><td>public</td><td>{desc}</td><td>{updated}</td></tr>"
            ));
        }
        html.push_str("</table>");
        html
    }

    fn config(policy: CutoffPolicy) -> ScrapeConfig {
        ScrapeConfig {
            page_delay_secs: 0,
            max_retries: 2,
            cutoff_policy: policy,
            filter: FilterConfig::new(["genom"], ["RNA-seq"], ["2018"]),
            ..ScrapeConfig::default()
        }
    }

    async fn run(
        source: ScriptedSource,
        policy: CutoffPolicy,
    ) -> (RunSummary, Vec<String>, Vec<u32>) {
        let cfg = config(policy);
        let pipeline = Pipeline::new(source, &cfg);
        let mut sink = TsvSink::new(Vec::new()).unwrap();
        let summary = pipeline.run(&mut sink).await.unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines = text.lines().map(str::to_string).collect();
        let requested = pipeline.source.requested.borrow().clone();
        (summary, lines, requested)
    }

    #[tokio::test]
    async fn two_pages_then_no_table() {
        let source = ScriptedSource::new(vec![Ok(table(&[
            ("toolA", "genomic assembler", "2023-01-01"),
            ("toolB", "genomic RNA-seq quantifier", "2023-01-02"),
            ("toolC", "metagenome binning", "2022-12-31"),
        ]))]);

        let (summary, lines, requested) = run(source, CutoffPolicy::StopAll).await;

        assert_eq!(summary.reason, StopReason::Exhausted { last_page: 1 });
        assert_eq!(summary.pages_fetched, 2);
        assert_eq!(summary.rows_examined, 3);
        assert_eq!(summary.rows_accepted, 2);
        assert_eq!(requested, vec![1, 2]);
        assert_eq!(
            lines,
            vec![
                "Package_Name\tDescription\tUpdated_Date",
                "toolA\tgenomic assembler\t2023-01-01",
                "toolC\tmetagenome binning\t2022-12-31",
            ]
        );
    }

    #[tokio::test]
    async fn first_page_without_table_is_no_listing() {
        let (summary, lines, _) = run(ScriptedSource::new(vec![]), CutoffPolicy::StopAll).await;
        assert_eq!(summary.reason, StopReason::NoListing);
        assert_eq!(lines.len(), 1);
        assert!(!summary.reason.is_failure());
    }

    #[tokio::test]
    async fn stop_all_ignores_later_pages() {
        let source = ScriptedSource::new(vec![
            Ok(table(&[
                ("new", "genome tool", "2020-01-01"),
                ("old", "genome tool", "2018-01-01"),
                ("after", "genome tool", "2021-01-01"),
            ])),
            Ok(table(&[("page2", "genome tool", "2022-01-01")])),
        ]);

        let (summary, lines, requested) = run(source, CutoffPolicy::StopAll).await;

        assert_eq!(
            summary.reason,
            StopReason::Cutoff {
                page: 1,
                label: "2018".into()
            }
        );
        assert_eq!(requested, vec![1]);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("new\t"));
    }

    #[tokio::test]
    async fn stop_page_moves_to_next_page() {
        let source = ScriptedSource::new(vec![
            Ok(table(&[
                ("old", "genome tool", "2018-01-01"),
                ("skipped", "genome tool", "2021-01-01"),
            ])),
            Ok(table(&[("page2", "genome tool", "2022-01-01")])),
        ]);

        let (summary, lines, _) = run(source, CutoffPolicy::StopPage).await;

        assert_eq!(summary.reason, StopReason::Exhausted { last_page: 2 });
        assert_eq!(lines[1..], ["page2\tgenome tool\t2022-01-01".to_string()]);
    }

    #[tokio::test]
    async fn skip_policy_keeps_evaluating() {
        let source = ScriptedSource::new(vec![Ok(table(&[
            ("old", "genome tool", "2018-01-01"),
            ("newer", "genome tool", "2021-01-01"),
        ]))]);

        let (summary, lines, _) = run(source, CutoffPolicy::Skip).await;

        assert_eq!(summary.rows_accepted, 1);
        assert_eq!(lines[1], "newer\tgenome tool\t2021-01-01");
    }

    #[tokio::test]
    async fn malformed_row_does_not_disturb_neighbours() {
        let markup = "<table><tr><th>h</th></tr>\
            <tr><td><a>a</a></td><td></td><td>genome a</td><td>2023</td></tr>\
            <tr><td><a>broken</a></td><td>genome</td></tr>\
            <tr><td><a>b</a></td><td></td><td>genome b</td><td>2023</td></tr>\
            </table>";
        let source = ScriptedSource::new(vec![Ok(markup.to_string())]);

        let (summary, lines, _) = run(source, CutoffPolicy::StopAll).await;

        assert_eq!(summary.rows_examined, 2);
        assert_eq!(lines[1..], ["a\tgenome a\t2023", "b\tgenome b\t2023"]);
    }

    #[tokio::test]
    async fn table_without_rows_stops() {
        let source = ScriptedSource::new(vec![Ok(table(&[]))]);
        let (summary, _, _) = run(source, CutoffPolicy::StopAll).await;
        assert_eq!(summary.reason, StopReason::EmptyPage { page: 1 });
    }

    #[tokio::test]
    async fn http_error_aborts_and_keeps_written_rows() {
        let source = ScriptedSource::new(vec![
            Ok(table(&[("keep", "genome tool", "2023")])),
            Err(FetchError::Http {
                page: 2,
                status: StatusCode::FORBIDDEN,
            }),
        ]);

        let (summary, lines, _) = run(source, CutoffPolicy::StopAll).await;

        assert_eq!(
            summary.reason,
            StopReason::Http {
                page: 2,
                status: StatusCode::FORBIDDEN
            }
        );
        assert!(summary.reason.is_failure());
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn timeouts_retry_the_same_page() {
        let source = ScriptedSource::new(vec![
            Err(FetchError::Timeout { page: 1 }),
            Err(FetchError::Timeout { page: 1 }),
            Ok(table(&[("slow", "genome tool", "2023")])),
        ]);

        let (summary, lines, requested) = run(source, CutoffPolicy::StopAll).await;

        assert_eq!(requested, vec![1, 1, 1, 2]);
        assert_eq!(summary.reason, StopReason::Exhausted { last_page: 1 });
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn timeouts_give_up_after_ceiling() {
        let source = ScriptedSource::new(vec![
            Err(FetchError::Timeout { page: 1 }),
            Err(FetchError::Timeout { page: 1 }),
            Err(FetchError::Timeout { page: 1 }),
            Ok(table(&[("never", "genome tool", "2023")])),
        ]);

        let (summary, _, requested) = run(source, CutoffPolicy::StopAll).await;

        assert_eq!(summary.reason, StopReason::Timeout { page: 1 });
        assert_eq!(requested.len(), 3);
    }

    #[tokio::test]
    async fn page_limit_is_honoured() {
        let source = ScriptedSource::new(vec![
            Ok(table(&[("p1", "genome tool", "2023")])),
            Ok(table(&[("p2", "genome tool", "2023")])),
            Ok(table(&[("p3", "genome tool", "2023")])),
        ]);
        let cfg = ScrapeConfig {
            max_pages: Some(2),
            ..config(CutoffPolicy::StopAll)
        };
        let pipeline = Pipeline::new(source, &cfg);
        let mut sink = TsvSink::new(Vec::new()).unwrap();

        let summary = pipeline.run(&mut sink).await.unwrap();

        assert_eq!(summary.reason, StopReason::PageLimit { pages: 2 });
        assert_eq!(sink.records(), 2);
    }
}
