// src/filter.rs

use std::io::{self, Write};
use tracing::{debug, info};

use crate::{
    config::{CutoffPolicy, FilterConfig},
    extract::PackageRow,
    sink::TsvSink,
};

/// A configured term kept next to its case-folded form.
#[derive(Debug, Clone)]
struct Term {
    original: String,
    folded: String,
}

impl Term {
    fn new(s: &str) -> Self {
        Self {
            original: s.to_string(),
            folded: s.to_lowercase(),
        }
    }
}

fn fold_all<'a>(terms: impl IntoIterator<Item = &'a String>) -> Vec<Term> {
    let mut out: Vec<Term> = Vec::new();
    for t in terms {
        if t.is_empty() {
            continue;
        }
        let term = Term::new(t);
        if !out.iter().any(|seen| seen.folded == term.folded) {
            out.push(term);
        }
    }
    out
}

fn first_match<'a>(haystack: &str, terms: &'a [Term]) -> Option<&'a str> {
    terms
        .iter()
        .find(|t| haystack.contains(&t.folded))
        .map(|t| t.original.as_str())
}

/// Outcome of the keyword tests for a single description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen<'a> {
    Accepted { term: &'a str },
    NoInclusion,
    Excluded { term: &'a str },
}

/// Case-insensitive substring matcher built from a [`FilterConfig`].
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    inclusion: Vec<Term>,
    exclusion: Vec<Term>,
    cutoff: Vec<Term>,
}

impl KeywordFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            inclusion: fold_all(&config.inclusion_terms),
            exclusion: fold_all(&config.exclusion_terms),
            cutoff: fold_all(&config.cutoff_labels),
        }
    }

    /// The cutoff label found in `updated`, if any.
    pub fn cutoff_label(&self, updated: &str) -> Option<&str> {
        first_match(&updated.to_lowercase(), &self.cutoff)
    }

    /// Inclusion first, then exclusion; exclusion overrides inclusion.
    pub fn screen(&self, description: &str) -> Screen<'_> {
        let folded = description.to_lowercase();
        let Some(term) = first_match(&folded, &self.inclusion) else {
            return Screen::NoInclusion;
        };
        match first_match(&folded, &self.exclusion) {
            Some(excluded) => Screen::Excluded { term: excluded },
            None => Screen::Accepted { term },
        }
    }
}

/// Why row processing on a page ended early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CutoffStop {
    /// Rest of this page abandoned; the run continues.
    Page { label: String },
    /// The whole run must stop.
    Run { label: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOutcome {
    /// Valid rows looked at, including the one that triggered a stop.
    pub examined: usize,
    pub accepted: usize,
    pub stop: Option<CutoffStop>,
}

/// Run the cutoff, inclusion and exclusion tests over `rows` in order and
/// append the accepted ones to `sink`.
pub fn process<I, W>(
    rows: I,
    filter: &KeywordFilter,
    policy: CutoffPolicy,
    sink: &mut TsvSink<W>,
) -> io::Result<PageOutcome>
where
    I: IntoIterator<Item = PackageRow>,
    W: Write,
{
    let mut outcome = PageOutcome::default();

    for row in rows {
        outcome.examined += 1;

        if policy != CutoffPolicy::Ignore {
            if let Some(label) = filter.cutoff_label(&row.updated) {
                match policy {
                    CutoffPolicy::StopAll => {
                        info!(package = %row.name, updated = %row.updated, "cutoff reached, stopping run");
                        outcome.stop = Some(CutoffStop::Run {
                            label: label.to_string(),
                        });
                        break;
                    }
                    CutoffPolicy::StopPage => {
                        info!(package = %row.name, updated = %row.updated, "cutoff reached, leaving page");
                        outcome.stop = Some(CutoffStop::Page {
                            label: label.to_string(),
                        });
                        break;
                    }
                    CutoffPolicy::Skip | CutoffPolicy::Ignore => {
                        debug!(package = %row.name, updated = %row.updated, "stale, skipping");
                        continue;
                    }
                }
            }
        }

        match filter.screen(&row.description) {
            Screen::NoInclusion => {
                debug!(package = %row.name, "no inclusion term");
            }
            Screen::Excluded { term } => {
                debug!(package = %row.name, term, "exclusion term matched");
            }
            Screen::Accepted { term } => {
                debug!(package = %row.name, term, "accepted");
                sink.append(&row)?;
                outcome.accepted += 1;
            }
        }
    }

    Ok(outcome)
}
