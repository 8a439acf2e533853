// src/extract.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::trace;

static TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("CSS selector for table should be valid"));
static LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("CSS selector for a should be valid"));

pub const NO_DESCRIPTION: &str = "No description available";
pub const NO_DATE: &str = "No date available";

/// Cells a listing row needs: name, (unused), description, updated.
const MIN_CELLS: usize = 4;

/// One package as listed on a registry page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRow {
    pub name: String,
    pub description: String,
    pub updated: String,
}

impl PackageRow {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        updated: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            updated: updated.into(),
        }
    }
}

/// The page carried no listing table, i.e. we ran off the end of the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no listing table in page")]
pub struct NoTableFound;

/// A parsed page known to contain a listing table.
pub struct Listing {
    document: Html,
}

/// Parse `markup` and make sure it holds a listing table.
pub fn extract(markup: &str) -> Result<Listing, NoTableFound> {
    let document = Html::parse_document(markup);
    if document.select(&TABLE).next().is_none() {
        return Err(NoTableFound);
    }
    Ok(Listing { document })
}

impl Listing {
    /// Data rows of the first table, header skipped, in document order.
    /// Rows with too few cells are dropped. Tables nested inside a cell
    /// contribute neither rows nor cells.
    pub fn rows(&self) -> impl Iterator<Item = PackageRow> + '_ {
        self.document
            .select(&TABLE)
            .take(1)
            .flat_map(|table| own_rows(table).skip(1))
            .filter_map(parse_row)
    }
}

fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children().filter_map(ElementRef::wrap)
}

fn named<'a>(name: &'static str) -> impl Fn(&ElementRef<'a>) -> bool {
    move |el| el.value().name() == name
}

/// `tr` elements belonging to `table` itself, directly or through its row groups.
fn own_rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    child_elements(table).flat_map(|child| match child.value().name() {
        "tr" => vec![child],
        "thead" | "tbody" | "tfoot" => child_elements(child).filter(named("tr")).collect(),
        _ => Vec::new(),
    })
}

fn parse_row(row: ElementRef<'_>) -> Option<PackageRow> {
    let cells: Vec<ElementRef<'_>> = child_elements(row).filter(named("td")).collect();
    if cells.len() < MIN_CELLS {
        trace!(cells = cells.len(), "skipping short row");
        return None;
    }

    let name = cells[0]
        .select(&LINK)
        .next()
        .map(text_of)
        .unwrap_or_else(|| text_of(cells[0]));
    let description = non_empty_or(text_of(cells[2]), NO_DESCRIPTION);
    let updated = non_empty_or(text_of(cells[3]), NO_DATE);

    Some(PackageRow {
        name,
        description,
        updated,
    })
}

/// Element text with whitespace runs collapsed and ends trimmed.
fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty_or(s: String, placeholder: &str) -> String {
    if s.is_empty() {
        placeholder.to_string()
    } else {
        s
    }
}
