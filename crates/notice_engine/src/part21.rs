use std::sync::LazyLock;

use notice_core::{element_text, FormatError};
use notice_logging::notice_debug;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

use crate::links::resolve_url;

const LISTING_TABLE: &str = r#"table[border="1"]"#;

static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse(LISTING_TABLE).unwrap());
static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// One row of a yearly Part 21 listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part21Entry {
    pub log_no: String,
    pub notifier: String,
    pub description: String,
    pub report_date: String,
    pub event_or_accession: String,
    /// Report locator, ready for the resolver.
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part21Index {
    pub listing_url: String,
    pub entries: Vec<Part21Entry>,
}

impl Part21Index {
    pub fn parse(html: &str, listing_url: &str) -> Result<Self, FormatError> {
        let document = Html::parse_document(html);
        let table = document
            .select(&TABLE_SEL)
            .next()
            .ok_or_else(|| FormatError::MissingContainer(LISTING_TABLE.into()))?;
        let base = Url::parse(listing_url).ok();

        let entries: Vec<Part21Entry> = table
            .select(&ROW_SEL)
            .filter_map(|row| parse_row(row, base.as_ref()))
            .collect();
        notice_debug!("{listing_url}: {} Part 21 entries", entries.len());

        Ok(Self {
            listing_url: listing_url.to_string(),
            entries,
        })
    }

    pub fn log_numbers(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.log_no.as_str()).collect()
    }

    pub fn get(&self, log_no: &str) -> Option<&Part21Entry> {
        self.entries.iter().find(|e| e.log_no == log_no)
    }
}

/// Header rows use `th` or carry fewer than five cells and are skipped.
fn parse_row(row: ElementRef<'_>, base: Option<&Url>) -> Option<Part21Entry> {
    let cells: Vec<ElementRef<'_>> = row.select(&CELL_SEL).collect();
    if cells.len() < 5 {
        return None;
    }
    let text = |idx: usize| collapse_whitespace(&element_text(cells[idx]));
    let link = row
        .select(&LINK_SEL)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve_url(href, base))
        .map(String::from);

    Some(Part21Entry {
        log_no: text(0),
        notifier: text(1),
        description: text(2),
        report_date: text(3),
        event_or_accession: text(4),
        link,
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
