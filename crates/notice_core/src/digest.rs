use std::sync::{Arc, LazyLock};

use notice_logging::{notice_info, notice_warn};
use rayon::prelude::*;
use scraper::{Html, Selector};
use serde::Serialize;

use crate::cfr::{builtin_cfr_set, CanonicalCfrSet};
use crate::error::{FormatError, RecordError};
use crate::record::{NotificationRecord, RecordParser};
use crate::split::{split, DigestSpan, DigestSplit};
use crate::text::{break_tags_to_newlines, fragment_text};
use crate::units::{extract_unit_table, UnitFrame, UNIT_FIELD_NAMES};

/// Selector of the element holding every record of a digest page.
pub const DIGEST_CONTAINER: &str = "div#mainSubFull";

static CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(DIGEST_CONTAINER).unwrap());

/// A digest page reduced to its record container and anchor spans.
#[derive(Debug, Clone)]
pub struct DigestPage {
    body: String,
    split: DigestSplit,
}

impl DigestPage {
    pub fn parse(html: &str) -> Result<Self, FormatError> {
        let prepared = break_tags_to_newlines(html);
        let document = Html::parse_document(&prepared);
        let body = document
            .select(&CONTAINER_SEL)
            .next()
            .map(|container| container.html())
            .ok_or_else(|| FormatError::MissingContainer(DIGEST_CONTAINER.into()))?;
        let split = split(&body);
        Ok(Self { body, split })
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn spans(&self) -> &[DigestSpan] {
        &self.split.spans
    }

    pub fn record_ids(&self) -> Vec<&str> {
        self.split.record_ids()
    }

    pub fn span(&self, record_id: &str) -> Result<&DigestSpan, FormatError> {
        self.split
            .get(record_id)
            .ok_or_else(|| FormatError::RecordNotFound(record_id.to_string()))
    }

    /// Plain text of one record.
    pub fn record_text(&self, record_id: &str) -> Result<String, FormatError> {
        self.span(record_id).map(|span| fragment_text(span.raw_text()))
    }
}

/// One parsed record with its unit frame, ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledRecord {
    pub record_id: String,
    pub notification: NotificationRecord,
    pub units: Option<UnitFrame>,
}

impl AssembledRecord {
    /// The 18-wide unit vector; all slots absent when the record has no table.
    pub fn unit_vector(&self) -> Vec<Option<String>> {
        match &self.units {
            Some(frame) => frame.to_vector(),
            None => vec![None; UNIT_FIELD_NAMES.len()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub record_id: String,
    pub error: RecordError,
    /// Set when the failing record was the last one in the digest.
    pub trailing: bool,
}

/// Partial-success outcome of parsing a digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestReport {
    pub records: Vec<AssembledRecord>,
    pub failures: Vec<RecordFailure>,
    pub dropped_trailing: bool,
}

impl DigestReport {
    pub fn unmatched_citations(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.notification.unmatched_citations.len())
            .sum()
    }

    pub fn record(&self, record_id: &str) -> Option<&AssembledRecord> {
        self.records.iter().find(|r| r.record_id == record_id)
    }
}

#[derive(Debug, Clone)]
pub struct DigestParser {
    records: RecordParser,
}

impl DigestParser {
    pub fn new(cfr_set: Arc<CanonicalCfrSet>) -> Self {
        Self {
            records: RecordParser::new(cfr_set),
        }
    }

    pub fn parse_page(&self, html: &str) -> Result<DigestReport, FormatError> {
        let page = DigestPage::parse(html)?;
        Ok(self.parse_spans(page.spans()))
    }

    pub fn parse_span(&self, span: &DigestSpan) -> Result<AssembledRecord, RecordError> {
        let text = fragment_text(span.raw_text());
        let notification = self.records.parse(&text)?;
        Ok(AssembledRecord {
            record_id: span.record_id.clone(),
            notification,
            units: extract_unit_table(span.raw_text()),
        })
    }

    /// Parses every span in parallel, keeping anchor order.
    ///
    /// A failure on the last span is treated as feed-boundary truncation: the
    /// record is dropped and flagged as trailing. Failures elsewhere are
    /// reported per record. Neither stops sibling records.
    pub fn parse_spans(&self, spans: &[DigestSpan]) -> DigestReport {
        let results: Vec<Result<AssembledRecord, RecordError>> =
            spans.par_iter().map(|span| self.parse_span(span)).collect();

        let mut report = DigestReport::default();
        let last = spans.len().checked_sub(1);
        for (idx, (span, result)) in spans.iter().zip(results).enumerate() {
            match result {
                Ok(record) => report.records.push(record),
                Err(error) => {
                    let trailing = Some(idx) == last;
                    if trailing {
                        notice_warn!(
                            "Dropping trailing record en{} (likely truncated): {}",
                            span.record_id,
                            error
                        );
                        report.dropped_trailing = true;
                    } else {
                        notice_warn!("Record en{} failed to parse: {}", span.record_id, error);
                    }
                    report.failures.push(RecordFailure {
                        record_id: span.record_id.clone(),
                        error,
                        trailing,
                    });
                }
            }
        }

        notice_info!(
            "Parsed {} of {} digest records ({} unmatched citations)",
            report.records.len(),
            spans.len(),
            report.unmatched_citations()
        );
        report
    }
}

impl Default for DigestParser {
    fn default() -> Self {
        Self::new(builtin_cfr_set())
    }
}
