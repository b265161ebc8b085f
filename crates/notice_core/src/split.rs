use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use notice_logging::notice_warn;
use regex::Regex;
use serde::Serialize;

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a\sname="en(\d{5})"></a>"#).unwrap());

/// One record's slice of a digest body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestSpan {
    pub record_id: String,
    pub start: usize,
    pub end: usize,
    raw_text: String,
}

impl DigestSpan {
    /// Markup from this record's anchor up to the next anchor.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Spans in anchor order plus the text preceding the first anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestSplit {
    pub preamble: Range<usize>,
    pub spans: Vec<DigestSpan>,
}

impl DigestSplit {
    pub fn record_ids(&self) -> Vec<&str> {
        self.spans.iter().map(|s| s.record_id.as_str()).collect()
    }

    pub fn get(&self, record_id: &str) -> Option<&DigestSpan> {
        self.spans.iter().find(|s| s.record_id == record_id)
    }
}

/// Partitions `body` at every `<a name="enNNNNN"></a>` marker.
///
/// A repeated id does not open a new span; its text stays with the span
/// before it.
pub fn split(body: &str) -> DigestSplit {
    let mut seen = HashSet::new();
    let mut markers: Vec<(usize, String)> = Vec::new();
    for caps in ANCHOR_RE.captures_iter(body) {
        let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !seen.insert(id.as_str().to_string()) {
            notice_warn!("Duplicate anchor en{} at offset {} ignored", id.as_str(), whole.start());
            continue;
        }
        markers.push((whole.start(), id.as_str().to_string()));
    }

    let preamble_end = markers.first().map(|(offset, _)| *offset).unwrap_or(body.len());
    let spans = markers
        .iter()
        .enumerate()
        .map(|(i, (start, id))| {
            let end = markers
                .get(i + 1)
                .map(|(next, _)| *next)
                .unwrap_or(body.len());
            DigestSpan {
                record_id: id.clone(),
                start: *start,
                end,
                raw_text: body[*start..end].to_string(),
            }
        })
        .collect();

    DigestSplit {
        preamble: 0..preamble_end,
        spans,
    }
}
