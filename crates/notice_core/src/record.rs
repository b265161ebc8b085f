//! Line-oriented extraction of one event notification.
//!
//! The record text is normalized into an immutable line sequence. Each scan
//! phase computes index ranges over that sequence and marks the lines it
//! owns as consumed; nothing is deleted, so later phases see stable indices.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::{Arc, LazyLock};

use notice_logging::{notice_debug, notice_warn};
use regex::Regex;
use serde::Serialize;

use crate::cfr::{builtin_cfr_set, CanonicalCfrSet};
use crate::error::{FormatError, ParseError, RecordError, ScanPhase};
use crate::text::normalize_lines;

/// Maximum staff/organization pairs kept per record.
pub const PAIR_LIMIT: usize = 10;
/// Maximum extension entries kept per record.
pub const EXTENSION_LIMIT: usize = 64;

pub const POWER_REACTOR: &str = "Power Reactor";
const EVENT_TEXT_MARKER: &str = "event text";
const CFR_LABEL: &str = "10 CFR Section:";
const PERSON_LABEL: &str = "Person (Organization):";
const UNIT_MARKER: &str = "Unit";

const RETRACTION_BANNERS: [&str; 3] = [
    "!!!!! THIS EVENT HAS BEEN RETRACTED. THIS EVENT HAS BEEN RETRACTED  !!!!!",
    "!!!!! THIS EVENT HAS BEEN RETRACTED.  THIS EVENT HAS BEEN RETRACTED !!!!!",
    "!!!!! THIS EVENT HAS BEEN RETRACTED.THIS EVENT HAS BEEN RETRACTED !!!!!",
];

static STATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"State:\s(\w+)").unwrap());
static CATEGORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)This material event contains a "(.*)" level of radioactive material\."#)
        .unwrap()
});
static FOOTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Page Last Reviewed/Updated.*").unwrap());
static PERSON_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(.*)(\(.*\))$").unwrap());
static PERSON_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PERSON\s+ORGANIZATION$").unwrap());
static PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w\s#]+):(\s([.,\w\s\[\]\-/:]+))?").unwrap());
static UNIT_LIST_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\d?)\]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonOrganization {
    pub staff: String,
    pub organization: String,
}

impl PersonOrganization {
    pub fn new(staff: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            staff: staff.into(),
            organization: organization.into(),
        }
    }
}

/// Typed result of parsing one digest record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRecord {
    pub event_type: String,
    pub retraction: bool,
    pub event_text: String,
    /// Canonical CFR codes, in canonical order.
    pub cfr_sections: Vec<String>,
    /// CFR lines as they appeared in the source.
    pub raw_cfr_lines: Vec<String>,
    /// Source CFR lines that matched no canonical code.
    pub unmatched_citations: Vec<String>,
    pub person_organization_pairs: Vec<PersonOrganization>,
    pub comments: Option<String>,
    pub material_category: Option<String>,
    pub state: Option<String>,
    /// Every other `label: value` line.
    pub extension: BTreeMap<String, String>,
}

impl NotificationRecord {
    /// Value of an extension field, if present and non-empty.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.extension
            .get(label)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn event_number(&self) -> Option<u32> {
        self.field("Event Number")?.trim().parse().ok()
    }

    pub fn is_power_reactor(&self) -> bool {
        self.event_type == POWER_REACTOR
    }

    /// Reporting organization, falling back to the facility name.
    pub fn site_name(&self) -> Option<&str> {
        self.field("Rep Org").or_else(|| self.field("Facility"))
    }

    /// Unit numbers from a `Unit: [1] [2] []` line; empty brackets are `None`.
    pub fn reported_units(&self) -> [Option<u8>; 3] {
        let mut units = [None; 3];
        let Some(raw) = self.extension.get(UNIT_MARKER) else {
            return units;
        };
        for (slot, caps) in units.iter_mut().zip(UNIT_LIST_RE.captures_iter(raw)) {
            *slot = caps.get(1).and_then(|m| m.as_str().parse().ok());
        }
        units
    }
}

/// Parses record text against a shared canonical CFR set.
#[derive(Debug, Clone)]
pub struct RecordParser {
    cfr_set: Arc<CanonicalCfrSet>,
}

impl RecordParser {
    pub fn new(cfr_set: Arc<CanonicalCfrSet>) -> Self {
        Self { cfr_set }
    }

    pub fn cfr_set(&self) -> &CanonicalCfrSet {
        &self.cfr_set
    }

    pub fn parse(&self, text: &str) -> Result<NotificationRecord, RecordError> {
        let (lines, retraction) = strip_retraction(normalize_lines(text));

        // 1. Tail isolation.
        let tail_marker = lines
            .iter()
            .position(|line| line.to_lowercase().starts_with(EVENT_TEXT_MARKER))
            .ok_or_else(|| FormatError::MissingMarker("Event Text".into()))?;
        let event_text = FOOTER_RE
            .replace_all(&lines[tail_marker + 1..].join("\n"), "")
            .trim_end()
            .to_string();

        let head = &lines[..tail_marker];
        let mut scan = LineScan::new(head);

        // 2. State, stripped from its line for the generic sweep.
        let mut state = None;
        let mut state_line = None;
        if let Some(idx) = head.iter().position(|line| line.contains("State: ")) {
            state = STATE_RE
                .captures(&head[idx])
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string());
            state_line = Some((idx, STATE_RE.replace_all(&head[idx], "").into_owned()));
        }

        // 3. Comments run until the next labeled line.
        let comments = head
            .iter()
            .position(|line| line.contains("Comments:"))
            .and_then(|start| {
                let end = (start + 1..head.len())
                    .find(|&i| head[i].contains(':'))
                    .unwrap_or(head.len());
                scan.consume_range(start..end);
                collect_comments(&head[start..end])
            });

        // 5. Event type.
        let event_type_idx = scan.find(0, |_| true).ok_or_else(|| {
            ParseError::new(ScanPhase::EventType, "no lines before the event text marker")
        })?;
        scan.consume(event_type_idx);
        let event_type = head[event_type_idx].clone();

        // 6. CFR block.
        let cfr_label = scan
            .find(0, |line| line.eq_ignore_ascii_case(CFR_LABEL))
            .ok_or_else(|| FormatError::MissingMarker(CFR_LABEL.into()))?;
        let cfr_end = scan
            .find(cfr_label + 1, |line| line == PERSON_LABEL || line == UNIT_MARKER)
            .ok_or_else(|| {
                ParseError::new(
                    ScanPhase::CfrBlock,
                    "no `Person (Organization):` or `Unit` line after `10 CFR Section:`",
                )
            })?;
        scan.consume(cfr_label);
        let raw_cfr_lines: Vec<String> = scan
            .live(cfr_label + 1..cfr_end)
            .map(|(_, line)| line.to_string())
            .collect();
        scan.consume_range(cfr_label + 1..cfr_end);
        let cfr = self.cfr_set.normalize(&raw_cfr_lines);

        // 7. Material category.
        let mut material_category = None;
        if let Some(idx) = scan.find(0, |line| CATEGORY_RE.is_match(line)) {
            material_category = CATEGORY_RE
                .captures(&head[idx])
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().replace('"', ""));
            scan.consume(idx);
        }

        // 8. Person/organization block.
        let person_label = scan.find(cfr_end, |line| {
            line == PERSON_LABEL || PERSON_HEADER_RE.is_match(line)
        });
        let mut person_organization_pairs = Vec::new();
        if let Some(label) = person_label {
            scan.consume(label);
            let start = label + 1;
            let end = if event_type == POWER_REACTOR {
                scan.find(start, |line| line == UNIT_MARKER)
                    .unwrap_or(head.len())
            } else {
                head.len()
            };
            person_organization_pairs = scan
                .live(start..end)
                .map(|(_, line)| split_person(line))
                .collect();
            scan.consume_range(start..end);
        } else {
            notice_debug!("No person/organization label in {:?} record", event_type);
        }
        if person_organization_pairs.len() > PAIR_LIMIT {
            notice_warn!(
                "Record has {} person/organization pairs; keeping the first {}",
                person_organization_pairs.len(),
                PAIR_LIMIT
            );
            person_organization_pairs.truncate(PAIR_LIMIT);
        }

        // 9. Generic `label: value` sweep.
        let mut extension = BTreeMap::new();
        for (idx, line) in scan.live(0..head.len()) {
            let line = match &state_line {
                Some((state_idx, stripped)) if *state_idx == idx => stripped.as_str(),
                _ => line,
            };
            let Some(caps) = PAIR_RE.captures(line) else {
                continue;
            };
            let key = caps[1]
                .replace("SCAM", "SCRAM")
                .replace("RX Crit", "RX CRIT")
                .trim()
                .to_string();
            let value = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            if extension.len() >= EXTENSION_LIMIT && !extension.contains_key(&key) {
                notice_warn!("Extension field limit reached; dropping {:?}", key);
                continue;
            }
            extension.insert(key, value.to_string());
        }

        Ok(NotificationRecord {
            event_type,
            retraction,
            event_text,
            cfr_sections: cfr.codes,
            raw_cfr_lines,
            unmatched_citations: cfr.unmatched,
            person_organization_pairs,
            comments,
            material_category,
            state,
            extension,
        })
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(builtin_cfr_set())
    }
}

/// Parses record text with the built-in canonical CFR set.
pub fn parse_record(text: &str) -> Result<NotificationRecord, RecordError> {
    RecordParser::default().parse(text)
}

struct LineScan<'a> {
    lines: &'a [String],
    consumed: Vec<bool>,
}

impl<'a> LineScan<'a> {
    fn new(lines: &'a [String]) -> Self {
        Self {
            lines,
            consumed: vec![false; lines.len()],
        }
    }

    fn live(&self, range: Range<usize>) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        let end = range.end.min(self.lines.len());
        let lines = self.lines;
        (range.start..end)
            .filter(move |&i| !self.consumed[i])
            .map(move |i| (i, lines[i].as_str()))
    }

    fn find(&self, from: usize, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.live(from..self.lines.len())
            .find(|(_, line)| pred(line))
            .map(|(i, _)| i)
    }

    fn consume(&mut self, idx: usize) {
        if let Some(flag) = self.consumed.get_mut(idx) {
            *flag = true;
        }
    }

    fn consume_range(&mut self, range: Range<usize>) {
        for idx in range {
            self.consume(idx);
        }
    }
}

fn strip_retraction(lines: Vec<String>) -> (Vec<String>, bool) {
    let before = lines.len();
    let kept: Vec<String> = lines
        .into_iter()
        .filter(|line| !RETRACTION_BANNERS.contains(&line.as_str()))
        .collect();
    let retracted = kept.len() != before;
    (kept, retracted)
}

fn collect_comments(lines: &[String]) -> Option<String> {
    let (first, rest) = lines.split_first()?;
    let first = first
        .split_once("Comments:")
        .map(|(_, after)| after)
        .unwrap_or(first)
        .trim();
    let mut parts = Vec::with_capacity(lines.len());
    if !first.is_empty() {
        parts.push(first);
    }
    parts.extend(rest.iter().map(String::as_str));
    let joined = parts.join("\n");
    (!joined.is_empty()).then_some(joined)
}

fn split_person(line: &str) -> PersonOrganization {
    match PERSON_RE.captures(line) {
        Some(caps) => {
            let organization = caps[2].replace(['(', ')'], "");
            PersonOrganization::new(caps[1].trim(), organization.trim())
        }
        None => PersonOrganization::new(line.trim(), ""),
    }
}
