use std::ops::Range;
use std::sync::{Arc, OnceLock};

use notice_logging::notice_warn;
use serde::Serialize;

/// Canonical CFR citation strings in their fixed reporting order.
pub const DEFAULT_CFR_CODES: &[&str] = &[
    "20.1906(d)(1) - SURFACE CONTAM LEVELS > LIMITS",
    "20.1906(d)(2) - EXTERNAL RAD LEVELS > LIMITS",
    "20.2201(a)(1)(i) - LOST/STOLEN LNM>1000X",
    "20.2201(a)(1)(ii) - LOST/STOLEN LNM>10X",
    "20.2202(a)(1) - PERS OVEREXPOSURE/TEDE >= 25 REM",
    "20.2202(a)(2) - EXCESSIVE RELEASE",
    "20.2202(b)(1) - PERS OVEREXPOSURE/TEDE >= 5 REM",
    "20.2202(b)(2) - EXCESSIVE RELEASE",
    "21.21 - UNSPECIFIED PARAGRAPH",
    "21.21(a)(2) - INTERIM EVAL OF DEVIATION",
    "21.21(d)(3)(i) - DEFECTS AND NONCOMPLIANCE",
    "26.417(b)(1) - FFD PROGRAMATIC FAILURE",
    "26.417(b)(1) - FFD PROGRAMMATIC FAILURE",
    "26.719 - FITNESS FOR DUTY",
    "26.73 - FITNESS FOR DUTY",
    "30.50(a) - PROTECTIVE ACTION PREVENTED",
    "30.50(b)(1) - UNPLANNED CONTAMINATION",
    "30.50(b)(2) - SAFETY EQUIPMENT FAILURE",
    "30.50(b)(3) - MED TREAT INVOLVING CONTAM",
    "30.50(b)(4) - FIRE/EXPLOSION",
    "35.3045(a)(1) - DOSE <> PRESCRIBED DOSAGE",
    "35.3045(a)(2) - DOSE > SPECIFIED EFF LIMITS",
    "35.3045(a)(3) - DOSE TO OTHER SITE > SPECIFIED LIMITS",
    "35.3045(b) - PATIENT INTERVENTION DAMAGE",
    "35.3047(a) - EMBRYO/FETUS DOSE  > 50 mSv",
    "36.83(a)(1) - UNSHIELD STUCK SOURCE",
    "36.83(a)(10) - POOL COND HIGH",
    "36.83(a)(4) - FAILED CABLE/DRIVE",
    "36.83(a)(5) - INOP ACCESS CTRL SYS",
    "37.57(a) - ACT/ATTEMPT THEFT CAT 1/2 RAD MATL",
    "37.81(b) - LOST/MISSING CAT 2 RAD MATL IN TRANSIT",
    "40.35(f) - EMERGENCY DECLARED",
    "40.60(b)(1) - UNPLANNED CONTAMINATION",
    "40.60(b)(2) - SAFETY EQUIPMENT FAILURE",
    "40.60(b)(3) - MED TREAT INVOLVING CONTAM",
    "40.60(b)(4) - FIRE/EXPLOSION",
    "50.55(e) - CONSTRUCT DEFICIENCY",
    "50.72(a) (1) (i) - EMERGENCY DECLARED",
    "50.72(b)(2)(xi) - OFFSITE NOTIFICATION",
    "50.72(b)(1) - DEVIATION FROM T SPEC",
    "50.72(b)(2)(i) - PLANT S/D REQD BY TS",
    "50.72(b)(3)(ii)(A) - DEGRADED CONDITION",
    "50.72(b)(3)(v)(D) - ACCIDENT MITIGATION",
    "50.72(b)(2)(iv)(A) - ECCS INJECTION",
    "50.72(b)(2)(iv)(B) - RPS ACTUATION - CRITICAL",
    "50.72(b)(3)(iv)(A) - VALID SPECIF SYS ACTUATION",
    "50.72(b)(3)(xii) - OFFSITE MEDICAL",
    "50.72(b)(3)(ii)(B) - UNANALYZED CONDITION",
    "50.72(b)(3)(v)(C) - POT UNCNTRL RAD REL",
    "50.72(b)(3)(v)(B) - POT RHR INOP",
    "50.72(b)(3)(xiii) - LOSS COMM/ASMT/RESPONSE",
    "50.72(b)(3)(v)(A) - POT UNABLE TO SAFE SD",
    "50.73(a)(1) - INVALID SPECIF SYSTEM ACTUATION",
    "70.32(i) - EMERGENCY DECLARED",
    "70.50(a) - PROTECTIVE ACTION PREVENTED",
    "70.50(b)(1) - UNPLANNED CONTAMINATION",
    "70.50(b)(2) - SAFETY EQUIPMENT FAILURE",
    "70.50(b)(3) - MED TREAT INVOLVING CONTAM",
    "PART 70 APP A (c) - OFFSITE NOTIFICATION/NEWS REL",
    "70.50(b)(4) - FIRE/EXPLOSION",
    "70.74 APP. A - ADDITIONAL REPORTING REQUIREMENTS",
    "72.74 - CRIT LOSS/THEFT OF SNM",
    "72.75(b)(2) - PRESS RELEASE/OFFSITE NOTIFICATION",
    "72.75(c )(1) - SPENT FUEL, HLW, RX GTCC DEFECT",
    "72.75(c )(2) - SPENT FUEL, HLW OR RX-REL GTCC RED. EFECT",
    "72.75(d)(1) - SFTY EQUIP. DISABLED OR FAILS TO FUNCTION",
    "73.71(b)(1) - SAFEGUARDS REPORTS",
    "74.11(a) - LOST/STOLEN SNM",
    "74.57 - ALARM RESOLUTION",
    "76.120(a)(4) - EMERGENCY DECLARED",
    "76.120(c)(1) - UNPLANNED CONTAMINATION",
    "76.120(c)(2) - SAFETY EQUIPMENT FAILURE",
    "AGREEMENT STATE",
    "INFORMATION ONLY",
    "NON-POWER REACTOR EVENT",
    "OTHER UNSPEC REQMNT",
    "PART 70 APP A (a)(4) - ALL SAFETY ITEMS UNAVAILABLE",
    "PART 70 APP A (a)(5) - ONLY ONE SAFETY ITEM AVAILABLE",
    "PART 70 APP A (b)(1) - UNANALYZED CONDITION",
    "PART 70 APP A (b)(2) - LOSS OR DEGRADED SAFETY ITEMS",
    "PART 70 APP A (b)(3) - ACUTE CHEMICAL EXPOSURE",
    "PART 70 APP A (b)(4) - NAT PHENOM AFFECTING SAFETY",
    "PART 70 APP A (b)(5) - DEV FROM ISA",
    "RESEARCH AND TEST REACTOR EVENT",
    "RESPONSE-BULLETIN",
];

/// Fixed, ordered list of known CFR citations. Built once and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCfrSet {
    codes: Vec<String>,
}

/// Result of matching raw citation lines against a [`CanonicalCfrSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CfrNormalization {
    /// Canonical codes found, in canonical order.
    pub codes: Vec<String>,
    /// Raw lines that contain no canonical code.
    pub unmatched: Vec<String>,
}

impl CanonicalCfrSet {
    /// Builds a set from codes in their canonical order. Blank entries and
    /// repeated entries are skipped.
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for code in codes {
            let code = code.into();
            let trimmed = code.trim();
            if trimmed.is_empty() || unique.iter().any(|c| c == trimmed) {
                continue;
            }
            unique.push(trimmed.to_string());
        }
        Self { codes: unique }
    }

    /// Parses a newline-delimited code list.
    pub fn from_list(text: &str) -> Self {
        Self::new(text.lines())
    }

    /// The built-in code list.
    pub fn builtin() -> Self {
        Self::new(DEFAULT_CFR_CODES.iter().copied())
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    /// Emits every canonical code that is a substring of the concatenated
    /// raw lines, in canonical order. A line is unmatched when no emitted
    /// code's occurrence overlaps it, so a code wrapped across two lines
    /// leaves neither half unmatched.
    pub fn normalize<S: AsRef<str>>(&self, raw_lines: &[S]) -> CfrNormalization {
        let joined: String = raw_lines.iter().map(AsRef::as_ref).collect();
        let codes: Vec<String> = self
            .codes
            .iter()
            .filter(|code| joined.contains(code.as_str()))
            .cloned()
            .collect();

        let covered: Vec<Range<usize>> = codes
            .iter()
            .flat_map(|code| joined.match_indices(code.as_str()))
            .map(|(start, found)| start..start + found.len())
            .collect();

        let mut unmatched = Vec::new();
        let mut offset = 0;
        for line in raw_lines.iter().map(AsRef::as_ref) {
            let span = offset..offset + line.len();
            offset = span.end;
            if !covered.iter().any(|hit| hit.start < span.end && span.start < hit.end) {
                notice_warn!("Unmatched CFR citation dropped: {:?}", line);
                unmatched.push(line.to_string());
            }
        }

        CfrNormalization { codes, unmatched }
    }
}

impl Default for CanonicalCfrSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Process-wide built-in set, built on first use.
pub fn builtin_cfr_set() -> Arc<CanonicalCfrSet> {
    static SET: OnceLock<Arc<CanonicalCfrSet>> = OnceLock::new();
    SET.get_or_init(|| Arc::new(CanonicalCfrSet::builtin()))
        .clone()
}
