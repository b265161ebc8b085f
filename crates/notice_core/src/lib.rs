//! Notice core: pure digest splitting and event notification parsing.
mod cfr;
mod digest;
mod error;
mod record;
mod split;
mod text;
mod units;

pub use cfr::{builtin_cfr_set, CanonicalCfrSet, CfrNormalization, DEFAULT_CFR_CODES};
pub use digest::{
    AssembledRecord, DigestPage, DigestParser, DigestReport, RecordFailure, DIGEST_CONTAINER,
};
pub use error::{FormatError, ParseError, RecordError, ScanPhase};
pub use record::{
    parse_record, NotificationRecord, PersonOrganization, RecordParser, EXTENSION_LIMIT,
    PAIR_LIMIT, POWER_REACTOR,
};
pub use split::{split, DigestSpan, DigestSplit};
pub use text::{break_tags_to_newlines, element_text, fragment_text, normalize_lines};
pub use units::{extract_unit_table, UnitFrame, UnitStatus, UNIT_FIELD_NAMES, UNIT_SLOTS};
