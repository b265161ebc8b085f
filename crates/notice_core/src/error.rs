use thiserror::Error;

/// Expected markup or a required marker is absent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("content container `{0}` not found")]
    MissingContainer(String),
    #[error("required marker `{0}` not found")]
    MissingMarker(String),
    #[error("record en{0} not found in digest")]
    RecordNotFound(String),
    #[error("failed to decode document: {0}")]
    Decode(String),
}

/// Phase of the record scan that rejected the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    EventType,
    CfrBlock,
}

/// A record's text does not follow the expected phase sequence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{phase:?}: {message}")]
pub struct ParseError {
    pub phase: ScanPhase,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(phase: ScanPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
        }
    }
}

/// Failure to turn one record's text into a [`crate::NotificationRecord`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
