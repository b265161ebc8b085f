use std::fmt;
use std::path::{self, Path};
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::{ResolveError, SourceKind};

static PACKAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"ML\w{9}\.html$").unwrap());
static DIGEST_ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)#en(\d{5})$").unwrap());

/// Where bytes for a locator come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Remote(String),
    Local(String),
}

impl Location {
    /// Anything starting with `http` goes over the network.
    pub fn parse(locator: &str) -> Self {
        if locator.starts_with("http") {
            Location::Remote(locator.to_string())
        } else {
            Location::Local(locator.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Location::Remote(s) | Location::Local(s) => s,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Remote(_))
    }

    /// Base for relative links found in this document. Local paths become
    /// `file:` URLs so siblings resolve against the file's directory.
    pub fn base_url(&self) -> Option<Url> {
        match self {
            Location::Remote(url) => Url::parse(url).ok(),
            Location::Local(file) => path::absolute(Path::new(file))
                .ok()
                .and_then(|absolute| Url::from_file_path(absolute).ok()),
        }
    }

    /// Inverse of [`Self::base_url`] for a resolved link.
    pub fn from_url(url: &Url) -> Self {
        if url.scheme() == "file" {
            if let Ok(file) = url.to_file_path() {
                return Location::Local(file.to_string_lossy().into_owned());
            }
        }
        Location::parse(url.as_str())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified locator. The variant is fixed once and never revisited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Package(Location),
    Html(Location),
    Pdf(Location),
    DigestRecord { page: Location, record_id: String },
}

impl DocumentSource {
    /// Package index, then `.html`, then `.pdf`, then `#enNNNNN`.
    pub fn classify(locator: &str) -> Result<Self, ResolveError> {
        let locator = locator.trim();
        if PACKAGE_RE.is_match(locator) {
            return Ok(DocumentSource::Package(Location::parse(locator)));
        }
        if locator.ends_with(".html") {
            return Ok(DocumentSource::Html(Location::parse(locator)));
        }
        if locator.ends_with(".pdf") {
            return Ok(DocumentSource::Pdf(Location::parse(locator)));
        }
        if let Some(caps) = DIGEST_ANCHOR_RE.captures(locator) {
            return Ok(DocumentSource::DigestRecord {
                page: Location::parse(&caps[1]),
                record_id: caps[2].to_string(),
            });
        }
        Err(ResolveError::UnknownDocumentType(locator.to_string()))
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            DocumentSource::Package(_) => SourceKind::Package,
            DocumentSource::Html(_) => SourceKind::Html,
            DocumentSource::Pdf(_) => SourceKind::Pdf,
            DocumentSource::DigestRecord { .. } => SourceKind::Digest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_order_is_package_html_pdf_anchor() {
        let cases = [
            ("https://adams.example.gov/ML19084A123.html", SourceKind::Package),
            ("https://www.example.gov/part21/2019/20190101.html", SourceKind::Html),
            ("https://www.example.gov/docs/ML19084A123.pdf", SourceKind::Pdf),
            ("https://www.example.gov/event-status/2019/20190326en.html#en53949", SourceKind::Digest),
            ("reports/local_page.html", SourceKind::Html),
        ];
        for (locator, kind) in cases {
            assert_eq!(DocumentSource::classify(locator).unwrap().kind(), kind, "{locator}");
        }
    }

    #[test]
    fn digest_anchor_splits_page_and_id() {
        let source = DocumentSource::classify("saved/digest.htm#en01234").unwrap();
        assert_eq!(
            source,
            DocumentSource::DigestRecord {
                page: Location::Local("saved/digest.htm".into()),
                record_id: "01234".into(),
            }
        );
    }

    #[test]
    fn unrecognized_shapes_are_rejected() {
        for locator in ["https://example.gov/report.docx", "notes.txt", "page.html#en123"] {
            assert_eq!(
                DocumentSource::classify(locator),
                Err(ResolveError::UnknownDocumentType(locator.to_string()))
            );
        }
    }
}
