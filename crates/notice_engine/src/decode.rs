use chardetng::EncodingDetector;
use encoding_rs::{Encoding, WINDOWS_1252};
use notice_logging::notice_warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding_label: String,
    /// True when malformed sequences were replaced with U+FFFD.
    pub lossy: bool,
}

/// Where the bytes came from; selects the fallback when no BOM is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrigin<'a> {
    Remote { content_type: Option<&'a str> },
    LocalFile,
}

/// BOM first. Remote bytes then use the Content-Type charset or chardetng;
/// local files are Windows-1252.
pub fn decode_markup(bytes: &[u8], origin: ByteOrigin<'_>) -> DecodedText {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    match origin {
        ByteOrigin::LocalFile => decode_with(bytes, WINDOWS_1252),
        ByteOrigin::Remote { content_type } => {
            if let Some(enc) = content_type
                .and_then(extract_charset)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
            {
                return decode_with(bytes, enc);
            }
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            decode_with(bytes, detector.guess(None, true))
        }
    }
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.trim().split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches([' ', '"', '\''].as_ref()).to_string())
        })
        .next()
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedText {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        notice_warn!("malformed {} sequences replaced while decoding", enc.name());
    }
    DecodedText {
        text: text.into_owned(),
        encoding_label: enc.name().to_string(),
        lossy: had_errors,
    }
}
