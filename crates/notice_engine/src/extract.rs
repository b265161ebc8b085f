use std::sync::LazyLock;

use notice_core::{element_text, fragment_text, FormatError};
use regex::Regex;
use scraper::{Html, Selector};

static EDITABLE_REGION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<!-- #BeginEditable "Page Content" -->(.*?)<!--"#).unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContent {
    pub title: Option<String>,
    pub text: String,
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str) -> Result<ExtractedContent, FormatError>;
}

/// Report pages keep their body in a `<pre>` block; older templates wrap it in
/// an editable region comment pair instead.
#[derive(Debug, Default)]
pub struct ReportPageExtractor;

impl Extractor for ReportPageExtractor {
    fn extract(&self, html: &str) -> Result<ExtractedContent, FormatError> {
        let doc = Html::parse_document(html);
        let title_sel = Selector::parse("title").ok();
        let pre_sel = Selector::parse("pre").ok();

        let title = title_sel
            .as_ref()
            .and_then(|sel| doc.select(sel).next())
            .map(|t| t.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        if let Some(pre) = pre_sel.as_ref().and_then(|sel| doc.select(sel).next()) {
            return Ok(ExtractedContent {
                title,
                text: element_text(pre),
            });
        }

        let region = EDITABLE_REGION_RE
            .captures(html)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| FormatError::MissingContainer("pre or editable page content".into()))?;

        Ok(ExtractedContent {
            title,
            text: fragment_text(region.as_str()),
        })
    }
}
