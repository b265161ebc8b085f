use notice_core::FormatError;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;

/// Metadata fields the document search service returns per result.
pub const SEARCH_RESULT_FIELDS: &[&str] = &[
    "accessionnumber",
    "addresseeaffiliation",
    "addresseename",
    "authoraffiliation",
    "authorname",
    "casereferencenumber",
    "compounddocumentstate",
    "contentsize",
    "datedocketed",
    "docketnumber",
    "documentdate",
    "documentreportnumber",
    "documenttitle",
    "documenttype",
    "estimatedpagecount",
    "keyword",
    "licensenumber",
    "mimetype",
    "packagenumber",
    "publishdatepars",
    "uri",
];

/// One `<result>` element: child element name to trimmed text, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResultRow {
    pub fields: Vec<(String, Option<String>)>,
}

impl SearchResultRow {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn accession_number(&self) -> Option<&str> {
        self.get("accessionnumber")
    }

    pub fn uri(&self) -> Option<&str> {
        self.get("uri")
    }

    fn set(&mut self, name: String, value: Option<String>) {
        match self.fields.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }
}

pub fn parse_search_results(xml: &str) -> Result<Vec<SearchResultRow>, FormatError> {
    let mut reader = Reader::from_str(xml);
    let mut rows = Vec::new();
    let mut current: Option<SearchResultRow> = None;
    let mut field: Option<(String, String)> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| FormatError::Decode(format!("search results: {err}")))?;
        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "result" {
                    current = Some(SearchResultRow::default());
                } else if current.is_some() && field.is_none() {
                    field = Some((name, String::new()));
                }
            }
            Event::Empty(e) => {
                if let Some(row) = current.as_mut() {
                    if field.is_none() {
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        row.set(name, None);
                    }
                }
            }
            Event::Text(e) => {
                if let Some((_, text)) = field.as_mut() {
                    let unescaped = e
                        .unescape()
                        .map_err(|err| FormatError::Decode(format!("search results: {err}")))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(e) => {
                if let Some((_, text)) = field.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                let name = e.name();
                let name = name.as_ref();
                if name == b"result" {
                    if let Some(row) = current.take() {
                        rows.push(row);
                    }
                    field = None;
                } else if field.as_ref().is_some_and(|(open, _)| open.as_bytes() == name) {
                    if let (Some((key, text)), Some(row)) = (field.take(), current.as_mut()) {
                        let trimmed = text.trim();
                        row.set(key, (!trimmed.is_empty()).then(|| trimmed.to_string()));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}
