use notice_core::builtin_cfr_set;
use notice_engine::{DocumentResolver, FetchSettings, Part21Index, ResolveError};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PART21_LISTING: &str = r#"<html><body>
<table border="0"><tr><td>navigation</td></tr></table>
<table border="1">
<tr><th>Log No</th><th>Notifier</th><th>Description</th><th>Report Date</th><th>Event No. / Accession No.</th></tr>
<tr>
  <td><a href="2019/20190101.html">2019-01-00</a></td>
  <td>ACME   Valve Co.</td>
  <td>Defective
      relay</td>
  <td>01/02/2019</td>
  <td>53800</td>
</tr>
<tr>
  <td><a href="/docs/ML19010A100.html">2019-02-00</a></td>
  <td>Widget Corp</td>
  <td>Cracked weld</td>
  <td>01/15/2019</td>
  <td>ML19010A100</td>
</tr>
</table>
</body></html>"#;

#[test]
fn listing_rows_are_parsed_with_resolved_links() {
    let index = Part21Index::parse(PART21_LISTING, "https://www.example.gov/part21/").unwrap();
    assert_eq!(index.log_numbers(), vec!["2019-01-00", "2019-02-00"]);

    let first = index.get("2019-01-00").unwrap();
    assert_eq!(first.notifier, "ACME Valve Co.");
    assert_eq!(first.description, "Defective relay");
    assert_eq!(first.report_date, "01/02/2019");
    assert_eq!(first.event_or_accession, "53800");
    assert_eq!(
        first.link.as_deref(),
        Some("https://www.example.gov/part21/2019/20190101.html")
    );
    assert_eq!(
        index.get("2019-02-00").unwrap().link.as_deref(),
        Some("https://www.example.gov/docs/ML19010A100.html")
    );
    assert!(index.get("2020-01-00").is_none());
}

#[test]
fn listing_without_bordered_table_is_rejected() {
    assert!(Part21Index::parse("<table><tr><td>x</td></tr></table>", "https://x/").is_err());
}

#[tokio::test]
async fn resolver_reads_listing_and_search_results() {
    notice_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/part21/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PART21_LISTING, "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<search><resultset><result><accessionnumber>ML19010A100</accessionnumber><uri>https://x/ML19010A100.pdf</uri></result></resultset></search>",
            "application/xml",
        ))
        .mount(&server)
        .await;

    let resolver = DocumentResolver::new(FetchSettings::default(), builtin_cfr_set());
    let index = resolver
        .part21_index(&format!("{}/part21/", server.uri()))
        .await
        .unwrap();
    assert_eq!(index.entries.len(), 2);
    assert!(index.entries[0]
        .link
        .as_deref()
        .unwrap()
        .starts_with(&server.uri()));

    let rows = resolver
        .search_results(&format!("{}/search", server.uri()))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].accession_number(), Some("ML19010A100"));
    assert_eq!(rows[0].uri(), Some("https://x/ML19010A100.pdf"));

    let err = resolver
        .search_results(&format!("{}/nothing", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Fetch { .. }));
}
