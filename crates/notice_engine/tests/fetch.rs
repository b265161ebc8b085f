use std::sync::{Arc, Mutex};
use std::time::Duration;

use notice_engine::{
    read_local, EngineEvent, FailureKind, FetchSettings, Fetcher, JobProgress, NullProgressSink,
    ProgressSink, ReqwestFetcher, Stage,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[tokio::test]
async fn fetcher_returns_bytes_and_emits_progress() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc.html"))
        .and(header("user-agent", "notice-test/1.0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<pre>ok</pre>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        user_agent: "notice-test/1.0".into(),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let sink = TestSink::default();
    let url = format!("{}/doc.html", server.uri());

    let output = fetcher.fetch(7, &url, &sink).await.expect("fetch ok");
    assert_eq!(output.metadata.original_url, url);
    assert_eq!(output.metadata.redirect_count, 0);
    assert_eq!(output.bytes, b"<pre>ok</pre>");
    assert!(output
        .metadata
        .content_type
        .unwrap()
        .starts_with("text/html"));

    let stages: Vec<(u64, Stage)> = sink
        .take()
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::Progress(JobProgress { job_id, stage, .. }) => Some((job_id, stage)),
            _ => None,
        })
        .collect();
    assert!(stages.contains(&(7, Stage::Fetching)));
}

#[tokio::test]
async fn non_success_status_is_http_status_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let err = fetcher
        .fetch(1, &format!("{}/missing.html", server.uri()), &NullProgressSink)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn slow_response_is_timeout_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<pre>late</pre>", "text/html")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(100),
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let err = fetcher
        .fetch(1, &format!("{}/slow.html", server.uri()), &NullProgressSink)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![b'x'; 2048], "application/pdf"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_bytes: 1024,
        ..FetchSettings::default()
    };
    let fetcher = ReqwestFetcher::new(settings);
    let err = fetcher
        .fetch(1, &format!("{}/big.pdf", server.uri()), &NullProgressSink)
        .await
        .unwrap_err();
    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 1024, .. }));
}

#[tokio::test]
async fn disallowed_content_type_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/image.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 4], "image/png"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let err = fetcher
        .fetch(1, &format!("{}/image.pdf", server.uri()), &NullProgressSink)
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "image/png".into()
        }
    );
}

#[tokio::test]
async fn invalid_url_is_reported_before_any_request() {
    let fetcher = ReqwestFetcher::new(FetchSettings::default());
    let err = fetcher
        .fetch(1, "http//not a url", &NullProgressSink)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn missing_local_file_is_io_failure() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.html");
    let err = read_local(missing.to_str().unwrap(), 1024).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
}
