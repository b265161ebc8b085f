mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{digest_page, CUT_OFF_RECORD, REACTOR_TRIP_RECORD};
use notice_core::builtin_cfr_set;
use notice_engine::{
    DocumentResolver, EngineConfig, EngineEvent, EngineHandle, FetchError, FetchOutput,
    FetchSettings, Fetcher, JobFailure, JobId, JobOutcome, JobRequest, ProgressSink, SourceKind,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Collects completions for `job_ids`, in whatever order the engine finishes them.
fn wait_for_jobs(
    engine: &EngineHandle,
    job_ids: &[JobId],
) -> HashMap<JobId, Result<JobOutcome, JobFailure>> {
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut results = HashMap::new();
    while results.len() < job_ids.len() {
        assert!(Instant::now() < deadline, "jobs {job_ids:?} did not complete");
        if let Some(EngineEvent::JobCompleted { job_id, result }) =
            engine.recv_timeout(Duration::from_millis(100))
        {
            if job_ids.contains(&job_id) {
                results.insert(job_id, result);
            }
        }
    }
    results
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_runs_resolve_and_digest_jobs() {
    notice_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/en.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            digest_page(&[REACTOR_TRIP_RECORD, CUT_OFF_RECORD]),
            "text/html",
        ))
        .mount(&server)
        .await;

    let engine = EngineHandle::new(EngineConfig::default()).unwrap();
    engine.enqueue(1, JobRequest::Resolve(format!("{}/en.html#en12345", server.uri())));
    engine.enqueue(2, JobRequest::Digest(format!("{}/en.html", server.uri())));

    let mut results = tokio::task::spawn_blocking(move || wait_for_jobs(&engine, &[1, 2]))
        .await
        .unwrap();
    let first = results.remove(&1).unwrap();
    let second = results.remove(&2).unwrap();

    match first.unwrap() {
        JobOutcome::Document(doc) => {
            assert_eq!(doc.source_kind, SourceKind::Digest);
            assert!(doc.text.contains("Reactor tripped."));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    match second.unwrap() {
        JobOutcome::Digest { report, .. } => {
            assert_eq!(report.records.len(), 1);
            assert!(report.dropped_trailing);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn stopped_engine_cancels_pending_jobs() {
    notice_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<pre>late</pre>", "text/html")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let engine = EngineHandle::new(EngineConfig::default()).unwrap();
    engine.enqueue(9, JobRequest::Resolve(format!("{}/slow.html", server.uri())));
    engine.stop();
    assert!(engine.is_stopped());

    let mut results = tokio::task::spawn_blocking(move || wait_for_jobs(&engine, &[9]))
        .await
        .unwrap();
    assert_eq!(results.remove(&9).unwrap(), Err(JobFailure::Cancelled));
}

/// Stands in for a parser or transport that blows up mid-job.
struct ExplodingFetcher;

#[async_trait::async_trait]
impl Fetcher for ExplodingFetcher {
    async fn fetch(
        &self,
        _job_id: JobId,
        url: &str,
        _sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, FetchError> {
        panic!("fetcher exploded on {url}");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn panicking_job_still_reports_completion() {
    notice_logging::initialize_for_tests();
    let settings = FetchSettings::default();
    let resolver =
        DocumentResolver::with_fetcher(Arc::new(ExplodingFetcher), &settings, builtin_cfr_set());
    let engine = EngineHandle::with_resolver(Arc::new(resolver), 2).unwrap();
    engine.enqueue(3, JobRequest::Resolve("https://example.invalid/report.pdf".into()));
    engine.enqueue(4, JobRequest::Resolve("https://example.invalid/other.docx".into()));

    let mut results = tokio::task::spawn_blocking(move || wait_for_jobs(&engine, &[3, 4]))
        .await
        .unwrap();
    let panicked = results.remove(&3).unwrap();
    let rejected = results.remove(&4).unwrap();

    assert!(matches!(panicked, Err(JobFailure::Panicked(_))), "{panicked:?}");
    assert!(matches!(rejected, Err(JobFailure::Resolve(_))), "{rejected:?}");
}

#[test]
fn idle_engine_polls_as_quiet_not_disconnected() {
    let engine = EngineHandle::new(EngineConfig::default()).unwrap();
    assert_eq!(engine.poll_event(Duration::from_millis(20)), Ok(None));
}
