use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use notice_core::{builtin_cfr_set, CanonicalCfrSet};
use notice_logging::{notice_debug, notice_error, notice_info};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::fetch::{ChannelProgressSink, FetchSettings};
use crate::resolver::DocumentResolver;
use crate::{EngineDisconnected, EngineEvent, JobFailure, JobId, JobOutcome, JobProgress, Stage};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fetch: FetchSettings,
    /// Jobs allowed to run at once; the rest wait in the queue.
    pub max_jobs: usize,
    pub cfr_set: Arc<CanonicalCfrSet>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            max_jobs: 4,
            cfr_set: builtin_cfr_set(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRequest {
    /// Resolve any locator to plain text.
    Resolve(String),
    /// Parse every record of a digest page.
    Digest(String),
}

enum EngineCommand {
    Enqueue { job_id: JobId, request: JobRequest },
}

/// Runs jobs on a background tokio runtime and reports back over a channel.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> std::io::Result<Self> {
        let resolver = Arc::new(DocumentResolver::new(config.fetch.clone(), config.cfr_set));
        Self::with_resolver(resolver, config.max_jobs)
    }

    pub fn with_resolver(resolver: Arc<DocumentResolver>, max_jobs: usize) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let permits = Arc::new(Semaphore::new(max_jobs.max(1)));
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let resolver = resolver.clone();
                let event_tx = event_tx.clone();
                let permits = permits.clone();
                let cancel = worker_cancel.clone();
                runtime.spawn(async move {
                    handle_command(resolver, permits, cancel, command, event_tx).await;
                });
            }
            notice_debug!("engine command channel closed; shutting down runtime");
            runtime.shutdown_timeout(Duration::from_secs(5));
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            cancel,
        })
    }

    pub fn enqueue(&self, job_id: JobId, request: JobRequest) {
        let _ = self.cmd_tx.send(EngineCommand::Enqueue { job_id, request });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Like [`Self::recv_timeout`], but tells a quiet engine (`Ok(None)`)
    /// apart from one whose worker has died.
    pub fn poll_event(&self, timeout: Duration) -> Result<Option<EngineEvent>, EngineDisconnected> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(EngineDisconnected),
        }
    }

    /// Cancels queued and running jobs; each still reports completion.
    pub fn stop(&self) {
        notice_info!("engine stop requested");
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

async fn handle_command(
    resolver: Arc<DocumentResolver>,
    permits: Arc<Semaphore>,
    cancel: CancellationToken,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Enqueue { job_id, request } => {
            let _ = event_tx.send(EngineEvent::Progress(JobProgress {
                job_id,
                stage: Stage::Queued,
                bytes: None,
            }));

            // Own task, so a panic surfaces as a JoinError instead of a lost job.
            let sink = ChannelProgressSink::new(event_tx.clone());
            let job = tokio::spawn(run_job(resolver, permits, job_id, request, sink));
            let abort = job.abort_handle();
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    abort.abort();
                    notice_debug!("job {job_id} cancelled");
                    Err(JobFailure::Cancelled)
                }
                joined = job => joined.unwrap_or_else(|err| {
                    notice_error!("job {job_id} panicked: {err}");
                    Err(JobFailure::Panicked(err.to_string()))
                }),
            };
            let _ = event_tx.send(EngineEvent::JobCompleted { job_id, result });
        }
    }
}

async fn run_job(
    resolver: Arc<DocumentResolver>,
    permits: Arc<Semaphore>,
    job_id: JobId,
    request: JobRequest,
    sink: ChannelProgressSink,
) -> Result<JobOutcome, JobFailure> {
    let _permit = permits.acquire().await.map_err(|_| JobFailure::Cancelled)?;
    match request {
        JobRequest::Resolve(locator) => {
            let document = resolver.resolve_job(job_id, &locator, &sink).await?;
            Ok(JobOutcome::Document(document))
        }
        JobRequest::Digest(locator) => {
            let report = resolver.resolve_digest_job(job_id, &locator, &sink).await?;
            Ok(JobOutcome::Digest {
                source_url: locator,
                report,
            })
        }
    }
}
