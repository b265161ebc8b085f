use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use notice_engine::{
    export_digest_report, export_document, DocumentResolver, EngineEvent, EngineHandle,
    ExportOptions, JobFailure, JobId, JobOutcome, JobRequest,
};
use notice_logging::{notice_debug, notice_error, notice_info, notice_warn};

use crate::cli::Command;
use crate::config::AppConfig;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A queued job and the label its export should carry.
struct Planned {
    request: JobRequest,
    label: Option<String>,
}

pub fn run(command: Command, config: &AppConfig, config_path: &Path) -> anyhow::Result<()> {
    match command {
        Command::Resolve { locators, print } => {
            let plan = locators
                .into_iter()
                .map(|locator| Planned {
                    request: JobRequest::Resolve(locator),
                    label: None,
                })
                .collect();
            run_plan(config, plan, print)
        }
        Command::Digest { pages, label } => {
            let plan = pages
                .into_iter()
                .map(|page| Planned {
                    request: JobRequest::Digest(page),
                    label: label.clone(),
                })
                .collect();
            run_plan(config, plan, false)
        }
        Command::Record { locator } => {
            let resolver = resolver(config)?;
            let record = runtime()?.block_on(resolver.resolve_record(&locator))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Command::Part21 { listing, resolve } => {
            let resolver = resolver(config)?;
            let index = runtime()?.block_on(resolver.part21_index(&listing))?;
            for entry in &index.entries {
                println!(
                    "{}\t{}\t{}\t{}",
                    entry.log_no,
                    entry.report_date,
                    entry.notifier,
                    entry.link.as_deref().unwrap_or("-")
                );
            }
            if !resolve {
                return Ok(());
            }
            let plan = index
                .entries
                .iter()
                .filter_map(|entry| {
                    let link = entry.link.clone()?;
                    Some(Planned {
                        request: JobRequest::Resolve(link),
                        label: Some(entry.log_no.clone()),
                    })
                })
                .collect();
            run_plan(config, plan, false)
        }
        Command::Search { locator } => {
            let resolver = resolver(config)?;
            let rows = runtime()?.block_on(resolver.search_results(&locator))?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
            Ok(())
        }
        Command::WriteConfig => {
            config.save(config_path)?;
            notice_info!("Wrote configuration to {}", config_path.display());
            Ok(())
        }
    }
}

fn resolver(config: &AppConfig) -> anyhow::Result<DocumentResolver> {
    Ok(DocumentResolver::new(config.fetch_settings(), config.cfr_set()?))
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("starting async runtime")
}

/// Runs every planned job on the engine and exports (or prints) each result.
fn run_plan(config: &AppConfig, plan: Vec<Planned>, print: bool) -> anyhow::Result<()> {
    let total = plan.len();
    let engine = EngineHandle::new(config.engine_config()?).context("starting engine")?;
    let mut labels = Vec::with_capacity(total);
    for (idx, planned) in plan.into_iter().enumerate() {
        engine.enqueue(idx as JobId, planned.request);
        labels.push(planned.label);
    }

    let mut failed = 0usize;
    let mut finished = 0usize;
    while finished < total {
        let event = match engine.poll_event(POLL_INTERVAL) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(gone) => anyhow::bail!("{gone} with {} of {total} jobs unfinished", total - finished),
        };
        match event {
            EngineEvent::Progress(progress) => {
                notice_debug!("job {} {:?}", progress.job_id, progress.stage);
            }
            EngineEvent::JobCompleted { job_id, result } => {
                finished += 1;
                let label = labels.get(job_id as usize).cloned().flatten();
                if let Err(err) = handle_outcome(config, result, label, print) {
                    notice_error!("job {job_id}: {err:#}");
                    failed += 1;
                }
            }
        }
    }

    notice_info!("{} of {total} jobs succeeded", total - failed);
    anyhow::ensure!(failed == 0, "{failed} of {total} jobs failed");
    Ok(())
}

fn handle_outcome(
    config: &AppConfig,
    result: Result<JobOutcome, JobFailure>,
    label: Option<String>,
    print: bool,
) -> anyhow::Result<()> {
    let options = ExportOptions {
        label,
        fetched_utc: Utc::now().to_rfc3339(),
        write_manifest: true,
    };
    match result? {
        JobOutcome::Document(document) => {
            if print {
                println!("==> {} ({})", document.source_url, document.source_kind);
                println!("{}", document.text);
            } else {
                export_document(&config.output_dir, &document, &options)?;
            }
        }
        JobOutcome::Digest { source_url, report } => {
            if report.dropped_trailing {
                notice_warn!("{source_url}: trailing record dropped as truncated");
            }
            let summary = export_digest_report(&config.output_dir, &source_url, &report, &options)?;
            println!(
                "{source_url}: {} records, {} failures -> {}",
                summary.record_count,
                summary.failure_count,
                summary.output_path.display()
            );
        }
    }
    Ok(())
}
