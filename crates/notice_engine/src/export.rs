use std::path::{Path, PathBuf};

use notice_core::{DigestReport, NotificationRecord, UNIT_FIELD_NAMES};
use notice_logging::notice_info;
use serde::Serialize;

use crate::filename::export_filename;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::RawDocument;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Human label for the output file; derived from the source when absent.
    pub label: Option<String>,
    pub fetched_utc: String,
    pub write_manifest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub record_count: usize,
    pub failure_count: usize,
    pub output_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Serialize)]
struct ExportedRecord<'a> {
    record_id: &'a str,
    #[serde(flatten)]
    notification: &'a NotificationRecord,
    unit_vector: Vec<Option<String>>,
}

#[derive(Serialize)]
struct ExportedFailure<'a> {
    record_id: &'a str,
    error: String,
    trailing: bool,
}

#[derive(Serialize)]
struct Manifest<'a> {
    source_url: &'a str,
    fetched_utc: &'a str,
    records_file: String,
    record_count: usize,
    failure_count: usize,
    dropped_trailing: bool,
    unmatched_citations: usize,
    unit_fields: &'static [&'static str],
    failures: Vec<ExportedFailure<'a>>,
}

/// Writes the parsed records of one digest, plus a manifest next to them.
pub fn export_digest_report(
    output_dir: &Path,
    source_url: &str,
    report: &DigestReport,
    options: &ExportOptions,
) -> Result<ExportSummary, ExportError> {
    let writer = AtomicFileWriter::new(output_dir.to_path_buf())?;
    let records_file = export_filename(options.label.as_deref(), source_url, "json");

    let records: Vec<ExportedRecord<'_>> = report
        .records
        .iter()
        .map(|record| ExportedRecord {
            record_id: &record.record_id,
            notification: &record.notification,
            unit_vector: record.unit_vector(),
        })
        .collect();
    let output_path = writer.write_json(&records_file, &records)?;

    let manifest_path = if options.write_manifest {
        let manifest = Manifest {
            source_url,
            fetched_utc: &options.fetched_utc,
            records_file: records_file.clone(),
            record_count: report.records.len(),
            failure_count: report.failures.len(),
            dropped_trailing: report.dropped_trailing,
            unmatched_citations: report.unmatched_citations(),
            unit_fields: &UNIT_FIELD_NAMES,
            failures: report
                .failures
                .iter()
                .map(|failure| ExportedFailure {
                    record_id: &failure.record_id,
                    error: failure.error.to_string(),
                    trailing: failure.trailing,
                })
                .collect(),
        };
        let manifest_name = records_file.replace(".json", ".manifest.json");
        Some(writer.write_json(&manifest_name, &manifest)?)
    } else {
        None
    };

    notice_info!(
        "Exported {} records from {source_url} to {}",
        report.records.len(),
        output_path.display()
    );
    Ok(ExportSummary {
        record_count: report.records.len(),
        failure_count: report.failures.len(),
        output_path,
        manifest_path,
    })
}

#[derive(Serialize)]
struct ExportedDocument<'a> {
    #[serde(flatten)]
    document: &'a RawDocument,
    fetched_utc: &'a str,
}

/// Writes one resolved document as JSON.
pub fn export_document(
    output_dir: &Path,
    document: &RawDocument,
    options: &ExportOptions,
) -> Result<PathBuf, ExportError> {
    let writer = AtomicFileWriter::new(output_dir.to_path_buf())?;
    let filename = export_filename(options.label.as_deref(), &document.source_url, "json");
    let path = writer.write_json(
        &filename,
        &ExportedDocument {
            document,
            fetched_utc: &options.fetched_utc,
        },
    )?;
    notice_info!("Exported {} document to {}", document.source_kind, path.display());
    Ok(path)
}
