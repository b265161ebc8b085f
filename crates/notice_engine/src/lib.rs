//! Notice engine: document resolution, fetch pipeline and export.
mod decode;
mod engine;
mod export;
mod extract;
mod fetch;
mod filename;
mod links;
mod part21;
mod pdf;
mod persist;
mod resolver;
mod search;
mod source;
mod types;

pub use decode::{decode_markup, ByteOrigin, DecodedText};
pub use engine::{EngineConfig, EngineHandle, JobRequest};
pub use export::{export_digest_report, export_document, ExportError, ExportOptions, ExportSummary};
pub use extract::{ExtractedContent, Extractor, ReportPageExtractor};
pub use fetch::{
    read_local, ChannelProgressSink, FetchSettings, Fetcher, NullProgressSink, ProgressSink,
    ReqwestFetcher, DEFAULT_USER_AGENT,
};
pub use filename::export_filename;
pub use links::{resolve_url, PackageLinkFinder, PACKAGE_LINK_SELECTOR};
pub use part21::{Part21Entry, Part21Index};
pub use pdf::{pdf_text, PDF_READ_ERROR};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use resolver::DocumentResolver;
pub use search::{parse_search_results, SearchResultRow, SEARCH_RESULT_FIELDS};
pub use source::{DocumentSource, Location};
pub use types::{
    EngineDisconnected, EngineEvent, FailureKind, FetchError, FetchMetadata, FetchOutput, JobFailure, JobId,
    JobOutcome, JobProgress, RawDocument, ResolveError, SourceKind, Stage,
};
