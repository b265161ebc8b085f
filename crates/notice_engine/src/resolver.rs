use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use notice_core::{
    AssembledRecord, CanonicalCfrSet, DigestPage, DigestParser, DigestReport, FormatError,
};
use notice_logging::{notice_debug, notice_info, notice_warn};

use crate::decode::{decode_markup, ByteOrigin};
use crate::extract::{Extractor, ReportPageExtractor};
use crate::fetch::{read_local, FetchSettings, Fetcher, NullProgressSink, ProgressSink, ReqwestFetcher};
use crate::links::{PackageLinkFinder, PACKAGE_LINK_SELECTOR};
use crate::part21::Part21Index;
use crate::pdf::pdf_text;
use crate::search::{parse_search_results, SearchResultRow};
use crate::source::{DocumentSource, Location};
use crate::{EngineEvent, FetchOutput, JobId, JobProgress, RawDocument, ResolveError, Stage};

/// Turns a locator into plain text, whatever shape the document has.
pub struct DocumentResolver {
    fetcher: Arc<dyn Fetcher>,
    extractor: Box<dyn Extractor>,
    links: PackageLinkFinder,
    digest: DigestParser,
    max_bytes: u64,
    max_concurrent_fetches: usize,
}

impl DocumentResolver {
    pub fn new(settings: FetchSettings, cfr_set: Arc<CanonicalCfrSet>) -> Self {
        let fetcher = Arc::new(ReqwestFetcher::new(settings.clone()));
        Self::with_fetcher(fetcher, &settings, cfr_set)
    }

    pub fn with_fetcher(
        fetcher: Arc<dyn Fetcher>,
        settings: &FetchSettings,
        cfr_set: Arc<CanonicalCfrSet>,
    ) -> Self {
        Self {
            fetcher,
            extractor: Box::new(ReportPageExtractor),
            links: PackageLinkFinder::new(),
            digest: DigestParser::new(cfr_set),
            max_bytes: settings.max_bytes,
            max_concurrent_fetches: settings.max_concurrent_fetches.max(1),
        }
    }

    pub async fn resolve(&self, locator: &str) -> Result<RawDocument, ResolveError> {
        self.resolve_job(0, locator, &NullProgressSink).await
    }

    pub async fn resolve_job(
        &self,
        job_id: JobId,
        locator: &str,
        sink: &dyn ProgressSink,
    ) -> Result<RawDocument, ResolveError> {
        let source = DocumentSource::classify(locator)?;
        let source_kind = source.kind();
        notice_debug!("job {job_id}: {locator} classified as {source_kind}");

        let text = match &source {
            DocumentSource::Html(location) => {
                let markup = self.load_markup(job_id, location, sink).await?;
                progress(sink, job_id, Stage::Extracting);
                self.extractor.extract(&markup)?.text
            }
            DocumentSource::Pdf(location) => {
                let output = self.load(job_id, location, sink).await?;
                progress(sink, job_id, Stage::Extracting);
                pdf_text(&output.bytes)
            }
            DocumentSource::Package(location) => self.package_text(job_id, location, sink).await?,
            DocumentSource::DigestRecord { page, record_id } => {
                let digest = self.load_digest_page(job_id, page, sink).await?;
                progress(sink, job_id, Stage::Extracting);
                digest.record_text(record_id)?
            }
        };

        progress(sink, job_id, Stage::Done);
        Ok(RawDocument {
            source_url: locator.trim().to_string(),
            source_kind,
            text,
        })
    }

    /// Resolves a `…#enNNNNN` locator all the way to a parsed record.
    pub async fn resolve_record(&self, locator: &str) -> Result<AssembledRecord, ResolveError> {
        let DocumentSource::DigestRecord { page, record_id } = DocumentSource::classify(locator)?
        else {
            return Err(ResolveError::UnknownDocumentType(locator.to_string()));
        };
        let digest = self.load_digest_page(0, &page, &NullProgressSink).await?;
        let span = digest.span(&record_id)?;
        self.digest
            .parse_span(span)
            .map_err(|source| ResolveError::Record { record_id, source })
    }

    /// Parses every record of a digest page.
    pub async fn resolve_digest(&self, page_locator: &str) -> Result<DigestReport, ResolveError> {
        self.resolve_digest_job(0, page_locator, &NullProgressSink).await
    }

    pub async fn resolve_digest_job(
        &self,
        job_id: JobId,
        page_locator: &str,
        sink: &dyn ProgressSink,
    ) -> Result<DigestReport, ResolveError> {
        let location = Location::parse(page_locator.trim());
        let digest = self.load_digest_page(job_id, &location, sink).await?;
        progress(sink, job_id, Stage::Parsing);
        let report = self.digest.parse_spans(digest.spans());
        progress(sink, job_id, Stage::Done);
        Ok(report)
    }

    /// Reads a yearly Part 21 listing; entry links feed back into [`Self::resolve`].
    pub async fn part21_index(&self, listing_locator: &str) -> Result<Part21Index, ResolveError> {
        let location = Location::parse(listing_locator.trim());
        let markup = self.load_markup(0, &location, &NullProgressSink).await?;
        Ok(Part21Index::parse(&markup, location.as_str())?)
    }

    pub async fn search_results(&self, locator: &str) -> Result<Vec<SearchResultRow>, ResolveError> {
        let location = Location::parse(locator.trim());
        let markup = self.load_markup(0, &location, &NullProgressSink).await?;
        Ok(parse_search_results(&markup)?)
    }

    async fn load(
        &self,
        job_id: JobId,
        location: &Location,
        sink: &dyn ProgressSink,
    ) -> Result<FetchOutput, ResolveError> {
        progress(sink, job_id, Stage::Fetching);
        let result = match location {
            Location::Remote(url) => self.fetcher.fetch(job_id, url, sink).await,
            Location::Local(path) => read_local(path, self.max_bytes).await,
        };
        result.map_err(|err| ResolveError::fetch(location.as_str(), err))
    }

    async fn load_markup(
        &self,
        job_id: JobId,
        location: &Location,
        sink: &dyn ProgressSink,
    ) -> Result<String, ResolveError> {
        let output = self.load(job_id, location, sink).await?;
        let origin = match location {
            Location::Remote(_) => ByteOrigin::Remote {
                content_type: output.metadata.content_type.as_deref(),
            },
            Location::Local(_) => ByteOrigin::LocalFile,
        };
        Ok(decode_markup(&output.bytes, origin).text)
    }

    async fn load_digest_page(
        &self,
        job_id: JobId,
        location: &Location,
        sink: &dyn ProgressSink,
    ) -> Result<DigestPage, ResolveError> {
        let markup = self.load_markup(job_id, location, sink).await?;
        let page = DigestPage::parse(&markup)?;
        notice_info!("{location}: digest holds {} records", page.spans().len());
        Ok(page)
    }

    /// Member PDFs are fetched through a bounded pool; texts keep link order.
    /// A failed member fails the package once every sibling has settled.
    async fn package_text(
        &self,
        job_id: JobId,
        location: &Location,
        sink: &dyn ProgressSink,
    ) -> Result<String, ResolveError> {
        let index = self.load_markup(job_id, location, sink).await?;
        let members = self.links.find(&index, location.base_url().as_ref());
        if members.is_empty() {
            return Err(FormatError::MissingMarker(PACKAGE_LINK_SELECTOR.into()).into());
        }
        notice_info!("{location}: package lists {} documents", members.len());

        let results: Vec<Result<String, ResolveError>> = stream::iter(members)
            .map(|url| async move {
                let member = Location::from_url(&url);
                let output = self.load(job_id, &member, sink).await?;
                Ok::<_, ResolveError>(pdf_text(&output.bytes))
            })
            .buffered(self.max_concurrent_fetches)
            .collect()
            .await;

        progress(sink, job_id, Stage::Extracting);
        let mut texts = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(text) => texts.push(text),
                Err(err) => {
                    notice_warn!("{location}: package member failed: {err}");
                    return Err(err);
                }
            }
        }
        Ok(texts.join("\n"))
    }
}

fn progress(sink: &dyn ProgressSink, job_id: JobId, stage: Stage) {
    sink.emit(EngineEvent::Progress(JobProgress {
        job_id,
        stage,
        bytes: None,
    }));
}
