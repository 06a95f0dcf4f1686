//! Batch orchestration - the per-document stage chain and the
//! concurrent run loop around it.
//!
//! Documents are independent until the merge barrier: each one runs
//! decode → text extraction → gate → structured extraction on its own
//! task, bounded by a semaphore. Outcomes are collected in input order,
//! then the whole batch merges, normalizes, and writes as one unit.

use std::sync::Arc;

use scraper::Html;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::decode::decode_payload;
use crate::error::{EtlError, Result, SourceError};
use crate::pipeline::extract::extract_document;
use crate::pipeline::merge::merge_records;
use crate::pipeline::normalize::normalize_records;
use crate::text::text_and_title;
use crate::traits::dedup::{DedupFilter, DedupGate, GateDecision};
use crate::traits::quality::TextQuality;
use crate::traits::rules::RuleStore;
use crate::traits::sink::RecordSink;
use crate::types::document::{DecodedDocument, RawDocument};
use crate::types::record::{FieldSource, SourcedRecord};
use crate::types::report::{BatchReport, Diagnostic};

/// Run-level knobs for one batch.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Upper bound on documents processed concurrently
    pub concurrency: usize,

    /// Cooperative cancellation for the run loop
    pub cancel: CancellationToken,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            cancel: CancellationToken::new(),
        }
    }
}

/// The extraction pipeline over its four external collaborators.
pub struct Pipeline {
    quality: Arc<dyn TextQuality>,
    filter: Arc<dyn DedupFilter>,
    rules: Arc<dyn RuleStore>,
    sink: Arc<dyn RecordSink>,
}

/// What became of one document.
enum DocOutcome {
    Extracted {
        partials: Vec<SourcedRecord>,
        diagnostics: Vec<Diagnostic>,
    },
    DecodeFailed(Diagnostic),
    LowValue,
    Duplicate,
}

impl Pipeline {
    /// Assemble a pipeline from its collaborators.
    pub fn new(
        quality: Arc<dyn TextQuality>,
        filter: Arc<dyn DedupFilter>,
        rules: Arc<dyn RuleStore>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            quality,
            filter,
            rules,
            sink,
        }
    }

    /// Process one batch of crawled documents end to end.
    ///
    /// Output row order follows first appearance of each url in the
    /// input, regardless of task completion order. Cancellation before
    /// any document is issued fails the batch; cancellation mid-run
    /// finishes the documents already issued and writes what they
    /// produced. The dedup filter is never persisted here; the caller
    /// does that once the sink write is known durable.
    pub async fn run(&self, documents: Vec<RawDocument>, config: &BatchConfig) -> Result<BatchReport> {
        let mut report = BatchReport::new();
        report.documents_in = documents.len();

        let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
        let mut handles = Vec::with_capacity(documents.len());
        for doc in documents {
            if config.cancel.is_cancelled() {
                if handles.is_empty() {
                    return Err(EtlError::Cancelled);
                }
                warn!(
                    issued = handles.len(),
                    "cancellation requested, finishing documents already issued"
                );
                break;
            }

            let url = doc.url.clone();
            let semaphore = Arc::clone(&semaphore);
            let quality = Arc::clone(&self.quality);
            let filter = Arc::clone(&self.filter);
            let rules = Arc::clone(&self.rules);
            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore never closed");
                process_document(doc, quality, filter, rules).await
            });
            handles.push((url, handle));
        }

        let mut partials = Vec::new();
        for (url, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome?,
                Err(err) => {
                    warn!(url = %url, error = %err, "document task failed");
                    report
                        .diagnostics
                        .push(Diagnostic::document(url, format!("task failed: {err}")));
                    continue;
                }
            };
            match outcome {
                DocOutcome::Extracted {
                    partials: mut contributed,
                    mut diagnostics,
                } => {
                    report.documents_extracted += 1;
                    report.diagnostics.append(&mut diagnostics);
                    partials.append(&mut contributed);
                }
                DocOutcome::DecodeFailed(diagnostic) => {
                    report.decode_failures += 1;
                    report.diagnostics.push(diagnostic);
                }
                DocOutcome::LowValue => report.low_value_skipped += 1,
                DocOutcome::Duplicate => report.duplicates_skipped += 1,
            }
        }

        let records = normalize_records(merge_records(partials));
        report.records_out = records.len();
        self.sink.write(&records).await.map_err(EtlError::Sink)?;

        info!(
            documents_in = report.documents_in,
            decode_failures = report.decode_failures,
            low_value_skipped = report.low_value_skipped,
            duplicates_skipped = report.duplicates_skipped,
            documents_extracted = report.documents_extracted,
            records_out = report.records_out,
            "batch complete"
        );
        Ok(report)
    }
}

/// Run one document through the per-document stages.
///
/// Parsed markup is never held across an await: the page is parsed once
/// for text extraction and again inside structured extraction, with the
/// async gate and rule lookup in between.
async fn process_document(
    doc: RawDocument,
    quality: Arc<dyn TextQuality>,
    filter: Arc<dyn DedupFilter>,
    rules: Arc<dyn RuleStore>,
) -> Result<DocOutcome> {
    let decoded = match decode_payload(&doc.content) {
        Ok(payload) => DecodedDocument {
            url: doc.url,
            html: payload.text,
            fetch_time: doc.fetch_time,
        },
        Err(err) => {
            warn!(url = %doc.url, error = %err, "dropping undecodable document");
            return Ok(DocOutcome::DecodeFailed(Diagnostic::document(
                doc.url,
                err.to_string(),
            )));
        }
    };

    let (text, title) = {
        let page = Html::parse_document(&decoded.html);
        text_and_title(Some(&page))
    };

    let gate = DedupGate::new(quality.as_ref(), filter.as_ref());
    match gate.evaluate(text.as_deref().unwrap_or_default()).await? {
        GateDecision::Process => {}
        GateDecision::LowValue => return Ok(DocOutcome::LowValue),
        GateDecision::Duplicate => return Ok(DocOutcome::Duplicate),
    }

    let mut diagnostics = Vec::new();
    let mut rule = None;
    if let Some(domain) = decoded.domain() {
        if rules.has_rule(&domain).await {
            match rules.load_rule(&domain).await {
                Ok(loaded) => rule = Some(loaded),
                Err(source) => {
                    let err = SourceError::SiteRule {
                        domain,
                        source,
                    };
                    warn!(url = %decoded.url, error = %err, "site rule unavailable");
                    diagnostics.push(Diagnostic::source(
                        &decoded.url,
                        FieldSource::SiteRule,
                        err.to_string(),
                    ));
                }
            }
        }
    }

    let mut outcome = extract_document(&decoded, text, title, rule.as_deref());
    diagnostics.append(&mut outcome.diagnostics);
    Ok(DocOutcome::Extracted {
        partials: outcome.partials,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    use crate::stores::memory::{MemoryDedupFilter, MemoryRuleStore, MemorySink};
    use crate::traits::quality::MinLengthQuality;

    fn document(url: &str, html: &str) -> RawDocument {
        RawDocument::new(url, STANDARD.encode(html)).with_fetch_time(1_700_000_000_000)
    }

    fn pipeline(sink: Arc<MemorySink>) -> Pipeline {
        Pipeline::new(
            Arc::new(MinLengthQuality::new(1)),
            Arc::new(MemoryDedupFilter::new()),
            Arc::new(MemoryRuleStore::new()),
            sink,
        )
    }

    #[tokio::test]
    async fn test_decode_failure_dropped_and_counted() {
        let sink = Arc::new(MemorySink::new());
        let docs = vec![
            document("https://a.example/ok", "<html><title>Ok</title><body>fine</body></html>"),
            RawDocument::new("https://a.example/bad", "&&& not base64 &&&"),
        ];

        let report = pipeline(Arc::clone(&sink))
            .run(docs, &BatchConfig::default())
            .await
            .unwrap();

        assert_eq!(report.documents_in, 2);
        assert_eq!(report.decode_failures, 1);
        assert_eq!(report.documents_extracted, 1);
        assert_eq!(report.records_out, 1);
        assert_eq!(sink.record_count(), 1);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].url, "https://a.example/bad");
    }

    #[tokio::test]
    async fn test_duplicate_text_skipped() {
        let sink = Arc::new(MemorySink::new());
        let html = "<html><body>identical listing body</body></html>";
        let docs = vec![
            document("https://a.example/1", html),
            document("https://a.example/2", html),
        ];

        let report = pipeline(Arc::clone(&sink))
            .run(docs, &BatchConfig::default())
            .await
            .unwrap();

        assert_eq!(report.duplicates_skipped, 1);
        assert_eq!(report.documents_extracted, 1);
        assert_eq!(report.records_out, 1);
    }

    #[tokio::test]
    async fn test_cancel_before_start_fails_batch() {
        let sink = Arc::new(MemorySink::new());
        let config = BatchConfig::default();
        config.cancel.cancel();

        let docs = vec![document("https://a.example/1", "<html><body>x</body></html>")];
        let err = pipeline(sink).run(docs, &config).await.unwrap_err();
        assert!(matches!(err, EtlError::Cancelled));
    }

    #[tokio::test]
    async fn test_output_order_follows_input_order() {
        let sink = Arc::new(MemorySink::new());
        let docs: Vec<RawDocument> = (0..20)
            .map(|i| {
                document(
                    &format!("https://a.example/item/{i}"),
                    &format!("<html><body>listing number {i}</body></html>"),
                )
            })
            .collect();

        let report = pipeline(Arc::clone(&sink))
            .run(docs, &BatchConfig { concurrency: 4, ..Default::default() })
            .await
            .unwrap();

        assert_eq!(report.records_out, 20);
        let urls: Vec<String> = sink.records().into_iter().map(|r| r.url).collect();
        let expected: Vec<String> = (0..20)
            .map(|i| format!("https://a.example/item/{i}"))
            .collect();
        assert_eq!(urls, expected);
    }
}
