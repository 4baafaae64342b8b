//! Synchronizes target locale documents against a source document
//!
//! For every target document, each source key is classified (see
//! [`locale_sync::classify`]): stale or missing entries are translated
//! through the [`ClientPool`], pinned entries take their override value, and
//! everything else is left alone. Translations are requested one key at a
//! time, or in batches of up to `batch_size` keys where the i-th translation
//! is written back to the i-th key of the batch.
//!
//! A pass works on a copy of the target's entries. The document is only
//! updated, and only written to disk, when every request of the pass
//! succeeded.

use std::path::PathBuf;

use locale_sync::{FlatEntries, LocaleDocument, Need, OverrideMap, OverrideMode, classify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{MtError, MtResult};
use crate::pool::ClientPool;
use crate::progress::{ProgressReporter, SilentProgress};

/// What to do with the remaining documents after one fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the failure and go on with the next document
    #[default]
    Continue,
    /// Stop the run at the first failed document
    Abort,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// 0 translates key by key; N > 0 sends batches of at most N keys
    pub batch_size: usize,
    pub override_mode: OverrideMode,
    pub failure_policy: FailurePolicy,
}

/// Counters for one document pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentReport {
    pub code: String,
    pub path: PathBuf,
    pub translated: usize,
    pub overridden: usize,
    pub unchanged: usize,
    /// Source keys with an empty value
    pub skipped: usize,
    /// Backend calls issued, single or batch
    pub requests: usize,
}

impl DocumentReport {
    fn for_document(document: &LocaleDocument) -> Self {
        DocumentReport {
            code: document.code.clone(),
            path: document.path.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug)]
pub enum DocumentOutcome {
    Written(DocumentReport),
    Failed {
        code: String,
        path: PathBuf,
        error: MtError,
    },
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DocumentOutcome::Written(_))
    }
}

/// Outcomes of a run, in processing order
#[derive(Debug, Default)]
pub struct RunReport {
    pub documents: Vec<DocumentOutcome>,
    /// Set when [`FailurePolicy::Abort`] stopped the run before the last target
    pub aborted: bool,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.documents.iter().filter(|d| d.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.documents.len() - self.succeeded()
    }
}

/// Keys waiting for a batch request, with their source texts
struct PendingBatch<'s> {
    keys: Vec<&'s str>,
    texts: Vec<String>,
}

impl<'s> PendingBatch<'s> {
    fn with_capacity(capacity: usize) -> Self {
        PendingBatch {
            keys: Vec::with_capacity(capacity),
            texts: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, key: &'s str, text: &str) {
        self.keys.push(key);
        self.texts.push(text.to_string());
    }

    fn len(&self) -> usize {
        self.keys.len()
    }

    fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

pub struct Synchronizer<'a> {
    pool: &'a ClientPool,
    options: SyncOptions,
    overrides: Option<&'a OverrideMap>,
    progress: &'a dyn ProgressReporter,
}

impl<'a> Synchronizer<'a> {
    pub fn new(pool: &'a ClientPool, options: SyncOptions) -> Self {
        Synchronizer {
            pool,
            options,
            overrides: None,
            progress: &SilentProgress,
        }
    }

    pub fn with_overrides(mut self, overrides: &'a OverrideMap) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Bring `target` up to date with `source`, without writing it
    ///
    /// On error `target` is left exactly as it was.
    pub async fn sync_document(
        &self,
        source: &LocaleDocument,
        target: &mut LocaleDocument,
        cancel: &CancellationToken,
    ) -> MtResult<DocumentReport> {
        let (entries, report) = self.translate_entries(source, target, cancel).await?;
        target.entries = entries;
        Ok(report)
    }

    /// Compute the updated entries of `target` without touching it
    async fn translate_entries(
        &self,
        source: &LocaleDocument,
        target: &LocaleDocument,
        cancel: &CancellationToken,
    ) -> MtResult<(FlatEntries, DocumentReport)> {
        let total = source.len();
        let batch_size = self.options.batch_size;
        let language = target.display_name.clone();
        let mut entries = target.entries.clone();
        let mut report = DocumentReport::for_document(target);
        let mut pending = PendingBatch::with_capacity(batch_size);

        info!("Synchronizing {} ({}), {} source keys", target.path.display(), language, total);
        self.progress.document_started(target, total);

        for (done, (key, value)) in source.entries.iter().enumerate() {
            let need = classify(
                value,
                entries.get(key).map(String::as_str),
                key,
                self.overrides,
                self.options.override_mode,
            );
            debug!("{}: {} -> {:?}", target.code, key, need);

            match need {
                Need::Skip => report.skipped += 1,
                Need::Keep => report.unchanged += 1,
                Need::Override(pinned) => {
                    entries.insert(key.clone(), pinned.to_string());
                    report.overridden += 1;
                }
                Need::Translate if batch_size == 0 => {
                    let translated = self.pool.translate_one(value, &language, cancel).await?;
                    entries.insert(key.clone(), translated);
                    report.requests += 1;
                    report.translated += 1;
                }
                Need::Translate => {
                    pending.push(key, value);
                    if pending.len() >= batch_size {
                        self.flush(&mut pending, &mut entries, &language, &mut report, cancel)
                            .await?;
                    }
                }
            }

            self.progress.key_processed(target, done + 1, total);
        }

        if !pending.is_empty() {
            self.flush(&mut pending, &mut entries, &language, &mut report, cancel)
                .await?;
        }

        Ok((entries, report))
    }

    /// Send the pending keys as one batch and write the results back by position
    async fn flush(
        &self,
        pending: &mut PendingBatch<'_>,
        entries: &mut FlatEntries,
        language: &str,
        report: &mut DocumentReport,
        cancel: &CancellationToken,
    ) -> MtResult<()> {
        let translated = self
            .pool
            .translate_batch(&pending.texts, language, cancel)
            .await?;
        report.requests += 1;
        report.translated += translated.len();

        for (key, text) in pending.keys.drain(..).zip(translated) {
            entries.insert(key.to_string(), text);
        }
        pending.texts.clear();
        Ok(())
    }

    /// Synchronize `target` and write it to its path
    ///
    /// `target` is updated only once the file has been written, so a failed
    /// translation or a failed write leaves both the file and `target` as
    /// they were.
    pub async fn sync_and_write(
        &self,
        source: &LocaleDocument,
        target: &mut LocaleDocument,
        cancel: &CancellationToken,
    ) -> MtResult<DocumentReport> {
        let (entries, report) = self.translate_entries(source, target, cancel).await?;
        let updated = LocaleDocument {
            entries,
            ..target.clone()
        };
        locale_sync::write_document(&updated)?;
        *target = updated;
        Ok(report)
    }

    /// Synchronize and write every target, one after another
    ///
    /// A failed document is never written. Whether the next document is
    /// processed depends on [`SyncOptions::failure_policy`]: under `Abort` the
    /// failure is still recorded and the report comes back with `aborted`
    /// set. Cancellation always ends the run with [`MtError::Cancelled`].
    pub async fn run(
        &self,
        source: &LocaleDocument,
        targets: &mut [LocaleDocument],
        cancel: &CancellationToken,
    ) -> MtResult<RunReport> {
        let mut run = RunReport::default();

        for target in targets.iter_mut() {
            if cancel.is_cancelled() {
                return Err(MtError::Cancelled);
            }

            match self.sync_and_write(source, target, cancel).await {
                Ok(report) => {
                    info!(
                        "Wrote {}: {} translated, {} overridden, {} requests",
                        report.path.display(),
                        report.translated,
                        report.overridden,
                        report.requests
                    );
                    self.progress.document_finished(target, Ok(&report));
                    run.documents.push(DocumentOutcome::Written(report));
                }
                Err(MtError::Cancelled) => {
                    self.progress.document_finished(target, Err(&MtError::Cancelled));
                    return Err(MtError::Cancelled);
                }
                Err(e) => {
                    error!("Failed to synchronize {}: {}", target.path.display(), e);
                    self.progress.document_finished(target, Err(&e));
                    run.documents.push(DocumentOutcome::Failed {
                        code: target.code.clone(),
                        path: target.path.clone(),
                        error: e,
                    });
                    if self.options.failure_policy == FailurePolicy::Abort {
                        info!("Aborting run after failure on {}", target.path.display());
                        run.aborted = true;
                        break;
                    }
                }
            }
        }

        Ok(run)
    }
}
