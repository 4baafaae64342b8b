//! Progress reporting for synchronization runs

use std::io::Write;

use locale_sync::LocaleDocument;

use crate::error::MtError;
use crate::synchronizer::DocumentReport;

/// Observer of a synchronization run
///
/// All methods default to doing nothing.
pub trait ProgressReporter: Send + Sync {
    /// A pass over `document` starts; `total` source keys will be processed
    fn document_started(&self, _document: &LocaleDocument, _total: usize) {}

    /// `done` of `total` source keys have been processed
    fn key_processed(&self, _document: &LocaleDocument, _done: usize, _total: usize) {}

    /// The pass over `document` ended
    fn document_finished(&self, _document: &LocaleDocument, _result: Result<&DocumentReport, &MtError>) {}
}

/// Reporter that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {}

/// Single-line terminal progress, rewritten in place per key
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalProgress;

impl ProgressReporter for TerminalProgress {
    fn key_processed(&self, document: &LocaleDocument, done: usize, total: usize) {
        print!("\r🔄 {}: {}/{}", document.path.display(), done, total);
        let _ = std::io::stdout().flush();
    }

    fn document_finished(&self, document: &LocaleDocument, result: Result<&DocumentReport, &MtError>) {
        match result {
            Ok(report) => println!(
                "\r✅ {}: {} translated, {} overridden, {} unchanged",
                document.path.display(),
                report.translated,
                report.overridden,
                report.unchanged
            ),
            Err(e) => println!("\r❌ {}: {}", document.path.display(), e),
        }
    }
}
