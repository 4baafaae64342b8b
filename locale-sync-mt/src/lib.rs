//! Machine translation support for locale-sync
//!
//! This crate fills missing and stale entries of JSON locale documents by
//! asking a chat-completion backend for translations.
//!
//! # Workflow Example
//!
//! ```ignore
//! use locale_sync::load_locale_set;
//! use locale_sync_mt::{ClientPool, OpenAiProvider, SyncOptions, Synchronizer};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Load the source document and its translations
//!     let mut set = load_locale_set("locales".as_ref(), "en-US.json")?;
//!
//!     // 2. One client per API key, rotated round-robin
//!     let provider = OpenAiProvider::new(std::env::var("OPENAI_API_KEY")?)?;
//!     let pool = ClientPool::new(vec![std::sync::Arc::new(provider)], std::time::Duration::from_secs(10))?;
//!
//!     // 3. Translate what is missing or stale, in batches of 20 keys
//!     let options = SyncOptions { batch_size: 20, ..Default::default() };
//!     let report = Synchronizer::new(&pool, options)
//!         .run(&set.source, &mut set.targets, &CancellationToken::new())
//!         .await?;
//!
//!     println!("{} documents written", report.succeeded());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod mock;
pub mod openai;
pub mod pool;
pub mod progress;
pub mod synchronizer;
pub mod translator;

// Re-export main types for convenient access
pub use config::SyncConfig;
pub use error::{MtError, MtResult};
pub use mock::{MockCall, MockMode, MockTranslator};
pub use openai::OpenAiProvider;
pub use pool::ClientPool;
pub use progress::{ProgressReporter, SilentProgress, TerminalProgress};
pub use synchronizer::{
    DocumentOutcome, DocumentReport, FailurePolicy, RunReport, SyncOptions, Synchronizer,
};
pub use translator::MachineTranslator;
