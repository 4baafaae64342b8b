//! Run configuration, built once at startup
//!
//! Flags come from the command line, credentials from the environment.
//! The resulting [`SyncConfig`] is passed by reference to whatever needs it;
//! nothing reads the environment after it has been built.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use locale_sync::OverrideMode;

use crate::error::{MtError, MtResult};
use crate::mock::{MockMode, MockTranslator};
use crate::openai::{DEFAULT_BASE_URL, OpenAiProvider};
use crate::pool::ClientPool;
use crate::synchronizer::{FailurePolicy, SyncOptions};
use crate::translator::MachineTranslator;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const API_KEYS_VAR: &str = "OPENAI_API_KEYS";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

pub const DEFAULT_DIR: &str = "locales";
pub const DEFAULT_SOURCE: &str = "en-US.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, PartialEq)]
pub struct SyncConfig {
    pub dir: PathBuf,
    pub source_file: String,
    pub override_path: Option<PathBuf>,
    pub options: SyncOptions,
    pub timeout: Duration,
    pub model: Option<String>,
    pub base_url: String,
    pub api_keys: Vec<String>,
    pub use_mock: bool,
    pub debug: bool,
}

impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("dir", &self.dir)
            .field("source_file", &self.source_file)
            .field("override_path", &self.override_path)
            .field("options", &self.options)
            .field("timeout", &self.timeout)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_keys", &format!("{} key(s)", self.api_keys.len()))
            .field("use_mock", &self.use_mock)
            .field("debug", &self.debug)
            .finish()
    }
}

/// Command-line definition of the `locale-sync` binary
pub fn command() -> Command {
    Command::new("locale-sync")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fill missing and stale entries of JSON locale files by machine translation")
        .arg(
            Arg::new("dir")
                .long("dir")
                .short('d')
                .help("Directory of locale files")
                .default_value(DEFAULT_DIR),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .help("Source locale file name inside --dir")
                .default_value(DEFAULT_SOURCE),
        )
        .arg(
            Arg::new("override")
                .long("override")
                .short('o')
                .help("Document of pinned values that replace translations"),
        )
        .arg(
            Arg::new("batch-size")
                .long("batch-size")
                .short('b')
                .help("Keys per translation request (0 translates one key per request)")
                .value_parser(value_parser!(usize))
                .default_value("0"),
        )
        .arg(
            Arg::new("override-mode")
                .long("override-mode")
                .help("Whether an override document disables re-translation of stale keys")
                .value_parser(["global", "per-key"])
                .default_value("global"),
        )
        .arg(
            Arg::new("fail-fast")
                .long("fail-fast")
                .help("Stop at the first document that fails instead of moving on")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Per-request timeout in seconds")
                .value_parser(value_parser!(u64))
                .default_value("10"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .short('m')
                .help("Chat model to use for every request"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .help("OpenAI-compatible API base URL"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .help("Use the mock translator instead of the API")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Verbose logging")
                .action(ArgAction::SetTrue),
        )
}

/// Collect API keys from `OPENAI_API_KEYS` (comma-separated) and `OPENAI_API_KEY`
fn collect_api_keys<F>(env: &F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut keys: Vec<String> = Vec::new();
    let candidates = env(API_KEYS_VAR)
        .into_iter()
        .flat_map(|list| {
            list.split(',')
                .map(|k| k.trim().to_string())
                .collect::<Vec<_>>()
        })
        .chain(env(API_KEY_VAR).map(|k| k.trim().to_string()));

    for key in candidates {
        if !key.is_empty() && !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}

impl SyncConfig {
    /// Build the configuration from parsed arguments and an environment lookup
    ///
    /// # Errors
    ///
    /// `ConfigurationError` when no API key is available and `--mock` is not set.
    pub fn from_matches<F>(matches: &ArgMatches, env: F) -> MtResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_mock = matches.get_flag("mock");
        let api_keys = collect_api_keys(&env);
        if api_keys.is_empty() && !use_mock {
            return Err(MtError::ConfigurationError(format!(
                "environment variable {} is empty (or set {} to a comma-separated list, or use --mock)",
                API_KEY_VAR, API_KEYS_VAR
            )));
        }

        let override_mode = match matches.get_one::<String>("override-mode").map(String::as_str) {
            Some("per-key") => OverrideMode::PerKey,
            _ => OverrideMode::Global,
        };
        let failure_policy = if matches.get_flag("fail-fast") {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Continue
        };

        let base_url = matches
            .get_one::<String>("base-url")
            .cloned()
            .or_else(|| env(BASE_URL_VAR))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(SyncConfig {
            dir: matches
                .get_one::<String>("dir")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR)),
            source_file: matches
                .get_one::<String>("source")
                .cloned()
                .unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            override_path: matches.get_one::<String>("override").map(PathBuf::from),
            options: SyncOptions {
                batch_size: matches.get_one::<usize>("batch-size").copied().unwrap_or(0),
                override_mode,
                failure_policy,
            },
            timeout: Duration::from_secs(
                matches
                    .get_one::<u64>("timeout")
                    .copied()
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            model: matches.get_one::<String>("model").cloned(),
            base_url,
            api_keys,
            use_mock,
            debug: matches.get_flag("debug"),
        })
    }

    /// Build the client pool: one API client per key, or a single mock
    pub fn build_pool(&self) -> MtResult<ClientPool> {
        let clients: Vec<Arc<dyn MachineTranslator>> = if self.use_mock {
            vec![Arc::new(MockTranslator::new(MockMode::Suffix))]
        } else {
            self.api_keys
                .iter()
                .map(|key| -> MtResult<Arc<dyn MachineTranslator>> {
                    let mut provider = OpenAiProvider::new(key.clone())?
                        .with_base_url(&self.base_url)
                        .with_timeout(self.timeout)?;
                    if let Some(model) = &self.model {
                        provider = provider.with_model(model);
                    }
                    Ok(Arc::new(provider))
                })
                .collect::<MtResult<Vec<_>>>()?
        };

        ClientPool::new(clients, self.timeout)
    }

    pub fn source_path(&self) -> PathBuf {
        self.dir.join(&self.source_file)
    }
}
