use std::process::ExitCode;

use locale_sync::{load_locale_set, load_override_document};
use locale_sync_mt::config::{self, SyncConfig};
use locale_sync_mt::{DocumentOutcome, MtError, Synchronizer, TerminalProgress};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// `--debug` always wins; otherwise `RUST_LOG` applies, falling back to `info`
fn log_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn init_logging(debug: bool) {
    let filter = log_filter(debug);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(config: &SyncConfig, cancel: &CancellationToken) -> Result<bool, MtError> {
    let mut set = load_locale_set(&config.dir, &config.source_file)?;
    let overrides = match &config.override_path {
        Some(path) => Some(load_override_document(path)?),
        None => None,
    };

    println!("📝 source: {} records", set.source.len());
    if let Some(overrides) = &overrides {
        println!("📌 overrides: {} records", overrides.len());
    }
    for (path, e) in &set.skipped {
        eprintln!("⚠️  skipped {}: {}", path.display(), e);
    }
    println!("🌐 Generating locale files:");

    let pool = config.build_pool()?;
    let progress = TerminalProgress;
    let mut synchronizer = Synchronizer::new(&pool, config.options).with_progress(&progress);
    if let Some(overrides) = &overrides {
        synchronizer = synchronizer.with_overrides(overrides);
    }

    let report = synchronizer
        .run(&set.source, &mut set.targets, cancel)
        .await?;

    for outcome in &report.documents {
        if let DocumentOutcome::Failed { code, error, .. } = outcome {
            warn!("{} was not updated: {}", code, error);
        }
    }
    println!(
        "🍌 {} written, {} failed, {} skipped",
        report.succeeded(),
        report.failed(),
        set.skipped.len()
    );
    if report.aborted {
        let remaining = set.targets.len() - report.documents.len();
        eprintln!("🛑 aborted after first failure, {} documents not processed", remaining);
    }

    Ok(report.failed() == 0)
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = config::command().get_matches();
    let config = match SyncConfig::from_matches(&matches, |name| std::env::var(name).ok()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(config.debug);
    debug!("Configuration: {:?}", config);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling");
            on_signal.cancel();
        }
    });

    match run(&config, &cancel).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(MtError::Cancelled) => {
            eprintln!("\n🛑 cancelled");
            ExitCode::from(130)
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_overrides_rust_log() {
        // Independent of any RUST_LOG set for the test process
        assert_eq!(log_filter(true).to_string(), "debug");
    }
}
