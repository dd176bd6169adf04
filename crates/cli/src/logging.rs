//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines go.
pub enum LogTarget {
    /// Headless commands: stderr, so stdout stays clean for results.
    Stderr,
    /// The TUI owns the screen, so logs are appended to a file.
    File(PathBuf),
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(verbose: bool, target: LogTarget) -> color_eyre::Result<()> {
    let default_filter = match (&target, verbose) {
        (_, true) => "agent_pipeline=debug,ap_core=debug,ap_tui=debug",
        (LogTarget::File(_), false) => "agent_pipeline=info,ap_core=info,ap_tui=info",
        (LogTarget::Stderr, false) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);

    match target {
        LogTarget::Stderr => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Arc::new(file)),
                )
                .init();
        }
    }

    Ok(())
}
