//! Logging handle owned by the binary.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use glens_core::errors::LensError;
use tracing::Dispatch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Builds a dispatch writing to stderr and to `log_path`.
///
/// The handle is installed by the caller with a scoped default; nothing global
/// is touched here.
pub fn build_dispatch(log_path: &Path) -> Result<Dispatch, LensError> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).map_err(|err| LensError::output("log-dir-create", parent, err))?;
    }
    let file = File::create(log_path).map_err(|err| LensError::output("log-create", log_path, err))?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        );
    Ok(Dispatch::new(subscriber))
}
