//! Tracing subscriber setup.

use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "agrotrace=info";

/// Install a JSON `fmt` subscriber filtered by `RUST_LOG`.
///
/// Returns `false` when a global subscriber was already installed, which is
/// expected when the host application or a test harness set one up first.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    match fmt().with_env_filter(filter).json().try_init() {
        Ok(()) => true,
        Err(error) => {
            warn!(%error, "tracing init skipped");
            false
        }
    }
}
