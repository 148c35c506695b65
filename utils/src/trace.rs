use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Installs a global fmt subscriber filtered by `RUST_LOG` (default `info`).
/// Returns `false` when a subscriber was already installed.
pub fn init_tracing() -> bool {
    if INITIALISED.set(()).is_err() {
        return false;
    }
    let filter: EnvFilter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}
