use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Install the global subscriber
///
/// Filtering follows `RUST_LOG`, falling back to `info`. Records emitted
/// through the `log` crate are forwarded as well. Calling this twice is
/// harmless.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let res = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if let Err(e) = res {
        tracing::debug!("Logging already initialized: {e}");
    }
}
