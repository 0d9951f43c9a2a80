use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global structured-logging subscriber.
///
/// `RUST_LOG` in the environment wins; otherwise the crate logs at
/// `default_level`. Calling this again once a subscriber is set is a no-op.
pub fn init(default_level: &str) {
    let result = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                default_level
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if result.is_ok() {
        tracing::info!("jobboard-rules v{} logging initialised", env!("CARGO_PKG_VERSION"));
    }
}
