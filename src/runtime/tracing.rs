/// Initializes structured logging for the application.
///
/// The filter comes from `RUST_LOG` when set and falls back to `default_level`
/// otherwise (usually [`LoggingConfig::level`](super::LoggingConfig::level)):
///
/// - `RUST_LOG=info` - borrows, returns, saves and race summaries
/// - `RUST_LOG=debug` - every catalog write, failed attempt and journal line
/// - `RUST_LOG=library_catalog::coordinator=debug` - only the coordinator
///
/// Output is compact and omits module paths; the structured fields
/// (`actor`, `title`, `usage`, ...) carry the context instead.
///
/// Calling it more than once is harmless, which lets tests call it freely.
pub fn setup_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();

    if installed.is_err() {
        tracing::debug!("Tracing already initialized");
    }
}
