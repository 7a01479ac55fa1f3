use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber writing through the test harness. Filters come
/// from `RUST_LOG`, defaulting to everything this crate logs.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("settle=trace"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
