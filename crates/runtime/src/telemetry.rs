//! Tracing subscriber setup for binaries and tests embedding the runtime.

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`, defaulting to INFO.
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
