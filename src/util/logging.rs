use tracing_subscriber::EnvFilter;

/// Initialize the logging system with tracing.
///
/// `RUST_LOG` takes precedence when set; otherwise the `verbose` flag
/// controls whether debug logs are shown.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("skybridge=debug,warn")
        } else {
            EnvFilter::new("skybridge=info,warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
