use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Installs the tracing subscriber. Only active when `RUST_LOG` is set,
/// e.g. `RUST_LOG=runtime=trace`. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}
