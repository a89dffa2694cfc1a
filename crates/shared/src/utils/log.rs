use tracing_subscriber::{EnvFilter, prelude::*};

/// Installs the global subscriber. `LOG_FORMAT=json` switches the human
/// readable output to one JSON object per line.
pub fn init_logger(service_name: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=off"));

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_thread_names(true)
                    .with_ansi(true)
                    .pretty(),
            )
            .init();
    }

    tracing::info!(service = service_name, "logger initialized");
}
