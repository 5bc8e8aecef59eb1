use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Bunyan JSON lines on stdout, for the long-running server.
pub fn init_json(name: &str) {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(name.to_string(), std::io::stdout))
        .init();
}

/// Human-readable output, for command line tools.
pub fn init_fmt() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
