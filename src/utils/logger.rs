use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins; otherwise only this crate logs, at `level`.
fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(level)))
}

fn default_directive(level: &str) -> String {
    format!("appstore_client={}", level.trim().to_ascii_lowercase())
}

pub fn init_cli_logger(verbose: bool) {
    // stdout 保留給 JSON 輸出
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(crate_filter(if verbose { "debug" } else { "info" }))
        .with(layer)
        .init();
}

/// JSON lines on stderr, for environments that ship logs to a collector.
pub fn init_json_logger(level: &str) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .json()
        .with_current_span(false);

    tracing_subscriber::registry()
        .with(crate_filter(level))
        .with(layer)
        .init();
}
