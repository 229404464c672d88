use crate::utils::toml_config::ServerConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines go. Stdio MCP servers must keep stdout free for the
/// protocol, so they log to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    Stderr,
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logging(server: &ServerConfig, verbose: bool, target: LogTarget) {
    let fallback = if verbose { "debug" } else { server.log_level.as_str() };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let registry = tracing_subscriber::registry().with(env_filter);
    let json = server.log_format.eq_ignore_ascii_case("json");

    let result = match (json, target) {
        (true, LogTarget::Stdout) => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        (true, LogTarget::Stderr) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        (false, LogTarget::Stdout) => registry.with(tracing_subscriber::fmt::layer()).try_init(),
        (false, LogTarget::Stderr) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
