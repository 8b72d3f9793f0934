use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
///
/// Quiet mode keeps per-request HTTP lines and cache reconciliation out of
/// the output; verbose mode shows both.
pub fn default_directives(verbose: bool) -> String {
    if verbose {
        [
            "warn",
            "model_adapters=debug",
            "model_adapters::adapters::http=debug",
            "model_adapters::core::cache=debug",
        ]
        .join(",")
    } else {
        [
            "warn",
            "model_adapters=info",
            "model_adapters::adapters::http=warn",
            "model_adapters::core::cache=warn",
        ]
        .join(",")
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .json(), // 方便集中式日誌收集
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        assert!(EnvFilter::try_new(default_directives(true)).is_ok());
        assert!(EnvFilter::try_new(default_directives(false)).is_ok());
    }

    #[test]
    fn test_quiet_mode_silences_transport_and_cache() {
        let quiet = default_directives(false);

        assert!(quiet.contains("model_adapters=info"));
        assert!(quiet.contains("model_adapters::adapters::http=warn"));
        assert!(quiet.contains("model_adapters::core::cache=warn"));
        assert!(default_directives(true).contains("model_adapters::core::cache=debug"));
    }
}
