//! Diagnostic tracing for native hosts
//!
//! `BTCSESSION_LOG` picks the output format (`pretty`, `compact`, `json`),
//! `RUST_LOG` the filter. Separate from the session's user-facing log feed.

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "compact" | "text" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }

    pub fn from_env() -> Self {
        std::env::var("BTCSESSION_LOG")
            .ok()
            .and_then(|v| Self::from_str(&v))
            .unwrap_or_default()
    }
}

pub fn init_logging() {
    init_logging_with(LogFormat::from_env());
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging_with(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().with_target(false).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats() {
        assert_eq!(LogFormat::from_str("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::from_str(" pretty "), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::from_str("text"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::from_str("xml"), None);
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging_with(LogFormat::Compact);
        init_logging_with(LogFormat::Json);
    }
}
