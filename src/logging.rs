use crate::config::AppConfig;
use tracing_subscriber::EnvFilter;

/// The filter directive `config` asks for: `LOG_LEVEL` when set, otherwise
/// `debug` in development and `info` everywhere else.
pub fn directive(config: &AppConfig) -> String {
    match &config.log_level {
        Some(level) if !level.trim().is_empty() => level.trim().to_ascii_lowercase(),
        _ if config.is_development() => "debug".to_string(),
        _ => "info".to_string(),
    }
}

/// Installs the global fmt subscriber. Returns `false` if one was already
/// installed, which is expected in tests.
pub fn init(config: &AppConfig) -> bool {
    let filter = EnvFilter::try_new(directive(config)).unwrap_or_else(|err| {
        eprintln!("invalid LOG_LEVEL, falling back to info: {err}");
        EnvFilter::new("info")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive() {
        let mut config = AppConfig::default();
        assert_eq!(directive(&config), "info");

        config.environment = "development".into();
        assert_eq!(directive(&config), "debug");

        config.log_level = Some("WARN".into());
        assert_eq!(directive(&config), "warn");
    }
}
