//! Level policy: decides whether a message at a given level is recorded

use super::config::LoggerConfig;
use super::log_level::LogLevel;

/// Pure function of the configuration; no side effects.
///
/// A disabled engine rejects everything. A category override, when present,
/// either rejects the category outright or replaces the global threshold.
pub fn should_log(config: &LoggerConfig, level: LogLevel, category: Option<&str>) -> bool {
    if !config.enabled {
        return false;
    }

    let threshold = match category.and_then(|name| config.categories.get(name)) {
        Some(overrides) if !overrides.enabled => return false,
        Some(overrides) => overrides.level.unwrap_or(config.level),
        None => config.level,
    };

    level >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CategoryConfig;

    #[test]
    fn test_global_threshold() {
        let config = LoggerConfig {
            level: LogLevel::Warn,
            ..Default::default()
        };
        assert!(!should_log(&config, LogLevel::Info, None));
        assert!(should_log(&config, LogLevel::Warn, None));
        assert!(should_log(&config, LogLevel::Fatal, None));
    }

    #[test]
    fn test_disabled_engine_rejects_all() {
        let config = LoggerConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(!should_log(&config, LogLevel::Fatal, None));
    }

    #[test]
    fn test_category_overrides() {
        let mut config = LoggerConfig {
            level: LogLevel::Info,
            ..Default::default()
        };
        config
            .categories
            .insert("Noisy".to_string(), CategoryConfig::disabled());
        config
            .categories
            .insert("Verbose".to_string(), CategoryConfig::with_level(LogLevel::Trace));
        config
            .categories
            .insert("Plain".to_string(), CategoryConfig::enabled());

        assert!(!should_log(&config, LogLevel::Fatal, Some("Noisy")));
        assert!(should_log(&config, LogLevel::Trace, Some("Verbose")));
        assert!(!should_log(&config, LogLevel::Debug, Some("Plain")));
        assert!(should_log(&config, LogLevel::Info, Some("Unknown")));
    }
}
