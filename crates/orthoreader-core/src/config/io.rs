use super::models::AppConfig;
use super::tables::ConfigTables;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!("Parsed configuration from disk");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err:#}");
            AppConfig::default()
        }
    }
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let tables: ConfigTables = toml::from_str(contents).context("Parsing config tables")?;
    Ok(AppConfig::from(tables).sanitized())
}

pub fn serialize_config(config: &AppConfig) -> Result<String> {
    toml::to_string(&ConfigTables::from(config)).context("Serializing config tables")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.text_limits().max_chars, 100_000);
        assert_eq!(config.text_limits().max_words, 10_000);
        assert_eq!(config.group_size, 8);
    }

    #[test]
    fn tables_override_individual_fields() {
        let config = parse_config(
            r#"
            [reading]
            group_size = 4

            [speech]
            rate = 9.0
            voice_preferences = ["en-IE"]

            [logging]
            log_level = "warn"
            "#,
        )
        .unwrap();

        assert_eq!(config.group_size, 4);
        assert_eq!(config.max_words, 10_000);
        assert_eq!(config.speech_rate, 3.0);
        assert_eq!(config.voice_preferences, vec!["en-IE".to_string()]);
        assert_eq!(config.fallback_locale, "en-US");
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn zero_group_size_is_clamped() {
        let config = parse_config("[reading]\ngroup_size = 0\n").unwrap();
        assert_eq!(config.group_size, 1);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(parse_config("[reading\nmax_chars = ").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Path::new("/nonexistent/orthoreader/config.toml"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut config = AppConfig::default();
        config.library_dir = "Shelf".to_string();
        config.speech_rate = 1.5;
        let text = serialize_config(&config).unwrap();
        assert!(text.contains("[speech]"));
        assert_eq!(parse_config(&text).unwrap(), config);
    }
}
