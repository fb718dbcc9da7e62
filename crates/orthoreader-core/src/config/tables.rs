use super::defaults;
use super::models::{AppConfig, LogLevel};
use serde::Deserialize;

/// On-disk layout of `conf/config.toml`.
#[derive(Debug, Clone, Deserialize, serde::Serialize, Default)]
pub(super) struct ConfigTables {
    #[serde(default)]
    reading: ReadingConfig,
    #[serde(default)]
    speech: SpeechConfig,
    #[serde(default)]
    library: LibraryConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            max_chars: tables.reading.max_chars,
            max_words: tables.reading.max_words,
            group_size: tables.reading.group_size,
            speech_rate: tables.speech.rate,
            voice_preferences: tables.speech.voice_preferences,
            fallback_locale: tables.speech.fallback_locale,
            library_dir: tables.library.library_dir,
            cache_dir: tables.library.cache_dir,
            log_level: tables.logging.log_level,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            reading: ReadingConfig {
                max_chars: config.max_chars,
                max_words: config.max_words,
                group_size: config.group_size,
            },
            speech: SpeechConfig {
                rate: config.speech_rate,
                voice_preferences: config.voice_preferences.clone(),
                fallback_locale: config.fallback_locale.clone(),
            },
            library: LibraryConfig {
                library_dir: config.library_dir.clone(),
                cache_dir: config.cache_dir.clone(),
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ReadingConfig {
    #[serde(default = "defaults::default_max_chars")]
    max_chars: usize,
    #[serde(default = "defaults::default_max_words")]
    max_words: usize,
    #[serde(default = "defaults::default_group_size")]
    group_size: usize,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        ReadingConfig {
            max_chars: defaults::default_max_chars(),
            max_words: defaults::default_max_words(),
            group_size: defaults::default_group_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct SpeechConfig {
    #[serde(default = "defaults::default_speech_rate")]
    rate: f32,
    #[serde(default = "defaults::default_voice_preferences")]
    voice_preferences: Vec<String>,
    #[serde(default = "defaults::default_fallback_locale")]
    fallback_locale: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        SpeechConfig {
            rate: defaults::default_speech_rate(),
            voice_preferences: defaults::default_voice_preferences(),
            fallback_locale: defaults::default_fallback_locale(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LibraryConfig {
    #[serde(default = "defaults::default_library_dir")]
    library_dir: String,
    #[serde(default = "defaults::default_cache_dir")]
    cache_dir: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        LibraryConfig {
            library_dir: defaults::default_library_dir(),
            cache_dir: defaults::default_cache_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}
