use crate::tokenizer::TextLimits;
use serde::Deserialize;

pub const MIN_SPEECH_RATE: f32 = 0.1;
pub const MAX_SPEECH_RATE: f32 = 3.0;

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize, PartialEq)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "crate::config::defaults::default_max_words")]
    pub max_words: usize,
    #[serde(default = "crate::config::defaults::default_group_size")]
    pub group_size: usize,
    #[serde(default = "crate::config::defaults::default_speech_rate")]
    pub speech_rate: f32,
    #[serde(default = "crate::config::defaults::default_voice_preferences")]
    pub voice_preferences: Vec<String>,
    #[serde(default = "crate::config::defaults::default_fallback_locale")]
    pub fallback_locale: String,
    #[serde(default = "crate::config::defaults::default_library_dir")]
    pub library_dir: String,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            max_chars: crate::config::defaults::default_max_chars(),
            max_words: crate::config::defaults::default_max_words(),
            group_size: crate::config::defaults::default_group_size(),
            speech_rate: crate::config::defaults::default_speech_rate(),
            voice_preferences: crate::config::defaults::default_voice_preferences(),
            fallback_locale: crate::config::defaults::default_fallback_locale(),
            library_dir: crate::config::defaults::default_library_dir(),
            cache_dir: crate::config::defaults::default_cache_dir(),
            log_level: crate::config::defaults::default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn text_limits(&self) -> TextLimits {
        TextLimits {
            max_chars: self.max_chars,
            max_words: self.max_words,
        }
    }

    /// Keep runtime values in bounds regardless of where they came from.
    pub fn sanitized(mut self) -> Self {
        self.group_size = self.group_size.max(1);
        self.speech_rate = if self.speech_rate.is_finite() {
            self.speech_rate.clamp(MIN_SPEECH_RATE, MAX_SPEECH_RATE)
        } else {
            crate::config::defaults::default_speech_rate()
        };
        self
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
