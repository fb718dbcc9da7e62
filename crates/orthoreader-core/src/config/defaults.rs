pub(crate) fn default_max_chars() -> usize {
    100_000
}

pub(crate) fn default_max_words() -> usize {
    10_000
}

pub(crate) fn default_group_size() -> usize {
    crate::grouping::DEFAULT_GROUP_SIZE
}

pub(crate) fn default_speech_rate() -> f32 {
    1.0
}

pub(crate) fn default_voice_preferences() -> Vec<String> {
    ["en-GB", "en-AU", "en-IE", "en-ZA"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub(crate) fn default_fallback_locale() -> String {
    "en-US".to_string()
}

pub(crate) fn default_library_dir() -> String {
    "LibraryPDFs".to_string()
}

pub(crate) fn default_cache_dir() -> String {
    crate::cache::CACHE_DIR.to_string()
}

pub(crate) fn default_log_level() -> crate::config::LogLevel {
    crate::config::LogLevel::Info
}
