//! Narration engine port and voice selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Epoch stamped on each utterance; callbacks carrying an older id are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl UtteranceId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Events an engine reports for an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationEvent {
    /// Byte range about to be spoken, relative to the submitted text.
    WillSpeakRange { location: usize, length: usize },
    Paused,
    Continued,
    Finished,
    /// Reported instead of `Finished` when the utterance was stopped.
    Cancelled,
}

impl NarrationEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NarrationEvent::Finished | NarrationEvent::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub locale: String,
}

/// Imperative side of a speech engine. Events flow back through whatever
/// channel the host wires up, tagged with the utterance id passed to `speak`.
pub trait NarrationEngine {
    fn available_voices(&self) -> Vec<Voice>;
    fn speak(&mut self, utterance: UtteranceId, text: &str, voice: Option<&Voice>, rate: f32);
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
}

/// Pick a voice by locale preference, then the fallback locale, else the
/// engine default (`None`).
pub fn resolve_voice(
    available: &[Voice],
    preferences: &[String],
    fallback_locale: &str,
) -> Option<Voice> {
    for locale in preferences
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(fallback_locale))
    {
        if let Some(voice) = available
            .iter()
            .find(|voice| voice.locale.eq_ignore_ascii_case(locale))
        {
            debug!(voice = %voice.id, locale = %voice.locale, "Selected narration voice");
            return Some(voice.clone());
        }
    }
    warn!(
        fallback_locale,
        "No preferred narration voice available; using engine default"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(id: &str, locale: &str) -> Voice {
        Voice {
            id: id.to_string(),
            locale: locale.to_string(),
        }
    }

    fn prefs(locales: &[&str]) -> Vec<String> {
        locales.iter().map(|locale| locale.to_string()).collect()
    }

    #[test]
    fn honours_preference_order() {
        let available = vec![voice("us", "en-US"), voice("au", "en-AU"), voice("gb", "en-GB")];
        let picked = resolve_voice(&available, &prefs(&["en-GB", "en-AU"]), "en-US");
        assert_eq!(picked.map(|v| v.id), Some("gb".to_string()));
    }

    #[test]
    fn falls_back_to_default_locale() {
        let available = vec![voice("us", "en-us"), voice("fr", "fr-FR")];
        let picked = resolve_voice(&available, &prefs(&["en-GB"]), "en-US");
        assert_eq!(picked.map(|v| v.id), Some("us".to_string()));
    }

    #[test]
    fn no_match_uses_engine_default() {
        let available = vec![voice("fr", "fr-FR")];
        assert_eq!(resolve_voice(&available, &prefs(&["en-GB"]), "en-US"), None);
        assert_eq!(resolve_voice(&[], &[], "en-US"), None);
    }

    #[test]
    fn only_finish_and_cancel_are_terminal() {
        assert!(NarrationEvent::Finished.is_terminal());
        assert!(NarrationEvent::Cancelled.is_terminal());
        assert!(!NarrationEvent::Paused.is_terminal());
        assert!(
            !NarrationEvent::WillSpeakRange {
                location: 0,
                length: 1
            }
            .is_terminal()
        );
    }
}
