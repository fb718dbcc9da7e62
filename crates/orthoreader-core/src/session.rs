//! One open document and its narration, driven by commands.

use crate::bookmark::{BookmarkStore, Bookmarks};
use crate::config::AppConfig;
use crate::document::Document;
use crate::extract::TextExtractor;
use crate::library::{Library, scan_library};
use crate::narration::{NarrationEngine, NarrationEvent, UtteranceId, resolve_voice};
use crate::now_playing::{NowPlaying, NowPlayingSurface, RemoteCommand};
use crate::playback::{PlaybackController, PlaybackState, PlaybackView};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The single user-visible message slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Truncated { max_chars: usize, max_words: usize },
    LoadFailed { message: String },
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Truncated {
                max_chars,
                max_words,
            } => format!(
                "This document is very long; only the first {max_chars} characters \
                 (up to {max_words} words) will be read."
            ),
            Notice::LoadFailed { message } => message.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReaderSnapshot {
    pub source_path: Option<String>,
    pub title: String,
    pub author: String,
    pub playback: PlaybackView,
    /// Text of the spoken group, for the highlight.
    pub highlighted_text: Option<String>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    GetSnapshot,
    Open { path: PathBuf },
    Play,
    Pause,
    TogglePlayPause,
    Seek { group_idx: usize },
    SeekFraction { fraction: f64 },
    SelectGroup { group_idx: usize },
    Restart,
    ReplayFromStart,
    LeaveDocument,
    DismissNotice,
}

impl SessionCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "reader_get_snapshot",
            Self::Open { .. } => "reader_open",
            Self::Play => "reader_play",
            Self::Pause => "reader_pause",
            Self::TogglePlayPause => "reader_toggle_play_pause",
            Self::Seek { .. } => "reader_seek",
            Self::SeekFraction { .. } => "reader_seek_fraction",
            Self::SelectGroup { .. } => "reader_select_group",
            Self::Restart => "reader_restart",
            Self::ReplayFromStart => "reader_replay_from_start",
            Self::LeaveDocument => "reader_leave_document",
            Self::DismissNotice => "reader_dismiss_notice",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub action: &'static str,
    pub snapshot: ReaderSnapshot,
}

pub struct ReaderSession {
    config: AppConfig,
    extractor: Box<dyn TextExtractor>,
    controller: PlaybackController,
    source_path: Option<PathBuf>,
    notice: Option<Notice>,
}

impl ReaderSession {
    pub fn new(
        config: AppConfig,
        extractor: Box<dyn TextExtractor>,
        engine: Box<dyn NarrationEngine>,
        store: Box<dyn BookmarkStore>,
        surface: Box<dyn NowPlayingSurface>,
    ) -> Self {
        let config = config.sanitized();
        let voice = resolve_voice(
            &engine.available_voices(),
            &config.voice_preferences,
            &config.fallback_locale,
        );
        let controller = PlaybackController::new(
            engine,
            Bookmarks::new(store),
            NowPlaying::new(surface),
            voice,
            config.speech_rate,
        );
        Self {
            config,
            extractor,
            controller,
            source_path: None,
            notice: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn library(&self) -> Library {
        scan_library(Path::new(&self.config.library_dir))
    }

    pub fn document(&self) -> Option<&Document> {
        self.controller.document()
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn apply_command(&mut self, command: SessionCommand) -> SessionEvent {
        let action = command.action();
        match command {
            SessionCommand::GetSnapshot => {}
            SessionCommand::Open { path } => self.open(&path),
            SessionCommand::Play => self.controller.play(),
            SessionCommand::Pause => self.controller.pause(),
            SessionCommand::TogglePlayPause => self.controller.toggle_play_pause(),
            SessionCommand::Seek { group_idx } => self.controller.seek(group_idx),
            SessionCommand::SeekFraction { fraction } => self.controller.seek_fraction(fraction),
            SessionCommand::SelectGroup { group_idx } => self.controller.select_group(group_idx),
            SessionCommand::Restart => self.controller.restart(),
            SessionCommand::ReplayFromStart => self.controller.replay_from_start(),
            SessionCommand::LeaveDocument => self.leave_document(),
            SessionCommand::DismissNotice => self.notice = None,
        }
        SessionEvent {
            action,
            snapshot: self.snapshot(),
        }
    }

    /// Extract, tokenize and group a document, replacing the current one.
    /// Failure leaves the session idle with nothing loaded and a message set.
    pub fn open(&mut self, path: &Path) {
        let text = match self.extractor.extract(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), "Failed to load document: {err}");
                self.controller.discard_document();
                self.source_path = None;
                self.notice = Some(Notice::LoadFailed {
                    message: err.to_string(),
                });
                return;
            }
        };

        let document = Document::from_path(
            path,
            &text,
            self.config.text_limits(),
            self.config.group_size,
        );
        self.notice = document.truncated().then(|| Notice::Truncated {
            max_chars: self.config.max_chars,
            max_words: self.config.max_words,
        });
        info!(
            path = %path.display(),
            groups = document.group_count(),
            truncated = document.truncated(),
            "Opened document"
        );
        self.controller.load_document(document);
        self.source_path = Some(path.to_path_buf());
    }

    /// Return to the library: stops narration and forgets the bookmark.
    pub fn leave_document(&mut self) {
        self.controller.close_document();
        self.source_path = None;
        self.notice = None;
    }

    /// Must be called on the thread that owns the session.
    pub fn handle_engine_event(&mut self, utterance: UtteranceId, event: NarrationEvent) {
        self.controller.handle_engine_event(utterance, event);
    }

    pub fn handle_remote_command(&mut self, command: RemoteCommand) {
        self.controller.handle_remote_command(command);
    }

    pub fn snapshot(&self) -> ReaderSnapshot {
        let playback = self.controller.view();
        let document = self.controller.document();
        let highlighted_text = playback
            .spoken_group
            .and_then(|group_idx| document.and_then(|doc| doc.group_text(group_idx)))
            .map(str::to_string);
        ReaderSnapshot {
            source_path: self
                .source_path
                .as_ref()
                .map(|path| path.display().to_string()),
            title: document.map(|doc| doc.title.clone()).unwrap_or_default(),
            author: document.map(|doc| doc.author.clone()).unwrap_or_default(),
            playback,
            highlighted_text,
            notice: self.notice.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookmark::{DocumentKey, MemoryBookmarkStore};
    use crate::error::{ReaderError, ReaderResult};
    use crate::narration::Voice;
    use crate::now_playing::testing::RecordingSurface;
    use crate::playback::testing::RecordingEngine;
    use std::collections::HashMap;

    /// Serves canned text per path; unknown paths fail like a broken PDF.
    struct CannedExtractor(HashMap<PathBuf, String>);

    impl TextExtractor for CannedExtractor {
        fn extract(&self, path: &Path) -> ReaderResult<String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| ReaderError::Extraction {
                    path: path.to_path_buf(),
                    message: "not a PDF".to_string(),
                })
        }
    }

    const GREEK: &str = "LibraryPDFs/Anon/Greek.pdf";
    const TEXT: &str = "alpha beta gamma delta epsilon zeta eta theta iota kappa";

    struct Harness {
        session: ReaderSession,
        engine: RecordingEngine,
        store: MemoryBookmarkStore,
    }

    fn harness(config: AppConfig, docs: &[(&str, String)]) -> Harness {
        let engine = RecordingEngine {
            voices: vec![Voice {
                id: "daniel".to_string(),
                locale: "en-GB".to_string(),
            }],
            ..RecordingEngine::default()
        };
        let store = MemoryBookmarkStore::new();
        let extractor = CannedExtractor(
            docs.iter()
                .map(|(path, text)| (PathBuf::from(path), text.clone()))
                .collect(),
        );
        let session = ReaderSession::new(
            config,
            Box::new(extractor),
            Box::new(engine.clone()),
            Box::new(store.clone()),
            Box::new(RecordingSurface::default()),
        );
        Harness {
            session,
            engine,
            store,
        }
    }

    fn small_groups() -> AppConfig {
        AppConfig {
            group_size: 2,
            ..AppConfig::default()
        }
    }

    #[test]
    fn open_reports_title_author_and_groups() {
        let mut h = harness(AppConfig::default(), &[(GREEK, TEXT.to_string())]);

        let event = h.session.apply_command(SessionCommand::Open {
            path: PathBuf::from(GREEK),
        });

        assert_eq!(event.action, "reader_open");
        assert_eq!(event.snapshot.title, "Greek");
        assert_eq!(event.snapshot.author, "Anon");
        assert_eq!(event.snapshot.playback.group_count, 2);
        assert_eq!(event.snapshot.playback.state, PlaybackState::Idle);
        assert_eq!(event.snapshot.notice, None);
    }

    #[test]
    fn oversized_document_sets_truncation_notice() {
        let long = "word ".repeat(30_000);
        let mut h = harness(AppConfig::default(), &[(GREEK, long)]);

        let event = h.session.apply_command(SessionCommand::Open {
            path: PathBuf::from(GREEK),
        });

        assert!(matches!(event.snapshot.notice, Some(Notice::Truncated { .. })));
        assert_eq!(h.session.document().unwrap().text().chars().count(), 100_000);

        let dismissed = h.session.apply_command(SessionCommand::DismissNotice);
        assert_eq!(dismissed.snapshot.notice, None);
    }

    #[test]
    fn failed_open_returns_to_safe_state() {
        let mut h = harness(small_groups(), &[(GREEK, TEXT.to_string())]);
        h.session.apply_command(SessionCommand::Open {
            path: PathBuf::from(GREEK),
        });
        h.session.apply_command(SessionCommand::Play);

        let event = h.session.apply_command(SessionCommand::Open {
            path: PathBuf::from("LibraryPDFs/Anon/Broken.pdf"),
        });

        assert_eq!(event.snapshot.playback.state, PlaybackState::Idle);
        assert_eq!(event.snapshot.playback.group_count, 0);
        assert_eq!(event.snapshot.source_path, None);
        match event.snapshot.notice {
            Some(Notice::LoadFailed { message }) => assert!(message.contains("not a PDF")),
            other => panic!("unexpected notice {other:?}"),
        }
    }

    #[test]
    fn failed_open_keeps_previous_bookmark() {
        let mut h = harness(small_groups(), &[(GREEK, TEXT.to_string())]);
        h.session.apply_command(SessionCommand::Open {
            path: PathBuf::from(GREEK),
        });
        h.session.apply_command(SessionCommand::Seek { group_idx: 3 });
        let key = DocumentKey::from_path(Path::new(GREEK));
        assert_eq!(h.store.get(&key).unwrap(), Some(3));

        h.session.apply_command(SessionCommand::Open {
            path: PathBuf::from("LibraryPDFs/Anon/Broken.pdf"),
        });
        assert_eq!(h.store.get(&key).unwrap(), Some(3));

        let reopened = h.session.apply_command(SessionCommand::Open {
            path: PathBuf::from(GREEK),
        });
        assert_eq!(reopened.snapshot.playback.resume_offer, Some(3));
    }

    #[test]
    fn narration_highlights_spoken_group() {
        let mut h = harness(small_groups(), &[(GREEK, TEXT.to_string())]);
        h.session.apply_command(SessionCommand::Open {
            path: PathBuf::from(GREEK),
        });
        h.session.apply_command(SessionCommand::Play);
        let (utterance, text) = h.engine.last_spoken().unwrap();
        assert_eq!(text, TEXT);

        h.session.handle_engine_event(
            utterance,
            NarrationEvent::WillSpeakRange {
                location: 31,
                length: 4,
            },
        );

        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.playback.spoken_group, Some(2));
        assert_eq!(snapshot.highlighted_text.as_deref(), Some("epsilon zeta"));
    }

    #[test]
    fn leaving_then_reopening_offers_no_resume() {
        let mut h = harness(small_groups(), &[(GREEK, TEXT.to_string())]);
        h.session.apply_command(SessionCommand::Open {
            path: PathBuf::from(GREEK),
        });
        h.session.apply_command(SessionCommand::Seek { group_idx: 3 });
        let key = DocumentKey::from_path(Path::new(GREEK));
        assert_eq!(h.store.get(&key).unwrap(), Some(3));

        let left = h.session.apply_command(SessionCommand::LeaveDocument);
        assert_eq!(left.snapshot.title, "");
        assert_eq!(h.store.get(&key).unwrap(), None);

        let reopened = h.session.apply_command(SessionCommand::Open {
            path: PathBuf::from(GREEK),
        });
        assert_eq!(reopened.snapshot.playback.resume_offer, None);
    }

    #[test]
    fn reopening_after_relaunch_offers_resume() {
        let mut h = harness(small_groups(), &[(GREEK, TEXT.to_string())]);
        let key = DocumentKey::from_path(Path::new(GREEK));
        h.store.clone().set(&key, 2).unwrap();

        let event = h.session.apply_command(SessionCommand::Open {
            path: PathBuf::from(GREEK),
        });
        assert_eq!(event.snapshot.playback.resume_offer, Some(2));

        let replay = h.session.apply_command(SessionCommand::ReplayFromStart);
        assert_eq!(replay.snapshot.playback.resume_offer, None);
        assert_eq!(replay.snapshot.playback.spoken_group, Some(0));
    }

    #[test]
    fn remote_pause_reaches_controller() {
        let mut h = harness(small_groups(), &[(GREEK, TEXT.to_string())]);
        h.session.apply_command(SessionCommand::Open {
            path: PathBuf::from(GREEK),
        });
        h.session.apply_command(SessionCommand::TogglePlayPause);
        assert_eq!(h.session.state(), PlaybackState::Speaking);

        h.session.handle_remote_command(RemoteCommand::Pause);
        assert_eq!(h.session.state(), PlaybackState::SpeakingPaused);
    }
}
