//! Narration lifecycle: idle, speaking, speaking-paused.
//!
//! Inputs become `PlaybackEvent`s, the pure `transition` function updates
//! `PlaybackCore` and returns actions, and the controller runs those actions
//! against the engine, bookmark and now-playing ports. Engine callbacks must
//! be delivered on the same thread that owns the controller.

mod state;
mod transitions;

pub use state::PlaybackState;

use crate::bookmark::Bookmarks;
use crate::document::Document;
use crate::narration::{NarrationEngine, NarrationEvent, UtteranceId, Voice};
use crate::now_playing::{NowPlaying, RemoteCommand};
use serde::Serialize;
use state::PlaybackCore;
use tracing::{debug, info};
use transitions::{PlaybackAction, PlaybackEvent, seek_target_for_fraction, transition};

/// Read-only view of playback for rendering.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct PlaybackView {
    pub state: PlaybackState,
    pub spoken_group: Option<usize>,
    pub selected_group: Option<usize>,
    pub pending_seek: Option<usize>,
    pub resume_offer: Option<usize>,
    pub group_count: usize,
    pub progress_pct: f64,
}

pub struct PlaybackController {
    core: PlaybackCore,
    document: Option<Document>,
    engine: Box<dyn NarrationEngine>,
    bookmarks: Bookmarks,
    now_playing: NowPlaying,
    voice: Option<Voice>,
    rate: f32,
}

impl PlaybackController {
    pub fn new(
        engine: Box<dyn NarrationEngine>,
        bookmarks: Bookmarks,
        now_playing: NowPlaying,
        voice: Option<Voice>,
        rate: f32,
    ) -> Self {
        Self {
            core: PlaybackCore::default(),
            document: None,
            engine,
            bookmarks,
            now_playing,
            voice,
            rate,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn state(&self) -> PlaybackState {
        self.core.state
    }

    pub fn current_utterance(&self) -> UtteranceId {
        self.core.utterance
    }

    /// Replace the open document. A different document clears the previous
    /// one's bookmark; reopening the same one keeps it. Returns the resume
    /// offer read from the bookmark store.
    pub fn load_document(&mut self, document: Document) -> Option<usize> {
        let same_document = self
            .document
            .as_ref()
            .is_some_and(|current| current.key == document.key);
        if same_document {
            self.dispatch(PlaybackEvent::Restart);
            self.core.position.clear();
        } else if self.document.is_some() {
            self.leave_document();
        }

        let offer = self
            .bookmarks
            .load(&document.key)
            .filter(|group_idx| *group_idx < document.group_count());
        info!(
            document = %document.key,
            groups = document.group_count(),
            resume_offer = ?offer,
            "Loaded document for narration"
        );
        self.now_playing
            .set_metadata(document.title.clone(), document.author.clone());
        self.document = Some(document);
        self.core.resume_offer = offer;
        offer
    }

    pub fn start(&mut self, group_idx: usize) {
        self.dispatch(PlaybackEvent::Start { group_idx });
    }

    pub fn pause(&mut self) {
        self.dispatch(PlaybackEvent::Pause);
    }

    pub fn resume(&mut self) {
        self.dispatch(PlaybackEvent::Resume);
    }

    /// Resume when paused; otherwise start from the resume offer, the
    /// selected group, or the beginning.
    pub fn play(&mut self) {
        match self.core.state {
            PlaybackState::SpeakingPaused => self.resume(),
            PlaybackState::Speaking => {}
            PlaybackState::Idle => {
                let group_idx = self
                    .core
                    .resume_offer
                    .or(self.core.position.selected_group)
                    .unwrap_or(0);
                self.start(group_idx);
            }
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.core.state == PlaybackState::Speaking {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn seek(&mut self, group_idx: usize) {
        self.dispatch(PlaybackEvent::Seek { group_idx });
    }

    /// Jump to `floor(fraction × groups)`, clamped to the last group.
    pub fn seek_fraction(&mut self, fraction: f64) {
        if let Some(group_idx) = seek_target_for_fraction(self.document.as_ref(), fraction) {
            debug!(fraction, group_idx, "Progress indicator seek");
            self.seek(group_idx);
        }
    }

    /// Tap on a group's rendered text: selects it and seeks there.
    pub fn select_group(&mut self, group_idx: usize) {
        let count = self.document.as_ref().map(Document::group_count).unwrap_or(0);
        if count == 0 {
            return;
        }
        let group_idx = group_idx.min(count - 1);
        self.core.position.selected_group = Some(group_idx);
        self.seek(group_idx);
    }

    pub fn restart(&mut self) {
        self.dispatch(PlaybackEvent::Restart);
    }

    /// Stop, then narrate from the first group. The stored bookmark is left
    /// alone; only the in-session resume offer is dropped.
    pub fn replay_from_start(&mut self) {
        self.restart();
        self.start(0);
    }

    pub fn leave_document(&mut self) {
        self.dispatch(PlaybackEvent::LeaveDocument);
    }

    /// Close the document entirely, clearing its bookmark.
    pub fn close_document(&mut self) {
        if self.document.is_some() {
            self.leave_document();
        }
        self.document = None;
    }

    /// Stop and drop the document without touching its stored bookmark.
    pub fn discard_document(&mut self) {
        if self.document.is_some() {
            self.restart();
        }
        self.core.position.clear();
        self.document = None;
    }

    pub fn handle_engine_event(&mut self, utterance: UtteranceId, event: NarrationEvent) {
        self.dispatch(PlaybackEvent::Engine { utterance, event });
    }

    pub fn handle_remote_command(&mut self, command: RemoteCommand) {
        debug!(?command, "Remote transport command");
        match command {
            RemoteCommand::Play => self.play(),
            RemoteCommand::Pause => self.pause(),
            RemoteCommand::TogglePlayPause => self.toggle_play_pause(),
        }
    }

    pub fn view(&self) -> PlaybackView {
        let group_count = self.document.as_ref().map(Document::group_count).unwrap_or(0);
        let progress_pct = match (self.core.position.spoken_group, group_count) {
            (Some(group_idx), count) if count > 0 => (group_idx as f64 / count as f64) * 100.0,
            _ => 0.0,
        };
        PlaybackView {
            state: self.core.state,
            spoken_group: self.core.position.spoken_group,
            selected_group: self.core.position.selected_group,
            pending_seek: self.core.pending_seek,
            resume_offer: self.core.resume_offer,
            group_count,
            progress_pct,
        }
    }

    fn dispatch(&mut self, event: PlaybackEvent) {
        let actions = transition(&mut self.core, self.document.as_ref(), event);
        for action in actions {
            self.execute(action);
        }
    }

    fn execute(&mut self, action: PlaybackAction) {
        match action {
            PlaybackAction::Speak { utterance, offset } => {
                let Some(document) = self.document.as_ref() else {
                    return;
                };
                let text = document.suffix_from(offset);
                debug!(%utterance, offset, chars = text.len(), "Submitting text to engine");
                self.engine
                    .speak(utterance, text, self.voice.as_ref(), self.rate);
            }
            PlaybackAction::PauseEngine => self.engine.pause(),
            PlaybackAction::ResumeEngine => self.engine.resume(),
            PlaybackAction::StopEngine => self.engine.stop(),
            PlaybackAction::SaveBookmark { group_idx } => {
                if let Some(document) = self.document.as_ref() {
                    self.bookmarks.save(&document.key, group_idx);
                }
            }
            PlaybackAction::ClearBookmark => {
                if let Some(document) = self.document.as_ref() {
                    self.bookmarks.clear(&document.key);
                }
            }
            PlaybackAction::PublishPlaying => self.now_playing.playing(),
            PlaybackAction::PublishPaused => self.now_playing.paused(),
            PlaybackAction::ClearNowPlaying => self.now_playing.stopped(),
        }
    }
}
