use crate::narration::UtteranceId;
use crate::position::PositionTracker;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    Speaking,
    SpeakingPaused,
}

/// Everything the transition function reads and writes.
#[derive(Debug, Clone, Default)]
pub struct PlaybackCore {
    pub(crate) state: PlaybackState,
    pub(crate) position: PositionTracker,
    pub(crate) pending_seek: Option<usize>,
    pub(crate) utterance: UtteranceId,
    /// Document offset at which the current utterance's text begins.
    pub(crate) substring_start: usize,
    /// A stop was requested and its terminal callback has not arrived yet.
    pub(crate) stopping: bool,
    /// Bookmark read at load time, offered until narration starts.
    pub(crate) resume_offer: Option<usize>,
}

impl PlaybackCore {
    pub(crate) fn is_active(&self) -> bool {
        self.state != PlaybackState::Idle
    }

    /// Drop the current utterance so any late callback for it is stale.
    pub(crate) fn invalidate_utterance(&mut self) {
        self.utterance = self.utterance.next();
        self.stopping = false;
        self.pending_seek = None;
        self.state = PlaybackState::Idle;
    }
}
