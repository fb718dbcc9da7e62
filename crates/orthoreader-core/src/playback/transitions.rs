use super::state::{PlaybackCore, PlaybackState};
use crate::document::Document;
use crate::narration::{NarrationEvent, UtteranceId};
use crate::position;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaybackEvent {
    Start { group_idx: usize },
    Pause,
    Resume,
    Seek { group_idx: usize },
    Restart,
    LeaveDocument,
    Engine {
        utterance: UtteranceId,
        event: NarrationEvent,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaybackAction {
    Speak { utterance: UtteranceId, offset: usize },
    PauseEngine,
    ResumeEngine,
    StopEngine,
    SaveBookmark { group_idx: usize },
    ClearBookmark,
    PublishPlaying,
    PublishPaused,
    ClearNowPlaying,
}

pub(crate) fn transition(
    core: &mut PlaybackCore,
    document: Option<&Document>,
    event: PlaybackEvent,
) -> Vec<PlaybackAction> {
    match event {
        PlaybackEvent::Start { group_idx } | PlaybackEvent::Seek { group_idx } => {
            on_seek(core, document, group_idx)
        }
        PlaybackEvent::Pause => on_pause(core),
        PlaybackEvent::Resume => on_resume(core),
        PlaybackEvent::Restart => on_restart(core),
        PlaybackEvent::LeaveDocument => on_leave_document(core),
        PlaybackEvent::Engine { utterance, event } => {
            on_engine_event(core, document, utterance, event)
        }
    }
}

fn clamp_group(document: Option<&Document>, group_idx: usize) -> Option<usize> {
    let count = document.map(Document::group_count).unwrap_or(0);
    if count == 0 {
        return None;
    }
    Some(group_idx.min(count - 1))
}

fn on_seek(
    core: &mut PlaybackCore,
    document: Option<&Document>,
    group_idx: usize,
) -> Vec<PlaybackAction> {
    let Some(target) = clamp_group(document, group_idx) else {
        warn!(group_idx, "Ignoring seek: no narratable text loaded");
        return Vec::new();
    };
    if !core.is_active() {
        return start_speaking(core, document, target);
    }

    info!(target, "Seek requested during narration; stopping current utterance");
    let mut actions = Vec::new();
    if !core.stopping {
        core.stopping = true;
        actions.push(PlaybackAction::StopEngine);
    }
    core.pending_seek = Some(target);
    actions.push(PlaybackAction::SaveBookmark { group_idx: target });
    actions
}

fn start_speaking(
    core: &mut PlaybackCore,
    document: Option<&Document>,
    group_idx: usize,
) -> Vec<PlaybackAction> {
    let Some(offset) = document.and_then(|doc| doc.group_start_offset(group_idx)) else {
        return Vec::new();
    };
    core.utterance = core.utterance.next();
    core.state = PlaybackState::Speaking;
    core.stopping = false;
    core.pending_seek = None;
    core.resume_offer = None;
    core.substring_start = offset;
    core.position.spoken_group = Some(group_idx);
    info!(
        group_idx,
        offset,
        utterance = %core.utterance,
        "Starting narration"
    );
    vec![
        PlaybackAction::Speak {
            utterance: core.utterance,
            offset,
        },
        PlaybackAction::SaveBookmark { group_idx },
        PlaybackAction::PublishPlaying,
    ]
}

fn on_pause(core: &mut PlaybackCore) -> Vec<PlaybackAction> {
    if core.state != PlaybackState::Speaking || core.stopping {
        return Vec::new();
    }
    info!("Pausing narration");
    core.state = PlaybackState::SpeakingPaused;
    vec![PlaybackAction::PauseEngine, PlaybackAction::PublishPaused]
}

fn on_resume(core: &mut PlaybackCore) -> Vec<PlaybackAction> {
    if core.state != PlaybackState::SpeakingPaused || core.stopping {
        return Vec::new();
    }
    info!("Resuming narration");
    core.state = PlaybackState::Speaking;
    vec![PlaybackAction::ResumeEngine, PlaybackAction::PublishPlaying]
}

fn on_restart(core: &mut PlaybackCore) -> Vec<PlaybackAction> {
    let mut actions = Vec::new();
    if core.is_active() {
        actions.push(PlaybackAction::StopEngine);
    }
    core.invalidate_utterance();
    core.position.spoken_group = None;
    core.resume_offer = None;
    info!("Narration reset to the beginning");
    actions.push(PlaybackAction::ClearNowPlaying);
    actions
}

fn on_leave_document(core: &mut PlaybackCore) -> Vec<PlaybackAction> {
    let mut actions = Vec::new();
    if core.is_active() {
        actions.push(PlaybackAction::StopEngine);
    }
    core.invalidate_utterance();
    core.position.clear();
    core.resume_offer = None;
    core.substring_start = 0;
    info!("Leaving document");
    actions.push(PlaybackAction::ClearBookmark);
    actions.push(PlaybackAction::ClearNowPlaying);
    actions
}

fn on_engine_event(
    core: &mut PlaybackCore,
    document: Option<&Document>,
    utterance: UtteranceId,
    event: NarrationEvent,
) -> Vec<PlaybackAction> {
    if utterance != core.utterance || !core.is_active() {
        debug!(
            %utterance,
            current = %core.utterance,
            ?event,
            "Ignoring stale narration callback"
        );
        return Vec::new();
    }

    match event {
        NarrationEvent::WillSpeakRange { location, .. } => {
            if core.stopping {
                debug!(location, "Ignoring range callback while stopping");
                return Vec::new();
            }
            let Some(doc) = document else {
                return Vec::new();
            };
            match core
                .position
                .apply_range(location, core.substring_start, doc.spans(), doc.layout())
            {
                Some(group_idx) => {
                    debug!(group_idx, location, "Spoken group advanced");
                    vec![PlaybackAction::SaveBookmark { group_idx }]
                }
                None => Vec::new(),
            }
        }
        NarrationEvent::Paused => {
            if core.state == PlaybackState::Speaking && !core.stopping {
                core.state = PlaybackState::SpeakingPaused;
                return vec![PlaybackAction::PublishPaused];
            }
            Vec::new()
        }
        NarrationEvent::Continued => {
            if core.state == PlaybackState::SpeakingPaused && !core.stopping {
                core.state = PlaybackState::Speaking;
                return vec![PlaybackAction::PublishPlaying];
            }
            Vec::new()
        }
        NarrationEvent::Finished | NarrationEvent::Cancelled => {
            core.stopping = false;
            if let Some(target) = core.pending_seek.take() {
                debug!(target, "Utterance ended; consuming pending seek");
                core.state = PlaybackState::Idle;
                return start_speaking(core, document, target);
            }
            info!(?event, "Narration ended");
            core.state = PlaybackState::Idle;
            core.position.spoken_group = None;
            vec![PlaybackAction::ClearNowPlaying]
        }
    }
}

/// Tap-to-jump target on the progress indicator.
pub(crate) fn seek_target_for_fraction(document: Option<&Document>, fraction: f64) -> Option<usize> {
    position::fraction_to_group(fraction, document.map(Document::group_count).unwrap_or(0))
}
