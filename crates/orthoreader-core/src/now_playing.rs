//! Mirrors playback state onto the system media controls.

use anyhow::Result;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct NowPlayingInfo {
    pub title: String,
    pub author: String,
    pub is_playing: bool,
    /// 1.0 while speaking, 0.0 while paused.
    pub playback_rate: f32,
}

/// Transport commands arriving from a lock screen or hardware button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Play,
    Pause,
    TogglePlayPause,
}

/// System-wide media control surface.
pub trait NowPlayingSurface {
    fn publish(&mut self, info: &NowPlayingInfo) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Side-effect sink: failures are logged and never reach playback.
pub struct NowPlaying {
    surface: Box<dyn NowPlayingSurface>,
    title: String,
    author: String,
}

impl NowPlaying {
    pub fn new(surface: Box<dyn NowPlayingSurface>) -> Self {
        Self {
            surface,
            title: String::new(),
            author: String::new(),
        }
    }

    pub fn set_metadata(&mut self, title: impl Into<String>, author: impl Into<String>) {
        self.title = title.into();
        self.author = author.into();
    }

    pub fn playing(&mut self) {
        self.publish(true);
    }

    pub fn paused(&mut self) {
        self.publish(false);
    }

    pub fn stopped(&mut self) {
        if let Err(err) = self.surface.clear() {
            warn!("Failed to clear now-playing info: {err}");
        } else {
            debug!("Cleared now-playing info");
        }
    }

    fn publish(&mut self, is_playing: bool) {
        let info = NowPlayingInfo {
            title: self.title.clone(),
            author: self.author.clone(),
            is_playing,
            playback_rate: if is_playing { 1.0 } else { 0.0 },
        };
        if let Err(err) = self.surface.publish(&info) {
            warn!(title = %info.title, "Failed to publish now-playing info: {err}");
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{RecordingSurface, SurfaceCall};
    use super::*;

    #[test]
    fn publishes_metadata_and_transport_state() {
        let surface = RecordingSurface::default();
        let mut now_playing = NowPlaying::new(Box::new(surface.clone()));
        now_playing.set_metadata("Confessions", "Augustine");

        now_playing.playing();
        now_playing.paused();
        now_playing.stopped();

        let calls = surface.calls.borrow();
        assert_eq!(calls.len(), 3);
        match &calls[0] {
            SurfaceCall::Publish(info) => {
                assert_eq!(info.title, "Confessions");
                assert_eq!(info.author, "Augustine");
                assert!(info.is_playing);
                assert_eq!(info.playback_rate, 1.0);
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert!(matches!(&calls[1], SurfaceCall::Publish(info) if !info.is_playing));
        assert_eq!(calls[2], SurfaceCall::Clear);
    }

    #[test]
    fn publish_failure_is_swallowed() {
        let surface = RecordingSurface {
            fail: true,
            ..RecordingSurface::default()
        };
        let mut now_playing = NowPlaying::new(Box::new(surface.clone()));
        now_playing.playing();
        assert_eq!(surface.last_is_playing(), Some(true));
    }
}
