use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

const RUNNING: u8 = 0;
const PAUSED: u8 = 1;
const CANCELLED: u8 = 2;

/// What a worker should do at its next checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    Continue,
    Hold,
    Abandon,
}

/// Control flag shared between the thread that owns playback and a worker
/// pacing one utterance. Cancellation is final; pause can be lifted.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    state: Arc<AtomicU8>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.state.store(CANCELLED, Ordering::Release);
    }

    /// Returns false if the token was already cancelled or paused.
    pub fn pause(&self) -> bool {
        self.state
            .compare_exchange(RUNNING, PAUSED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns false unless the token was paused.
    pub fn resume(&self) -> bool {
        self.state
            .compare_exchange(PAUSED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    pub fn checkpoint(&self) -> Checkpoint {
        match self.state.load(Ordering::Acquire) {
            RUNNING => Checkpoint::Continue,
            PAUSED => Checkpoint::Hold,
            _ => Checkpoint::Abandon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancellationToken::new();
        let worker = token.clone();
        assert_eq!(worker.checkpoint(), Checkpoint::Continue);
        token.cancel();
        assert!(worker.is_cancelled());
        assert_eq!(worker.checkpoint(), Checkpoint::Abandon);
    }

    #[test]
    fn pause_and_resume_toggle_hold() {
        let token = CancellationToken::new();
        assert!(token.pause());
        assert!(!token.pause());
        assert_eq!(token.checkpoint(), Checkpoint::Hold);
        assert!(token.resume());
        assert!(!token.resume());
        assert_eq!(token.checkpoint(), Checkpoint::Continue);
    }

    #[test]
    fn cancelled_token_cannot_be_paused_or_resumed() {
        let token = CancellationToken::new();
        token.cancel();
        assert!(!token.pause());
        assert!(!token.resume());
        assert!(token.is_cancelled());
    }

    #[test]
    fn paused_token_can_still_be_cancelled() {
        let token = CancellationToken::new();
        token.pause();
        token.cancel();
        assert!(!token.resume());
        assert_eq!(token.checkpoint(), Checkpoint::Abandon);
    }
}
