//! Terminal narration engine: prints words at speaking pace and reports
//! progress the way a speech synthesizer would.

use crate::Inbound;
use orthoreader_core::cancellation::{CancellationToken, Checkpoint};
use orthoreader_core::narration::{NarrationEngine, NarrationEvent, UtteranceId, Voice};
use orthoreader_core::tokenizer::{TextLimits, tokenize};
use std::io::{self, Write};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

const BASE_WPM: f64 = 170.0;
const HOLD_POLL: Duration = Duration::from_millis(50);

struct Utterance {
    id: UtteranceId,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct ConsoleEngine {
    events: Sender<Inbound>,
    current: Option<Utterance>,
}

impl ConsoleEngine {
    pub fn new(events: Sender<Inbound>) -> Self {
        Self {
            events,
            current: None,
        }
    }

    fn report(&self, utterance: UtteranceId, event: NarrationEvent) {
        if self.events.send(Inbound::Engine(utterance, event)).is_err() {
            debug!(%utterance, ?event, "Event receiver closed");
        }
    }
}

impl NarrationEngine for ConsoleEngine {
    fn available_voices(&self) -> Vec<Voice> {
        vec![Voice {
            id: "console".to_string(),
            locale: "en-US".to_string(),
        }]
    }

    fn speak(&mut self, utterance: UtteranceId, text: &str, voice: Option<&Voice>, rate: f32) {
        self.stop();
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let events = self.events.clone();
        let text = text.to_string();
        let delay = word_delay(rate);
        debug!(
            %utterance,
            voice = voice.map(|v| v.id.as_str()).unwrap_or("default"),
            rate,
            "Starting console narration"
        );
        let handle =
            thread::spawn(move || pace_words(utterance, &text, delay, &worker_token, &events));
        self.current = Some(Utterance {
            id: utterance,
            token,
            handle,
        });
    }

    fn pause(&mut self) {
        if let Some(current) = &self.current
            && current.token.pause()
        {
            self.report(current.id, NarrationEvent::Paused);
        }
    }

    fn resume(&mut self) {
        if let Some(current) = &self.current
            && current.token.resume()
        {
            self.report(current.id, NarrationEvent::Continued);
        }
    }

    fn stop(&mut self) {
        if let Some(current) = self.current.take() {
            current.token.cancel();
            if current.handle.join().is_err() {
                warn!(utterance = %current.id, "Narration worker panicked");
            }
        }
    }
}

impl Drop for ConsoleEngine {
    fn drop(&mut self) {
        if let Some(current) = &self.current {
            current.token.cancel();
        }
    }
}

fn word_delay(rate: f32) -> Duration {
    let rate = f64::from(rate.max(0.1));
    Duration::from_secs_f64(60.0 / (BASE_WPM * rate))
}

fn pace_words(
    utterance: UtteranceId,
    text: &str,
    delay: Duration,
    token: &CancellationToken,
    events: &Sender<Inbound>,
) {
    let send = |event| {
        let _ = events.send(Inbound::Engine(utterance, event));
    };
    let limits = TextLimits {
        max_chars: usize::MAX,
        max_words: usize::MAX,
    };
    let spans = tokenize(text, limits).spans;
    let mut stdout = io::stdout();

    for span in spans {
        loop {
            match token.checkpoint() {
                Checkpoint::Continue => break,
                Checkpoint::Hold => thread::sleep(HOLD_POLL),
                Checkpoint::Abandon => {
                    let _ = writeln!(stdout);
                    send(NarrationEvent::Cancelled);
                    return;
                }
            }
        }
        send(NarrationEvent::WillSpeakRange {
            location: span.start,
            length: span.end - span.start,
        });
        let _ = write!(stdout, "{} ", &text[span.start..span.end]);
        let _ = stdout.flush();
        thread::sleep(delay);
    }

    let _ = writeln!(stdout);
    if token.is_cancelled() {
        send(NarrationEvent::Cancelled);
    } else {
        send(NarrationEvent::Finished);
    }
}
