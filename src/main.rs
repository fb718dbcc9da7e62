//! Entry point for the narrated PDF reader.
//!
//! With no arguments the library shelf is listed. Given a document path the
//! reader opens it, offers to resume from the last bookmark, and narrates it
//! to the terminal. Commands are read from stdin one per line.

mod console_engine;

use crate::console_engine::ConsoleEngine;
use anyhow::{Context, Result, anyhow};
use orthoreader_core::cache::FileBookmarkStore;
use orthoreader_core::config::load_config;
use orthoreader_core::extract::AutoExtractor;
use orthoreader_core::library::Library;
use orthoreader_core::narration::{NarrationEvent, UtteranceId};
use orthoreader_core::now_playing::{NowPlayingInfo, NowPlayingSurface};
use orthoreader_core::playback::PlaybackState;
use orthoreader_core::session::{Notice, ReaderSession, SessionCommand};
use std::env;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

/// Everything the main loop reacts to, funneled onto one thread.
pub(crate) enum Inbound {
    Engine(UtteranceId, NarrationEvent),
    Command(SessionCommand),
    Quit,
}

/// Publishes transport state to the log in place of a system media panel.
struct LogSurface;

impl NowPlayingSurface for LogSurface {
    fn publish(&mut self, info: &NowPlayingInfo) -> Result<()> {
        info!(
            title = %info.title,
            author = %info.author,
            playing = info.is_playing,
            rate = info.playback_rate,
            "Now playing"
        );
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        info!("Now playing cleared");
        Ok(())
    }
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        level = %config.log_level,
        group_size = config.group_size,
        rate = config.speech_rate,
        "Starting reader"
    );

    let (tx, rx) = mpsc::channel();
    let store = FileBookmarkStore::new(&config.cache_dir);
    let mut session = ReaderSession::new(
        config,
        Box::new(AutoExtractor),
        Box::new(ConsoleEngine::new(tx.clone())),
        Box::new(store),
        Box::new(LogSurface),
    );

    let Some(path) = parse_args()? else {
        print_library(&session.library());
        return Ok(());
    };

    let opened = session
        .apply_command(SessionCommand::Open { path: path.clone() })
        .snapshot;
    match &opened.notice {
        Some(Notice::LoadFailed { message }) => return Err(anyhow!("{message}")),
        Some(notice) => println!("{}", notice.message()),
        None => {}
    }
    println!("{} by {}", opened.title, opened.author);
    if let Some(group_idx) = opened.playback.resume_offer {
        println!(
            "Resuming at group {} of {} (type `r` to start over)",
            group_idx + 1,
            opened.playback.group_count
        );
    }
    print_help();

    let interrupt_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(Inbound::Quit);
    })
    .context("Installing Ctrl-C handler")?;
    spawn_command_reader(tx);

    session.apply_command(SessionCommand::Play);
    let mut last_group = None;
    while let Ok(message) = rx.recv() {
        match message {
            Inbound::Engine(utterance, event) => {
                session.handle_engine_event(utterance, event);
                if event == NarrationEvent::Finished && session.state() == PlaybackState::Idle {
                    info!(path = %path.display(), "Reached end of document");
                    break;
                }
            }
            Inbound::Command(SessionCommand::LeaveDocument) => {
                session.apply_command(SessionCommand::LeaveDocument);
                info!("Left document; bookmark cleared");
                break;
            }
            Inbound::Command(command) => {
                let event = session.apply_command(command);
                debug!(action = event.action, state = ?event.snapshot.playback.state, "Applied command");
            }
            Inbound::Quit => {
                // Stop without clearing the bookmark so the next launch can resume.
                session.apply_command(SessionCommand::Restart);
                info!("Interrupted; bookmark kept");
                break;
            }
        }

        let snapshot = session.snapshot();
        if snapshot.playback.spoken_group != last_group {
            last_group = snapshot.playback.spoken_group;
            debug!(
                group = ?last_group,
                progress = %format!("{:.0}%", snapshot.playback.progress_pct),
                "Spoken group changed"
            );
        }
    }
    Ok(())
}

fn parse_args() -> Result<Option<PathBuf>> {
    let Some(path) = env::args().nth(1) else {
        return Ok(None);
    };
    let path = PathBuf::from(path);
    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }
    Ok(Some(path))
}

fn print_library(library: &Library) {
    if library.is_empty() {
        println!("No PDFs found. Usage: orthoreader <path-to-pdf>");
        return;
    }
    for (author, entries) in library {
        println!("{author}");
        for entry in entries {
            println!("  {}  ({})", entry.title, entry.path.display());
        }
    }
}

fn print_help() {
    println!(
        "Commands: <enter>/p play-pause, s N seek to group N, f X seek to fraction X, \
         t N tap group N, r replay from start, l leave document, q quit"
    );
}

fn parse_command(line: &str) -> Option<Inbound> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or("p");
    let arg = parts.next();
    let group = || arg.and_then(|n| n.parse::<usize>().ok()).map(|n| n.saturating_sub(1));
    let command = match verb {
        "p" => SessionCommand::TogglePlayPause,
        "s" => SessionCommand::Seek { group_idx: group()? },
        "t" => SessionCommand::SelectGroup { group_idx: group()? },
        "f" => SessionCommand::SeekFraction {
            fraction: arg?.parse().ok()?,
        },
        "r" => SessionCommand::ReplayFromStart,
        "l" => SessionCommand::LeaveDocument,
        "q" => return Some(Inbound::Quit),
        _ => return None,
    };
    Some(Inbound::Command(command))
}

fn spawn_command_reader(tx: Sender<Inbound>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_command(&line) {
                Some(message) => {
                    if tx.send(message).is_err() {
                        break;
                    }
                }
                None => warn!(input = %line, "Unrecognized command"),
            }
        }
    });
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    debug!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        debug!(%level, "Applied log level from config");
    }
}
