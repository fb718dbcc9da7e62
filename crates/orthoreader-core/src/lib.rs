//! Narrated PDF reading: tokenization, word groups, position tracking,
//! bookmarks and the narration state machine.

pub mod bookmark;
pub mod cache;
pub mod cancellation;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod grouping;
pub mod library;
pub mod narration;
pub mod now_playing;
pub mod playback;
pub mod position;
pub mod session;
pub mod tokenizer;
