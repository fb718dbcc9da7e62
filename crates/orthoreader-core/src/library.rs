//! Bundled library: `<library_dir>/<Author>/<Title>.pdf`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryEntry {
    pub title: String,
    pub author: String,
    pub path: PathBuf,
}

/// Author name to that author's documents, sorted by title.
pub type Library = BTreeMap<String, Vec<LibraryEntry>>;

pub fn scan_library(root: &Path) -> Library {
    let mut library = Library::new();
    let authors = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %root.display(), "Library directory unavailable: {err}");
            return library;
        }
    };

    for author_dir in authors.flatten() {
        let author_path = author_dir.path();
        if !author_path.is_dir() {
            continue;
        }
        let Some(author) = author_path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let files = match fs::read_dir(&author_path) {
            Ok(files) => files,
            Err(err) => {
                warn!(path = %author_path.display(), "Skipping unreadable author directory: {err}");
                continue;
            }
        };

        let mut entries: Vec<LibraryEntry> = files
            .flatten()
            .map(|file| file.path())
            .filter(|path| path.is_file() && is_pdf(path))
            .filter_map(|path| {
                let title = path.file_stem()?.to_str()?.to_string();
                Some(LibraryEntry {
                    title,
                    author: author.to_string(),
                    path,
                })
            })
            .collect();
        if entries.is_empty() {
            debug!(author, "No PDFs under author directory");
            continue;
        }
        entries.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title))
        });
        library.insert(author.to_string(), entries);
    }

    info!(
        path = %root.display(),
        authors = library.len(),
        documents = library.values().map(Vec::len).sum::<usize>(),
        "Scanned library"
    );
    library
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
