//! Error types for the match summary engine.
//!
//! Only a missing or structurally broken snapshot is fatal. Everything below
//! that level degrades to a documented default and never surfaces here.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal snapshot errors: the run cannot start.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot section missing: {0}")]
    MissingSection(&'static str),

    #[error("snapshot section {section} is malformed: {reason}")]
    InvalidSection {
        section: &'static str,
        reason: String,
    },
}

/// Rejection reasons for a single quote entry at the snapshot boundary.
///
/// A rejected entry is dropped from its family; the event still assembles.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteEntryError {
    #[error("quote entry is not an array")]
    NotArray,

    #[error("quote entry has {0} positions, expected at least 8")]
    TooShort(usize),
}

/// Errors writing the summary document.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write summary document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize summary document: {0}")]
    Json(#[from] serde_json::Error),
}
