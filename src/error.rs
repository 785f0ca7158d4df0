//! Error types for citation_atlas.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlasError {
    /// The dataset file could not be opened (missing file, permissions, ...).
    /// Front ends show an empty state for this instead of failing hard.
    #[error("Dataset unavailable: {path}: {source}")]
    DatasetUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No dataset files found under {0}")]
    NoInput(PathBuf),

    #[error("Unknown paper id: {0}")]
    UnknownPaper(String),

    #[error("Unknown subfield: {0}")]
    UnknownSubfield(String),

    #[error("Subfield {0:?} has no dataset")]
    SubfieldWithoutDataset(String),

    #[error("No dataset given: pass a path or --subfields with --subfield")]
    NoDatasetGiven,

    /// Filters left no paper to work on.
    #[error("No papers match the selection")]
    EmptySelection,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
