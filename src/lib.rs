pub mod bio;
pub mod cli;
pub mod core;
pub mod utils;

pub use crate::core::{extractor::HitExtractor, hit_table::HitTable, sequence_store::SequenceStore};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TopHitsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source file not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("Malformed FASTA {}:{line}: {reason}", .path.display())]
    MalformedFasta {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Malformed hit table {}:{line}: {reason}", .path.display())]
    MalformedTable {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Cannot create output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TopHitsError>;
