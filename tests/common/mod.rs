//! Shared fixtures for tophits integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tophits::SequenceStore;

/// Temporary working directory holding input files and outputs
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a file inside the fixture and return its path
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture dir");
        }
        fs::write(&path, contents).expect("Failed to write fixture file");
        path
    }

    /// Store loaded from the given FASTA fixtures, in order
    pub fn store<P: AsRef<Path>>(&self, sources: &[P]) -> SequenceStore {
        let mut store = SequenceStore::new();
        for source in sources {
            store.load(source).expect("Failed to load fixture FASTA");
        }
        store
    }
}

/// Reference database used by most tests
pub const DB: &str = ">Q1\nAAAA\n>Q2\nCCCC\n>H1\nGGGG\n>H2\nTTTT\n>H3\nACAC\n";

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

/// Identifiers of a FASTA text, in file order
pub fn headers(fasta: &str) -> Vec<String> {
    fasta
        .lines()
        .filter_map(|l| l.strip_prefix('>'))
        .map(str::to_string)
        .collect()
}

/// Names of the files directly inside a directory, sorted
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read output dir")
        .map(|e| e.expect("Bad dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
