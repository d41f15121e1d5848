/// In-memory identifier -> sequence mapping built from FASTA sources

use crate::bio::fasta::{FastaReader, HeaderPolicy};
use crate::utils::io::open_text;
use crate::TopHitsError;
use indexmap::{IndexMap, IndexSet};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct SequenceStore {
    sequences: IndexMap<String, String>,
    policy: HeaderPolicy,
}

impl SequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_policy(mut self, policy: HeaderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Load every record of a FASTA source into the store.
    ///
    /// Identifiers already present are overwritten, so the last source (and
    /// within a source, the last record) to define an identifier wins.
    /// Returns the identifiers of this source in first-appearance order.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<String>, TopHitsError> {
        let path = path.as_ref();
        let reader = FastaReader::new(open_text(path)?, path, self.policy);

        let mut loaded = IndexSet::new();
        let mut replaced = 0usize;
        for record in reader {
            let record = record?;
            loaded.insert(record.id.clone());
            if self.sequences.insert(record.id, record.sequence).is_some() {
                replaced += 1;
            }
        }

        tracing::info!(
            "Loaded {} sequences from {} ({} replaced existing entries)",
            loaded.len(),
            path.display(),
            replaced
        );
        Ok(loaded.into_iter().collect())
    }

    /// Exact-match lookup; no case folding or prefix matching.
    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.sequences.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sequences.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
