//! Tabular alignment results (BLAST outfmt 6/7 style) grouped by query.

use crate::utils::io::open_text;
use crate::TopHitsError;
use indexmap::{IndexMap, IndexSet};
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Column layout of a tabular hit source
pub trait TabularHitSource: Send + Sync {
    fn query_column(&self) -> usize;

    fn hit_column(&self) -> usize;

    /// Whether the first data line names the columns and carries no hit
    fn has_header_row(&self) -> bool;

    fn min_fields(&self) -> usize {
        self.query_column().max(self.hit_column()) + 1
    }
}

/// Headerless table: query in column 0, hit in column 1
pub struct PositionalColumns;

impl TabularHitSource for PositionalColumns {
    fn query_column(&self) -> usize {
        0
    }

    fn hit_column(&self) -> usize {
        1
    }

    fn has_header_row(&self) -> bool {
        false
    }
}

/// Table with a header row naming `qseqid` and `sseqid` among other columns
pub struct NamedColumns {
    query: usize,
    hit: usize,
}

impl NamedColumns {
    pub const QUERY: &'static str = "qseqid";
    pub const HIT: &'static str = "sseqid";

    /// Does this row name any of the columns we read?
    pub fn is_header(fields: &[&str]) -> bool {
        fields.iter().any(|f| *f == Self::QUERY || *f == Self::HIT)
    }

    pub fn from_header(fields: &[&str]) -> Option<Self> {
        let query = fields.iter().position(|f| *f == Self::QUERY)?;
        let hit = fields.iter().position(|f| *f == Self::HIT)?;
        Some(Self { query, hit })
    }
}

impl TabularHitSource for NamedColumns {
    fn query_column(&self) -> usize {
        self.query
    }

    fn hit_column(&self) -> usize {
        self.hit
    }

    fn has_header_row(&self) -> bool {
        true
    }
}

/// Pick the column layout from the first data line.
///
/// `None` means the line looks like a header but lacks one of the required names.
pub fn detect_columns(fields: &[&str]) -> Option<Box<dyn TabularHitSource>> {
    if NamedColumns::is_header(fields) {
        NamedColumns::from_header(fields).map(|c| Box::new(c) as Box<dyn TabularHitSource>)
    } else {
        Some(Box::new(PositionalColumns))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitPair {
    pub query: String,
    pub hit: String,
}

/// Distinct hits of one query, in first-seen order, already truncated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryHits {
    pub query: String,
    pub hits: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct HitTable {
    pairs: Vec<HitPair>,
    named_columns: bool,
}

impl HitTable {
    pub fn from_pairs<I, Q, H>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Q, H)>,
        Q: Into<String>,
        H: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(q, h)| HitPair {
                    query: q.into(),
                    hit: h.into(),
                })
                .collect(),
            named_columns: false,
        }
    }

    /// Parse a tab-separated hit table (supports .gz compression)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TopHitsError> {
        let path = path.as_ref();
        let table = Self::from_reader(open_text(path)?, path)?;

        tracing::info!(
            "Read {} hit rows for {} queries from {}",
            table.len(),
            table.queries().len(),
            path.display()
        );
        Ok(table)
    }

    /// Parse the whole table up front so a malformed row is reported
    /// before any output is produced.
    pub fn from_reader<R: BufRead>(reader: R, source: &Path) -> Result<Self, TopHitsError> {
        let malformed = |line: usize, reason: String| TopHitsError::MalformedTable {
            path: PathBuf::from(source),
            line,
            reason,
        };

        let mut columns: Option<Box<dyn TabularHitSource>> = None;
        let mut pairs = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            let line = line.trim_end_matches('\r');

            // outfmt 7 comment lines
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();

            if columns.is_none() {
                let detected = detect_columns(&fields).ok_or_else(|| {
                    malformed(
                        line_no,
                        format!(
                            "header row must name both {} and {}",
                            NamedColumns::QUERY,
                            NamedColumns::HIT
                        ),
                    )
                })?;
                let header_row = detected.has_header_row();
                columns = Some(detected);
                if header_row {
                    continue;
                }
            }
            let Some(layout) = columns.as_deref() else {
                continue;
            };

            if fields.len() < layout.min_fields() {
                return Err(malformed(
                    line_no,
                    format!(
                        "expected at least {} columns, found {}",
                        layout.min_fields(),
                        fields.len()
                    ),
                ));
            }

            let query = fields[layout.query_column()];
            let hit = fields[layout.hit_column()];
            if query.is_empty() || hit.is_empty() {
                return Err(malformed(line_no, "empty query or hit identifier".to_string()));
            }

            pairs.push(HitPair {
                query: query.to_string(),
                hit: hit.to_string(),
            });
        }

        let named_columns = columns.map_or(false, |c| c.has_header_row());
        Ok(Self {
            pairs,
            named_columns,
        })
    }

    pub fn pairs(&self) -> &[HitPair] {
        &self.pairs
    }

    pub fn has_named_columns(&self) -> bool {
        self.named_columns
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Distinct query identifiers in first-occurrence order
    pub fn queries(&self) -> Vec<&str> {
        self.pairs
            .iter()
            .map(|p| p.query.as_str())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct hits per query; both levels keep first-occurrence order.
    pub fn grouped(&self) -> IndexMap<&str, IndexSet<&str>> {
        let mut groups: IndexMap<&str, IndexSet<&str>> = IndexMap::new();
        for pair in &self.pairs {
            groups
                .entry(pair.query.as_str())
                .or_default()
                .insert(pair.hit.as_str());
        }
        groups
    }

    /// Group and keep at most `max_hits` per query. Short groups are kept whole.
    pub fn top_hits(&self, max_hits: usize) -> Vec<QueryHits> {
        self.grouped()
            .into_iter()
            .map(|(query, hits)| QueryHits {
                query: query.to_string(),
                hits: hits.into_iter().take(max_hits).map(str::to_string).collect(),
            })
            .collect()
    }
}
