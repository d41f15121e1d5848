/// Per-query top hit extraction: one FASTA per query plus a consolidated report

use crate::bio::fasta::write_record;
use crate::core::hit_table::{HitTable, QueryHits};
use crate::core::sequence_store::SequenceStore;
use crate::TopHitsError;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const QUERY_SUFFIX: &str = "_QUERY";
pub const PUTATIVE_SUFFIX: &str = "_PUTATIVE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Query,
    Hit,
    Putative,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::Query => write!(f, "query"),
            IdentifierKind::Hit => write!(f, "hit"),
            IdentifierKind::Putative => write!(f, "putative"),
        }
    }
}

/// An identifier with no sequence in the store. Skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedIdentifier {
    pub kind: IdentifierKind,
    pub query: String,
    pub id: String,
}

impl fmt::Display for UnresolvedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IdentifierKind::Query => write!(f, "query {}", self.id),
            _ => write!(f, "{} {} (query {})", self.kind, self.id, self.query),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Hit { query: String, hit: String },
    Putative { query: String, putative: String },
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportLine::Hit { query, hit } => write!(f, "Query: {}; Hit: {}", query, hit),
            ReportLine::Putative { query, putative } => {
                write!(f, "Query: {}; Putative: {}", query, putative)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionSummary {
    pub queries: usize,
    pub hits_written: usize,
    pub putative_written: usize,
    pub output_files: Vec<PathBuf>,
    pub report: PathBuf,
    pub unresolved: Vec<UnresolvedIdentifier>,
}

struct QueryOutput {
    path: PathBuf,
    report_lines: Vec<ReportLine>,
    unresolved: Vec<UnresolvedIdentifier>,
    hits_written: usize,
    putative_written: usize,
}

impl QueryOutput {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            report_lines: Vec::new(),
            unresolved: Vec::new(),
            hits_written: 0,
            putative_written: 0,
        }
    }

    fn skip(&mut self, kind: IdentifierKind, query: &str, id: &str) {
        tracing::warn!("{} {} of query {} not found in sequence store, skipping", kind, id, query);
        self.unresolved.push(UnresolvedIdentifier {
            kind,
            query: query.to_string(),
            id: id.to_string(),
        });
    }
}

/// Per-query FASTA path: `{output_dir}/top_hits_{query}.fasta`
pub fn output_path(output_dir: &Path, query: &str) -> PathBuf {
    output_dir.join(format!("top_hits_{}.fasta", query))
}

fn create_dir(path: &Path) -> Result<(), TopHitsError> {
    fs::create_dir_all(path).map_err(|source| TopHitsError::OutputDirectory {
        path: path.to_path_buf(),
        source,
    })
}

pub struct HitExtractor<'a> {
    store: &'a SequenceStore,
    putative: Vec<String>,
    max_hits: usize,
    include_self: bool,
    line_width: usize,
    silent: bool,
}

impl<'a> HitExtractor<'a> {
    pub fn new(store: &'a SequenceStore) -> Self {
        Self {
            store,
            putative: Vec::new(),
            max_hits: 30,
            include_self: true,
            line_width: 0,
            silent: false,
        }
    }

    pub fn with_max_hits(mut self, max_hits: usize) -> Self {
        self.max_hits = max_hits;
        self
    }

    pub fn with_include_self(mut self, include_self: bool) -> Self {
        self.include_self = include_self;
        self
    }

    /// Headers appended to every query's output, in this order.
    pub fn with_putative(mut self, headers: Vec<String>) -> Self {
        self.putative = headers;
        self
    }

    pub fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width;
        self
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Write `top_hits_{Q}.fasta` for every query of `table` and the report.
    ///
    /// Queries may be written concurrently; report lines are emitted in
    /// query first-occurrence order once every query is done. If a query
    /// fails, the report keeps the lines of every query before it and the
    /// first error is returned.
    pub fn extract(
        &self,
        table: &HitTable,
        output_dir: &Path,
        report_path: &Path,
    ) -> Result<ExtractionSummary, TopHitsError> {
        create_dir(output_dir)?;
        if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir(parent)?;
        }
        let mut report = BufWriter::new(File::create(report_path)?);

        let groups = table.top_hits(self.max_hits);
        let pb = self.progress_bar(groups.len());

        let results: Vec<Result<QueryOutput, TopHitsError>> = groups
            .par_iter()
            .map(|group| {
                let output = self.write_query(group, output_dir);
                pb.inc(1);
                output
            })
            .collect();
        pb.finish_and_clear();

        let mut summary = ExtractionSummary {
            report: report_path.to_path_buf(),
            ..Default::default()
        };
        for (group, result) in groups.iter().zip(results) {
            let output = match result {
                Ok(output) => output,
                Err(e) => {
                    report.flush()?;
                    tracing::error!(
                        "Query {} failed after {} of {} queries; report {} is incomplete",
                        group.query,
                        summary.queries,
                        groups.len(),
                        report_path.display()
                    );
                    return Err(e);
                }
            };
            for line in &output.report_lines {
                writeln!(report, "{}", line)?;
            }
            summary.queries += 1;
            summary.hits_written += output.hits_written;
            summary.putative_written += output.putative_written;
            summary.output_files.push(output.path);
            summary.unresolved.extend(output.unresolved);
        }
        report.flush()?;

        tracing::info!(
            "Wrote {} hit and {} putative records for {} queries ({} unresolved identifiers)",
            summary.hits_written,
            summary.putative_written,
            summary.queries,
            summary.unresolved.len()
        );
        Ok(summary)
    }

    fn write_query(&self, group: &QueryHits, output_dir: &Path) -> Result<QueryOutput, TopHitsError> {
        let query = group.query.as_str();
        let path = output_path(output_dir, query);
        if let Some(parent) = path.parent() {
            create_dir(parent)?;
        }

        let mut writer = BufWriter::new(File::create(&path)?);
        let mut output = QueryOutput::new(path);

        if self.include_self {
            match self.store.resolve(query) {
                Some(seq) => {
                    let label = format!("{}{}", query, QUERY_SUFFIX);
                    write_record(&mut writer, &label, seq, self.line_width)?;
                }
                None => output.skip(IdentifierKind::Query, query, query),
            }
        }

        for hit in &group.hits {
            match self.store.resolve(hit) {
                Some(seq) => {
                    write_record(&mut writer, hit, seq, self.line_width)?;
                    output.report_lines.push(ReportLine::Hit {
                        query: query.to_string(),
                        hit: hit.clone(),
                    });
                    output.hits_written += 1;
                }
                None => output.skip(IdentifierKind::Hit, query, hit),
            }
        }

        // Every putative header goes to every query, unfiltered.
        for putative in &self.putative {
            match self.store.resolve(putative) {
                Some(seq) => {
                    let label = format!("{}{}", putative, PUTATIVE_SUFFIX);
                    write_record(&mut writer, &label, seq, self.line_width)?;
                    output.report_lines.push(ReportLine::Putative {
                        query: query.to_string(),
                        putative: putative.clone(),
                    });
                    output.putative_written += 1;
                }
                None => output.skip(IdentifierKind::Putative, query, putative),
            }
        }

        writer.flush()?;
        tracing::debug!(
            "{}: {} hits, {} putative -> {}",
            query,
            output.hits_written,
            output.putative_written,
            output.path.display()
        );
        Ok(output)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if self.silent {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} Writing top hits")
            .map(|s| s.progress_chars("##-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb
    }
}
