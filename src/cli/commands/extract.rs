use crate::bio::fasta::HeaderPolicy;
use crate::cli::output::*;
use crate::core::config::{default_config, load_config, Config};
use crate::core::extractor::HitExtractor;
use crate::core::hit_table::HitTable;
use crate::core::sequence_store::SequenceStore;
use crate::TopHitsError;
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// BLAST results in tabular format (outfmt 6/7, or with a qseqid/sseqid header row)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Reference database FASTA the hits were searched against
    #[arg(short, long, value_name = "FILE")]
    pub db: PathBuf,

    /// Query FASTA (its records replace database records with the same identifier)
    #[arg(short, long, value_name = "FILE")]
    pub query: Option<PathBuf>,

    /// Putative identification FASTA, appended to every query's output
    #[arg(short, long, value_name = "FILE")]
    pub putative: Option<PathBuf>,

    /// Report file listing query/hit and query/putative associations
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Directory for the top_hits_<query>.fasta files (default: directory of the report)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of hits to include per query (default from config: 30)
    #[arg(short, long)]
    pub target: Option<usize>,

    /// Do not write the query sequence at the top of each file
    #[arg(long)]
    pub no_self: bool,

    /// How FASTA headers map to identifiers
    #[arg(long, value_enum)]
    pub header_policy: Option<HeaderPolicy>,

    /// Wrap output sequences at this width (0 = single line)
    #[arg(long)]
    pub line_width: Option<usize>,

    /// Configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the run summary as JSON
    #[arg(long, value_name = "FILE")]
    pub summary_json: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Number of threads (passed from global)
    #[arg(skip)]
    pub threads: Option<usize>,
}

/// Command-line values take precedence over the config file.
fn apply_overrides(args: &ExtractArgs, mut config: Config) -> Config {
    if let Some(target) = args.target {
        config.extraction.target = target;
    }
    if args.no_self {
        config.extraction.include_self = false;
    }
    if let Some(width) = args.line_width {
        config.extraction.line_width = width;
    }
    if let Some(policy) = args.header_policy {
        config.input.header_policy = policy;
    }
    if let Some(threads) = args.threads {
        config.performance.threads = threads;
    }
    config
}

fn resolve_output_dir(args: &ExtractArgs) -> PathBuf {
    args.output_dir.clone().unwrap_or_else(|| {
        args.output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Every source must exist before anything is written.
fn check_sources(args: &ExtractArgs) -> Result<(), TopHitsError> {
    let sources = [Some(&args.input), Some(&args.db), args.query.as_ref(), args.putative.as_ref()];
    for path in sources.into_iter().flatten() {
        if !path.is_file() {
            return Err(TopHitsError::MissingSource(path.clone()));
        }
        tracing::debug!("Source file identified -> {}", path.display());
    }
    Ok(())
}

fn configure_threads(threads: usize) {
    let num_threads = if threads == 0 { num_cpus::get() } else { threads };

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        tracing::debug!("Keeping existing thread pool: {}", e);
    } else {
        tracing::debug!("Using {} threads", num_threads);
    }
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config(),
    };
    let config = apply_overrides(&args, config);

    check_sources(&args)?;
    configure_threads(config.performance.threads);

    section_header("Top Hit Extraction");

    let mut store = SequenceStore::new().with_header_policy(config.input.header_policy);
    store.load(&args.db)?;
    if let Some(query) = &args.query {
        store.load(query)?;
    }
    let putative = match &args.putative {
        Some(path) => store.load(path)?,
        None => Vec::new(),
    };
    success(&format!("Loaded {} sequences", format_number(store.len())));

    let table = HitTable::from_path(&args.input)?;
    success(&format!(
        "Read {} hits for {} queries",
        format_number(table.len()),
        format_number(table.queries().len())
    ));

    let output_dir = resolve_output_dir(&args);
    action(&format!(
        "Writing up to {} hits per query to {}",
        config.extraction.target,
        output_dir.display()
    ));

    let summary = HitExtractor::new(&store)
        .with_max_hits(config.extraction.target)
        .with_include_self(config.extraction.include_self)
        .with_putative(putative)
        .with_line_width(config.extraction.line_width)
        .with_silent(args.no_progress)
        .extract(&table, &output_dir, &args.output)?;

    tree_item(false, "Queries", Some(&format_number(summary.queries)));
    tree_item(false, "Hit records", Some(&format_number(summary.hits_written)));
    tree_item(false, "Putative records", Some(&format_number(summary.putative_written)));
    tree_item(false, "Output directory", Some(&output_dir.display().to_string()));
    tree_item(true, "Report", Some(&summary.report.display().to_string()));

    if !summary.unresolved.is_empty() {
        warning(&format!(
            "{} identifiers were not found in the sequence store and were skipped:",
            summary.unresolved.len()
        ));
        let last = summary.unresolved.len() - 1;
        for (i, unresolved) in summary.unresolved.iter().enumerate() {
            tree_item(i == last, &unresolved.to_string(), None);
        }
    }

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(input: PathBuf, db: PathBuf, output: PathBuf) -> ExtractArgs {
        ExtractArgs {
            input,
            db,
            query: None,
            putative: None,
            output,
            output_dir: None,
            target: None,
            no_self: false,
            header_policy: None,
            line_width: None,
            config: None,
            summary_json: None,
            no_progress: true,
            threads: None,
        }
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut a = args("hits.tsv".into(), "db.fasta".into(), "out/report.txt".into());
        a.target = Some(5);
        a.no_self = true;
        a.header_policy = Some(HeaderPolicy::LegacyThreeToken);

        let config = apply_overrides(&a, default_config());
        assert_eq!(config.extraction.target, 5);
        assert!(!config.extraction.include_self);
        assert_eq!(config.input.header_policy, HeaderPolicy::LegacyThreeToken);
        assert_eq!(config.extraction.line_width, 0);
    }

    #[test]
    fn test_output_dir_defaults_to_report_parent() {
        let a = args("hits.tsv".into(), "db.fasta".into(), "results/run1/report.txt".into());
        assert_eq!(resolve_output_dir(&a), PathBuf::from("results/run1"));

        let bare = args("hits.tsv".into(), "db.fasta".into(), "report.txt".into());
        assert_eq!(resolve_output_dir(&bare), PathBuf::from("."));
    }

    #[test]
    fn test_missing_source_detected_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("hits.tsv");
        fs::write(&table, "Q1\tH1\n").unwrap();
        let report = dir.path().join("out").join("report.txt");

        let a = args(table, dir.path().join("missing.fasta"), report.clone());
        let err = run(a).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TopHitsError>(),
            Some(TopHitsError::MissingSource(_))
        ));
        assert!(!report.exists());
        assert!(!dir.path().join("out").exists());
    }
}
