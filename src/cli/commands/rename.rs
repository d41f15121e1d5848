use crate::bio::fasta::{read_fasta, write_fasta, HeaderPolicy};
use crate::bio::sequence::Sequence;
use crate::cli::output::*;
use anyhow::Result;
use clap::Args;
use indexmap::IndexMap;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// FASTA file with descriptive headers (e.g. RefSeq mitochondrion downloads)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Renamed FASTA file
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Wrap output sequences at this width (0 = single line)
    #[arg(long, default_value = "0")]
    pub line_width: usize,
}

/// Collapse records whose shortened identifiers collide: the last record's
/// sequence is kept at the position of the first.
fn collapse_duplicates(sequences: Vec<Sequence>) -> Vec<Sequence> {
    let mut by_id: IndexMap<String, String> = IndexMap::new();
    for seq in sequences {
        by_id.insert(seq.id, seq.sequence);
    }
    by_id
        .into_iter()
        .map(|(id, sequence)| Sequence::new(id, sequence))
        .collect()
}

pub fn run(args: RenameArgs) -> Result<()> {
    let sequences = read_fasta(&args.input, HeaderPolicy::LegacyThreeToken)?;
    let total = sequences.len();
    let renamed = collapse_duplicates(sequences);

    if renamed.len() < total {
        tracing::warn!(
            "{} records shared a shortened identifier and were merged",
            total - renamed.len()
        );
    }

    write_fasta(&args.output, &renamed, args.line_width)?;
    success(&format!(
        "Renamed {} sequences -> {}",
        format_number(renamed.len()),
        args.output.display()
    ));
    Ok(())
}
