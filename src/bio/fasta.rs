use crate::bio::sequence::Sequence;
use crate::utils::io::open_text;
use crate::TopHitsError;
use clap::ValueEnum;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

/// How a header line is turned into a sequence identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderPolicy {
    /// The whole header after the `>` marker.
    #[default]
    Full,
    /// First three space-delimited tokens joined by `_`
    /// (`NC_012920.1 Homo sapiens mitochondrion` -> `NC_012920.1_Homo_sapiens`).
    LegacyThreeToken,
}

impl HeaderPolicy {
    /// Derive the identifier from a header with its `>` already removed.
    pub fn identifier(&self, header: &str) -> String {
        match self {
            HeaderPolicy::Full => header.to_string(),
            HeaderPolicy::LegacyThreeToken => {
                header.splitn(4, ' ').take(3).collect::<Vec<_>>().join("_")
            }
        }
    }
}

/// Line-oriented FASTA reader.
///
/// A header line closes the record being built and opens the next one; any
/// other line is appended to the open record. Body text with no open record
/// is a [`TopHitsError::MalformedFasta`].
pub struct FastaReader<R> {
    lines: Lines<R>,
    source: PathBuf,
    policy: HeaderPolicy,
    current: Option<Sequence>,
    line_no: usize,
    done: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R, source: impl Into<PathBuf>, policy: HeaderPolicy) -> Self {
        Self {
            lines: reader.lines(),
            source: source.into(),
            policy,
            current: None,
            line_no: 0,
            done: false,
        }
    }

    fn malformed(&self, reason: &str) -> TopHitsError {
        TopHitsError::MalformedFasta {
            path: self.source.clone(),
            line: self.line_no,
            reason: reason.to_string(),
        }
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<Sequence, TopHitsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                None => {
                    self.done = true;
                    return self.current.take().map(Ok);
                }
            };
            self.line_no += 1;

            let line = line.trim();
            if let Some(header) = line.strip_prefix('>') {
                let opened = Sequence::new(self.policy.identifier(header), String::new());
                if let Some(finished) = self.current.replace(opened) {
                    return Some(Ok(finished));
                }
            } else if let Some(record) = self.current.as_mut() {
                record.sequence.push_str(line);
            } else if !line.is_empty() {
                self.done = true;
                return Some(Err(self.malformed("sequence data before the first header")));
            }
        }
    }
}

/// Parse FASTA from bytes
pub fn parse_fasta_from_bytes(data: &[u8], policy: HeaderPolicy) -> Result<Vec<Sequence>, TopHitsError> {
    FastaReader::new(data, "<memory>", policy).collect()
}

/// Parse a FASTA file into sequences (supports .gz compression)
pub fn read_fasta<P: AsRef<Path>>(path: P, policy: HeaderPolicy) -> Result<Vec<Sequence>, TopHitsError> {
    let path = path.as_ref();
    FastaReader::new(open_text(path)?, path, policy).collect()
}

/// Write one record. A `line_width` of 0 keeps the sequence on a single line.
pub fn write_record<W: Write>(
    writer: &mut W,
    id: &str,
    sequence: &str,
    line_width: usize,
) -> std::io::Result<()> {
    writeln!(writer, ">{}", id)?;

    if line_width == 0 || sequence.is_empty() {
        writeln!(writer, "{}", sequence)?;
    } else {
        for chunk in sequence.as_bytes().chunks(line_width) {
            writer.write_all(chunk)?;
            writer.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Write sequences to a FASTA file (supports .gz compression)
pub fn write_fasta<P: AsRef<Path>>(
    path: P,
    sequences: &[Sequence],
    line_width: usize,
) -> Result<(), TopHitsError> {
    let path = path.as_ref();
    let file = File::create(path)?;

    if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        let mut writer = BufWriter::new(GzEncoder::new(file, Compression::default()));
        write_fasta_to_writer(&mut writer, sequences, line_width)?;
        writer.into_inner().map_err(|e| e.into_error())?.finish()?;
    } else {
        let mut writer = BufWriter::new(file);
        write_fasta_to_writer(&mut writer, sequences, line_width)?;
        writer.flush()?;
    }

    Ok(())
}

fn write_fasta_to_writer<W: Write>(
    writer: &mut W,
    sequences: &[Sequence],
    line_width: usize,
) -> std::io::Result<()> {
    for seq in sequences {
        write_record(writer, &seq.id, &seq.sequence, line_width)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_header_policy() {
        let policy = HeaderPolicy::Full;
        assert_eq!(
            policy.identifier("sp|P12345|PROTEIN_HUMAN Description here"),
            "sp|P12345|PROTEIN_HUMAN Description here"
        );
    }

    #[test]
    fn test_legacy_three_token_policy() {
        let policy = HeaderPolicy::LegacyThreeToken;
        assert_eq!(
            policy.identifier("NC_012920.1 Homo sapiens mitochondrion, complete genome"),
            "NC_012920.1_Homo_sapiens"
        );
        assert_eq!(policy.identifier("NC_1 Bos"), "NC_1_Bos");
        assert_eq!(policy.identifier("NC_1"), "NC_1");
    }

    #[test]
    fn test_multiline_records_are_concatenated() {
        let fasta = b">seq1\nACGT\n  TTGA  \n\n>seq2 with description\nMKV\n";
        let sequences = parse_fasta_from_bytes(fasta, HeaderPolicy::Full).unwrap();

        assert_eq!(
            sequences,
            vec![
                Sequence::new("seq1", "ACGTTTGA"),
                Sequence::new("seq2 with description", "MKV"),
            ]
        );
    }

    #[test]
    fn test_case_and_inner_text_kept_verbatim() {
        let sequences = parse_fasta_from_bytes(b">s\nacgtN-n\n", HeaderPolicy::Full).unwrap();
        assert_eq!(sequences[0].sequence, "acgtN-n");
    }

    #[test]
    fn test_header_without_body() {
        let sequences = parse_fasta_from_bytes(b">empty\n>full\nAC", HeaderPolicy::Full).unwrap();
        assert_eq!(sequences.len(), 2);
        assert!(sequences[0].is_empty());
        assert_eq!(sequences[1].sequence, "AC");
    }

    #[test]
    fn test_body_before_header_is_malformed() {
        let err = parse_fasta_from_bytes(b"\nACGT\n>seq1\nAC\n", HeaderPolicy::Full).unwrap_err();
        match err {
            TopHitsError::MalformedFasta { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_leading_blank_lines_ignored() {
        let sequences = parse_fasta_from_bytes(b"\n\n>seq1\nAC\n", HeaderPolicy::Full).unwrap();
        assert_eq!(sequences, vec![Sequence::new("seq1", "AC")]);
    }

    #[test]
    fn test_only_first_marker_stripped() {
        let sequences = parse_fasta_from_bytes(b">>H1\nAC\n> H2\nGT\n", HeaderPolicy::Full).unwrap();
        assert_eq!(sequences[0].id, ">H1");
        assert_eq!(sequences[1].id, " H2");
    }

    #[test]
    fn test_write_record_unwrapped_and_wrapped() {
        let mut out = Vec::new();
        write_record(&mut out, "q1_QUERY", "ACGTACGT", 0).unwrap();
        write_record(&mut out, "h1", "ACGTACGT", 3).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            ">q1_QUERY\nACGTACGT\n>h1\nACG\nTAC\nGT\n"
        );
    }
}
