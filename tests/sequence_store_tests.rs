/// Sequence store loading properties: round-trip and last-source-wins
mod common;

use common::Fixture;
use proptest::prelude::*;
use std::fmt::Write;
use tophits::bio::fasta::{read_fasta, write_fasta, HeaderPolicy};
use tophits::bio::sequence::Sequence;
use tophits::{SequenceStore, TopHitsError};

proptest! {
    #[test]
    fn prop_load_then_resolve_returns_body(
        records in prop::collection::btree_map(
            "[A-Za-z0-9_.|]{1,16}",
            prop::collection::vec("[ACGTNacgtn-]{0,30}", 0..5),
            1..20,
        )
    ) {
        let fx = Fixture::new();
        let mut text = String::new();
        for (id, lines) in &records {
            writeln!(text, ">{}", id).unwrap();
            for line in lines {
                writeln!(text, "{}", line).unwrap();
            }
        }
        let path = fx.write("db.fasta", &text);

        let mut store = SequenceStore::new();
        let ids = store.load(&path).unwrap();

        prop_assert_eq!(ids.len(), records.len());
        for (id, lines) in &records {
            let expected = lines.concat();
            prop_assert_eq!(store.resolve(id), Some(expected.as_str()));
        }
    }
}

#[test]
fn test_three_sources_last_wins() {
    let fx = Fixture::new();
    let db = fx.write("db.fasta", ">Q1\nAAAA\n>P1\nCCCC\n>H1\nGGGG\n");
    let query = fx.write("query.fasta", ">Q1\nTTTT\n");
    let putative = fx.write("putative.fasta", ">P1\nACGT\n>Q1\nNNNN\n");

    let store = fx.store(&[&db, &query, &putative]);

    assert_eq!(store.resolve("Q1"), Some("NNNN"));
    assert_eq!(store.resolve("P1"), Some("ACGT"));
    assert_eq!(store.resolve("H1"), Some("GGGG"));
    assert_eq!(store.len(), 3);
}

#[test]
fn test_malformed_source_reports_line() {
    let fx = Fixture::new();
    let db = fx.write("db.fasta", "ACGT\n>H1\nGGGG\n");

    let mut store = SequenceStore::new();
    match store.load(&db).unwrap_err() {
        TopHitsError::MalformedFasta { path, line, .. } => {
            assert_eq!(path, db);
            assert_eq!(line, 1);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_gzipped_round_trip() {
    let fx = Fixture::new();
    let path = fx.path("db.fasta.gz");
    let sequences = vec![
        Sequence::new("seq1", "ATGCATGCATGC"),
        Sequence::new("seq2", "ACDEFGHIKLMNPQRSTVWY"),
    ];

    write_fasta(&path, &sequences, 5).unwrap();
    let parsed = read_fasta(&path, HeaderPolicy::Full).unwrap();
    assert_eq!(parsed, sequences);

    let mut store = SequenceStore::new();
    store.load(&path).unwrap();
    assert_eq!(store.resolve("seq2"), Some("ACDEFGHIKLMNPQRSTVWY"));
}
