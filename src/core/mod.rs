pub mod config;
pub mod extractor;
pub mod hit_table;
pub mod sequence_store;
