pub mod fasta;
pub mod sequence;

pub use fasta::HeaderPolicy;
pub use sequence::Sequence;
