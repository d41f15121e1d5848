//! Text input helpers shared by the FASTA and hit table readers.

use crate::TopHitsError;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Open a text source for line-oriented reading (supports .gz compression).
///
/// A path that does not exist is reported as [`TopHitsError::MissingSource`]
/// rather than a bare IO error, so callers can tell the two apart.
pub fn open_text<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, TopHitsError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TopHitsError::MissingSource(path.to_path_buf()));
    }

    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn is_gzipped(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}
