use crate::bio::fasta::HeaderPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub input: InputConfig,
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum number of distinct hits written per query
    pub target: usize,
    /// Write the query's own sequence first
    pub include_self: bool,
    /// Sequence line width in output FASTA (0 = single line)
    pub line_width: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub header_policy: HeaderPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Worker threads (0 = all available)
    pub threads: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            target: 30,
            include_self: true,
            line_width: 0,
        }
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, crate::TopHitsError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(crate::TopHitsError::MissingSource(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| crate::TopHitsError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}
