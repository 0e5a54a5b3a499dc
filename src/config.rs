// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NdviError, Result};
use crate::io::{Compression, WriteOptions};
use crate::processing::ndi::DEFAULT_EPSILON;

pub const DEFAULT_OUTPUT_FILE: &str = "ndvi_processed_output.tif";

/// Settings for one run. Loaded from JSON; every field is optional in the
/// file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    #[serde(default)]
    pub band_a: usize,
    #[serde(default = "default_band_b")]
    pub band_b: usize,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub default_input: Option<PathBuf>,
    #[serde(default)]
    pub no_display: bool,
    #[serde(default)]
    pub write: WriteParams,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WriteParams {
    #[serde(default)]
    pub compress: Compression,
    #[serde(default = "default_compress_level")]
    pub compress_level: u8,
    #[serde(default = "default_true")]
    pub tiled: bool,
}

fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

fn default_band_b() -> usize {
    2
}

fn default_epsilon() -> f64 {
    DEFAULT_EPSILON
}

fn default_compress_level() -> u8 {
    6
}

fn default_true() -> bool {
    true
}

impl Default for WriteParams {
    fn default() -> Self {
        Self {
            compress: Compression::default(),
            compress_level: default_compress_level(),
            tiled: true,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            band_a: 0,
            band_b: default_band_b(),
            epsilon: default_epsilon(),
            threads: None,
            default_input: None,
            no_display: false,
            write: WriteParams::default(),
        }
    }
}

impl RunConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            NdviError::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| NdviError::Config(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.band_a == self.band_b {
            return Err(NdviError::Config(format!(
                "band_a and band_b must differ (both are {})",
                self.band_a
            )));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(NdviError::Config(format!(
                "epsilon must be a positive number, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }

    pub fn write_options(&self, description: Option<String>) -> WriteOptions {
        WriteOptions {
            compression: self.write.compress,
            compress_level: self.write.compress_level,
            tiled: self.write.tiled,
            description,
        }
    }
}
