// src/cli.rs
use clap::Parser;
use std::path::PathBuf;

use crate::config::RunConfig;
use crate::error::Result;
use crate::io::Compression;
use crate::resolve::{ConfiguredInput, EnvInput, ExplicitInput, ResolverChain};

#[derive(Parser, Debug)]
#[command(name = "ndvi-calc", version)]
#[command(about = "Process a remote sensing image to calculate NDVI")]
pub struct Cli {
    /// Input raster. Without it, default_input from --config and then
    /// $NDVI_DEFAULT_INPUT are tried
    #[arg(long = "input_file", value_name = "PATH")]
    pub input_file: Option<PathBuf>,

    /// Output GeoTIFF path [default: ndvi_processed_output.tif]
    #[arg(long = "output_file", value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Do not display the index image
    #[arg(long = "no_display")]
    pub no_display: bool,

    /// Zero-based band used as operand A in (B - A) / (B + A) [default: 0]
    #[arg(long)]
    pub band_a: Option<usize>,

    /// Zero-based band used as operand B in (B - A) / (B + A) [default: 2]
    #[arg(long)]
    pub band_b: Option<usize>,

    /// JSON run configuration; flags given here take precedence
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Worker threads for the index computation, 0 for all CPUs [default: 1]
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output compression [default: deflate]
    #[arg(long, value_enum)]
    pub compress: Option<Compression>,

    /// Compression level for deflate (1-9) or zstd (1-22) [default: 6]
    #[arg(long)]
    pub compress_level: Option<u8>,

    /// Write a striped instead of a tiled GeoTIFF
    #[arg(long)]
    pub no_tiled: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// The configuration file (or defaults) with this command line on top.
    pub fn load_config(&self) -> Result<RunConfig> {
        let base = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };
        let config = self.apply(base);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&self, config: RunConfig) -> RunConfig {
        let mut config = config;
        if let Some(output_file) = &self.output_file {
            config.output_file = output_file.clone();
        }
        if let Some(band_a) = self.band_a {
            config.band_a = band_a;
        }
        if let Some(band_b) = self.band_b {
            config.band_b = band_b;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        if let Some(compress) = self.compress {
            config.write.compress = compress;
        }
        if let Some(level) = self.compress_level {
            config.write.compress_level = level;
        }
        config.no_display |= self.no_display;
        if self.no_tiled {
            config.write.tiled = false;
        }
        config
    }

    /// Command line first, then the configuration file, then the environment.
    pub fn resolvers(&self, config: &RunConfig) -> ResolverChain {
        let mut chain = ResolverChain::new();
        if let Some(input) = &self.input_file {
            chain = chain.with(ExplicitInput(input.clone()));
        }
        chain
            .with(ConfiguredInput(config.default_input.clone()))
            .with(EnvInput::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["ndvi-calc"]);
        let config = cli.load_config().unwrap();
        assert_eq!(config, RunConfig::default());
        assert!(cli.input_file.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "ndvi-calc",
            "--input_file",
            "scene.tif",
            "--output_file",
            "out.tif",
            "--no_display",
            "--band-a",
            "3",
            "--band-b",
            "7",
            "--compress",
            "lzw",
            "--no-tiled",
        ]);
        let config = cli.apply(RunConfig::default());

        assert_eq!(config.output_file, PathBuf::from("out.tif"));
        assert!(config.no_display);
        assert_eq!((config.band_a, config.band_b), (3, 7));
        assert_eq!(config.write.compress, Compression::Lzw);
        assert!(!config.write.tiled);
        assert_eq!(
            cli.resolvers(&config).resolve().unwrap(),
            PathBuf::from("scene.tif")
        );
    }

    #[test]
    fn test_same_band_twice_is_rejected() {
        let cli = Cli::parse_from(["ndvi-calc", "--band-a", "2"]);
        assert!(cli.load_config().is_err());
    }
}
