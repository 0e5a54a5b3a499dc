// src/error.rs
use std::path::PathBuf;

use gdal::errors::GdalError;
use thiserror::Error;

/// Coarse classification of a failure, used by the driver to decide how a
/// run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Shape,
    Config,
}

#[derive(Error, Debug)]
pub enum NdviError {
    #[error("Failed to open raster {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: GdalError,
    },

    #[error("Failed to read raster {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: GdalError,
    },

    #[error("Failed to write raster {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: GdalError,
    },

    #[error("{0} is not a raster dataset")]
    NotRaster(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Band index {index} out of range for raster with {band_count} band(s)")]
    BandOutOfRange { index: usize, band_count: usize },

    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NdviError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Open { .. }
            | Self::Read { .. }
            | Self::Write { .. }
            | Self::NotRaster(_)
            | Self::Io(_) => ErrorKind::Io,
            Self::BandOutOfRange { .. } | Self::Shape(_) => ErrorKind::Shape,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, NdviError>;
