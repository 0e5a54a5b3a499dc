// src/lib.rs
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod io;
pub mod logger;
pub mod pipeline;
pub mod processing;
pub mod raster;
pub mod resolve;

pub use error::{ErrorKind, NdviError, Result};
pub use io::{load, save};
pub use pipeline::{Pipeline, RunOutcome};
pub use processing::compute_index;
pub use raster::{IndexArray, PixelArray, RasterData, RasterMetadata};

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
