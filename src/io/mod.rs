// src/io/mod.rs
pub mod reader;
pub mod writer;

pub use reader::{load, GdalReader, RasterReader};
pub use writer::{save, save_with_options, Compression, GdalWriter, RasterWriter, WriteOptions};
