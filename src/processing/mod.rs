// src/processing/mod.rs
pub mod ndi;
pub mod parallel;

// Re-export main components
pub use ndi::{compute_index, NormalizedDifference};
pub use parallel::ParallelProcessor;
