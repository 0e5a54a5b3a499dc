// src/pipeline.rs
use std::path::{Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::display::IndexViewer;
use crate::error::Result;
use crate::io::{GdalReader, GdalWriter, RasterReader, RasterWriter, WriteOptions};
use crate::processing::{NormalizedDifference, ParallelProcessor};
use crate::raster::IndexSummary;
use crate::resolve::ResolverChain;

/// Inputs with fewer bands than this are reported and left alone.
pub const MIN_INPUT_BANDS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The index was computed and written to `output`.
    Written {
        output: PathBuf,
        summary: IndexSummary,
    },
    /// The input had too few bands; nothing was computed or written.
    Skipped { band_count: usize },
}

/// Load → compute → display → save.
pub struct Pipeline<R: RasterReader = GdalReader, W: RasterWriter = GdalWriter> {
    reader: R,
    writer: W,
    viewer: Option<Box<dyn IndexViewer>>,
    calculator: NormalizedDifference,
    processor: ParallelProcessor,
}

impl Pipeline {
    /// GDAL-backed pipeline without a viewer.
    pub fn new(calculator: NormalizedDifference, write_options: WriteOptions) -> Self {
        Self::with_custom(GdalReader, GdalWriter::new(write_options), calculator)
    }
}

impl<R: RasterReader, W: RasterWriter> Pipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, calculator: NormalizedDifference) -> Self {
        Self {
            reader,
            writer,
            viewer: None,
            calculator,
            processor: ParallelProcessor::sequential(),
        }
    }

    pub fn with_viewer(mut self, viewer: impl IndexViewer + 'static) -> Self {
        self.viewer = Some(Box::new(viewer));
        self
    }

    pub fn with_processor(mut self, processor: ParallelProcessor) -> Self {
        self.processor = processor;
        self
    }

    pub fn calculator(&self) -> &NormalizedDifference {
        &self.calculator
    }

    /// Band count an input needs before anything is computed.
    pub fn min_bands(&self) -> usize {
        MIN_INPUT_BANDS.max(self.calculator.required_bands())
    }

    /// Resolve the input through `resolvers`, then [`run`](Self::run).
    pub fn run_resolved(&self, resolvers: &ResolverChain, output: &Path) -> Result<RunOutcome> {
        let input = resolvers.resolve()?;
        info!("Using input image: {}", input.display());
        self.run(&input, output)
    }

    #[instrument(skip(self), fields(index = %self.calculator.name()))]
    pub fn run(&self, input: &Path, output: &Path) -> Result<RunOutcome> {
        let (data, metadata) = self.reader.read(input)?;
        info!("Image data read successfully.");

        let band_count = data.band_count();
        if band_count < self.min_bands() {
            warn!(
                "Image has {} band(s) but {} are needed for {} (band {} and band {}). \
                 Skipping calculation.",
                band_count,
                self.min_bands(),
                self.calculator.name(),
                self.calculator.band_a_index(),
                self.calculator.band_b_index()
            );
            return Ok(RunOutcome::Skipped { band_count });
        }

        let (index, index_metadata) = self.calculator.compute(&data, &metadata, &self.processor)?;
        drop(data);

        let summary = index.summary();
        info!(
            "{} calculated from band {} and band {} (min {:.4}, max {:.4}, mean {:.4}).",
            self.calculator.name(),
            self.calculator.band_a_index(),
            self.calculator.band_b_index(),
            summary.min,
            summary.max,
            summary.mean
        );

        match &self.viewer {
            Some(viewer) => {
                let title = format!("{} of {}", self.calculator.name(), display_name(input));
                if let Err(e) = viewer.show(&index, &title) {
                    warn!("Could not display {}: {}", self.calculator.name(), e);
                }
            }
            None => info!("Display skipped."),
        }

        self.writer.write(output, &index, &index_metadata)?;

        Ok(RunOutcome::Written {
            output: output.to_path_buf(),
            summary,
        })
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
