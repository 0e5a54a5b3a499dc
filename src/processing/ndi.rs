// src/processing/ndi.rs
use gdal::raster::GdalDataType;

use crate::error::{NdviError, Result};
use crate::processing::parallel::ParallelProcessor;
use crate::raster::{with_pixels, IndexArray, PixelArray, RasterData, RasterMetadata, Sample};

/// Denominators with an absolute value at or below this are not divided.
pub const DEFAULT_EPSILON: f64 = 1e-8;

/// Format tag written into the metadata of every index output.
pub const OUTPUT_DRIVER: &str = "GTiff";

/// Normalized difference of two bands: (B - A) / (B + A).
#[derive(Debug, Clone)]
pub struct NormalizedDifference {
    band_a_index: usize,
    band_b_index: usize,
    epsilon: f64,
    name: String,
}

impl NormalizedDifference {
    pub fn new(band_a_index: usize, band_b_index: usize, name: Option<String>) -> Self {
        Self {
            band_a_index,
            band_b_index,
            epsilon: DEFAULT_EPSILON,
            name: name.unwrap_or_else(|| "NDVI".to_string()),
        }
    }

    pub fn with_epsilon(self, epsilon: f64) -> Self {
        Self { epsilon, ..self }
    }

    pub fn band_a_index(&self) -> usize {
        self.band_a_index
    }

    pub fn band_b_index(&self) -> usize {
        self.band_b_index
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Smallest band count that contains both operands.
    pub fn required_bands(&self) -> usize {
        self.band_a_index.max(self.band_b_index) + 1
    }

    pub fn check_band_count(&self, band_count: usize) -> Result<()> {
        for index in [self.band_a_index, self.band_b_index] {
            if index >= band_count {
                return Err(NdviError::BandOutOfRange { index, band_count });
            }
        }
        Ok(())
    }

    /// Compute the index over one typed pixel array.
    pub fn calculate<T: Sample>(
        &self,
        pixels: &PixelArray<T>,
        processor: &ParallelProcessor,
    ) -> Result<IndexArray> {
        let band_count = pixels.band_count();
        self.check_band_count(band_count)?;

        let band = |index| {
            pixels
                .band(index)
                .ok_or(NdviError::BandOutOfRange { index, band_count })
        };
        let band_a = band(self.band_a_index)?;
        let band_b = band(self.band_b_index)?;

        let epsilon = self.epsilon;
        let mut result = vec![0.0f32; pixels.height() * pixels.width()];
        processor.fill(&mut result, |i| {
            normalized_difference(band_a[i].into(), band_b[i].into(), epsilon)
        });

        IndexArray::new(pixels.height(), pixels.width(), result)
    }

    /// Compute the index and the metadata describing it.
    pub fn compute(
        &self,
        data: &RasterData,
        source: &RasterMetadata,
        processor: &ParallelProcessor,
    ) -> Result<(IndexArray, RasterMetadata)> {
        let (bands, height, width) = data.shape();
        self.check_band_count(bands)?;
        source.ensure_shape(bands, height, width)?;

        let index = with_pixels!(data, pixels => self.calculate(pixels, processor))?;
        Ok((index, index_metadata(source)))
    }
}

/// One pixel of the index. Near-zero denominators yield 0.0 without dividing.
#[inline]
pub fn normalized_difference(a: f64, b: f64, epsilon: f64) -> f32 {
    let denominator = b + a;
    if denominator.abs() > epsilon {
        ((b - a) / denominator) as f32
    } else {
        0.0
    }
}

/// Metadata of a single float32 band derived from `source`.
pub fn index_metadata(source: &RasterMetadata) -> RasterMetadata {
    source
        .clone()
        .with_band_count(1)
        .with_pixel_dtype(GdalDataType::Float32)
        .with_driver(OUTPUT_DRIVER)
}

/// Sequential normalized difference of bands `band_a_index` and
/// `band_b_index`.
pub fn compute_index(
    data: &RasterData,
    band_a_index: usize,
    band_b_index: usize,
    source: &RasterMetadata,
) -> Result<(IndexArray, RasterMetadata)> {
    NormalizedDifference::new(band_a_index, band_b_index, None).compute(
        data,
        source,
        &ParallelProcessor::sequential(),
    )
}
