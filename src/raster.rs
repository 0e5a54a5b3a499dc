// src/raster.rs
use gdal::raster::{GdalDataType, GdalType};
use itertools::{Itertools, MinMaxResult};

use crate::error::{NdviError, Result};

/// Affine transform in GDAL order: origin x, pixel width, row rotation,
/// origin y, column rotation, pixel height.
pub type GeoTransform = [f64; 6];

/// Native sample types the loader keeps without conversion.
pub trait Sample: GdalType + Copy + Into<f64> + Send + Sync {}

impl<T> Sample for T where T: GdalType + Copy + Into<f64> + Send + Sync {}

/// Band-major pixel grid with shape (bands, height, width).
#[derive(Debug, Clone, PartialEq)]
pub struct PixelArray<T> {
    bands: usize,
    height: usize,
    width: usize,
    data: Vec<T>,
}

impl<T: Copy> PixelArray<T> {
    pub fn new(bands: usize, height: usize, width: usize, data: Vec<T>) -> Result<Self> {
        if bands == 0 {
            return Err(NdviError::Shape("pixel array needs at least one band".to_string()));
        }
        let expected = bands * height * width;
        if data.len() != expected {
            return Err(NdviError::Shape(format!(
                "expected {} samples for shape ({}, {}, {}), got {}",
                expected,
                bands,
                height,
                width,
                data.len()
            )));
        }
        Ok(Self {
            bands,
            height,
            width,
            data,
        })
    }

    /// Stack equally sized band planes into one array.
    pub fn from_bands(height: usize, width: usize, bands: Vec<Vec<T>>) -> Result<Self> {
        let count = bands.len();
        let mut data = Vec::with_capacity(count * height * width);
        for (i, band) in bands.into_iter().enumerate() {
            if band.len() != height * width {
                return Err(NdviError::Shape(format!(
                    "band {} has {} samples, expected {}x{}",
                    i,
                    band.len(),
                    height,
                    width
                )));
            }
            data.extend(band);
        }
        Self::new(count, height, width, data)
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.bands, self.height, self.width)
    }

    pub fn band_count(&self) -> usize {
        self.bands
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// One band plane in row-major order.
    pub fn band(&self, index: usize) -> Option<&[T]> {
        if index >= self.bands {
            return None;
        }
        let plane = self.height * self.width;
        Some(&self.data[index * plane..(index + 1) * plane])
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }
}

/// A loaded raster in its native sample type.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterData {
    U8(PixelArray<u8>),
    U16(PixelArray<u16>),
    I16(PixelArray<i16>),
    U32(PixelArray<u32>),
    I32(PixelArray<i32>),
    F32(PixelArray<f32>),
    F64(PixelArray<f64>),
}

/// Run `$body` with `$pixels` bound to the typed array inside a `RasterData`.
macro_rules! with_pixels {
    ($data:expr, $pixels:ident => $body:expr) => {
        match $data {
            $crate::raster::RasterData::U8($pixels) => $body,
            $crate::raster::RasterData::U16($pixels) => $body,
            $crate::raster::RasterData::I16($pixels) => $body,
            $crate::raster::RasterData::U32($pixels) => $body,
            $crate::raster::RasterData::I32($pixels) => $body,
            $crate::raster::RasterData::F32($pixels) => $body,
            $crate::raster::RasterData::F64($pixels) => $body,
        }
    };
}
pub(crate) use with_pixels;

impl RasterData {
    pub fn shape(&self) -> (usize, usize, usize) {
        with_pixels!(self, p => p.shape())
    }

    pub fn band_count(&self) -> usize {
        self.shape().0
    }

    /// Sample type of the in-memory array.
    pub fn data_type(&self) -> GdalDataType {
        match self {
            Self::U8(_) => GdalDataType::UInt8,
            Self::U16(_) => GdalDataType::UInt16,
            Self::I16(_) => GdalDataType::Int16,
            Self::U32(_) => GdalDataType::UInt32,
            Self::I32(_) => GdalDataType::Int32,
            Self::F32(_) => GdalDataType::Float32,
            Self::F64(_) => GdalDataType::Float64,
        }
    }
}

macro_rules! impl_from_pixels {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<PixelArray<$t>> for RasterData {
                fn from(pixels: PixelArray<$t>) -> Self {
                    Self::$variant(pixels)
                }
            }
        )*
    };
}

impl_from_pixels!(
    u8 => U8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    f32 => F32,
    f64 => F64,
);

/// Single-band float32 result of an index computation.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexArray {
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl IndexArray {
    pub fn new(height: usize, width: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != height * width {
            return Err(NdviError::Shape(format!(
                "expected {} values for a {}x{} index, got {}",
                height * width,
                height,
                width,
                data.len()
            )));
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.data[row * self.width + col])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        // chunks() rejects a zero chunk size
        self.data.chunks(self.width.max(1))
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn summary(&self) -> IndexSummary {
        let (min, max) = match self.data.iter().copied().minmax() {
            MinMaxResult::NoElements => (0.0, 0.0),
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };
        let mean = if self.data.is_empty() {
            0.0
        } else {
            self.data.iter().map(|&v| f64::from(v)).sum::<f64>() / self.data.len() as f64
        };
        IndexSummary { min, max, mean }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSummary {
    pub min: f32,
    pub max: f32,
    pub mean: f64,
}

/// Description of a raster file. Values are never modified in place: every
/// `with_*` call consumes the record and returns the changed copy.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterMetadata {
    driver: String,
    pixel_dtype: GdalDataType,
    band_count: usize,
    width: usize,
    height: usize,
    crs: Option<String>,
    geo_transform: Option<GeoTransform>,
    nodata: Option<f64>,
}

impl RasterMetadata {
    pub fn new(
        driver: impl Into<String>,
        pixel_dtype: GdalDataType,
        band_count: usize,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            driver: driver.into(),
            pixel_dtype,
            band_count,
            width,
            height,
            crs: None,
            geo_transform: None,
            nodata: None,
        }
    }

    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn pixel_dtype(&self) -> GdalDataType {
        self.pixel_dtype
    }

    pub fn band_count(&self) -> usize {
        self.band_count
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Coordinate reference system as WKT.
    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    pub fn geo_transform(&self) -> Option<&GeoTransform> {
        self.geo_transform.as_ref()
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn with_driver(self, driver: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            ..self
        }
    }

    pub fn with_pixel_dtype(self, pixel_dtype: GdalDataType) -> Self {
        Self {
            pixel_dtype,
            ..self
        }
    }

    pub fn with_band_count(self, band_count: usize) -> Self {
        Self { band_count, ..self }
    }

    pub fn with_crs(self, crs: Option<String>) -> Self {
        Self { crs, ..self }
    }

    pub fn with_geo_transform(self, geo_transform: Option<GeoTransform>) -> Self {
        Self {
            geo_transform,
            ..self
        }
    }

    pub fn with_nodata(self, nodata: Option<f64>) -> Self {
        Self { nodata, ..self }
    }

    /// Fail unless this record describes an array of the given shape.
    pub fn ensure_shape(&self, bands: usize, height: usize, width: usize) -> Result<()> {
        if self.band_count != bands || self.height != height || self.width != width {
            return Err(NdviError::Shape(format!(
                "metadata describes ({}, {}, {}) but array is ({}, {}, {})",
                self.band_count, self.height, self.width, bands, height, width
            )));
        }
        Ok(())
    }
}
