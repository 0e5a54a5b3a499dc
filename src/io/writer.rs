// src/io/writer.rs
use std::path::Path;

use clap::ValueEnum;
use gdal::errors::GdalError;
use gdal::raster::{Buffer, RasterCreationOptions};
use gdal::{Dataset, DriverManager, Metadata};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{NdviError, Result};
use crate::raster::{IndexArray, RasterMetadata};

/// GeoTIFF compression codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    #[default]
    Deflate,
    Lzw,
    Zstd,
}

impl Compression {
    fn gdal_name(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Deflate => Some("DEFLATE"),
            Self::Lzw => Some("LZW"),
            Self::Zstd => Some("ZSTD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    pub compression: Compression,
    pub compress_level: u8,
    pub tiled: bool,
    /// Band description, usually the index name.
    pub description: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compression: Compression::Deflate,
            compress_level: 6,
            tiled: true,
            description: None,
        }
    }
}

impl WriteOptions {
    /// GTiff creation options in `KEY=VALUE` form.
    pub fn creation_options(&self) -> Vec<String> {
        let mut options = Vec::new();

        if let Some(codec) = self.compression.gdal_name() {
            options.push(format!("COMPRESS={codec}"));

            // Add compression level for supported algorithms
            match self.compression {
                Compression::Deflate => {
                    options.push(format!("ZLEVEL={}", self.compress_level.clamp(1, 9)))
                }
                Compression::Zstd => {
                    options.push(format!("ZSTD_LEVEL={}", self.compress_level.clamp(1, 22)))
                }
                _ => {}
            }
        }

        if self.tiled {
            options.push("TILED=YES".to_string());
        }

        options
    }
}

/// Destination for finished index rasters.
pub trait RasterWriter {
    fn write(&self, path: &Path, index: &IndexArray, metadata: &RasterMetadata) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct GdalWriter {
    options: WriteOptions,
}

impl GdalWriter {
    pub fn new(options: WriteOptions) -> Self {
        Self { options }
    }
}

impl RasterWriter for GdalWriter {
    fn write(&self, path: &Path, index: &IndexArray, metadata: &RasterMetadata) -> Result<()> {
        save_with_options(path, index, metadata, &self.options)
    }
}

/// Write `index` as a single float32 band with default options.
pub fn save<P: AsRef<Path>>(path: P, index: &IndexArray, metadata: &RasterMetadata) -> Result<()> {
    save_with_options(path, index, metadata, &WriteOptions::default())
}

/// Write `index` as a single float32 band in the format named by
/// `metadata`. A file left behind by a failed write is removed.
pub fn save_with_options<P: AsRef<Path>>(
    path: P,
    index: &IndexArray,
    metadata: &RasterMetadata,
    options: &WriteOptions,
) -> Result<()> {
    let path = path.as_ref();
    metadata.ensure_shape(1, index.height(), index.width())?;

    let write_error = |source: GdalError| NdviError::Write {
        path: path.to_path_buf(),
        source,
    };

    let driver = DriverManager::get_driver_by_name(metadata.driver()).map_err(write_error)?;
    let creation_options = if metadata.driver().eq_ignore_ascii_case("GTiff") {
        options.creation_options()
    } else {
        Vec::new()
    };
    debug!(driver = metadata.driver(), ?creation_options, "creating output raster");

    let mut dataset = driver
        .create_with_band_type_with_options::<f32, _>(
            path,
            index.width(),
            index.height(),
            1,
            &RasterCreationOptions::from_iter(creation_options),
        )
        .map_err(write_error)?;

    let written = write_band(&mut dataset, index, metadata, options);
    // Close the file before any cleanup
    drop(dataset);

    if let Err(source) = written {
        remove_partial(path);
        return Err(write_error(source));
    }

    info!("Processed image saved as {}", path.display());
    Ok(())
}

fn write_band(
    dataset: &mut Dataset,
    index: &IndexArray,
    metadata: &RasterMetadata,
    options: &WriteOptions,
) -> std::result::Result<(), GdalError> {
    if let Some(crs) = metadata.crs() {
        dataset.set_projection(crs)?;
    }
    if let Some(geo_transform) = metadata.geo_transform() {
        dataset.set_geo_transform(geo_transform)?;
    }

    let mut band = dataset.rasterband(1)?;
    if let Some(nodata) = metadata.nodata() {
        band.set_no_data_value(Some(nodata))?;
    }
    if let Some(description) = &options.description {
        band.set_description(description)?;
    }

    let shape = (index.width(), index.height());
    let mut buffer = Buffer::new(shape, index.data().to_vec());
    band.write((0, 0), shape, &mut buffer)?;

    dataset.flush_cache()?;
    Ok(())
}

fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => warn!("Removed incomplete output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove incomplete output {}: {}", path.display(), e),
    }
}
