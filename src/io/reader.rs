// src/io/reader.rs
use std::path::Path;

use gdal::errors::GdalError;
use gdal::raster::GdalDataType;
use gdal::{Dataset, DatasetOptions, GdalOpenFlags};
use tracing::{debug, info};

use crate::error::{NdviError, Result};
use crate::raster::{PixelArray, RasterData, RasterMetadata, Sample};

/// Source of whole rasters for the pipeline.
pub trait RasterReader {
    fn read(&self, path: &Path) -> Result<(RasterData, RasterMetadata)>;
}

/// Reads any raster format the linked GDAL build supports.
#[derive(Debug, Clone, Copy, Default)]
pub struct GdalReader;

impl RasterReader for GdalReader {
    fn read(&self, path: &Path) -> Result<(RasterData, RasterMetadata)> {
        load(path)
    }
}

/// Read every band of the raster at `path` in its native sample type.
///
/// The dataset is closed before this returns, on success and on error.
pub fn load<P: AsRef<Path>>(path: P) -> Result<(RasterData, RasterMetadata)> {
    let path = path.as_ref();
    // Raster drivers only, so vector files fail to open instead of
    // opening with zero bands
    let options = DatasetOptions {
        open_flags: GdalOpenFlags::GDAL_OF_RASTER,
        ..DatasetOptions::default()
    };
    let dataset = Dataset::open_ex(path, options).map_err(|source| NdviError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let read_error = |source: GdalError| NdviError::Read {
        path: path.to_path_buf(),
        source,
    };

    let (width, height) = dataset.raster_size();
    let band_count = dataset.raster_count();
    if band_count == 0 {
        return Err(NdviError::NotRaster(path.to_path_buf()));
    }

    let band_types = (1..=band_count)
        .map(|index| dataset.rasterband(index).map(|band| band.band_type()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(read_error)?;
    let dtype = common_band_type(&band_types);
    let nodata = dataset
        .rasterband(1)
        .map_err(read_error)?
        .no_data_value();

    let projection = dataset.projection();
    let crs = (!projection.is_empty()).then_some(projection);
    let geo_transform = dataset.geo_transform().ok();
    let driver = dataset.driver().short_name();

    info!("Image opened successfully: {}", path.display());
    info!("Number of bands: {}", band_count);
    info!("Image width: {}, height: {}", width, height);
    info!(
        "Coordinate Reference System (CRS): {}",
        crs.as_deref().unwrap_or("none")
    );
    debug!(%driver, ?band_types, ?nodata, ?geo_transform, "raster metadata");

    let size = (width, height);
    let data: RasterData = match dtype {
        GdalDataType::UInt8 => read_bands::<u8>(&dataset, path, band_count, size)?.into(),
        GdalDataType::UInt16 => read_bands::<u16>(&dataset, path, band_count, size)?.into(),
        GdalDataType::Int16 => read_bands::<i16>(&dataset, path, band_count, size)?.into(),
        GdalDataType::UInt32 => read_bands::<u32>(&dataset, path, band_count, size)?.into(),
        GdalDataType::Int32 => read_bands::<i32>(&dataset, path, band_count, size)?.into(),
        GdalDataType::Float32 => read_bands::<f32>(&dataset, path, band_count, size)?.into(),
        other => {
            debug!(?other, "reading samples as Float64");
            read_bands::<f64>(&dataset, path, band_count, size)?.into()
        }
    };

    let metadata = RasterMetadata::new(driver, dtype, band_count, width, height)
        .with_crs(crs)
        .with_geo_transform(geo_transform)
        .with_nodata(nodata);

    Ok((data, metadata))
}

/// Sample type shared by every band. Bands of differing types are read
/// as Float64 so no band is narrowed to another band's type.
pub fn common_band_type(band_types: &[GdalDataType]) -> GdalDataType {
    match band_types.split_first() {
        Some((&first, rest)) if rest.iter().all(|&t| t == first) => first,
        Some(_) => {
            debug!(?band_types, "mixed band types, reading samples as Float64");
            GdalDataType::Float64
        }
        None => GdalDataType::Unknown,
    }
}

/// All bands, band-major; every read covers the full window.
fn read_bands<T: Sample>(
    dataset: &Dataset,
    path: &Path,
    band_count: usize,
    (width, height): (usize, usize),
) -> Result<PixelArray<T>> {
    let read_error = |source: GdalError| NdviError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut data = Vec::with_capacity(band_count * width * height);
    for index in 1..=band_count {
        let band = dataset.rasterband(index).map_err(read_error)?;
        let buffer = band
            .read_as::<T>((0, 0), (width, height), (width, height), None)
            .map_err(read_error)?;
        let (_, samples) = buffer.into_shape_and_vec();
        data.extend(samples);
    }

    PixelArray::new(band_count, height, width, data)
}
