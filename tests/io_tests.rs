// tests/io_tests.rs
use std::fs;
use std::path::Path;

use gdal::raster::{Buffer, GdalDataType, GdalType};
use gdal::DriverManager;
use ndvi_calc::io::{load, save, save_with_options, Compression, WriteOptions};
use ndvi_calc::processing::{NormalizedDifference, ParallelProcessor};
use ndvi_calc::{ErrorKind, IndexArray, Pipeline, RasterData, RasterMetadata, RunOutcome};
use tempfile::tempdir;

const WGS84_WKT: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]"#;
const GEO_TRANSFORM: [f64; 6] = [12.0, 0.001, 0.0, 45.0, 0.0, -0.001];

/// Helper function to write a GeoTIFF with the given band planes
fn write_fixture<T: GdalType + Copy>(path: &Path, width: usize, height: usize, bands: &[Vec<T>]) {
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver
        .create_with_band_type::<T, _>(path, width, height, bands.len())
        .unwrap();
    dataset.set_projection(WGS84_WKT).unwrap();
    dataset.set_geo_transform(&GEO_TRANSFORM).unwrap();

    for (i, plane) in bands.iter().enumerate() {
        let mut band = dataset.rasterband(i + 1).unwrap();
        let mut buffer = Buffer::new((width, height), plane.clone());
        band.write((0, 0), (width, height), &mut buffer).unwrap();
    }
}

fn index_metadata(width: usize, height: usize) -> RasterMetadata {
    RasterMetadata::new("GTiff", GdalDataType::Float32, 1, width, height)
        .with_crs(Some(WGS84_WKT.to_string()))
        .with_geo_transform(Some(GEO_TRANSFORM))
}

#[test]
fn test_load_multiband() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rgb.tif");
    write_fixture(&path, 3, 2, &[vec![1; 6], vec![2; 6], vec![3; 6]]);

    let (data, metadata) = load(&path).unwrap();

    assert_eq!(data.shape(), (3, 2, 3));
    assert_eq!(metadata.band_count(), 3);
    assert_eq!((metadata.width(), metadata.height()), (3, 2));
    assert_eq!(metadata.pixel_dtype(), GdalDataType::UInt8);
    assert_eq!(metadata.driver(), "GTiff");
    assert_eq!(metadata.geo_transform(), Some(&GEO_TRANSFORM));
    assert!(metadata.crs().unwrap().contains("WGS 84"));

    match data {
        RasterData::U8(pixels) => assert_eq!(pixels.band(2), Some(&[3u8; 6][..])),
        other => panic!("expected byte samples, got {:?}", other.data_type()),
    }
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let err = load(dir.path().join("nope.tif")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_load_rejects_vector_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("points.geojson");
    fs::write(
        &path,
        r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{},
            "geometry":{"type":"Point","coordinates":[12.0,45.0]}}]}"#,
    )
    .unwrap();

    let err = load(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_load_mixed_band_types() {
    let dir = tempdir().unwrap();
    let red = dir.path().join("red.tif");
    let nir = dir.path().join("nir.tif");
    write_fixture(&red, 2, 1, &[vec![100u8, 50]]);
    write_fixture(&nir, 2, 1, &[vec![300u16, 1000]]);

    // band 1 and 2 are Byte, band 3 is UInt16 with values above 255
    let source = |file: &Path| {
        format!(
            "<SimpleSource><SourceFilename relativeToVRT=\"0\">{}</SourceFilename>\
             <SourceBand>1</SourceBand></SimpleSource>",
            file.display()
        )
    };
    let vrt = format!(
        "<VRTDataset rasterXSize=\"2\" rasterYSize=\"1\">\
         <VRTRasterBand dataType=\"Byte\" band=\"1\">{red}</VRTRasterBand>\
         <VRTRasterBand dataType=\"Byte\" band=\"2\">{red}</VRTRasterBand>\
         <VRTRasterBand dataType=\"UInt16\" band=\"3\">{nir}</VRTRasterBand>\
         </VRTDataset>",
        red = source(&red),
        nir = source(&nir),
    );
    let path = dir.path().join("mixed.vrt");
    fs::write(&path, vrt).unwrap();

    let (data, metadata) = load(&path).unwrap();
    assert_eq!(metadata.pixel_dtype(), GdalDataType::Float64);
    match &data {
        RasterData::F64(pixels) => {
            assert_eq!(pixels.band(0), Some(&[100.0, 50.0][..]));
            assert_eq!(pixels.band(2), Some(&[300.0, 1000.0][..]));
        }
        other => panic!("expected float64 samples, got {:?}", other.data_type()),
    }

    let ndvi = NormalizedDifference::new(0, 2, None);
    let (index, _) = ndvi
        .compute(&data, &metadata, &ParallelProcessor::sequential())
        .unwrap();
    assert_eq!(index.get(0, 0), Some(0.5));
    assert!((index.get(0, 1).unwrap() - 950.0 / 1050.0).abs() < 1e-6);
}

#[test]
fn test_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("index.tif");
    let values = vec![-1.0f32, -0.25, 0.0, 0.125, 0.5, 1.0];
    let index = IndexArray::new(2, 3, values.clone()).unwrap();

    save(&path, &index, &index_metadata(3, 2)).unwrap();
    let (data, metadata) = load(&path).unwrap();

    assert_eq!(metadata.band_count(), 1);
    assert_eq!(metadata.pixel_dtype(), GdalDataType::Float32);
    assert_eq!(metadata.geo_transform(), Some(&GEO_TRANSFORM));
    match data {
        RasterData::F32(pixels) => {
            assert_eq!(pixels.shape(), (1, 2, 3));
            assert_eq!(pixels.data(), values.as_slice());
        }
        other => panic!("expected float32 samples, got {:?}", other.data_type()),
    }
}

#[test]
fn test_nodata_is_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nodata.tif");
    let index = IndexArray::new(1, 2, vec![0.0, 0.5]).unwrap();
    let options = WriteOptions {
        compression: Compression::None,
        tiled: false,
        description: Some("NDVI".to_string()),
        ..WriteOptions::default()
    };

    let metadata = index_metadata(2, 1).with_nodata(Some(0.0));
    save_with_options(&path, &index, &metadata, &options).unwrap();
    let (_, metadata) = load(&path).unwrap();
    assert_eq!(metadata.nodata(), Some(0.0));
}

#[test]
fn test_writer_rejects_mismatched_metadata() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.tif");
    let index = IndexArray::new(2, 2, vec![0.0; 4]).unwrap();

    let err = save(&path, &index, &index_metadata(2, 2).with_band_count(3)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
    assert!(!path.exists());

    let err = save(&path, &index, &index_metadata(3, 2)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
    assert!(!path.exists());
}

#[test]
fn test_writer_invalid_destination() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("out.tif");
    let index = IndexArray::new(1, 1, vec![0.0]).unwrap();

    let err = save(&path, &index, &index_metadata(1, 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!path.exists());
}

#[test]
fn test_writer_removes_partial_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.tif");
    let index = IndexArray::new(1, 2, vec![0.0, 0.5]).unwrap();

    // the file is created before the projection is rejected
    let metadata = index_metadata(2, 1).with_crs(Some("not a crs".to_string()));
    let err = save(&path, &index, &metadata).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!path.exists());
}

#[test]
fn test_pipeline_end_to_end() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("scene.tif");
    let output = dir.path().join("ndvi.tif");
    write_fixture(&input, 2, 1, &[vec![0, 5], vec![9, 9], vec![0, 15]]);

    let pipeline = Pipeline::new(NormalizedDifference::new(0, 2, None), WriteOptions::default());
    let outcome = pipeline.run(&input, &output).unwrap();
    assert!(matches!(outcome, RunOutcome::Written { .. }));

    let (data, metadata) = load(&output).unwrap();
    assert_eq!(metadata.band_count(), 1);
    assert_eq!(metadata.geo_transform(), Some(&GEO_TRANSFORM));
    match data {
        // (0, 0) hits the zero-denominator guard; (15 - 5) / (15 + 5) = 0.5
        RasterData::F32(pixels) => assert_eq!(pixels.data(), &[0.0f32, 0.5]),
        other => panic!("expected float32 samples, got {:?}", other.data_type()),
    }
}

#[test]
fn test_pipeline_skips_two_band_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("two.tif");
    let output = dir.path().join("ndvi.tif");
    write_fixture(&input, 2, 2, &[vec![1; 4], vec![2; 4]]);

    let pipeline = Pipeline::new(NormalizedDifference::new(0, 2, None), WriteOptions::default());
    let outcome = pipeline.run(&input, &output).unwrap();

    assert_eq!(outcome, RunOutcome::Skipped { band_count: 2 });
    assert!(!output.exists());
}
