use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gdal::raster::GdalDataType;
use ndvi_calc::processing::{NormalizedDifference, ParallelProcessor};
use ndvi_calc::{PixelArray, RasterData, RasterMetadata};

/// Synthetic 3-band byte raster of the given size
fn synthetic_raster(size: (usize, usize)) -> (RasterData, RasterMetadata) {
    let (width, height) = size;
    let len = width * height;
    let red: Vec<u8> = (0..len).map(|i| 40 + (i % 100) as u8).collect();
    let green = vec![0u8; len];
    let nir: Vec<u8> = (0..len).map(|i| 120 + (i % 50) as u8).collect();

    let pixels = PixelArray::from_bands(height, width, vec![red, green, nir]).unwrap();
    let metadata = RasterMetadata::new("GTiff", GdalDataType::UInt8, 3, width, height);
    (pixels.into(), metadata)
}

/// Benchmark the index kernel on the calling thread and on a pool
fn benchmark_ndvi_calculation(c: &mut Criterion) {
    let (data, metadata) = synthetic_raster((1024, 1024));
    let ndvi = NormalizedDifference::new(0, 2, None);

    let sequential = ParallelProcessor::sequential();
    c.bench_function("ndvi_sequential", |b| {
        b.iter(|| ndvi.compute(black_box(&data), &metadata, &sequential).unwrap())
    });

    let pooled = ParallelProcessor::new(Some(0)).unwrap();
    c.bench_function("ndvi_all_cpus", |b| {
        b.iter(|| ndvi.compute(black_box(&data), &metadata, &pooled).unwrap())
    });
}

criterion_group!(benches, benchmark_ndvi_calculation);
criterion_main!(benches);
