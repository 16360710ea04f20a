//! Benchmarks for the renderer crate: palette rendering and PNG encoding.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use renderer::{palette, png, render, render_bands, Palette, RenderOptions};
use solar_common::{GeoBounds, RasterImage};

/// Flux-like values with noise, in kWh/m²/year.
fn generate_flux_raster(width: usize, height: usize, bands: usize) -> RasterImage {
    let mut rng = rand::thread_rng();
    let data = (0..bands)
        .map(|_| {
            (0..width * height)
                .map(|i| 400.0 + (i % width) as f32 + rng.gen_range(-20.0..20.0))
                .collect()
        })
        .collect();
    RasterImage::new(width, height, data, GeoBounds::new(1.0, 0.0, 1.0, 0.0)).unwrap()
}

/// Roof mask with roughly half the pixels set.
fn generate_mask(width: usize, height: usize) -> RasterImage {
    let mut rng = rand::thread_rng();
    let data = (0..width * height)
        .map(|_| if rng.gen_bool(0.5) { 1.0 } else { 0.0 })
        .collect();
    RasterImage::new(width, height, vec![data], GeoBounds::new(1.0, 0.0, 1.0, 0.0)).unwrap()
}

// =============================================================================
// RENDER BENCHMARKS
// =============================================================================

fn bench_render_continuous(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_continuous");

    for size in [256, 512, 1024] {
        let raster = generate_flux_raster(size, size, 1);
        let mask = generate_mask(size, size);
        let iron = palette::iron(0.0, 2000.0).unwrap();

        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(
            BenchmarkId::new("iron_masked", format!("{}x{}", size, size)),
            &raster,
            |b, raster| {
                b.iter(|| render(black_box(raster), Some(&mask), &iron, &RenderOptions::default()))
            },
        );
    }

    group.finish();
}

fn bench_render_binary(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_binary");
    let mask = generate_mask(512, 512);

    group.throughput(Throughput::Elements(512 * 512));
    group.bench_function("mask_512", |b| {
        b.iter(|| render(black_box(&mask), None, &palette::binary(), &RenderOptions::default()))
    });

    group.finish();
}

fn bench_render_monthly(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_bands");
    let raster = generate_flux_raster(256, 256, 12);
    let mask = generate_mask(256, 256);
    let iron: Palette = palette::iron(0.0, 200.0).unwrap();
    let indices: Vec<usize> = (0..12).collect();

    group.throughput(Throughput::Elements(12 * 256 * 256));
    group.bench_function("monthly_12x256", |b| {
        b.iter(|| {
            render_bands(
                black_box(&raster),
                Some(&mask),
                &iron,
                &RenderOptions::default(),
                &indices,
            )
        })
    });

    group.finish();
}

// =============================================================================
// PNG ENCODING BENCHMARKS
// =============================================================================

fn bench_png_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_encoding");

    let raster = generate_flux_raster(512, 512, 1);
    let options = RenderOptions::default();
    let iron = palette::iron(0.0, 1000.0).unwrap();
    let gradient = render(&raster, None, &iron, &options).unwrap();
    let binary = render(&generate_mask(512, 512), None, &palette::binary(), &options).unwrap();

    group.throughput(Throughput::Elements(512 * 512));
    group.bench_function("auto_gradient_512", |b| {
        b.iter(|| png::create_png_auto(black_box(gradient.pixels()), 512, 512))
    });
    group.bench_function("auto_binary_512", |b| {
        b.iter(|| png::create_png_auto(black_box(binary.pixels()), 512, 512))
    });
    group.bench_function("rgba_gradient_512", |b| {
        b.iter(|| png::create_png(black_box(gradient.pixels()), 512, 512))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_render_continuous,
    bench_render_binary,
    bench_render_monthly,
    bench_png_encoding
);
criterion_main!(benches);
