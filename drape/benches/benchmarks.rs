use criterion::{criterion_group, criterion_main, Criterion};
use dem::Raster;
use drape::{Drape, MemWorkspace, RasterSurface, ScratchGuard};
use geo::{coord, geometry::LineString};

/// A 1000 x 1000 cell tilted plane with 30 m cells.
fn synthetic_surface() -> RasterSurface {
    let (cols, rows) = (1000, 1000);
    let samples = (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (col + (rows - row)) as f32 * 0.5))
        .collect();
    let raster = Raster::from_samples(
        coord!(x: 15.0, y: 15.0),
        (30.0, 30.0),
        (cols, rows),
        samples,
    )
    .unwrap();
    RasterSurface::from(raster)
}

fn drape_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("Drape");

    let surface = synthetic_surface();
    let zigzag: LineString<f64> = (0..20)
        .map(|i| {
            let x = 1_000.0 + 1_400.0 * f64::from(i);
            let y = if i % 2 == 0 { 1_000.0 } else { 29_000.0 };
            coord!(x: x, y: y)
        })
        .collect();

    group.bench_with_input("zigzag", &(surface, zigzag), |b, (s, l)| {
        b.iter(|| {
            let workspace = MemWorkspace::new();
            let mut scratch = ScratchGuard::new(&workspace);
            Drape::builder().line(l).build(s, &mut scratch).unwrap()
        })
    });
}

criterion_group!(benches, drape_line);
criterion_main!(benches);
