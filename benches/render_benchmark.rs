//! Benchmark for frame rendering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trueno_live::buffer::StreamBuffer;
use trueno_live::color::{ChartTheme, Rgba};
use trueno_live::framebuffer::Framebuffer;
use trueno_live::generator::SyntheticGenerator;
use trueno_live::render::{draw_line_aa, ChartRenderer};
use trueno_live::surface::RasterSurface;
use trueno_live::viewport::ViewportConfig;

fn render_frame_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    group.sample_size(20);

    for points in [1_000, 10_000] {
        let mut buffer = StreamBuffer::new(["Alpha", "Beta", "Gamma", "Delta"], points).unwrap();
        buffer.backfill(SyntheticGenerator::new(7).initial_data(points, 0));
        let extent = buffer.extent().unwrap();
        let viewport = ViewportConfig::from_extent(&extent, 0.05, 0.1).unwrap();

        for ratio in [1.0, 2.0] {
            let surface = RasterSurface::new(800.0, 400.0, ratio).unwrap();
            let mut renderer =
                ChartRenderer::new(surface, ChartTheme::default(), 800.0, 400.0, ratio).unwrap();

            group.bench_with_input(
                BenchmarkId::new(format!("{points}pts"), format!("{ratio}x")),
                &ratio,
                |b, _| {
                    b.iter(|| black_box(renderer.render_frame(&viewport, &buffer)));
                },
            );
        }
    }

    group.finish();
}

fn line_benchmark(c: &mut Criterion) {
    let mut fb = Framebuffer::new(1600, 800).unwrap();
    fb.clear(Rgba::BLACK);
    let color = Rgba::rgb(100, 180, 255);

    c.bench_function("draw_line_aa_diagonal", |b| {
        b.iter(|| {
            draw_line_aa(&mut fb, black_box(0.0), 0.0, black_box(1599.0), 799.0, color);
        });
    });
}

criterion_group!(benches, render_frame_benchmark, line_benchmark);
criterion_main!(benches);
