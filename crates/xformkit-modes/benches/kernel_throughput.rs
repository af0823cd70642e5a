use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use xformkit_core::element::TransformElement;
use xformkit_core::group::ElementGroup;
use xformkit_core::session::TransformSession;
use xformkit_core::settings::{settings_handle, TransformSettings};
use xformkit_core::ModeKind;
use xformkit_modes::kernel_for;

fn session_of(n: usize, parallel_threshold: usize) -> TransformSession {
    let elements = (0..n)
        .map(|i| TransformElement::at(Vec3::new(i as f32 * 0.01, 0.0, 0.0)))
        .collect();
    let mut settings = TransformSettings::default();
    settings.parallel_threshold = parallel_threshold;
    TransformSession::builder(ModeKind::Translate)
        .group(ElementGroup::new("bench", elements))
        .settings(settings_handle(settings))
        .build()
        .unwrap()
}

fn bench_translate(c: &mut Criterion) {
    let kernel = kernel_for(ModeKind::Translate);
    let mut group = c.benchmark_group("translate_apply");
    for &n in &[1_000usize, 100_000] {
        let mut serial = session_of(n, usize::MAX);
        kernel.init(&mut serial).unwrap();
        serial.values = [1.0, 2.0, 3.0, 0.0];
        group.bench_with_input(BenchmarkId::new("serial", n), &n, |b, _| {
            b.iter(|| kernel.apply(&mut serial));
        });

        let mut threaded = session_of(n, 1024);
        kernel.init(&mut threaded).unwrap();
        threaded.values = [1.0, 2.0, 3.0, 0.0];
        group.bench_with_input(BenchmarkId::new("threaded", n), &n, |b, _| {
            b.iter(|| kernel.apply(&mut threaded));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_translate);
criterion_main!(benches);
