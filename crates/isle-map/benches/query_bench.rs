use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec2;
use isle_map::IsleMap;

fn bench_terrain_at(c: &mut Criterion) {
    let map = IsleMap::standard();

    c.bench_function("terrain_at_grid", |b| {
        b.iter(|| {
            // Sweep a coarse grid across the whole arena
            for ix in 0..20 {
                for iy in 0..12 {
                    let p = Vec2::new(-5.0 + ix as f32 * 0.5, -3.0 + iy as f32 * 0.5);
                    black_box(map.terrain_at(black_box(p), 0.1));
                }
            }
        })
    });
}

fn bench_structures_containing(c: &mut Criterion) {
    let map = IsleMap::standard();

    c.bench_function("structures_containing", |b| {
        b.iter(|| black_box(map.structures_containing(black_box(Vec2::new(0.0, 1.3))).count()))
    });
}

criterion_group!(benches, bench_terrain_at, bench_structures_containing);
criterion_main!(benches);
