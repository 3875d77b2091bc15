use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion};

use octfmm::{fmm::helpers::points_fixture, Octree, TreeConstruction};

fn octree_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("Octree construction f64");

    group
        .sample_size(10)
        .measurement_time(Duration::from_secs(5));

    for n_points in [100_000, 1_000_000] {
        let points = points_fixture::<f64>(n_points, None, None, Some(0));
        let charges = vec![1.0; n_points];

        for construction in [TreeConstruction::TopDown, TreeConstruction::BottomUp] {
            for n_crit in [32, 150] {
                group.bench_function(
                    format!("{construction} n_points={n_points} n_crit={n_crit}"),
                    |b| {
                        b.iter(|| {
                            Octree::from_points(&points, &charges, construction, n_crit, 16)
                                .unwrap()
                        })
                    },
                );
            }
        }
    }

    group.finish();
}

criterion_group!(benches, octree_construction);
criterion_main!(benches);
