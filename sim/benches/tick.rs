//! Tick throughput on a full arena.
//!
//! Run with: cargo bench --bench tick (add --features parallel to compare)

use arena_sim::army::capacity;
use arena_sim::{Battlefield, Composition, FieldConfig, SpeciesTable};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

const SPECIES: &str = include_str!("../data/species.json");

fn full_army(table: &SpeciesTable, total: u32) -> Composition {
    let names: Vec<&str> = table.names().collect();
    let per = total / names.len() as u32;
    names.into_iter().map(|n| (n.to_string(), per)).collect()
}

fn bench_tick(c: &mut Criterion) {
    let table = SpeciesTable::from_json(SPECIES).expect("species data parses");
    let mut group = c.benchmark_group("tick");

    for total in [14u32, 70, capacity(&FieldConfig::default()) as u32] {
        let army = full_army(&table, total);
        group.bench_function(format!("{total}_per_side"), |b| {
            b.iter_batched(
                || {
                    let mut field = Battlefield::new();
                    field
                        .setup_battle(&army, &army, &table)
                        .expect("army fits");
                    field
                },
                |mut field| {
                    for _ in 0..30 {
                        black_box(field.run_one_tick().expect("tick runs"));
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);
