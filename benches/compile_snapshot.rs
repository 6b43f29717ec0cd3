use criterion::{Criterion, criterion_group, criterion_main};
use ecs_schema_sync::change::has_changed;
use ecs_schema_sync::cli::CompatMode;
use ecs_schema_sync::snapshot::{ReadOptions, Snapshot, read_snapshot_bytes};
use ecs_schema_sync::sql::{TableTarget, compile};

fn generate_fields(rows: usize, version: &str) -> Snapshot {
    let mut csv = String::from(
        "ECS_Version,Indexed,Field_Set,Field,Type,Level,Normalization,Example,Description\n",
    );
    let field_sets = ["base", "host", "event", "process", "user"];
    let types = ["keyword", "long", "date", "ip", "text"];
    for i in 0..rows {
        let field_set = field_sets[i % field_sets.len()];
        let field_type = types[i % types.len()];
        let level = if i % 3 == 0 { "core" } else { "extended" };
        csv.push_str(&format!(
            "{version},true,{field_set},{field_set}.field_{i},{field_type},{level},,,Field number {i}\n"
        ));
    }
    read_snapshot_bytes(csv.as_bytes(), "bench", ReadOptions::default()).expect("bench snapshot")
}

fn bench_compile(c: &mut Criterion) {
    let snapshot = generate_fields(2_000, "9.0.0");
    let target = TableTarget::new("ecs", "elastic_log_schema", "postgres");
    c.bench_function("compile_2000_fields", |b| {
        b.iter(|| compile(&snapshot, &target, CompatMode::Strict))
    });
}

fn bench_change_detection(c: &mut Criterion) {
    let old = generate_fields(2_000, "9.0.0");
    let new = generate_fields(2_000, "9.0.0");
    c.bench_function("detect_unchanged_2000_fields", |b| {
        b.iter(|| has_changed(Some(&old), &new, CompatMode::Strict))
    });
}

criterion_group!(benches, bench_compile, bench_change_detection);
criterion_main!(benches);
