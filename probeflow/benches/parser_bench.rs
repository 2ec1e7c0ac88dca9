//! Benchmarks for section splitting and table trimming.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use probeflow::tables::SectionParser;
use probeflow::testing::SectionFileBuilder;
use probeflow::trim::DROPPED_COLUMNS;

fn sample_text(probes: usize) -> String {
    let rows: Vec<String> = (0..probes)
        .map(|i| {
            format!(
                "ILMN_{i}\tGENE{i}\tdefinition of gene {i}\tcomponent\tprocess\tfunction\tsyn{i}\t\tACGTACGTACGT\t{}",
                i % 23
            )
        })
        .collect();
    let mut probes_lines = vec![
        "ID_REF\tSymbol\tDefinition\tOntology_Component\tOntology_Process\tOntology_Function\tSynonyms\tObsolete_Probe_Id\tProbe_Sequence\tChromosome".to_string(),
    ];
    probes_lines.extend(rows);

    SectionFileBuilder::new()
        .section("Heading", &["Illumina Inc. GenomeStudio version\t1.9.0"])
        .section("Probes", &probes_lines)
        .section("Controls", &["ID_REF\tType", "ILMN_2038768\tNEGATIVE"])
        .build()
}

fn parser_benchmark(c: &mut Criterion) {
    let parser = SectionParser::new();
    let text = sample_text(10_000);

    c.bench_function("split_10k_probes", |b| {
        b.iter(|| parser.split(black_box(&text)))
    });

    let tables = parser.split(&text).unwrap_or_default();
    if let Some(probes) = tables.get("Probes") {
        c.bench_function("drop_columns_10k_probes", |b| {
            b.iter(|| {
                let mut table = probes.clone();
                black_box(table.drop_columns(&DROPPED_COLUMNS))
            })
        });
    }
}

criterion_group!(benches, parser_benchmark);
criterion_main!(benches);
