use criterion::{Criterion, criterion_group, criterion_main};
use neuron_archive::embeddings::{ChunkingConfig, split_text};
use std::hint::black_box;

fn sample_document() -> String {
    let paragraph = "Spiking neural networks model neurons that communicate through discrete \
                     events. Each synapse carries a weight that is adjusted by learning rules \
                     such as spike timing dependent plasticity.\n\n";
    paragraph.repeat(400)
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let content = sample_document();
    let config = ChunkingConfig::default();
    c.bench_function("chunking", |b| {
        b.iter(|| split_text(black_box(&content), black_box(&config)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
