use criterion::{Criterion, criterion_group, criterion_main};
use neuron_archive::loader::extractor::extract_page;
use std::fmt::Write;
use std::hint::black_box;

fn sample_page() -> String {
    let mut html = String::from(
        "<html><head><title>Neuron reference</title><script>var x = 1;</script></head><body>\
         <nav><a href=\"/\">Home</a></nav><main><h1>Neurons</h1>",
    );
    for i in 0..300 {
        let _ = write!(
            html,
            "<h2>Section {i}</h2><p>Dendrites receive <em>signals</em> &amp; the axon \
             transmits them.</p><ul><li>Item {i}a</li><li>Item {i}b</li></ul>\
             <div class=\"advertisement\">Buy now</div>"
        );
    }
    html.push_str("</main><footer>Footer</footer></body></html>");
    html
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let page = sample_page();
    c.bench_function("extraction", |b| b.iter(|| extract_page(black_box(&page))));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
