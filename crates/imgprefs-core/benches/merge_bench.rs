//! Criterion benchmarks for override parsing and merge.
//!
//! Run with:
//! ```bash
//! cargo bench --package imgprefs-core --bench merge_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use imgprefs_core::{
    get_defaults, merge, merge_document, DocumentFormat, PreferenceOverrides, PreferenceSet,
    UnknownKeyPolicy,
};

const OVERRIDES_JSON: &str = r#"{
  "globalOpts": {"helperType": "nodejs", "helperPort": 2719, "dataPath": "/a:/b:/c"},
  "imageOpts": {"colormap": "heat", "scale": "log"}
}"#;

fn bench_merge(c: &mut Criterion) {
    let overrides = PreferenceOverrides::from_json_str(OVERRIDES_JSON, UnknownKeyPolicy::Reject)
        .expect("fixture overrides must parse");

    c.bench_function("merge_parsed_overrides", |b| {
        b.iter(|| merge(black_box(&overrides)))
    });

    c.bench_function("merge_document_json", |b| {
        b.iter(|| {
            merge_document(
                black_box(OVERRIDES_JSON),
                DocumentFormat::Json,
                UnknownKeyPolicy::Reject,
            )
            .expect("merge")
        })
    });
}

fn bench_codec(c: &mut Criterion) {
    let prefs = get_defaults();
    let toml_text = prefs.to_toml_string().expect("fixture must serialize");

    c.bench_function("render_toml", |b| b.iter(|| black_box(&prefs).to_toml_string()));
    c.bench_function("parse_toml", |b| {
        b.iter(|| PreferenceSet::from_toml_str(black_box(&toml_text)))
    });
}

criterion_group!(benches, bench_merge, bench_codec);
criterion_main!(benches);
