use criterion::{Criterion, black_box, criterion_group, criterion_main};
use xizoa_core::{Project, decode_snapshot, encode_snapshot_pretty, preview};

fn large_project(files: usize, bytes_per_file: usize) -> Project {
    let mut project = Project::new();
    let body = "<div>lorem ipsum</div>".repeat(bytes_per_file / 22 + 1);
    project
        .create_file(
            "index.html",
            format!("<html><head><title>t</title></head><body>{body}</body></html>"),
        )
        .unwrap();
    project
        .create_file("style.css", "p{margin:0}".repeat(bytes_per_file / 11 + 1))
        .unwrap();
    project
        .create_file("script.js", "console.log(1);".repeat(bytes_per_file / 15 + 1))
        .unwrap();
    for i in 0..files {
        project
            .create_file(&format!("extra_{i}.js"), "let x = 1;\n".repeat(100))
            .unwrap();
    }
    project
}

fn bench_preview_render(c: &mut Criterion) {
    let project = large_project(10, 64 * 1024);
    c.bench_function("preview_render_64k", |b| {
        b.iter(|| preview::render(black_box(&project)))
    });
}

fn bench_snapshot_codec(c: &mut Criterion) {
    let project = large_project(200, 4 * 1024);
    let encoded = encode_snapshot_pretty(&project).unwrap();

    c.bench_function("snapshot_encode_200_files", |b| {
        b.iter(|| encode_snapshot_pretty(black_box(&project)).unwrap())
    });
    c.bench_function("snapshot_decode_200_files", |b| {
        b.iter(|| decode_snapshot(black_box(&encoded)).unwrap())
    });
}

criterion_group!(benches, bench_preview_render, bench_snapshot_codec);
criterion_main!(benches);
