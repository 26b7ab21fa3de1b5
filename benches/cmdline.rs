use criterion::{black_box, criterion_group, criterion_main, Criterion};
use link_shim::cmdline::{argument_tail, build_command_line};

fn bench_command_line(c: &mut Criterion) {
    let program: Vec<u16> = r"C:\Program Files\Shims\tool.exe".encode_utf16().collect();
    let args: String = (0..2_000).map(|i| format!("\"arg {i}\" ")).collect();
    let raw: Vec<u16> = format!(r#""C:\Program Files\Shims\tool.exe" {args}"#)
        .encode_utf16()
        .collect();
    let target: Vec<u16> = r"D:\pkg\1.2.0\tool.exe".encode_utf16().collect();

    c.bench_function("tail_and_rebuild_2k_args", |b| {
        b.iter(|| {
            let tail = argument_tail(black_box(&raw), black_box(&program));
            build_command_line(&target, tail)
        })
    });
}

criterion_group!(benches, bench_command_line);
criterion_main!(benches);
