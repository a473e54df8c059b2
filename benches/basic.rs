use criterion::{criterion_group, criterion_main, Criterion};
use mock_serialport::{framing, BridgeConfig, Mock, Options, ScriptedPort};
use std::hint::black_box;
use std::time::Duration;

fn scripted_mock(chunks: &[&[u8]], repeat: usize) -> (Mock, ScriptedPort) {
    let mut port = ScriptedPort::new();
    for _ in 0..repeat {
        for chunk in chunks {
            port.enqueue_read(chunk);
        }
    }
    let opener = port.clone();
    let options = Options::new(BridgeConfig::default())
        .with_open(move |_, _| Ok(opener.boxed()))
        .with_process(framing::replies([("hello", "world"), ("foo", "bar")]));
    (Mock::new(options), port)
}

pub fn bench_read_loop(c: &mut Criterion) {
    c.bench_function("replies_whole_requests", |b| {
        b.iter(|| {
            let (mut mock, port) = scripted_mock(&[b"hello", b"foo"], 100);
            mock.read().unwrap();
            black_box(port.written());
        })
    });

    c.bench_function("replies_split_requests", |b| {
        b.iter(|| {
            let (mut mock, port) = scripted_mock(&[b"he", b"llof", b"o", b"xo"], 100);
            mock.read().unwrap();
            black_box(port.written());
        })
    });
}

pub fn bench_command_args(c: &mut Criterion) {
    let bridge = BridgeConfig {
        extra_opts: "debug".to_string(),
        ..Default::default()
    };
    c.bench_function("socat_command_args", |b| {
        b.iter(|| black_box(black_box(&bridge).socat_command_args()))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_millis(300))
        .measurement_time(Duration::from_secs(2));
    targets = bench_read_loop, bench_command_args
}
criterion_main!(benches);
