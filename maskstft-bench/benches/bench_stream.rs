use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use maskstft::{Enhancer, FrameSink, FrameSource, StreamConfig, UnityMask};

fn signal(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 * (i as f32 * 0.013).sin() + 0.1 * (i as f32 * 0.29).cos())
        .collect()
}

fn bench_per_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream_frame");
    let input = signal(16_000);
    for &dft_size in &[480usize, 512] {
        let config = StreamConfig {
            dft_size,
            ..StreamConfig::default()
        };
        let enhancer = Enhancer::<f32>::new(config, 16_000).unwrap();
        group.bench_function(BenchmarkId::new("analysis_synthesis", dft_size), |b| {
            b.iter_batched(
                || enhancer.open(&input, 1).unwrap(),
                |(mut analysis, mut synthesis)| {
                    let bins = analysis.bins();
                    let mut feature = vec![0.0f32; bins];
                    let mask = vec![1.0f32; bins];
                    while analysis.next_feature(&mut feature).unwrap().is_some() {
                        synthesis.consume(analysis.current(), &mask).unwrap();
                    }
                    synthesis.into_output()
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_enhance(c: &mut Criterion) {
    let input = signal(16_000);
    let enhancer = Enhancer::<f32>::new(StreamConfig::default(), 16_000).unwrap();
    c.bench_function("enhance_1s_16k", |b| {
        b.iter(|| {
            enhancer
                .enhance(&input, 1, &mut UnityMask::new(257))
                .unwrap()
        })
    });

    #[cfg(feature = "parallel")]
    {
        let inputs: Vec<Vec<f32>> = (0..8).map(|_| input.clone()).collect();
        let refs: Vec<&[f32]> = inputs.iter().map(Vec::as_slice).collect();
        c.bench_function("enhance_batch_8x1s_16k", |b| {
            b.iter(|| {
                enhancer
                    .enhance_batch(&refs, 1, |_| UnityMask::new(257))
                    .unwrap()
            })
        });
    }
}

criterion_group!(benches, bench_per_frame, bench_enhance);
criterion_main!(benches);
