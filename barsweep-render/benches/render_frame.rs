use barsweep_core::{BarSpan, FrameStimulus};
use barsweep_render::{FrameSynth, RawMovie, CHANNELS};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn harness() -> (FrameSynth, RawMovie) {
    let rows = 96;
    let cols = 96;
    let synth = FrameSynth::new(rows, cols).expect("synth");
    let movie = RawMovie::allocate(rows, cols, 176, CHANNELS);
    (synth, movie)
}

pub fn bench_bar_frame(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_frame");
    g.sample_size(40);

    g.bench_function("bar_frame", |b| {
        b.iter_batched(
            || harness(),
            |(mut synth, mut movie)| {
                let span = BarSpan::for_frame(100, 60, 10);
                let img = synth.render(&FrameStimulus::Bar(span));
                movie.store_frame(99, &img).expect("store");
                black_box(movie.stored_frames());
            },
            BatchSize::SmallInput,
        )
    });

    g.bench_function("full_sweep", |b| {
        b.iter_batched(
            || harness(),
            |(mut synth, mut movie)| {
                for t in 61..=146 {
                    let img = synth.render(&FrameStimulus::Bar(BarSpan::for_frame(t, 60, 10)));
                    movie.store_frame(t - 1, &img).expect("store");
                }
                black_box(movie);
            },
            BatchSize::LargeInput,
        )
    });

    g.finish();
}

criterion_group!(benches, bench_bar_frame);
criterion_main!(benches);
