use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use crossbeam_channel::bounded;
use input_probe::engine::channel::ChannelId;
use input_probe::event::EvdevTranslator;
use input_probe::logger::{LogMessage, Logger};
use input_probe::{Engine, InputEvent};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::*;

/// A typing burst: eight keys, each tapped ten times 120 ms apart.
fn typing_burst() -> Vec<InputEvent> {
    let keys: Vec<_> = ["KeyA", "KeyS", "KeyD", "KeyF", "KeyJ", "KeyK", "KeyL", "Space"]
        .iter()
        .map(|k| key(k))
        .collect();
    let mut events = Vec::with_capacity(keys.len() * 20);
    let mut ts = 0;
    for _ in 0..10 {
        for k in &keys {
            events.extend(tap(k, ts, ts + 40 * MS));
            ts += 15 * MS;
        }
        ts += 120 * MS;
    }
    events
}

fn bench_engine_process(c: &mut Criterion) {
    let burst = typing_burst();
    c.bench_function("engine::process_typing_burst", |b| {
        b.iter_batched(
            Engine::default,
            |mut engine| {
                for ev in &burst {
                    engine.process(black_box(ev));
                }
                engine
            },
            BatchSize::SmallInput,
        )
    });

    let left = ChannelId::Button(0);
    c.bench_function("engine::chatter_down", |b| {
        b.iter_batched(
            || {
                let mut engine = Engine::default();
                engine.process(&down(&left, 0));
                engine.process(&up(&left, 10 * MS));
                engine
            },
            |mut engine| {
                engine.process(black_box(&down(&left, 30 * MS)));
                engine
            },
            BatchSize::SmallInput,
        )
    });

    // Steady 1000 Hz pointer stream with a full timing window.
    c.bench_function("engine::pointer_sample_1khz", |b| {
        let mut engine = Engine::default();
        let mut ts = 0u64;
        b.iter(|| {
            ts += 1_000;
            engine.on_pointer_sample(black_box(ts))
        })
    });

    c.bench_function("engine::snapshot", |b| {
        let mut engine = Engine::default();
        for ev in &burst {
            engine.process(ev);
        }
        b.iter(|| black_box(engine.snapshot()))
    });
}

fn bench_evdev_translate(c: &mut Criterion) {
    let frame = [key_ev(0, KEY_A, 1), rel_x_ev(0, 3), syn_ev(0)];
    c.bench_function("event::evdev_translate_frame", |b| {
        let mut translator = EvdevTranslator::new();
        let mut out = Vec::with_capacity(4);
        b.iter(|| {
            for ev in &frame {
                translator.translate(black_box(ev), &mut out);
            }
            out.clear();
        })
    });
}

fn bench_logger_throughput(c: &mut Criterion) {
    let mut engine = Engine::default();
    for ev in &typing_burst() {
        engine.process(ev);
    }
    let entries: Vec<_> = engine.log().since(0).cloned().collect();
    let cfg = dummy_config(Duration::from_millis(80), true, true);

    c.bench_function("logger::run_json_feed", |b| {
        b.iter_batched(
            || {
                let (tx, rx) = bounded(entries.len());
                for e in &entries {
                    let _ = tx.send(LogMessage::Entry(e.clone()));
                }
                rx
            },
            |rx| {
                let mut sink = std::io::sink();
                Logger::new(rx, Arc::new(AtomicBool::new(true)), Arc::clone(&cfg), &mut sink).run()
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_engine_process, bench_evdev_translate, bench_logger_throughput);
criterion_main!(benches);
