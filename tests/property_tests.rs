//! Property-based tests for the engine using proptest.

use input_probe::engine::channel::{ChannelId, MOUSE_BUTTONS};
use input_probe::{Engine, InputEvent};
use proptest::prelude::*;

// --- Test Constants ---
const MAX_EVENTS: usize = 400;
const MAX_TIME_DELTA_US: u64 = 200_000;
const KEYS: [&str; 4] = ["KeyA", "KeyS", "ShiftLeft", "Space"];

fn random_channel() -> ChannelId {
    match fastrand::u8(0..3) {
        0 => ChannelId::Button(fastrand::u8(0..MOUSE_BUTTONS)),
        _ => ChannelId::key(KEYS[fastrand::usize(..KEYS.len())]),
    }
}

/// Strategy for generating host event sequences with non-decreasing timestamps.
/// A small channel pool keeps presses, repeats and duplicate ups colliding.
fn arb_event_sequence() -> impl Strategy<Value = Vec<InputEvent>> {
    (prop::collection::vec(Just(()), 0..=MAX_EVENTS), any::<u64>()).prop_map(|(slots, seed)| {
        fastrand::seed(seed);
        let mut ts_us = 0u64;
        slots
            .iter()
            .map(|_| {
                ts_us += fastrand::u64(0..=MAX_TIME_DELTA_US);
                match fastrand::u8(0..100) {
                    0..=34 => InputEvent::Down {
                        channel: random_channel(),
                        ts_us,
                        repeat: fastrand::u8(0..5) == 0,
                        label: None,
                    },
                    35..=69 => InputEvent::Up {
                        channel: random_channel(),
                        ts_us,
                    },
                    70..=84 => InputEvent::Move {
                        ts_us,
                        buttons: fastrand::bool().then(|| fastrand::u8(0..32)),
                    },
                    85..=94 => InputEvent::Scroll {
                        ts_us,
                        delta_x: 0.0,
                        delta_y: if fastrand::bool() { 100.0 } else { -100.0 },
                    },
                    _ => InputEvent::FocusLost,
                }
            })
            .collect()
    })
}

proptest! {
    /// `max_concurrent` and `max_hz` never decrease, and the active set never
    /// outgrows the high-water mark.
    #[test]
    fn prop_high_water_marks_are_monotonic(events in arb_event_sequence()) {
        let mut engine = Engine::default();
        let (mut max_c, mut max_hz) = (0usize, 0f64);
        for ev in &events {
            engine.process(ev);
            prop_assert!(engine.max_concurrent() >= max_c);
            prop_assert!(engine.max_hz() >= max_hz);
            prop_assert!(engine.active().len() <= engine.max_concurrent());
            max_c = engine.max_concurrent();
            max_hz = engine.max_hz();
        }
        engine.reset();
        prop_assert_eq!(engine.max_concurrent(), 0);
        prop_assert_eq!(engine.max_hz(), 0.0);
    }

    /// A repeat never changes down counts or active-set membership.
    #[test]
    fn prop_repeat_isolation(events in arb_event_sequence()) {
        let mut engine = Engine::default();
        for ev in &events {
            if let InputEvent::Down { channel, repeat: true, .. } = ev {
                let before = engine.snapshot();
                engine.process(ev);
                let after = engine.snapshot();
                prop_assert_eq!(after.down_count(channel), before.down_count(channel));
                prop_assert_eq!(&after.active, &before.active);
                prop_assert_eq!(after.total_event_count, before.total_event_count);
            } else {
                engine.process(ev);
            }
        }
    }

    /// After focus loss nothing is pressed, however many channels were held.
    #[test]
    fn prop_focus_lost_completeness(events in arb_event_sequence()) {
        let mut engine = Engine::default();
        for ev in &events {
            engine.process(ev);
        }
        let held: Vec<_> = engine.active().iter().cloned().collect();
        prop_assert_eq!(engine.on_focus_lost(), held.len());
        prop_assert!(engine.active().is_empty());
        for id in &held {
            prop_assert!(!engine.channel(id).unwrap().pressed);
        }
    }

    /// A second up without an intervening down changes nothing.
    #[test]
    fn prop_release_is_idempotent(events in arb_event_sequence(), extra in 0u64..1_000) {
        let mut engine = Engine::default();
        for ev in &events {
            engine.process(ev);
            if let InputEvent::Up { channel, ts_us } = ev {
                let state = engine.channel(channel).cloned();
                let active = engine.active().clone();
                engine.on_up(channel, ts_us + extra);
                prop_assert_eq!(engine.channel(channel).cloned(), state);
                prop_assert_eq!(engine.active(), &active);
            }
        }
    }

    /// The active set and per-channel `pressed` flags always agree, and each
    /// channel's ups never outnumber its downs.
    #[test]
    fn prop_active_set_matches_channel_state(events in arb_event_sequence()) {
        let mut engine = Engine::default();
        for ev in &events {
            engine.process(ev);
        }
        let snap = engine.snapshot();
        for (id, counts) in &snap.per_channel {
            // Wheel ticks count as downs with no matching up.
            if *id == ChannelId::Wheel {
                continue;
            }
            prop_assert_eq!(counts.pressed, engine.active().contains(id));
            prop_assert!(counts.up <= counts.down);
            prop_assert_eq!(counts.down - counts.up, u64::from(counts.pressed));
        }
    }
}
