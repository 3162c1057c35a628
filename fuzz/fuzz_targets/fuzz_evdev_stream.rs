// fuzz/fuzz_targets/fuzz_evdev_stream.rs
#![no_main]

use input_probe::event::{read_event, EvdevTranslator};
use input_probe::{DeviceCategory, Session};
use input_probe::engine::Thresholds;
use libfuzzer_sys::fuzz_target;

// Treat the input as a raw stream of input_event structs, the way the
// binary reads stdin with --format evdev.
fuzz_target!(|data: &[u8]| {
    let mut reader = data;
    let mut translator = EvdevTranslator::new();
    let mut session = Session::new(Thresholds::default());
    let mut batch = Vec::new();

    while let Ok(Some(raw)) = read_event(&mut reader) {
        translator.translate(&raw, &mut batch);
        for ev in batch.drain(..) {
            session.process(&ev);
        }
    }

    for (category, engine) in session.engines() {
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.active_count, engine.active().len());
        if category == DeviceCategory::Keyboard {
            assert_eq!(snapshot.sample_count, 0);
        }
    }
});
