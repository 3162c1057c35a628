// Routes host events to one engine per input device category, so keyboard
// and mouse concurrency are tracked in separate active sets.

use serde::Serialize;

use crate::engine::channel::ChannelId;
use crate::engine::{Engine, Thresholds};
use crate::event::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Keyboard,
    Mouse,
}

impl DeviceCategory {
    pub fn of(channel: &ChannelId) -> Self {
        match channel {
            ChannelId::Key(_) => DeviceCategory::Keyboard,
            ChannelId::Button(_) | ChannelId::Wheel | ChannelId::Pointer => DeviceCategory::Mouse,
        }
    }
}

/// Category an event belongs to. `None` for focus loss and reset, which
/// apply to every category.
pub fn route(event: &InputEvent) -> Option<DeviceCategory> {
    match event {
        InputEvent::Down { channel, .. } | InputEvent::Up { channel, .. } => {
            Some(DeviceCategory::of(channel))
        }
        InputEvent::Move { .. } | InputEvent::Scroll { .. } => Some(DeviceCategory::Mouse),
        InputEvent::FocusLost | InputEvent::Reset => None,
    }
}

/// A keyboard engine and a mouse engine sharing one set of thresholds.
#[derive(Debug, Clone)]
pub struct Session {
    keyboard: Engine,
    mouse: Engine,
}

impl Session {
    pub fn new(thresholds: Thresholds) -> Self {
        Session {
            keyboard: Engine::new(thresholds.clone()),
            mouse: Engine::new(thresholds),
        }
    }

    pub fn process(&mut self, event: &InputEvent) {
        match route(event) {
            Some(category) => self.engine_mut(category).process(event),
            None => {
                self.keyboard.process(event);
                self.mouse.process(event);
            }
        }
    }

    pub fn engine(&self, category: DeviceCategory) -> &Engine {
        match category {
            DeviceCategory::Keyboard => &self.keyboard,
            DeviceCategory::Mouse => &self.mouse,
        }
    }

    fn engine_mut(&mut self, category: DeviceCategory) -> &mut Engine {
        match category {
            DeviceCategory::Keyboard => &mut self.keyboard,
            DeviceCategory::Mouse => &mut self.mouse,
        }
    }

    /// Both engines, keyboard first.
    pub fn engines(&self) -> [(DeviceCategory, &Engine); 2] {
        [
            (DeviceCategory::Keyboard, &self.keyboard),
            (DeviceCategory::Mouse, &self.mouse),
        ]
    }

    pub fn thresholds(&self) -> &Thresholds {
        self.keyboard.thresholds()
    }

    /// Time between the earliest and the latest event seen by either engine.
    pub fn runtime_us(&self) -> Option<u64> {
        self.engines()
            .into_iter()
            .filter_map(|(_, engine)| engine.session_bounds())
            .reduce(|(f1, l1), (f2, l2)| (f1.min(f2), l1.max(l2)))
            .map(|(first, last)| last.saturating_sub(first))
    }
}
