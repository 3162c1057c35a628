// Module declarations for the library crate.

pub mod cli;
pub mod config;
pub mod engine;
pub mod event;
pub mod keynames;
pub mod labels;
pub mod logger;
pub mod report;
pub mod session;
pub mod telemetry;
pub mod util;

// Re-export the engine entry points for tests, benches and embedding hosts.
pub use engine::{Engine, Thresholds};
pub use event::InputEvent;
pub use session::{DeviceCategory, Session};
