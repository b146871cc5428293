// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod cue;
pub mod geometry;
pub mod phase;
pub mod projector;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod timer;
pub mod ui;
