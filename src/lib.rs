// The binary in main.rs drives the TUI; the library target exposes the
// quiz core to integration tests and criterion benchmarks.

pub mod app;
pub mod bank;
pub mod config;
pub mod event;
pub mod logging;
pub mod session;
pub mod store;
pub mod timer;
pub mod ui;
