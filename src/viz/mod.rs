mod app;
mod components;
mod tui;

pub use app::{init, App, GardenFrame, Update};

/// Least severe level the dashboard captures and shows by default
pub const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Debug;
