pub mod garden;
pub mod log;
pub mod table;

use crossterm::event::Event;
pub use garden::Gardens;
pub use log::Logs;
use ratatui::widgets::WidgetRef;
pub use table::TablePane;

pub trait Component: WidgetRef {
    fn handle_ui_event(&mut self, event: &Event) -> bool;
}
