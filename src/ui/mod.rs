//! Terminal front end

pub mod app;
pub mod conversation;
pub mod sidebar;
pub mod theme;

pub use app::{run, App, AppAction};
pub use theme::{Theme, ThemeMode};
