//! TUI module for the trainer.

mod app;
pub mod theme;
mod widgets;

pub use app::App;
