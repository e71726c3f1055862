//! Ratatui front-end. The catalog owns all state; this layer turns key presses
//! into catalog operations and draws snapshots of the catalog.

mod app;
mod helpers;
mod terminal;
mod view;

pub use app::App;
pub use terminal::run_app;
