pub mod app;
pub mod board;
pub mod cli;
pub mod collision;
pub mod composer;
pub mod drag;
pub mod editor;
pub mod ids;
pub mod keybindings;
pub mod layout;
pub mod logging;
pub mod realm;
pub mod settings;
pub mod snapshot;
pub mod theme;
pub mod types;
pub mod ui;
