pub mod error;
pub mod logging;
pub mod model;
pub mod obfuscate;
pub mod preview;
pub mod remote;
pub mod session;
pub mod store;
pub mod sync;
pub mod tui;

mod tui_shell;
