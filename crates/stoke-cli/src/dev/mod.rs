//! Development server.
//!
//! - Static serving of the bundler output with live-reload injection
//! - Push channel to browsers over Server-Sent Events
//! - Source watching with debouncing

pub mod server;
pub mod session;
pub mod state;
pub mod watcher;

pub use server::{DevServer, CLIENT_SCRIPT_PATH, SSE_PATH};
pub use session::DevSession;
pub use state::{DevServerState, SharedState};
pub use watcher::{FileChange, FileWatcher};
