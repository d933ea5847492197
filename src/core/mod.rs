//! Core pipeline: discovery, rendering, assembly, regeneration, triggers

pub mod activation;
pub mod coordinator;
pub mod debounce;
pub mod discovery;
pub mod theme;
pub mod thumbnail;
pub mod watcher;

pub use coordinator::Coordinator;
pub use debounce::{Debouncer, Trigger};
pub use watcher::WorkspaceWatcher;
