// Adapters layer: concrete implementations for external systems.

pub mod storage;

pub use storage::{LocalStorage, StdoutStorage};
