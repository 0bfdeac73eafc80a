//! exampro-store: Persistence backends for exam and result collections.
//!
//! Implements the `ExamStore` port with a JSON file store and an in-memory
//! store, and loads the `exampro.toml` configuration that selects between them.

pub mod config;
pub mod error;
pub mod json;
pub mod memory;

pub use config::{create_store, load_config_from, ExamproConfig, StoreConfig};
pub use error::StoreError;
pub use json::JsonFileStore;
pub use memory::MemoryStore;
