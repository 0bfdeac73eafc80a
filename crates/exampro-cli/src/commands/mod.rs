pub mod delete;
pub mod init;
pub mod list;
pub mod publish;
pub mod report;
pub mod results;
pub mod take;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use exampro_core::traits::ExamStore;
use exampro_store::config::load_config_from;
use exampro_store::{create_store, ExamproConfig};

/// Loaded configuration plus the store it selects.
pub struct AppContext {
    pub config: ExamproConfig,
    pub store: Box<dyn ExamStore>,
}

impl AppContext {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let store = create_store(&config.store);
        tracing::debug!(store = store.name(), "using store");
        Ok(Self { config, store })
    }
}
