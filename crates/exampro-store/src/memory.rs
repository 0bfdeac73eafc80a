//! In-memory store for testing and throwaway sessions.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::Result;

use exampro_core::catalog::Catalog;
use exampro_core::traits::ExamStore;

/// A store that keeps the catalog in process memory.
///
/// Counts saves so tests can assert that a hand-off happened.
#[derive(Default)]
pub struct MemoryStore {
    catalog: Mutex<Catalog>,
    save_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing catalog.
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: Mutex::new(catalog),
            save_count: AtomicU32::new(0),
        }
    }

    /// Number of saves made to this store.
    pub fn save_count(&self) -> u32 {
        self.save_count.load(Ordering::Relaxed)
    }
}

impl ExamStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self) -> Result<Catalog> {
        let catalog = self
            .catalog
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(catalog.clone())
    }

    fn save(&self, catalog: &Catalog) -> Result<()> {
        let mut stored = self
            .catalog
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        *stored = catalog.clone();
        self.save_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
