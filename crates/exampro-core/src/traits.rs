//! Ports to the collaborators the core never touches directly.
//!
//! The store crate implements [`ExamStore`]; the runner implements
//! [`Lockdown`] for its environment. A finished session hands its result to
//! a [`ResultSink`] and does not observe what happens next.

use anyhow::Result;

use crate::catalog::Catalog;
use crate::model::StudentResult;

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Key-value persistence of the two top-level collections.
///
/// A `save` followed by a `load` must observe the saved state.
pub trait ExamStore: Send + Sync {
    /// Human-readable store name (e.g. "json").
    fn name(&self) -> &str;

    /// Read both collections. A store with nothing saved yet yields an
    /// empty catalog.
    fn load(&self) -> Result<Catalog>;

    /// Replace both collections.
    fn save(&self, catalog: &Catalog) -> Result<()>;
}

/// Receiver of completed results. Hand-off is fire-and-forget.
pub trait ResultSink {
    fn accept(&mut self, result: &StudentResult);
}

/// Collects results in memory.
impl ResultSink for Vec<StudentResult> {
    fn accept(&mut self, result: &StudentResult) {
        self.push(result.clone());
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Advisory lockdown of the environment around an active attempt
/// (full-screen, departure monitoring).
///
/// Both calls are best-effort: an error is logged by the session and never
/// aborts the attempt.
pub trait Lockdown: Send {
    /// Enter lockdown and start delivering departure signals.
    fn engage(&mut self) -> Result<()>;

    /// Leave lockdown and stop delivering signals.
    fn release(&mut self) -> Result<()>;
}

/// Lockdown that does nothing.
pub struct NoopLockdown;

impl Lockdown for NoopLockdown {
    fn engage(&mut self) -> Result<()> {
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}
