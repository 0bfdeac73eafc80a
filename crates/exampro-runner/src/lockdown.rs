//! Lockdown for a terminal attempt.
//!
//! A terminal has no full-screen or visibility API, so lockdown here means
//! watching for Ctrl-C: while engaged, each interrupt is delivered to the
//! driver as a close attempt instead of killing the process.

use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use exampro_core::traits::Lockdown;

use crate::events::EnvSignal;

pub struct TerminalLockdown {
    signals: UnboundedSender<EnvSignal>,
    watcher: Option<JoinHandle<()>>,
}

impl TerminalLockdown {
    pub fn new(signals: UnboundedSender<EnvSignal>) -> Self {
        Self {
            signals,
            watcher: None,
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.watcher.is_some()
    }
}

impl Lockdown for TerminalLockdown {
    fn engage(&mut self) -> Result<()> {
        if self.watcher.is_some() {
            return Ok(());
        }
        let runtime = tokio::runtime::Handle::try_current()
            .context("terminal lockdown needs a running tokio runtime")?;

        let signals = self.signals.clone();
        self.watcher = Some(runtime.spawn(async move {
            loop {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!("cannot listen for Ctrl-C: {e}");
                    break;
                }
                if signals.send(EnvSignal::CloseAttempt).is_err() {
                    break;
                }
            }
        }));
        tracing::info!("entered lockdown; Ctrl-C is now a close attempt");
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
            tracing::info!("left lockdown");
        }
        Ok(())
    }
}

impl Drop for TerminalLockdown {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn engage_without_runtime_fails() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut lockdown = TerminalLockdown::new(tx);
        assert!(lockdown.engage().is_err());
        assert!(!lockdown.is_engaged());
        lockdown.release().unwrap();
    }

    #[tokio::test]
    async fn engage_and_release() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut lockdown = TerminalLockdown::new(tx);
        lockdown.engage().unwrap();
        assert!(lockdown.is_engaged());
        lockdown.engage().unwrap();
        lockdown.release().unwrap();
        assert!(!lockdown.is_engaged());
        lockdown.release().unwrap();
    }
}
