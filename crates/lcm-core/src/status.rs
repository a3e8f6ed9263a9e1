//! Cooperative cancellation
//!
//! A run polls [`OperationStatus::advance`] before each plugin, form, table and
//! join. Returning `false` stops the run with [`crate::CoreError::Cancelled`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress and cancellation hook polled between units of work
pub trait OperationStatus {
    /// Record that `unit` is about to start; `false` cancels the run
    fn advance(&mut self, unit: &str) -> bool;
}

/// Never cancels, records nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl OperationStatus for NoProgress {
    #[inline]
    fn advance(&mut self, _unit: &str) -> bool {
        true
    }
}

/// Shared flag that cancels a run from another thread
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create token in the running state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; visible to every clone
    #[inline]
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl OperationStatus for CancellationToken {
    fn advance(&mut self, unit: &str) -> bool {
        if self.is_cancelled() {
            tracing::warn!(unit, "cancellation requested");
            return false;
        }
        tracing::trace!(unit, "advancing");
        true
    }
}

/// Allows a fixed number of units, then cancels
///
/// Records every unit it was asked about.
#[derive(Debug, Clone, Default)]
pub struct StepBudget {
    remaining: usize,
    seen: Vec<String>,
}

impl StepBudget {
    /// Budget of `steps` units
    #[inline]
    #[must_use]
    pub fn new(steps: usize) -> Self {
        Self {
            remaining: steps,
            seen: Vec::new(),
        }
    }

    /// Units polled so far, the refused one included
    #[inline]
    #[must_use]
    pub fn seen(&self) -> &[String] {
        &self.seen
    }
}

impl OperationStatus for StepBudget {
    fn advance(&mut self, unit: &str) -> bool {
        self.seen.push(unit.to_string());
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
