//! Cooperative cancellation for the tree walk.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Polled by the walker between node visits.
pub trait CancellationToken {
    fn is_cancelled(&self) -> bool;
}

/// A token that is never cancelled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancellationToken for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: CancellationToken + ?Sized> CancellationToken for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<T: CancellationToken + ?Sized> CancellationToken for Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Adapts a closure into a token.
#[derive(Debug, Clone, Copy)]
pub struct CancelWhen<F>(pub F);

impl<F: Fn() -> bool> CancellationToken for CancelWhen<F> {
    fn is_cancelled(&self) -> bool {
        (self.0)()
    }
}
