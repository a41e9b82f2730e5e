//! Run/stop flag shared between the engine and its controllers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable handle to the engine's running flag.
///
/// `stop()` takes effect at the next loop iteration; an event being handled
/// always runs to completion.
#[derive(Clone, Debug, Default)]
pub struct SimControl {
    running: Arc<AtomicBool>,
}

impl SimControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the engine to stop.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Flip to running.  `false` if it already was.
    pub(crate) fn begin(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
