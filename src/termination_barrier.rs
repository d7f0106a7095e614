use std::sync::atomic::{AtomicBool, Ordering};

/// One-shot guard for side effects that may happen at most once per process.
///
/// The flag is never reset: once [`TerminationBarrier::try_acquire`] has
/// returned `true`, every later call returns `false`, including after a
/// failed launch.
#[derive(Debug, Default)]
pub(crate) struct TerminationBarrier {
    locked: AtomicBool,
}

impl TerminationBarrier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn try_acquire(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
