use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::IqSample;

/// Single-slot store for the most recent block, shared between the streaming
/// thread (writer) and the display sampler (reader).
///
/// The writer only ever tries the lock and skips the block when the reader
/// holds it. The reader takes the lock for the length of one copy.
#[derive(Debug, Default)]
pub struct SnapshotBuffer {
    slot: Mutex<Option<Vec<IqSample>>>,
    published: AtomicU64,
    dropped: AtomicU64,
}

impl SnapshotBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored block unless a reader currently holds it.
    ///
    /// Returns false when the block was dropped. Never waits.
    pub fn publish(&self, block: &[IqSample]) -> bool {
        match self.slot.try_lock() {
            Some(mut slot) => {
                match slot.as_mut() {
                    Some(stored) => {
                        stored.clear();
                        stored.extend_from_slice(block);
                    }
                    None => *slot = Some(block.to_vec()),
                }
                self.published.fetch_add(1, Ordering::Relaxed);
                true
            }
            None => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Copy out the latest complete block, or None before the first publish
    pub fn read(&self) -> Option<Vec<IqSample>> {
        self.slot.lock().clone()
    }

    /// Blocks stored so far
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Blocks skipped because the reader held the slot
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Hold the slot for `hold`, as a slow reader would
    #[cfg(test)]
    pub(crate) fn hold_for(&self, hold: std::time::Duration) {
        let _slot = self.slot.lock();
        std::thread::sleep(hold);
    }
}
