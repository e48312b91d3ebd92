//! Correlation ids for sub-commands.

use std::sync::atomic::{AtomicU8, Ordering};

/// Hands out one id per sub-command, wrapping at 256.
///
/// Share one sequencer (behind an `Arc`) across every frame sent in a device
/// session; it is never reset.
#[derive(Debug, Default)]
pub struct CommandSequencer {
    next: AtomicU8,
}

impl CommandSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given id.
    pub fn starting_at(id: u8) -> Self {
        Self {
            next: AtomicU8::new(id),
        }
    }

    /// Return the current id and advance the counter.
    pub fn next_id(&self) -> u8 {
        // fetch_add wraps on overflow
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// The id the next call to [`next_id`](Self::next_id) will return.
    pub fn peek(&self) -> u8 {
        self.next.load(Ordering::Relaxed)
    }
}
