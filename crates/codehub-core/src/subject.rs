//! Discards results computed for a subject user that has since changed.
//!
//! Each activation hands out a [`SubjectTicket`]. Only the newest ticket may
//! apply its result; anything settled with an older ticket is dropped.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct SubjectTracker {
    generation: AtomicU64,
}

/// Proof of which activation a computation belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectTicket {
    generation: u64,
    user_id: Option<String>,
}

impl SubjectTicket {
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl SubjectTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a computation for `user_id`, superseding every earlier ticket.
    pub fn activate(&self, user_id: Option<&str>) -> SubjectTicket {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        SubjectTicket {
            generation,
            user_id: user_id.map(str::to_owned),
        }
    }

    #[must_use]
    pub fn is_current(&self, ticket: &SubjectTicket) -> bool {
        self.generation.load(Ordering::Acquire) == ticket.generation
    }

    /// Hand back `value` only if `ticket` is still the newest activation.
    pub fn settle<T>(&self, ticket: &SubjectTicket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}
