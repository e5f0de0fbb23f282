//! Testing utilities for asserting on enriched events.

use crate::core::EventDict;
use crate::processors::Processor;
use parking_lot::RwLock;

/// A processor that records every event passing through it.
///
/// Install it after the merge step to observe exactly what the rest of
/// the chain would receive.
#[derive(Debug, Default)]
pub struct CapturingProcessor {
    events: RwLock<Vec<EventDict>>,
}

impl CapturingProcessor {
    /// Creates a new capturing processor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<EventDict> {
        self.events.read().clone()
    }

    /// Returns the number of captured events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all captured events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl Processor for CapturingProcessor {
    fn process(&self, event: EventDict) -> EventDict {
        self.events.write().push(event.clone());
        event
    }
}
