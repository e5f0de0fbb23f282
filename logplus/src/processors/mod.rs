//! Processor step contract and the context merge step.

mod merge;

pub use merge::{merge_context_vars, MergeContextVars};

use crate::core::EventDict;

/// A single step in the (externally owned) processor chain.
///
/// Each step receives the in-flight event and returns it, possibly
/// extended or rewritten.
pub trait Processor: Send + Sync {
    /// Processes one event.
    fn process(&self, event: EventDict) -> EventDict;
}
