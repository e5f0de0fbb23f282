//! Merging ambient context into in-flight events.

use super::Processor;
use crate::context::snapshot;
use crate::core::EventDict;

/// Merges the ambient context-local bindings into the event.
///
/// Install this as the first step of the processor chain so every later
/// step sees the enriched event. Fields already present on the event are
/// never overwritten: caller-supplied and logger-local values win over
/// ambient context.
#[must_use]
pub fn merge_context_vars(mut event: EventDict) -> EventDict {
    for (key, value) in snapshot() {
        event.set_default(key, value);
    }
    event
}

/// [`Processor`] form of [`merge_context_vars`] for chain registration.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeContextVars;

impl Processor for MergeContextVars {
    fn process(&self, event: EventDict) -> EventDict {
        merge_context_vars(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{bind_one, scope, LocalContext};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_fills_missing_fields() {
        scope(LocalContext::new(), || {
            bind_one("merge_req_id", serde_json::json!("abc"));

            let event = EventDict::new("app", "info").with_field("msg", serde_json::json!("hi"));
            let merged = merge_context_vars(event);

            assert_eq!(merged.get("msg"), Some(&serde_json::json!("hi")));
            assert_eq!(merged.get("merge_req_id"), Some(&serde_json::json!("abc")));
        });
    }

    #[test]
    fn test_merge_never_overwrites_caller_fields() {
        scope(LocalContext::new(), || {
            bind_one("merge_owned_key", serde_json::json!("ambient"));

            let event = EventDict::new("app", "info")
                .with_field("merge_owned_key", serde_json::json!("caller"));
            let merged = merge_context_vars(event);

            assert_eq!(
                merged.get("merge_owned_key"),
                Some(&serde_json::json!("caller"))
            );
        });
    }

    #[test]
    fn test_merge_with_empty_context() {
        scope(LocalContext::new(), || {
            let event = EventDict::new("app", "info").with_field("msg", serde_json::json!("hi"));
            let merged = merge_context_vars(event.clone());

            assert_eq!(merged, event);
        });
    }

    #[test]
    fn test_processor_trait_form() {
        scope(LocalContext::new(), || {
            bind_one("merge_trait_key", serde_json::json!(7));

            let step = MergeContextVars;
            let merged = step.process(EventDict::new("app", "debug"));

            assert_eq!(merged.get("merge_trait_key"), Some(&serde_json::json!(7)));
        });
    }
}
