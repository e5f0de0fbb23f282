//! # Logplus
//!
//! A Rust implementation of the logplus context-local logging core.
//!
//! Logplus attaches key-value metadata to the current logical execution
//! context (a request, a task, a spawned future) so that every log event
//! emitted within that context inherits the metadata, without threading
//! a logger through every call:
//!
//! - **Scoped variables**: process-wide identities, per-context values
//! - **Copy-on-fork isolation**: child contexts inherit values at the
//!   fork point and diverge independently
//! - **Merge processor**: folds the ambient context into in-flight
//!   events without overwriting caller-supplied fields
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use logplus::prelude::*;
//!
//! // At the start of a unit of work:
//! clear_all();
//! bind_one("request_id", serde_json::json!("req-42"));
//!
//! // Anywhere inside the same context:
//! let event = EventDict::new("app", "info")
//!     .with_field("event", serde_json::json!("user logged in"));
//! let enriched = merge_context_vars(event);
//! assert!(enriched.contains("request_id"));
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod context;
pub mod core;
pub mod errors;
pub mod processors;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{
        bind, bind_one, bound_vars, clear_all, merged_snapshot, reset, run_forked, scope,
        snapshot, spawn_forked, unbind, with_bound_vars, BoundContext, BoundVars,
        ContextFuture, ContextFutureExt, ContextScope, LocalContext, ResetToken,
    };
    pub use crate::core::EventDict;
    pub use crate::errors::{InvalidResetTokenError, LogplusError, ResetTokenRejection};
    pub use crate::processors::{merge_context_vars, MergeContextVars, Processor};
    pub use crate::testing::CapturingProcessor;
}
