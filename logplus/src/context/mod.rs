//! Context-local key-value propagation.
//!
//! This module provides:
//! - A process-wide registry of scoped variable identities
//! - Forkable per-execution-unit contexts with copy-on-fork isolation
//! - Bind/unbind/reset/clear operations and point-in-time snapshots
//! - A scoped-binding guard with exact restoration

mod guard;
mod registry;
mod scope;
mod vars;

pub use guard::{bound_vars, with_bound_vars, BoundVars};
pub use registry::{get_or_create, lookup, ScopedVar, VarId};
pub use scope::{
    run_forked, scope, spawn_forked, ContextFuture, ContextFutureExt, ContextScope,
    LocalContext,
};
pub use vars::{
    bind, bind_one, clear_all, merged_snapshot, reset, snapshot, unbind, BoundContext,
    ResetToken,
};
