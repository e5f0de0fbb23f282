//! Process-wide registry of scoped variable identities.
//!
//! The registry maps key names to variable identities, never to values;
//! values live in per-execution-unit contexts. Entries are created
//! lazily on first bind and kept for the process lifetime.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// The stable identity of a scoped variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(u64);

/// A named, context-propagating variable cell.
///
/// Identity is stable for the process lifetime; only the per-context
/// value slot addressed by [`VarId`] ever changes.
#[derive(Debug)]
pub struct ScopedVar {
    id: VarId,
    name: String,
}

impl ScopedVar {
    fn new(name: impl Into<String>) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);

        Self {
            id: VarId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
        }
    }

    /// Returns the variable's identity.
    #[must_use]
    pub fn id(&self) -> VarId {
        self.id
    }

    /// Returns the variable's key name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn registry() -> &'static DashMap<String, Arc<ScopedVar>> {
    static REGISTRY: OnceLock<DashMap<String, Arc<ScopedVar>>> = OnceLock::new();
    REGISTRY.get_or_init(DashMap::new)
}

/// Returns the variable for `key`, creating it if absent.
///
/// Creation is atomic per key: concurrent callers always observe the
/// same identity.
#[must_use]
pub fn get_or_create(key: &str) -> Arc<ScopedVar> {
    let entry = registry()
        .entry(key.to_string())
        .or_insert_with(|| Arc::new(ScopedVar::new(key)));
    Arc::clone(entry.value())
}

/// Returns the variable for `key`, if one was ever created.
#[must_use]
pub fn lookup(key: &str) -> Option<Arc<ScopedVar>> {
    registry().get(key).map(|entry| Arc::clone(entry.value()))
}

/// Calls `f` for every registered variable.
pub(crate) fn for_each_var(mut f: impl FnMut(&Arc<ScopedVar>)) {
    for entry in registry().iter() {
        f(entry.value());
    }
}
