//! Scoped binding of context keys with exact restoration.

use super::vars::{bind, snapshot, unbind};
use std::collections::HashMap;

/// Binds a set of keys for the lifetime of the guard and restores the
/// prior bindings when it drops.
///
/// On drop every requested key is unbound, then the keys that were
/// present before entry are rebound to their prior values. Restoration
/// happens on every exit path and holds even if the guarded region
/// itself rebound or unbound some of the requested keys. Keys outside
/// the requested set are untouched.
#[derive(Debug)]
pub struct BoundVars {
    keys: Vec<String>,
    saved: HashMap<String, serde_json::Value>,
}

impl Drop for BoundVars {
    fn drop(&mut self) {
        unbind(&self.keys);
        if !self.saved.is_empty() {
            let _ = bind(std::mem::take(&mut self.saved));
        }
    }
}

/// Binds `pairs` until the returned guard is dropped.
///
/// Only keys that were already present are saved for verbatim
/// restoration; keys absent before entry are simply unbound on exit.
#[must_use = "dropping the guard immediately undoes the bindings"]
pub fn bound_vars(pairs: HashMap<String, serde_json::Value>) -> BoundVars {
    let saved: HashMap<String, serde_json::Value> = snapshot()
        .into_iter()
        .filter(|(key, _)| pairs.contains_key(key))
        .collect();
    let keys: Vec<String> = pairs.keys().cloned().collect();

    let _ = bind(pairs);

    BoundVars { keys, saved }
}

/// Runs `f` with `pairs` bound, restoring the prior bindings afterwards.
pub fn with_bound_vars<R>(
    pairs: HashMap<String, serde_json::Value>,
    f: impl FnOnce() -> R,
) -> R {
    let _guard = bound_vars(pairs);
    f()
}
