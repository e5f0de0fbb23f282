//! Bind, unbind, reset, clear, and snapshot operations.
//!
//! All operations act on the calling execution unit's current context
//! only; sibling and previously forked contexts are unaffected. Nothing
//! here blocks, awaits, or performs I/O.

use super::registry::{self, VarId};
use super::scope::{self, Slot};
use crate::errors::InvalidResetTokenError;
use std::collections::HashMap;
use uuid::Uuid;

/// An opaque capability for restoring one scoped variable to the exact
/// state it had before a [`bind`].
///
/// Tokens are only valid in the execution context that produced them.
/// Presenting one in a forked or sibling context is a caller error and
/// fails with [`InvalidResetTokenError`]. Tokens are not invalidated by
/// later binds of the same key; when several are applied, the last
/// [`reset`] determines the final state. Each token is consumed by the
/// reset that applies it, so a restore cannot run twice.
#[derive(Debug)]
pub struct ResetToken {
    var_id: VarId,
    context_id: Uuid,
    prior: Option<Slot>,
}

/// The seam to the (external) logger-binding layer: anything carrying a
/// caller-owned local context of its own.
pub trait BoundContext {
    /// Returns the key-value context bound directly to the logger.
    fn bound_context(&self) -> HashMap<String, serde_json::Value>;
}

/// Returns a fresh copy of the context-local bindings visible to the
/// calling execution unit.
///
/// Tombstoned and never-bound variables are excluded. The returned map
/// is independent of the store; mutating it has no effect on any
/// context.
#[must_use]
pub fn snapshot() -> HashMap<String, serde_json::Value> {
    scope::with_current(|ctx| {
        let mut rv = HashMap::new();
        registry::for_each_var(|var| {
            if let Some(Slot::Value(value)) = ctx.slot(var.id()) {
                rv.insert(var.name().to_string(), value.clone());
            }
        });
        rv
    })
}

/// Returns the ambient snapshot with `bound`'s own context layered on
/// top. Locally bound values win over ambient values for the same key.
#[must_use]
pub fn merged_snapshot(bound: &dyn BoundContext) -> HashMap<String, serde_json::Value> {
    let mut rv = snapshot();
    rv.extend(bound.bound_context());
    rv
}

/// Binds `pairs` into the current execution context.
///
/// Returns one [`ResetToken`] per key, keyed by the same names, so
/// callers can selectively restore prior states via [`reset`]. Binding
/// the same key again is last-write-wins; earlier tokens stay valid.
pub fn bind(pairs: HashMap<String, serde_json::Value>) -> HashMap<String, ResetToken> {
    scope::with_current_mut(|ctx| {
        let mut tokens = HashMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            let var = registry::get_or_create(&key);
            let prior = ctx.set(var.id(), Slot::Value(value));
            tokens.insert(
                key,
                ResetToken {
                    var_id: var.id(),
                    context_id: ctx.id(),
                    prior,
                },
            );
        }
        tokens
    })
}

/// Binds a single key, returning its reset token.
pub fn bind_one(key: impl Into<String>, value: serde_json::Value) -> ResetToken {
    let key = key.into();
    scope::with_current_mut(|ctx| {
        let var = registry::get_or_create(&key);
        let prior = ctx.set(var.id(), Slot::Value(value));
        ResetToken {
            var_id: var.id(),
            context_id: ctx.id(),
            prior,
        }
    })
}

/// Removes `keys` from the current execution context.
///
/// Keys with no known variable are silently ignored; "was never bound"
/// and "already unbound" are equivalent outcomes.
pub fn unbind<I, S>(keys: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    scope::with_current_mut(|ctx| {
        for key in keys {
            if let Some(var) = registry::lookup(key.as_ref()) {
                ctx.set(var.id(), Slot::Unset);
            }
        }
    });
}

/// Restores variables to the exact prior states captured by `tokens`.
///
/// Every token is validated before any state is touched, so an invalid
/// token leaves the context unchanged.
///
/// # Errors
///
/// Returns [`InvalidResetTokenError`] if a token's variable was never
/// created or the token originates from a different execution context.
pub fn reset(tokens: HashMap<String, ResetToken>) -> Result<(), InvalidResetTokenError> {
    scope::with_current_mut(|ctx| {
        for (key, token) in &tokens {
            let Some(var) = registry::lookup(key) else {
                return Err(InvalidResetTokenError::unknown_variable(key.as_str()));
            };
            if var.id() != token.var_id {
                return Err(InvalidResetTokenError::unknown_variable(key.as_str()));
            }
            if token.context_id != ctx.id() {
                return Err(InvalidResetTokenError::foreign_context(key.as_str()));
            }
        }

        for token in tokens.into_values() {
            ctx.restore(token.var_id, token.prior);
        }

        Ok(())
    })
}

/// Removes every registered variable from the current execution context.
///
/// A coarse reset for the start of a new unit of work. Concurrently
/// running contexts are unaffected.
pub fn clear_all() {
    scope::with_current_mut(|ctx| {
        registry::for_each_var(|var| {
            ctx.set(var.id(), Slot::Unset);
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::scope::{scope, LocalContext};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bind_and_snapshot() {
        scope(LocalContext::new(), || {
            bind_one("vars_key", serde_json::json!("value"));

            let snap = snapshot();
            assert_eq!(snap.get("vars_key"), Some(&serde_json::json!("value")));
        });
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        scope(LocalContext::new(), || {
            bind_one("vars_copy_key", serde_json::json!(1));

            let mut snap = snapshot();
            snap.insert("vars_copy_other".to_string(), serde_json::json!(2));
            snap.remove("vars_copy_key");

            assert_eq!(
                snapshot().get("vars_copy_key"),
                Some(&serde_json::json!(1))
            );
        });
    }

    #[test]
    fn test_bind_null_is_still_bound() {
        scope(LocalContext::new(), || {
            bind_one("vars_null_key", serde_json::Value::Null);

            let snap = snapshot();
            assert_eq!(snap.get("vars_null_key"), Some(&serde_json::Value::Null));
        });
    }

    #[test]
    fn test_unbind_excludes_from_snapshot() {
        scope(LocalContext::new(), || {
            bind_one("vars_unbind_key", serde_json::json!("v"));
            unbind(["vars_unbind_key"]);

            assert!(!snapshot().contains_key("vars_unbind_key"));
        });
    }

    #[test]
    fn test_unbind_never_bound_is_noop() {
        scope(LocalContext::new(), || {
            unbind(["vars_totally_unknown_key"]);
            assert!(!snapshot().contains_key("vars_totally_unknown_key"));
        });
    }

    #[test]
    fn test_reset_restores_prior_value() {
        scope(LocalContext::new(), || {
            bind_one("vars_reset_key", serde_json::json!("old"));
            let tokens = bind(HashMap::from([(
                "vars_reset_key".to_string(),
                serde_json::json!("new"),
            )]));

            reset(tokens).unwrap();

            assert_eq!(
                snapshot().get("vars_reset_key"),
                Some(&serde_json::json!("old"))
            );
        });
    }

    #[test]
    fn test_reset_restores_unset() {
        scope(LocalContext::new(), || {
            let token = bind_one("vars_reset_unset_key", serde_json::json!(5));
            bind_one("vars_reset_unset_key", serde_json::json!(9));

            reset(HashMap::from([(
                "vars_reset_unset_key".to_string(),
                token,
            )]))
            .unwrap();

            assert!(!snapshot().contains_key("vars_reset_unset_key"));
        });
    }

    #[test]
    fn test_reset_unknown_variable_fails() {
        scope(LocalContext::new(), || {
            let token = bind_one("vars_known_key", serde_json::json!(1));

            let err = reset(HashMap::from([(
                "vars_never_created_key".to_string(),
                token,
            )]))
            .unwrap_err();

            assert_eq!(
                err,
                InvalidResetTokenError::unknown_variable("vars_never_created_key")
            );
        });
    }

    #[test]
    fn test_reset_validates_before_applying() {
        scope(LocalContext::new(), || {
            let good = bind_one("vars_atomic_key", serde_json::json!("prior"));
            bind_one("vars_atomic_key", serde_json::json!("current"));
            let bad = bind_one("vars_atomic_other", serde_json::json!(1));

            let result = reset(HashMap::from([
                ("vars_atomic_key".to_string(), good),
                ("vars_never_created_b".to_string(), bad),
            ]));

            assert!(result.is_err());
            // Nothing was applied.
            assert_eq!(
                snapshot().get("vars_atomic_key"),
                Some(&serde_json::json!("current"))
            );
        });
    }

    #[test]
    fn test_clear_all_scoped_to_current_context() {
        scope(LocalContext::new(), || {
            bind_one("vars_clear_key", serde_json::json!("outer"));

            scope(LocalContext::fork_current(), || {
                clear_all();
                assert!(!snapshot().contains_key("vars_clear_key"));
            });

            assert_eq!(
                snapshot().get("vars_clear_key"),
                Some(&serde_json::json!("outer"))
            );
        });
    }

    #[test]
    fn test_merged_snapshot_local_wins() {
        struct Local;

        impl BoundContext for Local {
            fn bound_context(&self) -> HashMap<String, serde_json::Value> {
                HashMap::from([("vars_merged_key".to_string(), serde_json::json!("local"))])
            }
        }

        scope(LocalContext::new(), || {
            bind_one("vars_merged_key", serde_json::json!("ambient"));
            bind_one("vars_merged_ambient", serde_json::json!(true));

            let merged = merged_snapshot(&Local);
            assert_eq!(merged.get("vars_merged_key"), Some(&serde_json::json!("local")));
            assert_eq!(merged.get("vars_merged_ambient"), Some(&serde_json::json!(true)));
        });
    }
}
