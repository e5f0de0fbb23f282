//! The forkable execution-context primitive.
//!
//! Every execution unit owns a [`LocalContext`]: an isolated view of
//! every scoped variable's value. Forking copies the parent's bindings
//! at the fork point; afterwards the two contexts diverge independently.
//! The current context lives in a thread-local cell; futures carry their
//! own context across suspension points via [`ContextFuture`].

use super::registry::VarId;
use pin_project::pin_project;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use uuid::Uuid;

/// Per-context state of one scoped variable.
///
/// `Unset` is the tombstone for "explicitly removed". It is distinct
/// from JSON null and from the variable having no entry at all, so
/// snapshots can exclude unbound keys without losing the difference
/// between "never bound" and "bound to null".
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot {
    /// Explicitly removed; excluded from snapshots.
    Unset,
    /// A bound user value.
    Value(serde_json::Value),
}

/// An isolated, forkable view of all scoped variable values.
///
/// Contexts are cheap to fork and carry a unique identity used to
/// validate reset tokens against their originating context.
#[derive(Debug, Clone)]
pub struct LocalContext {
    id: Uuid,
    slots: HashMap<VarId, Slot>,
}

impl LocalContext {
    /// Creates an empty context with no bindings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            slots: HashMap::new(),
        }
    }

    /// Copies the calling execution unit's current bindings into a new,
    /// independent context.
    ///
    /// Mutations on either side after the fork are invisible to the
    /// other side.
    #[must_use]
    pub fn fork_current() -> Self {
        CURRENT.with(|current| Self {
            id: Uuid::new_v4(),
            slots: current.borrow().slots.clone(),
        })
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn slot(&self, id: VarId) -> Option<&Slot> {
        self.slots.get(&id)
    }

    /// Sets a slot, returning the prior entry (None = no entry).
    pub(crate) fn set(&mut self, id: VarId, slot: Slot) -> Option<Slot> {
        self.slots.insert(id, slot)
    }

    /// Restores a slot to a captured prior state.
    pub(crate) fn restore(&mut self, id: VarId, prior: Option<Slot>) {
        match prior {
            Some(slot) => {
                self.slots.insert(id, slot);
            }
            None => {
                self.slots.remove(&id);
            }
        }
    }
}

impl Default for LocalContext {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static CURRENT: RefCell<LocalContext> = RefCell::new(LocalContext::new());
}

/// Reads from the calling unit's current context.
pub(crate) fn with_current<R>(f: impl FnOnce(&LocalContext) -> R) -> R {
    CURRENT.with(|current| f(&current.borrow()))
}

/// Mutates the calling unit's current context.
pub(crate) fn with_current_mut<R>(f: impl FnOnce(&mut LocalContext) -> R) -> R {
    CURRENT.with(|current| f(&mut current.borrow_mut()))
}

/// Installs a context for a delimited region.
///
/// The previous context is restored when the guard drops, on every exit
/// path.
#[derive(Debug)]
pub struct ContextScope {
    prev: Option<LocalContext>,
}

impl ContextScope {
    /// Enters `ctx`, displacing the current context until the returned
    /// guard is dropped.
    #[must_use]
    pub fn enter(ctx: LocalContext) -> Self {
        let prev = CURRENT.with(|current| std::mem::replace(&mut *current.borrow_mut(), ctx));
        Self { prev: Some(prev) }
    }
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        if let Some(prev) = self.prev.take() {
            CURRENT.with(|current| *current.borrow_mut() = prev);
        }
    }
}

/// Runs `f` inside `ctx`.
pub fn scope<R>(ctx: LocalContext, f: impl FnOnce() -> R) -> R {
    let _guard = ContextScope::enter(ctx);
    f()
}

/// Runs `f` inside a fresh fork of the current context.
pub fn run_forked<R>(f: impl FnOnce() -> R) -> R {
    scope(LocalContext::fork_current(), f)
}

/// A future that polls its inner future inside an owned context.
///
/// The context is installed for the duration of each poll and taken back
/// afterwards, so bindings made inside the future survive across
/// suspension points and executor threads.
#[pin_project]
pub struct ContextFuture<F> {
    #[pin]
    inner: F,
    ctx: Option<LocalContext>,
}

impl<F> Future for ContextFuture<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // Takes the context back and reinstates the displaced one even
        // if the inner poll panics, so a panicking task cannot leak its
        // bindings into whatever runs on this thread next.
        struct Restore<'a> {
            prev: Option<LocalContext>,
            ctx: &'a mut Option<LocalContext>,
        }

        impl Drop for Restore<'_> {
            fn drop(&mut self) {
                if let Some(prev) = self.prev.take() {
                    let ctx =
                        CURRENT.with(|current| std::mem::replace(&mut *current.borrow_mut(), prev));
                    *self.ctx = Some(ctx);
                }
            }
        }

        let this = self.project();

        let ctx = this.ctx.take().unwrap_or_else(LocalContext::new);
        let prev = CURRENT.with(|current| std::mem::replace(&mut *current.borrow_mut(), ctx));
        let _restore = Restore {
            prev: Some(prev),
            ctx: this.ctx,
        };

        this.inner.poll(cx)
    }
}

/// Extension methods for running futures inside a scoped context.
pub trait ContextFutureExt: Future + Sized {
    /// Runs this future inside `ctx`.
    fn in_context(self, ctx: LocalContext) -> ContextFuture<Self>;

    /// Forks the current context and runs this future inside the fork.
    ///
    /// The fork point is the call to this method, not the first poll:
    /// bindings made after wrapping are not visible to the future.
    fn in_forked_context(self) -> ContextFuture<Self>;
}

impl<F> ContextFutureExt for F
where
    F: Future,
{
    fn in_context(self, ctx: LocalContext) -> ContextFuture<Self> {
        ContextFuture {
            inner: self,
            ctx: Some(ctx),
        }
    }

    fn in_forked_context(self) -> ContextFuture<Self> {
        self.in_context(LocalContext::fork_current())
    }
}

/// Spawns `future` on the tokio runtime inside a fork of the current
/// context.
///
/// The fork happens before the task is handed to the scheduler, so the
/// spawned task sees the caller's bindings as of this call.
pub fn spawn_forked<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(future.in_forked_context())
}
