#![forbid(unsafe_code)]

//! Cancellation handles.
//!
//! # Design
//!
//! A [`Disposable`] is a cheap, cloneable handle over a shared
//! [`Cancelable`]. Every clone refers to the same resource: disposing any of
//! them disposes the resource once.
//!
//! # Invariants
//!
//! 1. `dispose()` is idempotent. The release action runs at most once, no
//!    matter how many clones or threads call it.
//! 2. `is_disposed()` never flips back to `false`.
//! 3. Dropping a handle does **not** dispose it. Ownership-driven teardown is
//!    the job of [`DisposeBag`](crate::DisposeBag).
//! 4. [`CompositeDisposable`] disposes members in reverse insertion order and
//!    disposes late insertions immediately.

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::dispose_bag::DisposeBag;
use crate::sync::lock;

/// A resource that can be released exactly once.
///
/// Implement this for custom resources and wrap them with
/// [`Disposable::from_cancelable`].
pub trait Cancelable: Send + Sync {
    /// Release the resource. Must be idempotent.
    fn dispose(&self);

    /// Whether [`dispose`](Self::dispose) has taken effect.
    fn is_disposed(&self) -> bool;
}

type Action = Box<dyn FnOnce() + Send>;

/// Runs a release closure on first dispose. With no closure it is inert.
struct ActionDisposable {
    disposed: AtomicBool,
    action: Mutex<Option<Action>>,
}

impl ActionDisposable {
    fn new(action: Option<Action>) -> Self {
        Self {
            disposed: AtomicBool::new(false),
            action: Mutex::new(action),
        }
    }
}

impl Cancelable for ActionDisposable {
    fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        // Take under the lock, run outside it: the action may re-enter.
        let action = lock(&self.action).take();
        if let Some(action) = action {
            action();
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

/// Handle to a cancellable side effect or resource.
#[derive(Clone)]
pub struct Disposable {
    inner: Arc<dyn Cancelable>,
}

impl Disposable {
    /// A handle that releases nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_cancelable(Arc::new(ActionDisposable::new(None)))
    }

    /// A handle that runs `action` exactly once, on first dispose.
    #[must_use]
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self::from_cancelable(Arc::new(ActionDisposable::new(Some(Box::new(action)))))
    }

    /// Wrap a custom [`Cancelable`].
    #[must_use]
    pub fn from_cancelable<C: Cancelable + 'static>(resource: Arc<C>) -> Self {
        Self { inner: resource }
    }

    /// A handle disposing every member, last one first.
    #[must_use]
    pub fn composite(members: impl IntoIterator<Item = Disposable>) -> Self {
        let group = CompositeDisposable::new();
        for member in members {
            group.insert(member);
        }
        Self::from_cancelable(Arc::new(group))
    }

    /// Release the underlying resource. Calling again has no effect.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Hand this handle to `bag`, which disposes it on teardown.
    pub fn disposed_by(self, bag: &mut DisposeBag) {
        bag.insert(self);
    }
}

impl Default for Disposable {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Disposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

/// A thread-safe group of handles disposed together.
#[derive(Default)]
pub struct CompositeDisposable {
    disposed: AtomicBool,
    members: Mutex<Vec<Disposable>>,
}

impl CompositeDisposable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member. If the group is already disposed, `member` is disposed
    /// immediately instead.
    pub fn insert(&self, member: Disposable) {
        {
            let mut members = lock(&self.members);
            if !self.disposed.load(Ordering::Acquire) {
                members.push(member);
                return;
            }
        }
        member.dispose();
    }

    /// Number of members not yet disposed by the group.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.members).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cancelable for CompositeDisposable {
    fn dispose(&self) {
        let members = {
            let mut members = lock(&self.members);
            if self.disposed.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::take(&mut *members)
        };
        for member in members.iter().rev() {
            member.dispose();
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}

impl fmt::Debug for CompositeDisposable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeDisposable")
            .field("disposed", &self.is_disposed())
            .field("len", &self.len())
            .finish()
    }
}
