#![forbid(unsafe_code)]

//! Owner-scoped teardown of many [`Disposable`]s.
//!
//! # Invariants
//!
//! 1. Teardown disposes members in reverse insertion order (LIFO), each
//!    exactly once.
//! 2. After [`DisposeBag::dispose_all`] the bag is empty and may be reused;
//!    later insertions are held until the next teardown.
//! 3. Dropping the bag performs the same teardown.

use std::fmt;

use tracing::trace;

use crate::disposable::Disposable;

/// Aggregates handles and disposes them together when its owner goes away.
#[derive(Default)]
pub struct DisposeBag {
    members: Vec<Disposable>,
}

impl DisposeBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `disposable` until teardown. O(1) amortized.
    pub fn insert(&mut self, disposable: Disposable) {
        self.members.push(disposable);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Dispose every held handle, newest first, and empty the bag.
    pub fn dispose_all(&mut self) {
        if !self.members.is_empty() {
            trace!(
                target: "frx::dispose_bag",
                count = self.members.len(),
                "dispose bag teardown"
            );
        }
        while let Some(member) = self.members.pop() {
            member.dispose();
        }
    }
}

impl Drop for DisposeBag {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

impl Extend<Disposable> for DisposeBag {
    fn extend<I: IntoIterator<Item = Disposable>>(&mut self, iter: I) {
        self.members.extend(iter);
    }
}

impl fmt::Debug for DisposeBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposeBag")
            .field("len", &self.members.len())
            .finish()
    }
}
