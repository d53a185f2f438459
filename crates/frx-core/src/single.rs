#![forbid(unsafe_code)]

//! Sequences that finish with exactly one result.
//!
//! A [`Single`] either succeeds with one value or fails with one error, then
//! terminates. It is an [`Observable`] underneath: success is delivered as
//! `Next(v)` followed by `Completed`, failure as `Error(e)`. Subscribers see
//! the collapsed `Result<T, E>`.
//!
//! Typical producers wrap one-shot work such as a lookup or a load:
//!
//! ```
//! use frx_core::{Disposable, Single};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum LoadError { NotFound }
//!
//! fn load(name: &'static str) -> Single<String, LoadError> {
//!     Single::create(move |single| {
//!         match name {
//!             "greeting" => single.success("hello".to_string()),
//!             _ => single.error(LoadError::NotFound),
//!         }
//!         Disposable::empty()
//!     })
//! }
//!
//! load("greeting").subscribe(|result| assert_eq!(result.as_deref(), Ok("hello")));
//! load("missing").subscribe(|result| assert_eq!(result, Err(LoadError::NotFound)));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::disposable::Disposable;
use crate::error::RxError;
use crate::observable::{Emitter, Observable};

/// Producer-side handle of a [`Single`] subscription. Only the first
/// `success`/`error` call has any effect.
pub struct SingleEmitter<T, E> {
    emitter: Emitter<T, E>,
    settled: Arc<AtomicBool>,
}

impl<T, E> Clone for SingleEmitter<T, E> {
    fn clone(&self) -> Self {
        Self {
            emitter: self.emitter.clone(),
            settled: Arc::clone(&self.settled),
        }
    }
}

impl<T, E> SingleEmitter<T, E> {
    pub fn success(&self, value: T) {
        self.emit(Ok(value));
    }

    pub fn error(&self, err: E) {
        self.emit(Err(err));
    }

    /// Settle the single with `result`.
    pub fn emit(&self, result: Result<T, E>) {
        if self.settled.swap(true, Ordering::AcqRel) {
            return;
        }
        match result {
            Ok(value) => {
                self.emitter.next(value);
                self.emitter.completed();
            }
            Err(err) => self.emitter.error(err),
        }
    }

    /// True once settled or disposed.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.settled.load(Ordering::Acquire) || self.emitter.is_disposed()
    }
}

impl<T, E> fmt::Debug for SingleEmitter<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleEmitter")
            .field("settled", &self.settled.load(Ordering::Acquire))
            .finish()
    }
}

/// A cold sequence producing exactly one success or one error.
pub struct Single<T, E = RxError> {
    inner: Observable<T, E>,
}

impl<T, E> Clone for Single<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Single<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Single").finish_non_exhaustive()
    }
}

impl<T: Send + 'static, E: Send + 'static> Single<T, E> {
    /// Wrap a producer invoked once per subscription.
    #[must_use]
    pub fn create<F>(producer: F) -> Self
    where
        F: Fn(SingleEmitter<T, E>) -> Disposable + Send + Sync + 'static,
    {
        Self {
            inner: Observable::create(move |emitter| {
                producer(SingleEmitter {
                    emitter,
                    settled: Arc::new(AtomicBool::new(false)),
                })
            }),
        }
    }

    /// Succeeds with `value`.
    #[must_use]
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::create(move |single| {
            single.success(value.clone());
            Disposable::empty()
        })
    }

    /// Fails with `err`.
    #[must_use]
    pub fn error(err: E) -> Self
    where
        E: Clone + Sync,
    {
        Self::create(move |single| {
            single.error(err.clone());
            Disposable::empty()
        })
    }

    /// Calls `factory` at every subscription.
    #[must_use]
    pub fn deferred<F>(mut factory: F) -> Self
    where
        F: FnMut() -> Single<T, E> + Send + 'static,
    {
        Self {
            inner: Observable::deferred(move || factory().inner),
        }
    }

    /// Subscribe with a callback receiving the one result.
    pub fn subscribe(&self, on_result: impl FnOnce(Result<T, E>) + Send + 'static) -> Disposable {
        let mut on_result = Some(on_result);
        self.inner.subscribe_event(move |event| {
            let Some(result) = event.into_result() else {
                return;
            };
            if let Some(on_result) = on_result.take() {
                on_result(result);
            }
        })
    }

    /// Subscribe with separate success and error callbacks.
    pub fn subscribe_with(
        &self,
        on_success: impl FnOnce(T) + Send + 'static,
        on_error: impl FnOnce(E) + Send + 'static,
    ) -> Disposable {
        self.subscribe(move |result| match result {
            Ok(value) => on_success(value),
            Err(err) => on_error(err),
        })
    }

    /// View as a one-element observable.
    #[must_use]
    pub fn as_observable(&self) -> Observable<T, E> {
        self.inner.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    fn result_of<T: Send + 'static, E: Send + 'static>(single: &Single<T, E>) -> Vec<Result<T, E>> {
        let results = Arc::new(Mutex::new(Vec::new()));
        let results_clone = Arc::clone(&results);
        single.subscribe(move |result| results_clone.lock().unwrap().push(result));
        std::mem::take(&mut *results.lock().unwrap())
    }

    #[test]
    fn success_then_error_keeps_success() {
        let single: Single<i32, &str> = Single::create(|single| {
            single.success(7);
            single.error("late");
            single.success(8);
            Disposable::empty()
        });
        assert_eq!(result_of(&single), vec![Ok(7)]);
    }

    #[test]
    fn error_then_success_keeps_error() {
        let single: Single<i32, &str> = Single::create(|single| {
            single.error("first");
            assert!(single.is_disposed());
            single.success(1);
            Disposable::empty()
        });
        assert_eq!(result_of(&single), vec![Err("first")]);
    }

    #[test]
    fn just_and_error_factories() {
        assert_eq!(result_of(&Single::<&str, ()>::just("x")), vec![Ok("x")]);
        assert_eq!(result_of(&Single::<(), &str>::error("no")), vec![Err("no")]);
    }

    #[test]
    fn subscribe_with_routes_by_outcome() {
        let hits = Arc::new(AtomicUsize::new(0));
        let (a, b) = (Arc::clone(&hits), Arc::clone(&hits));
        Single::<i32, &str>::just(1).subscribe_with(
            move |v| {
                a.fetch_add(v as usize, Ordering::SeqCst);
            },
            |_| panic!("no error expected"),
        );
        Single::<i32, &str>::error("e").subscribe_with(
            |_| panic!("no value expected"),
            move |_| {
                b.fetch_add(10, Ordering::SeqCst);
            },
        );
        assert_eq!(hits.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn as_observable_emits_value_and_completed() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = Arc::clone(&log);
        Single::<i32, ()>::just(3)
            .as_observable()
            .subscribe_event(move |event| log_clone.lock().unwrap().push(event));
        assert_eq!(*log.lock().unwrap(), vec![Event::Next(3), Event::Completed]);
    }

    #[test]
    fn deferred_single_reruns_factory() {
        let mut n = 0;
        let single: Single<i32, ()> = Single::deferred(move || {
            n += 1;
            Single::just(n)
        });
        assert_eq!(result_of(&single), vec![Ok(1)]);
        assert_eq!(result_of(&single), vec![Ok(2)]);
    }

    #[test]
    fn subscription_is_disposed_after_result() {
        let handle = Single::<i32, ()>::just(1).subscribe(|_| {});
        assert!(handle.is_disposed());
    }
}
