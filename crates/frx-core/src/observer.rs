#![forbid(unsafe_code)]

//! Observer callback record.
//!
//! An [`Observer`] is the consumer side of one subscription: up to four
//! optional callbacks, each defaulting to a no-op. Build it with the
//! chained setters:
//!
//! ```
//! use frx_core::Observer;
//!
//! let observer: Observer<i32, String> = Observer::new()
//!     .on_next(|v| println!("{v}"))
//!     .on_error(|e| eprintln!("{e}"))
//!     .on_completed(|| println!("Completed"))
//!     .on_disposed(|| println!("Disposed"));
//! # drop(observer);
//! ```
//!
//! [`Observer::on`] is raw dispatch. The one-shot terminal rule is enforced
//! by the subscription that owns the observer, not here.

use std::fmt;

use crate::event::Event;

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn<E> = Box<dyn FnOnce(E) + Send>;
type DoneFn = Box<dyn FnOnce() + Send>;
type EventFn<T, E> = Box<dyn FnMut(Event<T, E>) + Send>;

/// Sink for the events of a single subscription.
///
/// When built with [`from_fn`](Self::from_fn) the event closure takes every
/// event; otherwise each kind goes to its own optional callback.
pub struct Observer<T, E> {
    on_event: Option<EventFn<T, E>>,
    on_next: Option<NextFn<T>>,
    on_error: Option<ErrorFn<E>>,
    on_completed: Option<DoneFn>,
    on_disposed: Option<DoneFn>,
}

impl<T, E> Default for Observer<T, E> {
    fn default() -> Self {
        Self {
            on_event: None,
            on_next: None,
            on_error: None,
            on_completed: None,
            on_disposed: None,
        }
    }
}

impl<T, E> Observer<T, E> {
    /// An observer that ignores everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An observer routing every event to one closure.
    #[must_use]
    pub fn from_fn(on_event: impl FnMut(Event<T, E>) + Send + 'static) -> Self {
        Self {
            on_event: Some(Box::new(on_event)),
            ..Self::default()
        }
    }

    /// Set the element callback.
    ///
    /// On an observer built with [`from_fn`](Self::from_fn) this discards the
    /// event closure and switches to per-kind callbacks.
    #[must_use]
    pub fn on_next(mut self, f: impl FnMut(T) + Send + 'static) -> Self {
        self.on_event = None;
        self.on_next = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_error(mut self, f: impl FnOnce(E) + Send + 'static) -> Self {
        self.on_event = None;
        self.on_error = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_completed(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_event = None;
        self.on_completed = Some(Box::new(f));
        self
    }

    /// Runs once when the subscription is disposed, explicitly or after a
    /// terminal event.
    #[must_use]
    pub fn on_disposed(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_disposed = Some(Box::new(f));
        self
    }

    /// Dispatch `event` to the matching callback.
    pub fn on(&mut self, event: Event<T, E>) {
        if let Some(f) = &mut self.on_event {
            f(event);
            return;
        }
        match event {
            Event::Next(value) => {
                if let Some(f) = &mut self.on_next {
                    f(value);
                }
            }
            Event::Error(err) => {
                if let Some(f) = self.on_error.take() {
                    f(err);
                }
            }
            Event::Completed => {
                if let Some(f) = self.on_completed.take() {
                    f();
                }
            }
        }
    }

    /// Whether an `Error` event reaches user code.
    pub(crate) fn handles_errors(&self) -> bool {
        self.on_event.is_some() || self.on_error.is_some()
    }

    pub(crate) fn take_on_disposed(&mut self) -> Option<DoneFn> {
        self.on_disposed.take()
    }
}

impl<T, E> fmt::Debug for Observer<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("on_event", &self.on_event.is_some())
            .field("on_next", &self.on_next.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_completed", &self.on_completed.is_some())
            .field("on_disposed", &self.on_disposed.is_some())
            .finish()
    }
}
