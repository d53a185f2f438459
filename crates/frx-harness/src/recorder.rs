#![forbid(unsafe_code)]

//! Recording observer for assertions on delivered events.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use frx_core::{Event, Observer};

/// Records the events delivered to every observer it hands out.
///
/// Cloning shares the same log.
pub struct EventRecorder<T, E> {
    events: Arc<Mutex<Vec<Event<T, E>>>>,
    disposals: Arc<AtomicUsize>,
}

impl<T, E> Clone for EventRecorder<T, E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
            disposals: Arc::clone(&self.disposals),
        }
    }
}

impl<T, E> Default for EventRecorder<T, E> {
    fn default() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            disposals: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl<T: Send + 'static, E: Send + 'static> EventRecorder<T, E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An observer appending to this recorder and counting disposals.
    #[must_use]
    pub fn observer(&self) -> Observer<T, E> {
        let events = Arc::clone(&self.events);
        let disposals = Arc::clone(&self.disposals);
        Observer::from_fn(move |event| lock(&events).push(event)).on_disposed(move || {
            disposals.fetch_add(1, Ordering::SeqCst);
        })
    }
}

impl<T, E> EventRecorder<T, E> {
    /// Number of `on_disposed` callbacks observed so far.
    #[must_use]
    pub fn disposals(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.events).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.events).is_empty()
    }

    /// Whether the last recorded event is `Completed`.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(lock(&self.events).last(), Some(Event::Completed))
    }

    /// Remove and return everything recorded so far.
    pub fn take(&self) -> Vec<Event<T, E>> {
        std::mem::take(&mut *lock(&self.events))
    }
}

impl<T: Clone, E: Clone> EventRecorder<T, E> {
    #[must_use]
    pub fn events(&self) -> Vec<Event<T, E>> {
        lock(&self.events).clone()
    }

    /// Values of the recorded `Next` events, in order.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        lock(&self.events)
            .iter()
            .filter_map(|event| event.value().cloned())
            .collect()
    }

    /// The recorded error, if any.
    #[must_use]
    pub fn error(&self) -> Option<E> {
        lock(&self.events)
            .iter()
            .find_map(|event| event.error().cloned())
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for EventRecorder<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRecorder")
            .field("events", &*lock(&self.events))
            .field("disposals", &self.disposals())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
