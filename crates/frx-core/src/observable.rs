#![forbid(unsafe_code)]

//! Cold observable sequences and the per-subscription state machine.
//!
//! # Design
//!
//! [`Observable<T, E>`] stores a producer `Fn(Emitter<T, E>) -> Disposable`
//! behind an `Arc`. Nothing runs until [`subscribe`](Observable::subscribe);
//! every subscription invokes the producer again with a fresh [`Emitter`]
//! (cold semantics), so producer side effects happen once per subscription.
//!
//! Each subscription owns a `SubscriptionCore`: the observer, the producer's
//! resource handle, and a one-way state flag:
//!
//! ```text
//! Active ──(Error | Completed)──► Terminated ──► Disposed
//!    └──────────────(dispose)───────────────────────┘
//! ```
//!
//! Delivery checks the flag under the observer lock, so events reach the
//! observer one at a time and in emission order, even when the producer
//! emits from another thread.
//!
//! # Invariants
//!
//! 1. At most one terminal event reaches the observer; anything emitted
//!    after it is dropped.
//! 2. Once `dispose` returns, at most one in-flight delivery (one that
//!    passed the state check before disposal) may still reach the observer.
//!    Nothing emitted after it does.
//! 3. A terminal event disposes the subscription right after delivery: the
//!    producer's resource is released and `on_disposed` runs.
//! 4. Disposal runs the resource's release and `on_disposed` at most once,
//!    and drops the observer along with everything its callbacks captured.
//! 5. A resource returned by a producer that already terminated (or was
//!    disposed mid-subscribe) is released as soon as it is returned.
//!
//! # Failure Modes
//!
//! - **Re-entrant emission**: emitting into a subscription from inside one of
//!   its own observer callbacks deadlocks on the observer lock. Disposing
//!   from inside a callback is fine.
//! - **Unhandled errors**: an `Error` delivered to an observer without an
//!   error callback is dropped, or logged when
//!   [`RxConfig::unhandled_error`](crate::RxConfig) is `log`.

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{trace, warn};

use crate::config::{RxConfig, UnhandledErrorPolicy};
use crate::disposable::{Cancelable, Disposable};
use crate::error::RxError;
use crate::event::Event;
use crate::observer::Observer;
use crate::sync::{lock, try_lock};

const ACTIVE: u8 = 0;
const TERMINATED: u8 = 1;
const DISPOSED: u8 = 2;

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

type Producer<T, E> = dyn Fn(Emitter<T, E>) -> Disposable + Send + Sync;

/// Shared state of one subscription.
struct SubscriptionCore<T, E> {
    id: u64,
    state: AtomicU8,
    /// `None` once the subscription is disposed, so captured state is freed
    /// even while handles or emitters are still around.
    observer: Mutex<Option<Observer<T, E>>>,
    /// Split out of the observer so disposal never touches the observer lock.
    on_disposed: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    /// What the producer returned; `None` until it returns.
    resource: Mutex<Option<Disposable>>,
}

impl<T, E> SubscriptionCore<T, E> {
    fn new(mut observer: Observer<T, E>) -> Self {
        let on_disposed = observer.take_on_disposed();
        Self {
            id: NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed),
            state: AtomicU8::new(ACTIVE),
            observer: Mutex::new(Some(observer)),
            on_disposed: Mutex::new(on_disposed),
            resource: Mutex::new(None),
        }
    }

    fn deliver(&self, event: Event<T, E>) {
        let terminal = event.is_terminal();
        {
            let mut slot = lock(&self.observer);
            let state = self.state.load(Ordering::Acquire);
            if state != ACTIVE {
                trace!(
                    target: "frx::subscription",
                    subscription = self.id,
                    kind = event.kind(),
                    "dropping event after terminal or dispose"
                );
                if state == DISPOSED {
                    let released = slot.take();
                    drop(slot);
                    drop(released);
                }
                return;
            }
            let Some(observer) = slot.as_mut() else {
                return;
            };
            if terminal {
                if self
                    .state
                    .compare_exchange(ACTIVE, TERMINATED, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    return;
                }
                trace!(
                    target: "frx::subscription",
                    subscription = self.id,
                    kind = event.kind(),
                    "terminated"
                );
            }
            if matches!(event, Event::Error(_))
                && !observer.handles_errors()
                && RxConfig::global().unhandled_error == UnhandledErrorPolicy::Log
            {
                warn!(
                    target: "frx::subscription",
                    subscription = self.id,
                    "error event reached an observer without an error callback"
                );
            }
            observer.on(event);
        }
        if terminal {
            self.dispose();
        }
        // `dispose` skips the observer while a callback holds its lock.
        if self.state.load(Ordering::Acquire) == DISPOSED {
            self.release_observer();
        }
    }

    fn attach(&self, resource: Disposable) {
        {
            let mut slot = lock(&self.resource);
            if self.state.load(Ordering::Acquire) != DISPOSED {
                *slot = Some(resource);
                return;
            }
        }
        resource.dispose();
    }

    fn release_observer(&self) {
        let observer = lock(&self.observer).take();
        drop(observer);
    }
}

impl<T, E> Cancelable for SubscriptionCore<T, E> {
    fn dispose(&self) {
        if self.state.swap(DISPOSED, Ordering::AcqRel) == DISPOSED {
            return;
        }
        trace!(target: "frx::subscription", subscription = self.id, "disposed");
        let resource = lock(&self.resource).take();
        if let Some(resource) = resource {
            resource.dispose();
        }
        let on_disposed = lock(&self.on_disposed).take();
        if let Some(on_disposed) = on_disposed {
            on_disposed();
        }
        // A delivery in progress holds the observer lock; it releases the
        // observer itself once its callback returns.
        let observer = try_lock(&self.observer).and_then(|mut slot| slot.take());
        drop(observer);
    }

    fn is_disposed(&self) -> bool {
        self.state.load(Ordering::Acquire) == DISPOSED
    }
}

/// Producer-side handle for pushing events into one subscription.
///
/// Cloneable and `Send`, so a producer may hand it to another thread and
/// return its [`Disposable`] immediately.
pub struct Emitter<T, E> {
    core: Arc<SubscriptionCore<T, E>>,
}

impl<T, E> Clone for Emitter<T, E> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T, E> Emitter<T, E> {
    pub fn next(&self, value: T) {
        self.core.deliver(Event::Next(value));
    }

    pub fn error(&self, err: E) {
        self.core.deliver(Event::Error(err));
    }

    pub fn completed(&self) {
        self.core.deliver(Event::Completed);
    }

    /// Push an arbitrary event.
    pub fn on(&self, event: Event<T, E>) {
        self.core.deliver(event);
    }

    /// True once the subscription stopped accepting events (terminated or
    /// disposed). Long-running producers should poll this and stop early.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.core.state.load(Ordering::Acquire) != ACTIVE
    }
}

impl<T, E> fmt::Debug for Emitter<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("subscription", &self.core.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// A lazy, cold, replayable description of an event sequence.
///
/// Cloning shares the same producer. The producer itself is immutable, so an
/// `Observable` can be subscribed many times, from many threads.
pub struct Observable<T, E = RxError> {
    producer: Arc<Producer<T, E>>,
}

impl<T, E> Clone for Observable<T, E> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T, E> fmt::Debug for Observable<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

impl<T: Send + 'static, E: Send + 'static> Observable<T, E> {
    /// Wrap an arbitrary producer.
    ///
    /// The producer runs once per subscription. Emission order is not
    /// validated; the subscription drops anything after a terminal event.
    #[must_use]
    pub fn create<F>(producer: F) -> Self
    where
        F: Fn(Emitter<T, E>) -> Disposable + Send + Sync + 'static,
    {
        Self {
            producer: Arc::new(producer),
        }
    }

    /// Emits `value`, then completes.
    #[must_use]
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::create(move |emitter| {
            emitter.next(value.clone());
            emitter.completed();
            Disposable::empty()
        })
    }

    /// Emits each value in order, then completes.
    #[must_use]
    pub fn of(values: impl IntoIterator<Item = T>) -> Self
    where
        T: Clone + Sync,
    {
        let values: Arc<[T]> = values.into_iter().collect();
        Self::create(move |emitter| {
            for value in values.iter() {
                if emitter.is_disposed() {
                    break;
                }
                emitter.next(value.clone());
            }
            emitter.completed();
            Disposable::empty()
        })
    }

    /// Completes immediately.
    #[must_use]
    pub fn empty() -> Self {
        Self::create(|emitter| {
            emitter.completed();
            Disposable::empty()
        })
    }

    /// Never emits anything.
    #[must_use]
    pub fn never() -> Self {
        Self::create(|_| Disposable::empty())
    }

    /// Fails immediately with `err`.
    #[must_use]
    pub fn error(err: E) -> Self
    where
        E: Clone + Sync,
    {
        Self::create(move |emitter| {
            emitter.error(err.clone());
            Disposable::empty()
        })
    }

    /// Calls `factory` at every subscription and subscribes to what it
    /// returns.
    ///
    /// `factory` may carry its own mutable state; calls are serialized.
    #[must_use]
    pub fn deferred<F>(factory: F) -> Self
    where
        F: FnMut() -> Observable<T, E> + Send + 'static,
    {
        let factory = Mutex::new(factory);
        Self::create(move |emitter| {
            let source = {
                let mut make = lock(&factory);
                (*make)()
            };
            source.forward_to(emitter)
        })
    }

    /// Subscribe `observer` and return the subscription's handle.
    ///
    /// Runs the producer on the calling thread. Synchronous producers
    /// deliver every event before this returns.
    pub fn subscribe(&self, observer: Observer<T, E>) -> Disposable {
        let core = Arc::new(SubscriptionCore::new(observer));
        trace!(target: "frx::subscription", subscription = core.id, "subscribe");
        let resource = (self.producer)(Emitter {
            core: Arc::clone(&core),
        });
        core.attach(resource);
        Disposable::from_cancelable(core)
    }

    /// Subscribe with only an element callback.
    pub fn subscribe_next(&self, on_next: impl FnMut(T) + Send + 'static) -> Disposable {
        self.subscribe(Observer::new().on_next(on_next))
    }

    /// Subscribe with one closure receiving every event.
    pub fn subscribe_event(
        &self,
        on_event: impl FnMut(Event<T, E>) + Send + 'static,
    ) -> Disposable {
        self.subscribe(Observer::from_fn(on_event))
    }

    /// Subscribe so that every event is re-emitted into `emitter`.
    pub(crate) fn forward_to(&self, emitter: Emitter<T, E>) -> Disposable {
        self.subscribe(Observer::from_fn(move |event| emitter.on(event)))
    }
}

impl<E: Send + 'static> Observable<i64, E> {
    /// Emits `count` consecutive integers starting at `start`, then
    /// completes.
    ///
    /// # Errors
    ///
    /// [`RxError::InvalidArgument`] if `count` is negative or the last value
    /// would overflow `i64`.
    pub fn range(start: i64, count: i64) -> Result<Self, RxError> {
        if count < 0 {
            return Err(RxError::invalid_argument(
                "count",
                format!("must be >= 0, got {count}"),
            ));
        }
        if count > 0 && start.checked_add(count - 1).is_none() {
            return Err(RxError::invalid_argument(
                "count",
                format!("range starting at {start} with {count} values overflows i64"),
            ));
        }
        Ok(Self::create(move |emitter| {
            for offset in 0..count {
                if emitter.is_disposed() {
                    break;
                }
                emitter.next(start + offset);
            }
            emitter.completed();
            Disposable::empty()
        }))
    }
}

impl<T, E> FromIterator<T> for Observable<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    /// The `from(collection)` factory.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::of(iter)
    }
}
