#![forbid(unsafe_code)]

//! Side-effect taps: observe a sequence without changing it.
//!
//! [`Observable::tap`] (the `do` operator; `do` is reserved in Rust) runs
//! hooks around a subscription. [`Observable::debug`] is a tap that logs
//! every lifecycle step through `tracing`.
//!
//! # Invariants
//!
//! 1. `on_subscribe` runs exactly once per subscription, before the upstream
//!    producer starts.
//! 2. Event hooks run before the event is forwarded; forwarded events and
//!    their order are unchanged.
//! 3. `on_dispose` runs once per subscription, whether disposal was explicit
//!    or followed a terminal event.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::RxConfig;
use crate::disposable::Disposable;
use crate::event::Event;
use crate::observable::Observable;
use crate::observer::Observer;

type Hook = Box<dyn Fn() + Send + Sync>;
type ValueHook<V> = Box<dyn Fn(&V) + Send + Sync>;

/// Hooks for [`Observable::tap`]. Every hook is optional.
pub struct Tap<T, E> {
    on_subscribe: Option<Hook>,
    on_next: Option<ValueHook<T>>,
    on_error: Option<ValueHook<E>>,
    on_completed: Option<Hook>,
    on_dispose: Option<Hook>,
}

impl<T, E> Default for Tap<T, E> {
    fn default() -> Self {
        Self {
            on_subscribe: None,
            on_next: None,
            on_error: None,
            on_completed: None,
            on_dispose: None,
        }
    }
}

impl<T, E> Tap<T, E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_subscribe(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_subscribe = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_next(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_next = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&E) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_completed(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_completed = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_dispose(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_dispose = Some(Box::new(f));
        self
    }

    fn observe(&self, event: &Event<T, E>) {
        match event {
            Event::Next(value) => {
                if let Some(f) = &self.on_next {
                    f(value);
                }
            }
            Event::Error(err) => {
                if let Some(f) = &self.on_error {
                    f(err);
                }
            }
            Event::Completed => {
                if let Some(f) = &self.on_completed {
                    f();
                }
            }
        }
    }
}

impl<T, E> fmt::Debug for Tap<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tap")
            .field("on_subscribe", &self.on_subscribe.is_some())
            .field("on_next", &self.on_next.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_completed", &self.on_completed.is_some())
            .field("on_dispose", &self.on_dispose.is_some())
            .finish()
    }
}

impl<T: Send + 'static, E: Send + 'static> Observable<T, E> {
    /// Run `hooks` around every subscription of `self`.
    #[must_use]
    pub fn tap(&self, hooks: Tap<T, E>) -> Observable<T, E> {
        let upstream = self.clone();
        let hooks = Arc::new(hooks);
        Observable::create(move |emitter| {
            if let Some(f) = &hooks.on_subscribe {
                f();
            }
            let event_hooks = Arc::clone(&hooks);
            let inner = upstream.subscribe(Observer::from_fn(move |event| {
                event_hooks.observe(&event);
                emitter.on(event);
            }));
            let dispose_hooks = Arc::clone(&hooks);
            Disposable::new(move || {
                inner.dispose();
                if let Some(f) = &dispose_hooks.on_dispose {
                    f();
                }
            })
        })
    }

    /// Shorthand for a tap with only `on_subscribe`.
    #[must_use]
    pub fn do_on_subscribe(&self, f: impl Fn() + Send + Sync + 'static) -> Observable<T, E> {
        self.tap(Tap::new().on_subscribe(f))
    }

    /// Log subscribe, every event, and dispose at `DEBUG` under target
    /// `frx::debug`, prefixed with `tag`.
    ///
    /// A pass-through when [`RxConfig::debug_enabled`] is off.
    #[must_use]
    pub fn debug(&self, tag: impl Into<String>) -> Observable<T, E>
    where
        T: fmt::Debug,
        E: fmt::Debug,
    {
        let config = RxConfig::global();
        if !config.debug_enabled {
            return self.clone();
        }
        let limit = config.debug_value_limit;
        let tag: Arc<str> = Arc::from(tag.into());

        let log = move |tag: &str, what: &str| {
            debug!(target: "frx::debug", tag, "{tag} -> {what}");
        };
        let (t1, t2, t3, t4, t5) = (
            Arc::clone(&tag),
            Arc::clone(&tag),
            Arc::clone(&tag),
            Arc::clone(&tag),
            tag,
        );
        self.tap(
            Tap::new()
                .on_subscribe(move || log(&t1, "subscribed"))
                .on_next(move |value| {
                    let event = clip(format!("next({value:?})"), limit);
                    log(&t2, &format!("Event {event}"));
                })
                .on_error(move |err| {
                    let event = clip(format!("error({err:?})"), limit);
                    log(&t3, &format!("Event {event}"));
                })
                .on_completed(move || log(&t4, "Event completed"))
                .on_dispose(move || log(&t5, "isDisposed")),
        )
    }
}

/// Truncate to `limit` characters, marking the cut with `...`.
fn clip(mut text: String, limit: usize) -> String {
    if let Some((cut, _)) = text.char_indices().nth(limit) {
        text.truncate(cut);
        text.push_str("...");
    }
    text
}
