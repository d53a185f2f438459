#![forbid(unsafe_code)]

//! Core: cold observables, subscriptions, disposal, and single results.
//!
//! # Primary responsibilities
//! - **Observable**: lazy, replayable event sequences built from factories
//!   (`just`, `of`, `from_iter`, `empty`, `never`, `error`, `range`,
//!   `create`, `deferred`).
//! - **Observer / Emitter**: the consumer and producer ends of one
//!   subscription, with the one-shot terminal rule enforced in between.
//! - **Disposable / DisposeBag**: idempotent cancellation handles and their
//!   owner-scoped teardown.
//! - **Single**: sequences settling with exactly one `Result`.
//! - **Tap**: side-effect hooks and `debug` logging that leave events as-is.
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use frx_core::{DisposeBag, Observable, Observer};
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let mut bag = DisposeBag::new();
//!
//! let letters: Observable<&str> = Observable::of(["A", "B", "C"]);
//! letters
//!     .subscribe(Observer::new().on_next(move |v| sink.lock().unwrap().push(v)))
//!     .disposed_by(&mut bag);
//!
//! assert_eq!(*seen.lock().unwrap(), vec!["A", "B", "C"]);
//! ```
//!
//! # Scheduling
//! The core owns no scheduler. Producers run on the subscribing thread and
//! may hand their [`Emitter`] to any other thread; delivery to one observer
//! stays serialized in emission order.

pub mod config;
pub mod disposable;
pub mod dispose_bag;
pub mod error;
pub mod event;
pub mod observable;
pub mod observer;
pub mod single;
pub mod tap;

mod sync;

pub use config::{RxConfig, RxConfigParse, UnhandledErrorPolicy};
pub use disposable::{Cancelable, CompositeDisposable, Disposable};
pub use dispose_bag::DisposeBag;
pub use error::{RxConfigError, RxError};
pub use event::Event;
pub use observable::{Emitter, Observable};
pub use observer::Observer;
pub use single::{Single, SingleEmitter};
pub use tap::Tap;
