#![forbid(unsafe_code)]

//! Test harness and reference fixtures for frx observables.
//!
//! - [`EventRecorder`]: an observer factory that records every event and
//!   disposal of the subscriptions it is attached to.
//! - [`LogCapture`]: a `tracing` writer that keeps formatted log lines in
//!   memory so tests can assert on `debug(tag)` output.
//! - [`init_tracing`]: best-effort global subscriber for test output.

pub mod log_capture;
pub mod recorder;

pub use log_capture::{LogCapture, init_tracing};
pub use recorder::EventRecorder;
