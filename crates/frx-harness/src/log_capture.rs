#![forbid(unsafe_code)]

//! In-memory capture of `tracing` output.
//!
//! ```
//! use frx_harness::LogCapture;
//!
//! let capture = LogCapture::new();
//! capture.with_default(|| tracing::info!(target: "demo", "hello"));
//! assert!(capture.contents().contains("hello"));
//! ```

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Install a global fmt subscriber writing through the test harness.
///
/// Filter comes from `RUST_LOG`, defaulting to `info`. Safe to call from
/// every test; only the first call installs anything.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// Shared buffer receiving formatted log lines.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with a thread-local subscriber writing every event at `TRACE`
    /// and above into this capture.
    pub fn with_default<R>(&self, f: impl FnOnce() -> R) -> R {
        self.with_level(Level::TRACE, f)
    }

    /// Like [`with_default`](Self::with_default) with a custom max level.
    pub fn with_level<R>(&self, level: Level, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(level)
            .with_ansi(false)
            .without_time()
            .with_target(true)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    /// Everything captured so far, lossily decoded.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&self.buf)).into_owned()
    }

    /// Captured lines containing `needle`, in order.
    #[must_use]
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_owned)
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.buf).clear();
    }
}

/// Writer handed to the fmt layer for each event.
#[derive(Debug)]
pub struct CaptureWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        lock(&self.buf).extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buf: Arc::clone(&self.buf),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_and_filters_by_level() {
        let capture = LogCapture::new();
        capture.with_level(Level::INFO, || {
            tracing::debug!("hidden");
            tracing::info!("shown");
        });
        let contents = capture.contents();
        assert!(contents.contains("shown"));
        assert!(!contents.contains("hidden"));

        assert_eq!(capture.lines_containing("shown").len(), 1);
        capture.clear();
        assert!(capture.contents().is_empty());
    }
}
