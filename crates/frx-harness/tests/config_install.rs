//! Installing a process-wide config before first use.
//!
//! Kept in its own test binary: the global config can be set only once per
//! process.

use frx_core::{Observable, Observer, RxConfig, UnhandledErrorPolicy};
use frx_harness::LogCapture;

#[test]
fn installed_config_drives_debug_and_unhandled_errors() {
    let config = RxConfig {
        unhandled_error: UnhandledErrorPolicy::Log,
        debug_enabled: true,
        debug_value_limit: 12,
    };
    assert!(config.validate().is_ok());
    RxConfig::install(config.clone()).expect("first install in this process");
    assert_eq!(RxConfig::global(), &config);
    assert!(RxConfig::install(RxConfig::default()).is_err());

    let capture = LogCapture::new();
    capture.with_default(|| {
        Observable::<&str, &str>::just("a rather long value")
            .debug("clip")
            .subscribe(Observer::new());
    });
    let clipped = capture.lines_containing("clip -> Event next(");
    assert_eq!(clipped.len(), 1);
    assert!(clipped[0].contains("next(\"a rath..."), "{}", clipped[0]);

    capture.clear();
    capture.with_default(|| {
        Observable::<i32, &str>::error("lost").subscribe(Observer::new());
    });
    assert_eq!(
        capture
            .lines_containing("error event reached an observer without an error callback")
            .len(),
        1
    );

    capture.clear();
    capture.with_default(|| {
        Observable::<i32, &str>::error("handled").subscribe(Observer::new().on_error(|_| {}));
    });
    assert!(
        capture
            .lines_containing("without an error callback")
            .is_empty()
    );
}
