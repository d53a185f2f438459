//! Cross-thread producers: ordering, cooperative cancellation, and shared
//! observables subscribed from many threads at once.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

use frx_core::{Disposable, Event, Observable, Observer, RxError, Single};
use frx_harness::{EventRecorder, init_tracing};
use tracing::info;

/// Emits `0..count` from a spawned thread, polling for disposal.
fn threaded_counter(count: u64, pace: Duration) -> Observable<u64> {
    Observable::create(move |emitter| {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_worker = Arc::clone(&stop);
        thread::spawn(move || {
            for i in 0..count {
                if stop_worker.load(Ordering::Acquire) || emitter.is_disposed() {
                    return;
                }
                emitter.next(i);
                if !pace.is_zero() {
                    thread::sleep(pace);
                }
            }
            emitter.completed();
        });
        Disposable::new(move || stop.store(true, Ordering::Release))
    })
}

#[test]
fn subscribe_returns_before_async_delivery() {
    init_tracing();
    info!("async producer delivers in order after subscribe returns");
    let (done_tx, done_rx) = mpsc::channel();
    let recorder = EventRecorder::<u64, RxError>::new();
    let observer = recorder.observer().on_disposed(move || {
        let _ = done_tx.send(());
    });

    let handle = threaded_counter(500, Duration::ZERO).subscribe(observer);
    done_rx
        .recv_timeout(Duration::from_secs(10))
        .expect("producer finishes");

    assert!(handle.is_disposed());
    assert_eq!(recorder.values(), (0..500).collect::<Vec<_>>());
    assert!(recorder.is_completed());
}

#[test]
fn dispose_stops_delivery_from_worker_thread() {
    init_tracing();
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_clone = Arc::clone(&seen);
    let (first_tx, first_rx) = mpsc::channel();
    let first_tx = Mutex::new(Some(first_tx));

    let handle = threaded_counter(10_000, Duration::from_millis(1)).subscribe(
        Observer::new().on_next(move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
            if let Some(tx) = first_tx.lock().unwrap().take() {
                let _ = tx.send(());
            }
        }),
    );
    first_rx
        .recv_timeout(Duration::from_secs(10))
        .expect("first value arrives");
    handle.dispose();

    let at_dispose = seen.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(50));
    let after = seen.load(Ordering::SeqCst);
    // At most one in-flight delivery may land after dispose.
    assert!(after <= at_dispose + 1, "{at_dispose} -> {after}");
    assert!(after < 10_000);
}

#[test]
fn concurrent_emitters_never_interleave_within_one_callback() {
    init_tracing();
    let emitters = Arc::new(Mutex::new(None));
    let emitters_clone = Arc::clone(&emitters);
    let source: Observable<usize, RxError> = Observable::create(move |emitter| {
        *emitters_clone.lock().unwrap() = Some(emitter);
        Disposable::empty()
    });

    let inside = Arc::new(AtomicBool::new(false));
    let overlaps = Arc::new(AtomicUsize::new(0));
    let delivered = Arc::new(AtomicUsize::new(0));
    let (inside_cb, overlaps_cb, delivered_cb) =
        (Arc::clone(&inside), Arc::clone(&overlaps), Arc::clone(&delivered));
    let _handle = source.subscribe(Observer::new().on_next(move |_| {
        if inside_cb.swap(true, Ordering::SeqCst) {
            overlaps_cb.fetch_add(1, Ordering::SeqCst);
        }
        delivered_cb.fetch_add(1, Ordering::SeqCst);
        inside_cb.store(false, Ordering::SeqCst);
    }));

    let emitter = emitters.lock().unwrap().clone().expect("producer ran");
    let barrier = Arc::new(Barrier::new(4));
    let workers: Vec<_> = (0..4)
        .map(|w| {
            let emitter = emitter.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..250 {
                    emitter.next(w * 1000 + i);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    assert_eq!(delivered.load(Ordering::SeqCst), 1000);
}

#[test]
fn racing_terminals_deliver_exactly_one() {
    init_tracing();
    for _ in 0..50 {
        let emitters = Arc::new(Mutex::new(None));
        let emitters_clone = Arc::clone(&emitters);
        let source: Observable<(), &'static str> = Observable::create(move |emitter| {
            *emitters_clone.lock().unwrap() = Some(emitter);
            Disposable::empty()
        });
        let recorder = EventRecorder::new();
        let _handle = source.subscribe(recorder.observer());
        let emitter = emitters.lock().unwrap().clone().expect("producer ran");

        let barrier = Arc::new(Barrier::new(2));
        let (e1, b1) = (emitter.clone(), Arc::clone(&barrier));
        let completer = thread::spawn(move || {
            b1.wait();
            e1.completed();
        });
        let (e2, b2) = (emitter, barrier);
        let failer = thread::spawn(move || {
            b2.wait();
            e2.error("boom");
        });
        completer.join().unwrap();
        failer.join().unwrap();

        let events = recorder.events();
        assert_eq!(events.len(), 1, "{events:?}");
        assert!(events[0].is_terminal());
        assert_eq!(recorder.disposals(), 1);
    }
}

#[test]
fn shared_observable_across_threads() {
    init_tracing();
    let source: Observable<u32> = Observable::of(0..100);
    let workers: Vec<_> = (0..8)
        .map(|_| {
            let source = source.clone();
            thread::spawn(move || {
                let recorder = EventRecorder::<u32, RxError>::new();
                source.subscribe(recorder.observer());
                recorder.events()
            })
        })
        .collect();

    let mut expected: Vec<Event<u32, RxError>> = (0..100).map(Event::Next).collect();
    expected.push(Event::Completed);
    for worker in workers {
        assert_eq!(worker.join().unwrap(), expected);
    }
}

#[test]
fn single_settled_from_another_thread() {
    init_tracing();
    let single: Single<String, RxError> = Single::create(|single| {
        let worker = single.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            worker.success("loaded".to_string());
        });
        Disposable::empty()
    });
    let (tx, rx) = mpsc::channel();
    single.subscribe(move |result| {
        let _ = tx.send(result);
    });
    let result = rx.recv_timeout(Duration::from_secs(10)).expect("settled");
    assert_eq!(result, Ok("loaded".to_string()));
}
