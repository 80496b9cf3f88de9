use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use futures::future::FusedFuture;

use super::*;
use crate::error::AnimError;
use crate::frame::FrameLoop;
use crate::time::{Clock, ManualClock, SystemClock};

fn manual_loop() -> (FrameLoop<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    (FrameLoop::new(clock.clone()), clock)
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
}

/// Callback that records every progress value it sees.
fn recorder() -> (Rc<RefCell<Vec<f64>>>, impl FnMut(f64, &()) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    (seen, move |p: f64, _: &()| sink.borrow_mut().push(p))
}

// ── zero duration ─────────────────────────────────────────────────────────

#[test]
fn zero_duration_resolves_on_first_frame_without_callback() {
    let (fl, _) = manual_loop();
    let (seen, cb) = recorder();

    let mut signal = fl.scheduler().run(cb, Duration::ZERO, ());
    assert!(signal.try_complete().is_none());
    assert_eq!(fl.pending(), 1);

    assert_eq!(fl.pump(), 1);
    assert!(matches!(signal.try_complete(), Some(Ok(()))));
    assert!(seen.borrow().is_empty());
    assert_eq!(fl.pending(), 0);
}

// ── progress ──────────────────────────────────────────────────────────────

#[test]
fn progress_is_bounded_and_non_decreasing() {
    let (fl, _) = manual_loop();
    let (seen, cb) = recorder();

    let signal = fl.scheduler().run(cb, Duration::from_millis(100), ());
    fl.block_on(signal).unwrap().unwrap();

    let seen = seen.borrow();
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|p| (0.0..=1.0).contains(p)));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn last_progress_stays_below_one() {
    let (fl, _) = manual_loop();
    let last = Rc::new(Cell::new(-1.0_f64));
    let sink = Rc::clone(&last);

    let signal = fl
        .scheduler()
        .run(move |p, _: &()| sink.set(p), Duration::from_millis(100), ());
    fl.block_on(signal).unwrap().unwrap();

    // 60 Hz frames at 0, 16.67, .. 83.33 ms run the callback; the 100 ms frame completes.
    let last = last.get();
    assert!(last < 1.0);
    assert!((last - 5.0 / 6.0).abs() < 1e-6);
}

#[test]
fn one_callback_per_frame_until_elapsed() {
    let (fl, _) = manual_loop();
    let (seen, cb) = recorder();

    let signal = fl.scheduler().run(cb, Duration::from_millis(100), ());
    fl.block_on(signal).unwrap().unwrap();

    assert_eq!(seen.borrow().len(), 6);
    assert_eq!(seen.borrow()[0], 0.0);
}

#[test]
fn progress_tracks_clock_not_frame_count() {
    let (fl, clock) = manual_loop();
    let (seen, cb) = recorder();

    let _signal = fl.scheduler().run(cb, Duration::from_millis(200), ());
    clock.advance(Duration::from_millis(50));
    fl.pump();
    clock.advance(Duration::from_millis(100));
    fl.pump();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_close(seen[0], 0.25);
    assert_close(seen[1], 0.75);
}

/// Clock whose time can be moved backwards, to exercise the monotonic guard.
#[derive(Clone)]
struct JumpyClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl Clock for JumpyClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

#[test]
fn progress_never_regresses_on_backwards_clock() {
    let clock = JumpyClock {
        origin: Instant::now(),
        offset: Rc::new(Cell::new(Duration::ZERO)),
    };
    let fl = FrameLoop::new(clock.clone());
    let (seen, cb) = recorder();

    let _signal = fl.scheduler().run(cb, Duration::from_millis(100), ());
    clock.offset.set(Duration::from_millis(60));
    fl.pump();
    clock.offset.set(Duration::from_millis(20));
    fl.pump();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1], seen[0]);
}

// ── arguments ─────────────────────────────────────────────────────────────

#[test]
fn extra_args_forwarded_to_every_call() {
    let (fl, _) = manual_loop();
    let calls = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&calls);

    let signal = fl.scheduler().run(
        move |p, args: &(&str, i32)| sink.borrow_mut().push((p, args.0.to_string(), args.1)),
        Duration::from_millis(100),
        ("x", 42),
    );
    fl.block_on(signal).unwrap().unwrap();

    let calls = calls.borrow();
    assert!(!calls.is_empty());
    assert!(calls.iter().all(|(_, s, n)| s == "x" && *n == 42));
}

// ── concurrency ───────────────────────────────────────────────────────────

#[test]
fn concurrent_runs_track_their_own_start() {
    let (fl, clock) = manual_loop();
    let scheduler = fl.scheduler();
    let (short_seen, short_cb) = recorder();
    let (long_seen, long_cb) = recorder();

    let short = scheduler.run(short_cb, Duration::from_millis(50), ());
    let long = scheduler.run(long_cb, Duration::from_millis(200), ());

    let (short_clock, long_clock) = (clock.clone(), clock.clone());
    let (short_done, long_done) = fl
        .block_on(futures::future::join(
            async move {
                short.await.unwrap();
                short_clock.elapsed()
            },
            async move {
                long.await.unwrap();
                long_clock.elapsed()
            },
        ))
        .unwrap();

    assert!(short_done >= Duration::from_millis(50));
    assert!(short_done < Duration::from_millis(200));
    assert!(long_done >= Duration::from_millis(200));
    assert_eq!(short_seen.borrow().len(), 3);
    assert_eq!(long_seen.borrow().len(), 12);
}

#[test]
fn late_run_measures_from_its_own_start() {
    let (fl, clock) = manual_loop();
    let scheduler = fl.scheduler();
    let (_, first_cb) = recorder();
    let (late_seen, late_cb) = recorder();

    let _first = scheduler.run(first_cb, Duration::from_millis(500), ());
    clock.advance(Duration::from_millis(100));
    fl.pump();

    let _late = scheduler.run(late_cb, Duration::from_millis(100), ());
    clock.advance(Duration::from_millis(50));
    fl.pump();

    let late_seen = late_seen.borrow();
    assert_eq!(late_seen.len(), 1);
    assert_close(late_seen[0], 0.5);
}

#[test]
fn runs_share_a_batch_in_start_order() {
    let (fl, _) = manual_loop();
    let scheduler = fl.scheduler();
    let order = Rc::new(RefCell::new(Vec::new()));

    for name in ["a", "b"] {
        let order = Rc::clone(&order);
        let _ = scheduler.run(
            move |_, n: &String| order.borrow_mut().push(n.clone()),
            Duration::from_millis(100),
            name.to_string(),
        );
    }
    fl.pump();

    assert_eq!(*order.borrow(), vec!["a", "b"]);
}

// ── completion ────────────────────────────────────────────────────────────

#[test]
fn completes_exactly_once_and_stops_requesting_frames() {
    let (fl, clock) = manual_loop();
    let count = Rc::new(Cell::new(0));
    let sink = Rc::clone(&count);

    let mut signal = fl
        .scheduler()
        .run(move |_, _: &()| sink.set(sink.get() + 1), Duration::from_millis(100), ());

    let mut completions = 0;
    for _ in 0..20 {
        clock.advance(Duration::from_millis(16));
        fl.pump();
        if signal.try_complete().is_some() {
            completions += 1;
        }
    }

    assert_eq!(completions, 1);
    assert!(signal.is_terminated());
    assert_eq!(fl.pending(), 0);
    let after = count.get();
    assert_eq!(fl.pump(), 0);
    assert_eq!(count.get(), after);
}

#[test]
fn emit_final_frame_delivers_one() {
    let (fl, _) = manual_loop();
    let (seen, cb) = recorder();
    let scheduler = fl.scheduler_with(SchedulerConfig { final_frame: FinalFrame::Emit });

    let signal = scheduler.run(cb, Duration::from_millis(100), ());
    fl.block_on(signal).unwrap().unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.last(), Some(&1.0));
    assert_eq!(seen.iter().filter(|p| **p == 1.0).count(), 1);
}

#[test]
fn emit_final_frame_with_zero_duration() {
    let (fl, _) = manual_loop();
    let (seen, cb) = recorder();
    let scheduler = fl.scheduler_with(SchedulerConfig { final_frame: FinalFrame::Emit });

    let signal = scheduler.run(cb, Duration::ZERO, ());
    fl.block_on(signal).unwrap().unwrap();

    assert_eq!(*seen.borrow(), vec![1.0]);
}

// ── failures ──────────────────────────────────────────────────────────────

#[test]
fn failing_callback_rejects_and_halts() {
    let (fl, _) = manual_loop();
    let calls = Rc::new(Cell::new(0));
    let sink = Rc::clone(&calls);

    let signal = fl.scheduler().try_run(
        move |p, _: &()| {
            sink.set(sink.get() + 1);
            if p > 0.3 {
                return Err(anyhow!("render target lost"));
            }
            Ok(())
        },
        Duration::from_millis(100),
        (),
    );

    let result = fl.block_on(signal).unwrap();
    match result {
        Err(AnimError::Callback(e)) => assert_eq!(e.to_string(), "render target lost"),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(fl.pending(), 0);
    // 0.0, 0.1667, 0.3333 (fails)
    assert_eq!(calls.get(), 3);
}

#[test]
fn panicking_callback_rejects_signal() {
    let (fl, _) = manual_loop();

    let signal = fl.scheduler().run(
        |_, _: &()| panic!("bad frame"),
        Duration::from_millis(100),
        (),
    );

    let result = fl.block_on(signal).unwrap();
    assert!(matches!(result, Err(AnimError::CallbackPanicked(m)) if m == "bad frame"));
    assert_eq!(fl.pending(), 0);
}

#[test]
fn dropping_loop_abandons_run() {
    let (fl, _) = manual_loop();
    let (_, cb) = recorder();

    let mut signal = fl.scheduler().run(cb, Duration::from_millis(100), ());
    drop(fl);

    assert!(matches!(signal.try_complete(), Some(Err(AnimError::Abandoned))));
}

#[test]
fn run_on_dropped_loop_is_abandoned() {
    let (fl, _) = manual_loop();
    let scheduler = fl.scheduler();
    drop(fl);

    let (_, cb) = recorder();
    let mut signal = scheduler.run(cb, Duration::from_millis(100), ());
    assert!(matches!(signal.try_complete(), Some(Err(AnimError::Abandoned))));
}

// ── wall clock ────────────────────────────────────────────────────────────

#[test]
fn system_clock_run_takes_at_least_duration() {
    let fl = FrameLoop::new(SystemClock);
    let (seen, cb) = recorder();
    let duration = Duration::from_millis(40);

    let started = Instant::now();
    let signal = fl.scheduler().run(cb, duration, ());
    fl.block_on(signal).unwrap().unwrap();

    assert!(started.elapsed() >= duration);
    assert!(seen.borrow().iter().all(|p| *p < 1.0));
}

#[test]
fn system_clock_concurrent_runs_finish_independently() {
    let fl = FrameLoop::new(SystemClock);
    let scheduler = fl.scheduler();
    let (_, short_cb) = recorder();
    let (_, long_cb) = recorder();

    let started = Instant::now();
    let short = scheduler.run(short_cb, Duration::from_millis(50), ());
    let long = scheduler.run(long_cb, Duration::from_millis(200), ());

    let (short_done, long_done) = fl
        .block_on(futures::future::join(
            async move {
                short.await.unwrap();
                started.elapsed()
            },
            async move {
                long.await.unwrap();
                started.elapsed()
            },
        ))
        .unwrap();

    assert!(short_done >= Duration::from_millis(50));
    assert!(short_done < long_done);
    assert!(long_done >= Duration::from_millis(200));
}
