use std::cell::RefCell;
use std::rc::Rc;

use super::*;

fn log_task(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Task {
    let log = Rc::clone(log);
    Box::new(move || {
        log.borrow_mut().push(name);
        Ok(())
    })
}

// =============================================================
// Construction
// =============================================================

#[test]
fn interval_follows_fps() {
    let s = TaskScheduler::new(50.0);
    assert!((s.min_interval_ms() - 20.0).abs() < 1e-12);
}

#[test]
fn invalid_fps_falls_back_to_default() {
    for fps in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let s = TaskScheduler::new(fps);
        assert!((s.min_interval_ms() - 1000.0 / DEFAULT_FPS).abs() < 1e-12);
    }
}

#[test]
fn empty_scheduler_is_idle() {
    let mut s = TaskScheduler::default();
    assert!(!s.has_pending());
    assert_eq!(s.tick(0.0), Tick::Idle);
}

// =============================================================
// Coalescing
// =============================================================

#[test]
fn later_request_replaces_pending_in_same_lane() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut s = TaskScheduler::new(60.0);
    s.schedule(log_task(&log, "first"), Priority::Normal);
    s.schedule(log_task(&log, "second"), Priority::Normal);
    s.schedule(log_task(&log, "third"), Priority::Normal);
    assert_eq!(s.tick(0.0), Tick::Ran(Priority::Normal));
    assert_eq!(*log.borrow(), vec!["third"]);
    assert_eq!(s.counters().coalesced, 2);
    assert_eq!(s.counters().executed, 1);
    assert!(!s.has_pending());
}

#[test]
fn lanes_do_not_coalesce_with_each_other() {
    let mut s = RenderScheduler::<u32>::new(60.0);
    s.schedule(1, Priority::Low);
    s.schedule(2, Priority::High);
    assert!(s.is_pending(Priority::Low));
    assert!(s.is_pending(Priority::High));
    assert!(!s.is_pending(Priority::Normal));
    assert_eq!(s.counters().coalesced, 0);
}

// =============================================================
// Priority and frame gate
// =============================================================

#[test]
fn highest_lane_runs_first_one_per_interval() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut s = TaskScheduler::new(60.0);
    s.schedule(log_task(&log, "low"), Priority::Low);
    s.schedule(log_task(&log, "normal"), Priority::Normal);
    s.schedule(log_task(&log, "high"), Priority::High);

    assert_eq!(s.tick(0.0), Tick::Ran(Priority::High));
    assert_eq!(s.tick(5.0), Tick::Throttled);
    assert_eq!(s.tick(17.0), Tick::Ran(Priority::Normal));
    assert_eq!(s.tick(34.0), Tick::Ran(Priority::Low));
    assert_eq!(s.tick(51.0), Tick::Idle);
    assert_eq!(*log.borrow(), vec!["high", "normal", "low"]);
}

#[test]
fn executions_are_spaced_by_min_interval() {
    let mut s = RenderScheduler::<u32>::new(60.0);
    let interval = s.min_interval_ms();
    let mut ran_at = Vec::new();
    let mut now = 0.0;
    while now < 200.0 {
        s.schedule(0, Priority::Normal);
        if let Tick::Ran(_) = s.tick_with(now, |_| Ok(())) {
            ran_at.push(now);
        }
        now += 1.0;
    }
    assert!(ran_at.len() > 1);
    for pair in ran_at.windows(2) {
        assert!(pair[1] - pair[0] >= interval);
    }
}

#[test]
fn first_tick_is_never_throttled() {
    let mut s = RenderScheduler::<u32>::new(1.0);
    s.schedule(7, Priority::Low);
    let mut seen = None;
    assert_eq!(
        s.tick_with(123_456.0, |v| {
            seen = Some(v);
            Ok(())
        }),
        Tick::Ran(Priority::Low)
    );
    assert_eq!(seen, Some(7));
}

// =============================================================
// Failures
// =============================================================

#[test]
fn error_goes_to_hook_and_scheduler_keeps_running() {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&errors);
    let mut s = TaskScheduler::new(60.0);
    s.set_error_hook(move |p, e| sink.borrow_mut().push((p, e.clone())));

    s.schedule(Box::new(|| -> Result<(), RenderError> { Err(RenderError::Surface("lost context".to_owned())) }), Priority::High);
    assert_eq!(s.tick(0.0), Tick::Failed(Priority::High));
    assert_eq!(*errors.borrow(), vec![(Priority::High, RenderError::Surface("lost context".to_owned()))]);

    let log = Rc::new(RefCell::new(Vec::new()));
    s.schedule(log_task(&log, "after"), Priority::Normal);
    assert_eq!(s.tick(20.0), Tick::Ran(Priority::Normal));
    assert_eq!(*log.borrow(), vec!["after"]);
    assert_eq!(s.counters().failed, 1);
    assert_eq!(s.counters().executed, 2);
}

#[test]
fn panic_is_caught_and_reported() {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&errors);
    let mut s = TaskScheduler::new(60.0);
    s.set_error_hook(move |_, e| sink.borrow_mut().push(e.clone()));
    s.schedule(Box::new(|| -> Result<(), RenderError> { panic!("draw exploded") }), Priority::Normal);
    assert_eq!(s.tick(0.0), Tick::Failed(Priority::Normal));
    assert_eq!(*errors.borrow(), vec![RenderError::TaskPanicked("draw exploded".to_owned())]);
    assert!(!s.has_pending());
}

#[test]
fn failure_without_hook_is_still_counted() {
    let mut s = TaskScheduler::new(60.0);
    s.schedule(Box::new(|| -> Result<(), RenderError> { Err(RenderError::Surface("x".to_owned())) }), Priority::Low);
    assert_eq!(s.tick(0.0), Tick::Failed(Priority::Low));
    assert_eq!(s.counters().failed, 1);
}

// =============================================================
// Reset / dispose
// =============================================================

#[test]
fn reset_drops_pending_and_timer() {
    let mut s = RenderScheduler::<u32>::new(60.0);
    s.schedule(1, Priority::High);
    assert_eq!(s.tick_with(100.0, |_| Ok(())), Tick::Ran(Priority::High));
    s.schedule(2, Priority::High);
    s.reset();
    assert!(!s.has_pending());
    s.schedule(3, Priority::High);
    // Timer forgotten: runs immediately even though 1ms has passed.
    assert_eq!(s.tick_with(101.0, |_| Ok(())), Tick::Ran(Priority::High));
}

#[test]
fn dispose_cancels_pending_and_refuses_new_work() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut s = TaskScheduler::new(60.0);
    s.schedule(log_task(&log, "pending"), Priority::High);
    s.dispose();
    assert!(s.is_disposed());
    assert!(!s.schedule(log_task(&log, "late"), Priority::High));
    assert_eq!(s.tick(1000.0), Tick::Disposed);
    assert!(log.borrow().is_empty());
}
