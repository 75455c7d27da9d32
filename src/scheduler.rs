//! Frame-rate-limited, priority-aware render scheduler.
//!
//! Pointer-move fires far more often than the display refreshes. The
//! scheduler keeps at most one pending task per priority lane, replacing it on
//! every new request, and runs at most one task per frame interval: the one in
//! the highest non-empty lane. Lower lanes wait for a later tick.
//!
//! The scheduler never calls a clock. Hosts pass `now_ms` (for example
//! `performance.now()` from a `requestAnimationFrame` callback) to
//! [`RenderScheduler::tick_with`].

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::consts::DEFAULT_FPS;
use crate::surface::RenderError;

/// Request priority. Higher lanes run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl Priority {
    /// Lanes from highest to lowest.
    pub const DESCENDING: [Priority; 3] = [Priority::High, Priority::Normal, Priority::Low];

    fn lane(self) -> usize {
        match self {
            Self::High => 0,
            Self::Normal => 1,
            Self::Low => 2,
        }
    }
}

/// A boxed render closure for [`TaskScheduler`].
pub type Task = Box<dyn FnOnce() -> Result<(), RenderError>>;

/// Scheduler whose payloads are closures.
pub type TaskScheduler = RenderScheduler<Task>;

/// Callback receiving every task failure caught at the scheduler boundary.
pub type ErrorHook = Box<dyn FnMut(Priority, &RenderError)>;

/// What a call to `tick` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing was pending.
    Idle,
    /// Work is pending but the frame interval has not elapsed.
    Throttled,
    /// The task from this lane ran successfully.
    Ran(Priority),
    /// The task from this lane failed; the error went to the hook.
    Failed(Priority),
    /// The scheduler was disposed.
    Disposed,
}

/// Running counters, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerCounters {
    /// Tasks executed (successfully or not).
    pub executed: u64,
    /// Pending tasks replaced by a newer request in the same lane.
    pub coalesced: u64,
    /// Tasks that returned an error or panicked.
    pub failed: u64,
}

/// Coalescing scheduler over task payloads of type `T`.
pub struct RenderScheduler<T> {
    lanes: [Option<T>; 3],
    min_interval_ms: f64,
    last_run_ms: Option<f64>,
    disposed: bool,
    on_error: Option<ErrorHook>,
    counters: SchedulerCounters,
}

impl<T> RenderScheduler<T> {
    /// Create a scheduler that runs at most `fps` tasks per second.
    ///
    /// Non-positive or non-finite rates fall back to [`DEFAULT_FPS`].
    #[must_use]
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { DEFAULT_FPS };
        Self {
            lanes: [None, None, None],
            min_interval_ms: 1000.0 / fps,
            last_run_ms: None,
            disposed: false,
            on_error: None,
            counters: SchedulerCounters::default(),
        }
    }

    /// Install the hook that receives task failures.
    pub fn set_error_hook(&mut self, hook: impl FnMut(Priority, &RenderError) + 'static) {
        self.on_error = Some(Box::new(hook));
    }

    /// Store `task` as the pending task of its lane, replacing any older one.
    ///
    /// Returns `false` (and drops the task) once the scheduler is disposed.
    pub fn schedule(&mut self, task: T, priority: Priority) -> bool {
        if self.disposed {
            return false;
        }
        if self.lanes[priority.lane()].replace(task).is_some() {
            self.counters.coalesced += 1;
            tracing::debug!(?priority, "coalesced pending render");
        }
        true
    }

    /// Whether the lane has a pending task.
    #[must_use]
    pub fn is_pending(&self, priority: Priority) -> bool {
        self.lanes[priority.lane()].is_some()
    }

    /// Whether any lane has a pending task.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.lanes.iter().any(Option::is_some)
    }

    /// Minimum interval between executions, in milliseconds.
    #[must_use]
    pub fn min_interval_ms(&self) -> f64 {
        self.min_interval_ms
    }

    #[must_use]
    pub fn counters(&self) -> SchedulerCounters {
        self.counters
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Drop every pending task and forget the last execution time.
    pub fn reset(&mut self) {
        self.lanes = [None, None, None];
        self.last_run_ms = None;
    }

    /// Reset and refuse all future work. Used on unmount.
    pub fn dispose(&mut self) {
        self.reset();
        self.disposed = true;
    }

    /// Run the highest-priority pending task through `run` if the frame gate allows.
    ///
    /// The lane is cleared and the timer advanced before `run` is called, so an
    /// error or panic inside it leaves the scheduler consistent.
    pub fn tick_with<F>(&mut self, now_ms: f64, run: F) -> Tick
    where
        F: FnOnce(T) -> Result<(), RenderError>,
    {
        if self.disposed {
            return Tick::Disposed;
        }
        let Some(priority) = Priority::DESCENDING
            .into_iter()
            .find(|p| self.lanes[p.lane()].is_some())
        else {
            return Tick::Idle;
        };
        if let Some(last) = self.last_run_ms {
            if now_ms - last < self.min_interval_ms {
                return Tick::Throttled;
            }
        }
        let Some(task) = self.lanes[priority.lane()].take() else {
            return Tick::Idle;
        };
        self.last_run_ms = Some(now_ms);
        self.counters.executed += 1;

        let result = match catch_unwind(AssertUnwindSafe(|| run(task))) {
            Ok(result) => result,
            Err(payload) => Err(RenderError::TaskPanicked(panic_message(payload.as_ref()))),
        };
        match result {
            Ok(()) => Tick::Ran(priority),
            Err(e) => {
                self.counters.failed += 1;
                tracing::error!(error = %e, ?priority, "scheduled render failed");
                if let Some(hook) = self.on_error.as_mut() {
                    hook(priority, &e);
                }
                Tick::Failed(priority)
            }
        }
    }
}

impl RenderScheduler<Task> {
    /// Run the highest-priority pending closure if the frame gate allows.
    pub fn tick(&mut self, now_ms: f64) -> Tick {
        self.tick_with(now_ms, |task| task())
    }
}

impl<T> Default for RenderScheduler<T> {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
