//! Trackers for tasks of unknown length.
//!
//! An [`Unbounded`] tracker counts completed steps and keeps an exponential moving
//! average of the time between them. It has no notion of completion, which makes it the
//! model behind spinners and plain counters. Every advance redraws; there is no
//! throttling at this level.

use std::time::Duration;

use tracing::{debug, trace};
use web_time::Instant;

use crate::{
    clock::{Clock, SystemClock},
    config::{DEFAULT_AVG_WINDOW, TrackerConfig},
    context::Context,
    error::{ConfigError, DriveError},
    ewma::MovingAverage,
    redraw::{Redraw, Silent},
    tracker::Tracker,
};

/// Public state of an [`Unbounded`] tracker, as exposed to renderers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UnboundedState {
    /// Completed steps.
    pub index: u64,
    /// Index at the last redraw.
    pub prev: u64,
    /// Smoothed seconds per step.
    pub avg: f64,
    /// Smoothing window.
    pub avg_window: f64,
    /// Time since the tracker was created.
    pub elapsed: Duration,
}

impl UnboundedState {
    /// Copies every field into `ctx` under its own name.
    pub fn merge_into(&self, ctx: &mut Context) {
        ctx.insert("index", self.index);
        ctx.insert("prev", self.prev);
        ctx.insert("avg", self.avg);
        ctx.insert("avg_window", self.avg_window);
        ctx.insert("elapsed", self.elapsed);
    }
}

/// A step counter with a smoothed per-step duration.
///
/// Options that only make sense with a known total (`max`, `period`, `backtrack`) do not
/// affect the count; when set they are kept in the context as display entries.
pub struct Unbounded<R = Silent, C = SystemClock> {
    index: u64,
    prev: u64,
    avg: MovingAverage,
    created: Instant,
    last_sample: Instant,
    elapsed: Duration,
    ctx: Context,
    driven: bool,
    clock: C,
    redraw: R,
}

impl Unbounded {
    /// Creates a silent tracker on the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock, Silent)
    }
}

impl<R: Redraw> Unbounded<R> {
    /// Creates a tracker on the system clock that renders through `redraw`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn with_redraw(config: TrackerConfig, redraw: R) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock, redraw)
    }
}

impl<R: Redraw, C: Clock> Unbounded<R, C> {
    /// Creates a tracker reading time from `clock` and rendering through `redraw`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn with_clock(config: TrackerConfig, clock: C, redraw: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut ctx = config.extra;
        if let Some(max) = config.max {
            ctx.insert("max", max);
        }
        if let Some(period) = config.period {
            ctx.insert("period", period);
        }
        if config.backtrack {
            ctx.insert("backtrack", true);
        }

        let now = clock.now();
        let mut tracker = Self {
            index: 0,
            prev: 0,
            avg: MovingAverage::new(config.avg_window.unwrap_or(DEFAULT_AVG_WINDOW)),
            created: now,
            last_sample: now,
            elapsed: Duration::ZERO,
            ctx,
            driven: false,
            clock,
            redraw,
        };
        tracker.state().merge_into(&mut tracker.ctx);
        Ok(tracker)
    }

    /// Smoothed seconds per step, `0.0` before the first sample.
    #[must_use]
    pub const fn avg(&self) -> f64 {
        self.avg.value()
    }

    /// Time since creation, as of the last recompute.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// A copy of the public state.
    #[must_use]
    pub const fn state(&self) -> UnboundedState {
        UnboundedState {
            index: self.index,
            prev: self.prev,
            avg: self.avg.value(),
            avg_window: self.avg.window(),
            elapsed: self.elapsed,
        }
    }

    /// The redraw collaborator.
    pub const fn redraw_hook(&self) -> &R {
        &self.redraw
    }

    /// Consumes the tracker and returns its redraw collaborator.
    pub fn into_redraw(self) -> R {
        self.redraw
    }

    fn recompute(&mut self) {
        let now = self.clock.now();
        let dt = now.saturating_duration_since(self.last_sample);
        self.avg.push(dt.as_secs_f64());
        self.last_sample = now;
        self.elapsed = now.saturating_duration_since(self.created);

        self.state().merge_into(&mut self.ctx);
    }
}

impl<R: Redraw, C: Clock> Tracker for Unbounded<R, C> {
    fn start(&mut self) {}

    fn advance(&mut self) {
        self.index = self.index.saturating_add(1);
        self.prev = self.index;
        self.recompute();
        trace!(index = self.index, avg = self.avg.value(), "redraw");
        self.redraw.redraw(&self.ctx);
    }

    fn finish(&mut self) {
        debug!(index = self.index, "finish");
        self.redraw.finish(&self.ctx);
    }

    fn index(&self) -> u64 {
        self.index
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn begin_drive(&mut self, _len: Option<usize>) -> Result<(), DriveError> {
        if std::mem::replace(&mut self.driven, true) {
            return Err(DriveError::AlreadyDriven);
        }
        Ok(())
    }
}
