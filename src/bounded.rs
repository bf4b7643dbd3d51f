//! Trackers for tasks with a known total.
//!
//! A [`Bounded`] tracker extends the unbounded model with a maximum. From it, the tracker
//! derives fractional progress, a percentage, the remaining step count, and an ETA
//! computed from the smoothed time per unit of work.
//!
//! # Rate Estimation
//!
//! Samples are taken per *redraw*, not per call. The time since the previous sample is
//! divided by the number of steps covered since then (`delta`), so a burst of advances
//! swallowed by the throttle still yields a per-step duration. Calls that moved nothing
//! leave the average and ETA untouched, but still reset the sample timestamp.
//!
//! # Throttling
//!
//! With a `period` configured, [`advance`](Tracker::advance) only redraws when the
//! period has elapsed since the last redraw or when the tracker reaches its maximum.
//! [`goto`](Bounded::goto) always redraws.
//!
//! # Lifecycle
//!
//! ```text
//! NotStarted --start/advance/goto--> Running --index == max--> Finished
//!                                       ^                          |
//!                                       +---- goto (backtrack) ----+
//! ```

use std::time::Duration;

use tracing::{debug, trace};
use web_time::Instant;

use crate::{
    clock::{Clock, SystemClock},
    config::{DEFAULT_MAX, TrackerConfig},
    context::Context,
    error::{ConfigError, DriveError},
    ewma::MovingAverage,
    redraw::{Redraw, Silent},
    tracker::{Tracker, signed_delta},
};

/// Where a [`Bounded`] tracker is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Constructed, nothing recorded yet.
    #[default]
    NotStarted,
    /// Steps are being recorded and `index < max`.
    Running,
    /// `index == max`.
    Finished,
}

/// Public state of a [`Bounded`] tracker, as exposed to renderers.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BoundedState {
    /// Completed steps, `0..=max`.
    pub index: u64,
    /// Total steps.
    pub max: u64,
    /// Index at the last redraw.
    pub prev: u64,
    /// Steps covered by the last sample; negative after moving backward.
    pub delta: i64,
    /// Smoothed seconds per step.
    pub avg: f64,
    /// Smoothing window.
    pub avg_window: f64,
    /// Fraction complete, `0.0..=1.0`.
    pub progress: f64,
    /// Percent complete, `0.0..=100.0`.
    pub percent: f64,
    /// Steps left.
    pub remaining: u64,
    /// Estimated whole seconds to completion.
    pub eta: u64,
    /// [`eta`](Self::eta) as a duration.
    pub eta_td: Duration,
    /// Time since the tracker was created.
    pub elapsed: Duration,
}

impl BoundedState {
    /// Copies every field into `ctx` under its own name.
    pub fn merge_into(&self, ctx: &mut Context) {
        ctx.insert("index", self.index);
        ctx.insert("max", self.max);
        ctx.insert("prev", self.prev);
        ctx.insert("delta", self.delta);
        ctx.insert("avg", self.avg);
        ctx.insert("avg_window", self.avg_window);
        ctx.insert("progress", self.progress);
        ctx.insert("percent", self.percent);
        ctx.insert("remaining", self.remaining);
        ctx.insert("eta", self.eta);
        ctx.insert("eta_td", self.eta_td);
        ctx.insert("elapsed", self.elapsed);
    }
}

/// A step counter with a known total, ETA estimation and redraw throttling.
///
/// Derived values ([`percent`](Self::percent), [`eta`](Self::eta), ...) reflect the last
/// recompute: an advance held back by the throttle moves [`index`](Tracker::index) but
/// not the derived values.
pub struct Bounded<R = Silent, C = SystemClock> {
    index: u64,
    max: u64,
    prev: u64,
    delta: i64,
    avg: MovingAverage,
    configured_window: Option<f64>,
    progress: f64,
    percent: f64,
    remaining: u64,
    eta: u64,
    created: Instant,
    last_sample: Instant,
    last_blit: Option<Instant>,
    elapsed: Duration,
    period: Option<Duration>,
    backtrack: bool,
    phase: Phase,
    ctx: Context,
    driven: bool,
    clock: C,
    redraw: R,
}

/// Default smoothing window for a given total.
#[allow(clippy::cast_precision_loss)]
fn window_for(max: u64) -> f64 {
    max as f64 / 10.0
}

impl Bounded {
    /// Creates a silent tracker on the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock, Silent)
    }
}

impl<R: Redraw> Bounded<R> {
    /// Creates a tracker on the system clock that renders through `redraw`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn with_redraw(config: TrackerConfig, redraw: R) -> Result<Self, ConfigError> {
        Self::with_clock(config, SystemClock, redraw)
    }
}

impl<R: Redraw, C: Clock> Bounded<R, C> {
    /// Creates a tracker reading time from `clock` and rendering through `redraw`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn with_clock(config: TrackerConfig, clock: C, redraw: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let max = config.max.unwrap_or(DEFAULT_MAX);
        let now = clock.now();
        let mut tracker = Self {
            index: 0,
            max,
            prev: 0,
            delta: 0,
            avg: MovingAverage::new(config.avg_window.unwrap_or_else(|| window_for(max))),
            configured_window: config.avg_window,
            progress: 0.0,
            percent: 0.0,
            remaining: max,
            eta: 0,
            created: now,
            last_sample: now,
            last_blit: None,
            elapsed: Duration::ZERO,
            period: config.period,
            backtrack: config.backtrack,
            phase: Phase::NotStarted,
            ctx: config.extra,
            driven: false,
            clock,
            redraw,
        };
        tracker.settle_total();
        tracker.state().merge_into(&mut tracker.ctx);
        Ok(tracker)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Total steps.
    #[must_use]
    pub const fn max(&self) -> u64 {
        self.max
    }

    /// Fraction complete as of the last recompute.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Percent complete as of the last recompute.
    #[must_use]
    pub const fn percent(&self) -> f64 {
        self.percent
    }

    /// Steps left as of the last recompute.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Estimated whole seconds to completion.
    #[must_use]
    pub const fn eta(&self) -> u64 {
        self.eta
    }

    /// Estimated time to completion.
    #[must_use]
    pub const fn eta_duration(&self) -> Duration {
        Duration::from_secs(self.eta)
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

    /// Steps covered by the last sample.
    #[must_use]
    pub const fn delta(&self) -> i64 {
        self.delta
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` once the index has reached the maximum.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// A copy of the public state.
    #[must_use]
    pub const fn state(&self) -> BoundedState {
        BoundedState {
            index: self.index,
            max: self.max,
            prev: self.prev,
            delta: self.delta,
            avg: self.avg.value(),
            avg_window: self.avg.window(),
            progress: self.progress,
            percent: self.percent,
            remaining: self.remaining,
            eta: self.eta,
            eta_td: Duration::from_secs(self.eta),
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

    // ========================================================================
    // Repositioning
    // ========================================================================

    /// Moves the index to `target`, clamped to the maximum, and redraws.
    ///
    /// Moving backward (or nowhere) is ignored unless the tracker was configured with
    /// `backtrack`. A reposition that goes through always redraws, regardless of
    /// `period`.
    pub fn goto(&mut self, target: u64) {
        let target = target.min(self.max);
        let delta = signed_delta(target, self.index);
        if delta <= 0 && !self.backtrack {
            trace!(index = self.index, to = target, "goto ignored");
            return;
        }

        self.index = target;
        self.prev = target;
        self.delta = delta;
        self.update_phase();
        self.recompute(self.clock.now());
        self.redraw.redraw(&self.ctx);
    }

    // ========================================================================
    // Internal
    // ========================================================================

    fn update_phase(&mut self) {
        self.phase = if self.index == self.max {
            Phase::Finished
        } else {
            Phase::Running
        };
    }

    /// Re-derives progress and phase after `max` changed outside of a step.
    ///
    /// A tracker whose index already sits at its total (`max == 0`) is finished without
    /// a single step being taken.
    fn settle_total(&mut self) {
        self.update_progress();
        if self.index == self.max {
            self.phase = Phase::Finished;
        } else if self.phase == Phase::Finished {
            self.phase = Phase::Running;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn update_progress(&mut self) {
        self.progress = if self.max == 0 {
            1.0
        } else {
            (self.index as f64 / self.max as f64).min(1.0)
        };
        self.percent = self.progress * 100.0;
        self.remaining = self.max.saturating_sub(self.index);
    }

    fn redraw_due(&self, now: Instant) -> bool {
        match (self.period, self.last_blit) {
            (Some(period), Some(last)) => now.saturating_duration_since(last) > period,
            _ => true,
        }
    }

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn recompute(&mut self, now: Instant) {
        self.update_progress();

        if self.delta != 0 {
            let dt = now.saturating_duration_since(self.last_sample).as_secs_f64()
                / self.delta.unsigned_abs() as f64;
            let avg = self.avg.push(dt);
            self.eta = (avg * self.remaining as f64).ceil() as u64;
        }
        self.last_sample = now;
        self.elapsed = now.saturating_duration_since(self.created);

        self.state().merge_into(&mut self.ctx);
    }
}

impl<R: Redraw, C: Clock> Tracker for Bounded<R, C> {
    fn start(&mut self) {
        self.delta = 0;
        self.update_phase();
        self.recompute(self.clock.now());
        self.redraw.redraw(&self.ctx);
    }

    fn advance(&mut self) {
        self.index = self.index.saturating_add(1).min(self.max);
        self.update_phase();
        let finished = self.phase == Phase::Finished;

        let now = self.clock.now();
        if !finished && !self.redraw_due(now) {
            trace!(index = self.index, "redraw throttled");
            return;
        }

        self.delta = signed_delta(self.index, self.prev);
        self.prev = self.index;
        self.recompute(now);
        trace!(index = self.index, eta = self.eta, "redraw");
        self.redraw.redraw(&self.ctx);
        self.last_blit = Some(now);
    }

    fn finish(&mut self) {
        debug!(index = self.index, max = self.max, "finish");
        self.redraw.finish(&self.ctx);
    }

    fn index(&self) -> u64 {
        self.index
    }

    fn context(&self) -> &Context {
        &self.ctx
    }

    fn begin_drive(&mut self, len: Option<usize>) -> Result<(), DriveError> {
        if std::mem::replace(&mut self.driven, true) {
            return Err(DriveError::AlreadyDriven);
        }

        if let Some(len) = len {
            let max = u64::try_from(len).unwrap_or(u64::MAX);
            debug!(max, "total inferred from sequence length");
            self.max = max;
            self.avg
                .set_window(self.configured_window.unwrap_or_else(|| window_for(max)));
            self.index = self.index.min(max);
            self.prev = self.prev.min(max);
            self.settle_total();
            self.state().merge_into(&mut self.ctx);
        }
        Ok(())
    }
}
