//! # `eta_progress`
//!
//! Headless progress trackers for terminal indicators: bars, spinners and counters.
//!
//! `eta_progress` owns the *state* of a progress indicator and leaves the drawing to a
//! collaborator. It is designed to be:
//!
//! * **Headless**: Trackers compute index, percentage, smoothed rate and ETA; a
//!   [`Redraw`] implementation turns the resulting [`Context`] into output.
//! * **Smooth**: The per-step duration is an exponential moving average, so the ETA
//!   follows changes in speed without jumping around on every sample.
//! * **Quiet**: A refresh `period` throttles redraws for tight loops; reaching the end
//!   and explicit repositioning always redraw.
//!
//! ## Modules
//!
//! * [`bounded`]: [`Bounded`] trackers with a known total (progress bars).
//! * [`unbounded`]: [`Unbounded`] trackers for open-ended work (spinners, counters).
//! * [`config`]: [`TrackerConfig`], options and passthrough display entries.
//! * [`context`]: The ordered [`Context`] handed to renderers.
//! * [`iter`]: Drive a tracker from any iterator.
//! * [`redraw`]: The [`Redraw`] hook.
//! * [`term`]: A single-line terminal renderer.
//! * [`clock`]: Time sources, including a [`ManualClock`] for deterministic timing.
//!
//! Trackers are single-owner, single-threaded values: every operation takes `&mut self`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod bounded;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod ewma;
pub mod iter;
pub mod redraw;
pub mod term;
pub mod tracker;
pub mod unbounded;

pub use bounded::{Bounded, BoundedState, Phase};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TrackerConfig;
pub use context::{Context, Value};
pub use error::{ConfigError, DriveError};
pub use iter::{Drive, DriveExt};
pub use redraw::{Redraw, Silent};
pub use term::LineRedraw;
pub use tracker::Tracker;
pub use unbounded::{Unbounded, UnboundedState};
