//! Iterator adapters that drive a tracker.
//!
//! [`Drive`] wraps any iterator and advances a [`Tracker`] as elements are consumed:
//! each element is handed out first, and the step it represents is counted when the
//! caller asks for the next one (that is, once the loop body for it has run). When the
//! inner iterator is exhausted the tracker is finished exactly once.
//!
//! # Length Inference
//!
//! Before iterating, the adapter checks [`Iterator::size_hint`]. If the iterator reports
//! an exact length, bounded trackers adopt it as their total, so wrapping a concrete
//! collection needs no explicit `max`.
//!
//! # Example
//!
//! ```ignore
//! use eta_progress::{Bounded, DriveExt as _, Tracker as _};
//!
//! let mut bar = Bounded::new(Default::default())?;
//! for file in files.iter().drive_with(&mut bar)? {
//!     // ...
//! }
//! assert!(bar.is_finished());
//! ```
//!
//! A tracker drives at most one sequence. Breaking out of the loop early leaves the
//! last element uncounted and the tracker unfinished.

use std::iter::FusedIterator;

use crate::{error::DriveError, tracker::Tracker};

/// An iterator adapter that advances a tracker between elements.
pub struct Drive<T, I> {
    iter: I,
    tracker: T,
    pending: bool,
    done: bool,
}

impl<T: Tracker, I: Iterator> Drive<T, I> {
    /// Creates a new `Drive`, preparing `tracker` for the iterator's length.
    ///
    /// Note: This is usually constructed via [`Tracker::drive`] or [`DriveExt`].
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::AlreadyDriven`] if `tracker` was driven before.
    pub fn new(iter: I, mut tracker: T) -> Result<Self, DriveError> {
        tracker.begin_drive(exact_len(&iter))?;
        Ok(Self {
            iter,
            tracker,
            pending: false,
            done: false,
        })
    }

    /// The tracker being driven.
    pub const fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Consumes the adapter and returns the tracker.
    pub fn into_tracker(self) -> T {
        self.tracker
    }
}

impl<T: Tracker, I: Iterator> Iterator for Drive<T, I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if std::mem::take(&mut self.pending) {
            self.tracker.advance();
        }
        if self.done {
            return None;
        }

        if let Some(item) = self.iter.next() {
            self.pending = true;
            return Some(item);
        }

        self.done = true;
        self.tracker.finish();
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        self.iter.size_hint()
    }
}

impl<T: Tracker, I: Iterator> FusedIterator for Drive<T, I> {}

/// Extension trait to drive a tracker from any Iterator.
pub trait DriveExt: Iterator + Sized {
    /// Wraps the iterator so that consuming it advances `tracker`.
    ///
    /// `tracker` may be owned or a `&mut` borrow.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::AlreadyDriven`] if `tracker` was driven before.
    fn drive_with<T: Tracker>(self, tracker: T) -> Result<Drive<T, Self>, DriveError> {
        Drive::new(self, tracker)
    }
}

impl<I: Iterator> DriveExt for I {}

/// Exact length from `size_hint`, if the iterator knows it.
fn exact_len<I: Iterator>(iter: &I) -> Option<usize> {
    match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => Some(upper),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::DriveExt as _;
    use crate::{
        bounded::Bounded,
        clock::ManualClock,
        config::TrackerConfig,
        context::Context,
        error::DriveError,
        redraw::Redraw,
        tracker::Tracker as _,
        unbounded::Unbounded,
    };

    #[derive(Default)]
    struct Events(Rc<RefCell<Vec<&'static str>>>);

    impl Redraw for Events {
        fn redraw(&mut self, _ctx: &Context) {
            self.0.borrow_mut().push("redraw");
        }

        fn finish(&mut self, _ctx: &Context) {
            self.0.borrow_mut().push("finish");
        }
    }

    /// Iterator Integration
    /// The total is inferred from the collection and every element is counted.
    #[test]
    fn test_drive_infers_total() {
        let data = [1, 2, 3, 4, 5];
        let mut bar = Bounded::new(TrackerConfig::new()).unwrap();
        assert_eq!(bar.max(), 100);

        let sum: i32 = data.iter().drive_with(&mut bar).unwrap().sum();

        assert_eq!(sum, 15);
        assert_eq!(bar.max(), 5, "Total should be inferred from the slice length");
        assert_eq!(bar.index(), 5);
        assert!(bar.is_finished());
    }

    /// Advance After Yield
    /// A step is counted only once the caller comes back for the next element.
    #[test]
    fn test_advance_happens_after_body() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut spinner =
            Unbounded::with_clock(TrackerConfig::new(), ManualClock::new(), Events(log.clone()))
                .unwrap();

        let mut drive = spinner.drive(0..2).unwrap();
        assert_eq!(drive.next(), Some(0));
        assert_eq!(drive.tracker().index(), 0);
        assert_eq!(drive.next(), Some(1));
        assert_eq!(drive.tracker().index(), 1);
        assert_eq!(drive.next(), None);
        assert_eq!(drive.next(), None);
        drop(drive);

        assert_eq!(spinner.index(), 2);
        assert_eq!(*log.borrow(), ["redraw", "redraw", "finish"]);
    }

    /// Exhaustion Is Final
    /// An inner iterator that resumes after `None` is not polled again.
    #[test]
    fn test_unfused_source_stops_at_first_none() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut spinner =
            Unbounded::with_clock(TrackerConfig::new(), ManualClock::new(), Events(log.clone()))
                .unwrap();

        let mut calls = 0;
        let flaky = std::iter::from_fn(move || {
            calls += 1;
            (calls != 2).then_some(calls)
        });

        let mut drive = spinner.drive(flaky).unwrap();
        assert_eq!(drive.next(), Some(1));
        assert_eq!(drive.next(), None);
        assert_eq!(drive.next(), None);
        assert_eq!(drive.next(), None);
        drop(drive);

        assert_eq!(spinner.index(), 1);
        assert_eq!(*log.borrow(), ["redraw", "finish"]);
    }

    #[test]
    fn test_unknown_length_keeps_configured_max() {
        let mut bar = Bounded::new(TrackerConfig::new().max(3)).unwrap();
        let evens = (0..10).filter(|n| n % 2 == 0);

        let count = evens.drive_with(&mut bar).unwrap().count();

        assert_eq!(count, 5);
        assert_eq!(bar.max(), 3);
        assert_eq!(bar.index(), 3, "Index is clamped at the configured max");
    }

    /// One-Shot Guard
    /// Re-driving the same tracker is rejected.
    #[test]
    fn test_second_drive_is_rejected() {
        let mut bar = Bounded::new(TrackerConfig::new()).unwrap();
        for _ in bar.drive(0..3).unwrap() {}

        assert!(matches!(bar.drive(0..3), Err(DriveError::AlreadyDriven)));
        assert_eq!(bar.index(), 3);
    }

    #[test]
    fn test_owned_tracker_round_trip() {
        let spinner = Unbounded::new(TrackerConfig::new()).unwrap();
        let mut drive = (0..4).drive_with(spinner).unwrap();
        for _ in drive.by_ref() {}

        assert_eq!(drive.into_tracker().index(), 4);
    }
}
