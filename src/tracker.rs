//! Operations shared by every tracker.

use crate::{
    context::Context,
    error::DriveError,
    iter::Drive,
};

/// The lifecycle both [`Unbounded`](crate::Unbounded) and [`Bounded`](crate::Bounded)
/// trackers follow: `start`, any number of `advance`s, then `finish`.
///
/// Trackers are single-owner values; every mutating operation takes `&mut self`, so a
/// tracker is driven by exactly one loop at a time.
pub trait Tracker {
    /// Establishes the baseline before any step is taken.
    fn start(&mut self);

    /// Records one completed step.
    fn advance(&mut self);

    /// Ends the task, letting the redraw collaborator flush its final output.
    fn finish(&mut self);

    /// Number of completed steps.
    fn index(&self) -> u64;

    /// Display context as of the last recompute.
    fn context(&self) -> &Context;

    /// Prepares the tracker to be driven by a sequence of `len` elements (`None` when
    /// the length is unknown).
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::AlreadyDriven`] if the tracker was driven before.
    fn begin_drive(&mut self, len: Option<usize>) -> Result<(), DriveError>;

    /// Wraps `iter` so that each element consumed advances this tracker.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::AlreadyDriven`] if the tracker was driven before.
    fn drive<I: IntoIterator>(&mut self, iter: I) -> Result<Drive<&mut Self, I::IntoIter>, DriveError>
    where
        Self: Sized,
    {
        Drive::new(iter.into_iter(), self)
    }
}

impl<T: Tracker + ?Sized> Tracker for &mut T {
    fn start(&mut self) {
        (**self).start();
    }

    fn advance(&mut self) {
        (**self).advance();
    }

    fn finish(&mut self) {
        (**self).finish();
    }

    fn index(&self) -> u64 {
        (**self).index()
    }

    fn context(&self) -> &Context {
        (**self).context()
    }

    fn begin_drive(&mut self, len: Option<usize>) -> Result<(), DriveError> {
        (**self).begin_drive(len)
    }
}

/// Signed distance `to - from`, saturating at the `i64` range.
pub(crate) fn signed_delta(to: u64, from: u64) -> i64 {
    if to >= from {
        i64::try_from(to - from).unwrap_or(i64::MAX)
    } else {
        i64::try_from(from - to).map_or(i64::MIN, |d| -d)
    }
}

#[cfg(test)]
mod tests {
    use super::signed_delta;

    #[test]
    fn test_signed_delta() {
        assert_eq!(signed_delta(7, 3), 4);
        assert_eq!(signed_delta(3, 7), -4);
        assert_eq!(signed_delta(5, 5), 0);
        assert_eq!(signed_delta(u64::MAX, 0), i64::MAX);
        assert_eq!(signed_delta(0, u64::MAX), i64::MIN);
    }
}
