//! The redraw hook trackers call after recomputing their state.
//!
//! Trackers are headless: they decide *when* output should change, a [`Redraw`]
//! implementation decides *what* it looks like. Closures taking a [`Context`] work
//! out of the box, [`Silent`] discards every redraw, and
//! [`LineRedraw`](crate::term::LineRedraw) writes a single terminal line.

use crate::context::Context;

/// A rendering collaborator.
pub trait Redraw {
    /// Renders the current state.
    fn redraw(&mut self, ctx: &Context);

    /// Called once when the tracked task ends. Does nothing by default.
    fn finish(&mut self, ctx: &Context) {
        let _ = ctx;
    }
}

/// A redraw hook that renders nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl Redraw for Silent {
    fn redraw(&mut self, _ctx: &Context) {}
}

impl<F: FnMut(&Context)> Redraw for F {
    fn redraw(&mut self, ctx: &Context) {
        self(ctx);
    }
}
