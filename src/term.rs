//! Single-line terminal output.
//!
//! [`LineRedraw`] is a [`Redraw`] collaborator that renders a text template against the
//! tracker's [`Context`] and rewrites one terminal line in place:
//!
//! * `\r` returns to the start of the line,
//! * the rendered text is written,
//! * `ESC[K` clears whatever the previous, longer line left behind.
//!
//! On [`finish`](Redraw::finish) a newline releases the line to the rest of the program.
//!
//! # Templates
//!
//! `{key}` interpolates a context entry, `{key:.N}` formats a numeric entry with `N`
//! decimal places, and `{{` / `}}` produce literal braces. Missing keys render as empty
//! text.
//!
//! ```ignore
//! use eta_progress::{Bounded, LineRedraw, TrackerConfig};
//!
//! let line = LineRedraw::stderr("{message} {index}/{max} {percent:.1}% eta {eta_td}");
//! let bar = Bounded::with_redraw(TrackerConfig::new().with("message", "Fetching"), line)?;
//! ```

use std::{
    fmt::Write as _,
    io::{self, Stderr, Write},
};

use compact_str::CompactString;
use tracing::warn;

use crate::{context::Context, redraw::Redraw};

const CLEAR_TO_EOL: &str = "\x1b[K";

/// A [`Redraw`] implementation that rewrites a single terminal line.
pub struct LineRedraw<W = Stderr> {
    out: W,
    template: CompactString,
    finished: bool,
}

impl LineRedraw {
    /// Creates a line renderer writing to standard error.
    #[must_use]
    pub fn stderr(template: impl Into<CompactString>) -> Self {
        Self::new(io::stderr(), template)
    }
}

impl<W> LineRedraw<W> {
    /// Creates a line renderer writing to `out`.
    pub fn new(out: W, template: impl Into<CompactString>) -> Self {
        Self {
            out,
            template: template.into(),
            finished: false,
        }
    }

    /// The template lines are rendered from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Consumes the renderer and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> LineRedraw<W> {
    fn draw(&mut self, ctx: &Context) -> io::Result<()> {
        let line = render(&self.template, ctx);
        write!(self.out, "\r{line}{CLEAR_TO_EOL}")?;
        self.out.flush()
    }
}

impl<W: Write> Redraw for LineRedraw<W> {
    fn redraw(&mut self, ctx: &Context) {
        if let Err(err) = self.draw(ctx) {
            warn!(%err, "failed to draw progress line");
        }
    }

    fn finish(&mut self, _ctx: &Context) {
        if std::mem::replace(&mut self.finished, true) {
            return;
        }
        if let Err(err) = self.out.write_all(b"\n").and_then(|()| self.out.flush()) {
            warn!(%err, "failed to release progress line");
        }
    }
}

/// Renders `template` against `ctx`.
#[must_use]
pub fn render(template: &str, ctx: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            continue;
        }

        let Some(end) = tail.find('}') else {
            // Unterminated placeholder, emit verbatim.
            out.push_str(tail);
            return out;
        };
        interpolate(&mut out, &tail[1..end], ctx);
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    out
}

fn interpolate(out: &mut String, spec: &str, ctx: &Context) {
    let (key, precision) = match spec.split_once(":.") {
        Some((key, digits)) => (key, digits.parse::<usize>().ok()),
        None => (spec, None),
    };
    let Some(value) = ctx.get(key.trim()) else {
        return;
    };

    // Writing into a String cannot fail.
    let _ = match (precision, value.as_f64()) {
        (Some(p), Some(v)) => write!(out, "{v:.p$}"),
        _ => write!(out, "{value}"),
    };
}
