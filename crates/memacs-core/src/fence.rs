//! Fence matching — `()`, `{}`, `[]` and `<>`.
//!
//! An opening fence is matched by scanning forward, a closing fence by
//! scanning backward. The nesting level starts at 1, rises on every fence of
//! the source kind and falls on every fence of the other kind; the match is
//! where it reaches 0.
//!
//! [`other_fence`] scans to the buffer edges. [`fence_match`] is the visual
//! form used while typing: it looks only at the rows shown in the window,
//! briefly shows the match and puts point back.

use tracing::trace;

use crate::buffer::Buffer;
use crate::error::Error;
use crate::line::LineStore;
use crate::nav::move_char;
use crate::options::Settings;
use crate::point::{Point, Region};
use crate::window::{Screen, Window};

/// The partner of a fence character and whether it lies forward.
#[must_use]
pub const fn fence_pair(c: u8) -> Option<(u8, bool)> {
    match c {
        b'(' => Some((b')', true)),
        b'{' => Some((b'}', true)),
        b'[' => Some((b']', true)),
        b'<' => Some((b'>', true)),
        b')' => Some((b'(', false)),
        b'}' => Some((b'{', false)),
        b']' => Some((b'[', false)),
        b'>' => Some((b'<', false)),
        _ => None,
    }
}

/// Scan from `point` for the fence matching `source`.
///
/// `keep_going` is called with each position reached and the line it came
/// from; returning `false` stops the scan as a failure. Returns the match,
/// or `None` with `point` left wherever the scan stopped.
fn scan(
    lines: &LineStore,
    point: &mut Point,
    source: u8,
    mut keep_going: impl FnMut(Point, Point) -> bool,
) -> Result<Option<Point>, Error> {
    let (other, forward) = fence_pair(source).ok_or(Error::NotAFence(char::from(source)))?;
    let step = if forward { 1 } else { -1 };
    let mut level = 1usize;
    loop {
        let before = *point;
        if move_char(lines, point, step).is_boundary() || !keep_going(*point, before) {
            return Ok(None);
        }
        let c = lines.line_char(point.line, point.offset);
        if c == source {
            level += 1;
        } else if c == other {
            level -= 1;
            if level == 0 {
                return Ok(Some(*point));
            }
        }
    }
}

/// Find the fence matching `source`, starting from `point`.
///
/// Without `want_region`, point moves to the match and `Ok(None)` is
/// returned. With it, point is left where it was and the region covering
/// both fences comes back: from point forward for an opening fence, from
/// just past point backward for a closing one.
///
/// # Errors
///
/// [`Error::NotAFence`] if `source` is not a fence character.
/// [`Error::FenceNotFound`] (which has no message) when the buffer edge
/// comes first; point is restored.
pub fn other_fence(
    lines: &LineStore,
    point: &mut Point,
    source: u8,
    want_region: bool,
) -> Result<Option<Region>, Error> {
    let origin = *point;
    let Some(found) = scan(lines, point, source, |_, _| true)? else {
        *point = origin;
        trace!(fence = %char::from(source), "no matching fence");
        return Err(Error::FenceNotFound);
    };
    if !want_region {
        return Ok(None);
    }
    *point = origin;
    let forward = fence_pair(source).is_some_and(|(_, f)| f);
    let region = if forward {
        Region::between(origin, Point::new(found.line, found.offset + 1), lines)
    } else {
        Region::between(Point::new(origin.line, origin.offset + 1), found, lines)
    };
    region.map(Some).ok_or(Error::StaleLine)
}

/// Briefly show the fence matching `source` if it is on screen.
///
/// Scans from the window's point, but only through the rows displayed. On a
/// match the window is redrawn with point on it, the screen pauses for
/// `fencepause` centiseconds and point goes back. Returns whether a match
/// was shown; when not, the screen beeps if `beep` is set.
///
/// # Errors
///
/// [`Error::NotAFence`] for a non-fence `source`, or [`Error::Screen`] if
/// the redraw fails.
pub fn fence_match(
    buf: &Buffer,
    win: &mut Window,
    screen: &mut dyn Screen,
    settings: &Settings,
    source: u8,
    beep: bool,
) -> Result<bool, Error> {
    let lines = buf.lines();
    let origin = win.point();
    let rows = usize::from(win.rows());
    let top = win.top();
    let forward = fence_pair(source).is_some_and(|(_, f)| f);

    let mut p = origin;
    let found = match win.point_row(lines) {
        Some(mut row) => scan(lines, &mut p, source, |at, from| {
            if at.line == from.line {
                true
            } else if forward {
                row += 1;
                row < rows
            } else if from.line == top {
                false
            } else {
                row -= 1;
                true
            }
        })?,
        None => None,
    };

    let Some(at) = found else {
        if beep {
            screen.beep();
        }
        return Ok(false);
    };
    trace!(fence = %char::from(source), "showing matching fence");
    win.set_point(at);
    let shown = screen.update(buf, win, settings.htab_size);
    screen.pause(settings.fence_pause);
    win.set_point(origin);
    shown?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
