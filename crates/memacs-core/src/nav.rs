//! Navigation primitives — character, line and tab-stop movement.
//!
//! Every primitive works on a [`Point`] against a [`LineStore`] and reports
//! a buffer edge as [`Flow::Boundary`], never as an error. On a boundary the
//! point is left at the edge it reached:
//!
//! | Primitive      | Boundary position                          |
//! |----------------|--------------------------------------------|
//! | [`move_char`]  | start or end of buffer                     |
//! | [`move_line`]  | first line offset 0, or last line at `used`|
//!
//! The primitives never touch a window. The session compares line handles
//! before and after a move and raises the redraw flags itself.
//!
//! # Goal column
//!
//! Vertical moves land on the offset whose display column is the largest one
//! not past the goal column ([`goal_offset`]). Tabs, control characters and
//! high bytes are expanded as on screen (see [`new_col`]).

use tracing::trace;

use crate::error::Flow;
use crate::line::{LineId, LineStore};
use crate::options::Settings;
use crate::point::Point;
use crate::window::{display_col, new_col};

/// A repeat count as an iteration count.
pub(crate) fn count(n: i64) -> usize {
    usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX)
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

/// Move `point` by `n` characters, forward when positive. The implied
/// newline at the end of each line counts as one character.
pub fn move_char(lines: &LineStore, point: &mut Point, n: i64) -> Flow {
    for _ in 0..count(n) {
        if n > 0 {
            if point.offset < lines.line_length(point.line) {
                point.offset += 1;
            } else if let Some(next) = lines.next(point.line) {
                *point = Point::new(next, 0);
            } else {
                trace!("move_char: end of buffer");
                return Flow::Boundary;
            }
        } else if point.offset > 0 {
            point.offset -= 1;
        } else if let Some(prev) = lines.prev(point.line) {
            *point = Point::new(prev, lines.line_length(prev));
        } else {
            trace!("move_char: start of buffer");
            return Flow::Boundary;
        }
    }
    Flow::Done(())
}

// ---------------------------------------------------------------------------
// Lines and columns
// ---------------------------------------------------------------------------

/// Display column of `point`.
#[must_use]
pub fn line_col(lines: &LineStore, point: Point, htab: usize) -> usize {
    lines
        .get(point.line)
        .map_or(0, |l| display_col(l.text(), point.offset, htab))
}

/// The offset in `line` closest to display column `goal` without passing
/// it, or the end of the line when the line is shorter.
#[must_use]
pub fn goal_offset(lines: &LineStore, line: LineId, goal: usize, htab: usize) -> usize {
    let Some(text) = lines.get(line).map(|l| l.text()) else {
        return 0;
    };
    let mut col = 0;
    for (i, &b) in text.iter().enumerate() {
        let next = new_col(b, col, htab);
        if next > goal {
            return i;
        }
        col = next;
    }
    text.len()
}

/// Move `point` by `n` lines, landing at the goal column.
///
/// Running off either end puts point on the first line at offset 0 or on
/// the last line at its end, and returns [`Flow::Boundary`].
pub fn move_line(lines: &LineStore, point: &mut Point, n: i64, goal: usize, htab: usize) -> Flow {
    let mut line = point.line;
    for _ in 0..count(n) {
        let step = if n > 0 { lines.next(line) } else { lines.prev(line) };
        match step {
            Some(l) => line = l,
            None => {
                let offset = if n > 0 { lines.line_length(line) } else { 0 };
                *point = Point::new(line, offset);
                trace!(n, "move_line: hit buffer edge");
                return Flow::Boundary;
            }
        }
    }
    *point = Point::new(line, goal_offset(lines, line, goal, htab));
    Flow::Done(())
}

/// Offset of the first byte on the line that is not a space or tab.
#[must_use]
pub fn begin_text(lines: &LineStore, line: LineId) -> usize {
    lines.get(line).map_or(0, |l| {
        l.text()
            .iter()
            .position(|&b| b != b' ' && b != b'\t')
            .unwrap_or(l.used())
    })
}

// ---------------------------------------------------------------------------
// Tab stops
// ---------------------------------------------------------------------------

/// Offset `n` tab stops from `point` on its line.
///
/// Stops are every [`Settings::tab_size`] columns; columns are measured with
/// the hard tab size. Returns `None` when there is nothing to do: `n == 0`,
/// an empty line, or point already at the line end (forward) or start
/// (backward).
#[must_use]
pub fn tab_stop(lines: &LineStore, point: Point, n: i64, settings: &Settings) -> Option<usize> {
    let len = lines.line_length(point.line);
    if n == 0 || len == 0 || (n > 0 && point.offset >= len) || (n < 0 && point.offset == 0) {
        return None;
    }
    let size = settings.tab_size().max(1);
    let htab = settings.htab_size;
    let col = line_col(lines, point, htab);
    let stops = count(n);
    let target = if n > 0 {
        (col / size).saturating_add(stops).saturating_mul(size)
    } else {
        col.div_ceil(size).saturating_sub(stops) * size
    };
    Some(goal_offset(lines, point.line, target, htab))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store(text: &str) -> LineStore {
        LineStore::from_bytes(text.as_bytes())
    }

    fn at(lines: &LineStore, line: usize, offset: usize) -> Point {
        Point::new(lines.nth(line).unwrap(), offset)
    }

    // -- move_char ----------------------------------------------------------

    #[test]
    fn forward_crosses_implied_newline() {
        let lines = store("ab\ncd");
        let mut p = at(&lines, 0, 1);
        assert!(move_char(&lines, &mut p, 2).is_done());
        assert_eq!(p, at(&lines, 1, 0));
    }

    #[test]
    fn backward_lands_at_end_of_previous_line() {
        let lines = store("ab\ncd");
        let mut p = at(&lines, 1, 0);
        assert!(move_char(&lines, &mut p, -1).is_done());
        assert_eq!(p, at(&lines, 0, 2));
    }

    #[test]
    fn char_round_trip() {
        let lines = store("hello world\nfoo\n\nbar baz");
        let start = at(&lines, 0, 4);
        for k in 0..=15 {
            let mut p = start;
            assert!(move_char(&lines, &mut p, k).is_done());
            assert!(move_char(&lines, &mut p, -k).is_done());
            assert_eq!(p, start, "k = {k}");
        }
    }

    #[test]
    fn empty_buffer_forward_is_boundary() {
        let lines = LineStore::new();
        let mut p = Point::new(lines.first(), 0);
        assert!(move_char(&lines, &mut p, 1).is_boundary());
        assert_eq!(p, Point::new(lines.first(), 0));
    }

    #[test]
    fn boundary_keeps_progress() {
        let lines = store("abc");
        let mut p = at(&lines, 0, 1);
        assert!(move_char(&lines, &mut p, 5).is_boundary());
        assert_eq!(p.offset, 3);
        assert!(move_char(&lines, &mut p, -9).is_boundary());
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn zero_count_does_nothing() {
        let lines = store("abc");
        let mut p = at(&lines, 0, 1);
        assert!(move_char(&lines, &mut p, 0).is_done());
        assert_eq!(p.offset, 1);
    }

    // -- goal_offset --------------------------------------------------------

    #[test]
    fn goal_offset_plain_text() {
        let lines = store("abcdef");
        assert_eq!(goal_offset(&lines, lines.first(), 3, 8), 3);
        assert_eq!(goal_offset(&lines, lines.first(), 99, 8), 6);
    }

    #[test]
    fn goal_offset_stops_before_tab_that_overshoots() {
        // Tab at offset 1 spans columns 1..8.
        let lines = store("a\tb");
        assert_eq!(goal_offset(&lines, lines.first(), 4, 8), 1);
        assert_eq!(goal_offset(&lines, lines.first(), 8, 8), 2);
    }

    #[test]
    fn goal_offset_control_bytes_are_two_wide() {
        let lines = LineStore::from_bytes(b"\x01x");
        assert_eq!(goal_offset(&lines, lines.first(), 1, 8), 0);
        assert_eq!(goal_offset(&lines, lines.first(), 2, 8), 1);
    }

    // -- move_line ----------------------------------------------------------

    #[test]
    fn move_line_uses_goal_column() {
        let lines = store("abcdefgh\nab\nabcdefgh");
        let mut p = at(&lines, 0, 5);
        assert!(move_line(&lines, &mut p, 1, 5, 8).is_done());
        assert_eq!(p, at(&lines, 1, 2));
        assert!(move_line(&lines, &mut p, 1, 5, 8).is_done());
        assert_eq!(p, at(&lines, 2, 5));
    }

    #[test]
    fn move_line_tab_aware() {
        let lines = store("0123456789\n\tx");
        let mut p = at(&lines, 0, 9);
        assert!(move_line(&lines, &mut p, 1, 9, 8).is_done());
        // Tab reaches column 8, `x` column 9.
        assert_eq!(p, at(&lines, 1, 2));
    }

    #[test]
    fn bottom_boundary_is_idempotent() {
        let lines = store("one\ntwo\nthree");
        let mut p = at(&lines, 1, 1);
        for _ in 0..4 {
            assert!(move_line(&lines, &mut p, 5, 1, 8).is_boundary());
            assert_eq!(p, at(&lines, 2, 5));
        }
    }

    #[test]
    fn top_boundary_snaps_to_line_start() {
        let lines = store("one\ntwo");
        let mut p = at(&lines, 1, 2);
        assert!(move_line(&lines, &mut p, -3, 2, 8).is_boundary());
        assert_eq!(p, at(&lines, 0, 0));
    }

    // -- begin_text ---------------------------------------------------------

    #[test]
    fn begin_text_skips_blanks() {
        let lines = store(" \t x\n   ");
        assert_eq!(begin_text(&lines, lines.first()), 3);
        assert_eq!(begin_text(&lines, lines.last()), 3);
    }

    // -- tab_stop -----------------------------------------------------------

    #[test]
    fn tab_stop_forward_and_back() {
        let lines = store("abcdefghijklmnopqrstuvwxyz");
        let s = Settings { stab_size: 4, ..Settings::default() };
        assert_eq!(tab_stop(&lines, at(&lines, 0, 1), 1, &s), Some(4));
        assert_eq!(tab_stop(&lines, at(&lines, 0, 4), 2, &s), Some(12));
        assert_eq!(tab_stop(&lines, at(&lines, 0, 6), -1, &s), Some(4));
        assert_eq!(tab_stop(&lines, at(&lines, 0, 8), -1, &s), Some(4));
        assert_eq!(tab_stop(&lines, at(&lines, 0, 3), -5, &s), Some(0));
    }

    #[test]
    fn tab_stop_uses_hard_size_without_soft() {
        let lines = store("abcdefghijklmnopqrstuvwxyz");
        let s = Settings::default();
        assert_eq!(tab_stop(&lines, at(&lines, 0, 0), 1, &s), Some(8));
    }

    #[test]
    fn tab_stop_past_line_end_lands_at_end() {
        let lines = store("abc");
        let s = Settings::default();
        assert_eq!(tab_stop(&lines, at(&lines, 0, 1), 1, &s), Some(3));
    }

    #[test]
    fn tab_stop_no_op_cases() {
        let lines = store("abc\n");
        let s = Settings::default();
        assert_eq!(tab_stop(&lines, at(&lines, 0, 1), 0, &s), None);
        assert_eq!(tab_stop(&lines, at(&lines, 1, 0), 1, &s), None);
        assert_eq!(tab_stop(&lines, at(&lines, 0, 3), 1, &s), None);
        assert_eq!(tab_stop(&lines, at(&lines, 0, 0), -1, &s), None);
    }
}
