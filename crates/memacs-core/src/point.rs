//! Point and region types.
//!
//! A [`Point`] is a line handle plus a byte offset. It does not own its line:
//! when the line is removed the handle goes stale, and the buffer's edit
//! wrappers move every point they know about before returning.
//!
//! A [`Region`] describes a span of text without copying it: an origin point,
//! a signed character count, and the number of lines it touches. A negative
//! size means the span runs backward from the origin. Each implied newline
//! between lines counts as one character.

use std::cmp::Ordering;
use std::fmt;

use crate::line::{LineId, LineStore};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A position in a buffer: line handle and byte offset.
///
/// `offset` ranges over `0..=used`. `offset == used` sits just before the
/// implied newline.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub line: LineId,
    pub offset: usize,
}

impl Point {
    /// Create a point.
    #[inline]
    #[must_use]
    pub const fn new(line: LineId, offset: usize) -> Self {
        Self { line, offset }
    }

    /// True when the line is live and the offset is within `0..=used`.
    #[must_use]
    pub fn is_valid(self, lines: &LineStore) -> bool {
        lines
            .get(self.line)
            .is_some_and(|l| self.offset <= l.used())
    }

    /// True at offset 0.
    #[inline]
    #[must_use]
    pub const fn at_line_start(self) -> bool {
        self.offset == 0
    }

    /// True at `offset == used`.
    #[must_use]
    pub fn at_line_end(self, lines: &LineStore) -> bool {
        self.offset >= lines.line_length(self.line)
    }

    /// True at the very beginning of the buffer.
    #[must_use]
    pub fn at_buffer_start(self, lines: &LineStore) -> bool {
        self.offset == 0 && self.line == lines.first()
    }

    /// True at the very end of the buffer.
    #[must_use]
    pub fn at_buffer_end(self, lines: &LineStore) -> bool {
        self.line == lines.last() && self.at_line_end(lines)
    }

    /// Compare two points by walking the line list.
    ///
    /// Returns `None` if either line is stale.
    #[must_use]
    pub fn cmp_in(self, other: Self, lines: &LineStore) -> Option<Ordering> {
        if self.line == other.line {
            return lines
                .contains(self.line)
                .then(|| self.offset.cmp(&other.offset));
        }
        for id in lines.iter() {
            if id == self.line {
                return lines.contains(other.line).then_some(Ordering::Less);
            }
            if id == other.line {
                return lines.contains(self.line).then_some(Ordering::Greater);
            }
        }
        None
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({:?}+{})", self.line, self.offset)
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A span of text described by origin, signed size and line count.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Where the span starts (size > 0) or ends (size < 0).
    pub point: Point,
    /// Character count, newlines included. Negative runs backward.
    pub size: i64,
    /// Number of lines the span touches. Zero for an empty region.
    pub line_count: usize,
}

impl Region {
    /// An empty region at `point`.
    #[inline]
    #[must_use]
    pub const fn empty(point: Point) -> Self {
        Self {
            point,
            size: 0,
            line_count: 0,
        }
    }

    /// True when the region spans nothing.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.size == 0
    }

    /// Absolute character count.
    #[inline]
    #[must_use]
    pub const fn len(self) -> u64 {
        self.size.unsigned_abs()
    }

    /// True when the span runs backward from its origin.
    #[inline]
    #[must_use]
    pub const fn is_backward(self) -> bool {
        self.size < 0
    }

    /// The region between two points, with the origin at `from` and the
    /// size signed by direction. `None` if either line is stale.
    #[must_use]
    pub fn between(from: Point, to: Point, lines: &LineStore) -> Option<Self> {
        let order = from.cmp_in(to, lines)?;
        let (start, end) = match order {
            Ordering::Equal => return Some(Self::empty(from)),
            Ordering::Less => (from, to),
            Ordering::Greater => (to, from),
        };
        let (chars, line_count) = span(start, end, lines)?;
        let size = i64::try_from(chars).ok()?;
        Some(Self {
            point: from,
            size: if order == Ordering::Less { size } else { -size },
            line_count,
        })
    }

    /// The forward-facing form: origin at the start, non-negative size.
    #[must_use]
    pub fn normalized(self, lines: &LineStore) -> Option<Self> {
        if self.size >= 0 {
            return Some(self);
        }
        let mut start = self.point;
        let mut remaining = self.len();
        while remaining > 0 {
            if start.offset == 0 {
                start.line = lines.prev(start.line)?;
                start.offset = lines.line_length(start.line);
            } else {
                start.offset -= 1;
            }
            remaining -= 1;
        }
        Some(Self {
            point: start,
            size: -self.size,
            line_count: self.line_count,
        })
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Region({:?}, size {}, {} lines)",
            self.point, self.size, self.line_count
        )
    }
}

/// Character count and touched-line count for `start <= end`.
fn span(start: Point, end: Point, lines: &LineStore) -> Option<(u64, usize)> {
    if start.line == end.line {
        return Some(((end.offset - start.offset) as u64, 1));
    }
    let mut chars = (lines.line(start.line).ok()?.used() - start.offset) as u64 + 1;
    let mut count = 1;
    let mut id = lines.next(start.line)?;
    while id != end.line {
        chars += lines.line(id).ok()?.used() as u64 + 1;
        count += 1;
        id = lines.next(id)?;
    }
    Some((chars + end.offset as u64, count + 1))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
