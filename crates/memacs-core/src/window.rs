//! Window — a view of a buffer, and the seam to the screen.
//!
//! A [`Window`] holds a [`Face`] (top line, point, first displayed column),
//! its size in rows and columns, and the dirty flags that navigation sets to
//! ask the render layer for a redraw. Navigation never draws. The one
//! exception is fence display, which asks the [`Screen`] collaborator to
//! update and pause.
//!
//! # Redraw flags
//!
//! | Flag      | Meaning                                         |
//! |-----------|-------------------------------------------------|
//! | `MOVE`    | point moved to a different line                 |
//! | `HARD`    | window contents need a full repaint             |
//! | `REFRAME` | choose a new top line (see [`Window::frame`])   |
//! | `MODE`    | mode line changed                               |
//!
//! # Columns
//!
//! Display columns follow the terminal rendering of raw bytes: a tab runs to
//! the next hard tab stop, a control byte shows as `^X` (two columns), a
//! byte above 0x7F shows as `<XX>` (four columns), anything else is one
//! column.

use std::io;

use bitflags::bitflags;
use tracing::trace;

use crate::buffer::Buffer;
use crate::line::{LineId, LineStore};
use crate::point::Point;

bitflags! {
    /// Redraw requests, from cheapest to most expensive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct WindowFlags: u8 {
        const MOVE    = 0b0001;
        const HARD    = 0b0010;
        const REFRAME = 0b0100;
        const MODE    = 0b1000;
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// Column after displaying `byte` at column `col`.
#[inline]
#[must_use]
pub const fn new_col(byte: u8, col: usize, htab: usize) -> usize {
    match byte {
        b'\t' => {
            let tab = if htab == 0 { 1 } else { htab };
            (col / tab + 1) * tab
        }
        0..=0x1F | 0x7F => col + 2,
        0x80..=0xFF => col + 4,
        _ => col + 1,
    }
}

/// Display column of `offset` within `text`.
#[must_use]
pub fn display_col(text: &[u8], offset: usize, htab: usize) -> usize {
    text.iter()
        .take(offset)
        .fold(0, |col, &b| new_col(b, col, htab))
}

// ---------------------------------------------------------------------------
// Face
// ---------------------------------------------------------------------------

/// The visible state of one window onto one buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// First line shown.
    pub top: LineId,
    /// This window's point.
    pub point: Point,
    /// First displayed column (horizontal scroll).
    pub first_col: usize,
}

impl Face {
    /// A face at the top of a buffer.
    #[must_use]
    pub const fn at_start(lines: &LineStore) -> Self {
        let first = lines.first();
        Self {
            top: first,
            point: Point::new(first, 0),
            first_col: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// A window onto a buffer.
#[derive(Debug, Clone)]
pub struct Window {
    face: Face,
    rows: u16,
    cols: u16,
    flags: WindowFlags,
    /// Row to put point on at the next reframe. `None` centres it.
    reframe_row: Option<usize>,
}

impl Window {
    /// A window of `rows` text rows and `cols` columns showing the top of the
    /// buffer.
    #[must_use]
    pub fn new(lines: &LineStore, rows: u16, cols: u16) -> Self {
        Self {
            face: Face::at_start(lines),
            rows: rows.max(1),
            cols: cols.max(1),
            flags: WindowFlags::HARD,
            reframe_row: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// The window's point.
    #[inline]
    #[must_use]
    pub const fn point(&self) -> Point {
        self.face.point
    }

    /// The full face.
    #[inline]
    #[must_use]
    pub const fn face(&self) -> &Face {
        &self.face
    }

    /// Mutable face access for handle repair.
    #[inline]
    pub const fn face_mut(&mut self) -> &mut Face {
        &mut self.face
    }

    /// First line displayed.
    #[inline]
    #[must_use]
    pub const fn top(&self) -> LineId {
        self.face.top
    }

    /// Text rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    /// Columns.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> u16 {
        self.cols
    }

    /// Pending redraw flags.
    #[inline]
    #[must_use]
    pub const fn flags(&self) -> WindowFlags {
        self.flags
    }

    /// Pending reframe row, if a reframe was requested with one.
    #[inline]
    #[must_use]
    pub const fn reframe_row(&self) -> Option<usize> {
        self.reframe_row
    }

    // -- Mutation -----------------------------------------------------------

    /// Move point. Flags `MOVE` when the line changes.
    pub fn set_point(&mut self, point: Point) {
        if point.line != self.face.point.line {
            self.flags |= WindowFlags::MOVE;
        }
        self.face.point = point;
    }

    /// Set the top line and request a repaint.
    pub fn set_top(&mut self, top: LineId) {
        if top != self.face.top {
            self.face.top = top;
            self.flags |= WindowFlags::HARD;
        }
    }

    /// Replace the whole face (reattaching a buffer).
    pub fn set_face(&mut self, face: Face) {
        self.face = face;
        self.flags |= WindowFlags::HARD | WindowFlags::MODE;
    }

    /// Resize, as reported by the screen.
    pub fn resize(&mut self, rows: u16, cols: u16) {
        self.rows = rows.max(1);
        self.cols = cols.max(1);
        self.flags |= WindowFlags::HARD;
    }

    /// Add redraw flags.
    pub fn add_flags(&mut self, flags: WindowFlags) {
        self.flags |= flags;
    }

    /// Take and clear the redraw flags. Called by the render layer.
    pub fn take_flags(&mut self) -> WindowFlags {
        std::mem::take(&mut self.flags)
    }

    /// Ask for a reframe that puts point on `row` (`None` centres it).
    pub fn reframe(&mut self, row: Option<usize>) {
        self.reframe_row = row;
        self.flags |= WindowFlags::REFRAME;
    }

    // -- Geometry -----------------------------------------------------------

    /// Row of `line` in the window, or `None` if it is not displayed.
    #[must_use]
    pub fn row_of(&self, lines: &LineStore, line: LineId) -> Option<usize> {
        let mut id = self.face.top;
        for row in 0..usize::from(self.rows) {
            if id == line {
                return Some(row);
            }
            id = lines.next(id)?;
        }
        None
    }

    /// Row of point, or `None` if point is off screen.
    #[must_use]
    pub fn point_row(&self, lines: &LineStore) -> Option<usize> {
        self.row_of(lines, self.face.point.line)
    }

    /// True when `line` is on screen.
    #[must_use]
    pub fn is_visible(&self, lines: &LineStore, line: LineId) -> bool {
        self.row_of(lines, line).is_some()
    }

    /// Settle the top line and horizontal scroll before a redraw.
    ///
    /// A pending reframe puts point on the requested row (clamped to the
    /// window, centred when no row was given). Otherwise the window scrolls
    /// only as far as needed to show point. The first displayed column
    /// follows point the same way.
    pub fn frame(&mut self, lines: &LineStore, htab: usize) {
        let rows = usize::from(self.rows);
        let point_line = self.face.point.line;

        if self.flags.contains(WindowFlags::REFRAME) || !lines.contains(self.face.top) {
            let row = self.reframe_row.take().unwrap_or(rows / 2).min(rows - 1);
            self.set_top(walk_up(lines, point_line, row));
            self.flags.remove(WindowFlags::REFRAME);
            trace!(row, "window reframed");
        } else if self.point_row(lines).is_none() {
            // Point left the window: scroll minimally.
            let above = lines
                .iter()
                .take_while(|&id| id != self.face.top)
                .any(|id| id == point_line);
            let top = if above {
                point_line
            } else {
                walk_up(lines, point_line, rows - 1)
            };
            self.set_top(top);
        }

        let text = lines.get(point_line).map_or(&[][..], |l| l.text());
        let col = display_col(text, self.face.point.offset, htab);
        let width = usize::from(self.cols);
        if col < self.face.first_col {
            self.face.first_col = col;
            self.flags |= WindowFlags::HARD;
        } else if col >= self.face.first_col + width {
            self.face.first_col = col + 1 - width;
            self.flags |= WindowFlags::HARD;
        }
    }
}

/// The line `n` lines above `line`, stopping at the first line.
fn walk_up(lines: &LineStore, line: LineId, n: usize) -> LineId {
    let mut id = line;
    for _ in 0..n {
        match lines.prev(id) {
            Some(p) => id = p,
            None => break,
        }
    }
    id
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// The terminal side of the editor, as navigation sees it.
pub trait Screen {
    /// Terminal size as `(rows, cols)`.
    fn size(&self) -> (u16, u16);

    /// Redraw `win` showing `buf` now, expanding hard tabs to `htab`
    /// columns.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the terminal.
    fn update(&mut self, buf: &Buffer, win: &Window, htab: usize) -> io::Result<()>;

    /// Block for `centis` hundredths of a second, or until a key arrives.
    fn pause(&mut self, centis: u32);

    /// Ring the bell.
    fn beep(&mut self);
}

/// A screen that displays nothing. For scripts and headless use.
#[derive(Debug, Clone, Copy)]
pub struct NullScreen {
    pub rows: u16,
    pub cols: u16,
}

impl Default for NullScreen {
    fn default() -> Self {
        Self { rows: 24, cols: 80 }
    }
}

impl Screen for NullScreen {
    fn size(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    fn update(&mut self, _buf: &Buffer, _win: &Window, _htab: usize) -> io::Result<()> {
        Ok(())
    }

    fn pause(&mut self, _centis: u32) {}

    fn beep(&mut self) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
