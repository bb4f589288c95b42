//! Text buffer — lines, marks and the saved home face.
//!
//! A `Buffer` owns its [`LineStore`] and its [`MarkRegistry`]. Windows hold
//! only handles into the buffer's lines, through their [`Face`].
//!
//! # Handle repair
//!
//! Structural edits (split, join, delete of lines) go through the buffer so
//! that every point the buffer knows about is moved off a line before that
//! line disappears: all marks, the home face, and any window faces the caller
//! passes in. Navigation relies on this and never checks for it.
//!
//! | Edit            | Points on the affected line move to            |
//! |-----------------|------------------------------------------------|
//! | split at `k`    | new line, `offset - k`, when `offset > k`      |
//! | join with next  | joined line, old length + offset               |
//! | delete line     | start of next line, or end of previous line    |

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Error;
use crate::line::{LineId, LineStore};
use crate::mark::MarkRegistry;
use crate::point::{Point, Region};
use crate::window::Face;

/// A text buffer.
pub struct Buffer {
    name: String,
    lines: LineStore,
    marks: MarkRegistry,
    path: Option<PathBuf>,
    /// Face saved when the buffer was last detached from a window.
    home: Option<Face>,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// Create an empty buffer: one empty line.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::from_store(name, LineStore::new())
    }

    /// Create a buffer from text.
    #[must_use]
    pub fn from_text(name: &str, text: &str) -> Self {
        Self::from_store(name, LineStore::from_bytes(text.as_bytes()))
    }

    /// Create a buffer from raw bytes.
    #[must_use]
    pub fn from_bytes(name: &str, text: &[u8]) -> Self {
        Self::from_store(name, LineStore::from_bytes(text))
    }

    /// Load a buffer from a file. The buffer is named after the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let mut buf = Self::from_bytes(&name, &bytes);
        buf.path = Some(path.to_path_buf());
        debug!(path = %path.display(), lines = buf.lines.len(), "buffer loaded");
        Ok(buf)
    }

    fn from_store(name: &str, lines: LineStore) -> Self {
        Self {
            name: name.to_string(),
            lines,
            marks: MarkRegistry::new(),
            path: None,
            home: None,
        }
    }

    // -- Access -------------------------------------------------------------

    /// The buffer name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The file this buffer was read from, if any.
    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The line list.
    #[inline]
    #[must_use]
    pub const fn lines(&self) -> &LineStore {
        &self.lines
    }

    /// The mark registry.
    #[inline]
    #[must_use]
    pub const fn marks(&self) -> &MarkRegistry {
        &self.marks
    }

    /// Mutable mark registry.
    #[inline]
    pub const fn marks_mut(&mut self) -> &mut MarkRegistry {
        &mut self.marks
    }

    /// Number of lines.
    #[inline]
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// True when the buffer holds a single empty line.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines.line_length(self.lines.first()) == 0
    }

    /// All text, lines joined with `\n`.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lines.to_bytes()).into_owned()
    }

    /// Point at the start of the buffer.
    #[must_use]
    pub const fn start(&self) -> Point {
        Point::new(self.lines.first(), 0)
    }

    /// Point at the end of the buffer.
    #[must_use]
    pub fn end(&self) -> Point {
        let last = self.lines.last();
        Point::new(last, self.lines.line_length(last))
    }

    /// Point at 0-based line `n`, offset 0.
    #[must_use]
    pub fn point_at_line(&self, n: usize) -> Option<Point> {
        self.lines.nth(n).map(|l| Point::new(l, 0))
    }

    /// The text covered by a region.
    #[must_use]
    pub fn region_text(&self, region: Region) -> Option<Vec<u8>> {
        let region = region.normalized(&self.lines)?;
        let mut out = Vec::new();
        let mut at = region.point;
        let mut remaining = region.len();
        while remaining > 0 {
            let line = self.lines.get(at.line)?;
            if at.offset < line.used() {
                out.push(line.char_at(at.offset));
                at.offset += 1;
            } else {
                out.push(b'\n');
                at = Point::new(line.next()?, 0);
            }
            remaining -= 1;
        }
        Some(out)
    }

    // -- Home face ----------------------------------------------------------

    /// Remember a window's face when the buffer is detached from it.
    pub fn save_face(&mut self, face: Face) {
        self.home = Some(face);
    }

    /// The face saved by [`save_face`](Self::save_face), if its lines are
    /// still live.
    #[must_use]
    pub fn home_face(&self) -> Option<Face> {
        self.home.filter(|f| {
            self.lines.contains(f.top) && f.point.is_valid(&self.lines)
        })
    }

    // -- Structural edits ---------------------------------------------------

    /// Break the line at `at`. Returns the start of the new line.
    ///
    /// # Errors
    ///
    /// [`Error::StaleLine`] if `at` is not in this buffer.
    pub fn split_line(&mut self, at: Point, faces: &mut [&mut Face]) -> Result<Point, Error> {
        let new = self.lines.split(at.line, at.offset)?;
        let split = at.offset.min(self.lines.line_length(at.line));
        self.repair(faces, |p| {
            if p.line == at.line && p.offset > split {
                *p = Point::new(new, p.offset - split);
            }
        });
        Ok(Point::new(new, 0))
    }

    /// Join `line` with the line after it. Returns the join position, or
    /// `None` when `line` is the last line.
    ///
    /// # Errors
    ///
    /// [`Error::StaleLine`] if `line` is not in this buffer.
    pub fn join_line(&mut self, line: LineId, faces: &mut [&mut Face]) -> Result<Option<Point>, Error> {
        let len = self.lines.line(line)?.used();
        let Some(removed) = self.lines.join(line)? else {
            return Ok(None);
        };
        self.retarget_tops(faces, removed, line);
        self.repair(faces, |p| {
            if p.line == removed {
                *p = Point::new(line, len + p.offset);
            }
        });
        Ok(Some(Point::new(line, len)))
    }

    /// Delete a whole line. Points on it move to the start of the next line,
    /// or the end of the previous one when it was last. A buffer never loses
    /// its final line: deleting it clears its text instead.
    ///
    /// # Errors
    ///
    /// [`Error::StaleLine`] if `line` is not in this buffer.
    pub fn delete_line(&mut self, line: LineId, faces: &mut [&mut Face]) -> Result<(), Error> {
        self.lines.line(line)?;
        if self.lines.len() == 1 {
            self.lines.set_text(line, b"")?;
            self.repair(faces, |p| p.offset = 0);
            return Ok(());
        }
        let target = match self.lines.next(line) {
            Some(next) => Point::new(next, 0),
            None => {
                let prev = self.lines.prev(line).ok_or(Error::StaleLine)?;
                Point::new(prev, self.lines.line_length(prev))
            }
        };
        self.retarget_tops(faces, line, target.line);
        self.repair(faces, |p| {
            if p.line == line {
                *p = target;
            }
        });
        self.lines.remove(line)?;
        Ok(())
    }

    /// Move the top line of the given faces and the home face off `gone`.
    fn retarget_tops(&mut self, faces: &mut [&mut Face], gone: LineId, to: LineId) {
        let home = self.home.as_mut();
        for face in faces.iter_mut().map(|f| &mut **f).chain(home) {
            if face.top == gone {
                face.top = to;
            }
        }
    }

    /// Apply `fix` to every mark, the home face and the given faces, then
    /// clamp any offset the edit left past the end of its line.
    fn repair(&mut self, faces: &mut [&mut Face], mut fix: impl FnMut(&mut Point)) {
        let mut points: Vec<&mut Point> = faces.iter_mut().map(|f| &mut f.point).collect();
        if let Some(home) = &mut self.home {
            points.push(&mut home.point);
        }
        points.extend(self.marks.points_mut());
        for p in points {
            fix(&mut *p);
            match self.lines.get(p.line) {
                Some(l) if p.offset > l.used() => p.offset = l.used(),
                Some(_) => {}
                None => warn!(point = ?p, "point left on a removed line"),
            }
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new("untitled")
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("name", &self.name)
            .field("lines", &self.lines.len())
            .field("marks", &self.marks.len())
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
