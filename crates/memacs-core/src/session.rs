//! Editing session — one buffer shown in one window, plus navigation state.
//!
//! The session is where commands run. It owns the [`Buffer`], the
//! [`Window`] onto it, the option [`Settings`], the [`NavContext`] and the
//! [`Screen`] collaborator. Each command method moves the window's point
//! through the primitives in [`nav`], [`word`] and [`fence`] and leaves
//! redraw flags on the window for the render layer.
//!
//! # Vertical moves
//!
//! The goal column lives in [`NavContext`]. A line move that directly
//! follows another line move keeps the goal column; any other command in
//! between makes the next line move take it from point's display column.
//!
//! # Marks
//!
//! Visiting a mark whose line is already on screen only moves point. A mark
//! off screen reframes the window so the mark lands on the row recorded
//! when it was set.

use tracing::{debug, trace};

use crate::buffer::Buffer;
use crate::error::{Error, Flow, Outcome, boundary, done, invalid_arg};
use crate::fence;
use crate::line::LineStore;
use crate::mark::{self, MarkFlags, REGION_MARK};
use crate::nav::{self, count};
use crate::options::{self, Settings};
use crate::point::{Point, Region};
use crate::window::{Face, Screen, Window, WindowFlags};
use crate::word;

// ---------------------------------------------------------------------------
// NavContext
// ---------------------------------------------------------------------------

/// What kind of command ran, as far as the goal column cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandKind {
    #[default]
    Other,
    /// `forwLine` / `backLine`.
    Vertical,
}

/// Per-session navigation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavContext {
    goal_col: usize,
    prev: CommandKind,
    cur: CommandKind,
}

impl NavContext {
    /// Record the start of a command.
    pub fn begin(&mut self, kind: CommandKind) {
        self.prev = self.cur;
        self.cur = kind;
    }

    /// The kind of the command before the current one.
    #[must_use]
    pub const fn prev(&self) -> CommandKind {
        self.prev
    }

    /// The remembered goal column.
    #[must_use]
    pub const fn goal_col(&self) -> usize {
        self.goal_col
    }

    /// The goal column for the current vertical move: reused after another
    /// vertical move, otherwise taken from `col`.
    pub fn goal_for(&mut self, col: usize) -> usize {
        if self.prev != CommandKind::Vertical {
            self.goal_col = col;
        }
        self.goal_col
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Window rows for a screen of `rows` lines, less the message line.
fn text_rows(rows: u16) -> u16 {
    rows.saturating_sub(1).max(1)
}

/// A buffer in a window, ready for commands.
pub struct Session {
    buffer: Buffer,
    window: Window,
    settings: Settings,
    nav: NavContext,
    screen: Box<dyn Screen>,
}

impl Session {
    /// Open `buffer` in a window sized to `screen`. A saved home face is
    /// restored.
    #[must_use]
    pub fn new(buffer: Buffer, screen: Box<dyn Screen>) -> Self {
        let (rows, cols) = screen.size();
        let mut window = Window::new(buffer.lines(), text_rows(rows), cols);
        if let Some(face) = buffer.home_face() {
            window.set_face(face);
        }
        debug!(buffer = buffer.name(), rows, cols, "session opened");
        Self {
            buffer,
            window,
            settings: Settings::default(),
            nav: NavContext::default(),
            screen,
        }
    }

    // -- Access -------------------------------------------------------------

    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[must_use]
    pub const fn window(&self) -> &Window {
        &self.window
    }

    pub const fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub const fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    #[must_use]
    pub const fn nav(&self) -> &NavContext {
        &self.nav
    }

    /// The window's point.
    #[must_use]
    pub const fn point(&self) -> Point {
        self.window.point()
    }

    /// Point as 0-based line number and offset.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        let p = self.point();
        (self.buffer.lines().index_of(p.line).unwrap_or(0), p.offset)
    }

    /// Detach the buffer, saving the window's face as its home face.
    #[must_use]
    pub fn into_buffer(mut self) -> Buffer {
        self.buffer.save_face(*self.window.face());
        self.buffer
    }

    // -- Display ------------------------------------------------------------

    /// Settle the window and hand it to the screen.
    ///
    /// # Errors
    ///
    /// [`Error::Screen`] if the screen fails to draw.
    pub fn redraw(&mut self) -> Result<(), Error> {
        let (rows, cols) = self.screen.size();
        if self.window.rows() != text_rows(rows) || self.window.cols() != cols.max(1) {
            self.window.resize(text_rows(rows), cols);
        }
        self.window.frame(self.buffer.lines(), self.settings.htab_size);
        self.screen.update(&self.buffer, &self.window, self.settings.htab_size)?;
        let flags = self.window.take_flags();
        trace!(?flags, "redrawn");
        Ok(())
    }

    /// Ring the bell.
    pub fn beep(&mut self) {
        self.screen.beep();
    }

    // -- Helpers ------------------------------------------------------------

    fn begin(&mut self, kind: CommandKind) {
        self.nav.begin(kind);
    }

    fn lines(&self) -> &LineStore {
        self.buffer.lines()
    }

    /// Move point to `p` and pass `flow` through.
    fn land(&mut self, p: Point, flow: Flow) -> Outcome {
        if flow.is_boundary() {
            trace!(point = ?p, "stopped at buffer edge");
        }
        self.window.set_point(p);
        Ok(flow)
    }

    /// Move point to a mark's position, reframing when it is off screen.
    fn jump(&mut self, p: Point, row: usize) -> Result<(), Error> {
        if !p.is_valid(self.lines()) {
            return Err(Error::StaleLine);
        }
        let visible = self.window.is_visible(self.lines(), p.line);
        self.window.set_point(p);
        if !visible {
            debug!(row, "mark off screen, reframing");
            self.window.reframe(Some(row));
        }
        Ok(())
    }

    /// Run a structural edit with the window's face included in the repair.
    fn with_face<T>(
        &mut self,
        edit: impl FnOnce(&mut Buffer, &mut Face) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut face = *self.window.face();
        let out = edit(&mut self.buffer, &mut face)?;
        *self.window.face_mut() = face;
        self.window.add_flags(WindowFlags::HARD);
        Ok(out)
    }

    fn point_row(&self) -> usize {
        self.window.point_row(self.lines()).unwrap_or(0)
    }

    // -- Characters and lines -----------------------------------------------

    /// Move forward `n` characters (backward if negative).
    ///
    /// # Errors
    ///
    /// Never fails; boundaries come back as [`Flow::Boundary`].
    pub fn forw_char(&mut self, n: i64) -> Outcome {
        self.begin(CommandKind::Other);
        let mut p = self.point();
        let flow = nav::move_char(self.lines(), &mut p, n);
        self.land(p, flow)
    }

    /// Move backward `n` characters.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn back_char(&mut self, n: i64) -> Outcome {
        self.forw_char(n.saturating_neg())
    }

    /// Move down `n` lines (up if negative), keeping the goal column.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn forw_line(&mut self, n: i64) -> Outcome {
        self.begin(CommandKind::Vertical);
        let htab = self.settings.htab_size;
        let mut p = self.point();
        let col = nav::line_col(self.lines(), p, htab);
        let goal = self.nav.goal_for(col);
        let flow = nav::move_line(self.lines(), &mut p, n, goal, htab);
        self.land(p, flow)
    }

    /// Move up `n` lines.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn back_line(&mut self, n: i64) -> Outcome {
        self.forw_line(n.saturating_neg())
    }

    /// Move to the start of the line.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn begin_line(&mut self) -> Outcome {
        self.begin(CommandKind::Other);
        let p = self.point();
        self.land(Point::new(p.line, 0), Flow::Done(()))
    }

    /// Move to the end of the line.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn end_line(&mut self) -> Outcome {
        self.begin(CommandKind::Other);
        let p = self.point();
        let end = self.lines().line_length(p.line);
        self.land(Point::new(p.line, end), Flow::Done(()))
    }

    /// Move to the first non-blank character of the line.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn begin_text(&mut self) -> Outcome {
        self.begin(CommandKind::Other);
        let p = self.point();
        let offset = nav::begin_text(self.lines(), p.line);
        self.land(Point::new(p.line, offset), Flow::Done(()))
    }

    /// Move to the beginning of the buffer.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn begin_buf(&mut self) -> Outcome {
        self.begin(CommandKind::Other);
        let p = self.buffer.start();
        self.land(p, Flow::Done(()))
    }

    /// Move to the end of the buffer.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn end_buf(&mut self) -> Outcome {
        self.begin(CommandKind::Other);
        let p = self.buffer.end();
        self.land(p, Flow::Done(()))
    }

    /// Move to the start of 1-based line `n`. Past the end, point goes to
    /// the start of the last line and the result is a boundary.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when `n < 1`.
    pub fn goto_line(&mut self, n: i64) -> Outcome {
        self.begin(CommandKind::Other);
        if n < 1 {
            return Err(invalid_arg!("line number must be 1 or greater ({n})"));
        }
        match self.buffer.point_at_line(count(n - 1)) {
            Some(p) => self.land(p, Flow::Done(())),
            None => {
                let last = self.lines().last();
                self.land(Point::new(last, 0), Flow::Boundary)
            }
        }
    }

    /// Scroll forward `n` pages (backward if negative). A page is the window
    /// height less two rows of overlap. Point moves to the new top line.
    ///
    /// # Errors
    ///
    /// Never fails; a window that cannot scroll at all is a boundary.
    pub fn forw_page(&mut self, n: i64) -> Outcome {
        self.begin(CommandKind::Other);
        if n == 0 {
            return done(());
        }
        let per_page = usize::from(self.window.rows()).saturating_sub(2).max(1);
        let target = count(n).saturating_mul(per_page);
        let lines = self.buffer.lines();
        let mut top = self.window.top();
        let mut moved = 0;
        while moved < target {
            let step = if n > 0 { lines.next(top) } else { lines.prev(top) };
            let Some(t) = step else { break };
            top = t;
            moved += 1;
        }
        if moved == 0 {
            trace!(n, "page: window cannot scroll");
            return boundary();
        }
        self.window.set_top(top);
        self.window.set_point(Point::new(top, 0));
        done(())
    }

    /// Scroll backward `n` pages.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn back_page(&mut self, n: i64) -> Outcome {
        self.forw_page(n.saturating_neg())
    }

    // -- Words and tabs -----------------------------------------------------

    /// Move forward `n` words (backward if negative).
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn forw_word(&mut self, n: i64) -> Outcome {
        self.begin(CommandKind::Other);
        let mut p = self.point();
        let flow = word::forw_word(self.buffer.lines(), &mut p, n, &self.settings.word_chars);
        self.land(p, flow)
    }

    /// Move backward `n` words (forward if negative).
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn back_word(&mut self, n: i64) -> Outcome {
        self.begin(CommandKind::Other);
        let mut p = self.point();
        let flow = word::back_word(self.buffer.lines(), &mut p, n, &self.settings.word_chars);
        self.land(p, flow)
    }

    /// Move to the end of the `n`th word.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for a negative count.
    pub fn end_word(&mut self, n: i64) -> Outcome {
        self.begin(CommandKind::Other);
        let mut p = self.point();
        let flow = word::end_word(self.buffer.lines(), &mut p, n, &self.settings.word_chars)?;
        self.land(p, flow)
    }

    /// Move forward `n` tab stops (backward if negative).
    ///
    /// # Errors
    ///
    /// Never fails; point already at the line edge is a boundary.
    pub fn forw_tab(&mut self, n: i64) -> Outcome {
        self.begin(CommandKind::Other);
        let p = self.point();
        match nav::tab_stop(self.lines(), p, n, &self.settings) {
            Some(offset) => self.land(Point::new(p.line, offset), Flow::Done(())),
            None if n == 0 => done(()),
            None => boundary(),
        }
    }

    /// Move backward `n` tab stops.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub fn back_tab(&mut self, n: i64) -> Outcome {
        self.forw_tab(n.saturating_neg())
    }

    /// The previous (`n < 0`), current (`0`) or next (`n > 0`) word on
    /// point's line. Point moves past the word unless `n < 0`.
    pub fn get_word(&mut self, n: i64) -> Option<String> {
        self.begin(CommandKind::Other);
        let mut p = self.point();
        let text = word::get_word(self.buffer.lines(), &mut p, n, &self.settings.word_chars)?;
        self.window.set_point(p);
        Some(String::from_utf8_lossy(&text).into_owned())
    }

    /// True when point is on a word character.
    #[must_use]
    pub fn in_word(&mut self) -> bool {
        self.begin(CommandKind::Other);
        word::in_word(self.lines(), self.point(), &self.settings.word_chars)
    }

    // -- Fences -------------------------------------------------------------

    /// Move to the fence matching `source`, or the character at point.
    ///
    /// # Errors
    ///
    /// [`Error::NotAFence`] or the silent [`Error::FenceNotFound`].
    pub fn goto_fence(&mut self, source: Option<u8>) -> Outcome {
        self.begin(CommandKind::Other);
        let mut p = self.point();
        let c = source.unwrap_or_else(|| self.lines().line_char(p.line, p.offset));
        fence::other_fence(self.lines(), &mut p, c, false)?;
        self.land(p, Flow::Done(()))
    }

    /// The region from the fence at point to its match. Point stays put.
    ///
    /// # Errors
    ///
    /// As [`goto_fence`](Self::goto_fence).
    pub fn fence_region(&self, source: Option<u8>) -> Result<Region, Error> {
        let mut p = self.point();
        let c = source.unwrap_or_else(|| self.lines().line_char(p.line, p.offset));
        fence::other_fence(self.lines(), &mut p, c, true)?.ok_or(Error::FenceNotFound)
    }

    /// Briefly show the match of the fence at point when the `showfence`
    /// option is on. Returns whether anything was shown.
    ///
    /// # Errors
    ///
    /// [`Error::NotAFence`] or [`Error::Screen`].
    pub fn show_fence(&mut self, source: Option<u8>, beep: bool) -> Result<bool, Error> {
        self.begin(CommandKind::Other);
        if !self.settings.show_fence {
            return Ok(false);
        }
        let p = self.point();
        let c = source.unwrap_or_else(|| self.lines().line_char(p.line, p.offset));
        fence::fence_match(
            &self.buffer,
            &mut self.window,
            self.screen.as_mut(),
            &self.settings,
            c,
            beep,
        )
    }

    // -- Marks --------------------------------------------------------------

    /// Resolve a mark argument: the region mark by default, otherwise a
    /// user identifier.
    fn mark_id(id: Option<char>) -> Result<char, Error> {
        id.map_or(Ok(REGION_MARK), mark::validate_id)
    }

    /// Set a mark (the region mark by default) at point.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidMark`] for a bad identifier.
    pub fn set_mark(&mut self, id: Option<char>) -> Result<(), Error> {
        self.begin(CommandKind::Other);
        let id = Self::mark_id(id)?;
        let p = self.point();
        let row = self.point_row();
        self.buffer
            .marks_mut()
            .find(id, MarkFlags::CREATE)?
            .ok_or(Error::MarkNotFound(id))?
            .set(p, row);
        debug!(mark = %id, point = ?p, row, "mark set");
        Ok(())
    }

    /// Position and reframe row of an active mark.
    fn active_mark(&mut self, id: char) -> Result<(Point, usize), Error> {
        let m = self
            .buffer
            .marks_mut()
            .find(id, MarkFlags::VISIBLE)?
            .ok_or(Error::MarkNotSet(id))?;
        let p = m.point().ok_or(Error::MarkNotSet(id))?;
        Ok((p, m.reframe_row()))
    }

    /// Move point to a mark.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidMark`], [`Error::MarkNotFound`] or
    /// [`Error::MarkNotSet`].
    pub fn goto_mark(&mut self, id: Option<char>) -> Result<(), Error> {
        self.begin(CommandKind::Other);
        let id = Self::mark_id(id)?;
        let (p, row) = self.active_mark(id)?;
        self.jump(p, row)
    }

    /// Exchange point and a mark.
    ///
    /// # Errors
    ///
    /// As [`goto_mark`](Self::goto_mark).
    pub fn swap_mark(&mut self, id: Option<char>) -> Result<(), Error> {
        self.begin(CommandKind::Other);
        let id = Self::mark_id(id)?;
        let (target, row) = self.active_mark(id)?;
        if !target.is_valid(self.lines()) {
            return Err(Error::StaleLine);
        }
        let here = self.point();
        let here_row = self.point_row();
        if let Some(m) = self.buffer.marks_mut().find(id, MarkFlags::QUERY)? {
            m.set(here, here_row);
        }
        self.jump(target, row)
    }

    /// Delete a mark. The region mark cannot be deleted.
    ///
    /// # Errors
    ///
    /// [`Error::ProtectedMark`], [`Error::InvalidMark`] or
    /// [`Error::MarkNotFound`].
    pub fn delete_mark(&mut self, id: char) -> Result<(), Error> {
        self.begin(CommandKind::Other);
        if id != REGION_MARK {
            mark::validate_id(id)?;
        }
        self.buffer.marks_mut().delete(id)
    }

    /// Delete every mark but the region mark, which becomes unset.
    pub fn delete_all_marks(&mut self) {
        self.begin(CommandKind::Other);
        self.buffer.marks_mut().clear();
    }

    /// Mark the whole buffer: region mark at the end, point at the start.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the region mark always exists.
    pub fn mark_buf(&mut self) -> Result<(), Error> {
        self.begin(CommandKind::Other);
        let end = self.buffer.end();
        self.buffer
            .marks_mut()
            .find(REGION_MARK, MarkFlags::CREATE)?
            .ok_or(Error::MarkNotFound(REGION_MARK))?
            .set(end, 0);
        let start = self.buffer.start();
        self.window.set_point(start);
        Ok(())
    }

    /// The region between point and the region mark.
    ///
    /// # Errors
    ///
    /// [`Error::MarkNotSet`] when the region mark is unset.
    pub fn mark_region(&self) -> Result<Region, Error> {
        let mark = self
            .buffer
            .marks()
            .region_mark()
            .point()
            .ok_or(Error::MarkNotSet(REGION_MARK))?;
        Region::between(self.point(), mark, self.lines()).ok_or(Error::StaleLine)
    }

    /// The text between point and the region mark.
    ///
    /// # Errors
    ///
    /// As [`mark_region`](Self::mark_region).
    pub fn region_text(&mut self) -> Result<String, Error> {
        self.begin(CommandKind::Other);
        let region = self.mark_region()?;
        let text = self.buffer.region_text(region).ok_or(Error::StaleLine)?;
        Ok(String::from_utf8_lossy(&text).into_owned())
    }

    // -- Line edits ---------------------------------------------------------

    /// Break the line at point; point moves to the start of the new line.
    ///
    /// # Errors
    ///
    /// [`Error::StaleLine`] if point is stale.
    pub fn split_line(&mut self) -> Result<(), Error> {
        self.begin(CommandKind::Other);
        let at = self.point();
        let start = self.with_face(|buf, face| buf.split_line(at, &mut [face]))?;
        self.window.set_point(start);
        Ok(())
    }

    /// Join point's line with the next one.
    ///
    /// # Errors
    ///
    /// [`Error::StaleLine`] if point is stale. On the last line the result
    /// is a boundary.
    pub fn join_line(&mut self) -> Outcome {
        self.begin(CommandKind::Other);
        let line = self.point().line;
        match self.with_face(|buf, face| buf.join_line(line, &mut [face]))? {
            Some(_) => done(()),
            None => boundary(),
        }
    }

    /// Delete point's line.
    ///
    /// # Errors
    ///
    /// [`Error::StaleLine`] if point is stale.
    pub fn delete_line(&mut self) -> Result<(), Error> {
        self.begin(CommandKind::Other);
        let line = self.point().line;
        self.with_face(|buf, face| buf.delete_line(line, &mut [face]))
    }

    // -- Options ------------------------------------------------------------

    /// Carry out a `set` line. Returns the messages it produced.
    ///
    /// # Errors
    ///
    /// [`Error::Option`] from the first directive that fails; directives
    /// before it stay applied.
    pub fn apply_set(&mut self, args: &str) -> Result<Vec<String>, Error> {
        self.begin(CommandKind::Other);
        let mut messages = Vec::new();
        for directive in options::parse_set(args) {
            if let Some(msg) = self.settings.apply(&directive)? {
                messages.push(msg);
            }
        }
        self.window.add_flags(WindowFlags::HARD);
        Ok(messages)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::NullScreen;
    use pretty_assertions::assert_eq;

    fn session(text: &str) -> Session {
        Session::new(Buffer::from_text("test", text), Box::new(NullScreen::default()))
    }

    fn session_rows(text: &str, rows: u16) -> Session {
        Session::new(
            Buffer::from_text("test", text),
            Box::new(NullScreen { rows, cols: 80 }),
        )
    }

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    // -- NavContext ---------------------------------------------------------

    #[test]
    fn goal_is_kept_only_across_vertical_moves() {
        let mut nav = NavContext::default();
        nav.begin(CommandKind::Vertical);
        assert_eq!(nav.goal_for(7), 7);
        nav.begin(CommandKind::Vertical);
        assert_eq!(nav.goal_for(2), 7);
        nav.begin(CommandKind::Other);
        nav.begin(CommandKind::Vertical);
        assert_eq!(nav.goal_for(2), 2);
    }

    // -- Characters and lines -----------------------------------------------

    #[test]
    fn window_is_sized_to_screen() {
        let s = session_rows("x", 11);
        assert_eq!(s.window().rows(), 10);
        assert_eq!(s.window().cols(), 80);
    }

    #[test]
    fn empty_buffer_forward_char_is_boundary() {
        let mut s = session("");
        assert!(s.forw_char(1).unwrap().is_boundary());
        assert_eq!(s.position(), (0, 0));
    }

    #[test]
    fn line_change_sets_move_flag() {
        let mut s = session("ab\ncd");
        s.window_mut().take_flags();
        s.forw_char(1).unwrap();
        assert_eq!(s.window().flags(), WindowFlags::empty());
        s.forw_char(2).unwrap();
        assert_eq!(s.window().flags(), WindowFlags::MOVE);
    }

    #[test]
    fn goal_column_survives_short_line() {
        let mut s = session("abcdefghij\nab\nabcdefghij");
        s.forw_char(7).unwrap();
        s.forw_line(1).unwrap();
        assert_eq!(s.position(), (1, 2));
        s.forw_line(1).unwrap();
        assert_eq!(s.position(), (2, 7));
        s.back_line(2).unwrap();
        assert_eq!(s.position(), (0, 7));
    }

    #[test]
    fn horizontal_move_resets_goal_column() {
        let mut s = session("abcdefghij\nab\nabcdefghij");
        s.forw_char(7).unwrap();
        s.forw_line(1).unwrap();
        s.forw_char(0).unwrap();
        s.forw_line(1).unwrap();
        assert_eq!(s.position(), (2, 2));
    }

    #[test]
    fn goal_column_through_tabs() {
        let mut s = session("0123456789\n\tab\n0123456789");
        s.forw_char(9).unwrap();
        s.forw_line(1).unwrap();
        assert_eq!(s.position(), (1, 2));
        s.forw_line(1).unwrap();
        assert_eq!(s.position(), (2, 9));
    }

    #[test]
    fn line_ends_and_text_start() {
        let mut s = session("  hello");
        s.end_line().unwrap();
        assert_eq!(s.position(), (0, 7));
        s.begin_text().unwrap();
        assert_eq!(s.position(), (0, 2));
        s.begin_line().unwrap();
        assert_eq!(s.position(), (0, 0));
    }

    #[test]
    fn buffer_ends() {
        let mut s = session("one\ntwo\nthree");
        s.end_buf().unwrap();
        assert_eq!(s.position(), (2, 5));
        s.begin_buf().unwrap();
        assert_eq!(s.position(), (0, 0));
    }

    #[test]
    fn goto_line_numbers_from_one() {
        let mut s = session("a\nb\nc");
        assert!(s.goto_line(2).unwrap().is_done());
        assert_eq!(s.position(), (1, 0));
        assert!(s.goto_line(9).unwrap().is_boundary());
        assert_eq!(s.position(), (2, 0));
        assert!(matches!(s.goto_line(0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn pages_scroll_by_window_less_overlap() {
        let mut s = session_rows(&numbered(30), 11);
        assert!(s.forw_page(1).unwrap().is_done());
        assert_eq!(s.position(), (8, 0));
        assert_eq!(s.buffer().lines().index_of(s.window().top()), Some(8));
        assert!(s.back_page(1).unwrap().is_done());
        assert_eq!(s.position(), (0, 0));
        assert!(s.back_page(1).unwrap().is_boundary());
    }

    // -- Words and tabs -----------------------------------------------------

    #[test]
    fn forward_word_scenario() {
        let mut s = session("hello world\nfoo");
        s.forw_word(1).unwrap();
        assert_eq!(s.position(), (0, 6));
        s.forw_word(1).unwrap();
        assert_eq!(s.position(), (1, 0));
    }

    #[test]
    fn word_query_and_in_word() {
        let mut s = session("say hello");
        assert!(s.in_word());
        assert_eq!(s.get_word(1).as_deref(), Some("hello"));
        assert_eq!(s.position(), (0, 9));
        assert!(!s.in_word());
        assert_eq!(s.get_word(-1).as_deref(), Some("hello"));
        assert_eq!(s.position(), (0, 9));
    }

    #[test]
    fn tab_commands_follow_soft_tabs() {
        let mut s = session("abcdefghijklmnop");
        s.apply_set("stabsize=4").unwrap();
        assert!(s.forw_tab(2).unwrap().is_done());
        assert_eq!(s.position(), (0, 8));
        assert!(s.back_tab(1).unwrap().is_done());
        assert_eq!(s.position(), (0, 4));
        s.begin_line().unwrap();
        assert!(s.back_tab(1).unwrap().is_boundary());
    }

    // -- Fences -------------------------------------------------------------

    #[test]
    fn goto_fence_at_point() {
        let mut s = session("(abc(def)ghi)");
        s.goto_fence(None).unwrap();
        assert_eq!(s.position(), (0, 12));
        s.goto_fence(None).unwrap();
        assert_eq!(s.position(), (0, 0));
    }

    #[test]
    fn fence_region_leaves_point() {
        let s = session("(abc)");
        let r = s.fence_region(None).unwrap();
        assert_eq!(r.size, 5);
        assert_eq!(s.position(), (0, 0));
    }

    #[test]
    fn show_fence_respects_option() {
        let mut s = session("(a)");
        assert!(s.show_fence(None, false).unwrap());
        s.apply_set("noshowfence").unwrap();
        assert!(!s.show_fence(None, false).unwrap());
    }

    // -- Marks --------------------------------------------------------------

    #[test]
    fn visible_mark_only_moves_point() {
        let mut s = session("one\ntwo\nthree");
        s.set_mark(Some('a')).unwrap();
        s.end_buf().unwrap();
        s.window_mut().take_flags();
        s.goto_mark(Some('a')).unwrap();
        assert_eq!(s.position(), (0, 0));
        assert_eq!(s.window().flags(), WindowFlags::MOVE);
        assert_eq!(s.window().reframe_row(), None);
    }

    #[test]
    fn hidden_mark_reframes_to_recorded_row() {
        let mut s = session_rows(&numbered(50), 11);
        s.forw_line(3).unwrap();
        s.set_mark(Some('a')).unwrap();
        s.goto_line(40).unwrap();
        s.redraw().unwrap();
        assert!(!s.window().is_visible(s.buffer().lines(), s.buffer().lines().first()));

        s.goto_mark(Some('a')).unwrap();
        assert_eq!(s.position(), (3, 0));
        assert!(s.window().flags().contains(WindowFlags::REFRAME));
        assert_eq!(s.window().reframe_row(), Some(3));
    }

    #[test]
    fn swap_mark_exchanges_positions() {
        let mut s = session("one\ntwo");
        s.set_mark(None).unwrap();
        s.end_buf().unwrap();
        s.swap_mark(None).unwrap();
        assert_eq!(s.position(), (0, 0));
        s.swap_mark(None).unwrap();
        assert_eq!(s.position(), (1, 3));
    }

    #[test]
    fn mark_errors() {
        let mut s = session("x");
        assert!(matches!(s.goto_mark(Some('z')), Err(Error::MarkNotFound('z'))));
        assert!(matches!(s.goto_mark(None), Err(Error::MarkNotSet('.'))));
        assert!(matches!(s.set_mark(Some('`')), Err(Error::InvalidMark('`'))));
        assert!(matches!(s.delete_mark('.'), Err(Error::ProtectedMark('.'))));
    }

    #[test]
    fn mark_buf_spans_whole_buffer() {
        let mut s = session("ab\ncd");
        s.mark_buf().unwrap();
        assert_eq!(s.position(), (0, 0));
        let r = s.mark_region().unwrap();
        assert_eq!(r.size, 5);
        assert_eq!(r.line_count, 2);
        assert_eq!(s.buffer().region_text(r), Some(b"ab\ncd".to_vec()));
    }

    #[test]
    fn delete_all_marks_unsets_region_mark() {
        let mut s = session("x");
        s.set_mark(None).unwrap();
        s.set_mark(Some('q')).unwrap();
        s.delete_all_marks();
        assert_eq!(s.buffer().marks().len(), 1);
        assert!(matches!(s.mark_region(), Err(Error::MarkNotSet('.'))));
    }

    // -- Line edits ---------------------------------------------------------

    #[test]
    fn split_and_join_keep_marks_valid() {
        let mut s = session("hello world");
        s.forw_char(8).unwrap();
        s.set_mark(Some('m')).unwrap();
        s.begin_line().unwrap();
        s.forw_char(5).unwrap();
        s.split_line().unwrap();
        assert_eq!(s.position(), (1, 0));
        s.goto_mark(Some('m')).unwrap();
        assert_eq!(s.position(), (1, 3));

        s.back_line(1).unwrap();
        assert!(s.join_line().unwrap().is_done());
        s.goto_mark(Some('m')).unwrap();
        assert_eq!(s.position(), (0, 8));
        assert_eq!(s.buffer().contents(), "hello world");
    }

    #[test]
    fn delete_line_moves_point_to_next_line() {
        let mut s = session("a\nb\nc");
        s.forw_line(1).unwrap();
        s.delete_line().unwrap();
        assert_eq!(s.position(), (1, 0));
        assert_eq!(s.buffer().contents(), "a\nc");
    }

    #[test]
    fn join_onto_window_top_keeps_window_live() {
        let mut s = session_rows(&numbered(30), 11);
        s.forw_page(1).unwrap();
        s.back_line(1).unwrap();
        assert!(s.join_line().unwrap().is_done());

        let lines = s.buffer().lines();
        assert!(lines.contains(s.window().top()));
        assert_eq!(lines.index_of(s.window().top()), Some(7));
        assert_eq!(s.window().point_row(lines), Some(0));

        let buf = s.into_buffer();
        let home = buf.home_face().unwrap();
        assert_eq!(buf.lines().index_of(home.top), Some(7));
    }

    // -- Options ------------------------------------------------------------

    #[test]
    fn set_line_breaks_goal_column_run() {
        let mut s = session("\tabcdefgh\n\tabcdefgh\n\tabcdefgh");
        s.forw_char(3).unwrap();
        s.forw_line(1).unwrap();
        assert_eq!(s.position(), (1, 3));
        s.apply_set("htabsize=2").unwrap();
        s.forw_line(1).unwrap();
        assert_eq!(s.nav().goal_col(), 4);
        assert_eq!(s.position(), (2, 3));
    }

    #[test]
    fn queries_break_goal_column_run() {
        let mut s = session("abcdef\nab\nabcdef");
        s.forw_char(5).unwrap();
        s.forw_line(1).unwrap();
        assert_eq!(s.position(), (1, 2));
        assert!(!s.in_word());
        s.forw_line(1).unwrap();
        assert_eq!(s.position(), (2, 2));
    }

    #[test]
    fn word_chars_option_changes_motion() {
        let mut s = session("foo-bar baz");
        s.apply_set("wordchars=a-z-").unwrap();
        s.forw_word(1).unwrap();
        assert_eq!(s.position(), (0, 8));
    }

    #[test]
    fn home_face_is_restored() {
        let mut s = session("a\nb\nc");
        s.forw_line(2).unwrap();
        let buf = s.into_buffer();
        let s = Session::new(buf, Box::new(NullScreen::default()));
        assert_eq!(s.position(), (2, 0));
    }
}
