//! Line store — the doubly-linked list of text lines behind a buffer.
//!
//! Lines live in an arena of slots and link to each other by [`LineId`]
//! handles. A handle carries the generation of the slot it was issued for,
//! so a handle to a removed line is detected instead of silently pointing at
//! whatever line reuses the slot.
//!
//! # Shape of the list
//!
//! - There is always at least one line. An empty buffer is one line with no
//!   text.
//! - Every line except the last ends with an implied newline that is **not
//!   stored**. It exists only as the link to the next line.
//! - Text is raw bytes. Offsets are byte offsets in `0..=used`.
//!
//! There is no random access by line number. Consumers walk `next`/`prev`
//! from a line they already hold.

use std::fmt;

use crate::error::Error;

/// The synthetic character returned for the end-of-line position.
pub const NEWLINE: u8 = b'\n';

// ---------------------------------------------------------------------------
// LineId
// ---------------------------------------------------------------------------

/// Generation-checked handle to a line in a [`LineStore`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId {
    index: u32,
    generation: u32,
}

impl fmt::Debug for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}#{}", self.index, self.generation)
    }
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// One line of text plus its list links.
#[derive(Debug, Clone, Default)]
pub struct Line {
    text: Vec<u8>,
    next: Option<LineId>,
    prev: Option<LineId>,
}

impl Line {
    /// Number of valid bytes.
    #[inline]
    #[must_use]
    pub fn used(&self) -> usize {
        self.text.len()
    }

    /// Allocated capacity in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.text.capacity()
    }

    /// The line's bytes, without any newline.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// Byte at `offset`, or [`NEWLINE`] when `offset == used`.
    ///
    /// Word and fence classification read the end of a line through this so
    /// that it behaves like one non-word delimiter.
    #[inline]
    #[must_use]
    pub fn char_at(&self, offset: usize) -> u8 {
        self.text.get(offset).copied().unwrap_or(NEWLINE)
    }

    /// The following line, `None` on the last line.
    #[inline]
    #[must_use]
    pub const fn next(&self) -> Option<LineId> {
        self.next
    }

    /// The preceding line, `None` on the first line.
    #[inline]
    #[must_use]
    pub const fn prev(&self) -> Option<LineId> {
        self.prev
    }
}

// ---------------------------------------------------------------------------
// LineStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    line: Option<Line>,
}

/// Arena-backed doubly-linked list of lines. Never empty.
#[derive(Clone)]
pub struct LineStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    first: LineId,
    last: LineId,
    count: usize,
}

impl LineStore {
    /// A store holding a single empty line.
    #[must_use]
    pub fn new() -> Self {
        let id = LineId {
            index: 0,
            generation: 0,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                line: Some(Line::default()),
            }],
            free: Vec::new(),
            first: id,
            last: id,
            count: 1,
        }
    }

    /// Build a store from text, splitting on `\n`.
    ///
    /// A trailing newline produces a trailing empty line, the same way the
    /// text would look on screen.
    #[must_use]
    pub fn from_bytes(text: &[u8]) -> Self {
        let mut store = Self::new();
        let mut pieces = text.split(|&b| b == NEWLINE);
        if let Some(head) = pieces.next() {
            store.line_mut_unchecked(store.first).text = head.to_vec();
        }
        let mut at = store.first;
        for piece in pieces {
            at = store.link_after(at, piece.to_vec());
        }
        store
    }

    // -- Access -------------------------------------------------------------

    /// Handle of the first line.
    #[inline]
    #[must_use]
    pub const fn first(&self) -> LineId {
        self.first
    }

    /// Handle of the last line.
    #[inline]
    #[must_use]
    pub const fn last(&self) -> LineId {
        self.last
    }

    /// Number of lines. Always at least 1.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Always false: a store holds at least one line.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// True when `id` refers to a live line.
    #[must_use]
    pub fn contains(&self, id: LineId) -> bool {
        self.get(id).is_some()
    }

    /// The line behind `id`, or `None` for a stale handle.
    #[must_use]
    pub fn get(&self, id: LineId) -> Option<&Line> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation == id.generation {
            slot.line.as_ref()
        } else {
            None
        }
    }

    /// Like [`get`](Self::get) but reports a stale handle as an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleLine`] if the line has been removed.
    pub fn line(&self, id: LineId) -> Result<&Line, Error> {
        self.get(id).ok_or(Error::StaleLine)
    }

    /// `used` of a line. Stale handles read as an empty line.
    #[must_use]
    pub fn line_length(&self, id: LineId) -> usize {
        self.get(id).map_or(0, Line::used)
    }

    /// Byte at `offset`, or [`NEWLINE`] at end of line.
    #[must_use]
    pub fn line_char(&self, id: LineId, offset: usize) -> u8 {
        self.get(id).map_or(NEWLINE, |l| l.char_at(offset))
    }

    /// The line after `id`.
    #[must_use]
    pub fn next(&self, id: LineId) -> Option<LineId> {
        self.get(id).and_then(Line::next)
    }

    /// The line before `id`.
    #[must_use]
    pub fn prev(&self, id: LineId) -> Option<LineId> {
        self.get(id).and_then(Line::prev)
    }

    /// Walk all line handles from first to last.
    pub fn iter(&self) -> impl Iterator<Item = LineId> + '_ {
        std::iter::successors(Some(self.first), move |&id| self.next(id))
    }

    /// 0-based position of a line in the list, found by walking from the top.
    #[must_use]
    pub fn index_of(&self, id: LineId) -> Option<usize> {
        self.iter().position(|l| l == id)
    }

    /// The line `n` lines below the first one, if it exists.
    #[must_use]
    pub fn nth(&self, n: usize) -> Option<LineId> {
        self.iter().nth(n)
    }

    /// All text joined with newlines.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (i, id) in self.iter().enumerate() {
            if i > 0 {
                out.push(NEWLINE);
            }
            if let Some(line) = self.get(id) {
                out.extend_from_slice(line.text());
            }
        }
        out
    }

    // -- Structural edits ---------------------------------------------------

    /// Insert a new line holding `text` after `at`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleLine`] if `at` is not live.
    pub fn insert_after(&mut self, at: LineId, text: &[u8]) -> Result<LineId, Error> {
        self.line(at)?;
        Ok(self.link_after(at, text.to_vec()))
    }

    /// Unlink and free a line. The freed slot's generation is bumped, so
    /// every outstanding handle to it goes stale.
    ///
    /// # Errors
    ///
    /// [`Error::StaleLine`] for a dead handle, [`Error::LastLine`] when `id`
    /// is the only line.
    pub fn remove(&mut self, id: LineId) -> Result<Line, Error> {
        let (prev, next) = {
            let line = self.line(id)?;
            (line.prev, line.next)
        };
        if prev.is_none() && next.is_none() {
            return Err(Error::LastLine);
        }
        match prev {
            Some(p) => self.line_mut_unchecked(p).next = next,
            None => self.first = next.ok_or(Error::LastLine)?,
        }
        match next {
            Some(n) => self.line_mut_unchecked(n).prev = prev,
            None => self.last = prev.ok_or(Error::LastLine)?,
        }
        let slot = &mut self.slots[id.index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        let line = slot.line.take().ok_or(Error::StaleLine)?;
        self.free.push(id.index);
        self.count -= 1;
        Ok(line)
    }

    /// Split a line at `offset`: the tail moves to a new line inserted after
    /// it. Returns the new line.
    ///
    /// # Errors
    ///
    /// [`Error::StaleLine`] for a dead handle.
    pub fn split(&mut self, id: LineId, offset: usize) -> Result<LineId, Error> {
        let tail = {
            let line = self.line(id)?;
            let at = offset.min(line.used());
            line.text[at..].to_vec()
        };
        let keep = offset.min(self.line_length(id));
        self.line_mut_unchecked(id).text.truncate(keep);
        Ok(self.link_after(id, tail))
    }

    /// Append the following line's text to `id` and remove the following
    /// line. Returns the removed line's handle (now stale), or `None` if `id`
    /// is the last line.
    ///
    /// # Errors
    ///
    /// [`Error::StaleLine`] for a dead handle.
    pub fn join(&mut self, id: LineId) -> Result<Option<LineId>, Error> {
        let Some(next) = self.line(id)?.next else {
            return Ok(None);
        };
        let removed = self.remove(next)?;
        self.line_mut_unchecked(id).text.extend_from_slice(removed.text());
        Ok(Some(next))
    }

    /// Replace the text of a line.
    ///
    /// # Errors
    ///
    /// [`Error::StaleLine`] for a dead handle.
    pub fn set_text(&mut self, id: LineId, text: &[u8]) -> Result<(), Error> {
        self.line(id)?;
        let line = self.line_mut_unchecked(id);
        line.text.clear();
        line.text.extend_from_slice(text);
        Ok(())
    }

    // -- Internals ----------------------------------------------------------

    fn line_mut_unchecked(&mut self, id: LineId) -> &mut Line {
        self.slots[id.index as usize]
            .line
            .as_mut()
            .unwrap_or_else(|| unreachable!("live handle {id:?} has no line"))
    }

    fn alloc(&mut self, line: Line) -> LineId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.line = Some(line);
            LineId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(self.slots.len())
                .unwrap_or_else(|_| unreachable!("line arena exceeds u32 slots"));
            self.slots.push(Slot {
                generation: 0,
                line: Some(line),
            });
            LineId {
                index,
                generation: 0,
            }
        }
    }

    fn link_after(&mut self, at: LineId, text: Vec<u8>) -> LineId {
        let next = self.line_mut_unchecked(at).next;
        let id = self.alloc(Line {
            text,
            next,
            prev: Some(at),
        });
        self.line_mut_unchecked(at).next = Some(id);
        match next {
            Some(n) => self.line_mut_unchecked(n).prev = Some(id),
            None => self.last = id,
        }
        self.count += 1;
        id
    }
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LineStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineStore")
            .field("lines", &self.count)
            .field("first", &self.first)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(store: &LineStore) -> Vec<String> {
        store
            .iter()
            .map(|id| String::from_utf8_lossy(store.line(id).unwrap().text()).into_owned())
            .collect()
    }

    #[test]
    fn new_store_has_one_empty_line() {
        let store = LineStore::new();
        assert_eq!(store.len(), 1);
        assert_eq!(store.first(), store.last());
        assert_eq!(store.line_length(store.first()), 0);
        assert_eq!(store.next(store.first()), None);
        assert_eq!(store.prev(store.first()), None);
    }

    #[test]
    fn from_bytes_splits_lines() {
        let store = LineStore::from_bytes(b"hello world\nfoo");
        assert_eq!(texts(&store), vec!["hello world", "foo"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn trailing_newline_makes_empty_last_line() {
        let store = LineStore::from_bytes(b"a\n");
        assert_eq!(texts(&store), vec!["a", ""]);
    }

    #[test]
    fn last_line_has_no_next() {
        let store = LineStore::from_bytes(b"a\nb\nc");
        let last = store.iter().last().unwrap();
        assert_eq!(last, store.last());
        assert_eq!(store.next(last), None);
    }

    #[test]
    fn line_char_reports_newline_at_end() {
        let store = LineStore::from_bytes(b"ab");
        let l = store.first();
        assert_eq!(store.line_char(l, 0), b'a');
        assert_eq!(store.line_char(l, 2), NEWLINE);
    }

    #[test]
    fn size_is_at_least_used() {
        let store = LineStore::from_bytes(b"abcdef");
        let line = store.line(store.first()).unwrap();
        assert!(line.size() >= line.used());
    }

    #[test]
    fn insert_after_links_both_ways() {
        let mut store = LineStore::from_bytes(b"a\nc");
        let b = store.insert_after(store.first(), b"b").unwrap();
        assert_eq!(texts(&store), vec!["a", "b", "c"]);
        assert_eq!(store.prev(b), Some(store.first()));
        assert_eq!(store.next(b), Some(store.last()));
    }

    #[test]
    fn remove_makes_handle_stale() {
        let mut store = LineStore::from_bytes(b"a\nb\nc");
        let b = store.nth(1).unwrap();
        store.remove(b).unwrap();
        assert!(!store.contains(b));
        assert!(matches!(store.line(b), Err(Error::StaleLine)));
        assert_eq!(texts(&store), vec!["a", "c"]);
    }

    #[test]
    fn reused_slot_does_not_revive_old_handle() {
        let mut store = LineStore::from_bytes(b"a\nb");
        let b = store.last();
        store.remove(b).unwrap();
        let fresh = store.insert_after(store.first(), b"x").unwrap();
        assert_ne!(fresh, b);
        assert!(!store.contains(b));
        assert!(store.contains(fresh));
    }

    #[test]
    fn cannot_remove_only_line() {
        let mut store = LineStore::new();
        assert!(matches!(store.remove(store.first()), Err(Error::LastLine)));
    }

    #[test]
    fn removing_first_and_last_updates_ends() {
        let mut store = LineStore::from_bytes(b"a\nb\nc");
        store.remove(store.first()).unwrap();
        assert_eq!(texts(&store), vec!["b", "c"]);
        store.remove(store.last()).unwrap();
        assert_eq!(texts(&store), vec!["b"]);
        assert_eq!(store.first(), store.last());
    }

    #[test]
    fn split_and_join() {
        let mut store = LineStore::from_bytes(b"helloworld");
        let tail = store.split(store.first(), 5).unwrap();
        assert_eq!(texts(&store), vec!["hello", "world"]);
        assert_eq!(store.last(), tail);

        let removed = store.join(store.first()).unwrap();
        assert_eq!(removed, Some(tail));
        assert_eq!(texts(&store), vec!["helloworld"]);
        assert_eq!(store.join(store.first()).unwrap(), None);
    }

    #[test]
    fn to_bytes_round_trips() {
        let text = b"one\n\tTwo\n\nthree";
        assert_eq!(LineStore::from_bytes(text).to_bytes(), text.to_vec());
    }

    #[test]
    fn index_of_walks_from_top() {
        let store = LineStore::from_bytes(b"a\nb\nc");
        assert_eq!(store.index_of(store.last()), Some(2));
        assert_eq!(store.nth(5), None);
    }
}
