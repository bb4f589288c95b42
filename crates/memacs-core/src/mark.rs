//! Mark registry — named positions in a buffer.
//!
//! Each buffer keeps its marks in insertion order. The first entry is always
//! the **region mark** `.`, which bounds the region together with point and
//! can never be deleted. A mark moves through three states:
//!
//! ```text
//! absent ──create──▶ inactive (no point) ──set──▶ active
//!    ▲                                              │
//!    └──────────────────── delete ◀─────────────────┘
//! ```
//!
//! Lookup is a linear scan by identifier. User-visible identifiers are the
//! printable characters `'!'..='}'`, minus the region mark and the work mark
//! `` ` `` which the editor keeps for itself.

use bitflags::bitflags;
use tracing::debug;

use crate::error::Error;
use crate::point::Point;

/// Identifier of the region mark.
pub const REGION_MARK: char = '.';

/// Identifier of the internal work mark.
pub const WORK_MARK: char = '`';

bitflags! {
    /// Options for [`MarkRegistry::find`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct MarkFlags: u8 {
        /// Report an absent mark as `Ok(None)` instead of an error.
        const QUERY   = 0b001;
        /// Create the mark if it is absent.
        const CREATE  = 0b010;
        /// Treat an inactive mark as absent.
        const VISIBLE = 0b100;
    }
}

/// Check a user-supplied mark identifier.
///
/// # Errors
///
/// Returns [`Error::InvalidMark`] for characters outside `'!'..='}'` and for
/// the two reserved identifiers.
pub const fn validate_id(id: char) -> Result<char, Error> {
    match id {
        REGION_MARK | WORK_MARK => Err(Error::InvalidMark(id)),
        '!'..='}' => Ok(id),
        _ => Err(Error::InvalidMark(id)),
    }
}

// ---------------------------------------------------------------------------
// Mark
// ---------------------------------------------------------------------------

/// A named point plus the window row to frame it at when visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    id: char,
    point: Option<Point>,
    reframe_row: usize,
}

impl Mark {
    const fn inactive(id: char) -> Self {
        Self {
            id,
            point: None,
            reframe_row: 0,
        }
    }

    /// The identifier.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> char {
        self.id
    }

    /// The marked position, `None` while inactive.
    #[inline]
    #[must_use]
    pub const fn point(&self) -> Option<Point> {
        self.point
    }

    /// Window row recorded when the mark was set.
    #[inline]
    #[must_use]
    pub const fn reframe_row(&self) -> usize {
        self.reframe_row
    }

    /// True once a point has been assigned.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.point.is_some()
    }

    /// Assign a point and reframe row.
    pub const fn set(&mut self, point: Point, reframe_row: usize) {
        self.point = Some(point);
        self.reframe_row = reframe_row;
    }

    /// Return to the inactive state.
    pub const fn clear(&mut self) {
        self.point = None;
    }
}

// ---------------------------------------------------------------------------
// MarkRegistry
// ---------------------------------------------------------------------------

/// All marks of one buffer, in insertion order, region mark first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkRegistry {
    marks: Vec<Mark>,
}

impl MarkRegistry {
    /// A registry holding only the inactive region mark.
    #[must_use]
    pub fn new() -> Self {
        Self {
            marks: vec![Mark::inactive(REGION_MARK)],
        }
    }

    /// Number of marks, region mark included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Never true: the region mark always exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Marks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter()
    }

    /// Look up a mark without creating it.
    #[must_use]
    pub fn get(&self, id: char) -> Option<&Mark> {
        self.marks.iter().find(|m| m.id == id)
    }

    /// The region mark.
    #[must_use]
    pub fn region_mark(&self) -> &Mark {
        &self.marks[0]
    }

    /// Query-or-create lookup.
    ///
    /// | Found      | Flags                | Result                     |
    /// |------------|----------------------|----------------------------|
    /// | active     | any                  | `Some(mark)`               |
    /// | inactive   | no `VISIBLE`         | `Some(mark)`               |
    /// | inactive   | `VISIBLE` + `CREATE` | `Some(mark)`               |
    /// | inactive   | `VISIBLE` + `QUERY`  | `None`                     |
    /// | inactive   | `VISIBLE` only       | `Err(MarkNotSet)`          |
    /// | absent     | `CREATE`             | `Some(new inactive mark)`  |
    /// | absent     | `QUERY`              | `None`                     |
    /// | absent     | neither              | `Err(MarkNotFound)`        |
    ///
    /// `VISIBLE` does not fold an inactive mark into the absent case: without
    /// `QUERY` it fails with `MarkNotSet`, where an absent mark fails with
    /// `MarkNotFound`.
    ///
    /// # Errors
    ///
    /// [`Error::MarkNotFound`] and [`Error::MarkNotSet`] as in the table.
    pub fn find(&mut self, id: char, flags: MarkFlags) -> Result<Option<&mut Mark>, Error> {
        match self.marks.iter().position(|m| m.id == id) {
            Some(i) => {
                let inactive = !self.marks[i].is_active();
                if inactive && flags.contains(MarkFlags::VISIBLE) && !flags.contains(MarkFlags::CREATE) {
                    return if flags.contains(MarkFlags::QUERY) {
                        Ok(None)
                    } else {
                        Err(Error::MarkNotSet(id))
                    };
                }
                Ok(Some(&mut self.marks[i]))
            }
            None if flags.contains(MarkFlags::CREATE) => {
                debug!(mark = %id, "mark created");
                self.marks.push(Mark::inactive(id));
                Ok(self.marks.last_mut())
            }
            None if flags.contains(MarkFlags::QUERY) => Ok(None),
            None => Err(Error::MarkNotFound(id)),
        }
    }

    /// Delete a mark.
    ///
    /// # Errors
    ///
    /// [`Error::ProtectedMark`] for the region mark, whatever its state;
    /// [`Error::MarkNotFound`] if the mark does not exist.
    pub fn delete(&mut self, id: char) -> Result<(), Error> {
        if id == REGION_MARK {
            return Err(Error::ProtectedMark(id));
        }
        let i = self
            .marks
            .iter()
            .position(|m| m.id == id)
            .ok_or(Error::MarkNotFound(id))?;
        self.marks.remove(i);
        debug!(mark = %id, "mark deleted");
        Ok(())
    }

    /// Delete every mark except the region mark, which becomes inactive.
    pub fn clear(&mut self) {
        self.marks.truncate(1);
        self.marks[0].clear();
        debug!("all marks cleared");
    }

    /// Points of all active marks, for handle repair.
    pub fn points_mut(&mut self) -> impl Iterator<Item = &mut Point> {
        self.marks.iter_mut().filter_map(|m| m.point.as_mut())
    }
}

impl Default for MarkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
