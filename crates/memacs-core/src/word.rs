//! Word motions and word queries.
//!
//! A word is a run of word characters as defined by the `wordchars` option
//! (default `A-Za-z0-9_`). The implied newline at the end of each line is
//! never a word character, so line ends separate words.
//!
//! | Function       | Moves to                                         |
//! |----------------|--------------------------------------------------|
//! | [`forw_word`]  | start of the `n`th following word                |
//! | [`back_word`]  | start of the `n`th preceding word                |
//! | [`end_word`]   | just past the end of the `n`th word              |
//! | [`get_word`]   | (query) text of the previous, current or next word |
//!
//! Backward from inside a word, the partial word counts as the first word:
//! one step lands at the start of the current word, two at the start of the
//! word before it. A motion that runs into a buffer edge stops there and
//! reports [`Flow::Boundary`].

use crate::error::{Flow, Outcome, invalid_arg};
use crate::line::LineStore;
use crate::nav::{count, move_char};
use crate::options::WordChars;
use crate::point::Point;

/// True when the character at `point` is a word character.
#[inline]
#[must_use]
pub fn in_word(lines: &LineStore, point: Point, word_chars: &WordChars) -> bool {
    word_chars.contains(lines.line_char(point.line, point.offset))
}

/// Move forward `n` words. A negative `n` moves backward.
pub fn forw_word(lines: &LineStore, point: &mut Point, n: i64, word_chars: &WordChars) -> Flow {
    if n < 0 {
        return back_word(lines, point, n.saturating_neg(), word_chars);
    }
    for _ in 0..count(n) {
        while in_word(lines, *point, word_chars) {
            if move_char(lines, point, 1).is_boundary() {
                return Flow::Boundary;
            }
        }
        while !in_word(lines, *point, word_chars) {
            if move_char(lines, point, 1).is_boundary() {
                return Flow::Boundary;
            }
        }
    }
    Flow::Done(())
}

/// Move backward `n` words. A negative `n` moves forward.
pub fn back_word(lines: &LineStore, point: &mut Point, n: i64, word_chars: &WordChars) -> Flow {
    if n < 0 {
        return forw_word(lines, point, n.saturating_neg(), word_chars);
    }
    for _ in 0..count(n) {
        if move_char(lines, point, -1).is_boundary() {
            return Flow::Boundary;
        }
        while !in_word(lines, *point, word_chars) {
            if move_char(lines, point, -1).is_boundary() {
                return Flow::Boundary;
            }
        }
        // Back over the word. Reaching the start of the buffer here is
        // still the start of a word.
        loop {
            if move_char(lines, point, -1).is_boundary() {
                break;
            }
            if !in_word(lines, *point, word_chars) {
                let _ = move_char(lines, point, 1);
                break;
            }
        }
    }
    Flow::Done(())
}

/// Move to the end of the `n`th word.
///
/// # Errors
///
/// [`Error::InvalidArgument`](crate::Error::InvalidArgument) for a negative
/// count.
pub fn end_word(lines: &LineStore, point: &mut Point, n: i64, word_chars: &WordChars) -> Outcome {
    if n < 0 {
        return Err(invalid_arg!("endWord count must not be negative ({n})"));
    }
    let total = count(n);
    for i in 0..total {
        while !in_word(lines, *point, word_chars) {
            if move_char(lines, point, 1).is_boundary() {
                return Ok(Flow::Boundary);
            }
        }
        while in_word(lines, *point, word_chars) {
            if move_char(lines, point, 1).is_boundary() {
                // End of buffer inside the final word is the end of that word.
                return Ok(if i + 1 == total { Flow::Done(()) } else { Flow::Boundary });
            }
        }
    }
    Ok(Flow::Done(()))
}

/// Text of a word on point's line.
///
/// | `n`   | Word     | Point afterwards        |
/// |-------|----------|-------------------------|
/// | `< 0` | previous | unchanged               |
/// | `0`   | current  | end of the word         |
/// | `> 0` | next     | end of the word         |
///
/// Returns `None`, with point unchanged, when there is no such word.
#[must_use]
pub fn get_word(lines: &LineStore, point: &mut Point, n: i64, word_chars: &WordChars) -> Option<Vec<u8>> {
    let text = lines.get(point.line)?.text();
    let is_word = |i: usize| i < text.len() && word_chars.contains(text[i]);
    let word_start = |mut i: usize| {
        while i > 0 && is_word(i - 1) {
            i -= 1;
        }
        i
    };

    let start = match n {
        0 => {
            if !is_word(point.offset) {
                return None;
            }
            word_start(point.offset)
        }
        1.. => {
            let mut i = point.offset;
            while is_word(i) {
                i += 1;
            }
            while i < text.len() && !is_word(i) {
                i += 1;
            }
            if i == text.len() {
                return None;
            }
            i
        }
        _ => {
            let mut i = point.offset.min(text.len());
            if is_word(i) {
                i = word_start(i);
            }
            while i > 0 && !is_word(i - 1) {
                i -= 1;
            }
            if i == 0 {
                return None;
            }
            word_start(i)
        }
    };
    let mut end = start;
    while is_word(end) {
        end += 1;
    }
    if n >= 0 {
        point.offset = end;
    }
    Some(text[start..end].to_vec())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
