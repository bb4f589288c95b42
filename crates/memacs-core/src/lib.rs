//! # memacs-core — Editing core for memacs
//!
//! The text model and navigation engine of an Emacs-style editor:
//!
//! - **[`line`]** — `LineStore`, an arena of byte lines linked in buffer order
//! - **[`point`]** — `Point` (line handle + offset) and `Region`
//! - **[`buffer`]** — `Buffer`: lines, marks, and handle repair on line edits
//! - **[`mark`]** — the per-buffer mark registry
//! - **[`nav`]** — character, line and tab-stop movement, goal columns
//! - **[`word`]** — word motions and word queries
//! - **[`fence`]** — `()`, `{}`, `[]`, `<>` matching
//! - **[`window`]** — `Face`, `Window`, redraw flags and the `Screen` seam
//! - **[`options`]** — `set` directives and the settings navigation reads
//! - **[`session`]** — a buffer in a window with its navigation state
//! - **[`command`]** — the command table and command-line parser
//!
//! Movement never fails at a buffer edge: primitives return
//! [`Flow::Boundary`] and leave point on the edge. Real failures are
//! [`Error`]s.

pub mod buffer;
pub mod command;
pub mod error;
pub mod fence;
pub mod line;
pub mod mark;
pub mod nav;
pub mod options;
pub mod point;
pub mod session;
pub mod window;
pub mod word;

pub use buffer::Buffer;
pub use error::{Error, Flow, Outcome};
pub use session::Session;
