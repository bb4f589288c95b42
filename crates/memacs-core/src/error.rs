//! Status types shared by every navigation primitive.
//!
//! A primitive can end three ways, and call sites must tell them apart:
//!
//! | Outcome                  | Type                      | Meaning                          |
//! |--------------------------|---------------------------|----------------------------------|
//! | `Ok(Flow::Done(v))`      | success                   | the move happened                |
//! | `Ok(Flow::Boundary)`     | expected, not an error    | the move ran into a buffer edge  |
//! | `Err(Error)`             | real failure              | bad argument, stale handle, ...  |
//!
//! A boundary hit always leaves the point at a well-defined edge position,
//! so interactive callers beep and scripts see a plain `false`.

use std::io;

use thiserror::Error;

/// Result of a navigation primitive that can run into a buffer edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Flow<T = ()> {
    /// The operation completed.
    Done(T),
    /// The operation stopped at the beginning or end of the buffer.
    Boundary,
}

impl<T> Flow<T> {
    /// True for [`Flow::Boundary`].
    #[inline]
    pub const fn is_boundary(&self) -> bool {
        matches!(self, Self::Boundary)
    }

    /// True for [`Flow::Done`].
    #[inline]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// The completed value, if any.
    #[inline]
    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(v) => Some(v),
            Self::Boundary => None,
        }
    }

    /// Map the completed value.
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Flow<U> {
        match self {
            Self::Done(v) => Flow::Done(f(v)),
            Self::Boundary => Flow::Boundary,
        }
    }
}

/// Every navigation primitive returns this.
pub type Outcome<T = ()> = Result<Flow<T>, Error>;

/// Shorthand for a completed `Outcome`.
#[inline]
#[allow(clippy::unnecessary_wraps)]
pub const fn done<T>(v: T) -> Outcome<T> {
    Ok(Flow::Done(v))
}

/// Shorthand for a boundary `Outcome`.
#[inline]
#[allow(clippy::unnecessary_wraps)]
pub const fn boundary<T>() -> Outcome<T> {
    Ok(Flow::Boundary)
}

/// Failures of the editing core.
#[derive(Debug, Error)]
pub enum Error {
    /// A mark identifier outside the printable range, or a reserved one.
    #[error("invalid mark '{0}'")]
    InvalidMark(char),

    /// The mark does not exist in this buffer.
    #[error("no mark '{0}' in this buffer")]
    MarkNotFound(char),

    /// The mark exists but has no position yet.
    #[error("mark '{0}' not set")]
    MarkNotSet(char),

    /// The region mark can never be deleted.
    #[error("cannot delete mark '{0}'")]
    ProtectedMark(char),

    /// No matching fence before the buffer edge. Reported silently.
    #[error("no matching fence")]
    FenceNotFound,

    /// The character at point (or given) is not one of `(){}[]<>`.
    #[error("'{0}' is not a fence character")]
    NotAFence(char),

    /// A line handle refers to a line that has been removed.
    #[error("stale line handle")]
    StaleLine,

    /// The only line of a buffer cannot be removed.
    #[error("cannot remove the last line of a buffer")]
    LastLine,

    /// A command argument or repeat count is out of range.
    #[error("{0}")]
    InvalidArgument(String),

    /// An unknown command name.
    #[error("no such command '{0}'")]
    UnknownCommand(String),

    /// A `set` directive names an unknown option or carries a bad value.
    #[error("{0}")]
    Option(String),

    /// The screen collaborator failed to redraw.
    #[error("screen update failed: {0}")]
    Screen(#[from] io::Error),
}

impl Error {
    /// Text for the message line, or `None` when the failure is silent.
    ///
    /// Interactive callers beep on a silent failure; scripts just see the
    /// failed status.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::FenceNotFound => None,
            other => Some(other.to_string()),
        }
    }
}

/// Build an [`Error::InvalidArgument`] from format arguments.
macro_rules! invalid_arg {
    ($($arg:tt)*) => {
        $crate::error::Error::InvalidArgument(format!($($arg)*))
    };
}

pub(crate) use invalid_arg;
