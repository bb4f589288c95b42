//! Command table and command-line parsing.
//!
//! Every editing command has the same shape:
//!
//! ```text
//! fn(&mut Session, result: &mut Value, repeat: Repeat, args: &[Value]) -> Outcome
//! ```
//!
//! `repeat` distinguishes "no count given" ([`Repeat::Default`]) from an
//! explicit count, including zero. A negative count reverses commands that
//! have a reverse (`-2 forwWord` moves back two words). Query commands leave
//! their answer in `result`.
//!
//! # Command lines
//!
//! | Line                     | Meaning                                  |
//! |--------------------------|------------------------------------------|
//! | `forwWord`               | run with the default count               |
//! | `3 forwWord`             | run with count 3                         |
//! | `-1 forwLine`            | run with count -1                        |
//! | `setMark a`              | run with argument `"a"`                  |
//! | `gotoFence "}"`          | quoted string argument                   |
//! | `set htabsize=4`         | option directive (see [`options`])       |
//! | `# comment` or blank     | nothing                                  |
//!
//! Arguments are `nil`, `true`, `false`, integers, bare words or
//! double-quoted strings (`\"` and `\\` escapes).
//!
//! [`options`]: crate::options

use std::fmt;

use tracing::debug;

use crate::error::{Error, Flow, Outcome, done, invalid_arg};
use crate::session::Session;

// ---------------------------------------------------------------------------
// Repeat and Value
// ---------------------------------------------------------------------------

/// A command's repeat count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Repeat {
    /// No count given.
    #[default]
    Default,
    /// An explicit count, possibly zero or negative.
    Count(i64),
}

impl Repeat {
    /// The count, or `default` when none was given.
    #[inline]
    #[must_use]
    pub const fn or(self, default: i64) -> i64 {
        match self {
            Self::Default => default,
            Self::Count(n) => n,
        }
    }

    /// True when no count was given.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

/// A command argument or result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Str(String),
}

impl Value {
    /// The argument as a single character: a one-character string, or an
    /// integer character code.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for anything else.
    pub fn as_char(&self) -> Result<char, Error> {
        match self {
            Self::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(invalid_arg!("expected a single character, got \"{s}\"")),
                }
            }
            Self::Int(n) => u32::try_from(*n)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| invalid_arg!("invalid character code {n}")),
            other => Err(invalid_arg!("expected a character, got {other}")),
        }
    }

    /// The argument as an integer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if it is not an integer.
    pub fn as_int(&self) -> Result<i64, Error> {
        match self {
            Self::Int(n) => Ok(*n),
            other => Err(invalid_arg!("expected an integer, got {other}")),
        }
    }

    /// The argument as a fence byte.
    fn as_fence(&self) -> Result<u8, Error> {
        let c = self.as_char()?;
        u8::try_from(c).map_err(|_| Error::NotAFence(c))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Command table
// ---------------------------------------------------------------------------

/// The uniform command signature.
pub type CommandFn = fn(&mut Session, &mut Value, Repeat, &[Value]) -> Outcome;

/// One entry of the command table.
#[derive(Clone, Copy)]
pub struct CommandDef {
    pub name: &'static str,
    pub func: CommandFn,
    pub min_args: usize,
    pub max_args: usize,
    pub help: &'static str,
}

impl fmt::Debug for CommandDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDef")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish_non_exhaustive()
    }
}

macro_rules! cmd {
    ($name:literal, $func:expr, $min:literal, $max:literal, $help:literal) => {
        CommandDef {
            name: $name,
            func: $func,
            min_args: $min,
            max_args: $max,
            help: $help,
        }
    };
}

static COMMANDS: &[CommandDef] = &[
    cmd!("backChar", back_char, 0, 0, "Move backward [n] characters"),
    cmd!("backLine", back_line, 0, 0, "Move up [n] lines"),
    cmd!("backPage", back_page, 0, 0, "Scroll backward [n] pages"),
    cmd!("backTab", back_tab, 0, 0, "Move backward [n] tab stops"),
    cmd!("backWord", back_word, 0, 0, "Move backward [n] words"),
    cmd!("beginBuf", begin_buf, 0, 0, "Move to beginning of buffer"),
    cmd!("beginLine", begin_line, 0, 0, "Move to beginning of line"),
    cmd!("beginText", begin_text, 0, 0, "Move to first non-blank of line"),
    cmd!("deleteLine", delete_line, 0, 0, "Delete [n] lines at point"),
    cmd!("deleteMark", delete_mark, 0, 1, "Delete mark c, or all marks with n"),
    cmd!("endBuf", end_buf, 0, 0, "Move to end of buffer"),
    cmd!("endLine", end_line, 0, 0, "Move to end of line"),
    cmd!("endWord", end_word, 0, 0, "Move to end of [n]th word"),
    cmd!("forwChar", forw_char, 0, 0, "Move forward [n] characters"),
    cmd!("forwLine", forw_line, 0, 0, "Move down [n] lines"),
    cmd!("forwPage", forw_page, 0, 0, "Scroll forward [n] pages"),
    cmd!("forwTab", forw_tab, 0, 0, "Move forward [n] tab stops"),
    cmd!("forwWord", forw_word, 0, 0, "Move forward [n] words"),
    cmd!("getWord", get_word, 0, 0, "Return previous (n<0), current or next (n>0) word"),
    cmd!("gotoFence", goto_fence, 0, 1, "Move to matching fence"),
    cmd!("gotoLine", goto_line, 0, 1, "Move to line number (argument or n)"),
    cmd!("gotoMark", goto_mark, 0, 1, "Move to mark c (default region mark)"),
    cmd!("inWord", in_word, 0, 0, "Return true if point is in a word"),
    cmd!("joinLines", join_lines, 0, 0, "Join line with the next [n] lines"),
    cmd!("markBuf", mark_buf, 0, 0, "Mark whole buffer"),
    cmd!("newline", newline, 0, 0, "Break line at point [n] times"),
    cmd!("regionText", region_text, 0, 0, "Return text between point and region mark"),
    cmd!("setMark", set_mark, 0, 1, "Set mark c (default region mark) at point"),
    cmd!("showFence", show_fence, 0, 1, "Briefly show matching fence"),
    cmd!("swapMark", swap_mark, 0, 1, "Swap point and mark c (default region mark)"),
];

/// All commands, sorted by name.
#[must_use]
pub fn commands() -> &'static [CommandDef] {
    COMMANDS
}

/// Look up a command by name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static CommandDef> {
    COMMANDS
        .binary_search_by(|def| def.name.cmp(name))
        .ok()
        .map(|i| &COMMANDS[i])
}

/// Run a command by name. Returns the value the command left in its result
/// slot, `Nil` unless it is a query.
///
/// # Errors
///
/// [`Error::UnknownCommand`], [`Error::InvalidArgument`] for a wrong number
/// of arguments, or whatever the command itself reports.
pub fn exec(session: &mut Session, name: &str, repeat: Repeat, args: &[Value]) -> Outcome<Value> {
    let def = lookup(name).ok_or_else(|| Error::UnknownCommand(name.to_string()))?;
    if args.len() < def.min_args || args.len() > def.max_args {
        return Err(invalid_arg!(
            "{name} takes {}..={} arguments, got {}",
            def.min_args,
            def.max_args,
            args.len()
        ));
    }
    debug!(command = name, ?repeat, ?args, "exec");
    let mut result = Value::Nil;
    let flow = (def.func)(session, &mut result, repeat, args)?;
    Ok(flow.map(|()| result))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn mark_arg(args: &[Value]) -> Result<Option<char>, Error> {
    args.first().map(Value::as_char).transpose()
}

fn fence_arg(args: &[Value]) -> Result<Option<u8>, Error> {
    args.first().map(Value::as_fence).transpose()
}

/// Run `f` `n` times, stopping at the first boundary.
fn repeat_edit(n: i64, mut f: impl FnMut() -> Outcome) -> Outcome {
    if n < 0 {
        return Err(invalid_arg!("count must not be negative ({n})"));
    }
    for _ in 0..n {
        if f()?.is_boundary() {
            return Ok(Flow::Boundary);
        }
    }
    done(())
}

fn forw_char(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    s.forw_char(n.or(1))
}

fn back_char(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    s.back_char(n.or(1))
}

fn forw_line(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    s.forw_line(n.or(1))
}

fn back_line(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    s.back_line(n.or(1))
}

fn forw_word(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    s.forw_word(n.or(1))
}

fn back_word(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    s.back_word(n.or(1))
}

fn end_word(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    s.end_word(n.or(1))
}

fn forw_tab(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    s.forw_tab(n.or(1))
}

fn back_tab(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    s.back_tab(n.or(1))
}

fn begin_line(s: &mut Session, _: &mut Value, _: Repeat, _: &[Value]) -> Outcome {
    s.begin_line()
}

fn end_line(s: &mut Session, _: &mut Value, _: Repeat, _: &[Value]) -> Outcome {
    s.end_line()
}

fn begin_text(s: &mut Session, _: &mut Value, _: Repeat, _: &[Value]) -> Outcome {
    s.begin_text()
}

fn begin_buf(s: &mut Session, _: &mut Value, _: Repeat, _: &[Value]) -> Outcome {
    s.begin_buf()
}

fn end_buf(s: &mut Session, _: &mut Value, _: Repeat, _: &[Value]) -> Outcome {
    s.end_buf()
}

fn goto_line(s: &mut Session, _: &mut Value, n: Repeat, args: &[Value]) -> Outcome {
    let line = match (args.first(), n) {
        (Some(v), _) => v.as_int()?,
        (None, Repeat::Count(n)) => n,
        (None, Repeat::Default) => return Err(invalid_arg!("gotoLine needs a line number")),
    };
    s.goto_line(line)
}

fn forw_page(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    s.forw_page(n.or(1))
}

fn back_page(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    s.back_page(n.or(1))
}

fn goto_fence(s: &mut Session, _: &mut Value, _: Repeat, args: &[Value]) -> Outcome {
    s.goto_fence(fence_arg(args)?)
}

fn show_fence(s: &mut Session, rv: &mut Value, _: Repeat, args: &[Value]) -> Outcome {
    *rv = Value::Bool(s.show_fence(fence_arg(args)?, true)?);
    done(())
}

fn set_mark(s: &mut Session, _: &mut Value, _: Repeat, args: &[Value]) -> Outcome {
    s.set_mark(mark_arg(args)?)?;
    done(())
}

fn goto_mark(s: &mut Session, _: &mut Value, _: Repeat, args: &[Value]) -> Outcome {
    s.goto_mark(mark_arg(args)?)?;
    done(())
}

fn swap_mark(s: &mut Session, _: &mut Value, _: Repeat, args: &[Value]) -> Outcome {
    s.swap_mark(mark_arg(args)?)?;
    done(())
}

fn delete_mark(s: &mut Session, _: &mut Value, n: Repeat, args: &[Value]) -> Outcome {
    match (mark_arg(args)?, n) {
        (Some(id), _) => s.delete_mark(id)?,
        (None, Repeat::Count(_)) => s.delete_all_marks(),
        (None, Repeat::Default) => return Err(invalid_arg!("deleteMark needs a mark")),
    }
    done(())
}

fn mark_buf(s: &mut Session, _: &mut Value, _: Repeat, _: &[Value]) -> Outcome {
    s.mark_buf()?;
    done(())
}

fn region_text(s: &mut Session, rv: &mut Value, _: Repeat, _: &[Value]) -> Outcome {
    *rv = Value::Str(s.region_text()?);
    done(())
}

fn get_word(s: &mut Session, rv: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    *rv = s.get_word(n.or(0)).map_or(Value::Nil, Value::Str);
    done(())
}

fn in_word(s: &mut Session, rv: &mut Value, _: Repeat, _: &[Value]) -> Outcome {
    *rv = Value::Bool(s.in_word());
    done(())
}

fn newline(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    repeat_edit(n.or(1), || s.split_line().map(Flow::Done))
}

fn join_lines(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    repeat_edit(n.or(1), || s.join_line())
}

fn delete_line(s: &mut Session, _: &mut Value, n: Repeat, _: &[Value]) -> Outcome {
    repeat_edit(n.or(1), || s.delete_line().map(Flow::Done))
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Blank line or comment.
    Empty,
    /// `set ...` — the text after `set`.
    Set(String),
    /// A command invocation.
    Command {
        repeat: Repeat,
        name: String,
        args: Vec<Value>,
    },
}

/// Parse one command line.
///
/// # Errors
///
/// [`Error::InvalidArgument`] for an unterminated string or a count with no
/// command after it.
pub fn parse_line(input: &str) -> Result<Line, Error> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Line::Empty);
    }
    if trimmed == "set" {
        return Ok(Line::Set(String::new()));
    }
    if let Some(rest) = trimmed.strip_prefix("set ") {
        return Ok(Line::Set(rest.trim().to_string()));
    }

    let mut tokens = tokenize(trimmed)?.into_iter().peekable();
    let repeat = match tokens.peek() {
        Some(Token::Bare(t)) => t.parse().map_or(Repeat::Default, Repeat::Count),
        _ => Repeat::Default,
    };
    if !repeat.is_default() {
        tokens.next();
    }
    let name = match tokens.next() {
        Some(Token::Bare(name)) => name,
        Some(Token::Quoted(s)) => return Err(invalid_arg!("expected a command name, got \"{s}\"")),
        None => return Err(invalid_arg!("count with no command")),
    };
    let args = tokens.map(Token::into_value).collect();
    Ok(Line::Command { repeat, name, args })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Bare(String),
    Quoted(String),
}

impl Token {
    fn into_value(self) -> Value {
        match self {
            Self::Quoted(s) => Value::Str(s),
            Self::Bare(s) => match s.as_str() {
                "nil" => Value::Nil,
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => s.parse().map_or(Value::Str(s), Value::Int),
            },
        }
    }
}

/// Split on whitespace, keeping double-quoted strings whole.
fn tokenize(input: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' {
            chars.next();
            let mut s = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(e) => s.push(e),
                        None => return Err(invalid_arg!("unterminated string")),
                    },
                    Some(ch) => s.push(ch),
                    None => return Err(invalid_arg!("unterminated string")),
                }
            }
            tokens.push(Token::Quoted(s));
        } else {
            let mut s = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                s.push(ch);
                chars.next();
            }
            tokens.push(Token::Bare(s));
        }
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
