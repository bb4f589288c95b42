//! Editor options — the `set` system.
//!
//! Parses `set` directives and holds the option values that navigation reads:
//! tab sizes, the word-character table and the fence display pause.
//!
//! # Supported syntax
//!
//! | Syntax           | Effect                        |
//! |------------------|-------------------------------|
//! | `set option`     | Enable boolean / show value   |
//! | `set nooption`   | Disable boolean               |
//! | `set option!`    | Toggle boolean                |
//! | `set option?`    | Query current value           |
//! | `set option=V`   | Assign value                  |
//! | `set`            | Show changed options          |
//! | `set all`        | Show all options              |
//!
//! # Option names
//!
//! | Full name    | Abbrev | Type    | Default       |
//! |--------------|--------|---------|---------------|
//! | `htabsize`   | `ht`   | integer | 8             |
//! | `stabsize`   | `st`   | integer | 0 (off)       |
//! | `wordchars`  | `wc`   | class   | `A-Za-z0-9_`  |
//! | `fencepause` | `fp`   | integer | 26 (1/100 s)  |
//! | `showfence`  | `sf`   | bool    | true          |

use std::fmt;

use regex::bytes::Regex;
use tracing::debug;

use crate::error::Error;

/// Default hard tab size.
pub const DEFAULT_HTAB: usize = 8;

/// Default word-character class.
pub const DEFAULT_WORD_CHARS: &str = "A-Za-z0-9_";

/// Default pause, in centiseconds, when showing a matching fence.
pub const DEFAULT_FENCE_PAUSE: u32 = 26;

/// Largest accepted tab size.
const MAX_TAB: usize = 240;

// ---------------------------------------------------------------------------
// SetDirective
// ---------------------------------------------------------------------------

/// A parsed `set` directive.
///
/// Produced by [`parse_set`] from the arguments to `set`. [`Settings::apply`]
/// carries them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `set option` — enable a boolean option.
    On(String),

    /// `set nooption` — disable a boolean option.
    Off(String),

    /// `set option!` — toggle a boolean option.
    Toggle(String),

    /// `set option?` — query the current value.
    Query(String),

    /// `set option=value` — assign a value.
    Assign(String, String),

    /// `set` with no arguments — show changed options.
    ShowChanged,

    /// `set all` — show all options.
    ShowAll,
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    matches!(name, "showfence" | "sf")
}

/// Returns `true` if `name` is an option that takes a value.
#[must_use]
pub fn is_value_option(name: &str) -> bool {
    matches!(
        name,
        "htabsize" | "ht" | "stabsize" | "st" | "wordchars" | "wc" | "fencepause" | "fp"
    )
}

/// Parse the full `set` arguments string into directives.
///
/// Multiple space-separated arguments are supported (e.g., `set ht=4 fp=10`).
/// An empty argument string produces [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    let trimmed = args.trim();
    if trimmed.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    trimmed.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single `set` argument into a directive.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }

    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }

    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }

    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }

    // `nooption` only for known booleans, so a future option starting with
    // "no" is not mis-parsed.
    if let Some(name) = arg.strip_prefix("no") {
        if !name.is_empty() && is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }

    // Bare value option name = query its value.
    if is_value_option(arg) {
        return SetDirective::Query(arg.to_string());
    }

    SetDirective::On(arg.to_string())
}

// ---------------------------------------------------------------------------
// WordChars
// ---------------------------------------------------------------------------

/// 256-entry lookup table of word characters.
///
/// Built from a regex character-class body such as `A-Za-z0-9_`. Every byte
/// value is tested once against the compiled class, so classification at
/// navigation time is a plain table lookup.
#[derive(Clone, PartialEq, Eq)]
pub struct WordChars {
    class: String,
    table: [bool; 256],
}

impl WordChars {
    /// Compile a character-class body into a table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Option`] if the class is empty or not a valid regex
    /// class.
    pub fn from_class(class: &str) -> Result<Self, Error> {
        if class.is_empty() {
            return Err(Error::Option("word character class is empty".into()));
        }
        let re = Regex::new(&format!("(?-u)^[{class}]$"))
            .map_err(|e| Error::Option(format!("invalid word characters '{class}': {e}")))?;
        let mut table = [false; 256];
        for (byte, slot) in (0..=u8::MAX).zip(table.iter_mut()) {
            *slot = re.is_match(&[byte]);
        }
        Ok(Self {
            class: class.to_string(),
            table,
        })
    }

    /// True if `byte` is a word character.
    #[inline]
    #[must_use]
    pub const fn contains(&self, byte: u8) -> bool {
        self.table[byte as usize]
    }

    /// The class body the table was built from.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }
}

impl Default for WordChars {
    fn default() -> Self {
        let mut table = [false; 256];
        for (byte, slot) in (0..=u8::MAX).zip(table.iter_mut()) {
            *slot = byte.is_ascii_alphanumeric() || byte == b'_';
        }
        Self {
            class: DEFAULT_WORD_CHARS.to_string(),
            table,
        }
    }
}

impl fmt::Debug for WordChars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WordChars([{}])", self.class)
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Option values read by the navigation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Display width of a hard tab.
    pub htab_size: usize,
    /// Soft tab size. Zero means hard tabs are used.
    pub stab_size: usize,
    /// Word-character table.
    pub word_chars: WordChars,
    /// Centiseconds to show a matching fence.
    pub fence_pause: u32,
    /// Whether typing a closing fence briefly shows its partner.
    pub show_fence: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            htab_size: DEFAULT_HTAB,
            stab_size: 0,
            word_chars: WordChars::default(),
            fence_pause: DEFAULT_FENCE_PAUSE,
            show_fence: true,
        }
    }
}

impl Settings {
    /// The tab size used for tab-stop movement: soft if set, else hard.
    #[inline]
    #[must_use]
    pub const fn tab_size(&self) -> usize {
        if self.stab_size == 0 {
            self.htab_size
        } else {
            self.stab_size
        }
    }

    /// Carry out one directive.
    ///
    /// Returns the text to show on the message line, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Option`] for unknown names, type mismatches and out of
    /// range values. Settings are left unchanged on error.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>, Error> {
        match directive {
            SetDirective::ShowChanged => Ok(Some(self.describe(false))),
            SetDirective::ShowAll => Ok(Some(self.describe(true))),
            SetDirective::Query(name) => self.query(name).map(Some),
            SetDirective::On(name) => self.set_bool(name, |_| true),
            SetDirective::Off(name) => self.set_bool(name, |_| false),
            SetDirective::Toggle(name) => self.set_bool(name, |v| !v),
            SetDirective::Assign(name, value) => {
                self.assign(name, value)?;
                debug!(option = %name, %value, "option assigned");
                Ok(None)
            }
        }
    }

    fn query(&self, name: &str) -> Result<String, Error> {
        Ok(match name {
            "htabsize" | "ht" => format!("htabsize={}", self.htab_size),
            "stabsize" | "st" => format!("stabsize={}", self.stab_size),
            "wordchars" | "wc" => format!("wordchars={}", self.word_chars.class()),
            "fencepause" | "fp" => format!("fencepause={}", self.fence_pause),
            "showfence" | "sf" => format_bool("showfence", self.show_fence),
            _ => return Err(unknown(name)),
        })
    }

    fn set_bool(&mut self, name: &str, f: impl FnOnce(bool) -> bool) -> Result<Option<String>, Error> {
        match name {
            "showfence" | "sf" => {
                self.show_fence = f(self.show_fence);
                Ok(None)
            }
            _ if is_value_option(name) => {
                Err(Error::Option(format!("'{name}' is not a boolean option")))
            }
            _ => Err(unknown(name)),
        }
    }

    fn assign(&mut self, name: &str, value: &str) -> Result<(), Error> {
        match name {
            "htabsize" | "ht" => self.htab_size = parse_tab(name, value, 1)?,
            "stabsize" | "st" => self.stab_size = parse_tab(name, value, 0)?,
            "wordchars" | "wc" => self.word_chars = WordChars::from_class(value)?,
            "fencepause" | "fp" => {
                self.fence_pause = value
                    .parse()
                    .map_err(|_| Error::Option(format!("invalid number '{value}' for {name}")))?;
            }
            _ if is_bool_option(name) => {
                return Err(Error::Option(format!("'{name}' takes no value")));
            }
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    fn describe(&self, all: bool) -> String {
        let defaults = Self::default();
        let mut parts = Vec::new();
        if all || self.htab_size != defaults.htab_size {
            parts.push(format!("htabsize={}", self.htab_size));
        }
        if all || self.stab_size != defaults.stab_size {
            parts.push(format!("stabsize={}", self.stab_size));
        }
        if all || self.word_chars != defaults.word_chars {
            parts.push(format!("wordchars={}", self.word_chars.class()));
        }
        if all || self.fence_pause != defaults.fence_pause {
            parts.push(format!("fencepause={}", self.fence_pause));
        }
        if all || self.show_fence != defaults.show_fence {
            parts.push(format_bool("showfence", self.show_fence));
        }
        parts.join("  ")
    }
}

fn parse_tab(name: &str, value: &str, min: usize) -> Result<usize, Error> {
    let n: usize = value
        .parse()
        .map_err(|_| Error::Option(format!("invalid number '{value}' for {name}")))?;
    if n < min || n > MAX_TAB {
        return Err(Error::Option(format!(
            "{name} ({n}) must be between {min} and {MAX_TAB}"
        )));
    }
    Ok(n)
}

fn unknown(name: &str) -> Error {
    Error::Option(format!("unknown option: {name}"))
}

/// Format a boolean option for display.
///
/// Returns `"name"` when true, `"noname"` when false.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_set_arg ─────────────────────────────────────────────────────

    #[test]
    fn parse_boolean_forms() {
        assert_eq!(parse_set_arg("showfence"), SetDirective::On("showfence".into()));
        assert_eq!(parse_set_arg("nosf"), SetDirective::Off("sf".into()));
        assert_eq!(parse_set_arg("sf!"), SetDirective::Toggle("sf".into()));
    }

    #[test]
    fn parse_assign_and_query() {
        assert_eq!(
            parse_set_arg("ht=4"),
            SetDirective::Assign("ht".into(), "4".into())
        );
        assert_eq!(
            parse_set_arg("wordchars?"),
            SetDirective::Query("wordchars".into())
        );
        // Bare value option is a query, not an enable.
        assert_eq!(
            parse_set_arg("fencepause"),
            SetDirective::Query("fencepause".into())
        );
    }

    #[test]
    fn parse_assign_keeps_equals_in_value() {
        assert_eq!(
            parse_set_arg("wc=a-z="),
            SetDirective::Assign("wc".into(), "a-z=".into())
        );
    }

    #[test]
    fn parse_empty_and_all() {
        assert_eq!(parse_set(""), vec![SetDirective::ShowChanged]);
        assert_eq!(parse_set("  all "), vec![SetDirective::ShowAll]);
        assert_eq!(parse_set("ht=4 st=2").len(), 2);
    }

    // ── WordChars ─────────────────────────────────────────────────────────

    #[test]
    fn default_word_chars() {
        let wc = WordChars::default();
        assert!(wc.contains(b'a'));
        assert!(wc.contains(b'Z'));
        assert!(wc.contains(b'7'));
        assert!(wc.contains(b'_'));
        assert!(!wc.contains(b' '));
        assert!(!wc.contains(b'-'));
        assert!(!wc.contains(b'\n'));
        assert!(!wc.contains(0xE9));
    }

    #[test]
    fn compiled_default_matches_builtin() {
        assert_eq!(
            WordChars::from_class(DEFAULT_WORD_CHARS).unwrap(),
            WordChars::default()
        );
    }

    #[test]
    fn custom_word_chars() {
        let wc = WordChars::from_class("a-z\\-").unwrap();
        assert!(wc.contains(b'q'));
        assert!(wc.contains(b'-'));
        assert!(!wc.contains(b'Q'));
        assert!(!wc.contains(b'_'));
    }

    #[test]
    fn high_bytes_can_be_word_chars() {
        let wc = WordChars::from_class("a-z\\x80-\\xFF").unwrap();
        assert!(wc.contains(0xE9));
    }

    #[test]
    fn invalid_class_is_an_error() {
        assert!(WordChars::from_class("z-a").is_err());
        assert!(WordChars::from_class("").is_err());
    }

    // ── Settings ──────────────────────────────────────────────────────────

    #[test]
    fn soft_tab_overrides_hard_tab() {
        let mut s = Settings::default();
        assert_eq!(s.tab_size(), 8);
        s.apply(&SetDirective::Assign("st".into(), "4".into())).unwrap();
        assert_eq!(s.tab_size(), 4);
        s.apply(&SetDirective::Assign("stabsize".into(), "0".into())).unwrap();
        assert_eq!(s.tab_size(), 8);
    }

    #[test]
    fn hard_tab_must_be_positive() {
        let mut s = Settings::default();
        assert!(s.apply(&SetDirective::Assign("ht".into(), "0".into())).is_err());
        assert!(s.apply(&SetDirective::Assign("ht".into(), "x".into())).is_err());
        assert_eq!(s.htab_size, 8);
    }

    #[test]
    fn toggle_boolean() {
        let mut s = Settings::default();
        s.apply(&SetDirective::Toggle("sf".into())).unwrap();
        assert!(!s.show_fence);
        s.apply(&SetDirective::On("showfence".into())).unwrap();
        assert!(s.show_fence);
    }

    #[test]
    fn type_mismatches_are_errors() {
        let mut s = Settings::default();
        assert!(s.apply(&SetDirective::On("ht".into())).is_err());
        assert!(s.apply(&SetDirective::Assign("sf".into(), "1".into())).is_err());
        assert!(s.apply(&SetDirective::On("bogus".into())).is_err());
    }

    #[test]
    fn query_and_show() {
        let mut s = Settings::default();
        assert_eq!(
            s.apply(&SetDirective::Query("fp".into())).unwrap().as_deref(),
            Some("fencepause=26")
        );
        assert_eq!(s.apply(&SetDirective::ShowChanged).unwrap().as_deref(), Some(""));
        s.apply(&SetDirective::Assign("ht".into(), "4".into())).unwrap();
        assert_eq!(
            s.apply(&SetDirective::ShowChanged).unwrap().as_deref(),
            Some("htabsize=4")
        );
        let all = s.apply(&SetDirective::ShowAll).unwrap().unwrap();
        assert!(all.contains("wordchars=A-Za-z0-9_"));
        assert!(all.contains("showfence"));
    }
}
