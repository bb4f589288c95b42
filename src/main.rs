// SPDX-License-Identifier: MIT
//
// memacs — command driver for the memacs editing core.
//
// Opens a file (or an empty buffer) in a session, then reads command lines
// from stdin and runs them:
//
//   stdin → parse_line → command::exec → window flags → TextScreen
//
// Every command answers with one line on stdout:
//
//   ok   3:7 "word"       done; position is line:offset, then any result
//   edge 12:0             stopped at a buffer edge
//   fail 1:0              failed without a message (unmatched fence)
//   err  mark 'a' not set
//
// `show` draws the window, `help` lists commands, `quit` or EOF ends.
// Logging goes to stderr, filtered by MEMACS_LOG, then RUST_LOG.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;
use std::thread;
use std::time::Duration;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use memacs_core::command::{self, Line, Value};
use memacs_core::window::{Screen, Window, display_col, new_col};
use memacs_core::{Buffer, Flow, Outcome, Session};

// ─── Logging ────────────────────────────────────────────────────────────────

const DEFAULT_FILTER: &str = "warn,memacs=info,memacs_core=info";

/// `MEMACS_LOG=debug` is shorthand for both memacs crates at that level;
/// anything with filter syntax is used as is.
fn log_filter() -> EnvFilter {
    if let Ok(level) = env::var("MEMACS_LOG") {
        if level.contains(['=', ',', ':']) {
            return EnvFilter::new(level);
        }
        return EnvFilter::new(format!("warn,memacs={level},memacs_core={level}"));
    }
    env::var("RUST_LOG").map_or_else(|_| EnvFilter::new(DEFAULT_FILTER), EnvFilter::new)
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// ─── Text screen ────────────────────────────────────────────────────────────

/// A screen that prints the window as plain text.
///
/// Size comes from `LINES` and `COLUMNS`, as a shell exports them.
struct TextScreen {
    rows: u16,
    cols: u16,
}

impl TextScreen {
    fn from_env() -> Self {
        let dim = |name: &str, default: u16| {
            env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &u16| n > 0)
                .unwrap_or(default)
        };
        Self {
            rows: dim("LINES", 24),
            cols: dim("COLUMNS", 80),
        }
    }
}

impl Screen for TextScreen {
    fn size(&self) -> (u16, u16) {
        (self.rows, self.cols)
    }

    fn update(&mut self, buf: &Buffer, win: &Window, htab: usize) -> io::Result<()> {
        let lines = buf.lines();
        let face = win.face();
        let width = usize::from(win.cols());
        let mut out = io::stdout().lock();
        writeln!(out, "-- {} --", buf.name())?;

        let mut id = Some(face.top);
        for _ in 0..win.rows() {
            let Some(line) = id.and_then(|l| lines.get(l)) else {
                break;
            };
            let cells = render_line(line.text(), htab);
            let shown: String = cells.chars().skip(face.first_col).take(width).collect();
            let here = id == Some(face.point.line);
            writeln!(out, "{}{shown}", if here { '>' } else { ' ' })?;
            if here {
                let col = display_col(line.text(), face.point.offset, htab);
                let pad = col.saturating_sub(face.first_col);
                writeln!(out, " {:pad$}^", "")?;
            }
            id = line.next();
        }
        out.flush()
    }

    fn pause(&mut self, centis: u32) {
        thread::sleep(Duration::from_millis(u64::from(centis) * 10));
    }

    fn beep(&mut self) {
        eprint!("\x07");
    }
}

/// Expand a line to one ASCII character per display column, using the
/// same widths as [`new_col`]: tabs to the next stop, control bytes as
/// `^X`, other non-ASCII bytes as `<XX>`.
fn render_line(text: &[u8], htab: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut col = 0;
    for &b in text {
        let next = new_col(b, col, htab);
        match b {
            b'\t' => out.extend(std::iter::repeat_n(' ', next - col)),
            0..=0x1F | 0x7F => {
                out.push('^');
                out.push(char::from(b ^ 0x40));
            }
            0x80..=0xFF => out.push_str(&format!("<{b:02X}>")),
            _ => out.push(char::from(b)),
        }
        col = next;
    }
    out
}

// ─── Driver ─────────────────────────────────────────────────────────────────

fn position(session: &Session) -> String {
    let (line, offset) = session.position();
    format!("{}:{offset}", line + 1)
}

/// Run one input line. Returns `false` to stop.
fn run_line(session: &mut Session, input: &str) -> bool {
    let trimmed = input.trim();
    match trimmed {
        "quit" | "exit" => return false,
        "show" => {
            if let Err(e) = session.redraw() {
                println!("err  {e}");
            }
            return true;
        }
        "help" => {
            for def in command::commands() {
                println!("{:<12} {}", def.name, def.help);
            }
            return true;
        }
        _ => {}
    }

    let parsed = match command::parse_line(trimmed) {
        Ok(line) => line,
        Err(e) => {
            println!("err  {e}");
            return true;
        }
    };
    match parsed {
        Line::Empty => {}
        Line::Set(args) => match session.apply_set(&args) {
            Ok(messages) => {
                for msg in messages {
                    println!("{msg}");
                }
            }
            Err(e) => println!("err  {e}"),
        },
        Line::Command { repeat, name, args } => {
            let outcome = command::exec(session, &name, repeat, &args);
            report(session, outcome);
        }
    }
    true
}

fn report(session: &mut Session, outcome: Outcome<Value>) {
    let at = position(session);
    match outcome {
        Ok(Flow::Done(Value::Nil)) => println!("ok   {at}"),
        Ok(Flow::Done(v)) => println!("ok   {at} {v}"),
        Ok(Flow::Boundary) => {
            session.beep();
            println!("edge {at}");
        }
        Err(e) => {
            session.beep();
            match e.message() {
                Some(msg) => println!("err  {msg}"),
                None => println!("fail {at}"),
            }
        }
    }
}

fn main() {
    init_logging();

    let buffer = match env::args().nth(1) {
        Some(path) => Buffer::from_file(Path::new(&path)).unwrap_or_else(|e| {
            eprintln!("memacs: {path}: {e}");
            process::exit(1);
        }),
        None => Buffer::new("untitled"),
    };
    info!(buffer = buffer.name(), lines = buffer.line_count(), "starting");

    let mut session = Session::new(buffer, Box::new(TextScreen::from_env()));
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("memacs: {e}");
                process::exit(1);
            }
        };
        if !run_line(&mut session, &line) {
            break;
        }
    }
    debug!("input finished");
}
