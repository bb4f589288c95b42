//! End-to-end navigation scenarios driven through command lines.

use memacs_core::command::{self, Line, Value};
use memacs_core::line::LineStore;
use memacs_core::mark::{MarkFlags, MarkRegistry};
use memacs_core::nav;
use memacs_core::options::Settings;
use memacs_core::point::Point;
use memacs_core::window::NullScreen;
use memacs_core::word;
use memacs_core::{Buffer, Error, Flow, Session};
use pretty_assertions::assert_eq;

fn session(text: &str) -> Session {
    Session::new(Buffer::from_text("scenario", text), Box::new(NullScreen::default()))
}

/// Run one command line and return what it produced.
fn run(s: &mut Session, input: &str) -> Result<Flow<Value>, Error> {
    match command::parse_line(input)? {
        Line::Command { repeat, name, args } => command::exec(s, &name, repeat, &args),
        Line::Set(args) => s.apply_set(&args).map(|_| Flow::Done(Value::Nil)),
        Line::Empty => Ok(Flow::Done(Value::Nil)),
    }
}

fn run_ok(s: &mut Session, input: &str) -> Value {
    match run(s, input) {
        Ok(Flow::Done(v)) => v,
        other => panic!("{input}: {other:?}"),
    }
}

#[test]
fn forward_word_crosses_line_end() {
    let mut s = session("hello world\nfoo");
    run_ok(&mut s, "forwWord");
    assert_eq!(s.position(), (0, 6));
    run_ok(&mut s, "forwWord");
    assert_eq!(s.position(), (1, 0));
}

#[test]
fn empty_buffer_has_nowhere_to_go() {
    let mut s = session("");
    assert!(matches!(run(&mut s, "forwChar"), Ok(Flow::Boundary)));
    assert_eq!(s.position(), (0, 0));
    assert!(matches!(run(&mut s, "backChar"), Ok(Flow::Boundary)));
    assert!(matches!(run(&mut s, "forwLine"), Ok(Flow::Boundary)));
    assert_eq!(s.position(), (0, 0));
}

#[test]
fn nested_fences_match() {
    let mut s = session("(abc(def)ghi)");
    run_ok(&mut s, "gotoFence");
    assert_eq!(s.position(), (0, 12));
    run_ok(&mut s, "gotoFence");
    assert_eq!(s.position(), (0, 0));
}

#[test]
fn unmatched_fence_fails_silently() {
    let mut s = session("(abc");
    let err = run(&mut s, "gotoFence").unwrap_err();
    assert_eq!(err.message(), None);
    assert_eq!(s.position(), (0, 0));
}

#[test]
fn mark_lifecycle() {
    let lines = LineStore::from_bytes(b"text");
    let mut marks = MarkRegistry::new();
    let p = Point::new(lines.first(), 2);

    marks.find('a', MarkFlags::CREATE).unwrap().unwrap().set(p, 0);
    assert_eq!(marks.get('a').and_then(|m| m.point()), Some(p));
    marks.delete('a').unwrap();
    assert!(marks.find('a', MarkFlags::QUERY).unwrap().is_none());

    assert!(matches!(marks.delete('.'), Err(Error::ProtectedMark('.'))));
    marks.find('.', MarkFlags::CREATE).unwrap().unwrap().set(p, 0);
    assert!(matches!(marks.delete('.'), Err(Error::ProtectedMark('.'))));
    assert!(marks.region_mark().is_active());
}

#[test]
fn char_moves_round_trip() {
    let lines = LineStore::from_bytes(b"ab\ncde\nf");
    let origin = Point::new(lines.first(), 1);
    for k in 0..=6 {
        let mut p = origin;
        assert!(nav::move_char(&lines, &mut p, k).is_done());
        assert!(nav::move_char(&lines, &mut p, -k).is_done());
        assert_eq!(p, origin, "k = {k}");
    }
}

#[test]
fn last_line_stays_a_boundary() {
    let lines = LineStore::from_bytes(b"one\nlast line");
    let last = lines.last();
    let mut p = Point::new(last, 0);
    for _ in 0..3 {
        assert!(nav::move_line(&lines, &mut p, 1, 0, 8).is_boundary());
        assert_eq!(p, Point::new(last, 9));
    }
}

#[test]
fn back_word_lands_on_word_start() {
    let lines = LineStore::from_bytes(b"alpha  beta_gamma, x");
    let wc = Settings::default().word_chars;
    let line = lines.first();
    for (start, end) in [(0, 5), (7, 17)] {
        for offset in start + 1..end {
            let mut p = Point::new(line, offset);
            assert!(word::in_word(&lines, p, &wc));
            assert!(word::back_word(&lines, &mut p, 1, &wc).is_done());
            assert_eq!(p.offset, start, "from {offset}");
        }
    }
}

#[test]
fn goal_column_is_kept_across_line_moves() {
    let mut s = session("0123456789\n012\n\n0123456789");
    run_ok(&mut s, "8 forwChar");
    run_ok(&mut s, "forwLine");
    assert_eq!(s.position(), (1, 3));
    run_ok(&mut s, "forwLine");
    assert_eq!(s.position(), (2, 0));
    run_ok(&mut s, "forwLine");
    assert_eq!(s.position(), (3, 8));
}

#[test]
fn region_between_mark_and_point() {
    let mut s = session("hello world\nfoo");
    run_ok(&mut s, "setMark");
    run_ok(&mut s, "forwWord");
    assert_eq!(run_ok(&mut s, "regionText"), Value::Str("hello ".into()));
    run_ok(&mut s, "swapMark");
    assert_eq!(s.position(), (0, 0));
    assert_eq!(run_ok(&mut s, "regionText"), Value::Str("hello ".into()));
}

#[test]
fn named_marks_survive_line_edits() {
    let mut s = session("abc\ndef");
    run_ok(&mut s, "forwLine");
    run_ok(&mut s, "2 forwChar");
    run_ok(&mut s, "setMark a");
    run_ok(&mut s, "beginBuf");
    run_ok(&mut s, "deleteLine");
    run_ok(&mut s, "endBuf");
    run_ok(&mut s, "gotoMark a");
    assert_eq!(s.position(), (0, 2));
    assert_eq!(s.buffer().contents(), "def");
}

#[test]
fn word_queries() {
    let mut s = session("one two three");
    assert_eq!(run_ok(&mut s, "inWord"), Value::Bool(true));
    assert_eq!(run_ok(&mut s, "getWord"), Value::Str("one".into()));
    assert_eq!(run_ok(&mut s, "1 getWord"), Value::Str("two".into()));
    assert_eq!(s.position(), (0, 7));
}

#[test]
fn options_change_navigation() {
    let mut s = session("a-b c");
    run_ok(&mut s, "set wordchars=a-z-");
    run_ok(&mut s, "forwWord");
    assert_eq!(s.position(), (0, 4));

    run_ok(&mut s, "beginLine");
    run_ok(&mut s, "set stabsize=2");
    run_ok(&mut s, "forwTab");
    assert_eq!(s.position(), (0, 2));
}

#[test]
fn bad_command_lines_are_errors() {
    let mut s = session("x");
    assert!(matches!(run(&mut s, "noSuchCommand"), Err(Error::UnknownCommand(_))));
    assert!(matches!(run(&mut s, "setMark \"ab\""), Err(Error::InvalidArgument(_))));
    assert!(matches!(run(&mut s, "gotoMark z"), Err(Error::MarkNotFound('z'))));
    assert!(matches!(run(&mut s, "-1 endWord"), Err(Error::InvalidArgument(_))));
}
