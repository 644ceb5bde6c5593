//! Comment- and literal-aware scrubbing of C/C++ source lines.
//!
//! The scrubbed view keeps one output line per input line and keeps every
//! surviving character at its original byte column:
//! - string and character literals keep their quotes, interiors become spaces;
//! - `/* ... */` comments become spaces, across lines if needed;
//! - `// ...` comments are truncated.
//!
//! A trailing backslash is kept wherever the input line had one so that
//! preprocessor continuations stay visible to later passes.

/// Byte used in place of non-ASCII input so that columns stay aligned.
const NON_ASCII: u8 = b'_';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Normal,
    BlockComment,
    LineComment,
    Literal(u8),
}

enum LiteralEnd {
    /// Index of the closing quote.
    Closed(usize),
    /// Line ended on an unpaired backslash.
    Continued,
    Unterminated,
}

/// Scrub every line of a file. Lines must not carry their line terminator.
pub fn scrub_lines<L: AsRef<[u8]>>(lines: &[L]) -> Vec<String> {
    let mut state = State::Normal;
    lines
        .iter()
        .map(|line| scrub_line(line.as_ref(), &mut state))
        .collect()
}

fn scrub_line(raw: &[u8], state: &mut State) -> String {
    let mut buf: Vec<u8> = raw
        .iter()
        .map(|&b| if b.is_ascii() { b } else { NON_ASCII })
        .collect();
    while buf.last().is_some_and(|b| b.is_ascii_whitespace()) {
        buf.pop();
    }
    let n = buf.len();
    let backslash = buf.last() == Some(&b'\\');

    let mut pos = 0;
    match *state {
        State::Normal => {}
        State::BlockComment => match find_comment_end(&buf, 0) {
            Some(end) => {
                blank(&mut buf, 0, end);
                pos = end;
                *state = State::Normal;
            }
            None => {
                blank_keeping_backslash(&mut buf, 0, backslash);
                return finish(buf);
            }
        },
        State::LineComment => {
            blank_keeping_backslash(&mut buf, 0, backslash);
            if !backslash {
                *state = State::Normal;
            }
            return finish(buf);
        }
        State::Literal(quote) => match scan_literal(&buf, 0, quote) {
            LiteralEnd::Closed(close) => {
                blank(&mut buf, 0, close);
                pos = close + 1;
                *state = State::Normal;
            }
            LiteralEnd::Continued => {
                blank_keeping_backslash(&mut buf, 0, true);
                return finish(buf);
            }
            LiteralEnd::Unterminated => {
                blank(&mut buf, 0, n);
                *state = State::Normal;
                return finish(buf);
            }
        },
    }

    while let Some(off) = buf[pos..]
        .iter()
        .position(|&b| b == b'/' || b == b'"' || b == b'\'')
    {
        let at = pos + off;
        match buf[at] {
            b'/' => match buf.get(at + 1) {
                Some(b'*') => match find_comment_end(&buf, at + 2) {
                    Some(end) => {
                        blank(&mut buf, at, end);
                        pos = end;
                    }
                    None => {
                        blank_keeping_backslash(&mut buf, at, backslash);
                        *state = State::BlockComment;
                        break;
                    }
                },
                Some(b'/') => {
                    buf.truncate(at);
                    if backslash {
                        buf.push(b'\\');
                        *state = State::LineComment;
                    }
                    break;
                }
                _ => pos = at + 1,
            },
            quote => match scan_literal(&buf, at + 1, quote) {
                LiteralEnd::Closed(close) => {
                    blank(&mut buf, at + 1, close);
                    pos = close + 1;
                }
                LiteralEnd::Continued => {
                    blank_keeping_backslash(&mut buf, at + 1, true);
                    *state = State::Literal(quote);
                    break;
                }
                // a stray quote, e.g. an apostrophe in #error text
                LiteralEnd::Unterminated => pos = at + 1,
            },
        }
        if pos >= buf.len() {
            break;
        }
    }
    finish(buf)
}

/// Returns the index just past the closing `*/`.
fn find_comment_end(buf: &[u8], from: usize) -> Option<usize> {
    buf.get(from..)?
        .windows(2)
        .position(|w| w == b"*/")
        .map(|i| from + i + 2)
}

fn scan_literal(buf: &[u8], from: usize, quote: u8) -> LiteralEnd {
    let mut k = from;
    while k < buf.len() {
        match buf[k] {
            b'\\' if k + 1 == buf.len() => return LiteralEnd::Continued,
            b'\\' => k += 2,
            b if b == quote => return LiteralEnd::Closed(k),
            _ => k += 1,
        }
    }
    LiteralEnd::Unterminated
}

fn blank(buf: &mut [u8], from: usize, to: usize) {
    let to = to.min(buf.len());
    if from < to {
        buf[from..to].fill(b' ');
    }
}

fn blank_keeping_backslash(buf: &mut [u8], from: usize, backslash: bool) {
    let n = buf.len();
    blank(buf, from, n);
    if backslash && n > 0 {
        buf[n - 1] = b'\\';
    }
}

fn finish(mut buf: Vec<u8>) -> String {
    while buf.last() == Some(&b' ') {
        buf.pop();
    }
    // every byte is ASCII after projection
    buf.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scrub(src: &str) -> Vec<String> {
        let lines: Vec<&str> = src.lines().collect();
        scrub_lines(&lines)
    }

    /// Every surviving non-blank byte sits where it was in the input.
    fn assert_columns_preserved(src: &str) {
        let out = scrub(src);
        for (orig, clean) in src.lines().zip(out.iter()) {
            let orig = orig.as_bytes();
            for (col, b) in clean.bytes().enumerate() {
                if b != b' ' {
                    assert_eq!(orig.get(col), Some(&b), "column {col} of {orig:?}");
                }
            }
        }
    }

    #[test]
    fn test_string_interior_blanked_quotes_kept() {
        let out = scrub(r#"printf("{ %d }", x); { }"#);
        assert_eq!(out, vec![r#"printf("      ", x); { }"#]);
    }

    #[test]
    fn test_escaped_quote_does_not_end_string() {
        let out = scrub(r#"s = "a\"{"; t = '\''; u = '{';"#);
        assert_eq!(out, vec![r#"s = "    "; t = '  '; u = ' ';"#]);
    }

    #[test]
    fn test_double_backslash_before_quote_ends_string() {
        let out = scrub(r#"s = "\\"; {"#);
        assert_eq!(out, vec![r#"s = "  "; {"#]);
    }

    #[test]
    fn test_block_comment_across_lines() {
        let src = "int a; /* start {\n  middle }\n end */ int b;";
        let out = scrub(src);
        assert_eq!(out[0], "int a;");
        assert_eq!(out[1], "");
        assert_eq!(out[2], "        int b;");
        assert_columns_preserved(src);
    }

    #[test]
    fn test_line_comment_truncated() {
        let out = scrub("x = 1; // trailing { brace\ny = 2;");
        assert_eq!(out, vec!["x = 1;", "y = 2;"]);
    }

    #[test]
    fn test_line_comment_continuation_keeps_backslash_and_extends() {
        let src = "#define A 1 // note \\\n  still comment {\nint b;";
        let out = scrub(src);
        assert_eq!(out[0], "#define A 1 \\");
        assert_eq!(out[1], "");
        assert_eq!(out[2], "int b;");
    }

    #[test]
    fn test_block_comment_interior_keeps_trailing_backslash() {
        let src = "#define B /* open \\\n  inside \\\n  */ 2";
        let out = scrub(src);
        assert!(out[0].ends_with('\\'));
        assert_eq!(out[1].trim(), "\\");
        assert_eq!(out[2].trim(), "2");
        assert_columns_preserved(src);
    }

    #[test]
    fn test_comment_markers_do_not_nest() {
        let out = scrub("a; // has /* inside\nb; /* has // inside */ c;");
        assert_eq!(out[0], "a;");
        assert_eq!(out[1], format!("b;{}c;", " ".repeat(21)));
    }

    #[test]
    fn test_lone_slash_is_punctuation() {
        let out = scrub("x = a / b; { }");
        assert_eq!(out, vec!["x = a / b; { }"]);
    }

    #[test]
    fn test_string_continued_with_backslash() {
        let src = "s = \"first \\\nsecond { \";\n{";
        let out = scrub(src);
        assert_eq!(out[0].trim_end(), "s = \"      \\");
        assert_eq!(out[1], format!("{}\";", " ".repeat(9)));
        assert_eq!(out[2], "{");
    }

    #[test]
    fn test_stray_apostrophe_is_ignored() {
        let out = scrub("#error don't do this {");
        assert_eq!(out, vec!["#error don't do this {"]);
    }

    #[test]
    fn test_non_ascii_projected_without_shifting_columns() {
        let line: &[u8] = b"s = \"\xc3\xa9\"; {";
        let lines = [line];
        let out = scrub_lines(&lines);
        assert_eq!(out[0], "s = \"  \"; {");
        assert_eq!(out[0].len(), lines[0].len());
    }

    #[test]
    fn test_columns_preserved_on_mixed_input() {
        assert_columns_preserved(
            "  if (s == \"}\") /* x */ { c = '{'; } // done\n  /* a\n b */ }\n",
        );
    }
}
