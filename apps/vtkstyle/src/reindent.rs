//! Whitesmiths to Allman brace re-indentation.
//!
//! Each pass scrubs the file, then walks its delimiters with a stack that is
//! snapshotted around `#if` blocks and reset for `#define` bodies. A `{`/`}`
//! pair standing at the start of its lines is moved to the indentation of the
//! statement that owns it. Only leading whitespace is ever rewritten, so the
//! token sequence of the file never changes.
//!
//! Structural problems found on the way are returned as `Diagnostic`s; they
//! never stop the walk.

use crate::error::{Result, StyleError};
use crate::models::{Diagnostic, DiagnosticKind, ReindentReport, ReindentResult};
use crate::scrub::scrub_lines;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const CONTROL_KEYWORDS: &[&[u8]] = &[b"if", b"else", b"for", b"do", b"while", b"switch"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eol {
    None,
    Lf,
    CrLf,
}

impl Eol {
    fn as_bytes(self) -> &'static [u8] {
        match self {
            Eol::None => b"",
            Eol::Lf => b"\n",
            Eol::CrLf => b"\r\n",
        }
    }
}

/// One source line with its own terminator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLine {
    pub text: Vec<u8>,
    pub eol: Eol,
}

impl AsRef<[u8]> for SourceLine {
    fn as_ref(&self) -> &[u8] {
        &self.text
    }
}

/// Split raw bytes into lines, remembering LF or CRLF per line.
pub fn split_lines(bytes: &[u8]) -> Vec<SourceLine> {
    let mut out = Vec::new();
    let mut start = 0;
    while start < bytes.len() {
        match bytes[start..].iter().position(|&b| b == b'\n') {
            Some(off) => {
                let end = start + off;
                let (text, eol) = if end > start && bytes[end - 1] == b'\r' {
                    (&bytes[start..end - 1], Eol::CrLf)
                } else {
                    (&bytes[start..end], Eol::Lf)
                };
                out.push(SourceLine {
                    text: text.to_vec(),
                    eol,
                });
                start = end + 1;
            }
            None => {
                out.push(SourceLine {
                    text: bytes[start..].to_vec(),
                    eol: Eol::None,
                });
                break;
            }
        }
    }
    out
}

pub fn join_lines(lines: &[SourceLine]) -> Vec<u8> {
    let mut out = Vec::new();
    for line in lines {
        out.extend_from_slice(&line.text);
        out.extend_from_slice(line.eol.as_bytes());
    }
    out
}

/// Result of a single walk over a file.
#[derive(Debug, Default)]
pub struct PassOutcome {
    /// 0-based indices of lines whose indentation was rewritten.
    pub changed: BTreeSet<usize>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run one re-indentation pass over `lines` in place.
///
/// When any line changed, trailing blanks are stripped from every line and
/// trailing empty lines are dropped.
pub fn reindent_lines(lines: &mut Vec<SourceLine>) -> PassOutcome {
    let scrubbed = scrub_lines(lines.as_slice());
    let mut walker = Walker::new(lines, &scrubbed);
    for i in 0..scrubbed.len() {
        walker.line(i);
    }
    walker.finish();
    let outcome = walker.pass;
    if !outcome.changed.is_empty() {
        tidy(lines);
    }
    outcome
}

fn tidy(lines: &mut Vec<SourceLine>) {
    for line in lines.iter_mut() {
        while matches!(line.text.last(), Some(b' ' | b'\t')) {
            line.text.pop();
        }
    }
    while lines.last().is_some_and(|l| l.text.is_empty()) {
        lines.pop();
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    delim: u8,
    row: usize,
    /// `None` marks an initializer brace.
    col: Option<usize>,
    indent: usize,
}

#[derive(Clone, Debug)]
struct Snapshot {
    stack: Vec<Frame>,
    indentation: usize,
    continuation: bool,
    row: usize,
    cplusplus: bool,
    in_else: bool,
}

#[derive(Debug)]
struct Saved {
    stack: Vec<Frame>,
    indentation: usize,
    continuation: bool,
}

struct Walker<'a> {
    lines: &'a mut [SourceLine],
    scrubbed: &'a [String],
    stack: Vec<Frame>,
    cond_stack: Vec<Snapshot>,
    saved: Option<Saved>,
    indentation: usize,
    continuation: bool,
    new_context: bool,
    in_define: bool,
    in_assign: bool,
    leaving_define: bool,
    pass: PassOutcome,
}

impl<'a> Walker<'a> {
    fn new(lines: &'a mut [SourceLine], scrubbed: &'a [String]) -> Self {
        Self {
            lines,
            scrubbed,
            stack: Vec::new(),
            cond_stack: Vec::new(),
            saved: None,
            indentation: 0,
            continuation: false,
            new_context: true,
            in_define: false,
            in_assign: false,
            leaving_define: false,
            pass: PassOutcome::default(),
        }
    }

    fn report(&mut self, kind: DiagnosticKind, row: usize, message: String) {
        self.pass
            .diagnostics
            .push(Diagnostic::new(kind, Some(row + 1), message));
    }

    fn restore_define(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.stack = saved.stack;
            self.indentation = saved.indentation;
            self.continuation = saved.continuation;
        }
        self.in_define = false;
        self.leaving_define = false;
    }

    fn conditional(&mut self, i: usize, kind: [u8; 2], full: &[u8]) {
        match &kind {
            b"if" => self.cond_stack.push(Snapshot {
                stack: self.stack.clone(),
                indentation: self.indentation,
                continuation: self.continuation,
                row: i,
                cplusplus: is_cplusplus_guard(full),
                in_else: false,
            }),
            b"en" | b"el" => {
                let Some(snap) = self.cond_stack.last_mut() else {
                    self.report(
                        DiagnosticKind::MismatchedIfConditional,
                        i,
                        "mismatched #if conditional".to_string(),
                    );
                    return;
                };
                if snap.stack.len() < self.stack.len() && !snap.cplusplus {
                    let opener = self.scrubbed[snap.row].trim();
                    self.pass.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::MismatchedDelimiter,
                        Some(i + 1),
                        format!("mismatched delimiter in \"{}\" block", opener),
                    ));
                }
                if &kind == b"el" {
                    snap.in_else = true;
                    self.stack = snap.stack.clone();
                    self.indentation = snap.indentation;
                    self.continuation = snap.continuation;
                } else {
                    self.cond_stack.pop();
                }
            }
            b"de" => {
                self.in_define = true;
                self.leaving_define = false;
                self.saved = Some(Saved {
                    stack: std::mem::take(&mut self.stack),
                    indentation: self.indentation,
                    continuation: self.continuation,
                });
                self.new_context = true;
            }
            _ => {}
        }
    }

    fn line(&mut self, i: usize) {
        let scrubbed = self.scrubbed;
        let full = scrubbed[i].as_bytes();

        if self.leaving_define {
            self.restore_define();
        }

        let directive = directive(full);
        if let Some((kind, _)) = directive {
            self.conditional(i, kind, full);
        }
        let is_directive = directive.is_some();
        let in_else = self.cond_stack.last().is_some_and(|s| s.in_else);

        let mut line = full;
        if line.last() == Some(&b'\\') {
            line = trim_end(&line[..line.len() - 1]);
        } else if self.in_define {
            self.leaving_define = true;
        }

        if self.new_context {
            self.continuation = false;
            self.indentation = 0;
            self.new_context = false;
        }

        if !is_directive && !line.is_empty() && !self.continuation {
            let start = skip_spaces(line, 0);
            if line.get(start) != Some(&b'{') {
                self.indentation = start;
                self.continuation = true;
            }
        }

        let mut pos = match directive {
            Some((_, end)) => skip_spaces(line, end.min(line.len())),
            None => skip_spaces(line, 0),
        };

        if let Some(mut end) = label_end(line, pos) {
            if self.stack.iter().all(|f| f.delim == b'{') {
                let word = &line[pos..word_end(line, pos)];
                if word == b"case" || word == b"default" {
                    self.indentation = pos;
                }
                self.continuation = false;
                loop {
                    pos = skip_spaces(line, end);
                    match label_end(line, pos) {
                        Some(next) => end = next,
                        None => break,
                    }
                }
            }
        }

        while pos < line.len() {
            if let Some(end) = control_keyword_end(line, pos) {
                if skip_spaces(line, 0) == pos {
                    self.indentation = pos;
                }
                pos = skip_spaces(line, end);
                continue;
            }
            let c = line[pos];
            if !is_delim(c) {
                match other_end(line, pos) {
                    Some(end) => {
                        pos = skip_spaces(line, end);
                        continue;
                    }
                    None => break,
                }
            }
            match c {
                b'(' | b'[' => self.stack.push(Frame {
                    delim: c,
                    row: i,
                    col: Some(pos),
                    indent: self.indentation,
                }),
                b'{' => self.open_brace(i, line, pos, in_else),
                b';' => {
                    // `;` inside `for (;;)` does not end the statement
                    if self.stack.last().map_or(true, |f| f.delim == b'{') {
                        self.continuation = false;
                    }
                }
                _ => self.close(i, line, pos, c),
            }
            pos = skip_spaces(line, pos + 1);
        }

        if let Some(&last) = line.last() {
            if last == b'=' || (self.in_define && !self.leaving_define) {
                self.in_assign = true;
            } else if !is_directive {
                self.in_assign = false;
            }
        }
    }

    fn open_brace(&mut self, i: usize, line: &[u8], pos: usize, in_else: bool) {
        let after_eq = trim_end(&line[..pos]).last() == Some(&b'=');
        let nested_init = self
            .stack
            .last()
            .is_some_and(|f| f.delim == b'{' && f.col.is_none());
        let first = is_blank(&line[..pos]);
        // macro bodies are left as written
        let in_macro = self.in_define && !self.leaving_define;
        let col = if self.in_assign || in_macro || after_eq || nested_init {
            None
        } else {
            if in_else && first && is_blank(&line[pos + 1..]) {
                // may have no partner in this branch
                self.set_indent(i, self.indentation);
            }
            Some(pos)
        };
        self.stack.push(Frame {
            delim: b'{',
            row: i,
            col,
            indent: self.indentation,
        });
        if first {
            self.indentation += 2;
        }
        self.continuation = false;
    }

    fn close(&mut self, i: usize, line: &[u8], pos: usize, delim: u8) {
        let partner = match delim {
            b'}' => b'{',
            b')' => b'(',
            _ => b'[',
        };
        let frame = self.stack.pop();
        if let Some(f) = frame {
            self.indentation = f.indent;
            self.in_assign = f.col.is_none();
        }
        if frame.map(|f| f.delim) != Some(partner) {
            self.report(
                DiagnosticKind::MismatchedDelimiter,
                i,
                format!("mismatched '{}'", delim as char),
            );
        }
        if let Some(f) = frame {
            if f.delim == b'{' && delim == b'}' && is_blank(&line[..pos]) {
                if let Some(col) = f.col {
                    let scrubbed = self.scrubbed;
                    let opener = scrubbed[f.row].as_bytes();
                    if is_blank(&opener[..col.min(opener.len())]) {
                        self.set_indent(f.row, f.indent);
                        self.set_indent(i, f.indent);
                    } else if f.row != i {
                        self.set_indent(i, f.indent);
                    }
                }
            }
        }
        if delim == b'}' {
            self.continuation = false;
        }
    }

    /// Replace the leading whitespace of `row` with `indent` spaces.
    fn set_indent(&mut self, row: usize, indent: usize) {
        let line = &mut self.lines[row];
        let body = line
            .text
            .iter()
            .position(|&b| !is_space(b))
            .unwrap_or(line.text.len());
        if body == indent && line.text[..body].iter().all(|&b| b == b' ') {
            return;
        }
        let mut text = vec![b' '; indent];
        text.extend_from_slice(&line.text[body..]);
        line.text = text;
        self.pass.changed.insert(row);
    }

    fn finish(&mut self) {
        if self.leaving_define {
            self.restore_define();
        }
        if let Some(row) = self.cond_stack.first().map(|s| s.row) {
            self.report(
                DiagnosticKind::MismatchedIfConditional,
                row,
                "mismatched #if conditional".to_string(),
            );
        }
        if let Some(f) = self.stack.first().copied() {
            self.report(
                DiagnosticKind::UnmatchedOpenerAtEof,
                f.row,
                format!("no match for '{}' before end of file", f.delim as char),
            );
        }
    }
}

fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_delim(b: u8) -> bool {
    matches!(b, b'{' | b'}' | b'(' | b')' | b'[' | b']' | b';')
}

fn is_blank(s: &[u8]) -> bool {
    s.iter().all(|&b| is_space(b))
}

fn trim_end(s: &[u8]) -> &[u8] {
    let end = s.iter().rposition(|&b| !is_space(b)).map_or(0, |p| p + 1);
    &s[..end]
}

fn skip_spaces(line: &[u8], pos: usize) -> usize {
    let mut p = pos;
    while p < line.len() && is_space(line[p]) {
        p += 1;
    }
    p
}

fn word_end(line: &[u8], pos: usize) -> usize {
    let mut p = pos;
    while p < line.len() && is_word(line[p]) {
        p += 1;
    }
    p
}

/// `#` plus the first two characters of the directive name, e.g. `if` for
/// `#ifdef`, `el` for `#else`/`#elif`.
fn directive(line: &[u8]) -> Option<([u8; 2], usize)> {
    let hash = skip_spaces(line, 0);
    if line.get(hash) != Some(&b'#') {
        return None;
    }
    let start = skip_spaces(line, hash + 1);
    let name = line.get(start..start + 2)?;
    Some(([name[0], name[1]], start + 2))
}

fn is_cplusplus_guard(line: &[u8]) -> bool {
    let Some(([b'i', b'f'], end)) = directive(line) else {
        return false;
    };
    let rest = &line[end..];
    if !rest.starts_with(b"def") {
        return false;
    }
    let name = skip_spaces(rest, 3);
    name > 3 && rest[name..].starts_with(b"__cplusplus")
}

/// End of a label at `pos`: `case <expr>` up to its lone `:`, or
/// `ident [:: ...]:` where the colon is not part of `::`.
fn label_end(line: &[u8], pos: usize) -> Option<usize> {
    let word = word_end(line, pos);
    if word == pos {
        return None;
    }
    if &line[pos..word] == b"case" {
        let mut end = word;
        while end < line.len() {
            if line[end] == b':' {
                if line.get(end + 1) == Some(&b':') {
                    end += 2;
                    continue;
                }
                break;
            }
            end += 1;
        }
        if end > word {
            return Some(end);
        }
    }
    let mut end = skip_spaces(line, word);
    while line[end..].starts_with(b"::") {
        end = skip_spaces(line, end + 2);
    }
    if line.get(end) == Some(&b':') && line.get(end + 1) != Some(&b':') {
        Some(end + 1)
    } else {
        None
    }
}

fn control_keyword_end(line: &[u8], pos: usize) -> Option<usize> {
    CONTROL_KEYWORDS.iter().find_map(|kw| {
        let end = pos + kw.len();
        let bounded = line.get(end).map_or(true, |&b| !is_word(b));
        (line[pos..].starts_with(kw) && bounded).then_some(end)
    })
}

/// An identifier, or a run of operator characters.
fn other_end(line: &[u8], pos: usize) -> Option<usize> {
    let word = word_end(line, pos);
    if word > pos {
        return Some(word);
    }
    let mut end = pos;
    while end < line.len() && !is_word(line[end]) && !is_space(line[end]) && !is_delim(line[end])
    {
        end += 1;
    }
    (end > pos).then_some(end)
}

/// Outcome of re-indenting an in-memory source.
#[derive(Debug, Default)]
pub struct Rewrite {
    /// 1-based, ascending.
    pub changed_lines: Vec<usize>,
    pub diagnostics: Vec<Diagnostic>,
    pub passes: usize,
    /// New file contents; only produced outside dry-run when something changed.
    pub output: Option<Vec<u8>>,
}

/// One reindenter per invocation.
pub struct Reindenter {
    ignore: Vec<String>,
    max_passes: usize,
}

impl Reindenter {
    pub fn new(ignore: Vec<String>, max_passes: usize) -> Self {
        Self {
            ignore,
            max_passes: max_passes.max(1),
        }
    }

    /// Generated sources are skipped by basename.
    pub fn is_ignored(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| n.to_string_lossy())
            .is_some_and(|n| self.ignore.iter().any(|i| *i == n))
    }

    /// Re-indent `source`. Dry-run stops after the first pass; otherwise
    /// passes repeat until nothing changes or the pass limit is reached.
    pub fn reindent_source(&self, source: &[u8], dry_run: bool) -> Rewrite {
        let mut lines = split_lines(source);
        let first = reindent_lines(&mut lines);
        let mut changed = first.changed;
        let mut rewrite = Rewrite {
            diagnostics: first.diagnostics,
            passes: 1,
            ..Rewrite::default()
        };
        if changed.is_empty() {
            return rewrite;
        }
        if !dry_run {
            while rewrite.passes < self.max_passes {
                let next = reindent_lines(&mut lines);
                rewrite.passes += 1;
                if next.changed.is_empty() {
                    break;
                }
                changed.extend(next.changed);
            }
            rewrite.output = Some(join_lines(&lines));
        }
        rewrite.changed_lines = changed.into_iter().map(|i| i + 1).collect();
        rewrite
    }

    pub fn reindent_file(&self, path: &Path, dry_run: bool) -> Result<ReindentReport> {
        let file = path.to_string_lossy().into_owned();
        if self.is_ignored(path) {
            return Ok(ReindentReport {
                file,
                skipped: true,
                ..ReindentReport::default()
            });
        }
        let bytes = fs::read(path).map_err(|source| StyleError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let rewrite = self.reindent_source(&bytes, dry_run);
        if let Some(out) = &rewrite.output {
            fs::write(path, out).map_err(|source| StyleError::FileWrite {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(ReindentReport {
            file,
            skipped: false,
            changed: !rewrite.changed_lines.is_empty(),
            changed_lines: rewrite.changed_lines,
            passes: rewrite.passes,
            diagnostics: rewrite.diagnostics,
        })
    }

    /// Files are processed one after another, in argument order.
    pub fn run(&self, files: &[PathBuf], dry_run: bool) -> Result<ReindentResult> {
        let mut result = ReindentResult {
            dry_run,
            ..ReindentResult::default()
        };
        for path in files {
            let report = self.reindent_file(path, dry_run)?;
            result.record(report);
        }
        Ok(result)
    }
}

/// Expand arguments that look like glob patterns and name no existing file.
///
/// A pattern matching nothing is kept verbatim so that reading it fails with
/// the usual I/O error.
pub fn expand_inputs(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for arg in args {
        let path = PathBuf::from(arg);
        if path.exists() || !arg.contains(['*', '?', '[']) {
            out.push(path);
            continue;
        }
        let matches = glob::glob(arg).map_err(|source| StyleError::InvalidGlob {
            pattern: arg.clone(),
            source,
        })?;
        let before = out.len();
        out.extend(matches.flatten());
        if out.len() == before {
            out.push(path);
        }
    }
    Ok(out)
}
