//! Header rules for the VTK coding standard.
//!
//! `HeaderRules` owns the regular expressions shared by every file; a
//! `HeaderCheck` walks one header, remembers the class and parent names it
//! discovered, and collects at most one finding per category.

use crate::error::{Result, StyleError};
use crate::models::{Category, FileReport, Finding};
use regex::Regex;

/// Marker that opts a header out of the audit.
pub const EXCLUDE_PREFIX: &str = "// VTK-HeaderTest-Exclude:";

/// Includes a header never needs.
pub const UNNECESSARY_INCLUDES: &[&str] = &[
    "stdio.h",
    "stdlib.h",
    "string.h",
    "iostream",
    "iostream.h",
    "strstream",
    "strstream.h",
    "fstream",
    "fstream.h",
    "windows.h",
];

const DELETED: &str = r"(?:VTK_DELETE_FUNCTION|=\s*delete)";

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| StyleError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Compiled rule set, shared read-only across files.
pub struct HeaderRules {
    export: Option<String>,
    guard_ifndef: Regex,
    guard_define: Regex,
    class_decl: Regex,
    include: Regex,
    type_macro: Regex,
    type_macro_start: Regex,
    print_self: Regex,
    windows_mangle: Regex,
}

impl HeaderRules {
    pub fn new(export: Option<String>, windows_mangle: &str) -> Result<Self> {
        Ok(Self {
            export,
            guard_ifndef: compile(r"^#\s*ifndef\s+(\w+)")?,
            guard_define: compile(r"^#\s*define\s+(\w+)")?,
            class_decl: compile(
                r"^class(?:\s+VTK_DEPRECATED\w*(?:\([^)]*\))?)?(\s+\S*_EXPORT)?\s+(vtk[A-Z0-9_][^\s:]*)\s*:\s*public\s+(vtk[^\s{]*)",
            )?,
            include: compile(r#"^#\s*include\s*["<]([^>"]+)"#)?,
            type_macro: compile(
                r"^vtk(Abstract|Base)?Type(Revision)?Macro\s*\(\s*(vtk[^\s,]+)\s*,\s*(vtk[^\s)]+)\s*\)",
            )?,
            type_macro_start: compile(r"^vtk(Abstract|Base)?Type(Revision)?Macro\s*\(")?,
            print_self: compile(
                r"^(virtual\s+)?void\s+PrintSelf\s*\(\s*ostream\s*&\s*os\s*,\s*vtkIndent\s+indent\s*\)",
            )?,
            windows_mangle: compile(windows_mangle)?,
        })
    }

    pub fn export(&self) -> Option<&str> {
        self.export.as_deref()
    }

    /// Audit one header. `file` is the display path, `text` its decoded content.
    pub fn check_file(&self, file: &str, text: &str) -> Result<FileReport> {
        let mut check = HeaderCheck::new(self, file, text);
        let excluded = check.check_exclusion();
        if !excluded {
            check.check_guard();
            check.check_class();
            check.check_includes();
            check.check_type_macro();
            check.check_copy_and_assign()?;
            check.check_weird_constructors()?;
            check.check_print_self();
            check.check_windows_mangling();
        }
        let mut findings = check.findings;
        findings.sort_by_key(|f| f.line.unwrap_or(0));
        Ok(FileReport {
            file: file.to_string(),
            excluded,
            findings,
        })
    }
}

fn context_line(line_no: usize, text: &str) -> String {
    format!("{:>4}: {}", line_no, text)
}

/// Per-file state for one audit pass.
struct HeaderCheck<'a> {
    rules: &'a HeaderRules,
    file: &'a str,
    basename: String,
    /// Trimmed lines.
    lines: Vec<&'a str>,
    raw: Vec<&'a str>,
    class_name: Option<String>,
    parent_name: Option<String>,
    findings: Vec<Finding>,
}

impl<'a> HeaderCheck<'a> {
    fn new(rules: &'a HeaderRules, file: &'a str, text: &'a str) -> Self {
        let raw: Vec<&str> = text.lines().collect();
        let basename = std::path::Path::new(file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string());
        Self {
            rules,
            file,
            basename,
            lines: raw.iter().map(|&l| l.trim()).collect(),
            raw,
            class_name: None,
            parent_name: None,
            findings: Vec::new(),
        }
    }

    fn emit(
        &mut self,
        category: Category,
        line: Option<usize>,
        message: String,
        context: Vec<String>,
    ) {
        if self.findings.iter().any(|f| f.category == category) {
            return;
        }
        self.findings.push(Finding {
            file: self.file.to_string(),
            line,
            severity: category.severity(),
            category,
            message,
            context,
        });
    }

    /// Trimmed line `i` joined with the trimmed line after it.
    fn joined_with_next(&self, i: usize) -> Option<String> {
        self.lines.get(i + 1).map(|next| format!("{} {}", self.lines[i], next))
    }

    /// Returns true when the header carries a matching exclusion marker.
    fn check_exclusion(&mut self) -> bool {
        let mut markers = Vec::new();
        let mut wrong = Vec::new();
        let mut excluded = false;
        for (i, l) in self.raw.iter().enumerate() {
            if let Some(rest) = l.strip_prefix(EXCLUDE_PREFIX) {
                let ctx = context_line(i + 1, l.trim_end());
                if rest.trim() == self.basename {
                    excluded = true;
                } else {
                    wrong.push((i + 1, ctx.clone()));
                }
                markers.push((i + 1, ctx));
            }
        }
        if let Some(first) = wrong.first().map(|w| w.0) {
            let ctx = wrong.into_iter().map(|(_, c)| c).collect();
            let message = format!("exclusion marker does not name {}", self.basename);
            self.emit(Category::WrongExclusion, Some(first), message, ctx);
        }
        if markers.len() > 1 {
            let message = format!("has {} VTK-HeaderTest-Exclude lines", markers.len());
            let line = markers[1].0;
            let ctx = markers.into_iter().map(|(_, c)| c).collect();
            self.emit(Category::MultipleExclusion, Some(line), message, ctx);
        }
        excluded
    }

    fn check_guard(&mut self) {
        let found = self.lines.iter().enumerate().find_map(|(i, l)| {
            self.rules
                .guard_ifndef
                .captures(l)
                .map(|c| (i, c[1].to_string()))
        });
        let Some((at, guard)) = found else {
            self.emit(
                Category::MissingHeaderGuard,
                None,
                "is missing a header guard".to_string(),
                Vec::new(),
            );
            return;
        };
        let defined = self.lines[at + 1..].iter().find_map(|l| {
            self.rules
                .guard_define
                .captures(l)
                .map(|c| c[1].to_string())
        });
        if defined.as_deref() != Some(guard.as_str()) {
            let message = match defined {
                Some(d) => format!("is not guarded properly: #ifndef {guard} but #define {d}"),
                None => format!("is not guarded properly: #ifndef {guard} is never defined"),
            };
            self.emit(Category::GuardNotSet, Some(at + 1), message, Vec::new());
        }
        let stem = self
            .basename
            .strip_suffix(".h")
            .unwrap_or(&self.basename)
            .to_string();
        let expected = format!("{stem}_h");
        if guard != expected {
            self.emit(
                Category::GuardFilenameMismatch,
                Some(at + 1),
                format!("has guard {guard} but should be {expected}"),
                Vec::new(),
            );
        }
    }

    fn check_class(&mut self) {
        // (line, export, class, parent, text)
        let mut decls: Vec<(usize, Option<String>, String, String, String)> = Vec::new();
        let mut prev_matched = false;
        for i in 0..self.lines.len() {
            let line = self.lines[i];
            let single = self.rules.class_decl.captures(line).map(|c| (i, c));
            let joined: String;
            let caps = match single {
                Some(c) => Some(c),
                // a declaration wrapped onto this line
                None if !prev_matched && i > 0 => {
                    joined = format!("{} {}", self.lines[i - 1], line);
                    self.rules.class_decl.captures(&joined).map(|c| (i - 1, c))
                }
                None => None,
            };
            prev_matched = caps.is_some();
            if let Some((at, c)) = caps {
                let export = c
                    .get(1)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|s| !s.is_empty());
                decls.push((at + 1, export, c[2].to_string(), c[3].to_string(), line.to_string()));
            }
        }
        if decls.is_empty() {
            self.emit(
                Category::NoClass,
                None,
                "does not define any classes".to_string(),
                Vec::new(),
            );
            return;
        }
        if decls.len() > 1 {
            let ctx = decls.iter().map(|d| context_line(d.0, &d.4)).collect();
            let message = format!("defines {} classes", decls.len());
            self.emit(Category::MultipleClasses, Some(decls[1].0), message, ctx);
        }
        for (line_no, export, class, _, text) in decls.clone() {
            match (export, self.rules.export()) {
                (None, _) => self.emit(
                    Category::NoExportMacro,
                    Some(line_no),
                    format!("defines class {class} with no export macro"),
                    vec![context_line(line_no, &text)],
                ),
                (Some(found), Some(wanted)) if found != wanted => self.emit(
                    Category::WrongExportMacro,
                    Some(line_no),
                    format!("defines class {class} with export macro {found}; should be {wanted}"),
                    vec![context_line(line_no, &text)],
                ),
                _ => {}
            }
        }
        let (_, _, class, parent, _) = decls.swap_remove(0);
        self.class_name = Some(class);
        self.parent_name = Some(parent);
    }

    fn check_includes(&mut self) {
        let parent_header = self.parent_name.as_ref().map(|p| format!("{p}.h"));
        let mut others = Vec::new();
        let mut non_portable = Vec::new();
        let mut unnecessary = Vec::new();
        let mut has_parent = false;
        for (i, line) in self.lines.iter().enumerate() {
            if line.contains("//") {
                continue;
            }
            let Some(c) = self.rules.include.captures(line) else {
                continue;
            };
            let name = &c[1];
            let ctx = (i + 1, context_line(i + 1, line));
            if parent_header.as_deref() == Some(name) {
                has_parent = true;
            } else {
                others.push(ctx.clone());
            }
            if !name.ends_with(".h") {
                non_portable.push(ctx.clone());
            }
            if UNNECESSARY_INCLUDES.contains(&name) {
                unnecessary.push(ctx);
            }
        }
        let split = |v: Vec<(usize, String)>| -> (Option<usize>, Vec<String>) {
            (v.first().map(|c| c.0), v.into_iter().map(|c| c.1).collect())
        };
        if others.len() > 1 {
            let message = format!("has {} includes besides the parent", others.len());
            let (line, ctx) = split(others);
            self.emit(Category::MultipleIncludes, line, message, ctx);
        }
        if !non_portable.is_empty() {
            let (line, ctx) = split(non_portable);
            let message = "has non-portable include(s)".to_string();
            self.emit(Category::NonPortableInclude, line, message, ctx);
        }
        if !unnecessary.is_empty() {
            let (line, ctx) = split(unnecessary);
            let message = "has unnecessary include(s)".to_string();
            self.emit(Category::UnnecessaryInclude, line, message, ctx);
        }
        if let (false, Some(ph)) = (has_parent, parent_header) {
            self.emit(
                Category::MissingParentInclude,
                None,
                format!("does not include parent \"{ph}\""),
                Vec::new(),
            );
        }
    }

    /// `; should be vtkTypeMacro(Class, Parent)` once both names are known.
    fn type_macro_hint(&self) -> String {
        match (&self.class_name, &self.parent_name) {
            (Some(class), Some(parent)) => format!("; should be vtkTypeMacro({class}, {parent})"),
            _ => String::new(),
        }
    }

    fn check_type_macro(&mut self) {
        let mut found = false;
        let mut broken = Vec::new();
        let mut legacy = Vec::new();
        for i in 0..self.lines.len() {
            let line = self.lines[i];
            let text = if self.rules.type_macro.is_match(line) {
                line.to_string()
            } else if self.rules.type_macro_start.is_match(line) {
                match self.joined_with_next(i) {
                    Some(j) if self.rules.type_macro.is_match(&j) => j,
                    _ => continue,
                }
            } else {
                continue;
            };
            let Some(c) = self.rules.type_macro.captures(&text) else {
                continue;
            };
            found = true;
            let ctx = (i + 1, context_line(i + 1, &text));
            if c.get(2).is_some() {
                legacy.push(ctx.clone());
            }
            if let (Some(class), Some(parent)) = (&self.class_name, &self.parent_name) {
                if &c[3] != class.as_str() || &c[4] != parent.as_str() {
                    broken.push(ctx);
                }
            }
        }
        let hint = self.type_macro_hint();
        if let Some(first) = broken.first().map(|c| c.0) {
            let ctx = broken.into_iter().map(|c| c.1).collect();
            let message = format!("has broken type macro(s){hint}");
            self.emit(Category::BrokenTypeMacro, Some(first), message, ctx);
        }
        if let Some(first) = legacy.first().map(|c| c.0) {
            let ctx = legacy.into_iter().map(|c| c.1).collect();
            let message = format!("has legacy type-revision macro(s){hint}");
            self.emit(Category::LegacyTypeMacro, Some(first), message, ctx);
        }
        if !found {
            let message = format!("does not have a type macro{hint}");
            self.emit(Category::NoTypeMacro, None, message, Vec::new());
        }
    }

    /// Count lines matching `re`, falling back to pairs of adjacent lines
    /// when no single line matches.
    fn count_single_or_split(&self, re: &Regex) -> usize {
        let single = self.lines.iter().filter(|l| re.is_match(l)).count();
        if single > 0 {
            return single;
        }
        (1..self.lines.len())
            .filter(|&i| re.is_match(&format!("{} {}", self.lines[i - 1], self.lines[i])))
            .count()
    }

    fn check_copy_and_assign(&mut self) -> Result<()> {
        let Some(class) = self.class_name.clone() else {
            return Ok(());
        };
        let c = regex::escape(&class);
        let copy = compile(&format!(r"^{c}\s*\(\s*const\s+{c}\s*&\s*\)\s*{DELETED}\s*;"))?;
        let assign = compile(&format!(
            r"^void\s*operator\s*=\s*\(\s*const\s+{c}\s*&\s*\)\s*{DELETED}\s*;"
        ))?;
        let copies = self.count_single_or_split(&copy);
        let assigns = self.count_single_or_split(&assign);
        match copies {
            0 => self.emit(
                Category::NoPrivateCopy,
                None,
                format!(
                    "does not delete the copy constructor; should be {class}(const {class}&) VTK_DELETE_FUNCTION;"
                ),
                Vec::new(),
            ),
            1 => {}
            n => self.emit(
                Category::MultiplePrivateCopy,
                None,
                format!("declares {n} deleted copy constructors"),
                Vec::new(),
            ),
        }
        match assigns {
            0 => self.emit(
                Category::NoPrivateAssign,
                None,
                format!(
                    "does not delete the assignment operator; should be void operator=(const {class}&) VTK_DELETE_FUNCTION;"
                ),
                Vec::new(),
            ),
            1 => {}
            n => self.emit(
                Category::MultiplePrivateAssign,
                None,
                format!("declares {n} deleted assignment operators"),
                Vec::new(),
            ),
        }
        Ok(())
    }

    fn check_weird_constructors(&mut self) -> Result<()> {
        let Some(class) = self.class_name.clone() else {
            return Ok(());
        };
        let c = regex::escape(&class);
        let ctor = compile(&format!(r"^{c}\s*\(([^)]*)\)"))?;
        // copy and move signatures are handled by check_copy_and_assign
        let special = compile(&format!(r"^(const\s+)?{c}\s*&{{1,2}}\s*\w*$"))?;
        let mut weird = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            let Some(caps) = ctor.captures(line) else {
                continue;
            };
            let args = caps[1].trim();
            if args.is_empty() || args == "void" || special.is_match(args) {
                continue;
            }
            weird.push((i + 1, context_line(i + 1, line)));
        }
        if let Some(first) = weird.first().map(|w| w.0) {
            let ctx = weird.into_iter().map(|w| w.1).collect();
            self.emit(
                Category::WeirdConstructor,
                Some(first),
                format!("has weird constructor(s); there should be only {class}();"),
                ctx,
            );
        }
        Ok(())
    }

    fn check_print_self(&mut self) {
        if self.class_name.is_none() {
            return;
        }
        if !self.lines.iter().any(|l| self.rules.print_self.is_match(l)) {
            self.emit(
                Category::NoPrintself,
                None,
                "does not define PrintSelf method".to_string(),
                Vec::new(),
            );
        }
    }

    fn check_windows_mangling(&mut self) {
        let mut hits = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            if line.contains("VTK_LEGACY") {
                continue;
            }
            let Some(caps) = self.rules.windows_mangle.captures(line) else {
                continue;
            };
            let name = caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str().trim());
            if name.is_some_and(|n| !n.is_empty()) {
                hits.push((i + 1, context_line(i + 1, line)));
            }
        }
        if let Some(first) = hits.first().map(|h| h.0) {
            let ctx = hits.into_iter().map(|h| h.1).collect();
            self.emit(
                Category::WindowsMangling,
                Some(first),
                "has windows.h mangling violations; choose another name that does not conflict"
                    .to_string(),
                ctx,
            );
        }
    }
}
