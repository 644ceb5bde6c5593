//! Small helpers shared by both tools: stderr prefixes, color detection,
//! dashboard escaping and lenient decoding.

use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Environment variable set when running under the dashboard test driver.
pub const DART_ENV: &str = "DART_TEST_FROM_DART";

pub fn no_color() -> bool {
    std::env::var_os("NO_COLOR").is_some()
}

pub fn dart_mode() -> bool {
    std::env::var_os(DART_ENV).is_some()
}

/// Colors on stdout only for human output on a terminal.
pub fn stdout_colors(output: &str) -> bool {
    output != "json" && !no_color() && !dart_mode() && std::io::stdout().is_terminal()
}

fn stderr_colors() -> bool {
    !no_color() && std::io::stderr().is_terminal()
}

pub fn error_prefix() -> String {
    if stderr_colors() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn warn_prefix() -> String {
    if stderr_colors() {
        "warning:".yellow().bold().to_string()
    } else {
        "warning:".to_string()
    }
}

pub fn note_prefix() -> String {
    if stderr_colors() {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

pub fn info_prefix() -> String {
    if stderr_colors() {
        "info:".blue().bold().to_string()
    } else {
        "info:".to_string()
    }
}

/// Escape angle brackets so that dashboard HTML renders include lines.
pub fn html_escape(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Decode bytes as ASCII, dropping anything outside the ASCII range.
pub fn decode_ascii_lossy(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape_brackets_only() {
        assert_eq!(
            html_escape("#include <vector> & more"),
            "#include &lt;vector&gt; & more"
        );
    }

    #[test]
    fn test_decode_ascii_lossy_drops_high_bytes() {
        let bytes = b"// caf\xc3\xa9 \xff ok\n";
        assert_eq!(decode_ascii_lossy(bytes), "// caf  ok\n");
    }
}
