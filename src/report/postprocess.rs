//! Text passes applied to each rendered block before it is nested under
//! its category heading.

/// Indentation prepended to bullet lines.
pub const NEST_INDENT: &str = "    ";

/// Removes every empty or whitespace-only line.
///
/// Each surviving line is newline-terminated. Idempotent.
#[must_use]
pub fn strip_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Nests bullet lines one level deeper; other lines pass through unchanged.
#[must_use]
pub fn indent_bullets(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        if is_bullet(line) {
            out.push_str(NEST_INDENT);
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// A bullet line starts, after optional spaces, with `*`, `-` or `+`
/// followed by a space.
fn is_bullet(line: &str) -> bool {
    let mut chars = line.trim_start_matches(' ').chars();
    matches!(chars.next(), Some('*' | '-' | '+')) && chars.next() == Some(' ')
}
