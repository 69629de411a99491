//! Python source text helpers shared by every node generator.
//!
//! All user-supplied text (file paths, column names, query expressions)
//! must go through [`str_lit`] before landing in generated code, so a
//! column called `o'brien` or a path with backslashes cannot break the
//! script. Variable names derived from user text go through [`ident`].

/// Render a single-quoted Python string literal.
pub fn str_lit(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}

/// Render a Python list literal of strings.
pub fn str_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let rendered: Vec<String> = items.into_iter().map(|s| str_lit(s.as_ref())).collect();
    format!("[{}]", rendered.join(", "))
}

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Derive a safe Python identifier from arbitrary text. Lowercases, maps
/// runs of other characters to `_`, never returns an empty name or a
/// keyword, never starts with a digit.
pub fn ident(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    let mut name = if trimmed.is_empty() {
        "df".to_string()
    } else {
        trimmed.to_string()
    };
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if KEYWORDS.contains(&name.as_str()) {
        name.push('_');
    }
    name
}

/// Render a float so it stays a float on the Python side (`1.0`, not `1`).
pub fn float_lit(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Render a number as a Python int literal.
pub fn int_lit(value: f64) -> String {
    (value as i64).to_string()
}

pub fn bool_lit(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
