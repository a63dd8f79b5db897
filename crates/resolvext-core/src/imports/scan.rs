//! Specifier site scanner.
//!
//! Finds string-literal specifiers of import/export statements and dynamic
//! `import()` calls without full parsing. Comments, unrelated string
//! literals and regex literals are skipped. Regex detection looks only at
//! the previous token, so `}` followed by `/` is always read as a regex.

use serde::Serialize;
use std::ops::Range;

/// Kind of statement a specifier came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteKind {
    /// `import x from "..."` / `import "..."`
    Import,
    /// `export ... from "..."`
    Export,
    /// `import("...")`
    DynamicImport,
}

/// A specifier string literal in source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecifierSite {
    /// Specifier text exactly as written (without quotes).
    pub raw: String,
    pub kind: SiteKind,
    /// Byte range of the literal contents (quotes excluded).
    pub span: Range<usize>,
    /// Line number (1-indexed).
    pub line: u32,
}

/// Scan source code for specifier sites, in source order.
///
/// Sites are not deduplicated; each occurrence is reported.
#[must_use]
pub fn scan_specifiers(source: &str) -> Vec<SpecifierSite> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut found: Vec<(SiteKind, Range<usize>)> = Vec::new();
    let mut i = 0;

    while i < len {
        let c = bytes[i];

        if let Some(next) = skip_comment(bytes, i) {
            i = next;
            continue;
        }

        if c == b'/' && regex_allowed(bytes, i) {
            i = skip_regex(bytes, i);
            continue;
        }

        // Skip unrelated string literals
        if is_quote(c) {
            i = skip_string(bytes, i);
            continue;
        }

        if matches_keyword(bytes, i, b"import") {
            match scan_import(bytes, i + 6) {
                Some((kind, span, end)) => {
                    found.push((kind, span));
                    i = end;
                }
                None => i += 6,
            }
            continue;
        }

        if matches_keyword(bytes, i, b"export") {
            match scan_clause_from(bytes, i + 6) {
                Some((span, end)) => {
                    found.push((SiteKind::Export, span));
                    i = end;
                }
                None => i += 6,
            }
            continue;
        }

        i += 1;
    }

    let mut line: u32 = 1;
    let mut counted = 0;
    found
        .into_iter()
        .map(|(kind, span)| {
            line += count_newlines(&bytes[counted..span.start]);
            counted = span.start;
            SpecifierSite {
                raw: source[span.clone()].to_string(),
                kind,
                span,
                line,
            }
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn count_newlines(bytes: &[u8]) -> u32 {
    bytes.iter().filter(|&&b| b == b'\n').count() as u32
}

fn is_quote(c: u8) -> bool {
    c == b'"' || c == b'\'' || c == b'`'
}

fn is_ident_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$' || c >= 0x80
}

/// Check if bytes at position match a keyword (with word boundary).
///
/// A preceding `.` also disqualifies the match (`obj.import(...)`).
fn matches_keyword(bytes: &[u8], pos: usize, keyword: &[u8]) -> bool {
    let end = pos + keyword.len();
    if end > bytes.len() || &bytes[pos..end] != keyword {
        return false;
    }

    if pos > 0 && (is_ident_byte(bytes[pos - 1]) || bytes[pos - 1] == b'.') {
        return false;
    }

    !(end < bytes.len() && is_ident_byte(bytes[end]))
}

/// Skip a `//` or `/* */` comment starting at `i`. Returns `None` if there is
/// no comment at `i`.
fn skip_comment(bytes: &[u8], i: usize) -> Option<usize> {
    if bytes.get(i) != Some(&b'/') {
        return None;
    }
    match bytes.get(i + 1) {
        Some(b'/') => {
            let mut j = i + 2;
            while j < bytes.len() && bytes[j] != b'\n' {
                j += 1;
            }
            Some(j)
        }
        Some(b'*') => {
            let mut j = i + 2;
            while j + 1 < bytes.len() && !(bytes[j] == b'*' && bytes[j + 1] == b'/') {
                j += 1;
            }
            Some((j + 2).min(bytes.len()))
        }
        _ => None,
    }
}

/// Skip whitespace and comments.
fn skip_trivia(bytes: &[u8], mut i: usize) -> usize {
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match skip_comment(bytes, i) {
            Some(next) => i = next,
            None => return i,
        }
    }
}

/// Keywords after which a `/` starts a regular expression.
const REGEX_KEYWORDS: &[&[u8]] = &[
    b"return", b"typeof", b"instanceof", b"in", b"of", b"new", b"delete", b"void", b"throw",
    b"case", b"do", b"else", b"yield", b"await",
];

/// Whether a `/` at `pos` starts a regex literal rather than a division,
/// judged by the previous significant byte.
fn regex_allowed(bytes: &[u8], pos: usize) -> bool {
    let mut j = pos;
    while j > 0 && bytes[j - 1].is_ascii_whitespace() {
        j -= 1;
    }
    if j == 0 {
        return true;
    }

    let prev = bytes[j - 1];
    if prev == b')' || prev == b']' {
        return false;
    }
    if !is_ident_byte(prev) {
        return true;
    }

    let end = j;
    while j > 0 && is_ident_byte(bytes[j - 1]) {
        j -= 1;
    }
    REGEX_KEYWORDS.contains(&&bytes[j..end])
}

/// Skip a regex literal starting at the `/` at `start`, including flags.
fn skip_regex(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    let mut in_class = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'\n' => return i,
            b'[' => in_class = true,
            b']' => in_class = false,
            b'/' if !in_class => break,
            _ => {}
        }
        i += 1;
    }
    i += 1;
    while i < bytes.len() && is_ident_byte(bytes[i]) {
        i += 1;
    }
    i.min(bytes.len())
}

/// Skip a string literal starting at the quote at `start`. Returns the index
/// after the closing quote (or end of input).
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() && bytes[i] != quote {
        if bytes[i] == b'\\' {
            i += 1;
        } else if bytes[i] == b'\n' && quote != b'`' {
            return i;
        }
        i += 1;
    }
    (i + 1).min(bytes.len())
}

/// Read a specifier literal at `start` (which must be a quote).
///
/// Returns the content span and the index after the closing quote. Rejects
/// literals with escapes, template substitutions, or line breaks, since
/// their text differs from the value.
fn read_literal(bytes: &[u8], start: usize) -> Option<(Range<usize>, usize)> {
    let quote = *bytes.get(start)?;
    if !is_quote(quote) {
        return None;
    }

    let content_start = start + 1;
    let mut i = content_start;
    while i < bytes.len() && bytes[i] != quote {
        match bytes[i] {
            b'\\' | b'\n' => return None,
            b'$' if quote == b'`' && bytes.get(i + 1) == Some(&b'{') => return None,
            _ => i += 1,
        }
    }

    if i >= bytes.len() {
        return None;
    }

    Some((content_start..i, i + 1))
}

/// Scan what follows `import`.
fn scan_import(bytes: &[u8], start: usize) -> Option<(SiteKind, Range<usize>, usize)> {
    let i = skip_trivia(bytes, start);
    let c = *bytes.get(i)?;

    // Dynamic import: import("...") or import("...", options)
    if c == b'(' {
        let lit = skip_trivia(bytes, i + 1);
        let (span, end) = read_literal(bytes, lit)?;
        let after = skip_trivia(bytes, end);
        return match bytes.get(after) {
            Some(b')' | b',') => Some((SiteKind::DynamicImport, span, end)),
            _ => None,
        };
    }

    // Side-effect import: import "..."
    if c == b'"' || c == b'\'' {
        let (span, end) = read_literal(bytes, i)?;
        return Some((SiteKind::Import, span, end));
    }

    let (span, end) = scan_clause_from(bytes, i)?;
    Some((SiteKind::Import, span, end))
}

/// Scan an import/export clause followed by `from "..."`.
///
/// The clause may only contain identifiers, `*`, braces, commas, whitespace
/// and comments; anything else means this is not a re-export/import form.
fn scan_clause_from(bytes: &[u8], start: usize) -> Option<(Range<usize>, usize)> {
    let mut i = start;
    while i < bytes.len() {
        let c = bytes[i];

        if let Some(next) = skip_comment(bytes, i) {
            i = next;
            continue;
        }

        if matches_keyword(bytes, i, b"from") {
            let lit = skip_trivia(bytes, i + 4);
            return read_literal(bytes, lit);
        }

        if c.is_ascii_whitespace() || is_ident_byte(c) || matches!(c, b'*' | b'{' | b'}' | b',')
        {
            i += 1;
            continue;
        }

        return None;
    }
    None
}
