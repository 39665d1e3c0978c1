//! `<math>` markup matching and text normalization.

use once_cell::sync::Lazy;
use regex::Regex;

/// `<math ...>body</math>`, case-insensitive, body may span lines.
static MATH_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<math[^>]*>(.*?)</math>").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Decode HTML entities, trim, and collapse whitespace runs to one space.
pub fn normalize_latex(raw: &str) -> String {
    let decoded = html_escape::decode_html_entities(raw);
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

/// Normalized bodies of every `<math>` element in `text`, skipping empties.
pub fn math_fragments(text: &str) -> impl Iterator<Item = String> + '_ {
    MATH_TAG
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|body| normalize_latex(body.as_str()))
        .filter(|latex| !latex.is_empty())
}
