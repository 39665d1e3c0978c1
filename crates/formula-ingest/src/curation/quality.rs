//! Quality gate and content fingerprint.

use sha2::{Digest, Sha256};

/// Shortest accepted formula, in characters.
pub const MIN_LATEX_CHARS: usize = 3;

/// Longest accepted formula, in characters.
pub const MAX_LATEX_CHARS: usize = 600;

/// Cheap structural checks on the trimmed formula text.
///
/// Brace and parenthesis balance compare counts only; nesting order is not
/// checked, so `"}{"` passes.
pub fn passes_quality_gate(latex: &str) -> bool {
    let latex = latex.trim();
    let length = latex.chars().count();

    if !(MIN_LATEX_CHARS..=MAX_LATEX_CHARS).contains(&length) {
        return false;
    }
    if latex.matches('{').count() != latex.matches('}').count() {
        return false;
    }
    if latex.matches('(').count() != latex.matches(')').count() {
        return false;
    }
    true
}

/// The formula with every whitespace character removed.
pub fn strip_whitespace(latex: &str) -> String {
    latex.trim().chars().filter(|c| !c.is_whitespace()).collect()
}

/// Full SHA-256 hex digest of the whitespace-stripped formula.
pub fn fingerprint(latex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(strip_whitespace(latex).as_bytes());
    format!("{:x}", hasher.finalize())
}
