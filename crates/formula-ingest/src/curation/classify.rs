//! Difficulty and name inference.

use crate::record::Difficulty;

/// Structural markers that each add one point per occurrence.
pub const COMPLEXITY_MARKERS: [&str; 6] = [
    "\\frac", "\\int", "\\sum", "\\prod", "\\partial", "\\nabla",
];

/// Maximum characters of formula text used in a synthesized name.
const NAME_PREFIX_CHARS: usize = 42;

/// Total occurrences of every [`COMPLEXITY_MARKERS`] entry.
pub fn complexity_score(latex: &str) -> usize {
    COMPLEXITY_MARKERS
        .iter()
        .map(|marker| latex.matches(marker).count())
        .sum()
}

/// Tier from marker score and character length.
pub fn infer_difficulty(latex: &str) -> Difficulty {
    let score = complexity_score(latex);
    let length = latex.chars().count();

    if score <= 1 && length < 40 {
        Difficulty::Easy
    } else if score <= 4 && length < 120 {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}

/// Page title when present, else a name built from the formula itself.
pub fn infer_name(page_title: Option<&str>, latex: &str) -> String {
    let title = page_title.unwrap_or("").trim();
    if !title.is_empty() {
        return title.to_string();
    }

    let latex = latex.trim();
    if latex.is_empty() {
        return "Imported formula".to_string();
    }

    let prefix: String = latex.chars().take(NAME_PREFIX_CHARS).collect();
    format!("Formula: {}", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_counts_every_occurrence() {
        assert_eq!(complexity_score("x+y"), 0);
        assert_eq!(complexity_score("\\frac{a}{b}"), 1);
        assert_eq!(complexity_score("\\frac{\\partial f}{\\partial x}"), 3);
        assert_eq!(complexity_score("\\sum\\sum\\prod\\nabla\\int"), 5);
    }

    #[test]
    fn test_easy_medium_boundary_on_length() {
        assert_eq!(infer_difficulty(&"x".repeat(39)), Difficulty::Easy);
        assert_eq!(infer_difficulty(&"x".repeat(40)), Difficulty::Medium);
    }

    #[test]
    fn test_medium_hard_boundaries() {
        assert_eq!(infer_difficulty(&"x".repeat(119)), Difficulty::Medium);
        assert_eq!(infer_difficulty(&"x".repeat(120)), Difficulty::Hard);
        assert_eq!(infer_difficulty("\\frac\\frac"), Difficulty::Medium);
        assert_eq!(infer_difficulty("\\frac\\frac\\frac\\frac"), Difficulty::Medium);
        assert_eq!(infer_difficulty("\\frac\\frac\\frac\\frac\\frac"), Difficulty::Hard);
    }

    #[test]
    fn test_single_marker_short_formula_is_easy() {
        assert_eq!(infer_difficulty("\\frac{a}{b}"), Difficulty::Easy);
    }

    #[test]
    fn test_name_prefers_title() {
        assert_eq!(
            infer_name(Some("  Heron's formula "), "A = \\sqrt{s(s-a)}"),
            "Heron's formula"
        );
    }

    #[test]
    fn test_name_falls_back_to_formula_prefix() {
        let latex = "a".repeat(50);
        assert_eq!(infer_name(None, &latex), format!("Formula: {}", "a".repeat(42)));
        assert_eq!(infer_name(Some("   "), "x^2"), "Formula: x^2");
    }

    #[test]
    fn test_name_for_empty_everything() {
        assert_eq!(infer_name(None, "  "), "Imported formula");
    }
}
