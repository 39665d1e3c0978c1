//! Ordered keyword rules for topic classification.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{IngestError, Result};

/// Topic assigned when no rule matches.
pub const TOPIC_FALLBACK: &str = "algebra";

/// One topic and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRule {
    pub id: String,
    /// Lowercased keywords.
    pub keywords: Vec<String>,
}

impl TopicRule {
    pub fn new(
        id: impl Into<String>,
        keywords: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }

    fn matches(&self, haystack: &str) -> bool {
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }
}

/// Topic rules in file order.
///
/// The order is observable: it fixes the order of a record's topic list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicRules {
    rules: Vec<TopicRule>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TopicsSection {
    Ordered(IndexMap<String, Value>),
    #[allow(dead_code)]
    Other(Value),
}

#[derive(Deserialize)]
struct TopicMapFile {
    #[serde(default)]
    topics: Option<TopicsSection>,
}

impl TopicRules {
    pub fn new(rules: Vec<TopicRule>) -> Self {
        Self { rules }
    }

    /// Load rules from a YAML or JSON topic map (chosen by extension).
    ///
    /// The document has a `topics` mapping of topic id to
    /// `{ keywords: [...] }`. Rules without a usable keyword list match
    /// nothing; a missing or non-mapping `topics` section yields no rules.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: TopicMapFile = serde_yaml::from_str(contents)?;
        Ok(Self::from_file(file))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let file: TopicMapFile = serde_json::from_str(contents)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: TopicMapFile) -> Self {
        let Some(TopicsSection::Ordered(topics)) = file.topics else {
            return Self::default();
        };

        let rules = topics
            .into_iter()
            .map(|(id, rule)| {
                let keywords: Vec<String> = rule
                    .get("keywords")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                TopicRule::new(id, keywords)
            })
            .collect();

        Self { rules }
    }

    pub fn rules(&self) -> &[TopicRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Topics whose keywords appear in the title, formula, or subjects.
    ///
    /// Substring match over a lowercased blob; the result follows rule
    /// order and is never empty.
    pub fn classify(
        &self,
        page_title: Option<&str>,
        latex: &str,
        subjects: &[String],
    ) -> Vec<String> {
        let blob = [
            page_title.unwrap_or("").to_lowercase(),
            latex.to_lowercase(),
            subjects.join(" ").to_lowercase(),
        ]
        .join(" ");

        let mut selected: Vec<String> = self
            .rules
            .iter()
            .filter(|rule| rule.matches(&blob))
            .map(|rule| rule.id.clone())
            .collect();

        if selected.is_empty() {
            selected.push(TOPIC_FALLBACK.to_string());
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TOPIC_MAP: &str = r#"
topics:
  trigonometry:
    keywords: ["\\sin", "\\cos", "trigonometric"]
  calculus:
    keywords: ["\\int", "derivative", "Integral"]
  algebra:
    keywords: ["polynomial"]
"#;

    #[test]
    fn test_yaml_preserves_declared_order() {
        let rules = TopicRules::from_yaml(TOPIC_MAP).unwrap();
        let ids: Vec<&str> = rules.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["trigonometry", "calculus", "algebra"]);
    }

    #[test]
    fn test_keywords_are_lowercased() {
        let rules = TopicRules::from_yaml(TOPIC_MAP).unwrap();
        assert_eq!(rules.rules()[1].keywords[2], "integral");
    }

    #[test]
    fn test_classify_follows_rule_order() {
        let rules = TopicRules::from_yaml(TOPIC_MAP).unwrap();
        let topics = rules.classify(None, "\\int \\sin x \\, dx", &[]);
        assert_eq!(topics, vec!["trigonometry", "calculus"]);
    }

    #[test]
    fn test_classify_uses_title_and_subjects() {
        let rules = TopicRules::from_yaml(TOPIC_MAP).unwrap();
        assert_eq!(
            rules.classify(Some("Fundamental theorem of Integral calculus"), "F'(x)=f(x)", &[]),
            vec!["calculus"]
        );
        assert_eq!(
            rules.classify(None, "p(x)=0", &["Polynomial".to_string()]),
            vec!["algebra"]
        );
    }

    #[test]
    fn test_classify_falls_back() {
        let rules = TopicRules::from_yaml(TOPIC_MAP).unwrap();
        assert_eq!(rules.classify(Some("Graph"), "V - E + F = 2", &[]), vec!["algebra"]);
        assert_eq!(TopicRules::default().classify(None, "x", &[]), vec![TOPIC_FALLBACK]);
    }

    #[test]
    fn test_json_topic_map() {
        let rules = TopicRules::from_json(
            r#"{"topics": {"statistics": {"keywords": ["variance"]},
                           "probability": {"keywords": ["P(A)"]}}}"#,
        )
        .unwrap();
        let ids: Vec<&str> = rules.rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["statistics", "probability"]);
    }

    #[test]
    fn test_malformed_sections_degrade() {
        assert!(TopicRules::from_yaml("").unwrap().is_empty());
        assert!(TopicRules::from_yaml("topics: [a, b]").unwrap().is_empty());
        assert!(TopicRules::from_yaml("other: 1").unwrap().is_empty());

        let yaml = "topics:\n  geometry: null\n  calculus: {keywords: 5}\n";
        let rules = TopicRules::from_yaml(yaml).unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules.rules().iter().all(|r| r.keywords.is_empty()));
    }

    #[test]
    fn test_load_by_extension() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("topic_map.yaml");
        fs::write(&yaml, TOPIC_MAP).unwrap();
        assert_eq!(TopicRules::load(&yaml).unwrap().len(), 3);

        assert!(matches!(
            TopicRules::load(dir.path().join("missing.yaml")),
            Err(IngestError::Io { .. })
        ));
    }
}
