use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// One usage pair illustrating a translation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Example {
    pub src: String,
    pub dst: String,
}

/// One candidate rendering of a word sense.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Translation {
    pub featured: bool,
    pub text: String,
    pub pos: String,
    pub examples: Vec<Example>,
    pub usage_frequency: Option<String>,
}

/// One sense of the queried word, as resolved by the API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub featured: bool,
    pub text: String,
    pub pos: String,
    pub translations: Vec<Translation>,
}

impl Example {
    fn from_json(value: &Value, path: &str, violations: &mut Vec<String>) -> Option<Self> {
        let obj = expect_object(value, path, violations)?;
        let src = expect_string(obj.get("src"), &format!("{path}.src"), violations);
        let dst = expect_string(obj.get("dst"), &format!("{path}.dst"), violations);
        Some(Example {
            src: src?,
            dst: dst?,
        })
    }
}

impl Translation {
    fn from_json(value: &Value, path: &str, violations: &mut Vec<String>) -> Option<Self> {
        let obj = expect_object(value, path, violations)?;

        let featured = expect_bool(obj.get("featured"), &format!("{path}.featured"), violations);
        let text = expect_string(obj.get("text"), &format!("{path}.text"), violations);
        let pos = expect_string(obj.get("pos"), &format!("{path}.pos"), violations);

        let examples_path = format!("{path}.examples");
        let examples = expect_array(obj.get("examples"), &examples_path, violations).map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    Example::from_json(item, &format!("{examples_path}[{i}]"), violations)
                })
                .collect::<Vec<Example>>()
        });

        // null and absent are equivalent for usage_frequency
        let usage_frequency = match obj.get("usage_frequency") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                violations.push(format!("{path}.usage_frequency: expected string or null"));
                None
            }
        };

        Some(Translation {
            featured: featured?,
            text: text?,
            pos: pos?,
            examples: examples?,
            usage_frequency,
        })
    }
}

impl WordEntry {
    /// Builds a `WordEntry` from raw API data, reporting every missing or
    /// mistyped field at once instead of stopping at the first one.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let mut violations = Vec::new();
        let entry = Self::from_json_at(value, "entry", &mut violations);
        match entry {
            Some(entry) if violations.is_empty() => Ok(entry),
            _ => Err(ValidationError { violations }),
        }
    }

    fn from_json_at(value: &Value, path: &str, violations: &mut Vec<String>) -> Option<Self> {
        let obj = expect_object(value, path, violations)?;

        let featured = expect_bool(obj.get("featured"), &format!("{path}.featured"), violations);
        let text = expect_string(obj.get("text"), &format!("{path}.text"), violations);
        let pos = expect_string(obj.get("pos"), &format!("{path}.pos"), violations);

        let translations_path = format!("{path}.translations");
        let translations =
            expect_array(obj.get("translations"), &translations_path, violations).map(|items| {
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, item)| {
                        Translation::from_json(
                            item,
                            &format!("{translations_path}[{i}]"),
                            violations,
                        )
                    })
                    .collect::<Vec<Translation>>()
            });

        Some(WordEntry {
            featured: featured?,
            text: text?,
            pos: pos?,
            translations: translations?,
        })
    }
}

/// Parses the full batch returned for one queried word. Any malformed
/// entry fails the whole batch; the violations of every entry are merged
/// into a single error.
pub fn parse_batch(values: &[Value]) -> Result<Vec<WordEntry>, ValidationError> {
    let mut violations = Vec::new();
    let mut entries = Vec::with_capacity(values.len());

    for (i, value) in values.iter().enumerate() {
        if let Some(entry) = WordEntry::from_json_at(value, &format!("entry[{i}]"), &mut violations)
        {
            entries.push(entry);
        }
    }

    if violations.is_empty() {
        Ok(entries)
    } else {
        Err(ValidationError { violations })
    }
}

fn expect_object<'a>(
    value: &'a Value,
    path: &str,
    violations: &mut Vec<String>,
) -> Option<&'a serde_json::Map<String, Value>> {
    match value.as_object() {
        Some(obj) => Some(obj),
        None => {
            violations.push(format!("{path}: expected object"));
            None
        }
    }
}

fn expect_bool(value: Option<&Value>, path: &str, violations: &mut Vec<String>) -> Option<bool> {
    match value {
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            violations.push(format!("{path}: expected boolean"));
            None
        }
        None => {
            violations.push(format!("{path}: missing required field"));
            None
        }
    }
}

fn expect_string(value: Option<&Value>, path: &str, violations: &mut Vec<String>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            violations.push(format!("{path}: expected string"));
            None
        }
        None => {
            violations.push(format!("{path}: missing required field"));
            None
        }
    }
}

fn expect_array<'a>(
    value: Option<&'a Value>,
    path: &str,
    violations: &mut Vec<String>,
) -> Option<&'a Vec<Value>> {
    match value {
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            violations.push(format!("{path}: expected array"));
            None
        }
        None => {
            violations.push(format!("{path}: missing required field"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_complete_entry() {
        let value = json!({
            "featured": true,
            "text": "go",
            "pos": "verb",
            "translations": [
                {
                    "featured": true,
                    "text": "aller",
                    "pos": "verb",
                    "examples": [
                        {"src": "I go to school", "dst": "Je vais à l'école"}
                    ],
                    "usage_frequency": "often"
                },
                {
                    "featured": false,
                    "text": "se rendre",
                    "pos": "verb",
                    "examples": []
                }
            ]
        });

        let entry = WordEntry::from_json(&value).unwrap();

        assert!(entry.featured);
        assert_eq!(entry.text, "go");
        assert_eq!(entry.pos, "verb");
        assert_eq!(entry.translations.len(), 2);
        assert_eq!(entry.translations[0].examples[0].src, "I go to school");
        assert_eq!(
            entry.translations[0].usage_frequency.as_deref(),
            Some("often")
        );
        assert_eq!(entry.translations[1].usage_frequency, None);
        assert!(entry.translations[1].examples.is_empty());
    }

    #[test]
    fn empty_example_sentences_are_valid() {
        let value = json!({
            "featured": false,
            "text": "x",
            "pos": "noun",
            "translations": [{
                "featured": true,
                "text": "y",
                "pos": "noun",
                "examples": [{"src": "", "dst": ""}]
            }]
        });

        assert!(WordEntry::from_json(&value).is_ok());
    }

    #[test]
    fn reports_all_violations_at_once() {
        let value = json!({
            "featured": "yes",
            "pos": 3,
            "translations": [
                {"featured": true, "text": "a", "pos": "noun", "examples": [{"src": "s"}]}
            ]
        });

        let error = WordEntry::from_json(&value).unwrap_err();

        assert_eq!(error.violations.len(), 4);
        assert!(error
            .violations
            .contains(&"entry.featured: expected boolean".to_string()));
        assert!(error
            .violations
            .contains(&"entry.text: missing required field".to_string()));
        assert!(error
            .violations
            .contains(&"entry.pos: expected string".to_string()));
        assert!(error.violations.contains(
            &"entry.translations[0].examples[0].dst: missing required field".to_string()
        ));
    }

    #[test]
    fn batch_fails_when_any_entry_is_malformed() {
        let values = vec![
            json!({"featured": true, "text": "a", "pos": "noun", "translations": []}),
            json!({"featured": true, "text": "b", "pos": "noun"}),
        ];

        let error = parse_batch(&values).unwrap_err();

        assert_eq!(
            error.violations,
            vec!["entry[1].translations: missing required field".to_string()]
        );
    }

    #[test]
    fn empty_batch_is_valid() {
        assert!(parse_batch(&[]).unwrap().is_empty());
    }
}
