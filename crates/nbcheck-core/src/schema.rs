//! Speaker list shape checks

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{NbError, Result};
use crate::literal::Value;

/// One entry of the predefined speaker list
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerConfig {
    entries: Vec<(Value, Value)>,
}

impl SpeakerConfig {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    pub fn speaker(&self) -> Option<&Value> {
        self.get("speaker")
    }

    pub fn personality(&self) -> Option<&Value> {
        self.get("personality")
    }

    pub fn accent(&self) -> Option<&Value> {
        self.get("accent")
    }

    pub fn voice(&self) -> Option<&Value> {
        self.get("voice")
    }

    /// Display text of a field, empty when absent
    pub fn field_text(&self, key: &str) -> String {
        self.get(key).map(Value::display_text).unwrap_or_default()
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }
}

impl Serialize for SpeakerConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(&k.display_text(), v)?;
        }
        map.end()
    }
}

/// Validate the evaluated assignment, failing at the first violation.
///
/// Checks, in order: an assignment was found, the value is a list, the list
/// is non-empty, every element is a dict, and every dict carries each of
/// `required_keys` (reported in the order given).
pub fn validate_speakers(
    value: Option<Value>,
    variable: &str,
    required_keys: &[String],
) -> Result<Vec<SpeakerConfig>> {
    let Some(value) = value else {
        return Err(NbError::AssignmentNotFound {
            variable: variable.to_string(),
        });
    };

    let items = match value {
        Value::List(items) => items,
        other => {
            return Err(NbError::NotAList {
                variable: variable.to_string(),
                found: other.type_name().to_string(),
            })
        }
    };

    if items.is_empty() {
        return Err(NbError::EmptyList {
            variable: variable.to_string(),
        });
    }

    let mut speakers = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let entries = match item {
            Value::Dict(entries) => entries,
            other => {
                return Err(NbError::NotAMapping {
                    variable: variable.to_string(),
                    index,
                    found: other.type_name().to_string(),
                })
            }
        };

        let speaker = SpeakerConfig { entries };
        if let Some(key) = required_keys.iter().find(|k| speaker.get(k).is_none()) {
            return Err(NbError::MissingKey {
                variable: variable.to_string(),
                index,
                key: key.clone(),
            });
        }
        speakers.push(speaker);
    }

    Ok(speakers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::REQUIRED_KEYS;

    const VAR: &str = "predefined_speakers";

    fn keys() -> Vec<String> {
        REQUIRED_KEYS.iter().map(|k| k.to_string()).collect()
    }

    fn s(text: &str) -> Value {
        Value::Str(text.to_string())
    }

    fn speaker(pairs: &[(&str, &str)]) -> Value {
        Value::Dict(pairs.iter().map(|(k, v)| (s(k), s(v))).collect())
    }

    fn full(name: &str) -> Value {
        speaker(&[
            ("speaker", name),
            ("personality", "calm"),
            ("accent", "US"),
            ("voice", "v1"),
        ])
    }

    #[test]
    fn test_valid_list() {
        let speakers =
            validate_speakers(Some(Value::List(vec![full("A"), full("B")])), VAR, &keys())
                .unwrap();
        assert_eq!(speakers.len(), 2);
        assert_eq!(speakers[1].speaker(), Some(&s("B")));
        assert_eq!(speakers[0].voice(), Some(&s("v1")));
        assert_eq!(speakers[0].field_text("accent"), "US");
    }

    #[test]
    fn test_extra_keys_tolerated() {
        let mut entry = full("A");
        if let Value::Dict(entries) = &mut entry {
            entries.push((s("language"), s("en")));
        }
        let speakers = validate_speakers(Some(Value::List(vec![entry])), VAR, &keys()).unwrap();
        assert_eq!(speakers[0].entries().len(), 5);
    }

    #[test]
    fn test_missing_assignment() {
        let err = validate_speakers(None, VAR, &keys()).unwrap_err();
        assert!(matches!(err, NbError::AssignmentNotFound { .. }));
    }

    #[test]
    fn test_tuple_is_not_a_list() {
        let err = validate_speakers(Some(Value::Tuple(vec![full("A")])), VAR, &keys()).unwrap_err();
        assert_eq!(err.to_string(), "predefined_speakers must be a list, found tuple");
    }

    #[test]
    fn test_empty_list() {
        let err = validate_speakers(Some(Value::List(vec![])), VAR, &keys()).unwrap_err();
        assert_eq!(err.to_string(), "predefined_speakers list is empty");
    }

    #[test]
    fn test_element_not_a_mapping() {
        let err = validate_speakers(
            Some(Value::List(vec![full("A"), s("B")])),
            VAR,
            &keys(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            NbError::NotAMapping { index: 1, ref found, .. } if found == "str"
        ));
    }

    #[test]
    fn test_first_missing_key_is_reported() {
        let err = validate_speakers(
            Some(Value::List(vec![speaker(&[("speaker", "A")])])),
            VAR,
            &keys(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            NbError::MissingKey { index: 0, ref key, .. } if key == "personality"
        ));
    }

    #[test]
    fn test_non_string_key_does_not_satisfy_requirement() {
        let entry = Value::Dict(vec![
            (s("speaker"), s("A")),
            (s("personality"), s("calm")),
            (s("accent"), s("US")),
            (Value::Bytes(b"voice".to_vec()), s("v1")),
        ]);
        let err = validate_speakers(Some(Value::List(vec![entry])), VAR, &keys()).unwrap_err();
        assert!(matches!(err, NbError::MissingKey { ref key, .. } if key == "voice"));
    }

    #[test]
    fn test_serialize_speaker() {
        let speakers = validate_speakers(Some(Value::List(vec![full("A")])), VAR, &keys()).unwrap();
        assert_eq!(
            serde_json::to_value(&speakers[0]).unwrap(),
            serde_json::json!({
                "speaker": "A", "personality": "calm", "accent": "US", "voice": "v1"
            })
        );
    }
}
