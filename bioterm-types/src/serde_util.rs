//! Serde helpers for device field conventions

/// Booleans the device spells as `"yes"` / `"no"`
pub mod yes_no {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn as_str(value: bool) -> &'static str {
        if value { "yes" } else { "no" }
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(as_str(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Flag(bool),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(flag) => Ok(flag),
            Raw::Text(text) => match text.as_str() {
                "yes" => Ok(true),
                "no" => Ok(false),
                other => Err(de::Error::invalid_value(de::Unexpected::Str(other), &"\"yes\" or \"no\"")),
            },
        }
    }
}

/// Identifiers some firmware sends as numbers and others as strings
pub mod lenient_string {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(render(Value::deserialize(deserializer)?))
    }

    pub fn deserialize_vec<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let values = Option::<Vec<Value>>::deserialize(deserializer)?;
        Ok(values.unwrap_or_default().into_iter().map(render).collect())
    }

    fn render(value: Value) -> String {
        match value {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Flags {
        #[serde(with = "super::yes_no")]
        enabled: bool,
    }

    #[derive(Debug, Deserialize)]
    struct Ids {
        #[serde(deserialize_with = "super::lenient_string::deserialize")]
        id: String,
        #[serde(default, deserialize_with = "super::lenient_string::deserialize_vec")]
        others: Vec<String>,
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(serde_json::to_value(Flags { enabled: true }).unwrap(), json!({"enabled": "yes"}));
        assert_eq!(serde_json::from_value::<Flags>(json!({"enabled": "no"})).unwrap(), Flags { enabled: false });
        assert_eq!(serde_json::from_value::<Flags>(json!({"enabled": true})).unwrap(), Flags { enabled: true });
        assert!(serde_json::from_value::<Flags>(json!({"enabled": "maybe"})).is_err());
    }

    #[test]
    fn test_lenient_string() {
        let ids: Ids = serde_json::from_value(json!({"id": 42, "others": ["7", 8]})).unwrap();
        assert_eq!(ids.id, "42");
        assert_eq!(ids.others, vec!["7", "8"]);

        let ids: Ids = serde_json::from_value(json!({"id": "a"})).unwrap();
        assert!(ids.others.is_empty());
    }
}
