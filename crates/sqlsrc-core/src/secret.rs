//! Secret configuration values
//!
//! Secrets are held as [`SecretString`] so that `Debug` output is redacted.
//! They are never serialized back out; records only read them.

pub use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

/// Deserialize an optional secret field.
///
/// Use with `#[serde(default, deserialize_with = "...", skip_serializing)]`.
pub fn deserialize_optional<'de, D>(deserializer: D) -> std::result::Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

/// Copy a secret for handing to a collaborator that takes ownership
pub fn duplicate(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Record {
        #[serde(default, deserialize_with = "deserialize_optional")]
        token: Option<SecretString>,
    }

    #[test]
    fn test_deserialize_present_secret() {
        let record: Record = serde_json::from_str(r#"{"token":"dapi-123"}"#).unwrap();
        let token = record.token.expect("token should be set");
        assert_eq!(token.expose_secret(), "dapi-123");
        assert!(!format!("{token:?}").contains("dapi-123"));
    }

    #[test]
    fn test_deserialize_absent_secret() {
        let record: Record = serde_json::from_str("{}").unwrap();
        assert!(record.token.is_none());
    }

    #[test]
    fn test_duplicate_keeps_value() {
        let original = SecretString::from("abc".to_string());
        assert_eq!(duplicate(&original).expose_secret(), "abc");
    }
}
