//! Tests for the descriptor-driven validation routines

use std::borrow::Cow;
use std::collections::HashMap;

use super::*;

static FIELDS: [FieldDescriptor; 4] = [
    FieldDescriptor::text(1, "host", "Host").required(),
    FieldDescriptor::number(2, "port", "Port").required().range(1, 65535),
    FieldDescriptor::secret(3, "token", "Token").required(),
    FieldDescriptor::number(4, "batch", "Batch size")
        .range(1, 100)
        .not_metadata_impacting(),
];

fn lookup<'a>(
    values: &'a HashMap<&'static str, &'static str>,
) -> impl Fn(&str) -> Option<Cow<'static, str>> + 'a {
    |name: &str| values.get(name).map(|v| Cow::Borrowed(*v))
}

fn complete() -> HashMap<&'static str, &'static str> {
    HashMap::from([("host", "db.local"), ("port", "443"), ("token", "s3cr3t")])
}

#[test]
fn test_builder_flags() {
    assert!(FIELDS[0].required);
    assert!(FIELDS[0].metadata_impacting);
    assert_eq!(FIELDS[1].range, Some(FieldRange { min: 1, max: 65535 }));
    assert!(FIELDS[2].is_secret());
    assert!(!FIELDS[3].required);
    assert!(!FIELDS[3].metadata_impacting);
}

#[test]
fn test_valid_values_pass() {
    let values = complete();
    assert!(validate_fields(&FIELDS, lookup(&values)).is_ok());
}

#[test]
fn test_first_violation_in_declaration_order() {
    let values = HashMap::from([("port", "0")]);
    let err = validate_fields(&FIELDS, lookup(&values)).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField("host")));
}

#[test]
fn test_whitespace_counts_as_blank() {
    let mut values = complete();
    values.insert("host", "   ");
    let err = validate_fields(&FIELDS, lookup(&values)).unwrap_err();
    assert!(matches!(err, ConfigError::MissingField("host")));
}

#[test]
fn test_range_rejects_out_of_bounds_and_garbage() {
    for bad in ["0", "65536", "abc", "12.5", " 443"] {
        let mut values = complete();
        values.insert("port", bad);
        match validate_fields(&FIELDS, lookup(&values)) {
            Err(ConfigError::OutOfRange("port", value)) => assert_eq!(value, bad),
            other => panic!("expected OutOfRange for {bad:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_optional_field_skipped_when_blank_but_checked_when_set() {
    let mut values = complete();
    values.insert("batch", "");
    assert!(validate_fields(&FIELDS, lookup(&values)).is_ok());

    values.insert("batch", "500");
    let err = validate_fields(&FIELDS, lookup(&values)).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange("batch", _)));
}

#[test]
fn test_missing_secret_error_does_not_carry_value() {
    let mut values = complete();
    values.insert("token", " ");
    let err = validate_fields(&FIELDS, lookup(&values)).unwrap_err();
    assert_eq!(err.to_string(), "Missing required field: token");
}

#[test]
fn test_range_on_secret_is_redacted() {
    let fields = [FieldDescriptor::secret(1, "pin", "PIN").range(0, 9999)];
    let values = HashMap::from([("pin", "123456")]);
    let err = validate_fields(&fields, lookup(&values)).unwrap_err();
    assert!(!err.to_string().contains("123456"));
    assert!(matches!(err, ConfigError::OutOfRange("pin", ref v) if v == REDACTED));
}

#[test]
fn test_describe_masks_secrets() {
    let values = complete();
    let summary = describe_fields(&FIELDS, lookup(&values));
    assert_eq!(summary.len(), 4);
    assert_eq!(summary[0].value, "db.local");
    assert_eq!(summary[2].label, "Token");
    assert_eq!(summary[2].value, REDACTED);
    assert_eq!(summary[3].value, "");
}

#[test]
fn test_describe_unset_secret_is_empty() {
    let values = HashMap::new();
    let summary = describe_fields(&FIELDS, lookup(&values));
    assert_eq!(summary[2].value, "");
}
