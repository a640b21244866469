//! Declarative field descriptors
//!
//! Every source configuration publishes a static table of [`FieldDescriptor`]s.
//! The table carries what a form renderer or a metadata cache needs (labels,
//! the secret flag, whether changing the field invalidates cached metadata)
//! together with the constraints enforced by [`validate_fields`].
//!
//! Validation and description are driven entirely by the table: a source only
//! has to expose a lookup from field name to its current textual value.

use std::borrow::Cow;

use serde::Serialize;

use crate::{ConfigError, Result};

/// Placeholder rendered in place of secret values
pub const REDACTED: &str = "********";

/// Input kind of a configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line text input
    Text,
    /// Numeric input (may still be stored as text)
    Number,
    /// Masked input whose value must never be displayed or logged
    Secret,
    /// Checkbox/toggle
    Boolean,
}

/// Inclusive integer bounds for a numeric field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldRange {
    pub min: i64,
    pub max: i64,
}

impl FieldRange {
    /// Parse `raw` and check it against the bounds.
    ///
    /// `raw` is parsed as-is; surrounding whitespace is a parse failure.
    pub fn check(&self, field: &'static str, raw: &str) -> Result<i64> {
        raw.parse::<i64>()
            .ok()
            .filter(|value| (self.min..=self.max).contains(value))
            .ok_or_else(|| ConfigError::OutOfRange(field, raw.to_string()))
    }
}

/// Static description of one configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Field identifier, as used in serialized records and error messages
    pub name: &'static str,
    /// Display label
    pub label: &'static str,
    /// Input kind
    pub kind: FieldKind,
    /// Stable serialization ordinal
    pub tag: u32,
    /// Whether a blank value is rejected
    pub required: bool,
    /// Allowed integer range, if any
    pub range: Option<FieldRange>,
    /// Whether changing the value invalidates cached source metadata
    pub metadata_impacting: bool,
}

impl FieldDescriptor {
    const fn new(tag: u32, name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            tag,
            required: false,
            range: None,
            metadata_impacting: true,
        }
    }

    /// Create a text field
    pub const fn text(tag: u32, name: &'static str, label: &'static str) -> Self {
        Self::new(tag, name, label, FieldKind::Text)
    }

    /// Create a numeric field
    pub const fn number(tag: u32, name: &'static str, label: &'static str) -> Self {
        Self::new(tag, name, label, FieldKind::Number)
    }

    /// Create a secret field
    pub const fn secret(tag: u32, name: &'static str, label: &'static str) -> Self {
        Self::new(tag, name, label, FieldKind::Secret)
    }

    /// Create a boolean field
    pub const fn boolean(tag: u32, name: &'static str, label: &'static str) -> Self {
        Self::new(tag, name, label, FieldKind::Boolean)
    }

    // Builder methods
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn range(mut self, min: i64, max: i64) -> Self {
        self.range = Some(FieldRange { min, max });
        self
    }

    pub const fn not_metadata_impacting(mut self) -> Self {
        self.metadata_impacting = false;
        self
    }

    /// Returns true if values of this field must be redacted
    pub fn is_secret(&self) -> bool {
        self.kind == FieldKind::Secret
    }
}

/// A field's label and its display-safe current value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSummary {
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// Check every descriptor in declaration order and stop at the first violation.
///
/// `lookup` returns the current textual value of a field, or `None` when the
/// field is unset. Blank (whitespace-only) values count as unset.
pub fn validate_fields<'a, F>(fields: &[FieldDescriptor], lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<Cow<'a, str>>,
{
    for field in fields {
        let value = lookup(field.name);
        let raw = value.as_deref().unwrap_or_default();

        if raw.trim().is_empty() {
            if field.required {
                tracing::debug!(field = field.name, "required field is blank");
                return Err(ConfigError::MissingField(field.name));
            }
            continue;
        }

        if let Some(range) = field.range {
            range.check(field.name, raw).map_err(|err| {
                tracing::debug!(field = field.name, "field value out of range");
                if field.is_secret() {
                    ConfigError::OutOfRange(field.name, REDACTED.to_string())
                } else {
                    err
                }
            })?;
        }
    }
    Ok(())
}

/// Render every descriptor with its current value, masking secrets.
pub fn describe_fields<'a, F>(fields: &[FieldDescriptor], lookup: F) -> Vec<FieldSummary>
where
    F: Fn(&str) -> Option<Cow<'a, str>>,
{
    fields
        .iter()
        .map(|field| {
            let value = lookup(field.name).unwrap_or_default();
            let value = if field.is_secret() && !value.is_empty() {
                REDACTED.to_string()
            } else if field.is_secret() {
                String::new()
            } else {
                value.into_owned()
            };
            FieldSummary {
                name: field.name,
                label: field.label,
                value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests;
