//! Source configuration trait

use std::borrow::Cow;

use crate::{ArpDialect, FieldDescriptor, FieldSummary, Result, SourceType};

/// A typed, validated configuration for one external source.
///
/// Implementors expose their field table and a lookup by field name; the
/// default `validate` and `describe` are driven entirely by that table.
pub trait SourceConf: Send + Sync {
    /// Static metadata for the source type
    fn source_type(&self) -> SourceType;

    /// Field descriptors in declaration order
    fn fields(&self) -> &'static [FieldDescriptor];

    /// Current textual value of a field, `None` when unset or unknown.
    ///
    /// Secret fields yield [`crate::REDACTED`] when set, never the value.
    fn field_value(&self, name: &str) -> Option<Cow<'_, str>>;

    /// Pushdown rules for this source
    fn dialect(&self) -> &'static ArpDialect;

    /// Check required-field and range constraints in declaration order
    fn validate(&self) -> Result<()> {
        crate::validate_fields(self.fields(), |name| self.field_value(name))
    }

    /// Labels and display-safe values for every field
    fn describe(&self) -> Vec<FieldSummary> {
        crate::describe_fields(self.fields(), |name| self.field_value(name))
    }

    /// Look up a descriptor by name
    fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields().iter().find(|f| f.name == name)
    }
}
