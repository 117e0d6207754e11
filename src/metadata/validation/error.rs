//! Validation finding records.

use crate::metadata::kind::BuiltInTypeKind;

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Advisory; never fails a throw-on-error validation
    Warning,
    /// A schema error
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One validation finding: which rule fired, on which item, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataModelError {
    /// Finding severity
    pub severity: Severity,
    /// Name of the rule that fired
    pub rule_name: &'static str,
    /// Kind of the offending item
    pub item_kind: BuiltInTypeKind,
    /// Identity of the offending item
    pub item_identity: String,
    /// The member or property the finding pinpoints, when narrower than
    /// the item itself
    pub property_name: Option<String>,
    /// Human-readable description
    pub message: String,
}

impl DataModelError {
    /// The key findings are sorted by, making validator output
    /// deterministic regardless of rule evaluation order.
    #[must_use]
    pub fn sort_key(&self) -> (String, &'static str, String, String) {
        (
            self.item_identity.clone(),
            self.rule_name,
            self.property_name.clone().unwrap_or_default(),
            self.message.clone(),
        )
    }

    /// Whether this finding fails a throw-on-error validation.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for DataModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{0} [{1}] {2} '{3}'",
            self.severity, self.rule_name, self.item_kind, self.item_identity
        )?;
        if let Some(property) = &self.property_name {
            write!(f, " property '{property}'")?;
        }
        write!(f, ": {0}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering() {
        let finding = DataModelError {
            severity: Severity::Error,
            rule_name: "EntityTypeMustHaveKey",
            item_kind: BuiltInTypeKind::EntityType,
            item_identity: "Shop.Customer".to_string(),
            property_name: None,
            message: "no key members are declared".to_string(),
        };
        assert_eq!(
            finding.to_string(),
            "error [EntityTypeMustHaveKey] EntityType 'Shop.Customer': no key members are declared"
        );
        assert!(finding.is_error());
    }

    #[test]
    fn test_rendering_with_property() {
        let finding = DataModelError {
            severity: Severity::Error,
            rule_name: "KeyMembersMustNotBeNullable",
            item_kind: BuiltInTypeKind::EntityType,
            item_identity: "Shop.Customer".to_string(),
            property_name: Some("Id".to_string()),
            message: "key member is nullable".to_string(),
        };
        assert_eq!(
            finding.to_string(),
            "error [KeyMembersMustNotBeNullable] EntityType 'Shop.Customer' property 'Id': key member is nullable"
        );
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Warning < Severity::Error);
    }
}
