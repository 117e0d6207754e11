//! The shared sink rules report findings through.

use std::sync::Arc;

use crate::metadata::{
    model::EdmModel,
    validation::{error::Severity, DataModelError, ModelItem},
};

/// Per-validation state: the model under validation and a lock-free append
/// sink for findings, shared by concurrently running rules.
#[derive(Debug)]
pub struct ValidationContext {
    model: Arc<EdmModel>,
    sink: boxcar::Vec<DataModelError>,
}

impl ValidationContext {
    /// Start a validation of `model`.
    #[must_use]
    pub fn new(model: Arc<EdmModel>) -> Self {
        ValidationContext {
            model,
            sink: boxcar::Vec::new(),
        }
    }

    /// The model under validation.
    #[must_use]
    pub fn model(&self) -> &Arc<EdmModel> {
        &self.model
    }

    /// Report an error-severity finding against `item`.
    pub fn error(&self, rule_name: &'static str, item: &ModelItem, message: String) {
        self.report(Severity::Error, rule_name, item, None, message);
    }

    /// Report an error-severity finding pinpointing one property of `item`.
    pub fn error_on(
        &self,
        rule_name: &'static str,
        item: &ModelItem,
        property_name: &str,
        message: String,
    ) {
        self.report(
            Severity::Error,
            rule_name,
            item,
            Some(property_name.to_string()),
            message,
        );
    }

    /// Report a warning-severity finding against `item`.
    pub fn warning(&self, rule_name: &'static str, item: &ModelItem, message: String) {
        self.report(Severity::Warning, rule_name, item, None, message);
    }

    fn report(
        &self,
        severity: Severity,
        rule_name: &'static str,
        item: &ModelItem,
        property_name: Option<String>,
        message: String,
    ) {
        self.sink.push(DataModelError {
            severity,
            rule_name,
            item_kind: item.item_kind(),
            item_identity: item.identity(),
            property_name,
            message,
        });
    }

    /// Number of findings reported so far.
    #[must_use]
    pub fn finding_count(&self) -> usize {
        self.sink.count()
    }

    /// Drain the sink into a deterministically sorted finding list.
    #[must_use]
    pub fn into_findings(self) -> Vec<DataModelError> {
        let mut findings: Vec<DataModelError> =
            self.sink.into_iter().collect();
        findings.sort_by_key(DataModelError::sort_key);
        findings
    }
}
