//! The validation entry point.

use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    metadata::{
        model::EdmModel,
        validation::{
            context::ValidationContext,
            error::DataModelError,
            rules::{semantic_rules, syntactic_rules, ValidationRule},
            visitor::collect_model_items,
        },
    },
    Error, Result,
};

/// Validates a metadata graph against the built-in (and any caller-added)
/// rule sets.
///
/// Validation never mutates the graph and is safe on both mutable and
/// frozen models; rules are evaluated in parallel over the visited items
/// and findings come back deterministically sorted.
#[derive(Debug)]
pub struct DataModelValidator {
    semantic: Vec<ValidationRule>,
    syntactic: Vec<ValidationRule>,
}

impl DataModelValidator {
    /// A validator carrying the built-in rule sets.
    #[must_use]
    pub fn new() -> Self {
        DataModelValidator {
            semantic: semantic_rules(),
            syntactic: syntactic_rules(),
        }
    }

    /// Add a caller-defined semantic rule.
    pub fn add_rule(&mut self, rule: ValidationRule) {
        self.semantic.push(rule);
    }

    /// Validate `model`, returning every finding.
    ///
    /// With `validate_syntax` the name/namespace well-formedness rules run
    /// in addition to the semantic set.
    #[must_use]
    pub fn validate(&self, model: &Arc<EdmModel>, validate_syntax: bool) -> Vec<DataModelError> {
        let items = collect_model_items(model);
        let context = ValidationContext::new(Arc::clone(model));

        let mut rules: Vec<&ValidationRule> = self.semantic.iter().collect();
        if validate_syntax {
            rules.extend(self.syntactic.iter());
        }

        items.par_iter().for_each(|item| {
            for rule in &rules {
                if rule.target.matches(item) {
                    (rule.check)(&context, item);
                }
            }
        });

        context.into_findings()
    }

    /// Validate and fail on any error-severity finding.
    ///
    /// Warnings are returned, never thrown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationFailed`] carrying the combined error
    /// messages when at least one error-severity finding exists.
    pub fn validate_or_fail(
        &self,
        model: &Arc<EdmModel>,
        validate_syntax: bool,
    ) -> Result<Vec<DataModelError>> {
        let findings = self.validate(model, validate_syntax);
        let errors: Vec<&DataModelError> =
            findings.iter().filter(|finding| finding.is_error()).collect();
        if errors.is_empty() {
            return Ok(findings);
        }
        let message = errors
            .iter()
            .map(|finding| finding.to_string())
            .collect::<Vec<String>>()
            .join("; ");
        Err(Error::ValidationFailed {
            failures: errors.len(),
            message,
        })
    }
}

impl Default for DataModelValidator {
    fn default() -> Self {
        Self::new()
    }
}
