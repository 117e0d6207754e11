//! Rule-based validation of a frozen (or in-progress) metadata graph.
//!
//! Validation is collect-all: the traversal visits every reachable item
//! exactly once, evaluates every applicable rule, and accumulates findings
//! instead of failing on the first one. Findings are plain
//! [`DataModelError`] records; nothing is thrown unless a caller opts into
//! [`DataModelValidator::validate_or_fail`].
//!
//! # Key Components
//!
//! - [`DataModelValidator`]: Entry point holding the semantic and syntactic
//!   rule lists
//! - [`ValidationRule`] / [`RuleTarget`]: One named check bound to the item
//!   kind it applies to
//! - [`ValidationContext`]: Shared error sink the rules report through,
//!   safe for parallel rule evaluation
//! - [`ModelItem`]: Polymorphic handle over every visitable node kind
//!
//! # Determinism
//!
//! Rules run in parallel, so arrival order at the sink is nondeterministic;
//! findings are sorted before being returned, making two validations of the
//! same graph byte-for-byte identical.

mod context;
mod error;
mod rules;
mod validator;
mod visitor;

pub use context::ValidationContext;
pub use error::{DataModelError, Severity};
pub use rules::{RuleTarget, ValidationRule};
pub use validator::DataModelValidator;
pub use visitor::{collect_model_items, ModelItem};
