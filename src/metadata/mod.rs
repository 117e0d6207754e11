//! The EDM metadata item graph.
//!
//! This module provides the complete metadata node family of an Entity Data
//! Model: structural and scalar types, members, facets, entity sets and
//! containers, and the [`model::EdmModel`] traversal root, together with the
//! shared build-then-freeze lifecycle every node obeys.
//!
//! # Key Components
//!
//! - [`collection::MetadataCollection`] - ordered, identity-keyed container
//!   with a mutable and a frozen face
//! - [`item::MetadataItem`] - the uniform read-only transition protocol
//! - [`types`] - the `EdmType` node kinds and their members
//! - [`container::EntityContainer`] - entity/association set ownership
//! - [`validation`] - the rule-based model validator
//!
//! # Lifecycle
//!
//! Items are constructed mutable, populated by builders, then frozen once via
//! `set_readonly()`, which cascades depth-first through owned children.
//! After the root freeze completes, the entire reachable graph is safe for
//! unsynchronized concurrent reads.

pub mod backref;
pub mod cache;
pub mod collection;
pub mod container;
pub mod digest;
pub mod facets;
pub mod flags;
pub mod function;
pub mod item;
pub mod kind;
pub mod lazy;
pub mod model;
pub mod properties;
pub mod typeusage;
pub mod types;
pub mod validation;
