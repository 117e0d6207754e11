// Copyright 2026 the edmgraph contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # edmgraph
//!
//! An in-memory Entity Data Model (EDM) metadata graph: the typed schema
//! structures an object-relational mapper builds, freezes, validates, and then
//! reads from arbitrary threads forever after.
//!
//! ## Features
//!
//! - **📦 Full EDM node family** - Entity, complex, row, enum, primitive,
//!   association, collection, and reference types with members, facets, sets,
//!   and containers
//! - **🧊 Build-then-freeze lifecycle** - Every item is mutable during
//!   construction and permanently immutable after a single cascading
//!   `set_readonly` transition
//! - **🔍 Rule-based validation** - A visited-once model traversal dispatching
//!   structural rules and collecting all findings instead of failing fast
//! - **🧩 Structural identity** - Deterministic identities and value-based
//!   equality for anonymous row, collection, and reference types, enabling
//!   deduplication across independent construction sites
//! - **🛡️ Thread-safe reads** - Once frozen, the whole reachable graph
//!   supports unsynchronized concurrent readers; derived views are memoized
//!   with publish-once semantics
//!
//! ## Quick Start
//!
//! Add `edmgraph` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! edmgraph = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use edmgraph::prelude::*;
//!
//! let customer = EntityType::new("Customer", "Shop", DataSpace::CSpace)?;
//! let id = EdmProperty::primitive("Id", PrimitiveTypeKind::Int32, false)?;
//! customer.add_member(EdmMemberRef::Property(id.clone()))?;
//! customer.add_key_member(&EdmMemberRef::Property(id))?;
//! customer.set_readonly();
//! assert!(customer.is_readonly());
//! # Ok::<(), edmgraph::Error>(())
//! ```
//!
//! ### Building and Validating a Model
//!
//! ```rust
//! use edmgraph::prelude::*;
//!
//! let model = EdmModel::new(EdmVersion::V3);
//! let container = EntityContainer::new("ShopContainer")?;
//! model.add_container(container)?;
//! model.set_readonly();
//!
//! let validator = DataModelValidator::new();
//! let findings = validator.validate(&model, true);
//! assert!(findings.is_empty());
//! # Ok::<(), edmgraph::Error>(())
//! ```
//!
//! ## Architecture
//!
//! The crate is organized around three layers:
//!
//! - [`crate::metadata::collection`] - the ordered, identity-keyed
//!   [`crate::metadata::collection::MetadataCollection`] and its read-only
//!   projection, the container discipline every graph node uses
//! - [`crate::metadata`] - the `MetadataItem` family: types, members, facets,
//!   sets, containers, and the [`crate::metadata::model::EdmModel`] root
//! - [`crate::metadata::validation`] - the rule sets, visitor, and
//!   [`crate::metadata::validation::DataModelValidator`] entry point
//!
//! ## Lifecycle Contract
//!
//! Construction is single-threaded: builders populate items through `add_*`
//! calls and setters, all of which fail once the item is frozen. Freezing is
//! initiated on the root and cascades depth-first through *owned* children
//! only; back-references (declaring type, entity container, navigation
//! relationship links) are explicit non-owning weak links and are never frozen
//! by a collection that does not own them.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

/// The metadata item graph: types, members, facets, collections, containers,
/// the model root, and the validation engine.
pub mod metadata;

pub mod prelude;

pub use error::{Error, Result};

pub use crate::metadata::{
    cache::MetadataCache,
    model::{EdmModel, EdmVersion},
    validation::{DataModelError, DataModelValidator, Severity},
};
