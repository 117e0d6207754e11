//! The ordered, identity-keyed metadata container.
//!
//! [`MetadataCollection`] is the core container discipline of the graph: an
//! insertion-ordered sequence of uniquely-identified items with amortized O(1)
//! name lookup through a lazily built index, a freeze-on-demand transition,
//! and a read-only projection ([`ReadOnlyMetadataCollection`]) that exposes
//! the same backing store immutably while retaining a crate-visible
//! back-channel for privileged mutation by the owning type.
//!
//! # Lookup Semantics
//!
//! Identity comparison is ordinal. Case-insensitive lookup is a strictly
//! secondary fallback: it never shadows an exact-case hit, and when several
//! items differ only by case it refuses to pick one.
//!
//! # Cascading
//!
//! `set_readonly` freezes the collection itself. Cascading the freeze to
//! elements is the owning item's job - a collection cannot tell which of its
//! relationships are ownership edges and which are back-references.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, RwLock,
};

use crate::{Error, Result};

/// Anything that lives in a [`MetadataCollection`]: a cheaply cloneable
/// handle (an `Arc` or an enum of `Arc`s) with a stable identity string used
/// for equality and lookup.
pub trait NamedItem: Clone {
    /// The identity string of the item; ordinal comparison.
    fn identity(&self) -> String;
}

/// An insertion-ordered collection of uniquely-identified metadata items.
///
/// Mutable until [`MetadataCollection::set_readonly`] is called, permanently
/// frozen afterwards. The name index is built on first lookup and dropped
/// whenever membership changes; a stale index would be a correctness bug, not
/// a performance one.
#[derive(Debug)]
pub struct MetadataCollection<T: NamedItem> {
    items: RwLock<Vec<T>>,
    index: RwLock<Option<HashMap<String, usize>>>,
    readonly: AtomicBool,
}

impl<T: NamedItem> MetadataCollection<T> {
    /// Create an empty, mutable collection.
    #[must_use]
    pub fn new() -> Self {
        MetadataCollection {
            items: RwLock::new(Vec::new()),
            index: RwLock::new(None),
            readonly: AtomicBool::new(false),
        }
    }

    /// Create a collection pre-populated with `items`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateIdentity`] if two items share an identity.
    pub fn from_items(items: Vec<T>) -> Result<Self> {
        let collection = MetadataCollection::new();
        for item in items {
            collection.add(item)?;
        }
        Ok(collection)
    }

    /// Whether the collection has completed its read-only transition.
    #[must_use]
    pub fn is_readonly(&self) -> bool {
        self.readonly.load(Ordering::Acquire)
    }

    /// Freeze the collection. Idempotent, legal on an empty collection.
    ///
    /// Elements are not frozen here; the owning item walks its owned children
    /// in its own freeze hook.
    pub fn set_readonly(&self) {
        self.readonly.store(true, Ordering::Release);
    }

    fn assert_mutable(&self) -> Result<()> {
        if self.is_readonly() {
            return Err(Error::ReadOnly {
                identity: "MetadataCollection".to_string(),
            });
        }
        Ok(())
    }

    /// Append `item`, preserving insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateIdentity`] when an item with the same
    /// identity (ordinal comparison) already exists, [`Error::ReadOnly`] when
    /// the collection is frozen.
    pub fn add(&self, item: T) -> Result<()> {
        self.assert_mutable()?;
        let identity = item.identity();
        let mut items = write_lock!(self.items);
        if items.iter().any(|existing| existing.identity() == identity) {
            return Err(Error::DuplicateIdentity { identity });
        }
        items.push(item);
        *write_lock!(self.index) = None;
        Ok(())
    }

    /// Remove the item with `item`'s identity.
    ///
    /// Back-reference cleanup (declaring type, container links) is the
    /// owning type's responsibility, not the collection's.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ItemNotFound`] when absent, [`Error::ReadOnly`] when
    /// the collection is frozen.
    pub fn remove(&self, item: &T) -> Result<()> {
        self.assert_mutable()?;
        let identity = item.identity();
        let mut items = write_lock!(self.items);
        let position = items.iter().position(|existing| existing.identity() == identity);
        match position {
            Some(index) => {
                items.remove(index);
                *write_lock!(self.index) = None;
                Ok(())
            }
            None => Err(Error::ItemNotFound { identity }),
        }
    }

    /// Drop the lazily built name index.
    ///
    /// Must be called whenever a member's identity changes while it is still
    /// in the collection, so lookups never resolve through a stale mapping.
    pub fn invalidate_index(&self) {
        *write_lock!(self.index) = None;
    }

    fn lookup(&self, identity: &str) -> Option<usize> {
        {
            let index = read_lock!(self.index);
            if let Some(map) = index.as_ref() {
                return map.get(identity).copied();
            }
        }
        let items = read_lock!(self.items);
        let map: HashMap<String, usize> = items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.identity(), position))
            .collect();
        let position = map.get(identity).copied();
        *write_lock!(self.index) = Some(map);
        position
    }

    /// Exact-identity lookup.
    ///
    /// With `ignore_case`, a case-insensitive scan runs only after the exact
    /// path misses; an ambiguous case-insensitive match fails rather than
    /// silently picking one item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ItemNotFound`] when absent, [`Error::MoreThanOneMatch`]
    /// for an ambiguous case-insensitive hit.
    pub fn get_value(&self, identity: &str, ignore_case: bool) -> Result<T> {
        if let Some(position) = self.lookup(identity) {
            let items = read_lock!(self.items);
            if let Some(item) = items.get(position) {
                return Ok(item.clone());
            }
        }
        if !ignore_case {
            return Err(Error::ItemNotFound {
                identity: identity.to_string(),
            });
        }

        // Secondary fallback path; never preferred over an exact-case hit.
        let items = read_lock!(self.items);
        let mut matched: Option<T> = None;
        for item in items.iter() {
            if item.identity().eq_ignore_ascii_case(identity) {
                if matched.is_some() {
                    return Err(Error::MoreThanOneMatch {
                        identity: identity.to_string(),
                    });
                }
                matched = Some(item.clone());
            }
        }
        matched.ok_or_else(|| Error::ItemNotFound {
            identity: identity.to_string(),
        })
    }

    /// Non-throwing counterpart of [`MetadataCollection::get_value`].
    ///
    /// An ambiguous case-insensitive match yields `None`.
    #[must_use]
    pub fn try_get_value(&self, identity: &str, ignore_case: bool) -> Option<T> {
        self.get_value(identity, ignore_case).ok()
    }

    /// Whether an item with exactly this identity exists.
    #[must_use]
    pub fn contains_identity(&self, identity: &str) -> bool {
        self.lookup(identity).is_some()
    }

    /// The item at `position` in insertion order.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<T> {
        read_lock!(self.items).get(position).cloned()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        read_lock!(self.items).len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        read_lock!(self.items).is_empty()
    }

    /// Snapshot of the items in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        read_lock!(self.items).clone()
    }
}

impl<T: NamedItem> Default for MetadataCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The frozen public face of a [`MetadataCollection`].
///
/// Exposes enumeration, identity lookup, and containment over the same
/// backing store. The mutable source stays reachable only through the
/// crate-visible [`ReadOnlyMetadataCollection::source`] back-channel, so
/// public consumers can only read while the owning type can still perform
/// privileged same-session population.
#[derive(Debug, Clone)]
pub struct ReadOnlyMetadataCollection<T: NamedItem> {
    inner: Arc<MetadataCollection<T>>,
}

impl<T: NamedItem> ReadOnlyMetadataCollection<T> {
    /// Wrap a collection in its read-only projection.
    #[must_use]
    pub fn new(inner: Arc<MetadataCollection<T>>) -> Self {
        ReadOnlyMetadataCollection { inner }
    }

    /// The privileged mutable view, for the owning module only.
    pub(crate) fn source(&self) -> &MetadataCollection<T> {
        &self.inner
    }

    /// Exact-identity lookup; see [`MetadataCollection::get_value`].
    ///
    /// # Errors
    ///
    /// Same error contract as [`MetadataCollection::get_value`].
    pub fn get_value(&self, identity: &str, ignore_case: bool) -> Result<T> {
        self.inner.get_value(identity, ignore_case)
    }

    /// Non-throwing lookup; see [`MetadataCollection::try_get_value`].
    #[must_use]
    pub fn try_get_value(&self, identity: &str, ignore_case: bool) -> Option<T> {
        self.inner.try_get_value(identity, ignore_case)
    }

    /// Whether an item with exactly this identity exists.
    #[must_use]
    pub fn contains_identity(&self, identity: &str) -> bool {
        self.inner.contains_identity(identity)
    }

    /// The item at `position` in insertion order.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<T> {
        self.inner.get(position)
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Snapshot of the items in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.to_vec()
    }
}
