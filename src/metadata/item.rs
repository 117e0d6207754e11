//! The uniform metadata item protocol.
//!
//! Every node kind embeds an [`ItemBase`] (state word, documentation,
//! annotations) and implements [`MetadataItem`], which supplies the
//! idempotent cascading read-only transition: the first `set_readonly` call
//! freezes the item's own property collection and, through the
//! `freeze_children` hook, its type-specific *owned* sub-structures;
//! subsequent calls are no-ops.

use std::sync::{Arc, RwLock};

use crate::{
    metadata::{
        collection::{MetadataCollection, NamedItem, ReadOnlyMetadataCollection},
        flags::ItemState,
        kind::BuiltInTypeKind,
        properties::{system_descriptors, PropertyDescriptor},
    },
    Result,
};

/// An optional human-readable documentation record attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Documentation {
    /// Short summary line
    pub summary: String,
    /// Long-form description
    pub long_description: String,
}

/// The value carried by a [`MetadataProperty`].
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// No value
    None,
    /// A string value
    String(String),
    /// A boolean value
    Boolean(bool),
    /// A 32-bit integer value
    Int32(i32),
}

/// A named value attached to a metadata item: either a system property
/// describing one of the item's own typed fields, or a user-added annotation.
#[derive(Debug)]
pub struct MetadataProperty {
    name: String,
    value: MetadataValue,
    is_annotation: bool,
}

impl MetadataProperty {
    /// Create a user annotation.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn annotation(name: &str, value: MetadataValue) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("annotation name must not be empty"));
        }
        Ok(Arc::new(MetadataProperty {
            name: name.to_string(),
            value,
            is_annotation: true,
        }))
    }

    /// The property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The property value.
    #[must_use]
    pub fn value(&self) -> &MetadataValue {
        &self.value
    }

    /// Whether this is a user annotation rather than a system property.
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.is_annotation
    }
}

impl NamedItem for Arc<MetadataProperty> {
    fn identity(&self) -> String {
        self.name.clone()
    }
}

/// State every metadata item embeds: the packed flags word, the optional
/// documentation record, and the user-annotation collection.
#[derive(Debug)]
pub struct ItemBase {
    state: ItemState,
    documentation: RwLock<Option<Documentation>>,
    annotations: Arc<MetadataCollection<Arc<MetadataProperty>>>,
}

impl ItemBase {
    /// Create a fresh mutable item base.
    #[must_use]
    pub fn new() -> Self {
        ItemBase {
            state: ItemState::new(),
            documentation: RwLock::new(None),
            annotations: Arc::new(MetadataCollection::new()),
        }
    }

    /// The packed state word.
    #[must_use]
    pub fn state(&self) -> &ItemState {
        &self.state
    }

    /// The documentation record, if set.
    #[must_use]
    pub fn documentation(&self) -> Option<Documentation> {
        read_lock!(self.documentation).clone()
    }

    /// Attach a documentation record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ReadOnly`] once the item is frozen.
    pub fn set_documentation(&self, documentation: Documentation, identity: &str) -> Result<()> {
        self.state.assert_mutable(identity)?;
        *write_lock!(self.documentation) = Some(documentation);
        Ok(())
    }

    /// The annotation collection (mutable until the item freezes).
    #[must_use]
    pub fn annotations(&self) -> &Arc<MetadataCollection<Arc<MetadataProperty>>> {
        &self.annotations
    }

    pub(crate) fn freeze_own(&self) -> bool {
        let transitioned = self.state.try_freeze();
        if transitioned {
            self.annotations.set_readonly();
        }
        transitioned
    }
}

impl Default for ItemBase {
    fn default() -> Self {
        Self::new()
    }
}

/// The protocol every metadata node implements.
///
/// `set_readonly` is idempotent and must be safe under concurrent callers:
/// only the winning call runs the cascade, enforced by the state word's
/// transition lock.
pub trait MetadataItem {
    /// The concrete kind of this node.
    fn item_kind(&self) -> BuiltInTypeKind;

    /// The identity string used for equality and lookup.
    fn identity(&self) -> String;

    /// The embedded item base.
    fn item_base(&self) -> &ItemBase;

    /// Freeze type-specific owned sub-structures. Back-references and merely
    /// referenced items must not be frozen here.
    fn freeze_children(&self) {}

    /// Perform the one-way read-only transition, cascading depth-first
    /// through owned children. Idempotent.
    fn set_readonly(&self) {
        if self.item_base().freeze_own() {
            self.freeze_children();
        }
    }

    /// Whether the item is frozen.
    fn is_readonly(&self) -> bool {
        self.item_base().state().is_readonly()
    }

    /// The static system-property descriptors for this node kind.
    ///
    /// Annotations are exposed separately through
    /// [`MetadataItem::annotations`].
    fn system_properties(&self) -> &'static [PropertyDescriptor] {
        system_descriptors(self.item_kind())
    }

    /// The user-annotation collection as a read-only projection.
    fn annotations(&self) -> ReadOnlyMetadataCollection<Arc<MetadataProperty>> {
        ReadOnlyMetadataCollection::new(Arc::clone(self.item_base().annotations()))
    }

    /// Add a user annotation.
    ///
    /// # Errors
    ///
    /// Fails once the item is frozen or on a duplicate annotation name.
    fn add_annotation(&self, annotation: Arc<MetadataProperty>) -> Result<()> {
        self.item_base()
            .state()
            .assert_mutable(&self.identity())?;
        self.item_base().annotations().add(annotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Probe {
        base: ItemBase,
        cascades: AtomicUsize,
    }

    impl MetadataItem for Probe {
        fn item_kind(&self) -> BuiltInTypeKind {
            BuiltInTypeKind::MetadataProperty
        }

        fn identity(&self) -> String {
            "probe".to_string()
        }

        fn item_base(&self) -> &ItemBase {
            &self.base
        }

        fn freeze_children(&self) {
            self.cascades.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_set_readonly_cascades_exactly_once() {
        let probe = Probe {
            base: ItemBase::new(),
            cascades: AtomicUsize::new(0),
        };
        probe.set_readonly();
        probe.set_readonly();
        probe.set_readonly();
        assert!(probe.is_readonly());
        assert_eq!(probe.cascades.load(Ordering::SeqCst), 1);
        assert!(probe.base.annotations().is_readonly());
    }

    #[test]
    fn test_annotations_rejected_after_freeze() {
        let probe = Probe {
            base: ItemBase::new(),
            cascades: AtomicUsize::new(0),
        };
        let note = MetadataProperty::annotation("Docs:Hint", MetadataValue::Boolean(true)).unwrap();
        probe.add_annotation(note).unwrap();
        probe.set_readonly();
        let late = MetadataProperty::annotation("Late", MetadataValue::None).unwrap();
        assert!(probe.add_annotation(late).is_err());
    }

    #[test]
    fn test_documentation_guarded_by_freeze() {
        let base = ItemBase::new();
        base.set_documentation(
            Documentation {
                summary: "a".into(),
                long_description: String::new(),
            },
            "item",
        )
        .unwrap();
        base.freeze_own();
        assert!(base
            .set_documentation(Documentation::default(), "item")
            .is_err());
        assert_eq!(base.documentation().unwrap().summary, "a");
    }

    #[test]
    fn test_system_properties_resolved_by_kind() {
        let probe = Probe {
            base: ItemBase::new(),
            cascades: AtomicUsize::new(0),
        };
        let names: Vec<&str> = probe.system_properties().iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Name", "Value"]);
    }
}
