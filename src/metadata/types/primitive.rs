//! Primitive and enumeration types.
//!
//! Primitive types are canonical: there is exactly one frozen
//! [`PrimitiveType`] instance per [`PrimitiveTypeKind`], interned for the
//! lifetime of the process and shared by every model. Enum types are
//! user-declared named types layered over an integral primitive.

use std::sync::{Arc, OnceLock};

use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

use crate::{
    metadata::{
        collection::{MetadataCollection, NamedItem, ReadOnlyMetadataCollection},
        facets::{self, FacetDescription},
        flags::DataSpace,
        item::{ItemBase, MetadataItem},
        kind::BuiltInTypeKind,
    },
    Result,
};

/// The canonical namespace of the primitive type system.
pub const EDM_NAMESPACE: &str = "Edm";

/// The closed set of primitive scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter)]
pub enum PrimitiveTypeKind {
    /// Variable-length binary data
    Binary,
    /// Boolean
    Boolean,
    /// Unsigned 8-bit integer
    Byte,
    /// Date and time
    DateTime,
    /// Date and time with offset
    DateTimeOffset,
    /// Fixed-precision decimal
    Decimal,
    /// 64-bit floating point
    Double,
    /// Globally unique identifier
    Guid,
    /// Signed 16-bit integer
    Int16,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// Signed 8-bit integer
    SByte,
    /// 32-bit floating point
    Single,
    /// Variable-length character data
    String,
    /// Time of day
    Time,
}

impl PrimitiveTypeKind {
    /// Whether values of this kind can underlie an enum type.
    #[must_use]
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveTypeKind::Byte
                | PrimitiveTypeKind::SByte
                | PrimitiveTypeKind::Int16
                | PrimitiveTypeKind::Int32
                | PrimitiveTypeKind::Int64
        )
    }
}

/// A canonical primitive scalar type.
///
/// Obtained through [`PrimitiveType::canonical`]; never constructed by
/// callers, always already frozen.
#[derive(Debug)]
pub struct PrimitiveType {
    base: ItemBase,
    kind: PrimitiveTypeKind,
    name: String,
}

impl PrimitiveType {
    /// The interned instance for `kind`.
    #[must_use]
    pub fn canonical(kind: PrimitiveTypeKind) -> Arc<PrimitiveType> {
        static CANON: OnceLock<Vec<Arc<PrimitiveType>>> = OnceLock::new();
        let all = CANON.get_or_init(|| {
            PrimitiveTypeKind::iter()
                .map(|kind| {
                    let primitive = Arc::new(PrimitiveType {
                        base: ItemBase::new(),
                        kind,
                        name: kind.to_string(),
                    });
                    // Canonical instances are born in the conceptual space
                    // and frozen before anyone can see them.
                    let _ = primitive
                        .base
                        .state()
                        .set_data_space(DataSpace::CSpace, &primitive.name);
                    primitive.set_readonly();
                    primitive
                })
                .collect()
        });
        let position = PrimitiveTypeKind::iter()
            .position(|candidate| candidate == kind)
            .unwrap_or(0);
        Arc::clone(&all[position])
    }

    /// The primitive kind.
    #[must_use]
    pub fn primitive_kind(&self) -> PrimitiveTypeKind {
        self.kind
    }

    /// The simple name (`Int32`, `String`, ...).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Always [`EDM_NAMESPACE`].
    #[must_use]
    pub fn namespace_name(&self) -> &str {
        EDM_NAMESPACE
    }

    /// The facet slots a usage of this primitive may carry, beyond the
    /// universally applicable `Nullable` and `DefaultValue`.
    #[must_use]
    pub fn applicable_facets(&self) -> Vec<&'static FacetDescription> {
        let mut slots = vec![facets::nullable(), facets::default_value()];
        match self.kind {
            PrimitiveTypeKind::String => {
                slots.push(facets::max_length());
                slots.push(facets::unicode());
                slots.push(facets::fixed_length());
            }
            PrimitiveTypeKind::Binary => {
                slots.push(facets::max_length());
                slots.push(facets::fixed_length());
            }
            PrimitiveTypeKind::Decimal => {
                slots.push(facets::precision());
                slots.push(facets::scale());
            }
            PrimitiveTypeKind::DateTime
            | PrimitiveTypeKind::DateTimeOffset
            | PrimitiveTypeKind::Time => {
                slots.push(facets::precision());
            }
            _ => {}
        }
        slots
    }
}

impl MetadataItem for PrimitiveType {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::PrimitiveType
    }

    fn identity(&self) -> String {
        format!("{EDM_NAMESPACE}.{0}", self.name)
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }
}

/// One named constant of an [`EnumType`].
#[derive(Debug)]
pub struct EnumMember {
    base: ItemBase,
    name: String,
    value: i64,
}

impl EnumMember {
    /// Create an enum member.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn new(name: &str, value: i64) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("enum member name must not be empty"));
        }
        Ok(Arc::new(EnumMember {
            base: ItemBase::new(),
            name: name.to_string(),
            value,
        }))
    }

    /// The member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member's integral value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.value
    }
}

impl MetadataItem for EnumMember {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::EnumMember
    }

    fn identity(&self) -> String {
        self.name.clone()
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }
}

impl NamedItem for Arc<EnumMember> {
    fn identity(&self) -> String {
        self.name.clone()
    }
}

/// A user-declared enumeration type over an integral primitive.
#[derive(Debug)]
pub struct EnumType {
    base: ItemBase,
    name: String,
    namespace: String,
    underlying: Arc<PrimitiveType>,
    is_flags: bool,
    members: Arc<MetadataCollection<Arc<EnumMember>>>,
}

impl EnumType {
    /// Declare an enum type over `underlying`.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty or `underlying` is not integral.
    pub fn new(
        name: &str,
        namespace: &str,
        underlying: PrimitiveTypeKind,
        is_flags: bool,
        space: DataSpace,
    ) -> Result<Arc<Self>> {
        if name.is_empty() {
            return Err(usage_error!("enum type name must not be empty"));
        }
        if !underlying.is_integral() {
            return Err(usage_error!(
                "enum type '{}' requires an integral underlying type, got {}",
                name,
                underlying
            ));
        }
        let enum_type = Arc::new(EnumType {
            base: ItemBase::new(),
            name: name.to_string(),
            namespace: namespace.to_string(),
            underlying: PrimitiveType::canonical(underlying),
            is_flags,
            members: Arc::new(MetadataCollection::new()),
        });
        enum_type
            .base
            .state()
            .set_data_space(space, &enum_type.identity())?;
        Ok(enum_type)
    }

    /// The simple name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declaring namespace.
    #[must_use]
    pub fn namespace_name(&self) -> &str {
        &self.namespace
    }

    /// The underlying integral primitive.
    #[must_use]
    pub fn underlying_type(&self) -> &Arc<PrimitiveType> {
        &self.underlying
    }

    /// Whether members combine as bit flags.
    #[must_use]
    pub fn is_flags(&self) -> bool {
        self.is_flags
    }

    /// The member constants, in declaration order.
    #[must_use]
    pub fn members(&self) -> ReadOnlyMetadataCollection<Arc<EnumMember>> {
        ReadOnlyMetadataCollection::new(Arc::clone(&self.members))
    }

    /// Add a member constant.
    ///
    /// # Errors
    ///
    /// Fails on duplicate member names or once the type is frozen.
    pub fn add_member(&self, member: Arc<EnumMember>) -> Result<()> {
        self.base.state().assert_mutable(&self.identity())?;
        self.members.add(member)
    }
}

impl MetadataItem for EnumType {
    fn item_kind(&self) -> BuiltInTypeKind {
        BuiltInTypeKind::EnumType
    }

    fn identity(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    fn item_base(&self) -> &ItemBase {
        &self.base
    }

    fn freeze_children(&self) {
        self.members.set_readonly();
        for member in self.members.to_vec() {
            member.as_ref().set_readonly();
        }
    }
}
