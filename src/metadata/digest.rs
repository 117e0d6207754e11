//! Structural digests over metadata items.
//!
//! The digest feeds a canonical description of an item into SHA-1: each
//! segment is length-prefixed so adjacent fields cannot collide by
//! concatenation, and member sections are sorted by name so two entities
//! with the same structure digest equal regardless of declaration order.

use std::collections::BTreeSet;

use sha1::{Digest, Sha1};

use crate::metadata::{
    item::MetadataItem,
    types::{EdmMemberRef, EntityType},
};

/// Incremental canonical-description digest.
#[derive(Debug, Default)]
pub struct StructuralDigest {
    hasher: Sha1,
}

impl StructuralDigest {
    /// Start an empty digest.
    #[must_use]
    pub fn new() -> Self {
        StructuralDigest {
            hasher: Sha1::new(),
        }
    }

    /// Feed one length-prefixed text segment.
    pub fn segment(&mut self, text: &str) -> &mut Self {
        self.hasher
            .update(u64::try_from(text.len()).unwrap_or(u64::MAX).to_le_bytes());
        self.hasher.update(text.as_bytes());
        self
    }

    /// Feed a tag byte separating structural sections.
    pub fn tag(&mut self, tag: u8) -> &mut Self {
        self.hasher.update([tag]);
        self
    }

    /// Finish and render the digest as lowercase hex.
    #[must_use]
    pub fn finish(self) -> String {
        let bytes = self.hasher.finalize();
        let mut rendered = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            rendered.push_str(&format!("{byte:02x}"));
        }
        rendered
    }
}

const TAG_TYPE: u8 = 0x01;
const TAG_BASE: u8 = 0x02;
const TAG_MEMBER: u8 = 0x03;
const TAG_KEY: u8 = 0x04;
const TAG_NAVIGATION: u8 = 0x05;

/// Canonical digest of an entity type's visible structure: full name, base
/// chain, sorted key member names, sorted non-key members with their usage
/// identities, and sorted navigation descriptors (name, end roles, end
/// multiplicities).
///
/// Sorting makes the digest independent of declaration order; two
/// structurally identical entities digest equal no matter how they were
/// built. Exposed through [`EntityType::structural_digest`].
pub(crate) fn compute_entity_digest(entity: &EntityType) -> String {
    let mut digest = StructuralDigest::new();
    digest.tag(TAG_TYPE).segment(&entity.full_name());

    let mut base = entity.base_type();
    while let Some(ancestor) = base {
        digest.tag(TAG_BASE).segment(&ancestor.full_name());
        base = ancestor.base_type();
    }

    let key_names: BTreeSet<String> = entity
        .key_members()
        .iter()
        .map(EdmMemberRef::name)
        .collect();
    for name in &key_names {
        digest.tag(TAG_KEY).segment(name);
    }

    let mut properties: Vec<(String, String)> = Vec::new();
    let mut navigations: Vec<(String, String)> = Vec::new();
    for member in entity.all_members() {
        match &member {
            EdmMemberRef::Navigation(navigation) => {
                let ends = match (navigation.from_end(), navigation.to_end()) {
                    (Ok(from), Ok(to)) => format!(
                        "{0}:{1}/{2}:{3}",
                        from.name(),
                        from.multiplicity(),
                        to.name(),
                        to.multiplicity()
                    ),
                    _ => String::new(),
                };
                navigations.push((navigation.name(), ends));
            }
            _ => {
                if key_names.contains(&member.name()) {
                    continue;
                }
                properties.push((
                    member.name(),
                    MetadataItem::identity(member.type_usage().as_ref()),
                ));
            }
        }
    }

    properties.sort();
    for (name, usage) in &properties {
        digest.tag(TAG_MEMBER).segment(name).segment(usage);
    }
    navigations.sort();
    for (name, ends) in &navigations {
        digest.tag(TAG_NAVIGATION).segment(name).segment(ends);
    }
    digest.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::flags::DataSpace;
    use crate::metadata::types::{EdmProperty, PrimitiveTypeKind};

    fn entity_with(name: &str, extras: &[&str]) -> std::sync::Arc<EntityType> {
        let entity = EntityType::new(name, "Shop", DataSpace::CSpace).unwrap();
        let id = EdmMemberRef::Property(
            EdmProperty::primitive("Id", PrimitiveTypeKind::Int32, false).unwrap(),
        );
        entity.add_member(id.clone()).unwrap();
        entity.add_key_member(&id).unwrap();
        for extra in extras {
            entity
                .add_member(EdmMemberRef::Property(
                    EdmProperty::primitive(extra, PrimitiveTypeKind::String, true).unwrap(),
                ))
                .unwrap();
        }
        entity.as_ref().set_readonly();
        entity
    }

    #[test]
    fn test_equal_structure_equal_digest() {
        assert_eq!(
            entity_with("Customer", &["Name"]).structural_digest(),
            entity_with("Customer", &["Name"]).structural_digest()
        );
    }

    #[test]
    fn test_digest_ignores_declaration_order() {
        let forward = entity_with("Customer", &["Name", "Email"]);
        let reversed = entity_with("Customer", &["Email", "Name"]);
        assert_eq!(forward.structural_digest(), reversed.structural_digest());
    }

    #[test]
    fn test_member_changes_digest() {
        assert_ne!(
            entity_with("Customer", &[]).structural_digest(),
            entity_with("Customer", &["Age"]).structural_digest()
        );
    }

    #[test]
    fn test_segments_do_not_collide_by_concatenation() {
        let mut left = StructuralDigest::new();
        left.segment("ab").segment("c");
        let mut right = StructuralDigest::new();
        right.segment("a").segment("bc");
        assert_ne!(left.finish(), right.finish());
    }

    #[test]
    fn test_digest_is_forty_hex_chars() {
        let entity = entity_with("Customer", &[]);
        let rendered = entity.structural_digest();
        assert_eq!(rendered.len(), 40);
        assert!(rendered.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
