//! Process-wide caching of frozen metadata.
//!
//! Building and validating a model is expensive; applications do it once per
//! schema and share the frozen graph everywhere. [`MetadataCache`] is the
//! concurrent registry for that sharing: frozen models keyed by an
//! application-chosen string, plus an interning table for type usages so
//! equivalent configurations collapse to one instance.

use std::sync::Arc;

use dashmap::DashMap;

use crate::{
    metadata::{item::MetadataItem, model::EdmModel, typeusage::TypeUsage},
    Result,
};

/// Concurrent registry of frozen models and interned type usages.
#[derive(Debug, Default)]
pub struct MetadataCache {
    models: DashMap<String, Arc<EdmModel>>,
    usages: DashMap<String, Arc<TypeUsage>>,
}

impl MetadataCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        MetadataCache {
            models: DashMap::new(),
            usages: DashMap::new(),
        }
    }

    /// Register a frozen model under `key`.
    ///
    /// # Errors
    ///
    /// Fails when the model is still mutable or the key is taken.
    pub fn insert_model(&self, key: &str, model: Arc<EdmModel>) -> Result<()> {
        if !model.is_readonly() {
            return Err(usage_error!(
                "only frozen models may be cached, '{}' is still mutable",
                key
            ));
        }
        match self.models.entry(key.to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(usage_error!(
                "a model is already cached under '{}'",
                key
            )),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(model);
                Ok(())
            }
        }
    }

    /// The cached model under `key`, if any.
    #[must_use]
    pub fn model(&self, key: &str) -> Option<Arc<EdmModel>> {
        self.models.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Fetch the model under `key`, building, freezing, and caching it on a
    /// miss. Concurrent callers for the same key may race to build; one
    /// winner's model is kept and returned to everyone.
    ///
    /// # Errors
    ///
    /// Propagates the builder's failure.
    pub fn model_or_build<F>(&self, key: &str, build: F) -> Result<Arc<EdmModel>>
    where
        F: FnOnce() -> Result<Arc<EdmModel>>,
    {
        if let Some(model) = self.model(key) {
            return Ok(model);
        }
        let built = build()?;
        built.set_readonly();
        let kept = self
            .models
            .entry(key.to_string())
            .or_insert(built)
            .value()
            .clone();
        Ok(kept)
    }

    /// Drop the model cached under `key`, returning it if present.
    pub fn remove_model(&self, key: &str) -> Option<Arc<EdmModel>> {
        self.models.remove(key).map(|(_, model)| model)
    }

    /// Number of cached models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no models are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Intern a type usage by identity: the first usage with a given
    /// identity wins, later equivalents are dropped in favor of the cached
    /// instance. The returned usage is frozen.
    #[must_use]
    pub fn intern_usage(&self, usage: Arc<TypeUsage>) -> Arc<TypeUsage> {
        let identity = MetadataItem::identity(usage.as_ref());
        let kept = self
            .usages
            .entry(identity)
            .or_insert_with(|| {
                usage.as_ref().set_readonly();
                usage
            })
            .value()
            .clone();
        kept
    }

    /// Drop every cached model and interned usage.
    pub fn clear(&self) {
        self.models.clear();
        self.usages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::model::EdmVersion;
    use crate::metadata::types::{EdmTypeRef, PrimitiveType, PrimitiveTypeKind};

    #[test]
    fn test_mutable_model_rejected() {
        let cache = MetadataCache::new();
        let model = EdmModel::new(EdmVersion::V3);
        assert!(cache.insert_model("shop", model).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_model_or_build_freezes_and_caches() {
        let cache = MetadataCache::new();
        let first = cache
            .model_or_build("shop", || Ok(EdmModel::new(EdmVersion::V3)))
            .unwrap();
        assert!(first.is_readonly());
        let second = cache
            .model_or_build("shop", || panic!("must not rebuild on a hit"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let cache = MetadataCache::new();
        let model = EdmModel::new(EdmVersion::V2);
        model.set_readonly();
        cache.insert_model("shop", Arc::clone(&model)).unwrap();
        assert!(cache.insert_model("shop", model).is_err());
        assert!(cache.remove_model("shop").is_some());
        assert!(cache.model("shop").is_none());
    }

    #[test]
    fn test_interning_ignores_spelled_out_defaults() {
        let cache = MetadataCache::new();
        let string = EdmTypeRef::Primitive(PrimitiveType::canonical(PrimitiveTypeKind::String));
        let spelled = cache.intern_usage(
            crate::metadata::typeusage::TypeUsage::default_of(string.clone()).unwrap(),
        );
        let bare = cache.intern_usage(
            crate::metadata::typeusage::TypeUsage::create(string, Vec::new()).unwrap(),
        );
        assert!(Arc::ptr_eq(&spelled, &bare));
    }

    #[test]
    fn test_usage_interning_collapses_equivalents() {
        let cache = MetadataCache::new();
        let int32 = EdmTypeRef::Primitive(PrimitiveType::canonical(PrimitiveTypeKind::Int32));
        let first = cache.intern_usage(
            crate::metadata::typeusage::TypeUsage::default_of(int32.clone()).unwrap(),
        );
        let second =
            cache.intern_usage(crate::metadata::typeusage::TypeUsage::default_of(int32).unwrap());
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.as_ref().is_readonly());
    }
}
