//! Explicit non-owning back-references.
//!
//! Parent → child containment edges in the metadata graph are exclusive
//! ownership (strong `Arc`s held by the owning collection). All reverse and
//! lateral edges - a member's declaring type, a set's entity container, a
//! navigation property's relationship links - are [`BackRef`]s: weak links
//! settable independently of the owning collection's invariants during
//! relinking, and never frozen or kept alive by the side that merely points
//! back.

use std::sync::{RwLock, Weak};

/// A settable, non-owning weak link to another graph node.
///
/// The ownership asymmetry is structurally visible: the owning collection
/// holds the strong forward edge, the item holds this backward edge. An unset
/// or dropped target upgrades to `None`.
#[derive(Debug)]
pub struct BackRef<T> {
    target: RwLock<Weak<T>>,
}

impl<T> BackRef<T> {
    /// Create an unset back-reference.
    #[must_use]
    pub fn unset() -> Self {
        BackRef {
            target: RwLock::new(Weak::new()),
        }
    }

    /// Point this back-reference at `target`.
    ///
    /// Relinking bypasses the owning collection on purpose; the caller is the
    /// owning type performing its add/remove fix-up.
    pub fn set(&self, target: &std::sync::Arc<T>) {
        *write_lock!(self.target) = std::sync::Arc::downgrade(target);
    }

    /// Clear the link (target removed from its owning collection).
    pub fn clear(&self) {
        *write_lock!(self.target) = Weak::new();
    }

    /// Get a strong reference to the target, or `None` if unset or dropped.
    #[must_use]
    pub fn upgrade(&self) -> Option<std::sync::Arc<T>> {
        read_lock!(self.target).upgrade()
    }

    /// Check if the referenced target is still alive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        read_lock!(self.target).strong_count() > 0
    }
}

impl<T> Default for BackRef<T> {
    fn default() -> Self {
        Self::unset()
    }
}
