//! Per-item bit-packed state and the one-way read-only transition.
//!
//! Every metadata item carries an [`ItemState`]: a single flags word holding
//! the read-only bit, the abstractness bit, and two small "sticky" tagged
//! fields (data space, parameter mode), plus a narrow transition lock.
//!
//! # State Machine
//!
//! **Mutable → ReadOnly** (terminal). No reverse transition exists. The
//! already-frozen check is lock-free; only the transition itself takes the
//! per-item lock, so two threads can never both observe "not yet read-only"
//! and redo the freeze side effects.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Mutex,
};

use bitflags::bitflags;

use crate::{Error, Result};

bitflags! {
    /// Single-bit item state flags packed into the shared flags word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ItemFlags: u32 {
        /// The item has completed its one-way read-only transition
        const READONLY = 0x0000_0001;
        /// The item is abstract (entity types only)
        const ABSTRACT = 0x0000_0002;
        /// The data space field has been assigned
        const DATA_SPACE_ASSIGNED = 0x0000_0004;
        /// The parameter mode field has been assigned
        const PARAMETER_MODE_ASSIGNED = 0x0000_0008;
    }
}

/// Bitmask for the data space field within the flags word
pub const DATA_SPACE_MASK: u32 = 0x0000_0700;
/// Shift of the data space field within the flags word
pub const DATA_SPACE_SHIFT: u32 = 8;
/// Bitmask for the parameter mode field within the flags word
pub const PARAMETER_MODE_MASK: u32 = 0x0000_7000;
/// Shift of the parameter mode field within the flags word
pub const PARAMETER_MODE_SHIFT: u32 = 12;

/// The data space a metadata item belongs to.
///
/// Spaces are mutually exclusive per item, except transient row and
/// collection types which may legitimately remain untagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DataSpace {
    /// Conceptual model - the entity-relationship schema seen by queries
    CSpace = 1,
    /// Store model - the relational table/column schema
    SSpace = 2,
    /// Object model - the CLR-type-backed projection of the conceptual model
    OSpace = 3,
    /// Object-to-conceptual mapping space
    OCSpace = 4,
    /// Conceptual-to-store mapping space
    CSSpace = 5,
}

impl DataSpace {
    fn from_bits(bits: u32) -> Option<DataSpace> {
        match bits {
            1 => Some(DataSpace::CSpace),
            2 => Some(DataSpace::SSpace),
            3 => Some(DataSpace::OSpace),
            4 => Some(DataSpace::OCSpace),
            5 => Some(DataSpace::CSSpace),
            _ => None,
        }
    }
}

/// The direction of a function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ParameterMode {
    /// Input parameter
    In = 1,
    /// Output parameter
    Out = 2,
    /// Bidirectional parameter
    InOut = 3,
    /// The function return value
    ReturnValue = 4,
}

impl ParameterMode {
    fn from_bits(bits: u32) -> Option<ParameterMode> {
        match bits {
            1 => Some(ParameterMode::In),
            2 => Some(ParameterMode::Out),
            3 => Some(ParameterMode::InOut),
            4 => Some(ParameterMode::ReturnValue),
            _ => None,
        }
    }
}

/// Lock-protected bit-packed state shared by every metadata item.
///
/// Reads of the read-only bit are lock-free; the transition and the sticky
/// field assignments take the per-item mutex so concurrent callers cannot
/// both perform the freeze side effects.
#[derive(Debug)]
pub struct ItemState {
    bits: AtomicU32,
    transition: Mutex<()>,
}

impl ItemState {
    /// Create a fresh, mutable state word with no fields assigned.
    #[must_use]
    pub fn new() -> Self {
        ItemState {
            bits: AtomicU32::new(0),
            transition: Mutex::new(()),
        }
    }

    /// Whether the item has completed its read-only transition.
    ///
    /// This is the lock-free fast path used by every mutation guard.
    #[must_use]
    pub fn is_readonly(&self) -> bool {
        self.bits.load(Ordering::Acquire) & ItemFlags::READONLY.bits() != 0
    }

    /// Perform the one-way mutable → read-only transition.
    ///
    /// Returns `true` only for the call that actually performed the
    /// transition, so the caller cascades the freeze to owned children
    /// exactly once. Subsequent and concurrent calls return `false`.
    pub fn try_freeze(&self) -> bool {
        if self.is_readonly() {
            return false;
        }
        let _guard = lock!(self.transition);
        if self.is_readonly() {
            return false;
        }
        self.bits
            .fetch_or(ItemFlags::READONLY.bits(), Ordering::Release);
        true
    }

    /// Fail with [`Error::ReadOnly`] if the item is already frozen.
    ///
    /// Every setter runs this before any mutation takes effect, so a frozen
    /// item can never be partially mutated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] carrying `identity` when frozen.
    pub fn assert_mutable(&self, identity: &str) -> Result<()> {
        if self.is_readonly() {
            return Err(Error::ReadOnly {
                identity: identity.to_string(),
            });
        }
        Ok(())
    }

    /// The data space tag, if one has been assigned.
    #[must_use]
    pub fn data_space(&self) -> Option<DataSpace> {
        let bits = self.bits.load(Ordering::Acquire);
        if bits & ItemFlags::DATA_SPACE_ASSIGNED.bits() == 0 {
            return None;
        }
        DataSpace::from_bits((bits & DATA_SPACE_MASK) >> DATA_SPACE_SHIFT)
    }

    /// Assign the data space tag.
    ///
    /// The field is sticky once set: re-assigning an equal value is a no-op,
    /// a different value is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateConflict`] when a different space was already
    /// assigned, [`Error::ReadOnly`] when the item is frozen.
    pub fn set_data_space(&self, space: DataSpace, identity: &str) -> Result<()> {
        self.assert_mutable(identity)?;
        let _guard = lock!(self.transition);
        if let Some(existing) = self.data_space() {
            if existing == space {
                return Ok(());
            }
            return Err(Error::StateConflict(format!(
                "data space of '{identity}' is already {existing:?}, cannot become {space:?}"
            )));
        }
        let field = ((space as u32) << DATA_SPACE_SHIFT) & DATA_SPACE_MASK;
        self.bits.fetch_or(
            field | ItemFlags::DATA_SPACE_ASSIGNED.bits(),
            Ordering::Release,
        );
        Ok(())
    }

    /// Clear the data space tag back to "unassigned".
    ///
    /// Only legal for the dual-space transient row/collection types, which
    /// may end up spanning spaces and become untagged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] when the item is frozen.
    pub fn clear_data_space(&self, identity: &str) -> Result<()> {
        self.assert_mutable(identity)?;
        let _guard = lock!(self.transition);
        self.bits.fetch_and(
            !(DATA_SPACE_MASK | ItemFlags::DATA_SPACE_ASSIGNED.bits()),
            Ordering::Release,
        );
        Ok(())
    }

    /// The parameter mode, if one has been assigned.
    #[must_use]
    pub fn parameter_mode(&self) -> Option<ParameterMode> {
        let bits = self.bits.load(Ordering::Acquire);
        if bits & ItemFlags::PARAMETER_MODE_ASSIGNED.bits() == 0 {
            return None;
        }
        ParameterMode::from_bits((bits & PARAMETER_MODE_MASK) >> PARAMETER_MODE_SHIFT)
    }

    /// Assign the parameter mode; same sticky discipline as the data space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateConflict`] when a different mode was already
    /// assigned, [`Error::ReadOnly`] when the item is frozen.
    pub fn set_parameter_mode(&self, mode: ParameterMode, identity: &str) -> Result<()> {
        self.assert_mutable(identity)?;
        let _guard = lock!(self.transition);
        if let Some(existing) = self.parameter_mode() {
            if existing == mode {
                return Ok(());
            }
            return Err(Error::StateConflict(format!(
                "parameter mode of '{identity}' is already {existing:?}, cannot become {mode:?}"
            )));
        }
        let field = ((mode as u32) << PARAMETER_MODE_SHIFT) & PARAMETER_MODE_MASK;
        self.bits.fetch_or(
            field | ItemFlags::PARAMETER_MODE_ASSIGNED.bits(),
            Ordering::Release,
        );
        Ok(())
    }

    /// Whether the abstract bit is set.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.bits.load(Ordering::Acquire) & ItemFlags::ABSTRACT.bits() != 0
    }

    /// Set or clear the abstract bit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] when the item is frozen.
    pub fn set_abstract(&self, value: bool, identity: &str) -> Result<()> {
        self.assert_mutable(identity)?;
        if value {
            self.bits
                .fetch_or(ItemFlags::ABSTRACT.bits(), Ordering::Release);
        } else {
            self.bits
                .fetch_and(!ItemFlags::ABSTRACT.bits(), Ordering::Release);
        }
        Ok(())
    }
}

impl Default for ItemState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{atomic::AtomicUsize, Arc};

    #[test]
    fn test_freeze_is_one_way_and_single_winner() {
        let state = ItemState::new();
        assert!(!state.is_readonly());
        assert!(state.try_freeze());
        assert!(state.is_readonly());
        assert!(!state.try_freeze());
    }

    #[test]
    fn test_freeze_single_winner_under_contention() {
        let state = Arc::new(ItemState::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                let winners = Arc::clone(&winners);
                std::thread::spawn(move || {
                    if state.try_freeze() {
                        winners.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert!(state.is_readonly());
    }

    #[test]
    fn test_data_space_sticky() {
        let state = ItemState::new();
        assert_eq!(state.data_space(), None);
        state.set_data_space(DataSpace::CSpace, "t").unwrap();
        assert_eq!(state.data_space(), Some(DataSpace::CSpace));

        // Re-setting the same value is a no-op
        state.set_data_space(DataSpace::CSpace, "t").unwrap();

        let err = state.set_data_space(DataSpace::SSpace, "t").unwrap_err();
        assert!(matches!(err, Error::StateConflict(_)));
    }

    #[test]
    fn test_data_space_clear_for_transient_types() {
        let state = ItemState::new();
        state.set_data_space(DataSpace::CSpace, "row").unwrap();
        state.clear_data_space("row").unwrap();
        assert_eq!(state.data_space(), None);
        state.set_data_space(DataSpace::SSpace, "row").unwrap();
        assert_eq!(state.data_space(), Some(DataSpace::SSpace));
    }

    #[test]
    fn test_no_mutation_after_freeze() {
        let state = ItemState::new();
        state.try_freeze();
        assert!(matches!(
            state.set_data_space(DataSpace::CSpace, "t"),
            Err(Error::ReadOnly { .. })
        ));
        assert!(matches!(
            state.set_abstract(true, "t"),
            Err(Error::ReadOnly { .. })
        ));
        assert!(matches!(
            state.set_parameter_mode(ParameterMode::In, "t"),
            Err(Error::ReadOnly { .. })
        ));
    }

    #[test]
    fn test_parameter_mode_sticky() {
        let state = ItemState::new();
        state.set_parameter_mode(ParameterMode::InOut, "p").unwrap();
        state.set_parameter_mode(ParameterMode::InOut, "p").unwrap();
        assert_eq!(state.parameter_mode(), Some(ParameterMode::InOut));
        assert!(state
            .set_parameter_mode(ParameterMode::Out, "p")
            .is_err());
    }

    #[test]
    fn test_abstract_bit() {
        let state = ItemState::new();
        assert!(!state.is_abstract());
        state.set_abstract(true, "t").unwrap();
        assert!(state.is_abstract());
        state.set_abstract(false, "t").unwrap();
        assert!(!state.is_abstract());
    }
}
