//! Actor class masks and action-name mask derivation

use core::fmt;

/// Bit set over registered actor classes
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassMask(u32);

impl ClassMask {
    /// Empty mask (matches no class)
    pub const NONE: ClassMask = ClassMask(0);
    /// Full mask (matches every class)
    pub const ALL: ClassMask = ClassMask(u32::MAX);

    /// Create a mask from raw bits
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Get the raw bits
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Mask with a single class bit set
    #[inline]
    pub const fn single(bit: u32) -> Self {
        Self(1 << (bit & 31))
    }

    /// Check if this mask shares any class with `other`
    #[inline]
    pub const fn intersects(&self, other: ClassMask) -> bool {
        self.0 & other.0 != 0
    }

    /// Add all classes from `other`
    #[inline]
    pub fn insert(&mut self, other: ClassMask) {
        self.0 |= other.0;
    }

    /// Check if no class is set
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for ClassMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassMask({:#010x})", self.0)
    }
}

/// Registry of known actor class names.
///
/// Class bits are assigned in registration order; at most 32 classes.
/// Action names are matched against class names by case-insensitive
/// substring scan, so an action called "HumanReadBook" supports every
/// actor whose class name contains "human".
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    names: Vec<String>,
}

impl ClassRegistry {
    /// Maximum number of registrable classes
    pub const MAX_CLASSES: usize = 32;

    /// Create an empty registry
    pub fn new() -> Self {
        Self { names: Vec::new() }
    }

    /// Register a class name, returning its mask.
    ///
    /// Registering an already-known name returns the existing bit.
    /// Returns `None` once all 32 bits are taken.
    pub fn register(&mut self, name: impl Into<String>) -> Option<ClassMask> {
        let name = name.into();
        if let Some(existing) = self.bit_for(&name) {
            return Some(existing);
        }
        if self.names.len() >= Self::MAX_CLASSES {
            return None;
        }
        self.names.push(name);
        Some(ClassMask::single(self.names.len() as u32 - 1))
    }

    /// Look up the mask for an exact class name (case-insensitive)
    pub fn bit_for(&self, name: &str) -> Option<ClassMask> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| ClassMask::single(i as u32))
    }

    /// Derive the supported-class mask for an action name.
    ///
    /// Every registered class whose name appears as a substring of the
    /// action name (case-insensitive) contributes its bit. When nothing
    /// matches the action is open to all classes.
    pub fn mask_for_action(&self, action: &str) -> ClassMask {
        let action = action.to_ascii_lowercase();
        let mut mask = ClassMask::NONE;
        for (i, name) in self.names.iter().enumerate() {
            if action.contains(&name.to_ascii_lowercase()) {
                mask.insert(ClassMask::single(i as u32));
            }
        }
        if mask.is_empty() {
            ClassMask::ALL
        } else {
            mask
        }
    }

    /// Registered class names in bit order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
