//! # Component Signatures
//!
//! A fixed-width bitset recording either the component types present on an
//! entity or the component types a system requires. Bit `n` corresponds to
//! the component whose [`ComponentId`] is `n`.

use std::fmt;
use std::ops::{BitAnd, BitOr};

use super::component::ComponentId;

/// Number of distinct component types a signature can represent.
pub const MAX_COMPONENTS: usize = 32;

/// Bitset of component types.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature(u32);

impl Signature {
    /// The signature with no components.
    pub const EMPTY: Self = Self(0);

    /// Sets the bit for `id`.
    #[inline]
    pub fn set(&mut self, id: ComponentId) {
        self.0 |= 1 << id.bit();
    }

    /// Clears the bit for `id`.
    #[inline]
    pub fn reset(&mut self, id: ComponentId) {
        self.0 &= !(1 << id.bit());
    }

    /// Tests the bit for `id`.
    #[inline]
    #[must_use]
    pub const fn test(self, id: ComponentId) -> bool {
        (self.0 >> id.bit()) & 1 == 1
    }

    /// Clears every bit.
    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Whether no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of bits set.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Membership rule: `self & required == required`.
    ///
    /// An empty requirement is satisfied by every signature.
    #[inline]
    #[must_use]
    pub const fn contains_all(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitAnd for Signature {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Signature {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:#034b})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u8) -> ComponentId {
        ComponentId::new(n)
    }

    #[test]
    fn test_signature_set_reset() {
        let mut sig = Signature::EMPTY;
        assert!(!sig.test(id(5)));

        sig.set(id(5));
        sig.set(id(31));
        assert!(sig.test(id(5)));
        assert!(sig.test(id(31)));
        assert_eq!(sig.len(), 2);

        sig.reset(id(5));
        assert!(!sig.test(id(5)));

        sig.clear();
        assert!(sig.is_empty());
    }

    #[test]
    fn test_signature_superset_matching() {
        let mut entity = Signature::EMPTY;
        entity.set(id(0));
        entity.set(id(1));
        entity.set(id(4));

        let mut required = Signature::EMPTY;
        required.set(id(0));
        required.set(id(1));
        assert!(entity.contains_all(required));
        assert_eq!(entity & required, required);

        required.set(id(2));
        assert!(!entity.contains_all(required));

        assert!(Signature::EMPTY.contains_all(Signature::EMPTY));
        assert!(entity.contains_all(Signature::EMPTY));
    }
}
