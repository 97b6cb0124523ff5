//! Indirect object references.

use std::fmt;

/// Identity of an indirect object: `(object number, generation)`.
///
/// Written in PDF syntax as `N G R` when referenced and `N G obj` when
/// defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectRef {
    /// Object number.
    pub number: u32,
    /// Generation number.
    pub generation: u16,
}

impl ObjectRef {
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }

    /// Parse the two ASCII decimal components of a reference.
    ///
    /// Returns `None` if either component is not a number or does not fit
    /// its field.
    pub fn from_ascii(number: &[u8], generation: &[u8]) -> Option<Self> {
        let number = std::str::from_utf8(number).ok()?.parse().ok()?;
        let generation = std::str::from_utf8(generation).ok()?.parse().ok()?;
        Some(Self::new(number, generation))
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.number, self.generation)
    }
}

impl From<(u32, u16)> for ObjectRef {
    fn from((number, generation): (u32, u16)) -> Self {
        Self::new(number, generation)
    }
}
