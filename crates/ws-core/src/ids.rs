//! Strongly typed, zero-cost identifier wrappers.
//!
//! Wards and stages are dense indices into flat `Vec`s.  The inner integer is
//! `pub` so hot loops can index directly, but callers should prefer the
//! `.index()` helpers for clarity.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a ward.  Wards are always numbered contiguously from 0.
    pub struct WardId(u32);
}

typed_id! {
    /// Index of a disease stage.  Stage 0 is the susceptible bucket; the
    /// disease defines stages `1..=n`, the last of which is "removed".
    pub struct StageId(u8);
}

impl StageId {
    pub const SUSCEPTIBLE: StageId = StageId(0);

    /// First disease stage; new infections always land here.
    pub const FIRST_INFECTED: StageId = StageId(1);

    #[inline]
    pub fn next(self) -> StageId {
        StageId(self.0 + 1)
    }
}
