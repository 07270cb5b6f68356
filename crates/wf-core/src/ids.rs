//! Typed 0-based indices.

use core::fmt;
use core::num::NonZeroU32;

macro_rules! index_id {
    ($(#[$doc:meta])* $name:ident, $label:literal) => {
        $(#[$doc])*
        ///
        /// Stored as `index + 1` so that `Option<Self>` stays four bytes.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            pub fn from_index(index: u32) -> Self {
                Self(NonZeroU32::MIN.saturating_add(index))
            }

            pub fn index(self) -> u32 {
                self.0.get() - 1
            }

            /// The index as a `usize`, for array access.
            pub fn idx(self) -> usize {
                self.index() as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.index())
            }
        }
    };
}

index_id!(
    /// Position of a turbine in the farm layout.
    TurbineId,
    "turbine"
);
index_id!(
    /// Position of a chunk in the chunk grid of a calculation.
    ChunkId,
    "chunk"
);
