//! Typed indices into the world's arenas.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub usize);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Agent index in `World::agents`.
    AgentId,
    "agent#"
);
arena_id!(
    /// Crop index in the resource registry.
    CropId,
    "crop#"
);
arena_id!(
    /// Crop row index in the resource registry.
    RowId,
    "row#"
);
arena_id!(
    /// Charging station index in the resource registry.
    StationId,
    "station#"
);
