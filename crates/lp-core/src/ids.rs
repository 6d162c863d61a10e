//! Strongly typed, zero-cost identifier wrappers.
//!
//! Network ids are assigned by the authoritative network source and are
//! sparse, so they are used as map keys rather than `Vec` indices.  All IDs
//! are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  "No id" is expressed as
//! `Option<EndpointId>`, never as a sentinel value.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// The raw integer as used by the network source.
            #[inline(always)]
            pub fn raw(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// A junction in the road network.
    pub struct NodeId(u32);
}

typed_id! {
    /// A road segment connecting two junctions.
    pub struct SegmentId(u32);
}

typed_id! {
    /// A lane within a segment.  Unique per segment, not globally.
    pub struct LaneId(u32);
}

typed_id! {
    /// The point where a specific lane enters or leaves a junction.
    pub struct EndpointId(u32);
}

typed_id! {
    /// Unique identifier assigned to every pathing request at construction.
    pub struct RequestId(u64);
}
