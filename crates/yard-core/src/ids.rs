//! Strongly typed identifier wrappers.
//!
//! Identifiers come from the map, entity and task files as free-form strings
//! (`"BAY_A01"`, `"QC01"`, …).  Each kind gets its own newtype so a node id can
//! never be passed where an entity id is expected.  All IDs are
//! `Clone + Ord + Hash` and serialise transparently as plain strings.

use std::borrow::Borrow;
use std::fmt;

/// Generate a typed ID wrapper around a `String`.
macro_rules! string_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub String);

        impl $name {
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            #[inline]
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            #[inline]
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl Borrow<str> for $name {
            #[inline]
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id! {
    /// Identifier of a topology node (bay, quay, road, …).
    pub struct NodeId;
}

string_id! {
    /// Identifier of a road segment between two nodes.
    pub struct SegmentId;
}

string_id! {
    /// Identifier of a piece of equipment (quay crane, yard crane, truck).
    pub struct EntityId;
}

string_id! {
    /// Identifier of a transport instruction.
    pub struct InstructionId;
}
