// Copyright (c) 2025 - Cowboy AI, Inc.
//! Typed record identifiers
//!
//! Every record kind gets its own UUID v7 newtype so a fabric id can never be
//! handed to an operation expecting a topology id.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new time-ordered identifier
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing UUID
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

record_id!(
    /// Identifier of a topology template
    TopologyId
);
record_id!(
    /// Identifier of a fabric instance
    FabricId
);
record_id!(
    /// Identifier of an externally owned configuration record
    ConfigurationId
);
record_id!(
    /// Identifier of a compiled fabric rule
    FabricRuleId
);
record_id!(
    /// Identifier of a discovery rule
    DiscoveryRuleId
);
