use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A profile identifier.
///
/// Wraps i32 to match the database SERIAL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(i32);

impl ProfileId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ProfileId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<ProfileId> for i32 {
    fn from(id: ProfileId) -> Self {
        id.0
    }
}

/// UUID-backed identifiers of the tracking tables.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// A fresh random identifier for a row about to be inserted.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
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

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// An organisational unit (direction, school, ...).
    AreaId
);
uuid_id!(
    /// A yearly strategic macro challenge.
    MacroId
);
uuid_id!(
    /// An area's contribution to a macro challenge.
    ContributionId
);
uuid_id!(
    /// An area's own indicator, not tied to any macro.
    OwnIndicatorId
);
uuid_id!(
    /// A single appended progress report.
    ReportId
);
