use time::OffsetDateTime;

use super::AreaId;

/// An organisational unit that reports progress.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub id: AreaId,
    pub name: String,
    /// Free-form classification, e.g. "direction" or "school".
    pub kind: String,
    pub active: bool,
    pub created_at: OffsetDateTime,
}

impl Area {
    pub fn to_ref(&self) -> AreaRef {
        AreaRef {
            id: self.id,
            name: self.name.clone(),
            kind: self.kind.clone(),
        }
    }
}

/// The area fields carried along with joined rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaRef {
    pub id: AreaId,
    pub name: String,
    pub kind: String,
}

/// Fields of a new or edited area.
#[derive(Debug, Clone)]
pub struct AreaDraft {
    pub name: String,
    pub kind: String,
}

/// Changes applied to an existing area.
#[derive(Debug, Clone)]
pub struct AreaUpdate {
    pub name: String,
    pub kind: String,
    pub active: Option<bool>,
}

/// A profile's link to an area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaMembership {
    pub area: AreaRef,
    pub is_primary: bool,
}
