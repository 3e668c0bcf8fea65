use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use super::{MacroId, ProfileId};

/// How a macro challenge's indicator is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    #[default]
    #[serde(alias = "numerico")]
    #[strum(to_string = "numeric", serialize = "numerico", ascii_case_insensitive)]
    Numeric,
    #[serde(alias = "porcentaje")]
    #[strum(to_string = "percentage", serialize = "porcentaje", ascii_case_insensitive)]
    Percentage,
}

/// A stated goal: an optional number with an optional description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Goal {
    pub value: Option<f64>,
    pub description: Option<String>,
}

/// A top-level yearly strategic goal fed by area contributions.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroChallenge {
    pub id: MacroId,
    pub year: i32,
    /// Name of the unit accountable for the macro, as written by the admin.
    pub responsible_area: String,
    pub challenge: String,
    pub indicator: String,
    pub indicator_kind: IndicatorKind,
    pub goal_primary: Goal,
    pub goal_secondary: Goal,
    pub created_by: Option<ProfileId>,
    pub created_at: OffsetDateTime,
}

/// Fields of a new or edited macro challenge.
#[derive(Debug, Clone)]
pub struct MacroChallengeDraft {
    pub year: i32,
    pub responsible_area: String,
    pub challenge: String,
    pub indicator: String,
    pub indicator_kind: IndicatorKind,
    pub goal_primary: Goal,
    pub goal_secondary: Goal,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn indicator_kind_accepts_legacy_names() {
        assert_eq!(IndicatorKind::from_str("porcentaje").unwrap(), IndicatorKind::Percentage);
        assert_eq!(IndicatorKind::from_str("Numeric").unwrap(), IndicatorKind::Numeric);
        assert_eq!(IndicatorKind::Percentage.to_string(), "percentage");
    }
}
