use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Three-state completion classification of an indicator.
///
/// Ordered by severity: `Red` is the most severe, `Green` the least.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLight {
    /// Complete.
    #[serde(alias = "verde")]
    #[strum(to_string = "green", serialize = "verde", ascii_case_insensitive)]
    Green,
    /// In progress. Default for reports that do not pick a status.
    #[default]
    #[serde(alias = "naranja")]
    #[strum(to_string = "amber", serialize = "naranja", ascii_case_insensitive)]
    Amber,
    /// Not done.
    #[serde(alias = "rojo")]
    #[strum(to_string = "red", serialize = "rojo", ascii_case_insensitive)]
    Red,
}

impl TrafficLight {
    /// Sort rank for alert lists, most severe first.
    pub fn severity_rank(self) -> u8 {
        match self {
            TrafficLight::Red => 0,
            TrafficLight::Amber => 1,
            TrafficLight::Green => 2,
        }
    }

    /// Amber and red both count as "at risk" on dashboards.
    pub fn is_at_risk(self) -> bool {
        matches!(self, TrafficLight::Amber | TrafficLight::Red)
    }

    pub fn is_complete(self) -> bool {
        self == TrafficLight::Green
    }

    /// Human label shown next to the light.
    pub fn label(self) -> &'static str {
        match self {
            TrafficLight::Green => "Complete",
            TrafficLight::Amber => "In progress",
            TrafficLight::Red => "Not done",
        }
    }
}
