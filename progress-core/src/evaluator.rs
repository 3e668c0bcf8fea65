use serde::Serialize;
use thiserror::Error;

use crate::TrafficLight;

/// Business-rule violations of a new progress report.
///
/// These are shown verbatim to the reporting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("a comment is required")]
    MissingComment,
    #[error("the current value is required to compare against the target")]
    MissingCurrentValue,
    #[error("to mark as complete, the reported value must be greater than or equal to the target")]
    InconsistentCompletion,
}

/// What a report is measured against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Target {
    pub target_value: Option<f64>,
    pub target_description: Option<String>,
}

impl Target {
    pub fn numeric(target_value: f64) -> Self {
        Self {
            target_value: Some(target_value),
            target_description: None,
        }
    }

    pub fn manual() -> Self {
        Self::default()
    }

    /// The numeric target, if reports are measured against one.
    ///
    /// Zero and negative targets fall back to manual-percent mode.
    pub fn numeric_goal(&self) -> Option<f64> {
        self.target_value.filter(|value| *value > 0.0)
    }
}

/// Values submitted by the reporter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportInput {
    pub current_value: Option<f64>,
    pub manual_percent: Option<f64>,
    pub declared_status: TrafficLight,
    pub comment: String,
}

impl ReportInput {
    pub fn new(declared_status: TrafficLight, comment: impl Into<String>) -> Self {
        Self {
            declared_status,
            comment: comment.into(),
            ..Self::default()
        }
    }

    pub fn with_current_value(mut self, current_value: f64) -> Self {
        self.current_value = Some(current_value);
        self
    }

    pub fn with_manual_percent(mut self, manual_percent: f64) -> Self {
        self.manual_percent = Some(manual_percent);
        self
    }
}

/// A validated report, ready to be appended to the history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedReport {
    pub percent: f64,
    pub traffic_light: TrafficLight,
    pub current_value: Option<f64>,
    pub comment: String,
}

/// Validate a report against its target and derive its completion percent.
///
/// With a numeric target the percent is `current / target`, capped at 100
/// and rounded to two decimals; declaring green below the target is
/// rejected. Without one the caller-supplied percent is taken as is.
pub fn evaluate(target: &Target, input: &ReportInput) -> Result<EvaluatedReport, EvaluationError> {
    let comment = input.comment.trim();
    if comment.is_empty() {
        return Err(EvaluationError::MissingComment);
    }

    let percent = match target.numeric_goal() {
        Some(goal) => {
            let current = input
                .current_value
                .ok_or(EvaluationError::MissingCurrentValue)?;

            if input.declared_status == TrafficLight::Green && current < goal {
                return Err(EvaluationError::InconsistentCompletion);
            }

            completion_percent(current, goal)
        }
        // Manual mode trusts the reporter's percent.
        None => input.manual_percent.unwrap_or(0.0),
    };

    Ok(EvaluatedReport {
        percent,
        traffic_light: input.declared_status,
        current_value: input.current_value,
        comment: comment.to_string(),
    })
}

/// `min(100, round(max(0, current) / goal * 10000) / 100)`.
pub fn completion_percent(current: f64, goal: f64) -> f64 {
    let ratio = current.max(0.0) / goal;
    ((ratio * 10_000.0).round() / 100.0).min(100.0)
}
