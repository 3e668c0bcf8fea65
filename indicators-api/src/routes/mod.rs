pub(crate) mod admin;
pub(crate) mod contributions;
pub(crate) mod dashboard;
pub(crate) mod error;
pub(crate) mod evidence;
pub(crate) mod macros;
pub(crate) mod own_indicators;

pub(crate) use error::ApiError;

use progress_core::TrafficLight;
use serde::Deserialize;
use time::{format_description::well_known::Iso8601, Date, OffsetDateTime};

use crate::domain::models::{IndicatorDraft, SubmitReport};

/// `?year=` on listing endpoints, defaulting to the current year.
#[derive(Debug, Deserialize)]
pub struct YearQuery {
    year: Option<i32>,
}

impl YearQuery {
    pub fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| OffsetDateTime::now_utc().year())
    }
}

fn parse_date(s: &str) -> Result<Date, ApiError> {
    Date::parse(s.trim(), &Iso8601::DATE)
        .map_err(|_| ApiError::bad_request(format!("could not parse date: {}", s)))
}

/// Body of `POST .../reports`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    report_date: String,
    current_value: Option<f64>,
    percent: Option<f64>,
    traffic_light: Option<TrafficLight>,
    #[serde(default)]
    comment: String,
    evidence_path: Option<String>,
}

impl TryFrom<ReportRequest> for SubmitReport {
    type Error = ApiError;

    fn try_from(request: ReportRequest) -> Result<Self, Self::Error> {
        Ok(SubmitReport {
            report_date: parse_date(&request.report_date)?,
            current_value: request.current_value,
            percent: request.percent,
            traffic_light: request.traffic_light,
            comment: request.comment,
            evidence_path: request.evidence_path,
        })
    }
}

/// One row of a batch create.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorDraftRequest {
    #[serde(default)]
    challenge: String,
    #[serde(default)]
    indicator: String,
    target_value: Option<f64>,
    target_description: Option<String>,
}

impl From<IndicatorDraftRequest> for IndicatorDraft {
    fn from(request: IndicatorDraftRequest) -> Self {
        IndicatorDraft {
            challenge: request.challenge,
            indicator: request.indicator,
            target_value: request.target_value,
            target_description: request.target_description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn report_request_parses_camel_case_body() {
        let request: ReportRequest = serde_json::from_value(serde_json::json!({
            "reportDate": "2025-06-30",
            "currentValue": 12.5,
            "trafficLight": "red",
            "comment": "delayed supplier",
        }))
        .unwrap();

        let report = SubmitReport::try_from(request).unwrap();

        assert_eq!(report.report_date, date!(2025 - 06 - 30));
        assert_eq!(report.current_value, Some(12.5));
        assert_eq!(report.traffic_light, Some(TrafficLight::Red));
        assert_eq!(report.percent, None);
        assert_eq!(report.evidence_path, None);
    }

    #[test]
    fn report_request_rejects_bad_dates() {
        let request: ReportRequest = serde_json::from_value(serde_json::json!({
            "reportDate": "30/06/2025",
            "comment": "x",
        }))
        .unwrap();

        let err = SubmitReport::try_from(request).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn year_defaults_to_current() {
        let query = YearQuery { year: None };
        assert_eq!(query.year(), OffsetDateTime::now_utc().year());
        assert_eq!(YearQuery { year: Some(2024) }.year(), 2024);
    }
}
