use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::analyses::repo::Analysis;
use crate::analyses::report::Measurement;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct AnalysisCreatedResponse {
    pub analysis_id: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisDetail {
    pub id: String,
    pub patient_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub ap_image_url: Option<String>,
    pub lat_image_url: Option<String>,
    pub has_ap: bool,
    pub has_lat: bool,
    pub measurements: Vec<Measurement>,
    pub summary: String,
    pub status: String,
    pub notes: Option<String>,
}

impl AnalysisDetail {
    /// Combine the database row with the loaded result blob. Missing
    /// report fields degrade to empty/default values rather than
    /// failing the response.
    pub fn from_parts(analysis: Analysis, report: &serde_json::Value) -> Self {
        let measurements = report
            .get("measurements")
            .cloned()
            .map(serde_json::from_value)
            .and_then(Result::ok)
            .unwrap_or_default();
        let summary = report
            .get("summary")
            .and_then(|s| s.as_str())
            .unwrap_or("No summary available")
            .to_string();

        let ap_image_url = analysis
            .ap_image_path
            .as_ref()
            .map(|_| format!("/static/images/{}/ap.jpg", analysis.id));
        let lat_image_url = analysis
            .lat_image_path
            .as_ref()
            .map(|_| format!("/static/images/{}/lat.jpg", analysis.id));

        Self {
            has_ap: analysis.ap_image_path.is_some(),
            has_lat: analysis.lat_image_path.is_some(),
            id: analysis.id,
            patient_id: analysis.patient_id,
            timestamp: analysis.created_at,
            ap_image_url,
            lat_image_url,
            measurements,
            summary,
            status: analysis.status,
            notes: analysis.notes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalysisSummary {
    pub id: String,
    pub patient_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub thumbnail_url: Option<String>,
    pub summary: String,
    pub status: String,
}

impl AnalysisSummary {
    pub fn from_row(analysis: Analysis, summary: String) -> Self {
        // First available view doubles as the thumbnail.
        let thumbnail_url = if analysis.ap_image_path.is_some() {
            Some(format!("/static/images/{}/ap.jpg", analysis.id))
        } else if analysis.lat_image_path.is_some() {
            Some(format!("/static/images/{}/lat.jpg", analysis.id))
        } else {
            None
        };

        Self {
            id: analysis.id,
            patient_id: analysis.patient_id,
            timestamp: analysis.created_at,
            thumbnail_url,
            summary,
            status: analysis.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAnalysisRequest {
    pub notes: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub patient_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct PatientHistoryQuery {
    #[serde(default = "default_patient_limit")]
    pub limit: i64,
}

fn default_patient_limit() -> i64 {
    100
}

/// Parse a `YYYY-MM-DD` query value into midnight UTC of that day.
pub fn parse_query_date(raw: &str) -> Result<OffsetDateTime, ApiError> {
    let format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(raw, &format)
        .map_err(|_| ApiError::BadRequest(format!("Invalid date: {raw}")))?;
    Ok(date.midnight().assume_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_analysis(ap: bool, lat: bool) -> Analysis {
        Analysis {
            id: "abc-123".into(),
            patient_id: "patient-1".into(),
            ap_image_path: ap.then(|| "static/images/abc-123/ap.jpg".into()),
            lat_image_path: lat.then(|| "static/images/abc-123/lat.jpg".into()),
            result_path: "static/results/abc-123.json".into(),
            notes: Some("post-op check".into()),
            status: "new".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            user_id: 1,
        }
    }

    #[test]
    fn detail_builds_urls_for_present_views_only() {
        let report = json!({
            "measurements": [{"label": "Radial Angle", "value": "22.3", "unit": "°"}],
            "summary": "looks fine"
        });
        let detail = AnalysisDetail::from_parts(make_analysis(true, false), &report);
        assert_eq!(
            detail.ap_image_url.as_deref(),
            Some("/static/images/abc-123/ap.jpg")
        );
        assert!(detail.lat_image_url.is_none());
        assert!(detail.has_ap);
        assert!(!detail.has_lat);
        assert_eq!(detail.measurements.len(), 1);
        assert_eq!(detail.summary, "looks fine");
    }

    #[test]
    fn detail_degrades_when_report_fields_are_missing() {
        let detail = AnalysisDetail::from_parts(make_analysis(false, true), &json!({}));
        assert!(detail.measurements.is_empty());
        assert_eq!(detail.summary, "No summary available");
    }

    #[test]
    fn summary_thumbnail_prefers_ap_view() {
        let both = AnalysisSummary::from_row(make_analysis(true, true), "s".into());
        assert_eq!(
            both.thumbnail_url.as_deref(),
            Some("/static/images/abc-123/ap.jpg")
        );

        let lat_only = AnalysisSummary::from_row(make_analysis(false, true), "s".into());
        assert_eq!(
            lat_only.thumbnail_url.as_deref(),
            Some("/static/images/abc-123/lat.jpg")
        );

        let neither = AnalysisSummary::from_row(make_analysis(false, false), "s".into());
        assert!(neither.thumbnail_url.is_none());
    }

    #[test]
    fn query_dates_parse_and_reject() {
        let parsed = parse_query_date("2025-04-09").unwrap();
        assert_eq!(parsed, time::macros::datetime!(2025-04-09 00:00 UTC));
        assert!(parse_query_date("09/04/2025").is_err());
        assert!(parse_query_date("2025-13-40").is_err());
    }
}
