use anyhow::Context;
use bytes::Bytes;
use tracing::{error, info};
use uuid::Uuid;

use crate::analyses::repo::Analysis;
use crate::analyses::report::generate_mock_report;
use crate::error::ApiError;
use crate::state::AppState;

/// Create an analysis end to end: store the uploaded views, generate
/// the report, write the result blob, insert the owned row. Artifacts
/// written before a failure are removed again so an abandoned create
/// leaves nothing behind.
pub async fn create_analysis(
    state: &AppState,
    user_id: i64,
    patient_id: &str,
    notes: Option<String>,
    ap_image: Option<Bytes>,
    lat_image: Option<Bytes>,
) -> Result<Analysis, ApiError> {
    if ap_image.is_none() && lat_image.is_none() {
        return Err(ApiError::BadRequest(
            "At least one X-ray image (AP or lateral) is required".into(),
        ));
    }

    let analysis_id = Uuid::new_v4().to_string();
    info!(%analysis_id, %patient_id, %user_id, "creating analysis");

    match store_and_insert(state, &analysis_id, user_id, patient_id, notes, ap_image, lat_image)
        .await
    {
        Ok(analysis) => Ok(analysis),
        Err(e) => {
            // Clean up on error
            if let Err(cleanup) = state.artifacts.remove_artifacts(&analysis_id).await {
                error!(error = %cleanup, %analysis_id, "cleanup after failed create");
            }
            Err(ApiError::Internal(e))
        }
    }
}

async fn store_and_insert(
    state: &AppState,
    analysis_id: &str,
    user_id: i64,
    patient_id: &str,
    notes: Option<String>,
    ap_image: Option<Bytes>,
    lat_image: Option<Bytes>,
) -> anyhow::Result<Analysis> {
    let mut ap_path = None;
    if let Some(body) = ap_image {
        ap_path = Some(
            state
                .artifacts
                .save_image(analysis_id, "ap.jpg", body)
                .await
                .context("save ap image")?,
        );
    }

    let mut lat_path = None;
    if let Some(body) = lat_image {
        lat_path = Some(
            state
                .artifacts
                .save_image(analysis_id, "lat.jpg", body)
                .await
                .context("save lat image")?,
        );
    }

    let report = generate_mock_report(ap_path.is_some(), lat_path.is_some());
    let result_path = state
        .artifacts
        .save_result(analysis_id, &serde_json::to_value(&report)?)
        .await
        .context("save analysis result")?;

    Analysis::insert(
        &state.db,
        analysis_id,
        patient_id,
        ap_path.as_deref(),
        lat_path.as_deref(),
        &result_path,
        notes.as_deref(),
        user_id,
    )
    .await
    .context("insert analysis row")
}

/// Per-row summary for listings: a broken or missing result file
/// degrades that row instead of failing the whole listing.
pub async fn load_row_summary(state: &AppState, analysis: &Analysis) -> String {
    match state.artifacts.load_result(&analysis.result_path).await {
        Ok(report) => report
            .get("summary")
            .and_then(|s| s.as_str())
            .unwrap_or("No summary available")
            .to_string(),
        Err(e) => {
            error!(error = %e, analysis_id = %analysis.id, "error reading analysis result");
            "Error retrieving summary".to_string()
        }
    }
}
