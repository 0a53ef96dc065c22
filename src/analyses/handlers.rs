use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    analyses::{
        dto::{
            parse_query_date, AnalysisCreatedResponse, AnalysisDetail, AnalysisSummary,
            HistoryQuery, PatientHistoryQuery, UpdateAnalysisRequest,
        },
        repo::{Analysis, HistoryFilter, ANALYSIS_STATUSES},
        services,
    },
    auth::{extractors::CurrentUser, policy::ensure_owner_or_elevated, repo::User},
    error::ApiError,
    state::AppState,
};

pub fn analyses_routes() -> Router<AppState> {
    Router::new()
        .route("/analyses", post(create_analysis))
        .route(
            "/analyses/:id",
            get(get_analysis)
                .patch(update_analysis)
                .delete(delete_analysis),
        )
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(get_history))
        .route("/patients/:patient_id/history", get(get_patient_history))
}

/// Load the row, reporting absence before any authorization decision,
/// then apply the ownership check. Every analysis-scoped operation
/// goes through this.
async fn fetch_authorized(
    state: &AppState,
    user: &User,
    id: &str,
) -> Result<Analysis, ApiError> {
    let analysis = Analysis::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Analysis with id {id}")))?;
    ensure_owner_or_elevated(user, analysis.user_id)?;
    Ok(analysis)
}

fn bad_multipart<E: std::fmt::Display>(e: E) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart body: {e}"))
}

#[instrument(skip(state, current, mp))]
pub async fn create_analysis(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<AnalysisCreatedResponse>), ApiError> {
    let mut patient_id: Option<String> = None;
    let mut notes: Option<String> = None;
    let mut ap_image = None;
    let mut lat_image = None;

    while let Some(field) = mp.next_field().await.map_err(bad_multipart)? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("patient_id") => patient_id = Some(field.text().await.map_err(bad_multipart)?),
            Some("notes") => {
                let text = field.text().await.map_err(bad_multipart)?;
                if !text.is_empty() {
                    notes = Some(text);
                }
            }
            Some("ap_image") => {
                let data = field.bytes().await.map_err(bad_multipart)?;
                // Browsers send an empty part for an unselected file.
                if !data.is_empty() {
                    ap_image = Some(data);
                }
            }
            Some("lat_image") => {
                let data = field.bytes().await.map_err(bad_multipart)?;
                if !data.is_empty() {
                    lat_image = Some(data);
                }
            }
            _ => {}
        }
    }

    let patient_id = patient_id
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("patient_id is required".into()))?;

    let analysis = services::create_analysis(
        &state,
        current.id,
        &patient_id,
        notes,
        ap_image,
        lat_image,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(AnalysisCreatedResponse {
            analysis_id: analysis.id,
        }),
    ))
}

#[instrument(skip(state, current))]
pub async fn get_analysis(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<AnalysisDetail>, ApiError> {
    let analysis = fetch_authorized(&state, &current, &id).await?;

    let report = state.artifacts.load_result(&analysis.result_path).await?;
    Ok(Json(AnalysisDetail::from_parts(analysis, &report)))
}

#[instrument(skip(state, current, payload))]
pub async fn update_analysis(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAnalysisRequest>,
) -> Result<Json<AnalysisDetail>, ApiError> {
    let analysis = fetch_authorized(&state, &current, &id).await?;

    if let Some(status) = payload.status.as_deref() {
        if !ANALYSIS_STATUSES.contains(&status) {
            return Err(ApiError::BadRequest(format!(
                "Invalid status: {status} (expected one of new, reviewed, finalized)"
            )));
        }
    }

    let updated = Analysis::update(
        &state.db,
        &analysis.id,
        payload.notes.as_deref(),
        payload.status.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("Analysis with id {id}")))?;

    info!(analysis_id = %updated.id, user_id = %current.id, "analysis updated");

    let report = state.artifacts.load_result(&updated.result_path).await?;
    Ok(Json(AnalysisDetail::from_parts(updated, &report)))
}

#[instrument(skip(state, current))]
pub async fn delete_analysis(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let analysis = fetch_authorized(&state, &current, &id).await?;

    Analysis::delete(&state.db, &analysis.id).await?;
    state.artifacts.remove_artifacts(&analysis.id).await?;

    info!(analysis_id = %analysis.id, user_id = %current.id, "analysis deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, current))]
pub async fn get_history(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<AnalysisSummary>>, ApiError> {
    let start = q.start_date.as_deref().map(parse_query_date).transpose()?;
    let end = q.end_date.as_deref().map(parse_query_date).transpose()?;

    let filter = HistoryFilter {
        patient_id: q.patient_id,
        start,
        end,
        // NORMAL users only ever see their own rows.
        owner_id: (!current.role.is_elevated()).then_some(current.id),
        limit: q.limit.clamp(1, 100),
        offset: q.skip.max(0),
    };

    let rows = Analysis::list(&state.db, &filter).await?;

    let mut results = Vec::with_capacity(rows.len());
    for analysis in rows {
        let summary = services::load_row_summary(&state, &analysis).await;
        results.push(AnalysisSummary::from_row(analysis, summary));
    }
    Ok(Json(results))
}

#[instrument(skip(state, current))]
pub async fn get_patient_history(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(patient_id): Path<String>,
    Query(q): Query<PatientHistoryQuery>,
) -> Result<Json<Vec<AnalysisSummary>>, ApiError> {
    let filter = HistoryFilter {
        patient_id: Some(patient_id),
        start: None,
        end: None,
        owner_id: (!current.role.is_elevated()).then_some(current.id),
        limit: q.limit.clamp(1, 1000),
        offset: 0,
    };

    let rows = Analysis::list(&state.db, &filter).await?;

    let mut results = Vec::with_capacity(rows.len());
    for analysis in rows {
        let summary = services::load_row_summary(&state, &analysis).await;
        results.push(AnalysisSummary::from_row(analysis, summary));
    }
    Ok(Json(results))
}
