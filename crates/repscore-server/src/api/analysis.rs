//! `POST /api/v1/analysis/comprehensive`: run (or replay) one reputation
//! analysis.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;

use repscore_analysis::AnalysisError;
use repscore_core::ReputationAnalysis;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AnalysisRequest {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

fn map_analysis_error(request_id: &str, error: &AnalysisError) -> ApiError {
    match error {
        AnalysisError::Validation(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
        AnalysisError::AggregateFailure(_) => {
            tracing::error!(error = %error, "comprehensive analysis failed");
            ApiError::new(request_id, "internal_error", "failed to perform analysis")
        }
    }
}

pub(super) async fn comprehensive_analysis(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ReputationAnalysis>>, ApiError> {
    let rid = &req_id.0;
    let Json(body) = body.map_err(|e| ApiError::new(rid, "bad_request", e.body_text()))?;

    let company_name = body.company_name.unwrap_or_default();
    if company_name.trim().is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "companyName is required",
        ));
    }

    let analysis = state
        .analyzer
        .run_analysis(
            &company_name,
            body.location.as_deref().unwrap_or_default(),
            body.website.as_deref().unwrap_or_default(),
        )
        .await
        .map_err(|e| map_analysis_error(rid, &e))?;

    Ok(Json(ApiResponse {
        data: analysis,
        meta: ResponseMeta::new(req_id.0),
    }))
}
