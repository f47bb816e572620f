//! Axum route handlers for the Suggestions API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis_client::AnalysisMetrics;
use crate::errors::AppError;
use crate::segmentation::{segment, ProjectSegment};
use crate::state::AppState;
use crate::suggestions::validation::{validate_query, JobQuery};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    /// Upstream counters, passed through unmodified.
    #[serde(flatten)]
    pub metrics: AnalysisMetrics,
    pub projects: Vec<ProjectSegment>,
    pub raw_suggestions: String,
}

#[derive(Debug, Deserialize)]
pub struct SegmentRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SegmentResponse {
    pub projects: Vec<ProjectSegment>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/suggestions
///
/// Validates the job form, runs the upstream analysis and splits the returned
/// suggestion text into project segments. An empty suggestion text yields an
/// empty `projects` list, which clients show as "nothing to display".
pub async fn handle_suggest(
    State(state): State<AppState>,
    Json(request): Json<JobQuery>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let query = validate_query(&request)?;

    info!(
        "Analyzing '{}' in '{}'",
        query.job_title, query.job_country
    );

    let report = state.suggestions.fetch(&query).await?;
    let projects = segment(&report.suggestions);

    info!(
        "Analysis returned {} projects from {} jobs",
        projects.len(),
        report.metrics.jobs_analyzed
    );

    Ok(Json(SuggestionsResponse {
        metrics: report.metrics,
        projects,
        raw_suggestions: report.suggestions,
    }))
}

/// POST /api/v1/suggestions/segment
///
/// Segments caller-supplied suggestion text without contacting the analysis
/// service. Blank text is valid and yields no projects.
pub async fn handle_segment(Json(request): Json<SegmentRequest>) -> Json<SegmentResponse> {
    Json(SegmentResponse {
        projects: segment(&request.text),
    })
}
