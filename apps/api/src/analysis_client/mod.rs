//! Analysis Client — HTTP client for the remote job-analysis service.
//!
//! The service scrapes job listings for a title/country pair and returns an
//! AI-generated block of portfolio project suggestions plus summary counters.
//! Its output format is not under our control; see `segmentation`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::suggestions::validation::JobQuery;

const SCRAPE_PATH: &str = "/api/scrape";
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The service reported a failure in its `error` field.
    #[error("{0}")]
    Service(String),
}

/// Summary counters reported alongside the suggestions. Passed through to
/// callers unmodified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetrics {
    #[serde(default)]
    pub jobs_analyzed: u32,
    #[serde(default)]
    pub quality_descriptions: u32,
    #[serde(default)]
    pub historical_jobs_used: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_descriptions_used: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newly_fetched: Option<u32>,
    /// Seconds.
    #[serde(default)]
    pub total_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_time: Option<f64>,
}

/// Successful response envelope of `POST /api/scrape`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub suggestions: String,
    #[serde(flatten)]
    pub metrics: AnalysisMetrics,
}

/// The service answers either with a report or with `{ "error": "..." }`,
/// sometimes with a 2xx status.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScrapeResponse {
    Failure { error: String },
    Report(AnalysisReport),
}

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    job_title: &'a str,
    job_country: &'a str,
}

/// Where suggestion reports come from. `AppState` holds an
/// `Arc<dyn SuggestionSource>` so handlers can run against a stub in tests.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn fetch(&self, query: &JobQuery) -> Result<AnalysisReport, AppError>;
}

#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    scrape_url: String,
}

impl AnalysisClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AnalysisError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            scrape_url: format!("{}{SCRAPE_PATH}", base_url.trim_end_matches('/')),
        })
    }

    /// Runs one analysis. Retries on 429, 502-504 and connection failures with
    /// exponential backoff; timeouts are not retried since the service may
    /// still be working on the first request.
    pub async fn analyze(&self, query: &JobQuery) -> Result<AnalysisReport, AnalysisError> {
        let request_body = ScrapeRequest {
            job_title: &query.job_title,
            job_country: &query.job_country,
        };

        let mut attempt = 1;
        loop {
            match self.send_once(&request_body).await {
                Ok(report) => {
                    debug!(
                        "Analysis call succeeded: jobs_analyzed={}, suggestions_len={}",
                        report.metrics.jobs_analyzed,
                        report.suggestions.len()
                    );
                    return Ok(report);
                }
                Err(e) if attempt < MAX_ATTEMPTS && is_transient(&e) => {
                    // Exponential backoff: 1s, 2s
                    let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                    warn!(
                        "Analysis call attempt {} failed ({}), retrying after {}ms...",
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        request: &ScrapeRequest<'_>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let response = self
            .client
            .post(&self.scrape_url)
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if is_retryable(status) {
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        parse_scrape_body(status, &body)
    }
}

#[async_trait]
impl SuggestionSource for AnalysisClient {
    async fn fetch(&self, query: &JobQuery) -> Result<AnalysisReport, AppError> {
        self.analyze(query).await.map_err(AppError::from)
    }
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Whether a failed attempt is worth repeating: connection errors and
/// retryable statuses, never timeouts or answers the service meant.
fn is_transient(err: &AnalysisError) -> bool {
    match err {
        AnalysisError::Http(e) => !e.is_timeout(),
        AnalysisError::Api { status, .. } => StatusCode::from_u16(*status).is_ok_and(is_retryable),
        AnalysisError::Parse(_) | AnalysisError::Service(_) => false,
    }
}

/// Interprets a non-retryable response body. An `error` field wins over the
/// status code; a non-2xx status without one is an API error.
fn parse_scrape_body(status: StatusCode, body: &str) -> Result<AnalysisReport, AnalysisError> {
    match serde_json::from_str::<ScrapeResponse>(body) {
        Ok(ScrapeResponse::Failure { error }) => Err(AnalysisError::Service(error)),
        Ok(ScrapeResponse::Report(report)) if status.is_success() => Ok(report),
        Ok(ScrapeResponse::Report(_)) => Err(AnalysisError::Api {
            status: status.as_u16(),
            message: body.to_string(),
        }),
        Err(_) if !status.is_success() => Err(AnalysisError::Api {
            status: status.as_u16(),
            message: body.to_string(),
        }),
        Err(e) => Err(AnalysisError::Parse(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT_JSON: &str = r#"{
        "suggestions": "Project 1: Alpha\nbody\nProject 2: Beta\nbody",
        "jobs_analyzed": 12,
        "quality_descriptions": 8,
        "historical_jobs_used": 3,
        "cached_descriptions_used": 2,
        "newly_fetched": 6,
        "total_time": 41.7,
        "ai_time": 9.2
    }"#;

    #[test]
    fn test_parse_full_report() {
        let report = parse_scrape_body(StatusCode::OK, REPORT_JSON).unwrap();
        assert!(report.suggestions.starts_with("Project 1"));
        assert_eq!(report.metrics.jobs_analyzed, 12);
        assert_eq!(report.metrics.quality_descriptions, 8);
        assert_eq!(report.metrics.historical_jobs_used, 3);
        assert_eq!(report.metrics.newly_fetched, Some(6));
        assert!((report.metrics.total_time - 41.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_report_with_missing_optional_counters() {
        let body = r#"{"suggestions": "text", "jobs_analyzed": 4, "total_time": 3.5}"#;
        let report = parse_scrape_body(StatusCode::OK, body).unwrap();
        assert_eq!(report.metrics.jobs_analyzed, 4);
        assert_eq!(report.metrics.quality_descriptions, 0);
        assert_eq!(report.metrics.ai_time, None);
    }

    #[test]
    fn test_error_body_with_ok_status_is_service_error() {
        let body = r#"{"error": "Failed to generate AI suggestions."}"#;
        let err = parse_scrape_body(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, AnalysisError::Service(ref m) if m == "Failed to generate AI suggestions."));
    }

    #[test]
    fn test_error_body_with_server_error_is_service_error() {
        let body = r#"{"error": "Missing OpenRouter API key."}"#;
        let err = parse_scrape_body(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();
        assert!(matches!(err, AnalysisError::Service(_)));
    }

    #[test]
    fn test_non_json_error_page_is_api_error() {
        let err = parse_scrape_body(StatusCode::NOT_FOUND, "<html>Not Found</html>").unwrap_err();
        assert!(matches!(err, AnalysisError::Api { status: 404, .. }));
    }

    #[test]
    fn test_non_json_success_is_parse_error() {
        let err = parse_scrape_body(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
    }

    #[test]
    fn test_metrics_serialize_without_absent_optionals() {
        let metrics = AnalysisMetrics {
            jobs_analyzed: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["jobs_analyzed"], 1);
        assert!(json.get("ai_time").is_none());
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_retryable(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_transient_errors_are_retried_and_others_returned() {
        let busy = AnalysisError::Api {
            status: 503,
            message: "busy".to_string(),
        };
        let broken = AnalysisError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        let parse = serde_json::from_str::<serde_json::Value>("x").unwrap_err();
        assert!(is_transient(&busy));
        assert!(!is_transient(&broken));
        assert!(!is_transient(&AnalysisError::Service("No jobs".to_string())));
        assert!(!is_transient(&AnalysisError::Parse(parse)));
    }

    #[test]
    fn test_scrape_url_joins_without_double_slash() {
        let client = AnalysisClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.scrape_url, "http://localhost:5000/api/scrape");
    }
}
