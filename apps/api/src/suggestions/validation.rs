use serde::{Deserialize, Serialize};

use crate::errors::AppError;

const MAX_FIELD_CHARS: usize = 200;

/// The job-analysis form: what role to look for, and where.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobQuery {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub job_country: String,
}

/// Validates the form and returns a trimmed copy.
///
/// Both fields are required and capped at 200 characters. All problems are
/// reported together in one message.
pub fn validate_query(query: &JobQuery) -> Result<JobQuery, AppError> {
    let job_title = query.job_title.trim();
    let job_country = query.job_country.trim();

    let mut problems = Vec::new();
    check_field(job_title, "Job title", &mut problems);
    check_field(job_country, "Country", &mut problems);

    if !problems.is_empty() {
        return Err(AppError::Validation(problems.join("; ")));
    }

    Ok(JobQuery {
        job_title: job_title.to_string(),
        job_country: job_country.to_string(),
    })
}

fn check_field(value: &str, label: &str, problems: &mut Vec<String>) {
    if value.is_empty() {
        problems.push(format!("{label} is required"));
    } else if value.chars().count() > MAX_FIELD_CHARS {
        problems.push(format!(
            "{label} must be at most {MAX_FIELD_CHARS} characters"
        ));
    }
}
