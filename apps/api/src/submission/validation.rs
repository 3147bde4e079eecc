use serde::Serialize;

use crate::models::submission::SubmissionRequest;

const COMPANY_NAME_LEN: (usize, usize) = (2, 200);
const JOB_TITLE_LEN: (usize, usize) = (2, 100);
const JOB_DESCRIPTION_MIN_LEN: usize = 20;

/// Per-field validation messages. All `None` means the request may proceed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ValidationErrors {
    pub fn is_valid(&self) -> bool {
        self.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }

    /// Number of fields with a message.
    pub fn len(&self) -> usize {
        self.fields().count()
    }

    /// `(field name, message)` for every failing field, in form order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        [
            ("companyName", &self.company_name),
            ("jobTitle", &self.job_title),
            ("jobDescription", &self.job_description),
            ("file", &self.file),
        ]
        .into_iter()
        .filter_map(|(name, msg)| msg.as_deref().map(|m| (name, m)))
    }
}

/// Checks every rule and reports all violations together.
pub fn validate(request: &SubmissionRequest) -> ValidationErrors {
    ValidationErrors {
        company_name: check_length(
            "Company name",
            &request.company_name,
            COMPANY_NAME_LEN.0,
            Some(COMPANY_NAME_LEN.1),
        ),
        job_title: check_length(
            "Job title",
            &request.job_title,
            JOB_TITLE_LEN.0,
            Some(JOB_TITLE_LEN.1),
        ),
        job_description: check_length(
            "Job description",
            &request.job_description,
            JOB_DESCRIPTION_MIN_LEN,
            None,
        ),
        file: request
            .file
            .is_none()
            .then(|| "Please upload your resume".to_string()),
    }
}

fn check_length(label: &str, value: &str, min: usize, max: Option<usize>) -> Option<String> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Some(format!("{label} is required"));
    }
    if len < min {
        return Some(format!("{label} must be at least {min} characters"));
    }
    match max {
        Some(max) if len > max => Some(format!("{label} must be at most {max} characters")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Document;
    use bytes::Bytes;

    fn valid_request() -> SubmissionRequest {
        SubmissionRequest {
            company_name: "Acme".to_string(),
            job_title: "Engineer".to_string(),
            job_description: "Build distributed systems at scale for our platform team."
                .to_string(),
            file: Some(Document::new(
                "cv.pdf",
                "application/pdf",
                Bytes::from_static(b"%PDF"),
            )),
        }
    }

    fn failing_fields(errors: &ValidationErrors) -> Vec<&'static str> {
        errors.fields().map(|(name, _)| name).collect()
    }

    #[test]
    fn test_valid_request_has_no_errors() {
        let errors = validate(&valid_request());
        assert!(errors.is_valid());
        assert!(errors.is_empty());
        assert_eq!(errors.len(), 0);
    }

    #[test]
    fn test_boundary_lengths_pass() {
        let mut req = valid_request();
        req.company_name = "ab".to_string();
        req.job_title = "x".repeat(100);
        req.job_description = "d".repeat(20);
        assert!(validate(&req).is_valid());

        req.company_name = "c".repeat(200);
        req.job_title = "QA".to_string();
        assert!(validate(&req).is_valid());
    }

    #[test]
    fn test_company_name_too_short() {
        let mut req = valid_request();
        req.company_name = "A".to_string();
        let errors = validate(&req);
        assert_eq!(failing_fields(&errors), vec!["companyName"]);
        assert!(errors.company_name.unwrap().contains("at least 2"));
    }

    #[test]
    fn test_company_name_too_long() {
        let mut req = valid_request();
        req.company_name = "c".repeat(201);
        assert_eq!(failing_fields(&validate(&req)), vec!["companyName"]);
    }

    #[test]
    fn test_job_title_too_long() {
        let mut req = valid_request();
        req.job_title = "t".repeat(101);
        let errors = validate(&req);
        assert_eq!(failing_fields(&errors), vec!["jobTitle"]);
        assert!(errors.job_title.unwrap().contains("at most 100"));
    }

    #[test]
    fn test_single_character_job_title() {
        let mut req = valid_request();
        req.job_title = "X".to_string();
        let errors = validate(&req);
        assert_eq!(failing_fields(&errors), vec!["jobTitle"]);
        assert_eq!(
            errors.job_title.as_deref(),
            Some("Job title must be at least 2 characters")
        );
    }

    #[test]
    fn test_job_description_minimum_boundary() {
        let mut req = valid_request();
        req.job_description = "d".repeat(19);
        let errors = validate(&req);
        assert_eq!(failing_fields(&errors), vec!["jobDescription"]);
        assert!(errors.job_description.unwrap().contains("at least 20"));

        req.job_description = "d".repeat(20);
        assert!(validate(&req).is_empty());
    }

    #[test]
    fn test_job_description_too_short() {
        let mut req = valid_request();
        req.job_description = "Too short.".to_string();
        assert_eq!(failing_fields(&validate(&req)), vec!["jobDescription"]);
    }

    #[test]
    fn test_long_job_description_has_no_upper_bound() {
        let mut req = valid_request();
        req.job_description = "word ".repeat(10_000);
        assert!(validate(&req).is_valid());
    }

    #[test]
    fn test_missing_file() {
        let mut req = valid_request();
        req.file = None;
        assert_eq!(failing_fields(&validate(&req)), vec!["file"]);
    }

    #[test]
    fn test_whitespace_is_trimmed_before_measuring() {
        let mut req = valid_request();
        req.company_name = "   A   ".to_string();
        req.job_title = "        ".to_string();
        let errors = validate(&req);
        assert_eq!(failing_fields(&errors), vec!["companyName", "jobTitle"]);
        assert_eq!(errors.job_title.as_deref(), Some("Job title is required"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let mut req = valid_request();
        req.company_name = "Ünï".to_string();
        assert!(validate(&req).is_valid());
        req.company_name = "é".repeat(200);
        assert!(validate(&req).is_valid());
    }

    #[test]
    fn test_all_violations_reported_at_once() {
        let req = SubmissionRequest {
            company_name: String::new(),
            file: None,
            ..valid_request()
        };
        let errors = validate(&req);
        assert_eq!(failing_fields(&errors), vec!["companyName", "file"]);

        let empty = validate(&SubmissionRequest::default());
        assert_eq!(empty.len(), 4);
    }

    #[test]
    fn test_validate_is_repeatable() {
        let mut req = valid_request();
        req.job_title = "X".to_string();
        assert_eq!(validate(&req), validate(&req));
    }

    #[test]
    fn test_errors_serialize_only_failing_fields() {
        let mut req = valid_request();
        req.file = None;
        let value = serde_json::to_value(validate(&req)).unwrap();
        assert_eq!(value, serde_json::json!({"file": "Please upload your resume"}));
    }
}
