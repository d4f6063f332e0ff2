//! Parameter validators attached to catalog operations.
//!
//! Each check only looks at fields that are present; presence of required
//! fields is enforced separately before these run.

use crate::types::Parameters;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").expect("valid email regex"));
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

pub const ANALYSIS_TYPES: &[&str] = &[
    "statistical",
    "predictive",
    "descriptive",
    "diagnostic",
    "prescriptive",
];

type Outcome = std::result::Result<(), String>;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// `YYYY-MM-DD`, shape only.
pub fn is_valid_date(date: &str) -> bool {
    DATE_RE.is_match(date)
}

/// Lists pass; strings must decode as JSON.
fn is_list_like(v: &Value) -> bool {
    match v {
        Value::Array(_) => true,
        Value::String(s) => serde_json::from_str::<Value>(s).is_ok(),
        _ => false,
    }
}

/// Objects pass; strings must decode as JSON.
fn is_object_like(v: &Value) -> bool {
    match v {
        Value::Object(_) => true,
        Value::String(s) => serde_json::from_str::<Value>(s).is_ok(),
        _ => false,
    }
}

pub fn validate_user_params(params: &Parameters) -> Outcome {
    if let Some(email) = params.get("email") {
        if !email.as_str().map(is_valid_email).unwrap_or(false) {
            return Err("invalid email address".to_string());
        }
    }
    Ok(())
}

pub fn validate_project_params(params: &Parameters) -> Outcome {
    if let Some(name) = params.get("name") {
        let len = name.as_str().map(|s| s.chars().count()).unwrap_or(0);
        if !(3..=100).contains(&len) {
            return Err("project name must be between 3 and 100 characters".to_string());
        }
    }
    if let Some(tags) = params.get("tags") {
        if !is_list_like(tags) {
            return Err("tags must be a list or a valid JSON string".to_string());
        }
    }
    Ok(())
}

pub fn validate_analysis_params(params: &Parameters) -> Outcome {
    if let Some(kind) = params.get("analysis_type") {
        if !kind.as_str().map(|k| ANALYSIS_TYPES.contains(&k)).unwrap_or(false) {
            return Err(format!(
                "analysis type must be one of: {}",
                ANALYSIS_TYPES.join(", ")
            ));
        }
    }
    if let Some(p) = params.get("parameters") {
        if !is_object_like(p) {
            return Err("parameters must be an object or a valid JSON string".to_string());
        }
    }
    Ok(())
}

pub fn validate_statistics_params(params: &Parameters) -> Outcome {
    let start = params.get("start_date");
    let end = params.get("end_date");

    let check = |v: Option<&Value>, label: &str| -> std::result::Result<Option<String>, String> {
        match v {
            None => Ok(None),
            Some(v) => match v.as_str() {
                Some(s) if is_valid_date(s) => Ok(Some(s.to_string())),
                _ => Err(format!("invalid {} format, expected YYYY-MM-DD", label)),
            },
        }
    };

    let start = check(start, "start date")?;
    let end = check(end, "end date")?;
    if let (Some(s), Some(e)) = (start, end) {
        // Lexicographic order equals date order for YYYY-MM-DD.
        if s > e {
            return Err("start date cannot be later than end date".to_string());
        }
    }
    Ok(())
}
