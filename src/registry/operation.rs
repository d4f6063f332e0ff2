//! Operation descriptors and request planning.

use crate::error::{Error, ErrorContext};
use crate::transport::http::value_to_text;
use crate::types::Parameters;
use crate::Result;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// HTTP methods an operation may use. Resolved once when the operation is
/// declared, never per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// POST, PUT and PATCH send parameters in the body; GET and DELETE in the query.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(Error::configuration_with_context(
                format!("unsupported HTTP method: {}", s),
                ErrorContext::new().with_source("operation_registry"),
            )),
        }
    }
}

/// Custom parameter check; `Err` carries the message shown to the user.
pub type ParamValidator = fn(&Parameters) -> std::result::Result<(), String>;

/// Static descriptor of one API operation.
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: String,
    pub description: String,
    pub method: HttpMethod,
    /// Path with `{name}` placeholders, e.g. `/projects/{project_id}/files`.
    pub path_template: String,
    /// Checked in declaration order; the first missing one is reported.
    pub required_params: Vec<String>,
    pub optional_params: Vec<String>,
    pub validator: Option<ParamValidator>,
}

impl Operation {
    /// Declare an operation from a method name. Unknown methods are rejected here.
    pub fn new(id: impl Into<String>, method: &str, path_template: impl Into<String>) -> Result<Self> {
        Ok(Self::with_method(id, method.parse()?, path_template))
    }

    pub fn with_method(
        id: impl Into<String>,
        method: HttpMethod,
        path_template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            method,
            path_template: path_template.into(),
            required_params: Vec::new(),
            optional_params: Vec::new(),
            validator: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self, names: &[&str]) -> Self {
        self.required_params = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn optional(mut self, names: &[&str]) -> Self {
        self.optional_params = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn validated_by(mut self, validator: ParamValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Whether `name` is substituted into the path template.
    pub fn is_path_param(&self, name: &str) -> bool {
        self.path_template.contains(&format!("{{{}}}", name))
    }

    /// Required-presence check first, then the custom validator.
    ///
    /// Path parameters that are null or blank count as missing.
    pub fn validate(&self, parameters: &Parameters) -> Result<()> {
        if let Some(missing) = self.required_params.iter().find(|name| {
            match parameters.get(name.as_str()) {
                None => true,
                Some(value) => self.is_path_param(name) && is_blank(value),
            }
        }) {
            return Err(Error::validation_with_context(
                format!("missing required parameter: {}", missing),
                ErrorContext::new()
                    .with_field_path(format!("parameters.{}", missing))
                    .with_source(self.id.clone()),
            ));
        }

        if let Some(validator) = self.validator {
            validator(parameters).map_err(|msg| {
                Error::validation_with_context(msg, ErrorContext::new().with_source(self.id.clone()))
            })?;
        }
        Ok(())
    }

    /// Validate `parameters` and split them into path, query and body.
    ///
    /// Required parameters named by a `{placeholder}` are substituted into the
    /// URL and appear in neither the query nor the body.
    pub fn build_request(&self, parameters: &Parameters) -> Result<RequestPlan> {
        self.validate(parameters)?;

        let mut url = self.path_template.clone();
        let mut path_params: Vec<&str> = Vec::new();
        for name in &self.required_params {
            let placeholder = format!("{{{}}}", name);
            if url.contains(&placeholder) {
                if let Some(value) = parameters.get(name) {
                    url = url.replace(&placeholder, &self.path_segment(name, value)?);
                    path_params.push(name.as_str());
                }
            }
        }

        let remaining: Parameters = parameters
            .iter()
            .filter(|(k, _)| !path_params.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let (query_params, body_params) = if self.method.carries_body() {
            (Parameters::new(), remaining)
        } else {
            (remaining, Parameters::new())
        };

        Ok(RequestPlan {
            operation: self.id.clone(),
            method: self.method,
            url,
            query_params,
            body_params,
        })
    }

    /// One encoded path segment. `/`, `?`, `#` and `%` are escaped; dot
    /// segments are rejected since URL parsing would resolve them.
    fn path_segment(&self, name: &str, value: &Value) -> Result<String> {
        let text = value_to_text(value);
        if matches!(text.as_str(), "." | "..") {
            return Err(Error::validation_with_context(
                format!("invalid path parameter: {}", name),
                ErrorContext::new()
                    .with_field_path(format!("parameters.{}", name))
                    .with_details(text)
                    .with_source(self.id.clone()),
            ));
        }
        Ok(utf8_percent_encode(&text, PATH_SEGMENT).to_string())
    }
}

/// Everything except RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Concrete request derived from an operation and caller parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestPlan {
    pub operation: String,
    pub method: HttpMethod,
    /// Endpoint path with placeholders substituted, relative to the API base URL.
    pub url: String,
    pub query_params: Parameters,
    pub body_params: Parameters,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: serde_json::Value) -> Parameters {
        v.as_object().cloned().unwrap()
    }

    fn reject_all(_: &Parameters) -> std::result::Result<(), String> {
        Err("validator says no".into())
    }

    #[test]
    fn method_parsing_is_case_insensitive() {
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!(" Delete ".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
    }

    #[test]
    fn unknown_method_fails_at_declaration() {
        let err = Operation::new("trace_it", "TRACE", "/x").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert_eq!(err.message(), "unsupported HTTP method: TRACE");
    }

    #[test]
    fn first_missing_required_param_is_reported() {
        let op = Operation::with_method("login", HttpMethod::Post, "/auth/login")
            .required(&["username", "password"]);
        let err = op.build_request(&Parameters::new()).unwrap_err();
        assert_eq!(err.message(), "missing required parameter: username");
    }

    #[test]
    fn validator_runs_only_after_presence_check() {
        let op = Operation::with_method("x", HttpMethod::Post, "/x")
            .required(&["a"])
            .validated_by(reject_all);
        let missing = op.build_request(&Parameters::new()).unwrap_err();
        assert_eq!(missing.message(), "missing required parameter: a");
        let rejected = op.build_request(&params(json!({"a": 1}))).unwrap_err();
        assert_eq!(rejected.message(), "validator says no");
    }

    #[test]
    fn post_routes_remaining_params_to_body() {
        let op = Operation::with_method("upload_file", HttpMethod::Post, "/projects/{project_id}/files")
            .required(&["project_id", "file_data"])
            .optional(&["file_name"]);
        let plan = op
            .build_request(&params(json!({
                "project_id": "p9",
                "file_data": "aGVsbG8=",
                "file_name": "a.txt"
            })))
            .unwrap();
        assert_eq!(plan.url, "/projects/p9/files");
        assert!(plan.query_params.is_empty());
        assert_eq!(plan.body_params.len(), 2);
        assert!(!plan.body_params.contains_key("project_id"));
    }

    #[test]
    fn delete_routes_remaining_params_to_query() {
        let op = Operation::with_method("delete_user", HttpMethod::Delete, "/users/{user_id}")
            .required(&["user_id"]);
        let plan = op
            .build_request(&params(json!({"user_id": 42, "force": true})))
            .unwrap();
        assert_eq!(plan.url, "/users/42");
        assert_eq!(plan.query_params, params(json!({"force": true})));
        assert!(plan.body_params.is_empty());
    }

    fn delete_file() -> Operation {
        Operation::with_method(
            "delete_file",
            HttpMethod::Delete,
            "/projects/{project_id}/files/{file_id}",
        )
        .required(&["project_id", "file_id"])
    }

    #[test]
    fn path_values_are_encoded_as_single_segments() {
        let plan = delete_file()
            .build_request(&params(json!({"project_id": "p 1", "file_id": "../users/1"})))
            .unwrap();
        assert_eq!(plan.url, "/projects/p%201/files/..%2Fusers%2F1");

        let plan = delete_file()
            .build_request(&params(json!({"project_id": "a?b#c", "file_id": "100%"})))
            .unwrap();
        assert_eq!(plan.url, "/projects/a%3Fb%23c/files/100%25");
    }

    #[test]
    fn dot_segments_are_rejected() {
        for bad in [".", ".."] {
            let err = delete_file()
                .build_request(&params(json!({"project_id": bad, "file_id": "f1"})))
                .unwrap_err();
            assert!(matches!(err, Error::Validation { .. }));
            assert_eq!(err.message(), "invalid path parameter: project_id");
        }
    }

    #[test]
    fn null_or_blank_path_values_are_missing() {
        for blank in [json!(null), json!(""), json!("   ")] {
            let err = delete_file()
                .build_request(&params(json!({"project_id": blank, "file_id": "f1"})))
                .unwrap_err();
            assert_eq!(err.message(), "missing required parameter: project_id");
        }
    }

    #[test]
    fn null_body_params_are_still_present() {
        let op = Operation::with_method("create_project", HttpMethod::Post, "/projects")
            .required(&["name"]);
        let plan = op.build_request(&params(json!({"name": null}))).unwrap();
        assert_eq!(plan.body_params, params(json!({"name": null})));
    }

    #[test]
    fn optional_params_are_never_substituted_into_path() {
        let op = Operation::with_method("odd", HttpMethod::Get, "/things/{kind}").optional(&["kind"]);
        let plan = op.build_request(&params(json!({"kind": "a"}))).unwrap();
        assert_eq!(plan.url, "/things/{kind}");
        assert_eq!(plan.query_params, params(json!({"kind": "a"})));
    }
}
