use super::{TransportError, TransportResult};
use crate::config::ApiConfig;
use crate::error::{Error, ErrorContext};
use crate::registry::{HttpMethod, RequestPlan};
use crate::resilience::{AttemptFailure, ResiliencePolicy, RetryConfig, RetryPolicy};
use crate::types::Parameters;
use crate::Result;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};
use url::Url;

/// HTTP client for the target API: bearer auth, fixed timeout, and the
/// timeout-only retry of [`RetryPolicy`].
pub struct ApiTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    policy: Arc<dyn ResiliencePolicy>,
}

impl ApiTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Url::parse(&config.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid API base URL: {}", e),
                ErrorContext::new().with_field_path("api.base_url"),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::configuration(format!("cannot build HTTP client: {}", e)))?;

        let api_key = Some(config.api_key.clone()).filter(|k| !k.is_empty());

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            policy: Arc::new(RetryPolicy::new(RetryConfig::from(config))),
        })
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: Arc<dyn ResiliencePolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute http(s) endpoints pass through; anything else is joined to the base URL.
    pub fn resolve_url(&self, endpoint: &str) -> String {
        if let Ok(url) = Url::parse(endpoint) {
            if matches!(url.scheme(), "http" | "https") {
                return endpoint.to_string();
            }
        }
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// Execute a plan produced by the operation registry.
    pub async fn execute(&self, plan: &RequestPlan) -> TransportResult {
        let body = if plan.method.carries_body() {
            Some(&plan.body_params)
        } else {
            None
        };
        self.request(plan.method, &plan.url, Some(&plan.query_params), body)
            .await
    }

    pub async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        query: Option<&Parameters>,
        body: Option<&Parameters>,
    ) -> TransportResult {
        let url = self.resolve_url(endpoint);
        let pairs = query.map(query_pairs).unwrap_or_default();

        let mut attempt: u32 = 0;
        loop {
            debug!(method = method.as_str(), url = url.as_str(), attempt, "sending API request");
            match self.send_once(method, &url, &pairs, body).await {
                Ok((status, text)) => return interpret_response(status, text),
                Err(e) => {
                    let failure = AttemptFailure::classify(&e);
                    if let Some(delay) = self.policy.should_retry(attempt, failure) {
                        warn!(
                            url = url.as_str(),
                            attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "request timed out, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }
                    if failure == AttemptFailure::Timeout {
                        error!(url = url.as_str(), attempts = attempt + 1, "request timed out, retries exhausted");
                        return Err(TransportError::Timeout {
                            attempts: attempt + 1,
                        });
                    }
                    error!(url = url.as_str(), error = %e, "request failed");
                    return Err(TransportError::Request(e.to_string()));
                }
            }
        }
    }

    /// One attempt: send and read the whole body, so a stalled body also
    /// counts against the timeout.
    async fn send_once(
        &self,
        method: HttpMethod,
        url: &str,
        query: &[(String, String)],
        body: Option<&Parameters>,
    ) -> std::result::Result<(StatusCode, String), reqwest::Error> {
        let mut req = self
            .client
            .request(method.to_reqwest(), url)
            .header("accept", "application/json");

        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        Ok((status, text))
    }
}

/// Query values are sent as text: strings verbatim, other JSON values in
/// their JSON form, nulls dropped. Arrays become one pair per element
/// (`tags=a&tags=b`).
fn query_pairs(params: &Parameters) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) => pairs.extend(
                items
                    .iter()
                    .filter(|item| !item.is_null())
                    .map(|item| (key.clone(), value_to_text(item))),
            ),
            other => pairs.push((key.clone(), value_to_text(other))),
        }
    }
    pairs
}

pub(crate) fn value_to_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn interpret_response(status: StatusCode, text: String) -> TransportResult {
    if !status.is_success() {
        let details = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| {
            serde_json::json!({ "status_code": status.as_u16(), "text": text })
        });
        let message = match status.canonical_reason() {
            Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
            None => format!("HTTP {}", status.as_u16()),
        };
        warn!(status = status.as_u16(), "API returned an error status");
        return Err(TransportError::Status {
            status: status.as_u16(),
            message,
            details,
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }

    serde_json::from_str(&text).map_err(|_| {
        warn!("API response body is not valid JSON");
        TransportError::InvalidBody { text }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transport(base: &str) -> ApiTransport {
        ApiTransport::new(&ApiConfig {
            base_url: base.to_string(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn resolves_relative_and_absolute_endpoints() {
        let t = transport("https://api.example.com/");
        assert_eq!(t.resolve_url("/projects"), "https://api.example.com/projects");
        assert_eq!(t.resolve_url("projects"), "https://api.example.com/projects");
        assert_eq!(
            t.resolve_url("http://other.example.com/x"),
            "http://other.example.com/x"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = ApiTransport::new(&ApiConfig {
            base_url: "not a url".into(),
            ..ApiConfig::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn non_success_status_keeps_json_details() {
        let err = interpret_response(StatusCode::NOT_FOUND, r#"{"detail":"no such project"}"#.into())
            .unwrap_err();
        match err {
            TransportError::Status { status, message, details } => {
                assert_eq!(status, 404);
                assert_eq!(message, "HTTP 404 Not Found");
                assert_eq!(details, json!({"detail": "no such project"}));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn non_success_status_with_text_body() {
        let err = interpret_response(StatusCode::BAD_GATEWAY, "upstream down".into()).unwrap_err();
        assert_eq!(
            err.details(),
            Some(json!({"status_code": 502, "text": "upstream down"}))
        );
    }

    #[test]
    fn success_with_garbage_body_is_invalid_body() {
        let err = interpret_response(StatusCode::OK, "<html>".into()).unwrap_err();
        assert_eq!(err, TransportError::InvalidBody { text: "<html>".into() });
        assert_eq!(err.to_string(), "invalid response body");
    }

    #[test]
    fn empty_success_body_is_empty_object() {
        let v = interpret_response(StatusCode::NO_CONTENT, String::new()).unwrap();
        assert_eq!(v, json!({}));
    }

    #[test]
    fn array_query_values_repeat_the_key() {
        let mut p = Parameters::new();
        p.insert("tags".into(), json!(["a", null, 3]));
        p.insert("empty".into(), json!([]));
        assert_eq!(
            query_pairs(&p),
            vec![("tags".to_string(), "a".to_string()), ("tags".to_string(), "3".to_string())]
        );
    }

    #[test]
    fn query_values_are_stringified() {
        let mut p = Parameters::new();
        p.insert("page".into(), json!(2));
        p.insert("sort_by".into(), json!("name"));
        p.insert("skip".into(), Value::Null);
        let mut pairs = query_pairs(&p);
        pairs.sort();
        assert_eq!(
            pairs,
            vec![("page".to_string(), "2".to_string()), ("sort_by".to_string(), "name".to_string())]
        );
    }
}
