//! HTTP client for the R2 rules API.

use r2ctl_core::{
    ApiPath, HistorySource, RollupRule, RuleHistory, RuleSet, namespace_path, rollup_rule_path,
    rollup_rules_path,
};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9000/r2/v1";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for one R2 API base URL.
#[derive(Debug, Clone)]
pub struct R2Client {
    http: reqwest::Client,
    base_url: Url,
}

impl R2Client {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let normalized = normalize_base_url(base_url)?;
        let base_url = Url::parse(&normalized)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Full URL for an API path, with each segment percent-encoded.
    pub fn url(&self, path: &ApiPath) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path.segments());
        }
        url
    }

    /// Fetch the rollup rules of a namespace.
    pub async fn rollup_rules(&self, namespace: &str) -> Result<Vec<RollupRule>, ApiError> {
        let rule_set: RuleSet = self.get(&namespace_path(namespace)).await?;
        tracing::debug!(
            "Fetched rule set {} (version {}) with {} rollup rules",
            namespace,
            rule_set.version,
            rule_set.rollup_rules.len()
        );
        Ok(rule_set.rollup_rules)
    }

    /// Fetch the history of a rollup or mapping rule.
    pub async fn history(&self, source: &HistorySource) -> Result<Vec<RollupRule>, ApiError> {
        let history: RuleHistory = self.get(&source.path()).await?;
        Ok(history.rollup_rules)
    }

    /// Create the rule if it has no ID, otherwise update it in place.
    pub async fn save_rollup_rule(
        &self,
        namespace: &str,
        rule: &RollupRule,
    ) -> Result<RollupRule, ApiError> {
        let (method, path) = save_request(namespace, rule);
        let text = self
            .send(self.http.request(method, self.url(&path)).json(rule))
            .await?;
        decode(&text)
    }

    pub async fn delete_rollup_rule(&self, namespace: &str, id: &str) -> Result<(), ApiError> {
        self.send(
            self.http
                .request(Method::DELETE, self.url(&rollup_rule_path(namespace, id))),
        )
        .await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, path: &ApiPath) -> Result<T, ApiError> {
        let text = self.send(self.http.get(self.url(path))).await?;
        decode(&text)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        check_status(status, text)
    }
}

/// Method and path used to persist a rule.
pub fn save_request(namespace: &str, rule: &RollupRule) -> (Method, ApiPath) {
    if rule.is_new() {
        (Method::POST, rollup_rules_path(namespace))
    } else {
        (Method::PUT, rollup_rule_path(namespace, &rule.id))
    }
}

/// Strip trailing slashes and require an http(s) scheme.
pub fn normalize_base_url(base_url: &str) -> Result<String, ApiError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
    }
    Ok(trimmed.to_string())
}

fn check_status(status: StatusCode, body: String) -> Result<String, ApiError> {
    if status.is_success() {
        Ok(body)
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Decode a JSON response body.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("http://r2:9000/r2/v1/").unwrap(),
            "http://r2:9000/r2/v1"
        );
        assert_eq!(
            normalize_base_url(" https://r2.example.com ").unwrap(),
            "https://r2.example.com"
        );
        assert!(matches!(
            normalize_base_url("r2:9000"),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_url() {
        let client = R2Client::new("http://localhost:9000/r2/v1/").unwrap();
        let source = HistorySource::mapping_rule("prod", "m1");
        assert_eq!(
            client.url(&source.path()).as_str(),
            "http://localhost:9000/r2/v1/namespaces/prod/mapping-rules/m1/history"
        );

        let bare = R2Client::new("http://r2.internal").unwrap();
        assert_eq!(
            bare.url(&namespace_path("prod")).as_str(),
            "http://r2.internal/namespaces/prod"
        );
    }

    #[test]
    fn test_url_escapes_reserved_characters() {
        let client = R2Client::new("http://localhost:9000/r2/v1").unwrap();
        let url = client.url(&rollup_rule_path("team/a", "r?1#x"));
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/r2/v1/namespaces/team%2Fa/rollup-rules/r%3F1%23x"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_save_request() {
        let mut rule = RollupRule::default();
        assert_eq!(
            save_request("prod", &rule),
            (Method::POST, rollup_rules_path("prod"))
        );

        rule.id = "r1".to_string();
        assert_eq!(
            save_request("prod", &rule),
            (Method::PUT, rollup_rule_path("prod", "r1"))
        );
    }

    #[test]
    fn test_check_status() {
        assert_eq!(check_status(StatusCode::OK, "{}".to_string()).unwrap(), "{}");
        match check_status(StatusCode::NOT_FOUND, "no such rule".to_string()) {
            Err(ApiError::Status { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "no such rule");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_decode_history() {
        let history: RuleHistory =
            decode(r#"{"rollupRules": [{"id": "r1", "name": "v2"}, {"id": "r1", "name": "v1"}]}"#)
                .unwrap();
        let names: Vec<_> = history.rollup_rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["v2", "v1"]);

        assert!(matches!(
            decode::<RuleHistory>("not json"),
            Err(ApiError::Decode(_))
        ));
    }
}
