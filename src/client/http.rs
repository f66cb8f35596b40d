use reqwest::{Client, Url};
use serde_json::Value;
use thiserror::Error;

use crate::api::models::SearchRequest;
use crate::data_models::SearchHit;

use super::{FailureKind, SearchOutcome};

pub const SEARCH_PATH: &str = "/api/search";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid api base {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Posts form submissions to `<base>/api/search`. No timeout, no retries and
/// no compression negotiation: one call, one outcome.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    endpoint: Url,
}

impl SearchClient {
    pub fn new(api_base: &str) -> Result<Self, ClientError> {
        let raw = format!("{}{}", api_base.trim_end_matches('/'), SEARCH_PATH);
        let endpoint = Url::parse(&raw).map_err(|e| ClientError::InvalidBaseUrl {
            url: api_base.to_string(),
            message: e.to_string(),
        })?;
        // the crate-wide reqwest features turn on decompression; the form
        // client asks for plain bodies only
        let client = Client::builder()
            .no_gzip()
            .no_brotli()
            .no_deflate()
            .build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn search(&self, request: &SearchRequest) -> SearchOutcome {
        let response = match self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => return SearchOutcome::failure(FailureKind::Network, error_chain(&e)),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return SearchOutcome::failure(FailureKind::Network, error_chain(&e)),
        };

        // The status code is not checked on its own: a JSON body is used
        // whatever the status. It only classifies bodies that fail to parse.
        match results_from_body(&body) {
            Ok(results) => SearchOutcome::Success { results },
            Err(message) if !status.is_success() => SearchOutcome::failure(
                FailureKind::Server,
                format!("server responded with {status}: {message}"),
            ),
            Err(message) => SearchOutcome::failure(FailureKind::Parse, message),
        }
    }
}

fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Extracts the result list from a response body.
///
/// A missing or falsy `results` field means no results. A body that is not
/// JSON, a `null` body, or a `results` value that is not a list of hits is
/// an error.
pub fn results_from_body(body: &str) -> Result<Vec<SearchHit>, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| format!("invalid JSON response: {e}"))?;
    let results = match &value {
        Value::Null => return Err("response body is null".to_string()),
        Value::Object(map) => match map.get("results") {
            Some(results) if !is_falsy(results) => results.clone(),
            _ => return Ok(Vec::new()),
        },
        _ => return Ok(Vec::new()),
    };
    serde_json::from_value(results).map_err(|e| format!("malformed results: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base() {
        let client = SearchClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.endpoint().as_str(), "http://localhost:8000/api/search");

        let client = SearchClient::new("http://example.com/prefix").unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "http://example.com/prefix/api/search"
        );
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(matches!(
            SearchClient::new("not a url"),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_results_parsed_in_order() {
        let body = r#"{"results":[{"score":0.8231,"text":"hello"},{"id":"chunk-3","score":0.9,"text":"a\nb"}]}"#;
        let results = results_from_body(body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, Some(0.8231));
        assert_eq!(results[0].text, "hello");
        assert_eq!(results[1].id.as_deref(), Some("chunk-3"));
        assert_eq!(results[1].text, "a\nb");
    }

    #[test]
    fn test_missing_or_falsy_results_are_empty() {
        for body in [
            r#"{}"#,
            r#"{"results":null}"#,
            r#"{"results":false}"#,
            r#"{"results":0}"#,
            r#"{"results":""}"#,
            r#"{"detail":"Not Found"}"#,
            r#"[]"#,
            r#"42"#,
        ] {
            assert_eq!(results_from_body(body).unwrap(), vec![], "body: {body}");
        }
    }

    #[test]
    fn test_hit_without_score_is_accepted() {
        let results = results_from_body(r#"{"results":[{"text":"no score"}]}"#).unwrap();
        assert_eq!(results[0].score, None);
    }

    #[test]
    fn test_unparsable_bodies_fail() {
        assert!(results_from_body("<html>502 Bad Gateway</html>").is_err());
        assert!(results_from_body("").is_err());
        assert!(results_from_body("null").is_err());
        assert!(results_from_body(r#"{"results":"oops"}"#).is_err());
    }
}
