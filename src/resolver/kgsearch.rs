//! Knowledge Graph Search API adapter.
//!
//! Implements [`SearchBackend`] over the hosted `entities:search`
//! endpoint. Only the subset of the response the resolver needs is
//! interpreted; the raw result node is passed through untouched for
//! diagnostic rendering.

use async_trait::async_trait;
use serde_json::Value;

use crate::resolver::{SearchBackend, SearchError, SearchHit, SearchRequest};

const API_BASE: &str = "https://kgsearch.googleapis.com/v1/entities:search";

/// HTTP client for the Knowledge Graph Search API.
#[derive(Clone)]
pub struct KgSearchClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl KgSearchClient {
    /// Creates a client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: API_BASE.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Overrides the endpoint, for tests and proxies.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SearchBackend for KgSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, SearchError> {
        let mut params: Vec<(&str, String)> = vec![
            ("query", request.query.clone()),
            ("types", request.entity_type.clone()),
            ("limit", request.limit.to_string()),
            ("key", self.api_key.clone()),
        ];
        for language in &request.languages {
            params.push(("languages", language.clone()));
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;
        parse_hits(&body)
    }
}

/// Extracts ranked hits from an `entities:search` response body.
fn parse_hits(body: &Value) -> Result<Vec<SearchHit>, SearchError> {
    let Some(elements) = body.get("itemListElement") else {
        return Ok(Vec::new());
    };
    let elements = elements
        .as_array()
        .ok_or_else(|| SearchError::Parse("itemListElement is not an array".to_string()))?;

    let mut hits = Vec::with_capacity(elements.len());
    for element in elements {
        let result = element.get("result").cloned().unwrap_or(Value::Null);
        let id = result
            .get("@id")
            .and_then(Value::as_str)
            .ok_or_else(|| SearchError::Parse("result node missing @id".to_string()))?
            .to_string();
        let score = element
            .get("resultScore")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        hits.push(SearchHit { id, score, result });
    }
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_hits_extracts_id_and_score() {
        let body = json!({
            "itemListElement": [
                {
                    "resultScore": 120.5,
                    "result": { "@id": "kg:/m/0abc", "name": "Someone" }
                }
            ]
        });
        let hits = parse_hits(&body).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "kg:/m/0abc");
        assert!((hits[0].score - 120.5).abs() < f64::EPSILON);
        assert_eq!(hits[0].result["name"], "Someone");
    }

    #[test]
    fn test_parse_hits_empty_response() {
        assert!(parse_hits(&json!({})).unwrap().is_empty());
        assert!(parse_hits(&json!({ "itemListElement": [] })).unwrap().is_empty());
    }

    #[test]
    fn test_parse_hits_missing_id_is_parse_error() {
        let body = json!({
            "itemListElement": [ { "result": { "name": "No id" } } ]
        });
        assert!(matches!(
            parse_hits(&body).unwrap_err(),
            SearchError::Parse(_)
        ));
    }

    #[test]
    fn test_parse_hits_malformed_list_is_parse_error() {
        let body = json!({ "itemListElement": "not-a-list" });
        assert!(matches!(
            parse_hits(&body).unwrap_err(),
            SearchError::Parse(_)
        ));
    }

    #[test]
    fn test_missing_score_defaults_to_zero() {
        let body = json!({
            "itemListElement": [ { "result": { "@id": "kg:/m/0abc" } } ]
        });
        let hits = parse_hits(&body).unwrap();
        assert_eq!(hits[0].score, 0.0);
    }
}
