//! services/console/src/adapters/backend.rs
//!
//! The shared JSON transport used by every backend adapter. Owns the base
//! URL and the error-mapping rules, so each adapter only describes its
//! endpoint and wire shapes.

use hr_insight_core::ports::{PortError, PortResult};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

/// Shape of the backend's error payload.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// A thin client for the HR analytics backend.
#[derive(Clone)]
pub struct Backend {
    http: reqwest::Client,
    base_url: Url,
}

impl Backend {
    /// Creates a backend client for the given base URL.
    pub fn new(http: reqwest::Client, base_url: &str) -> PortResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| PortError::Transport(format!("Invalid API base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(PortError::Transport(
                "API base URL cannot carry path segments".to_string(),
            ));
        }
        Ok(Self { http, base_url })
    }

    /// Sends a GET request and decodes the JSON response.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> PortResult<T> {
        let url = self.endpoint(segments, query);
        debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        Self::decode(response).await
    }

    /// Sends a POST request with a JSON body and decodes the JSON response.
    pub async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> PortResult<T> {
        let url = self.endpoint(segments, &[]);
        debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        Self::decode(response).await
    }

    /// Sends a bodyless POST request and decodes the JSON response.
    pub async fn post_empty<T: DeserializeOwned>(&self, segments: &[&str]) -> PortResult<T> {
        let url = self.endpoint(segments, &[]);
        debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;
        Self::decode(response).await
    }

    /// Builds a request URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        {
            // cannot_be_a_base was ruled out in the constructor.
            let mut path = url.path_segments_mut().expect("base URL accepts segments");
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        url
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> PortResult<T> {
        let status = response.status();
        if !status.is_success() {
            // The backend reports failures as `{"detail": "..."}`. Prefer that
            // text over the bare status code when it is present.
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail);
            return Err(match (status, detail) {
                (StatusCode::NOT_FOUND, Some(detail)) => PortError::NotFound(detail),
                (StatusCode::NOT_FOUND, None) => PortError::NotFound(status.to_string()),
                (_, Some(detail)) => PortError::Service(detail),
                (_, None) => PortError::Service(format!("Backend returned HTTP {status}")),
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| PortError::Malformed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> Backend {
        Backend::new(reqwest::Client::new(), base).unwrap()
    }

    #[test]
    fn endpoint_joins_segments_onto_the_base() {
        let backend = backend("http://localhost:8000");
        let url = backend.endpoint(&["conversations", "abc123"], &[]);
        assert_eq!(url.as_str(), "http://localhost:8000/conversations/abc123");
    }

    #[test]
    fn endpoint_percent_encodes_free_text_segments() {
        let backend = backend("http://localhost:8000");
        let url = backend.endpoint(
            &["conversations", "search", "head count?"],
            &[("limit", "10".to_string())],
        );
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/conversations/search/head%20count%3F?limit=10"
        );
    }

    #[test]
    fn trailing_slash_on_the_base_does_not_double_up() {
        let backend = backend("http://localhost:8000/");
        let url = backend.endpoint(&["status"], &[]);
        assert_eq!(url.as_str(), "http://localhost:8000/status");
    }

    #[test]
    fn an_unparseable_base_url_is_rejected() {
        assert!(Backend::new(reqwest::Client::new(), "not a url").is_err());
    }
}
