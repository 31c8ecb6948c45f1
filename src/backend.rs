use reqwest::Client;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::types::{BackendIndexMeta, BackendIndexStats, BackendSearchResponse, SearchResult};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Index-level stats as reported by the backend. `updated_at` is the last
/// time the index changed, which doubles as the last-crawl timestamp since
/// only the crawler writes to it.
#[derive(Debug)]
pub struct IndexStats {
    pub documents: i64,
    pub is_indexing: bool,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Client for the Meilisearch HTTP API. One instance lives in `AppState`
/// for the life of the process; the inner `reqwest::Client` is pooled and
/// safe to share across requests.
pub struct SearchBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SearchBackend {
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Liveness probe. Any failure reduces to `false`.
    pub async fn health(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Backend health probe failed: {}", e);
                false
            }
        }
    }

    pub async fn stats(&self, index: &str) -> Result<IndexStats, BackendError> {
        let url = format!("{}/indexes/{}/stats", self.base_url, index);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let response = Self::error_for_status(response).await?;
        let stats: BackendIndexStats = response.json().await?;

        // Best-effort: the stats payload carries no timestamps, so pull
        // updatedAt from the index metadata. Missing metadata is not an
        // error, the caller falls back on its own.
        let updated_at = self.index_updated_at(index).await;

        Ok(IndexStats {
            documents: stats.number_of_documents,
            is_indexing: stats.is_indexing,
            updated_at,
        })
    }

    async fn index_updated_at(&self, index: &str) -> Option<chrono::DateTime<chrono::Utc>> {
        let url = format!("{}/indexes/{}", self.base_url, index);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        let meta: BackendIndexMeta = response.json().await.ok()?;
        meta.updated_at
    }

    /// Runs the query and projects each hit into a `SearchResult`, keeping
    /// the backend's ranking order. Returns the results together with the
    /// backend's estimated total hit count.
    pub async fn search(
        &self,
        index: &str,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<(Vec<SearchResult>, i64), BackendError> {
        let url = format!("{}/indexes/{}/search", self.base_url, index);
        let body = json!({
            "q": query,
            "limit": limit,
            "offset": offset,
            "showRankingScore": true,
        });

        debug!("Backend search: q={:?} limit={} offset={}", query, limit, offset);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = Self::error_for_status(response).await?;
        let parsed: BackendSearchResponse = response.json().await?;

        let results = parsed.hits.iter().map(hit_to_result).collect();
        Ok((results, parsed.estimated_total_hits))
    }

    async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

// Hits are schema-less from the gateway's point of view, so every field
// read has to tolerate absent or wrong-typed values.
fn hit_to_result(hit: &Map<String, Value>) -> SearchResult {
    SearchResult {
        title: string_field(hit, "title"),
        url: string_field(hit, "url"),
        snippet: string_field(hit, "snippet"),
        score: hit
            .get("_rankingScore")
            .and_then(Value::as_f64)
            .unwrap_or(1.0),
    }
}

fn string_field(hit: &Map<String, Value>, key: &str) -> String {
    hit.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test hit must be a JSON object"),
        }
    }

    #[test]
    fn projects_all_fields() {
        let result = hit_to_result(&hit(json!({
            "title": "Rust",
            "url": "https://rust-lang.org",
            "snippet": "A language empowering everyone",
            "_rankingScore": 0.87,
        })));
        assert_eq!(result.title, "Rust");
        assert_eq!(result.url, "https://rust-lang.org");
        assert_eq!(result.snippet, "A language empowering everyone");
        assert_eq!(result.score, 0.87);
    }

    #[test]
    fn missing_fields_become_empty_strings() {
        let result = hit_to_result(&hit(json!({ "title": "only a title" })));
        assert_eq!(result.title, "only a title");
        assert_eq!(result.url, "");
        assert_eq!(result.snippet, "");
    }

    #[test]
    fn wrong_typed_fields_become_empty_strings() {
        let result = hit_to_result(&hit(json!({
            "title": 42,
            "url": ["not", "a", "string"],
            "snippet": null,
        })));
        assert_eq!(result.title, "");
        assert_eq!(result.url, "");
        assert_eq!(result.snippet, "");
    }

    #[test]
    fn score_defaults_when_backend_omits_it() {
        let result = hit_to_result(&hit(json!({ "title": "t" })));
        assert_eq!(result.score, 1.0);

        let result = hit_to_result(&hit(json!({ "_rankingScore": "high" })));
        assert_eq!(result.score, 1.0);
    }
}
