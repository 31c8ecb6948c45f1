use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub total: i64,
    pub results: Vec<SearchResult>,
    pub search_time_ms: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_indexed: i64,
    pub is_indexing: bool,
    pub last_crawl: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend_reachable: bool,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// Meilisearch API types
#[derive(Debug, Deserialize)]
pub struct BackendSearchResponse {
    #[serde(default)]
    pub hits: Vec<serde_json::Map<String, serde_json::Value>>,
    #[serde(rename = "estimatedTotalHits", default)]
    pub estimated_total_hits: i64,
}

#[derive(Debug, Deserialize)]
pub struct BackendIndexStats {
    #[serde(rename = "numberOfDocuments", default)]
    pub number_of_documents: i64,
    #[serde(rename = "isIndexing", default)]
    pub is_indexing: bool,
}

#[derive(Debug, Deserialize)]
pub struct BackendIndexMeta {
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}
