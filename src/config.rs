use anyhow::{bail, Context, Result};
use std::env;
use url::Url;

pub const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BACKEND_URL: &str = "http://localhost:7700";
const DEFAULT_INDEX: &str = "web_pages";

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub backend_key: String,
    pub index: String,
    pub port: u16,
    /// Requests per minute. Zero is passed through and resolved to the
    /// limiter's documented default.
    pub rate_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let backend_url =
            env::var("MEILISEARCH_URL").unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        let backend_url = Url::parse(&backend_url)
            .context("MEILISEARCH_URL is not a valid URL")?
            .as_str()
            .trim_end_matches('/')
            .to_string();

        let backend_key = env::var("MEILISEARCH_KEY")
            .or_else(|_| env::var("MEILI_MASTER_KEY"))
            .unwrap_or_default();
        if backend_key.is_empty() {
            bail!("MEILISEARCH_KEY or MEILI_MASTER_KEY must be set");
        }

        let port = match env::var("PORT") {
            Ok(value) => value.parse().context("PORT must be a valid port number")?,
            Err(_) => DEFAULT_PORT,
        };

        let rate_limit = env::var("RATE_LIMIT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(0);

        let index = env::var("SEARCH_INDEX").unwrap_or_else(|_| DEFAULT_INDEX.to_string());

        Ok(Self {
            backend_url,
            backend_key,
            index,
            port,
            rate_limit,
        })
    }
}
