use crate::config::{SearchAdConfig, ShoppingConfig};
use crate::error::{CoreError, CoreResult};
use crate::sources::interface::{
    KeywordSuggestion, KeywordSuggestionSource, Listing, ListingQuery, ListingSearchSource,
};
use crate::sources::wire::{parse_keyword_tool, parse_shopping_search};
use crate::sources::{parse_base_url, read_success_body};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

const KEYWORD_TOOL_URI: &str = "/keywordstool";
const SHOPPING_SEARCH_URI: &str = "/v1/search/shop.json";

/// Base64 HMAC-SHA256 over `"{timestamp}.{method}.{uri}"`.
pub fn sign_request(timestamp: &str, method: &str, uri: &str, secret_key: &str) -> CoreResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| CoreError::Config(format!("search ad secret key rejected: {}", e)))?;
    mac.update(format!("{}.{}.{}", timestamp, method, uri).as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn timestamp_millis() -> String {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).to_string()
}

/// Paid-search keyword tool client.
pub struct SearchAdClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    secret_key: String,
    customer_id: String,
}

impl SearchAdClient {
    pub fn new(http: reqwest::Client, config: &SearchAdConfig) -> CoreResult<Self> {
        Ok(Self {
            http,
            base_url: parse_base_url(&config.base_url)?,
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            customer_id: config.customer_id.clone(),
        })
    }
}

#[async_trait]
impl KeywordSuggestionSource for SearchAdClient {
    async fn suggest(&self, hint_keywords: &str) -> CoreResult<Vec<KeywordSuggestion>> {
        let mut url = self
            .base_url
            .join(KEYWORD_TOOL_URI)
            .map_err(|e| CoreError::Config(format!("keyword tool url: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("hintKeywords", hint_keywords)
            .append_pair("showDetail", "1");

        let timestamp = timestamp_millis();
        let signature = sign_request(&timestamp, "GET", KEYWORD_TOOL_URI, &self.secret_key)?;
        debug!(hint_keywords, "keyword tool request");

        let response = self
            .http
            .get(url)
            .header("Content-Type", "application/json; charset=UTF-8")
            .header("X-Timestamp", timestamp)
            .header("X-API-KEY", &self.api_key)
            .header("X-Customer", &self.customer_id)
            .header("X-Signature", signature)
            .send()
            .await?;
        let body = read_success_body(response, "keyword tool").await?;
        parse_keyword_tool(&body)
    }
}

/// Shopping listing search client.
pub struct ShoppingSearchClient {
    http: reqwest::Client,
    base_url: Url,
    client_id: String,
    client_secret: String,
}

impl ShoppingSearchClient {
    pub fn new(http: reqwest::Client, config: &ShoppingConfig) -> CoreResult<Self> {
        Ok(Self {
            http,
            base_url: parse_base_url(&config.base_url)?,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }
}

#[async_trait]
impl ListingSearchSource for ShoppingSearchClient {
    async fn search(&self, query: &ListingQuery) -> CoreResult<Vec<Listing>> {
        if query.query.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "shopping search query cannot be empty".to_string(),
            ));
        }
        let mut url = self
            .base_url
            .join(SHOPPING_SEARCH_URI)
            .map_err(|e| CoreError::Config(format!("shopping search url: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("query", &query.query)
            .append_pair("display", &query.display.to_string())
            .append_pair("start", &query.start.to_string())
            .append_pair("sort", &query.sort);
        debug!(query = %query.query, display = query.display, "shopping search request");

        let response = self
            .http
            .get(url)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .header("Content-Type", "application/json")
            .send()
            .await?;
        let body = read_success_body(response, "shopping search").await?;
        parse_shopping_search(&body)
    }
}
