use crate::config::RelatedKeywordConfig;
use crate::error::{CoreError, CoreResult};
use crate::sources::interface::{RelatedKeywordRecord, RelatedKeywordSource};
use crate::sources::wire::parse_related_table;
use crate::sources::{parse_base_url, read_success_body};
use async_trait::async_trait;
use url::Url;

/// Client for the third-party keyword table used by the standalone related-keyword lookup.
pub struct KeywordTableClient {
    http: reqwest::Client,
    base_url: Url,
}

impl KeywordTableClient {
    pub fn new(http: reqwest::Client, config: &RelatedKeywordConfig) -> CoreResult<Self> {
        Ok(Self {
            http,
            base_url: parse_base_url(&config.base_url)?,
        })
    }

    fn table_url(&self, keyword: &str) -> CoreResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CoreError::Config("related keyword base url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["api", "keywords", keyword, "table"]);
        let nonce = (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).to_string();
        url.query_pairs_mut().append_pair("_", &nonce);
        Ok(url)
    }
}

#[async_trait]
impl RelatedKeywordSource for KeywordTableClient {
    async fn related_rows(&self, keyword: &str) -> CoreResult<Vec<RelatedKeywordRecord>> {
        if keyword.trim().is_empty() {
            return Err(CoreError::InvalidInput("keyword is required".to_string()));
        }
        let response = self
            .http
            .get(self.table_url(keyword)?)
            .header("Accept", "application/json")
            .header("Referer", self.base_url.as_str())
            .send()
            .await?;
        let body = read_success_body(response, "related keyword table").await?;
        parse_related_table(&body)
    }
}
