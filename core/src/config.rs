//! Service configuration. Loaded from a JSON file; credentials may come from the
//! environment instead so they stay out of checked-in files.

use crate::byte_length::TitleBudget;
use crate::error::{CoreError, CoreResult};
use crate::generation::interface::TitleConstraints;
use crate::keywords::collector::CollectorSettings;
use crate::keywords::frequency::FrequencyBand;
use crate::keywords::rank::VolumeBand;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchAdConfig {
    pub base_url: String,
    pub api_key: String,
    pub secret_key: String,
    pub customer_id: String,
}

impl Default for SearchAdConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.naver.com".to_string(),
            api_key: String::new(),
            secret_key: String::new(),
            customer_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShoppingConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Default for ShoppingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openapi.naver.com".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelatedKeywordConfig {
    pub base_url: String,
}

impl Default for RelatedKeywordConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pandarank.net".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: String,
    pub keyword_model: String,
    pub image_model: String,
    pub title_model: String,
    pub keyword_temperature: f32,
    pub title_temperature: f32,
    pub keyword_max_tokens: u32,
    pub image_max_tokens: u32,
    pub title_max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            keyword_model: "gpt-4o-mini".to_string(),
            image_model: "gpt-4o".to_string(),
            title_model: "gpt-4o-mini".to_string(),
            keyword_temperature: 0.2,
            title_temperature: 0.7,
            keyword_max_tokens: 500,
            image_max_tokens: 500,
            title_max_tokens: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnrichmentSettings {
    pub enabled: bool,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            batch_size: 5,
            batch_delay_ms: 200,
        }
    }
}

impl EnrichmentSettings {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineSettings {
    pub suggestion_limit: usize,
    pub listing_display: u32,
    pub listing_start: u32,
    pub listing_sort: String,
    pub frequency_band: FrequencyBand,
    pub volume_band: VolumeBand,
    pub title_budget: TitleBudget,
    pub max_image_features: usize,
    pub enrichment: EnrichmentSettings,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            suggestion_limit: 50,
            listing_display: 50,
            listing_start: 1,
            listing_sort: "sim".to_string(),
            frequency_band: FrequencyBand::default(),
            volume_band: VolumeBand::default(),
            title_budget: TitleBudget::default(),
            max_image_features: 2,
            enrichment: EnrichmentSettings::default(),
        }
    }
}

impl PipelineSettings {
    pub fn collector_settings(&self) -> CollectorSettings {
        CollectorSettings {
            suggestion_limit: self.suggestion_limit,
            listing_display: self.listing_display,
            listing_start: self.listing_start,
            listing_sort: self.listing_sort.clone(),
        }
    }

    pub fn title_constraints(&self) -> TitleConstraints {
        TitleConstraints {
            budget: self.title_budget,
            max_image_features: self.max_image_features,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub search_ad: SearchAdConfig,
    pub shopping: ShoppingConfig,
    pub related: RelatedKeywordConfig,
    pub generation: GenerationConfig,
    pub pipeline: PipelineSettings,
    pub http_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            search_ad: SearchAdConfig::default(),
            shopping: ShoppingConfig::default(),
            related: RelatedKeywordConfig::default(),
            generation: GenerationConfig::default(),
            pipeline: PipelineSettings::default(),
            http_timeout_secs: 30,
        }
    }
}

impl ServiceConfig {
    pub fn from_json_str(json: &str) -> CoreResult<Self> {
        let cfg: ServiceConfig = serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("config is not valid JSON: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut cfg = Self::from_json_str(&raw)?;
        cfg.apply_env_overrides(|k| std::env::var(k).ok());
        Ok(cfg)
    }

    /// Credentials from the environment win over the file. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |slot: &mut String, key: &str| {
            if let Some(v) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = v;
            }
        };
        set(&mut self.search_ad.api_key, "NAVER_API_KEY");
        set(&mut self.search_ad.secret_key, "NAVER_SECRET_KEY");
        set(&mut self.search_ad.customer_id, "NAVER_CUSTOMER_ID");
        set(&mut self.shopping.client_id, "NAVER_CLIENT_ID");
        set(&mut self.shopping.client_secret, "NAVER_CLIENT_SECRET");
        set(&mut self.generation.api_key, "OPENAI_API_KEY");
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn validate(&self) -> CoreResult<()> {
        for (name, url) in [
            ("search_ad.base_url", &self.search_ad.base_url),
            ("shopping.base_url", &self.shopping.base_url),
            ("related.base_url", &self.related.base_url),
            ("generation.base_url", &self.generation.base_url),
        ] {
            if url.trim().is_empty() {
                return Err(CoreError::Config(format!("{} cannot be empty", name)));
            }
        }
        let p = &self.pipeline;
        if p.frequency_band.min > p.frequency_band.max {
            return Err(CoreError::Config(format!(
                "frequency band inverted: {} > {}",
                p.frequency_band.min, p.frequency_band.max
            )));
        }
        if p.volume_band.min > p.volume_band.max {
            return Err(CoreError::Config(format!(
                "volume band inverted: {} > {}",
                p.volume_band.min, p.volume_band.max
            )));
        }
        if p.title_budget.min_bytes > p.title_budget.max_bytes {
            return Err(CoreError::Config("title budget inverted".to_string()));
        }
        if p.suggestion_limit == 0 || p.listing_display == 0 {
            return Err(CoreError::Config(
                "suggestion_limit and listing_display must be positive".to_string(),
            ));
        }
        if p.enrichment.batch_size == 0 || p.enrichment.batch_size > 5 {
            return Err(CoreError::Config(
                "enrichment.batch_size must be between 1 and 5".to_string(),
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(CoreError::Config("http_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}
