use crate::byte_length::TitleBudget;
use crate::category::resolver::CategoryResolution;
use crate::error::CoreResult;
use crate::keywords::model::Keyword;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageAnalysis {
    pub category: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TitleConstraints {
    pub budget: TitleBudget,
    pub max_image_features: usize,
}

impl Default for TitleConstraints {
    fn default() -> Self {
        Self {
            budget: TitleBudget::default(),
            max_image_features: 2,
        }
    }
}

/// Everything the title synthesizer sees for one item. Built once per attempt and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub seed_product_name: String,
    pub image_url: String,
    pub main_keyword: String,
    pub related_keywords: Vec<Keyword>,
    pub category: CategoryResolution,
    pub image_features: Vec<String>,
    pub title_keywords: Vec<Keyword>,
    pub constraints: TitleConstraints,
}

/// Opaque text-generation backend. Every failure is fatal for the item being processed.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One short search term describing the product, no spaces.
    async fn extract_keyword(&self, product_name: &str, image_url: &str) -> CoreResult<String>;

    async fn analyze_image_features(&self, image_url: &str) -> CoreResult<ImageAnalysis>;

    async fn synthesize_title(&self, request: &GenerationRequest) -> CoreResult<String>;
}
