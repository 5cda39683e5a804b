use crate::error::CoreResult;
use crate::keywords::model::{Keyword, MonthlyCount, SearchVolume};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One paid-search keyword suggestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordSuggestion {
    pub text: String,
    pub monthly_pc_qc_cnt: MonthlyCount,
    pub monthly_mobile_qc_cnt: MonthlyCount,
    pub comp_idx: String,
}

impl KeywordSuggestion {
    pub fn volume(&self) -> SearchVolume {
        SearchVolume::new(self.monthly_pc_qc_cnt, self.monthly_mobile_qc_cnt)
    }

    pub fn to_keyword(&self) -> Keyword {
        Keyword::search_ad(self.text.clone(), self.volume(), &self.comp_idx)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingQuery {
    pub query: String,
    pub display: u32,
    pub start: u32,
    pub sort: String,
}

/// A shopping listing. Category fields are empty strings when the marketplace omits them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Listing {
    pub title: String,
    #[serde(default)]
    pub category1: String,
    #[serde(default)]
    pub category2: String,
    #[serde(default)]
    pub category3: String,
    #[serde(default)]
    pub category4: String,
    #[serde(default)]
    pub image: String,
}

impl Listing {
    /// All four category fields by position, empty ones included.
    pub fn category_segments(&self) -> Vec<String> {
        vec![
            self.category1.clone(),
            self.category2.clone(),
            self.category3.clone(),
            self.category4.clone(),
        ]
    }
}

/// One row of the third-party related-keyword table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelatedKeywordRecord {
    pub keyword: String,
    pub source: String,
    pub category: String,
    pub volume: SearchVolume,
    pub product_count: u64,
    pub competition_rate: f64,
    pub shopping_conversion: f64,
}

impl RelatedKeywordRecord {
    pub fn combined_monthly_volume(&self) -> u64 {
        self.volume.combined()
    }
}

#[async_trait]
pub trait KeywordSuggestionSource: Send + Sync {
    /// `hint_keywords` is a single term or up to five comma-joined terms.
    async fn suggest(&self, hint_keywords: &str) -> CoreResult<Vec<KeywordSuggestion>>;
}

#[async_trait]
pub trait ListingSearchSource: Send + Sync {
    async fn search(&self, query: &ListingQuery) -> CoreResult<Vec<Listing>>;
}

#[async_trait]
pub trait RelatedKeywordSource: Send + Sync {
    async fn related_rows(&self, keyword: &str) -> CoreResult<Vec<RelatedKeywordRecord>>;
}
