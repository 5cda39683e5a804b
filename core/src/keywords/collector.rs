use crate::keywords::frequency::TitleFrequencyExtractor;
use crate::keywords::model::Keyword;
use crate::sources::interface::{KeywordSuggestionSource, ListingQuery, ListingSearchSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectedKeywords {
    pub search_ad_keywords: Vec<Keyword>,
    pub title_keywords: Vec<Keyword>,
}

/// How listing searches are paged and how many suggestions are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorSettings {
    pub suggestion_limit: usize,
    pub listing_display: u32,
    pub listing_start: u32,
    pub listing_sort: String,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            suggestion_limit: 50,
            listing_display: 50,
            listing_start: 1,
            listing_sort: "sim".to_string(),
        }
    }
}

impl CollectorSettings {
    pub fn listing_query(&self, query: &str) -> ListingQuery {
        ListingQuery {
            query: query.to_string(),
            display: self.listing_display,
            start: self.listing_start,
            sort: self.listing_sort.clone(),
        }
    }
}

pub struct KeywordCollector {
    suggestions: Arc<dyn KeywordSuggestionSource>,
    listings: Arc<dyn ListingSearchSource>,
    extractor: TitleFrequencyExtractor,
    settings: CollectorSettings,
}

impl KeywordCollector {
    pub fn new(
        suggestions: Arc<dyn KeywordSuggestionSource>,
        listings: Arc<dyn ListingSearchSource>,
        extractor: TitleFrequencyExtractor,
        settings: CollectorSettings,
    ) -> Self {
        Self {
            suggestions,
            listings,
            extractor,
            settings,
        }
    }

    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    /// Queries both sources concurrently. A failing source contributes an empty list.
    pub async fn collect_for_seed(&self, seed: &str) -> CollectedKeywords {
        let query = self.settings.listing_query(seed);
        let (suggested, listed) =
            tokio::join!(self.suggestions.suggest(seed), self.listings.search(&query));

        let search_ad_keywords = match suggested {
            Ok(s) => s
                .iter()
                .take(self.settings.suggestion_limit)
                .map(|s| s.to_keyword())
                .collect(),
            Err(e) => {
                warn!(seed, error = %e, "keyword suggestions unavailable, continuing without them");
                Vec::new()
            }
        };

        let title_keywords = match listed {
            Ok(listings) => {
                let titles: Vec<&str> = listings.iter().map(|l| l.title.as_str()).collect();
                self.extractor.extract_frequent_terms(&titles)
            }
            Err(e) => {
                warn!(seed, error = %e, "listing titles unavailable, continuing without them");
                Vec::new()
            }
        };

        debug!(
            seed,
            search_ad = search_ad_keywords.len(),
            title = title_keywords.len(),
            "collected keyword candidates"
        );
        CollectedKeywords {
            search_ad_keywords,
            title_keywords,
        }
    }
}
