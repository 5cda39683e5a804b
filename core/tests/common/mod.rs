#![allow(dead_code)]

use async_trait::async_trait;
use listing_core::error::{CoreError, CoreResult};
use listing_core::generation::interface::{GenerationRequest, ImageAnalysis, TextGenerator};
use listing_core::keywords::model::MonthlyCount;
use listing_core::sources::interface::{
    KeywordSuggestion, KeywordSuggestionSource, Listing, ListingQuery, ListingSearchSource,
    RelatedKeywordRecord, RelatedKeywordSource,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub fn suggestion(text: &str, pc: MonthlyCount, mobile: MonthlyCount) -> KeywordSuggestion {
    KeywordSuggestion {
        text: text.to_string(),
        monthly_pc_qc_cnt: pc,
        monthly_mobile_qc_cnt: mobile,
        comp_idx: "중간".to_string(),
    }
}

pub fn listing(title: &str, categories: [&str; 4]) -> Listing {
    Listing {
        title: title.to_string(),
        category1: categories[0].to_string(),
        category2: categories[1].to_string(),
        category3: categories[2].to_string(),
        category4: categories[3].to_string(),
        image: String::new(),
    }
}

#[derive(Default)]
pub struct FakeSuggestions {
    pub by_hint: HashMap<String, Vec<KeywordSuggestion>>,
    pub failing: HashSet<String>,
    pub fail_all: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSuggestions {
    pub fn with(mut self, hint: &str, rows: Vec<KeywordSuggestion>) -> Self {
        self.by_hint.insert(hint.to_string(), rows);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeywordSuggestionSource for FakeSuggestions {
    async fn suggest(&self, hint_keywords: &str) -> CoreResult<Vec<KeywordSuggestion>> {
        self.calls.lock().unwrap().push(hint_keywords.to_string());
        if self.fail_all || self.failing.contains(hint_keywords) {
            return Err(CoreError::UpstreamUnavailable("keyword tool down".to_string()));
        }
        Ok(self.by_hint.get(hint_keywords).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct FakeListings {
    pub by_query: HashMap<String, Vec<Listing>>,
    pub failing: HashSet<String>,
    pub fail_all: bool,
}

impl FakeListings {
    pub fn with(mut self, query: &str, rows: Vec<Listing>) -> Self {
        self.by_query.insert(query.to_string(), rows);
        self
    }

    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing.insert(query.to_string());
        self
    }
}

#[async_trait]
impl ListingSearchSource for FakeListings {
    async fn search(&self, query: &ListingQuery) -> CoreResult<Vec<Listing>> {
        if self.fail_all || self.failing.contains(&query.query) {
            return Err(CoreError::UpstreamUnavailable("shopping search down".to_string()));
        }
        Ok(self.by_query.get(&query.query).cloned().unwrap_or_default())
    }
}

/// Extracts a configured keyword per product name and composes the title from the request
/// so tests can see what reached the synthesizer.
#[derive(Default)]
pub struct FakeGenerator {
    pub keywords: HashMap<String, String>,
    pub features: Vec<String>,
    pub fixed_title: Option<String>,
    pub fail_synthesis_for: HashSet<String>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeGenerator {
    pub fn with_keyword(mut self, product_name: &str, keyword: &str) -> Self {
        self.keywords
            .insert(product_name.to_string(), keyword.to_string());
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn extract_keyword(&self, product_name: &str, _image_url: &str) -> CoreResult<String> {
        self.keywords
            .get(product_name)
            .cloned()
            .ok_or_else(|| CoreError::UpstreamUnavailable("generation backend down".to_string()))
    }

    async fn analyze_image_features(&self, _image_url: &str) -> CoreResult<ImageAnalysis> {
        Ok(ImageAnalysis {
            category: "가전".to_string(),
            features: self.features.clone(),
        })
    }

    async fn synthesize_title(&self, request: &GenerationRequest) -> CoreResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        if self.fail_synthesis_for.contains(&request.seed_product_name)
            || self.fail_synthesis_for.contains(&request.main_keyword)
        {
            return Err(CoreError::MalformedGenerationOutput("no title".to_string()));
        }
        if let Some(t) = &self.fixed_title {
            return Ok(t.clone());
        }
        let mut parts = vec![request.main_keyword.clone()];
        parts.extend(request.title_keywords.iter().map(|k| k.text.clone()));
        parts.extend(
            request
                .image_features
                .iter()
                .take(request.constraints.max_image_features)
                .cloned(),
        );
        Ok(parts.join(" "))
    }
}

#[derive(Default)]
pub struct FakeRelated {
    pub rows: Vec<RelatedKeywordRecord>,
    pub fail: bool,
}

#[async_trait]
impl RelatedKeywordSource for FakeRelated {
    async fn related_rows(&self, _keyword: &str) -> CoreResult<Vec<RelatedKeywordRecord>> {
        if self.fail {
            return Err(CoreError::UpstreamUnavailable("keyword table down".to_string()));
        }
        Ok(self.rows.clone())
    }
}
