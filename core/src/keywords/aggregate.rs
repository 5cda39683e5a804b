use crate::keywords::model::{Keyword, SourceTag};
use indexmap::IndexMap;

/// Merges paid-search keywords with title-frequency keywords into one list keyed by exact
/// text. Paid-search entries keep their positions; title-only terms follow in extraction
/// order.
pub fn aggregate(search_ad_keywords: Vec<Keyword>, title_keywords: Vec<Keyword>) -> Vec<Keyword> {
    let mut merged: IndexMap<String, Keyword> =
        IndexMap::with_capacity(search_ad_keywords.len() + title_keywords.len());

    for keyword in search_ad_keywords.into_iter().chain(title_keywords) {
        match merged.get_mut(&keyword.text) {
            Some(existing) => {
                for detail in keyword.source_details {
                    existing.absorb(detail);
                }
            }
            None => {
                merged.insert(keyword.text.clone(), keyword);
            }
        }
    }

    merged.into_values().collect()
}

/// Keywords that at least one listing-title corpus produced.
pub fn title_keyword_subset(keywords: &[Keyword]) -> Vec<Keyword> {
    keywords
        .iter()
        .filter(|k| k.has_source(SourceTag::TitleFrequency))
        .cloned()
        .collect()
}
