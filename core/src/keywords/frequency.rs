use crate::error::{CoreError, CoreResult};
use crate::keywords::model::Keyword;
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Inclusive occurrence band a title token must fall in to be kept.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrequencyBand {
    pub min: u32,
    pub max: u32,
}

impl Default for FrequencyBand {
    fn default() -> Self {
        Self { min: 2, max: 20 }
    }
}

impl FrequencyBand {
    pub fn contains(&self, count: u32) -> bool {
        count >= self.min && count <= self.max
    }
}

/// Turns a batch of marketplace listing titles into frequency-banded keyword candidates.
pub struct TitleFrequencyExtractor {
    band: FrequencyBand,
    markup: Regex,
    latin_only: Regex,
    product_code: Regex,
    quantity: Regex,
}

impl TitleFrequencyExtractor {
    pub fn new(band: FrequencyBand) -> CoreResult<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                CoreError::InvalidInput(format!("title filter pattern {}: {}", pattern, e))
            })
        };
        Ok(Self {
            band,
            markup: compile(r"<[^>]*>")?,
            latin_only: compile(r"^[a-zA-Z]+$")?,
            product_code: compile(r"^[a-zA-Z0-9]+$")?,
            quantity: compile(r"\d+개$")?,
        })
    }

    /// Output keeps the order in which surviving tokens first appear.
    pub fn extract_frequent_terms<S: AsRef<str>>(&self, titles: &[S]) -> Vec<Keyword> {
        let corpus = titles
            .iter()
            .map(|t| self.markup.replace_all(t.as_ref(), "").into_owned())
            .collect::<Vec<_>>()
            .join(" ");

        let mut counts: IndexMap<&str, u32> = IndexMap::new();
        for token in corpus.split_whitespace() {
            if self.is_rejected(token) {
                continue;
            }
            *counts.entry(token).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .filter(|(_, count)| self.band.contains(*count))
            .map(|(token, count)| Keyword::title_frequency(token, count))
            .collect()
    }

    fn is_rejected(&self, token: &str) -> bool {
        token.encode_utf16().count() < 2
            || self.latin_only.is_match(token)
            || self.product_code.is_match(token)
            || self.quantity.is_match(token)
    }
}
