use crate::keywords::model::Keyword;
use crate::sources::interface::RelatedKeywordRecord;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Inclusive combined-monthly-volume window for related-keyword discovery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolumeBand {
    pub min: u64,
    pub max: u64,
}

impl Default for VolumeBand {
    fn default() -> Self {
        Self { min: 40, max: 1200 }
    }
}

impl VolumeBand {
    pub fn contains(&self, volume: u64) -> bool {
        volume >= self.min && volume <= self.max
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BandedKeywords {
    pub related_keywords: Vec<String>,
    pub raw_data: Vec<RelatedKeywordRecord>,
}

/// Keeps records whose combined volume is inside `band` and whose shopping conversion is
/// positive. Input order is preserved.
pub fn filter_by_volume_band(records: Vec<RelatedKeywordRecord>, band: VolumeBand) -> BandedKeywords {
    let raw_data: Vec<RelatedKeywordRecord> = records
        .into_iter()
        .filter(|r| band.contains(r.combined_monthly_volume()) && r.shopping_conversion > 0.0)
        .collect();
    BandedKeywords {
        related_keywords: raw_data.iter().map(|r| r.keyword.clone()).collect(),
        raw_data,
    }
}

/// Stable sort, highest combined monthly volume first.
pub fn sort_by_volume_desc(keywords: &mut [Keyword]) {
    keywords.sort_by_key(|k| Reverse(k.combined_monthly_volume()));
}

pub fn sorted_by_volume_desc(mut keywords: Vec<Keyword>) -> Vec<Keyword> {
    sort_by_volume_desc(&mut keywords);
    keywords
}
