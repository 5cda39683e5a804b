use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

pub const FEWER_THAN_TEN: &str = "< 10";

/// Monthly query count as reported by the paid-search tool. Small counts are not reported
/// exactly; the tool sends the string "< 10" instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyCount {
    Exact(u64),
    FewerThanTen,
}

impl MonthlyCount {
    pub fn exact(self) -> Option<u64> {
        match self {
            MonthlyCount::Exact(n) => Some(n),
            MonthlyCount::FewerThanTen => None,
        }
    }
}

impl Default for MonthlyCount {
    fn default() -> Self {
        MonthlyCount::Exact(0)
    }
}

impl Serialize for MonthlyCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MonthlyCount::Exact(n) => serializer.serialize_u64(*n),
            MonthlyCount::FewerThanTen => serializer.serialize_str(FEWER_THAN_TEN),
        }
    }
}

impl<'de> Deserialize<'de> for MonthlyCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountVisitor;

        impl<'de> de::Visitor<'de> for CountVisitor {
            type Value = MonthlyCount;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a non-negative count or the string \"< 10\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<MonthlyCount, E> {
                Ok(MonthlyCount::Exact(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<MonthlyCount, E> {
                u64::try_from(v)
                    .map(MonthlyCount::Exact)
                    .map_err(|_| E::custom(format!("negative count {}", v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<MonthlyCount, E> {
                if v.is_finite() && v >= 0.0 {
                    Ok(MonthlyCount::Exact(v.trunc() as u64))
                } else {
                    Err(E::custom(format!("invalid count {}", v)))
                }
            }

            fn visit_unit<E: de::Error>(self) -> Result<MonthlyCount, E> {
                Ok(MonthlyCount::Exact(0))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<MonthlyCount, E> {
                let t = v.trim();
                if t.replace(' ', "") == "<10" {
                    return Ok(MonthlyCount::FewerThanTen);
                }
                t.replace(',', "")
                    .parse::<u64>()
                    .map(MonthlyCount::Exact)
                    .map_err(|_| E::custom(format!("unrecognized count {:?}", v)))
            }
        }

        deserializer.deserialize_any(CountVisitor)
    }
}

/// PC and mobile monthly query counts for one term.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchVolume {
    pub pc: MonthlyCount,
    pub mobile: MonthlyCount,
}

impl SearchVolume {
    pub fn new(pc: MonthlyCount, mobile: MonthlyCount) -> Self {
        Self { pc, mobile }
    }

    /// A volume reported as a single total, attributed to the PC side.
    pub fn total(count: u64) -> Self {
        Self {
            pc: MonthlyCount::Exact(count),
            mobile: MonthlyCount::Exact(0),
        }
    }

    /// Combined monthly volume. A "< 10" side contributes nothing and the other side's
    /// exact count is used alone; both sides "< 10" gives 0.
    pub fn combined(&self) -> u64 {
        match (self.pc, self.mobile) {
            (MonthlyCount::FewerThanTen, other) | (other, MonthlyCount::FewerThanTen) => {
                other.exact().unwrap_or(0)
            }
            (MonthlyCount::Exact(pc), MonthlyCount::Exact(mobile)) => pc.saturating_add(mobile),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SourceTag {
    SearchAd,
    TitleFrequency,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum SourceDetail {
    SearchAd {
        volume: SearchVolume,
        competition: String,
    },
    TitleFrequency {
        count: u32,
    },
}

impl SourceDetail {
    pub fn tag(&self) -> SourceTag {
        match self {
            SourceDetail::SearchAd { .. } => SourceTag::SearchAd,
            SourceDetail::TitleFrequency { .. } => SourceTag::TitleFrequency,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    pub text: String,
    pub sources: BTreeSet<SourceTag>,
    pub source_details: Vec<SourceDetail>,
    pub overlap_count: u32,
}

impl Keyword {
    pub fn from_detail(text: impl Into<String>, detail: SourceDetail) -> Self {
        let mut sources = BTreeSet::new();
        sources.insert(detail.tag());
        Self {
            text: text.into(),
            sources,
            source_details: vec![detail],
            overlap_count: 1,
        }
    }

    pub fn search_ad(text: impl Into<String>, volume: SearchVolume, competition: &str) -> Self {
        Self::from_detail(
            text,
            SourceDetail::SearchAd {
                volume,
                competition: competition.to_string(),
            },
        )
    }

    pub fn title_frequency(text: impl Into<String>, count: u32) -> Self {
        Self::from_detail(text, SourceDetail::TitleFrequency { count })
    }

    pub fn has_source(&self, tag: SourceTag) -> bool {
        self.sources.contains(&tag)
    }

    /// Appends another source's record. `overlap_count` only grows when the source is new.
    pub fn absorb(&mut self, detail: SourceDetail) {
        if self.sources.insert(detail.tag()) {
            self.overlap_count += 1;
        }
        self.source_details.push(detail);
    }

    /// Volume from the first paid-search record; keywords only seen in titles have none.
    pub fn search_volume(&self) -> Option<SearchVolume> {
        self.source_details.iter().find_map(|d| match d {
            SourceDetail::SearchAd { volume, .. } => Some(*volume),
            SourceDetail::TitleFrequency { .. } => None,
        })
    }

    pub fn combined_monthly_volume(&self) -> u64 {
        self.search_volume().map(|v| v.combined()).unwrap_or(0)
    }

    pub fn title_count(&self) -> Option<u32> {
        self.source_details.iter().find_map(|d| match d {
            SourceDetail::TitleFrequency { count } => Some(*count),
            SourceDetail::SearchAd { .. } => None,
        })
    }
}
