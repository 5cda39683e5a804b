//! Payload shapes of the keyword and listing services, and the parse boundary that turns
//! them into typed records. Nothing past this module looks at raw JSON.

use crate::error::{CoreError, CoreResult};
use crate::keywords::model::{MonthlyCount, SearchVolume};
use crate::sources::interface::{KeywordSuggestion, Listing, RelatedKeywordRecord};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct KeywordToolResponse {
    #[serde(rename = "keywordList")]
    keyword_list: Vec<KeywordToolEntry>,
}

#[derive(Debug, Deserialize)]
struct KeywordToolEntry {
    #[serde(rename = "relKeyword")]
    rel_keyword: String,
    #[serde(rename = "monthlyPcQcCnt", default)]
    monthly_pc_qc_cnt: MonthlyCount,
    #[serde(rename = "monthlyMobileQcCnt", default)]
    monthly_mobile_qc_cnt: MonthlyCount,
    #[serde(rename = "compIdx", default)]
    comp_idx: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShoppingSearchResponse {
    #[serde(default)]
    items: Vec<Listing>,
    #[serde(default)]
    error: Option<String>,
}

pub fn parse_keyword_tool(body: &str) -> CoreResult<Vec<KeywordSuggestion>> {
    let resp: KeywordToolResponse = serde_json::from_str(body).map_err(|e| {
        CoreError::UpstreamUnavailable(format!("unparsable keyword tool payload: {}", e))
    })?;
    Ok(resp
        .keyword_list
        .into_iter()
        .map(|e| KeywordSuggestion {
            text: e.rel_keyword,
            monthly_pc_qc_cnt: e.monthly_pc_qc_cnt,
            monthly_mobile_qc_cnt: e.monthly_mobile_qc_cnt,
            comp_idx: e.comp_idx.unwrap_or_default(),
        })
        .collect())
}

pub fn parse_shopping_search(body: &str) -> CoreResult<Vec<Listing>> {
    let resp: ShoppingSearchResponse = serde_json::from_str(body).map_err(|e| {
        CoreError::UpstreamUnavailable(format!("unparsable shopping search payload: {}", e))
    })?;
    if let Some(err) = resp.error {
        return Err(CoreError::UpstreamUnavailable(format!(
            "shopping search error: {}",
            err
        )));
    }
    Ok(resp.items)
}

/// Rows are positional arrays:
/// `[keyword, source, category, monthlyVolume, productCount, competitionRate, shoppingConversion]`.
/// A payload without a `data` array is an empty table, not an error.
pub fn parse_related_table(body: &str) -> CoreResult<Vec<RelatedKeywordRecord>> {
    let raw: Value = serde_json::from_str(body).map_err(|e| {
        CoreError::UpstreamUnavailable(format!("unparsable related keyword payload: {}", e))
    })?;
    let rows = match raw.get("data").and_then(|d| d.as_array()) {
        Some(rows) => rows,
        None => return Ok(Vec::new()),
    };
    Ok(rows.iter().filter_map(parse_related_row).collect())
}

fn parse_related_row(row: &Value) -> Option<RelatedKeywordRecord> {
    let cells = row.as_array()?;
    let keyword = cell_text(cells.first()?);
    if keyword.trim().is_empty() {
        return None;
    }
    Some(RelatedKeywordRecord {
        keyword,
        source: cells.get(1).map(cell_text).unwrap_or_default(),
        category: cells.get(2).map(cell_text).unwrap_or_default(),
        volume: SearchVolume::total(cells.get(3).map(cell_u64).unwrap_or(0)),
        product_count: cells.get(4).map(cell_u64).unwrap_or(0),
        competition_rate: cells.get(5).map(cell_f64).unwrap_or(0.0),
        shopping_conversion: cells.get(6).map(cell_f64).unwrap_or(0.0),
    })
}

fn cell_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn cell_u64(v: &Value) -> u64 {
    match v {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::String(s) => parse_grouped_u64(s),
        _ => 0,
    }
}

fn cell_f64(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_grouped_f64(s),
        _ => 0.0,
    }
}

/// "1,234" -> 1234; anything unparsable is 0.
pub fn parse_grouped_u64(s: &str) -> u64 {
    s.trim().replace(',', "").parse::<u64>().unwrap_or(0)
}

pub fn parse_grouped_f64(s: &str) -> f64 {
    s.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .unwrap_or(0.0)
}
