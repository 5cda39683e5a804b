use crate::error::{CoreError, CoreResult};
use crate::generation::interface::ImageAnalysis;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::warn;

static JSON_OBJECT: OnceLock<Option<Regex>> = OnceLock::new();

pub fn parse_extracted_keyword(raw: &str) -> CoreResult<String> {
    let keyword = raw.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
    if keyword.is_empty() {
        return Err(CoreError::MalformedGenerationOutput(
            "keyword extraction returned no text".to_string(),
        ));
    }
    Ok(keyword.to_string())
}

#[derive(Debug, Deserialize)]
struct RawImageAnalysis {
    #[serde(default)]
    category: String,
    #[serde(default)]
    features: Vec<String>,
}

/// Pulls the first `{...}` object out of free text. Output without a readable object
/// yields an empty analysis rather than an error.
pub fn parse_image_analysis(raw: &str) -> ImageAnalysis {
    let parsed = JSON_OBJECT
        .get_or_init(|| Regex::new(r"(?s)\{.*\}").ok())
        .as_ref()
        .and_then(|object| object.find(raw))
        .and_then(|m| match serde_json::from_str::<RawImageAnalysis>(m.as_str()) {
            Ok(a) => Some(a),
            Err(e) => {
                warn!(error = %e, "image analysis output is not valid JSON");
                None
            }
        });
    match parsed {
        Some(a) => ImageAnalysis {
            category: a.category.trim().to_string(),
            features: a
                .features
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
        },
        None => ImageAnalysis::default(),
    }
}

#[derive(Debug, Deserialize)]
struct RawTitleList {
    #[serde(rename = "productNames", default)]
    product_names: Vec<String>,
}

/// Candidate titles, one per non-empty line, or the `productNames` array when the output
/// is a JSON object.
pub fn parse_title_candidates(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        if let Ok(list) = serde_json::from_str::<RawTitleList>(trimmed) {
            return list
                .product_names
                .into_iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect();
        }
    }
    trimmed
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_generated_title(raw: &str) -> CoreResult<String> {
    parse_title_candidates(raw)
        .into_iter()
        .next()
        .ok_or_else(|| {
            CoreError::MalformedGenerationOutput("title synthesis returned no title".to_string())
        })
}
