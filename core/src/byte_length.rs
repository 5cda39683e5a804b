use serde::{Deserialize, Serialize};

/// Number of bytes in the UTF-8 encoding of `s`.
pub fn utf8_byte_length(s: &str) -> usize {
    s.len()
}

/// Spreadsheet-style byte length: every UTF-16 code unit up to 0x7F counts 1, any other
/// code unit counts 2. Supplementary-plane characters are two code units, so they count 4.
pub fn legacy_double_byte_length(s: &str) -> usize {
    s.encode_utf16()
        .map(|unit| if unit <= 0x7F { 1 } else { 2 })
        .sum()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TitleBudget {
    pub min_bytes: usize,
    pub max_bytes: usize,
}

impl Default for TitleBudget {
    fn default() -> Self {
        Self {
            min_bytes: 70,
            max_bytes: 80,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TitleLength {
    pub utf8_bytes: usize,
    pub legacy_double_bytes: usize,
    pub within_budget: bool,
}

impl TitleLength {
    pub fn measure(title: &str, budget: TitleBudget) -> Self {
        let utf8_bytes = utf8_byte_length(title);
        Self {
            utf8_bytes,
            legacy_double_bytes: legacy_double_byte_length(title),
            within_budget: utf8_bytes >= budget.min_bytes && utf8_bytes <= budget.max_bytes,
        }
    }
}
