use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordInsertion {
    pub title: String,
    /// Character offset just past the inserted keyword.
    pub cursor: usize,
}

/// Replaces the characters in `[char_start, char_end)` with `keyword`. An empty selection
/// inserts at the cursor. Offsets count chars, not bytes.
pub fn insert_keyword(
    title: &str,
    char_start: usize,
    char_end: usize,
    keyword: &str,
) -> CoreResult<KeywordInsertion> {
    let char_count = title.chars().count();
    if char_start > char_end || char_end > char_count {
        return Err(CoreError::InvalidInput(format!(
            "selection {}..{} outside title of {} chars",
            char_start, char_end, char_count
        )));
    }
    let byte_at = |pos: usize| {
        title
            .char_indices()
            .nth(pos)
            .map(|(i, _)| i)
            .unwrap_or(title.len())
    };
    let (start, end) = (byte_at(char_start), byte_at(char_end));

    let mut out = String::with_capacity(title.len() - (end - start) + keyword.len());
    out.push_str(&title[..start]);
    out.push_str(keyword);
    out.push_str(&title[end..]);
    Ok(KeywordInsertion {
        title: out,
        cursor: char_start + keyword.chars().count(),
    })
}
