use crate::category::table::CategoryTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResolution {
    /// Non-empty category segments, shallow to deep.
    pub path: Vec<String>,
    pub category_id: Option<String>,
    /// The segment that matched the table.
    pub matched_segment: Option<String>,
}

impl CategoryResolution {
    pub fn is_resolved(&self) -> bool {
        self.category_id.is_some()
    }
}

pub struct CategoryResolver {
    table: CategoryTable,
}

impl CategoryResolver {
    pub fn new(table: CategoryTable) -> Self {
        Self { table }
    }

    /// `segments` is positional: index 0 is category1, index 3 is category4. Only the
    /// deepest non-empty of segments 4, 3, 2 is looked up; a miss there is a miss, with no
    /// retry against shallower segments. Segment 1 is never looked up.
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> CategoryResolution {
        let path: Vec<String> = segments
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let candidate = [3usize, 2, 1]
            .into_iter()
            .filter_map(|i| segments.get(i))
            .map(|s| s.as_ref().trim())
            .find(|s| !s.is_empty());

        let matched = candidate.and_then(|name| self.table.lookup(name).map(|r| (r, name)));
        match matched {
            Some((record, name)) => CategoryResolution {
                path,
                category_id: Some(record.category_id.clone()),
                matched_segment: Some(name.to_string()),
            },
            None => CategoryResolution {
                path,
                category_id: None,
                matched_segment: None,
            },
        }
    }
}
