use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryRecord {
    pub category_id: String,
    pub sub_category: String,
    pub detail_category: String,
    #[serde(default)]
    pub specific_category: String,
}

/// Static marketplace taxonomy. Read-only after construction, so one instance can be
/// shared across concurrent items without locking.
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    records: Vec<CategoryRecord>,
    // name -> index of the first record carrying it in any of the three name fields
    index: HashMap<String, usize>,
}

impl CategoryTable {
    pub fn from_records(records: Vec<CategoryRecord>) -> Self {
        let mut index = HashMap::new();
        for (idx, r) in records.iter().enumerate() {
            for name in [&r.specific_category, &r.detail_category, &r.sub_category] {
                if !name.is_empty() {
                    index.entry(name.clone()).or_insert(idx);
                }
            }
        }
        Self { records, index }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> CoreResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();
        for row in rdr.deserialize() {
            let record: CategoryRecord = row?;
            if record.category_id.is_empty() {
                return Err(CoreError::InvalidInput(
                    "category table row without category_id".to_string(),
                ));
            }
            records.push(record);
        }
        Ok(Self::from_records(records))
    }

    pub fn from_path(path: impl AsRef<Path>) -> CoreResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    /// The taxonomy snapshot shipped with the crate.
    pub fn bundled() -> CoreResult<Self> {
        Self::from_csv_reader(include_str!("category_table.csv").as_bytes())
    }

    /// Exact string equality against sub, detail and specific names.
    pub fn lookup(&self, name: &str) -> Option<&CategoryRecord> {
        self.index.get(name).map(|&idx| &self.records[idx])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
