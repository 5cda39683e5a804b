use crate::error::CoreResult;
use crate::pipeline::batch::{BatchOutcome, ItemReport};
use std::path::Path;

pub const EXPORT_HEADER: [&str; 10] = [
    "index",
    "status",
    "original_product_name",
    "main_keyword",
    "category_path",
    "category_id",
    "generated_title",
    "utf8_bytes",
    "legacy_double_bytes",
    "failure",
];

fn status_label(item: &ItemReport) -> &'static str {
    if item.is_done() {
        "done"
    } else if item.is_failed() {
        "failed"
    } else {
        "pending"
    }
}

/// One row per item in index order. Failed items keep their name and failure message; the
/// result columns stay empty.
pub fn render_batch_csv(outcome: &BatchOutcome) -> CoreResult<String> {
    let mut items: Vec<&ItemReport> = outcome.items.iter().collect();
    items.sort_by_key(|i| i.index);

    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record(EXPORT_HEADER)?;
    for item in items {
        let failure = item
            .failure
            .as_ref()
            .map(|f| f.message.clone())
            .unwrap_or_default();
        let row = match &item.result {
            Some(r) => [
                item.index.to_string(),
                status_label(item).to_string(),
                r.original_product_name.clone(),
                r.main_keyword.clone(),
                r.category.path.join(" > "),
                r.category.category_id.clone().unwrap_or_default(),
                r.generated_title.clone(),
                r.title_length.utf8_bytes.to_string(),
                r.title_length.legacy_double_bytes.to_string(),
                failure,
            ],
            None => [
                item.index.to_string(),
                status_label(item).to_string(),
                item.input.product_name.clone(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                failure,
            ],
        };
        wtr.write_record(&row)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
}

pub fn write_batch_csv(outcome: &BatchOutcome, path: impl AsRef<Path>) -> CoreResult<()> {
    let rendered = render_batch_csv(outcome)?;
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path.as_ref(), rendered)?;
    Ok(())
}
