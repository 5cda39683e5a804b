use crate::error::CoreResult;
use crate::keywords::rank::{filter_by_volume_band, BandedKeywords, VolumeBand};
use crate::sources::interface::RelatedKeywordSource;
use tracing::info;

/// Standalone related-keyword discovery: fetch the keyword table for `keyword` and keep
/// the rows inside the volume band with a positive shopping conversion.
pub async fn lookup_related_keywords(
    source: &dyn RelatedKeywordSource,
    keyword: &str,
    band: VolumeBand,
) -> CoreResult<BandedKeywords> {
    let rows = source.related_rows(keyword).await?;
    let total = rows.len();
    let banded = filter_by_volume_band(rows, band);
    info!(
        keyword,
        total,
        kept = banded.related_keywords.len(),
        "related keyword lookup"
    );
    Ok(banded)
}
