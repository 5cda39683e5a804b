use crate::config::EnrichmentSettings;
use crate::keywords::model::{Keyword, SourceDetail, SourceTag};
use crate::sources::interface::KeywordSuggestionSource;
use tracing::{debug, warn};

/// Looks up paid-search metrics for keywords that only came from listing titles. Terms are
/// sent in comma-joined batches; a suggestion is attached only when its text equals the
/// keyword exactly. Returns how many keywords gained a paid-search record.
pub async fn enrich_with_search_ad(
    keywords: &mut [Keyword],
    source: &dyn KeywordSuggestionSource,
    settings: EnrichmentSettings,
) -> usize {
    let pending: Vec<usize> = keywords
        .iter()
        .enumerate()
        .filter(|(_, k)| !k.has_source(SourceTag::SearchAd))
        .map(|(i, _)| i)
        .collect();
    if pending.is_empty() {
        return 0;
    }

    let batch_size = settings.batch_size.max(1);
    let batches: Vec<&[usize]> = pending.chunks(batch_size).collect();
    let mut enriched = 0;

    for (n, batch) in batches.iter().enumerate() {
        if n > 0 && settings.batch_delay_ms > 0 {
            tokio::time::sleep(settings.batch_delay()).await;
        }
        let hint = batch
            .iter()
            .map(|&i| keywords[i].text.as_str())
            .collect::<Vec<_>>()
            .join(",");

        let suggestions = match source.suggest(&hint).await {
            Ok(s) => s,
            Err(e) => {
                warn!(hint = %hint, error = %e, "enrichment batch failed, skipping");
                continue;
            }
        };

        for &i in batch.iter() {
            let keyword = &mut keywords[i];
            if let Some(found) = suggestions.iter().find(|s| s.text == keyword.text) {
                keyword.absorb(SourceDetail::SearchAd {
                    volume: found.volume(),
                    competition: found.comp_idx.clone(),
                });
                enriched += 1;
            } else {
                debug!(keyword = %keyword.text, "no paid-search match for title keyword");
            }
        }
    }
    enriched
}
