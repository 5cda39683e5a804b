use crate::byte_length::TitleLength;
use crate::category::resolver::CategoryResolver;
use crate::config::PipelineSettings;
use crate::entitlement::interface::{ConsumeOutcome, EntitlementLedger};
use crate::error::{CoreError, CoreResult, FailureKind};
use crate::generation::interface::{GenerationRequest, TextGenerator};
use crate::keywords::aggregate::{aggregate, title_keyword_subset};
use crate::keywords::collector::KeywordCollector;
use crate::keywords::enrich::enrich_with_search_ad;
use crate::keywords::frequency::TitleFrequencyExtractor;
use crate::keywords::rank::sorted_by_volume_desc;
use crate::pipeline::batch::{BatchOutcome, GenerationResult, ItemFailure, ItemInput, ItemReport};
use crate::pipeline::stage::{ItemStage, ItemTracker};
use crate::sources::interface::{KeywordSuggestionSource, ListingSearchSource};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

/// External capabilities the orchestrator is wired to.
#[derive(Clone)]
pub struct Capabilities {
    pub suggestions: Arc<dyn KeywordSuggestionSource>,
    pub listings: Arc<dyn ListingSearchSource>,
    pub generator: Arc<dyn TextGenerator>,
    pub ledger: Arc<dyn EntitlementLedger>,
}

pub struct NameSynthesisOrchestrator {
    resolver: Arc<CategoryResolver>,
    collector: KeywordCollector,
    caps: Capabilities,
    settings: PipelineSettings,
}

impl NameSynthesisOrchestrator {
    pub fn new(
        resolver: Arc<CategoryResolver>,
        caps: Capabilities,
        settings: PipelineSettings,
    ) -> CoreResult<Self> {
        let extractor = TitleFrequencyExtractor::new(settings.frequency_band)?;
        let collector = KeywordCollector::new(
            caps.suggestions.clone(),
            caps.listings.clone(),
            extractor,
            settings.collector_settings(),
        );
        Ok(Self {
            resolver,
            collector,
            caps,
            settings,
        })
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs one item through every stage. Never returns an error: a failure lands in the
    /// report with the stage it happened in.
    pub async fn run_item(
        &self,
        index: usize,
        input: &ItemInput,
        main_keyword_override: Option<&str>,
    ) -> ItemReport {
        let mut tracker = ItemTracker::new(index);
        let outcome = self
            .execute(&mut tracker, input, main_keyword_override)
            .await;
        let (result, failure) = match outcome {
            Ok(result) => (Some(result), None),
            Err(e) => {
                let stage = tracker.fail(&e.to_string());
                (
                    None,
                    Some(ItemFailure {
                        kind: e.kind(),
                        stage,
                        message: e.to_string(),
                    }),
                )
            }
        };
        let (stage, history) = tracker.into_parts();
        ItemReport {
            index,
            input: input.clone(),
            stage,
            history,
            result,
            failure,
        }
    }

    async fn execute(
        &self,
        tracker: &mut ItemTracker,
        input: &ItemInput,
        main_keyword_override: Option<&str>,
    ) -> CoreResult<GenerationResult> {
        let main_keyword = match main_keyword_override {
            Some(kw) => {
                let kw = kw.trim();
                if kw.is_empty() {
                    return Err(CoreError::InvalidInput(
                        "override main keyword cannot be empty".to_string(),
                    ));
                }
                tracker.advance(ItemStage::KeywordGathering, "main keyword supplied")?;
                kw.to_string()
            }
            None => {
                tracker.advance(ItemStage::SeedExtraction, "started")?;
                let kw = self
                    .caps
                    .generator
                    .extract_keyword(&input.product_name, &input.image_url)
                    .await?;
                tracker.advance(ItemStage::KeywordGathering, "main keyword extracted")?;
                kw
            }
        };

        // Category comes from the first listing for the seed product name.
        let listings = self
            .caps
            .listings
            .search(&self.settings.collector_settings().listing_query(&input.product_name))
            .await?;
        let first = listings.first().ok_or_else(|| {
            CoreError::EmptyListingResult(format!("no listings for {:?}", input.product_name))
        })?;
        let category = self.resolver.resolve(first.category_segments().as_slice());
        if !category.is_resolved() {
            return Err(CoreError::NoCategoryMatch(format!(
                "category path {:?} not in table",
                category.path.join(" > ")
            )));
        }

        let collected = self.collector.collect_for_seed(&main_keyword).await;
        let mut merged = aggregate(collected.search_ad_keywords, collected.title_keywords);
        if self.settings.enrichment.enabled {
            let enriched = enrich_with_search_ad(
                &mut merged,
                self.caps.suggestions.as_ref(),
                self.settings.enrichment,
            )
            .await;
            info!(item = tracker.index(), enriched, "title keywords enriched");
        }
        let title_keywords = title_keyword_subset(&merged);
        let related_keywords = sorted_by_volume_desc(merged);
        info!(
            item = tracker.index(),
            main_keyword = %main_keyword,
            related = related_keywords.len(),
            title = title_keywords.len(),
            category_id = ?category.category_id,
            "keywords gathered"
        );

        tracker.advance(ItemStage::FeatureAnalysis, "keywords gathered")?;
        let analysis = self
            .caps
            .generator
            .analyze_image_features(&input.image_url)
            .await?;

        tracker.advance(ItemStage::Composition, "image analyzed")?;
        let request = GenerationRequest {
            seed_product_name: input.product_name.clone(),
            image_url: input.image_url.clone(),
            main_keyword: main_keyword.clone(),
            related_keywords,
            category,
            image_features: analysis.features,
            title_keywords,
            constraints: self.settings.title_constraints(),
        };
        let generated_title = self.caps.generator.synthesize_title(&request).await?;

        tracker.advance(ItemStage::Validation, "title synthesized")?;
        let title_length = TitleLength::measure(&generated_title, self.settings.title_budget);
        if !title_length.within_budget {
            warn!(
                item = tracker.index(),
                utf8_bytes = title_length.utf8_bytes,
                "title outside byte budget, left for operator edit"
            );
        }
        tracker.advance(ItemStage::Done, "validated")?;

        Ok(GenerationResult {
            original_product_name: request.seed_product_name,
            image_url: request.image_url,
            main_keyword,
            category: request.category,
            generated_title,
            related_keywords: request.related_keywords,
            title_keywords: request.title_keywords,
            image_features: request.image_features,
            image_category: analysis.category,
            title_length,
        })
    }

    async fn admit(&self, account_id: &str, items: &[ItemInput]) -> CoreResult<()> {
        if items.is_empty() {
            return Err(CoreError::InvalidInput("batch has no items".to_string()));
        }
        for (i, item) in items.iter().enumerate() {
            if item.product_name.trim().is_empty() || item.image_url.trim().is_empty() {
                return Err(CoreError::InvalidInput(format!(
                    "item {} needs both a product name and an image url",
                    i
                )));
            }
        }
        let status = self.caps.ledger.status(account_id).await?;
        if !status.active {
            return Err(CoreError::InactiveSubscription(format!(
                "account {} has no active subscription",
                account_id
            )));
        }
        if status.remaining < items.len() as u64 {
            return Err(CoreError::InsufficientBalance(format!(
                "{} items requested, {} units remaining",
                items.len(),
                status.remaining
            )));
        }
        Ok(())
    }

    /// Admits the batch, then runs every item as its own task. Each task consumes one unit
    /// before its pipeline starts and writes only its own slot.
    pub async fn run_batch(
        self: &Arc<Self>,
        account_id: &str,
        items: Vec<ItemInput>,
    ) -> CoreResult<BatchOutcome> {
        self.admit(account_id, &items).await?;
        let batch_id = ulid::Ulid::new().to_string();
        info!(batch_id = %batch_id, account_id, items = items.len(), "batch started");

        let handles: Vec<_> = items
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, input)| {
                let this = Arc::clone(self);
                let account = account_id.to_string();
                tokio::spawn(async move { this.consume_and_run(&account, index, input).await })
            })
            .collect();

        let mut slots: Vec<Option<ItemReport>> = (0..items.len()).map(|_| None).collect();
        for (index, joined) in join_all(handles).await.into_iter().enumerate() {
            let report = match joined {
                Ok(report) => report,
                Err(e) => {
                    error!(item = index, error = %e, "item task aborted");
                    aborted_report(index, &items[index], &e.to_string())
                }
            };
            let slot = report.index;
            slots[slot] = Some(report);
        }

        let reports: Vec<ItemReport> = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| aborted_report(index, &items[index], "item never settled"))
            })
            .collect();
        let outcome = BatchOutcome {
            batch_id,
            account_id: account_id.to_string(),
            budget: self.settings.title_budget,
            items: reports,
        };
        info!(
            batch_id = %outcome.batch_id,
            done = outcome.done_count(),
            failed = outcome.failed_count(),
            "batch settled"
        );
        Ok(outcome)
    }

    async fn consume_and_run(&self, account_id: &str, index: usize, input: ItemInput) -> ItemReport {
        let consumed = match self.caps.ledger.consume_unit(account_id).await {
            Ok(ConsumeOutcome::Ok { remaining }) => {
                info!(item = index, remaining, "unit consumed");
                Ok(())
            }
            Ok(ConsumeOutcome::InsufficientBalance) => Err(CoreError::InsufficientBalance(
                format!("no unit left for item {}", index),
            )),
            Err(e) => Err(e),
        };
        match consumed {
            Ok(()) => self.run_item(index, &input, None).await,
            Err(e) => {
                let mut tracker = ItemTracker::new(index);
                let stage = tracker.fail(&e.to_string());
                let (final_stage, history) = tracker.into_parts();
                ItemReport {
                    index,
                    input,
                    stage: final_stage,
                    history,
                    result: None,
                    failure: Some(ItemFailure {
                        kind: e.kind(),
                        stage,
                        message: e.to_string(),
                    }),
                }
            }
        }
    }

    /// Re-runs one item from keyword gathering with an operator-chosen main keyword. No unit
    /// is consumed. A blank keyword falls back to the item's current main keyword.
    ///
    /// Returns the report of this attempt. The slot is replaced only when the attempt
    /// reaches `Done`, or when the slot held no result to begin with; a failed attempt never
    /// discards an earlier result.
    pub async fn regenerate(
        &self,
        outcome: &mut BatchOutcome,
        index: usize,
        main_keyword: &str,
    ) -> CoreResult<ItemReport> {
        let current = outcome
            .items
            .get(index)
            .ok_or_else(|| CoreError::InvalidInput(format!("no item at index {}", index)))?;
        let keyword = match main_keyword.trim() {
            "" => current
                .result
                .as_ref()
                .map(|r| r.main_keyword.clone())
                .ok_or_else(|| {
                    CoreError::InvalidInput(format!(
                        "item {} has no main keyword to regenerate with",
                        index
                    ))
                })?,
            kw => kw.to_string(),
        };
        let input = current.input.clone();
        let had_result = current.result.is_some();

        info!(batch_id = %outcome.batch_id, item = index, main_keyword = %keyword, "regenerating item");
        let report = self.run_item(index, &input, Some(&keyword)).await;
        if report.is_done() || !had_result {
            outcome.items[index] = report.clone();
        } else {
            warn!(item = index, "regeneration failed, keeping previous result");
        }
        Ok(report)
    }
}

fn aborted_report(index: usize, input: &ItemInput, message: &str) -> ItemReport {
    let mut tracker = ItemTracker::new(index);
    let stage = tracker.fail(message);
    let (final_stage, history) = tracker.into_parts();
    ItemReport {
        index,
        input: input.clone(),
        stage: final_stage,
        history,
        result: None,
        failure: Some(ItemFailure {
            kind: FailureKind::Internal,
            stage,
            message: message.to_string(),
        }),
    }
}
