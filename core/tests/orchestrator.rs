mod common;

use async_trait::async_trait;
use common::{listing, suggestion, FakeGenerator, FakeListings, FakeSuggestions};
use listing_core::byte_length::{legacy_double_byte_length, utf8_byte_length};
use listing_core::category::resolver::CategoryResolver;
use listing_core::category::table::CategoryTable;
use listing_core::config::PipelineSettings;
use listing_core::entitlement::interface::{ConsumeOutcome, EntitlementLedger, EntitlementStatus};
use listing_core::entitlement::memory::InMemoryLedger;
use listing_core::error::{CoreError, CoreResult, FailureKind};
use listing_core::keywords::model::{MonthlyCount, SourceTag};
use listing_core::pipeline::batch::ItemInput;
use listing_core::pipeline::orchestrator::{Capabilities, NameSynthesisOrchestrator};
use listing_core::pipeline::stage::ItemStage;
use std::sync::Arc;

const FAN_COVER: [&str; 4] = ["생활/건강", "계절가전", "선풍기액세서리", "선풍기커버"];
const IMAGE: &str = "https://shop.example/cover.jpg";

fn fan_listings() -> FakeListings {
    FakeListings::default()
        .with("선풍기 커버", vec![listing("선풍기 커버 대형", FAN_COVER)])
        .with(
            "선풍기커버",
            vec![
                listing("<b>대형</b> 선풍기커버 보관망", FAN_COVER),
                listing("선풍기커버 대형 먼지 보관망", FAN_COVER),
            ],
        )
}

fn fan_suggestions() -> FakeSuggestions {
    FakeSuggestions::default().with(
        "선풍기커버",
        vec![
            suggestion("선풍기덮개", MonthlyCount::FewerThanTen, MonthlyCount::Exact(300)),
            suggestion("선풍기커버", MonthlyCount::Exact(1000), MonthlyCount::Exact(5000)),
        ],
    )
}

fn fan_generator() -> FakeGenerator {
    let mut g = FakeGenerator::default().with_keyword("선풍기 커버", "선풍기커버");
    g.features = vec!["방수".to_string(), "원단".to_string(), "사각".to_string()];
    g
}

struct Harness {
    orchestrator: Arc<NameSynthesisOrchestrator>,
    generator: Arc<FakeGenerator>,
    ledger: Arc<InMemoryLedger>,
}

fn harness(listings: FakeListings, generator: FakeGenerator, units: u64) -> Harness {
    harness_with(listings, fan_suggestions(), generator, units, PipelineSettings::default())
}

fn harness_with(
    listings: FakeListings,
    suggestions: FakeSuggestions,
    generator: FakeGenerator,
    units: u64,
    settings: PipelineSettings,
) -> Harness {
    let generator = Arc::new(generator);
    let ledger = Arc::new(InMemoryLedger::with_account("acct", units));
    let caps = Capabilities {
        suggestions: Arc::new(suggestions),
        listings: Arc::new(listings),
        generator: generator.clone(),
        ledger: ledger.clone(),
    };
    let resolver = Arc::new(CategoryResolver::new(CategoryTable::bundled().unwrap()));
    Harness {
        orchestrator: Arc::new(NameSynthesisOrchestrator::new(resolver, caps, settings).unwrap()),
        generator,
        ledger,
    }
}

#[tokio::test]
async fn fan_cover_runs_end_to_end() {
    let h = harness(fan_listings(), fan_generator(), 5);
    let outcome = h
        .orchestrator
        .run_batch("acct", vec![ItemInput::new("선풍기 커버", IMAGE)])
        .await
        .unwrap();

    let item = outcome.item(0).unwrap();
    assert_eq!(item.stage, ItemStage::Done);
    assert!(item.failure.is_none());
    let stages: Vec<ItemStage> = item.history.iter().map(|t| t.to).collect();
    assert_eq!(
        stages,
        vec![
            ItemStage::SeedExtraction,
            ItemStage::KeywordGathering,
            ItemStage::FeatureAnalysis,
            ItemStage::Composition,
            ItemStage::Validation,
            ItemStage::Done,
        ]
    );

    let result = item.result.as_ref().unwrap();
    assert_eq!(result.main_keyword, "선풍기커버");
    assert_eq!(result.category.category_id.as_deref(), Some("50002540"));

    for term in ["대형", "보관망"] {
        let k = result
            .related_keywords
            .iter()
            .find(|k| k.text == term)
            .unwrap();
        assert!(k.has_source(SourceTag::TitleFrequency));
    }
    let related: Vec<&str> = result.related_keywords.iter().map(|k| k.text.as_str()).collect();
    assert_eq!(related, vec!["선풍기커버", "선풍기덮개", "대형", "보관망"]);
    let cover = &result.related_keywords[0];
    assert_eq!(cover.overlap_count, 2);
    assert_eq!(cover.combined_monthly_volume(), 6000);
    let title_kw: Vec<&str> = result.title_keywords.iter().map(|k| k.text.as_str()).collect();
    assert_eq!(title_kw, vec!["선풍기커버", "대형", "보관망"]);

    // The fake composes main keyword, title keywords, then two features.
    assert_eq!(result.generated_title, "선풍기커버 선풍기커버 대형 보관망 방수 원단");
    assert_eq!(result.title_length.utf8_bytes, utf8_byte_length(&result.generated_title));
    assert_eq!(
        result.title_length.legacy_double_bytes,
        legacy_double_byte_length(&result.generated_title)
    );
    assert!(!result.title_length.within_budget);
    assert_eq!(result.image_features.len(), 3);

    let requests = h.generator.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].constraints.budget.max_bytes, 80);
    assert_eq!(requests[0].constraints.max_image_features, 2);

    let status = h.ledger.status("acct").await.unwrap();
    assert_eq!(status.remaining, 4);
}

#[tokio::test]
async fn failing_item_does_not_stop_its_neighbours() {
    let listings = fan_listings().failing_on("고장난 상품");
    let generator = fan_generator().with_keyword("고장난 상품", "선풍기커버");
    let h = harness(listings, generator, 3);

    let outcome = h
        .orchestrator
        .run_batch(
            "acct",
            vec![
                ItemInput::new("선풍기 커버", IMAGE),
                ItemInput::new("고장난 상품", IMAGE),
                ItemInput::new("선풍기 커버", IMAGE),
            ],
        )
        .await
        .unwrap();

    assert_eq!(outcome.items.len(), 3);
    assert!(outcome.items.iter().enumerate().all(|(i, r)| r.index == i));
    assert_eq!(outcome.done_count(), 2);
    assert!(outcome.items[0].result.is_some());
    assert!(outcome.items[2].result.is_some());

    let failed = &outcome.items[1];
    assert_eq!(failed.stage, ItemStage::Failed);
    assert!(failed.result.is_none());
    let failure = failed.failure.as_ref().unwrap();
    assert_eq!(failure.kind, FailureKind::UpstreamUnavailable);
    assert_eq!(failure.stage, ItemStage::KeywordGathering);
    assert_eq!(h.ledger.status("acct").await.unwrap().remaining, 0);
}

#[tokio::test]
async fn listing_and_category_misses_are_item_fatal() {
    let listings = fan_listings()
        .with(
            "메쉬 의자",
            vec![listing("메쉬 의자", ["가구", "의자", "사무용의자", "메쉬의자"])],
        );
    let generator = fan_generator()
        .with_keyword("없는 상품", "없음")
        .with_keyword("메쉬 의자", "메쉬의자");
    let h = harness(listings, generator, 2);

    let outcome = h
        .orchestrator
        .run_batch(
            "acct",
            vec![ItemInput::new("없는 상품", IMAGE), ItemInput::new("메쉬 의자", IMAGE)],
        )
        .await
        .unwrap();
    let kinds: Vec<FailureKind> = outcome
        .items
        .iter()
        .map(|r| r.failure.as_ref().unwrap().kind)
        .collect();
    assert_eq!(
        kinds,
        vec![FailureKind::EmptyListingResult, FailureKind::NoCategoryMatch]
    );
    assert!(h.generator.requests().is_empty());
}

#[tokio::test]
async fn generation_failures_record_their_stage() {
    let mut generator = fan_generator();
    generator.fail_synthesis_for.insert("선풍기 커버".to_string());
    let h = harness(fan_listings(), generator, 2);
    let outcome = h
        .orchestrator
        .run_batch(
            "acct",
            vec![
                ItemInput::new("선풍기 커버", IMAGE),
                ItemInput::new("모르는 상품", IMAGE),
            ],
        )
        .await
        .unwrap();

    let synth = outcome.items[0].failure.as_ref().unwrap();
    assert_eq!(synth.kind, FailureKind::MalformedGenerationOutput);
    assert_eq!(synth.stage, ItemStage::Composition);

    let seed = outcome.items[1].failure.as_ref().unwrap();
    assert_eq!(seed.kind, FailureKind::UpstreamUnavailable);
    assert_eq!(seed.stage, ItemStage::SeedExtraction);
}

#[tokio::test]
async fn admission_rejects_whole_batch() {
    let h = harness(fan_listings(), fan_generator(), 1);

    let missing_image = h
        .orchestrator
        .run_batch("acct", vec![ItemInput::new("선풍기 커버", " ")])
        .await;
    assert!(matches!(missing_image, Err(CoreError::InvalidInput(_))));

    let too_many = h
        .orchestrator
        .run_batch(
            "acct",
            vec![
                ItemInput::new("선풍기 커버", IMAGE),
                ItemInput::new("선풍기 커버", IMAGE),
            ],
        )
        .await;
    assert!(matches!(too_many, Err(CoreError::InsufficientBalance(_))));
    assert_eq!(h.ledger.status("acct").await.unwrap().remaining, 1);

    h.ledger.deactivate("acct").await;
    let inactive = h
        .orchestrator
        .run_batch("acct", vec![ItemInput::new("선풍기 커버", IMAGE)])
        .await;
    assert!(matches!(inactive, Err(CoreError::InactiveSubscription(_))));

    let empty = h.orchestrator.run_batch("acct", Vec::new()).await;
    assert!(matches!(empty, Err(CoreError::InvalidInput(_))));
    assert!(h.generator.requests().is_empty());
}

/// Reports plenty of units but refuses every consumption.
struct DrainedLedger;

#[async_trait]
impl EntitlementLedger for DrainedLedger {
    async fn status(&self, _account_id: &str) -> CoreResult<EntitlementStatus> {
        Ok(EntitlementStatus {
            active: true,
            remaining: 10,
        })
    }

    async fn consume_unit(&self, _account_id: &str) -> CoreResult<ConsumeOutcome> {
        Ok(ConsumeOutcome::InsufficientBalance)
    }
}

#[tokio::test]
async fn refused_unit_skips_the_pipeline() {
    let generator = Arc::new(fan_generator());
    let caps = Capabilities {
        suggestions: Arc::new(fan_suggestions()),
        listings: Arc::new(fan_listings()),
        generator: generator.clone(),
        ledger: Arc::new(DrainedLedger),
    };
    let resolver = Arc::new(CategoryResolver::new(CategoryTable::bundled().unwrap()));
    let orchestrator =
        Arc::new(NameSynthesisOrchestrator::new(resolver, caps, PipelineSettings::default()).unwrap());

    let outcome = orchestrator
        .run_batch("acct", vec![ItemInput::new("선풍기 커버", IMAGE)])
        .await
        .unwrap();
    let item = &outcome.items[0];
    assert_eq!(item.stage, ItemStage::Failed);
    let failure = item.failure.as_ref().unwrap();
    assert_eq!(failure.kind, FailureKind::InsufficientBalance);
    assert_eq!(failure.stage, ItemStage::Queued);
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn regeneration_replaces_only_its_slot() {
    let listings = fan_listings().with(
        "선풍기덮개",
        vec![
            listing("선풍기덮개 원형 보관", FAN_COVER),
            listing("원형 선풍기덮개", FAN_COVER),
        ],
    );
    let h = harness(listings, fan_generator(), 2);
    let mut outcome = h
        .orchestrator
        .run_batch(
            "acct",
            vec![
                ItemInput::new("선풍기 커버", IMAGE),
                ItemInput::new("선풍기 커버", "https://shop.example/other.jpg"),
            ],
        )
        .await
        .unwrap();
    let untouched = outcome.items[1].clone();
    let batch_id = outcome.batch_id.clone();

    let report = h
        .orchestrator
        .regenerate(&mut outcome, 0, "선풍기덮개")
        .await
        .unwrap();
    assert_eq!(report.stage, ItemStage::Done);
    assert_eq!(report.history[0].from, ItemStage::Queued);
    assert_eq!(report.history[0].to, ItemStage::KeywordGathering);
    let result = report.result.as_ref().unwrap();
    assert_eq!(result.main_keyword, "선풍기덮개");
    assert_eq!(result.original_product_name, "선풍기 커버");
    assert_eq!(result.image_url, IMAGE);
    assert!(result.title_keywords.iter().any(|k| k.text == "원형"));

    assert_eq!(outcome.items[1], untouched);
    assert_eq!(outcome.batch_id, batch_id);
    // regeneration is free
    assert_eq!(h.ledger.status("acct").await.unwrap().remaining, 0);

    assert!(h.orchestrator.regenerate(&mut outcome, 9, "x").await.is_err());
    assert_eq!(outcome.items[0], report);
}

#[tokio::test]
async fn failed_regeneration_keeps_the_previous_result() {
    let listings = fan_listings().with(
        "선풍기덮개",
        vec![
            listing("선풍기덮개 원형 보관", FAN_COVER),
            listing("원형 선풍기덮개", FAN_COVER),
        ],
    );
    let mut generator = fan_generator();
    generator.fail_synthesis_for.insert("선풍기덮개".to_string());
    let h = harness(listings, generator, 1);
    let mut outcome = h
        .orchestrator
        .run_batch("acct", vec![ItemInput::new("선풍기 커버", IMAGE)])
        .await
        .unwrap();
    let before = outcome.items[0].clone();
    assert!(before.is_done());

    let attempt = h
        .orchestrator
        .regenerate(&mut outcome, 0, "선풍기덮개")
        .await
        .unwrap();
    assert_eq!(attempt.stage, ItemStage::Failed);
    assert_eq!(
        attempt.failure.as_ref().unwrap().kind,
        FailureKind::MalformedGenerationOutput
    );
    assert_eq!(outcome.items[0], before);
    assert_eq!(
        outcome.items[0].result.as_ref().unwrap().main_keyword,
        "선풍기커버"
    );
}

#[tokio::test]
async fn blank_regeneration_keyword_reuses_the_current_one() {
    let h = harness(fan_listings(), fan_generator(), 1);
    let mut outcome = h
        .orchestrator
        .run_batch("acct", vec![ItemInput::new("선풍기 커버", IMAGE)])
        .await
        .unwrap();

    let report = h
        .orchestrator
        .regenerate(&mut outcome, 0, "  ")
        .await
        .unwrap();
    assert!(report.is_done());
    assert_eq!(report.result.as_ref().unwrap().main_keyword, "선풍기커버");
    let last = h.generator.requests().pop().unwrap();
    assert_eq!(last.main_keyword, "선풍기커버");
}

#[tokio::test]
async fn blank_regeneration_keyword_without_result_is_rejected() {
    let mut generator = fan_generator();
    generator.fail_synthesis_for.insert("선풍기 커버".to_string());
    let h = harness(fan_listings(), generator, 1);
    let mut outcome = h
        .orchestrator
        .run_batch("acct", vec![ItemInput::new("선풍기 커버", IMAGE)])
        .await
        .unwrap();
    let failed = outcome.items[0].clone();
    assert!(failed.is_failed());
    let calls = h.generator.requests().len();

    let err = h
        .orchestrator
        .regenerate(&mut outcome, 0, "")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::InvalidInput);
    assert_eq!(outcome.items[0], failed);
    assert_eq!(h.generator.requests().len(), calls);
}

#[tokio::test]
async fn operator_edits_touch_only_their_field() {
    let h = harness(fan_listings(), fan_generator(), 1);
    let mut outcome = h
        .orchestrator
        .run_batch("acct", vec![ItemInput::new("선풍기 커버", IMAGE)])
        .await
        .unwrap();
    let before = outcome.items[0].result.clone().unwrap();

    outcome.edit_main_keyword(0, "선풍기보관망").unwrap();
    let after = outcome.items[0].result.clone().unwrap();
    assert_eq!(after.main_keyword, "선풍기보관망");
    assert_eq!(after.generated_title, before.generated_title);
    assert_eq!(after.related_keywords, before.related_keywords);

    let title = "선풍기커버 대형 보관망 방수 원단 사각 선풍기덮개 먼지방지 거실 사무실용";
    let len = outcome.edit_title(0, title).unwrap();
    assert_eq!(len.utf8_bytes, utf8_byte_length(title));
    assert_eq!(len.legacy_double_bytes, legacy_double_byte_length(title));
    assert_eq!(outcome.items[0].result.as_ref().unwrap().title_length, len);

    let inserted = outcome.insert_into_title(0, 0, 0, "국산 ").unwrap();
    assert!(inserted.title.starts_with("국산 선풍기커버"));
    assert_eq!(inserted.cursor, 3);
    assert_eq!(
        outcome.items[0].result.as_ref().unwrap().title_length.utf8_bytes,
        utf8_byte_length(&inserted.title)
    );

    assert!(outcome.edit_title(5, "x").is_err());
}

#[tokio::test]
async fn enrichment_adds_search_ad_metrics_when_enabled() {
    let mut settings = PipelineSettings::default();
    settings.enrichment.enabled = true;
    settings.enrichment.batch_delay_ms = 0;
    let suggestions = fan_suggestions().with(
        "대형,보관망",
        vec![suggestion("보관망", MonthlyCount::Exact(20), MonthlyCount::Exact(30))],
    );
    let h = harness_with(fan_listings(), suggestions, fan_generator(), 1, settings);
    let outcome = h
        .orchestrator
        .run_batch("acct", vec![ItemInput::new("선풍기 커버", IMAGE)])
        .await
        .unwrap();
    let result = outcome.items[0].result.as_ref().unwrap();
    let related: Vec<&str> = result.related_keywords.iter().map(|k| k.text.as_str()).collect();
    assert_eq!(related, vec!["선풍기커버", "선풍기덮개", "보관망", "대형"]);
    let storage = &result.related_keywords[2];
    assert!(storage.has_source(SourceTag::SearchAd));
    assert_eq!(storage.combined_monthly_volume(), 50);
}
