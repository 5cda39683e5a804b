use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ItemStage {
    Queued,
    SeedExtraction,
    KeywordGathering,
    FeatureAnalysis,
    Composition,
    Validation,
    Done,
    Failed,
}

impl ItemStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, ItemStage::Done | ItemStage::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageTransition {
    pub from: ItemStage,
    pub to: ItemStage,
    pub ts_utc: String,
    pub reason: String,
}

/// Stage and transition history of one item attempt.
#[derive(Debug, Clone)]
pub struct ItemTracker {
    index: usize,
    stage: ItemStage,
    history: Vec<StageTransition>,
}

impl ItemTracker {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            stage: ItemStage::Queued,
            history: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn stage(&self) -> ItemStage {
        self.stage
    }

    pub fn history(&self) -> &[StageTransition] {
        &self.history
    }

    pub fn into_parts(self) -> (ItemStage, Vec<StageTransition>) {
        (self.stage, self.history)
    }

    pub fn advance(&mut self, to: ItemStage, reason: &str) -> CoreResult<()> {
        if !valid_transition(self.stage, to) {
            return Err(CoreError::WorkflowTransition(format!(
                "item {}: invalid stage transition {:?} -> {:?}",
                self.index, self.stage, to
            )));
        }
        info!(item = self.index, from = ?self.stage, to = ?to, reason, "stage changed");
        self.record(to, reason);
        Ok(())
    }

    /// Moves to `Failed` and returns the stage the item was in. A terminal item stays put.
    pub fn fail(&mut self, reason: &str) -> ItemStage {
        let at = self.stage;
        if at.is_terminal() {
            return at;
        }
        warn!(item = self.index, stage = ?at, reason, "item failed");
        self.record(ItemStage::Failed, reason);
        at
    }

    fn record(&mut self, to: ItemStage, reason: &str) {
        self.history.push(StageTransition {
            from: self.stage,
            to,
            ts_utc: now_rfc3339_utc(),
            reason: reason.to_string(),
        });
        self.stage = to;
    }
}

pub(crate) fn valid_transition(from: ItemStage, to: ItemStage) -> bool {
    use ItemStage::*;
    match (from, to) {
        (Queued, SeedExtraction) => true,
        // operator-supplied main keyword skips extraction
        (Queued, KeywordGathering) => true,
        (SeedExtraction, KeywordGathering) => true,
        (KeywordGathering, FeatureAnalysis) => true,
        (FeatureAnalysis, Composition) => true,
        (Composition, Validation) => true,
        (Validation, Done) => true,
        (Done, _) | (Failed, _) => false,
        (_, Failed) => true,
        _ => false,
    }
}

pub(crate) fn now_rfc3339_utc() -> String {
    let now = time::OffsetDateTime::now_utc();
    now.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}
