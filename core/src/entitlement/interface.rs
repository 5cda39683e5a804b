use crate::error::CoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntitlementStatus {
    pub active: bool,
    pub remaining: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConsumeOutcome {
    Ok { remaining: u64 },
    InsufficientBalance,
}

/// Per-account generation units. Owned by the account backend; the pipeline only reads the
/// status and decrements one unit per item.
#[async_trait]
pub trait EntitlementLedger: Send + Sync {
    async fn status(&self, account_id: &str) -> CoreResult<EntitlementStatus>;

    async fn consume_unit(&self, account_id: &str) -> CoreResult<ConsumeOutcome>;
}
