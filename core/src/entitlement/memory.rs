use crate::entitlement::interface::{ConsumeOutcome, EntitlementLedger, EntitlementStatus};
use crate::error::CoreResult;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Process-local ledger for the runner binary and tests. Unknown accounts are inactive with
/// nothing remaining.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: Mutex<HashMap<String, EntitlementStatus>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(account_id: &str, remaining: u64) -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(
            account_id.to_string(),
            EntitlementStatus {
                active: true,
                remaining,
            },
        );
        Self {
            accounts: Mutex::new(accounts),
        }
    }

    pub async fn deactivate(&self, account_id: &str) {
        if let Some(entry) = self.accounts.lock().await.get_mut(account_id) {
            entry.active = false;
        }
    }
}

#[async_trait]
impl EntitlementLedger for InMemoryLedger {
    async fn status(&self, account_id: &str) -> CoreResult<EntitlementStatus> {
        Ok(self
            .accounts
            .lock()
            .await
            .get(account_id)
            .copied()
            .unwrap_or(EntitlementStatus {
                active: false,
                remaining: 0,
            }))
    }

    async fn consume_unit(&self, account_id: &str) -> CoreResult<ConsumeOutcome> {
        let mut accounts = self.accounts.lock().await;
        match accounts.get_mut(account_id) {
            Some(entry) if entry.active && entry.remaining > 0 => {
                entry.remaining -= 1;
                Ok(ConsumeOutcome::Ok {
                    remaining: entry.remaining,
                })
            }
            _ => Ok(ConsumeOutcome::InsufficientBalance),
        }
    }
}
