use crate::core::store::{ContactStore, UsageLedger};
use crate::core::strategy::InvocationStrategy;
use crate::domain::model::{ContactRecord, Extraction};
use crate::utils::error::Result;
use serde::Serialize;

/// Statistics shown next to the contact list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub contacts: usize,
    pub tokens_used: u64,
}

/// Everything a user works on between opening the scanner and leaving it.
///
/// Every mutating call takes `&mut self`, so actions run one at a time. Share a
/// session across tasks only behind a single mutex.
pub struct Session {
    strategy: InvocationStrategy,
    store: ContactStore,
    ledger: UsageLedger,
}

impl Session {
    pub fn new(strategy: InvocationStrategy) -> Self {
        Self {
            strategy,
            store: ContactStore::new(),
            ledger: UsageLedger::default(),
        }
    }

    /// Scans one image and appends its contacts. On any error the store and the
    /// ledger are left exactly as they were.
    pub async fn extract(&mut self, image: &[u8], mime_type: &str) -> Result<Extraction> {
        let extraction = self.strategy.extract(image, mime_type).await?;
        self.store.append(extraction.records.iter().cloned());
        self.ledger.record(extraction.tokens_used);
        tracing::debug!(
            "Store now holds {} contact(s), {} tokens used",
            self.store.len(),
            self.ledger.total()
        );
        Ok(extraction)
    }

    pub fn records(&self) -> &[ContactRecord] {
        self.store.records()
    }

    pub fn replace_all(&mut self, records: Vec<ContactRecord>) {
        tracing::debug!("Replacing {} contact(s) with {}", self.store.len(), records.len());
        self.store.replace_all(records);
    }

    pub fn remove_at(&mut self, index: usize) -> Result<ContactRecord> {
        self.store.remove_at(index)
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn tokens_used(&self) -> u64 {
        self.ledger.total()
    }

    pub fn reset_usage(&mut self) {
        self.ledger.reset();
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            contacts: self.store.len(),
            tokens_used: self.ledger.total(),
        }
    }
}
