use crate::domain::model::ContactRecord;
use crate::utils::error::{Result, ScanError};

/// Session-scoped, index-addressed list of contacts.
#[derive(Debug, Clone, Default)]
pub struct ContactStore {
    records: Vec<ContactRecord>,
}

impl ContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, records: impl IntoIterator<Item = ContactRecord>) {
        self.records.extend(records);
    }

    pub fn replace_all(&mut self, records: Vec<ContactRecord>) {
        self.records = records;
    }

    pub fn remove_at(&mut self, index: usize) -> Result<ContactRecord> {
        if index >= self.records.len() {
            return Err(ScanError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[ContactRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Running total of tokens consumed by successful extractions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageLedger {
    total: u64,
}

impl UsageLedger {
    pub fn record(&mut self, tokens: u64) {
        self.total = self.total.saturating_add(tokens);
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn reset(&mut self) {
        self.total = 0;
    }
}
