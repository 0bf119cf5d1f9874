//! Bounded summary history
//!
//! The whole log lives under one key as a JSON array, newest first. Every
//! save prepends and truncates to capacity, so the oldest record is the one
//! evicted. Persistence problems never escape: corrupt state reads as an
//! empty history, and failed reads or writes are reported as `None`/`false`
//! without touching what is stored.

use std::sync::atomic::{AtomicI64, Ordering};

use super::record::{NewSummary, SummaryRecord};
use super::storage::KeyValueStore;
use crate::config::HistoryConfig;
use crate::error::StorageResult;
use crate::utils::{system_clock, time, Clock};

/// Newest-first, capacity-bounded log of saved summaries
pub struct HistoryStore<S: KeyValueStore> {
    storage: S,
    key: String,
    capacity: usize,
    clock: Clock,
    last_id: AtomicI64,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(storage: S, config: &HistoryConfig) -> Self {
        Self::with_clock(storage, config, system_clock())
    }

    pub fn with_clock(storage: S, config: &HistoryConfig, clock: Clock) -> Self {
        Self {
            storage,
            key: config.storage_key.clone(),
            capacity: config.capacity.max(1),
            clock,
            last_id: AtomicI64::new(0),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Strictly increasing id derived from the current time
    fn next_id(&self, now_ms: i64, floor: i64) -> i64 {
        let mut previous = self.last_id.load(Ordering::SeqCst);
        loop {
            let candidate = now_ms.max(previous + 1).max(floor + 1);
            match self.last_id.compare_exchange(
                previous,
                candidate,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return candidate,
                Err(actual) => previous = actual,
            }
        }
    }

    fn persist(&self, records: &[SummaryRecord]) -> StorageResult<()> {
        let payload = serde_json::to_string(records)?;
        self.storage.set(&self.key, &payload)
    }

    /// Save a summary as the newest record.
    ///
    /// Returns `None` when the log could not be persisted; the previously
    /// stored log is then left as it was.
    pub fn save(&self, summary: NewSummary) -> Option<SummaryRecord> {
        let mut records = match self.load() {
            Ok(records) => records,
            Err(e) => {
                log::error!("Not saving summary, history could not be read: {}", e);
                return None;
            }
        };
        let now = (self.clock)();
        let floor = records.iter().map(|r| r.id).max().unwrap_or(0);
        let record = summary.into_record(
            self.next_id(now.timestamp_millis(), floor),
            time::iso_timestamp(now),
        );

        records.insert(0, record.clone());
        if records.len() > self.capacity {
            log::debug!(
                "History over capacity, evicting {} oldest record(s)",
                records.len() - self.capacity
            );
            records.truncate(self.capacity);
        }

        match self.persist(&records) {
            Ok(()) => {
                log::debug!("Saved summary {} ({} in history)", record.id, records.len());
                Some(record)
            }
            Err(e) => {
                log::error!("Failed to save summary to history: {}", e);
                None
            }
        }
    }

    /// Stored records, newest first.
    ///
    /// A corrupt payload reads as empty so the next write replaces it; a
    /// backend read failure is returned so callers never write over state
    /// they could not see.
    fn load(&self) -> StorageResult<Vec<SummaryRecord>> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<SummaryRecord>>(&raw) {
            Ok(mut records) => {
                records.truncate(self.capacity);
                Ok(records)
            }
            Err(e) => {
                log::warn!("Stored summary history is corrupt, treating as empty: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// All records, newest first. Missing, unreadable or corrupt state reads
    /// as empty.
    pub fn list(&self) -> Vec<SummaryRecord> {
        self.load().unwrap_or_else(|e| {
            log::warn!("Failed to read summary history: {}", e);
            Vec::new()
        })
    }

    pub fn get(&self, id: i64) -> Option<SummaryRecord> {
        self.list().into_iter().find(|r| r.id == id)
    }

    /// Remove the record with `id`. A missing id is a successful no-op.
    pub fn delete(&self, id: i64) -> bool {
        let mut records = match self.load() {
            Ok(records) => records,
            Err(e) => {
                log::error!("Not deleting summary {}, history could not be read: {}", id, e);
                return false;
            }
        };
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            log::debug!("No summary with id {} to delete", id);
            return true;
        }

        match self.persist(&records) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to delete summary {}: {}", id, e);
                false
            }
        }
    }

    /// Remove every record
    pub fn clear(&self) -> bool {
        match self.storage.remove(&self.key) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to clear summary history: {}", e);
                false
            }
        }
    }

    pub fn count(&self) -> usize {
        self.list().len()
    }
}
