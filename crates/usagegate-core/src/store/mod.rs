//! Quota persistence over a client-scoped key-value backend
//!
//! Two independent records live in the backend: usage counters under
//! `usage-stats` and tier limits under `usage-limits`, both as JSON.
//!
//! Loading never fails. A missing key yields the record's defaults; a value
//! that is not JSON yields the defaults; a JSON object with some bad fields
//! keeps every field that deserializes and takes defaults for the rest
//! (shallow merge). Writes go straight through and report backend faults
//! to the caller without retrying.

mod json_dir;
mod memory;
mod sqlite;

pub use json_dir::JsonDirBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use crate::error::{CoreError, Result};
use crate::models::{LimitsConfig, UsageStats};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Storage key for [`UsageStats`]
pub const USAGE_STATS_KEY: &str = "usage-stats";

/// Storage key for [`LimitsConfig`]
pub const USAGE_LIMITS_KEY: &str = "usage-limits";

/// Raw string key-value storage scoped to one client
///
/// Implementations are last-writer-wins; there is no compare-and-swap.
pub trait KvBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// A record persisted as JSON under a fixed key
pub trait Record: Serialize + DeserializeOwned + Default {
    const KEY: &'static str;
}

impl Record for UsageStats {
    const KEY: &'static str = USAGE_STATS_KEY;
}

impl Record for LimitsConfig {
    const KEY: &'static str = USAGE_LIMITS_KEY;
}

/// Typed record access with corrupted-state recovery
#[derive(Clone)]
pub struct QuotaStore {
    backend: Arc<dyn KvBackend>,
}

impl QuotaStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Store over a fresh in-memory backend
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn backend(&self) -> &Arc<dyn KvBackend> {
        &self.backend
    }

    pub fn load<R: Record>(&self) -> R {
        self.load_from(R::KEY)
    }

    pub fn save<R: Record>(&self, record: &R) -> Result<()> {
        self.save_to(R::KEY, record)
    }

    pub fn remove<R: Record>(&self) -> Result<()> {
        self.backend.remove(R::KEY).inspect_err(|e| {
            error!(key = R::KEY, error = %e, "Failed to remove record");
        })
    }

    /// Load the record stored under `key`, recovering to defaults on any
    /// read or shape problem
    pub fn load_from<R>(&self, key: &str) -> R
    where
        R: Serialize + DeserializeOwned + Default,
    {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "Record absent, using defaults");
                return R::default();
            }
            Err(e) => {
                warn!(key, error = %e, "Failed to read record, using defaults");
                return R::default();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => merge_with_defaults(key, value),
            Err(e) => {
                warn!(key, error = %e, "Record is not valid JSON, using defaults");
                R::default()
            }
        }
    }

    /// Serialize `record` and overwrite whatever is stored under `key`
    pub fn save_to<R: Serialize>(&self, key: &str, record: &R) -> Result<()> {
        let json = serde_json::to_string(record).map_err(|source| CoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, &json).inspect_err(|e| {
            error!(key, error = %e, "Failed to persist record");
        })?;
        debug!(key, bytes = json.len(), "Record saved");
        Ok(())
    }
}

/// Shallow merge of a stored JSON value over the record's defaults.
///
/// Top-level fields are accepted one at a time; a field is kept only if the
/// record still deserializes with it in place. Unknown fields are dropped.
fn merge_with_defaults<R>(key: &str, stored: Value) -> R
where
    R: Serialize + DeserializeOwned + Default,
{
    let Value::Object(stored) = stored else {
        warn!(key, "Record is not a JSON object, using defaults");
        return R::default();
    };

    if let Ok(record) = serde_json::from_value::<R>(Value::Object(stored.clone())) {
        return record;
    }

    let defaults = match serde_json::to_value(R::default()) {
        Ok(Value::Object(map)) => map,
        _ => return R::default(),
    };

    let mut merged: Map<String, Value> = defaults.clone();
    let mut rejected = Vec::new();
    for (field, default_value) in &defaults {
        let Some(candidate) = stored.get(field) else {
            continue;
        };
        merged.insert(field.clone(), candidate.clone());
        if serde_json::from_value::<R>(Value::Object(merged.clone())).is_err() {
            merged.insert(field.clone(), default_value.clone());
            rejected.push(field.as_str());
        }
    }

    warn!(key, ?rejected, "Recovered partially corrupted record");
    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Limit, Tier};
    use chrono::NaiveDate;

    fn store_with(key: &str, raw: &str) -> QuotaStore {
        let backend = MemoryBackend::new();
        backend.set(key, raw).unwrap();
        QuotaStore::new(Arc::new(backend))
    }

    #[test]
    fn test_absent_key_yields_defaults() {
        let store = QuotaStore::in_memory();
        assert_eq!(store.load::<UsageStats>(), UsageStats::default());
        assert_eq!(store.load::<LimitsConfig>(), LimitsConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let store = QuotaStore::in_memory();
        let mut stats = UsageStats::fresh(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        stats.comparisons = 4;
        store.save(&stats).unwrap();

        assert_eq!(store.load::<UsageStats>(), stats);
    }

    #[test]
    fn test_invalid_json_yields_defaults() {
        let store = store_with(USAGE_STATS_KEY, "{not json");
        assert_eq!(store.load::<UsageStats>(), UsageStats::default());
    }

    #[test]
    fn test_non_object_json_yields_defaults() {
        let store = store_with(USAGE_LIMITS_KEY, "[1, 2, 3]");
        assert_eq!(store.load::<LimitsConfig>(), LimitsConfig::default());
    }

    #[test]
    fn test_partial_record_keeps_valid_fields() {
        let store = store_with(
            USAGE_STATS_KEY,
            r#"{"uploads": 3, "pdfDownloads": "lots", "lastReset": "2024-01-15"}"#,
        );
        let stats: UsageStats = store.load();

        assert_eq!(stats.uploads, 3);
        assert_eq!(stats.pdf_downloads, 0);
        assert_eq!(stats.comparisons, 0);
        assert_eq!(
            stats.last_reset,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_negative_counter_is_rejected_field() {
        let store = store_with(
            USAGE_STATS_KEY,
            r#"{"uploads": -4, "comparisons": 2, "lastReset": "2024-01-15"}"#,
        );
        let stats: UsageStats = store.load();
        assert_eq!(stats.uploads, 0);
        assert_eq!(stats.comparisons, 2);
    }

    #[test]
    fn test_limits_merge_rejects_bad_sentinel() {
        let store = store_with(
            USAGE_LIMITS_KEY,
            r#"{"pdfExportsPerDay": -7, "comparisonsPerDay": 9, "tier": "pro"}"#,
        );
        let limits: LimitsConfig = store.load();

        assert_eq!(limits.pdf_exports_per_day, Limit::capped(2));
        assert_eq!(limits.comparisons_per_day, Limit::capped(9));
        assert_eq!(limits.tier, Tier::Pro);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let store = store_with(
            USAGE_LIMITS_KEY,
            r#"{"imagesPerSession": -1, "pdfExportsPerDay": -1, "dataExportsPerDay": -1,
                "comparisonsPerDay": -1, "batchProcessingPerDay": -1, "tier": "teams",
                "legacyField": true}"#,
        );
        let limits: LimitsConfig = store.load();
        assert_eq!(limits.tier, Tier::Teams);
        assert!(limits.images_per_session.is_unlimited());
    }

    #[test]
    fn test_remove_clears_record() {
        let store = QuotaStore::in_memory();
        store.save(&UsageStats::fresh(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())).unwrap();
        store.remove::<UsageStats>().unwrap();

        assert!(store.backend().get(USAGE_STATS_KEY).unwrap().is_none());
    }
}
