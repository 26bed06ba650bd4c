//! Usage meter with lazy daily reset
//!
//! A read on a new day observes zeroed counters but does not write them
//! back; the first increment of the day persists the fresh record. Reads
//! (badge counters, gate checks) therefore never touch storage for writing.

use crate::clock::Clock;
use crate::error::Result;
use crate::models::{Dimension, UsageStats};
use crate::props;
use crate::sink::{emit, events, AnalyticsSink, Properties};
use crate::store::QuotaStore;
use std::sync::Arc;
use tracing::debug;

/// Reads and bumps the per-day usage counters
#[derive(Clone)]
pub struct UsageMeter {
    store: QuotaStore,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn AnalyticsSink>,
}

impl UsageMeter {
    pub fn new(store: QuotaStore, clock: Arc<dyn Clock>, sink: Arc<dyn AnalyticsSink>) -> Self {
        Self { store, clock, sink }
    }

    /// Counters for today; zeroed (not yet persisted) after a day rollover
    pub fn current_stats(&self) -> UsageStats {
        let today = self.clock.today();
        let stats: UsageStats = self.store.load();
        if stats.is_stale(today) {
            debug!(last_reset = %stats.last_reset, %today, "Day rolled over, counters read as zero");
            return UsageStats::fresh(today);
        }
        stats
    }

    /// Add one to `dimension` and persist the whole record
    pub fn increment(&self, dimension: Dimension) -> Result<UsageStats> {
        self.increment_by(dimension, 1)
    }

    /// Add `amount` to `dimension` and persist the whole record
    pub fn increment_by(&self, dimension: Dimension, amount: u64) -> Result<UsageStats> {
        let mut stats = self.current_stats();
        stats.add(dimension, amount);
        self.store.save(&stats)?;

        debug!(%dimension, amount, value = stats.get(dimension), "Usage tracked");
        emit(
            self.sink.as_ref(),
            events::USAGE_TRACKED,
            props! {
                "dimension" => dimension.field_name(),
                "amount" => amount,
                "value" => stats.get(dimension),
            },
        );
        Ok(stats)
    }

    /// Increment by dimension name; unknown names are a no-op
    pub fn increment_named(&self, name: &str) -> Result<()> {
        match Dimension::parse(name) {
            Some(dimension) => self.increment(dimension).map(|_| ()),
            None => {
                debug!(name, "Ignoring increment of unknown dimension");
                Ok(())
            }
        }
    }

    /// Delete the persisted counters; the next read starts from zero
    pub fn reset(&self) -> Result<()> {
        self.store.remove::<UsageStats>()?;
        debug!("Usage counters reset");
        emit(self.sink.as_ref(), events::USAGE_RESET, Properties::new());
        Ok(())
    }
}
