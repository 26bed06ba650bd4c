//! Tier policy: subscription tier to concrete limits
//!
//! The mapping is static. Free caps every dimension at a small number and
//! disables batch processing entirely (a business rule, `0` is intended).
//! Pro lifts every daily cap and keeps a 50-image per-session cap;
//! Teams and Enterprise are unlimited everywhere.

use crate::error::Result;
use crate::models::{Limit, LimitsConfig, Tier};
use crate::props;
use crate::sink::{emit, events, AnalyticsSink};
use crate::store::QuotaStore;
use std::sync::Arc;
use tracing::info;

/// Per-session image cap on the Pro tier
pub const PRO_IMAGES_PER_SESSION: u32 = 50;

/// Limits for `tier` (pure, total over [`Tier`])
pub fn limits_for(tier: Tier) -> LimitsConfig {
    match tier {
        Tier::Free => LimitsConfig {
            images_per_session: Limit::capped(5),
            pdf_exports_per_day: Limit::capped(2),
            data_exports_per_day: Limit::capped(1),
            comparisons_per_day: Limit::capped(3),
            batch_processing_per_day: Limit::capped(0),
            tier,
        },
        Tier::Pro => LimitsConfig {
            images_per_session: Limit::capped(PRO_IMAGES_PER_SESSION),
            ..unlimited(tier)
        },
        Tier::Teams | Tier::Enterprise => unlimited(tier),
    }
}

fn unlimited(tier: Tier) -> LimitsConfig {
    LimitsConfig {
        images_per_session: Limit::UNLIMITED,
        pdf_exports_per_day: Limit::UNLIMITED,
        data_exports_per_day: Limit::UNLIMITED,
        comparisons_per_day: Limit::UNLIMITED,
        batch_processing_per_day: Limit::UNLIMITED,
        tier,
    }
}

/// Reads and replaces the persisted limits record
#[derive(Clone)]
pub struct TierPolicy {
    store: QuotaStore,
    sink: Arc<dyn AnalyticsSink>,
}

impl TierPolicy {
    pub fn new(store: QuotaStore, sink: Arc<dyn AnalyticsSink>) -> Self {
        Self { store, sink }
    }

    pub fn limits_for(&self, tier: Tier) -> LimitsConfig {
        limits_for(tier)
    }

    /// Persisted limits, free-tier defaults when absent or corrupted
    pub fn current_limits(&self) -> LimitsConfig {
        self.store.load()
    }

    /// Replace the whole limits record with the mapping for `tier`
    pub fn set_tier(&self, tier: Tier) -> Result<LimitsConfig> {
        let previous = self.current_limits().tier;
        let limits = limits_for(tier);
        self.store.save(&limits)?;

        info!(from = %previous, to = %tier, "Tier changed");
        emit(
            self.sink.as_ref(),
            events::TIER_CHANGED,
            props! { "from" => previous.as_str(), "to" => tier.as_str() },
        );
        Ok(limits)
    }
}
