//! Quota service facade
//!
//! One explicit service object, built once at startup and handed to every
//! UI layer that needs it (by reference or `Arc`). Tests build their own
//! with an in-memory backend and a manual clock.

use crate::clock::{Clock, SystemClock};
use crate::config::{Environment, GateConfig};
use crate::error::Result;
use crate::gate::ActionGate;
use crate::meter::UsageMeter;
use crate::models::{ActionKind, Dimension, LimitsConfig, Remaining, Tier, UsageStats};
use crate::quota::{quota_report, AlertThresholds, QuotaStatus};
use crate::sink::{AnalyticsSink, TracingSink};
use crate::store::{KvBackend, QuotaStore};
use crate::tier::TierPolicy;
use std::sync::Arc;
use tracing::debug;

/// Usage metering and feature gating for one client
pub struct QuotaService {
    meter: UsageMeter,
    policy: TierPolicy,
    gate: ActionGate,
    thresholds: AlertThresholds,
}

/// Builder for [`QuotaService`]
pub struct QuotaServiceBuilder {
    backend: Arc<dyn KvBackend>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn AnalyticsSink>,
    environment: Environment,
    thresholds: AlertThresholds,
}

impl QuotaServiceBuilder {
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn thresholds(mut self, thresholds: AlertThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn build(self) -> QuotaService {
        let store = QuotaStore::new(self.backend);
        let meter = UsageMeter::new(store.clone(), self.clock, Arc::clone(&self.sink));
        let policy = TierPolicy::new(store, Arc::clone(&self.sink));
        let gate = ActionGate::new(meter.clone(), policy.clone(), self.environment, self.sink);

        debug!(environment = %self.environment, "Quota service ready");
        QuotaService {
            meter,
            policy,
            gate,
            thresholds: self.thresholds,
        }
    }
}

impl QuotaService {
    /// Start building a service over `backend`.
    ///
    /// Defaults: system clock, tracing sink, production environment.
    pub fn builder(backend: Arc<dyn KvBackend>) -> QuotaServiceBuilder {
        QuotaServiceBuilder {
            backend,
            clock: Arc::new(SystemClock),
            sink: Arc::new(TracingSink),
            environment: Environment::default(),
            thresholds: AlertThresholds::default(),
        }
    }

    /// Service over the backend, environment and thresholds in `config`
    pub fn from_config(config: &GateConfig) -> Result<Self> {
        Ok(Self::builder(config.open_backend()?)
            .environment(config.environment)
            .thresholds(config.alerts)
            .build())
    }

    pub fn environment(&self) -> Environment {
        self.gate.environment()
    }

    // ===================
    // Gate
    // ===================

    pub fn can_perform_action(&self, kind: ActionKind) -> bool {
        self.gate.can_perform_action(kind)
    }

    /// Unknown action names are denied
    pub fn can_perform_named(&self, name: &str) -> bool {
        self.gate.can_perform_named(name)
    }

    pub fn remaining(&self, kind: ActionKind) -> Remaining {
        self.gate.remaining(kind)
    }

    pub fn can_process_images(&self, count: u64) -> bool {
        self.gate.can_process_images(count)
    }

    // ===================
    // Meter
    // ===================

    /// Record a completed action; call only after the action succeeded
    pub fn increment(&self, kind: ActionKind) -> Result<UsageStats> {
        self.meter.increment(kind.dimension())
    }

    /// Record usage on any of the seven dimensions
    pub fn track(&self, dimension: Dimension) -> Result<UsageStats> {
        self.meter.increment(dimension)
    }

    pub fn track_many(&self, dimension: Dimension, amount: u64) -> Result<UsageStats> {
        self.meter.increment_by(dimension, amount)
    }

    /// Unknown dimension names are ignored
    pub fn track_named(&self, name: &str) -> Result<()> {
        self.meter.increment_named(name)
    }

    pub fn current_stats(&self) -> UsageStats {
        self.meter.current_stats()
    }

    pub fn reset(&self) -> Result<()> {
        self.meter.reset()
    }

    // ===================
    // Tier
    // ===================

    pub fn set_tier(&self, tier: Tier) -> Result<LimitsConfig> {
        self.policy.set_tier(tier)
    }

    pub fn current_limits(&self) -> LimitsConfig {
        self.policy.current_limits()
    }

    // ===================
    // Report
    // ===================

    pub fn quota_report(&self) -> Vec<QuotaStatus> {
        quota_report(
            &self.current_stats(),
            &self.current_limits(),
            &self.thresholds,
        )
    }
}
