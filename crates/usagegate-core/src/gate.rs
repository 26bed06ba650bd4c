//! Action gate: allow/deny decisions against tier quotas
//!
//! Decision order:
//! 1. Trusted development environment: allow, without reading any state.
//! 2. Map the action to its (counter, limit) pair.
//! 3. Allow iff the limit is the unlimited sentinel or usage < limit.
//!
//! The gate is a UX control. It runs entirely on the client, so it cannot
//! stop a determined user; real enforcement belongs on a server.

use crate::config::Environment;
use crate::meter::UsageMeter;
use crate::models::{ActionKind, Dimension, LimitField, Remaining};
use crate::props;
use crate::sink::{emit, events, AnalyticsSink};
use crate::tier::TierPolicy;
use std::sync::Arc;
use tracing::{debug, info};

/// Decides whether an action is permitted right now
#[derive(Clone)]
pub struct ActionGate {
    meter: UsageMeter,
    policy: TierPolicy,
    environment: Environment,
    sink: Arc<dyn AnalyticsSink>,
}

impl ActionGate {
    pub fn new(
        meter: UsageMeter,
        policy: TierPolicy,
        environment: Environment,
        sink: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self {
            meter,
            policy,
            environment,
            sink,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn can_perform_action(&self, kind: ActionKind) -> bool {
        if self.environment.is_trusted() {
            info!(action = %kind, "Trusted development environment, quota check bypassed");
            return true;
        }

        let usage = self.meter.current_stats().get(kind.dimension());
        let limits = self.policy.current_limits();
        let limit = limits.get(kind.limit_field());
        let allowed = limit.allows(usage);

        debug!(action = %kind, usage, %limit, allowed, "Quota check");
        if !allowed {
            emit(
                self.sink.as_ref(),
                events::LIMIT_REACHED,
                props! {
                    "action" => kind.as_str(),
                    "usage" => usage,
                    "limit" => limit.raw(),
                    "tier" => limits.tier.as_str(),
                },
            );
        }
        allowed
    }

    /// Gate by action name; unknown names are denied
    pub fn can_perform_named(&self, name: &str) -> bool {
        match ActionKind::parse(name) {
            Some(kind) => self.can_perform_action(kind),
            None => {
                debug!(name, "Unknown action kind, denying");
                false
            }
        }
    }

    /// Actions left today for `kind`
    pub fn remaining(&self, kind: ActionKind) -> Remaining {
        let usage = self.meter.current_stats().get(kind.dimension());
        self.policy
            .current_limits()
            .get(kind.limit_field())
            .remaining(usage)
    }

    /// Whether a batch of `count` more images fits under the per-session
    /// image cap (`imagesProcessed + count <= imagesPerSession`)
    pub fn can_process_images(&self, count: u64) -> bool {
        if self.environment.is_trusted() {
            info!(count, "Trusted development environment, image cap bypassed");
            return true;
        }

        let processed = self.meter.current_stats().get(Dimension::ImagesProcessed);
        let limits = self.policy.current_limits();
        let limit = limits.get(LimitField::ImagesPerSession);
        let fits = limit.remaining(processed).fits(count);

        debug!(processed, count, %limit, fits, "Image batch check");
        if !fits {
            emit(
                self.sink.as_ref(),
                events::LIMIT_REACHED,
                props! {
                    "action" => "process_images",
                    "usage" => processed,
                    "requested" => count,
                    "limit" => limit.raw(),
                    "tier" => limits.tier.as_str(),
                },
            );
        }
        fits
    }
}
