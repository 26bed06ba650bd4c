//! Analytics sink seam
//!
//! The quota engine reports denials, tracked usage and tier changes to an
//! external analytics transport. Delivery is fire-and-forget: a failing sink
//! is logged and never changes a gate decision or a counter.

use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Event properties
pub type Properties = BTreeMap<String, Value>;

/// Event names emitted by the engine
pub mod events {
    pub const LIMIT_REACHED: &str = "limit_reached";
    pub const USAGE_TRACKED: &str = "usage_tracked";
    pub const TIER_CHANGED: &str = "tier_changed";
    pub const USAGE_RESET: &str = "usage_reset";
}

/// External analytics transport
pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: &str, properties: &Properties) -> anyhow::Result<()>;
}

/// Deliver an event, swallowing (and logging) sink failures
pub(crate) fn emit(sink: &dyn AnalyticsSink, event: &str, properties: Properties) {
    if let Err(e) = sink.record(event, &properties) {
        warn!(event, error = %e, "Analytics sink failed, event dropped");
    }
}

/// Build a [`Properties`] map from `key => value` pairs
#[macro_export]
macro_rules! props {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = $crate::sink::Properties::new();
        $( map.insert($key.to_string(), ::serde_json::json!($value)); )*
        map
    }};
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AnalyticsSink for NullSink {
    fn record(&self, _event: &str, _properties: &Properties) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Writes events to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AnalyticsSink for TracingSink {
    fn record(&self, event: &str, properties: &Properties) -> anyhow::Result<()> {
        let properties = serde_json::to_string(properties)?;
        info!(target: "usagegate::analytics", event, %properties, "Analytics event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSink {
        calls: AtomicUsize,
    }

    impl AnalyticsSink for FailingSink {
        fn record(&self, _event: &str, _properties: &Properties) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("transport offline")
        }
    }

    #[test]
    fn test_emit_swallows_failures() {
        let sink = FailingSink {
            calls: AtomicUsize::new(0),
        };
        emit(&sink, events::LIMIT_REACHED, props! { "action" => "pdf_export" });
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_props_macro() {
        let props = props! { "action" => "upload", "usage" => 3, "unlimited" => false };
        assert_eq!(props["action"], "upload");
        assert_eq!(props["usage"], 3);
        assert_eq!(props["unlimited"], false);
    }

    #[test]
    fn test_builtin_sinks_accept_events() {
        let props = props! { "tier" => "pro" };
        assert!(NullSink.record(events::TIER_CHANGED, &props).is_ok());
        assert!(TracingSink.record(events::TIER_CHANGED, &props).is_ok());
    }
}
