//! usagegate-core - Core library for usagegate
//!
//! Client-side usage metering and tiered feature gating: per-day counters
//! with lazy rollover, tier limits with an unlimited sentinel, and an
//! allow/deny gate over both.

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod gate;
pub mod meter;
pub mod models;
pub mod quota;
pub mod service;
pub mod sink;
pub mod store;
pub mod tier;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BackendKind, Environment, GateConfig};
pub use error::CoreError;
pub use event::{EventBus, QuotaEvent};
pub use models::{ActionKind, Dimension, Limit, LimitsConfig, Remaining, Tier, UsageStats};
pub use quota::{AlertLevel, AlertThresholds, QuotaStatus};
pub use service::{QuotaService, QuotaServiceBuilder};
pub use sink::{AnalyticsSink, NullSink, Properties, TracingSink};
pub use store::{JsonDirBackend, KvBackend, MemoryBackend, QuotaStore, SqliteBackend};
