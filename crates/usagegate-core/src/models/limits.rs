//! Tier limits record
//!
//! Persisted under the `usage-limits` key. Each numeric limit is either a
//! non-negative cap or `-1`, the unlimited sentinel.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw value that is neither a cap nor the unlimited sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("limit must be >= 0 or -1 (unlimited), got {0}")]
pub struct InvalidLimit(pub i64);

/// A quota cap, or the `-1` unlimited sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Limit(i64);

impl Limit {
    pub const UNLIMITED: Limit = Limit(-1);

    pub const fn capped(max: u32) -> Self {
        Limit(max as i64)
    }

    pub fn is_unlimited(self) -> bool {
        self.0 == -1
    }

    /// Cap value, `None` when unlimited
    pub fn cap(self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }

    /// Strict less-than: a counter equal to the cap is exhausted
    pub fn allows(self, usage: u64) -> bool {
        match self.cap() {
            None => true,
            Some(cap) => usage < cap,
        }
    }

    pub fn remaining(self, usage: u64) -> Remaining {
        match self.cap() {
            None => Remaining::Unlimited,
            Some(cap) => Remaining::Limited(cap.saturating_sub(usage)),
        }
    }

    pub fn raw(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Limit {
    type Error = InvalidLimit;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value >= -1 {
            Ok(Limit(value))
        } else {
            Err(InvalidLimit(value))
        }
    }
}

impl From<Limit> for i64 {
    fn from(limit: Limit) -> Self {
        limit.0
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cap() {
            None => f.write_str("unlimited"),
            Some(cap) => write!(f, "{}", cap),
        }
    }
}

/// How many more actions fit under a limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "count")]
pub enum Remaining {
    Unlimited,
    Limited(u64),
}

impl Remaining {
    /// True when at least `count` more actions fit
    pub fn fits(self, count: u64) -> bool {
        match self {
            Remaining::Unlimited => true,
            Remaining::Limited(left) => count <= left,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Remaining::Unlimited => f.write_str("unlimited"),
            Remaining::Limited(n) => write!(f, "{}", n),
        }
    }
}

/// Subscription level determining quota generosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
    Teams,
    Enterprise,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Pro, Tier::Teams, Tier::Enterprise];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Teams => "teams",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Pro => "Pro",
            Self::Teams => "Teams",
            Self::Enterprise => "Enterprise",
        }
    }
}

impl FromStr for Tier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lowered)
            .ok_or_else(|| CoreError::UnknownTier {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limit fields of [`LimitsConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitField {
    ImagesPerSession,
    PdfExportsPerDay,
    DataExportsPerDay,
    ComparisonsPerDay,
    BatchProcessingPerDay,
}

impl LimitField {
    pub const ALL: [LimitField; 5] = [
        LimitField::ImagesPerSession,
        LimitField::PdfExportsPerDay,
        LimitField::DataExportsPerDay,
        LimitField::ComparisonsPerDay,
        LimitField::BatchProcessingPerDay,
    ];

    pub fn field_name(self) -> &'static str {
        match self {
            Self::ImagesPerSession => "imagesPerSession",
            Self::PdfExportsPerDay => "pdfExportsPerDay",
            Self::DataExportsPerDay => "dataExportsPerDay",
            Self::ComparisonsPerDay => "comparisonsPerDay",
            Self::BatchProcessingPerDay => "batchProcessingPerDay",
        }
    }
}

/// Concrete limits for the active tier
///
/// Never mutated field by field: a tier change replaces the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsConfig {
    pub images_per_session: Limit,
    pub pdf_exports_per_day: Limit,
    pub data_exports_per_day: Limit,
    pub comparisons_per_day: Limit,
    pub batch_processing_per_day: Limit,
    pub tier: Tier,
}

impl LimitsConfig {
    pub fn get(&self, field: LimitField) -> Limit {
        match field {
            LimitField::ImagesPerSession => self.images_per_session,
            LimitField::PdfExportsPerDay => self.pdf_exports_per_day,
            LimitField::DataExportsPerDay => self.data_exports_per_day,
            LimitField::ComparisonsPerDay => self.comparisons_per_day,
            LimitField::BatchProcessingPerDay => self.batch_processing_per_day,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        crate::tier::limits_for(Tier::Free)
    }
}
