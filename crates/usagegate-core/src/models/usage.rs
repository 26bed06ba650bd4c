//! Per-day usage counters
//!
//! Persisted under the `usage-stats` key. Field names match the client's
//! storage layout (camelCase). The day key is written as `YYYY-MM-DD`;
//! older clients wrote it as `Mon Jan 15 2024`, which is still read.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Day key layout written by older clients
const LEGACY_DAY_FORMAT: &str = "%a %b %d %Y";

/// One of the seven tracked action categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Uploads,
    PdfDownloads,
    ImageDownloads,
    DataExports,
    BatchProcessing,
    Comparisons,
    ImagesProcessed,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::Uploads,
        Dimension::PdfDownloads,
        Dimension::ImageDownloads,
        Dimension::DataExports,
        Dimension::BatchProcessing,
        Dimension::Comparisons,
        Dimension::ImagesProcessed,
    ];

    /// Field name in the persisted record
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Uploads => "uploads",
            Self::PdfDownloads => "pdfDownloads",
            Self::ImageDownloads => "imageDownloads",
            Self::DataExports => "dataExports",
            Self::BatchProcessing => "batchProcessing",
            Self::Comparisons => "comparisons",
            Self::ImagesProcessed => "imagesProcessed",
        }
    }

    /// Parse a dimension name coming from a UI layer.
    ///
    /// Accepts the persisted field name (`pdfDownloads`) and its snake_case
    /// form (`pdf_downloads`). Returns `None` for anything else.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| {
            let field = d.field_name();
            name == field || name == to_snake_case(field)
        })
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

fn to_snake_case(camel: &str) -> String {
    let mut out = String::with_capacity(camel.len() + 4);
    for c in camel.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Usage counters for one client and one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub uploads: u64,
    pub pdf_downloads: u64,
    pub image_downloads: u64,
    pub data_exports: u64,
    pub batch_processing: u64,
    pub comparisons: u64,
    pub images_processed: u64,

    /// Day the counters were last started from zero. Defaults to the Unix
    /// epoch so an absent record always reads as a past day.
    #[serde(deserialize_with = "deserialize_day_key")]
    pub last_reset: NaiveDate,
}

impl UsageStats {
    /// Zeroed counters starting on `today`
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            last_reset: today,
            ..Default::default()
        }
    }

    pub fn get(&self, dimension: Dimension) -> u64 {
        match dimension {
            Dimension::Uploads => self.uploads,
            Dimension::PdfDownloads => self.pdf_downloads,
            Dimension::ImageDownloads => self.image_downloads,
            Dimension::DataExports => self.data_exports,
            Dimension::BatchProcessing => self.batch_processing,
            Dimension::Comparisons => self.comparisons,
            Dimension::ImagesProcessed => self.images_processed,
        }
    }

    fn counter_mut(&mut self, dimension: Dimension) -> &mut u64 {
        match dimension {
            Dimension::Uploads => &mut self.uploads,
            Dimension::PdfDownloads => &mut self.pdf_downloads,
            Dimension::ImageDownloads => &mut self.image_downloads,
            Dimension::DataExports => &mut self.data_exports,
            Dimension::BatchProcessing => &mut self.batch_processing,
            Dimension::Comparisons => &mut self.comparisons,
            Dimension::ImagesProcessed => &mut self.images_processed,
        }
    }

    /// Add `amount` to one counter (saturating)
    pub fn add(&mut self, dimension: Dimension, amount: u64) {
        let counter = self.counter_mut(dimension);
        *counter = counter.saturating_add(amount);
    }

    /// Sum of all counters
    pub fn total(&self) -> u64 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }

    /// True when the counters belong to a day other than `today`
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.last_reset != today
    }
}

/// Accept `YYYY-MM-DD` or the legacy `Mon Jan 15 2024` layout
fn deserialize_day_key<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, LEGACY_DAY_FORMAT))
        .map_err(|_| serde::de::Error::custom(format!("invalid day key '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_dimension_parse_accepts_both_spellings() {
        assert_eq!(Dimension::parse("pdfDownloads"), Some(Dimension::PdfDownloads));
        assert_eq!(Dimension::parse("pdf_downloads"), Some(Dimension::PdfDownloads));
        assert_eq!(Dimension::parse("uploads"), Some(Dimension::Uploads));
        assert_eq!(
            Dimension::parse("images_processed"),
            Some(Dimension::ImagesProcessed)
        );
        assert_eq!(Dimension::parse("PdfDownloads"), None);
        assert_eq!(Dimension::parse("screenshots"), None);
    }

    #[test]
    fn test_add_targets_single_counter() {
        let mut stats = UsageStats::fresh(day(15));
        stats.add(Dimension::Comparisons, 3);
        stats.add(Dimension::Uploads, 1);

        assert_eq!(stats.get(Dimension::Comparisons), 3);
        assert_eq!(stats.get(Dimension::Uploads), 1);
        assert_eq!(stats.get(Dimension::PdfDownloads), 0);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_add_saturates() {
        let mut stats = UsageStats::fresh(day(15));
        stats.uploads = u64::MAX - 1;
        stats.add(Dimension::Uploads, 5);
        assert_eq!(stats.uploads, u64::MAX);
    }

    #[test]
    fn test_serialized_layout() {
        let mut stats = UsageStats::fresh(day(15));
        stats.pdf_downloads = 2;
        let value = serde_json::to_value(&stats).unwrap();

        assert_eq!(value["pdfDownloads"], 2);
        assert_eq!(value["lastReset"], "2024-01-15");
        assert_eq!(value.as_object().unwrap().len(), 8);
    }

    #[test]
    fn test_legacy_day_key_is_read() {
        let stats: UsageStats = serde_json::from_str(
            r#"{"uploads": 3, "pdfDownloads": 0, "imageDownloads": 0, "dataExports": 0,
                "batchProcessing": 0, "comparisons": 0, "imagesProcessed": 0,
                "lastReset": "Mon Jan 15 2024"}"#,
        )
        .unwrap();
        assert_eq!(stats.last_reset, day(15));
        assert_eq!(stats.uploads, 3);

        // written back in the current layout
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["lastReset"], "2024-01-15");
    }

    #[test]
    fn test_unparsable_day_key_is_rejected() {
        let result = serde_json::from_str::<UsageStats>(
            r#"{"uploads": 0, "pdfDownloads": 0, "imageDownloads": 0, "dataExports": 0,
                "batchProcessing": 0, "comparisons": 0, "imagesProcessed": 0,
                "lastReset": "yesterday"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_default_record_is_stale() {
        assert!(UsageStats::default().is_stale(day(1)));
        assert!(!UsageStats::fresh(day(1)).is_stale(day(1)));
    }
}
