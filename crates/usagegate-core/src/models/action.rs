//! Gated action kinds

use super::limits::LimitField;
use super::usage::Dimension;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An action the UI asks permission for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Upload,
    PdfExport,
    DataExport,
    Comparison,
    BatchProcessing,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Upload,
        ActionKind::PdfExport,
        ActionKind::DataExport,
        ActionKind::Comparison,
        ActionKind::BatchProcessing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::PdfExport => "pdf_export",
            Self::DataExport => "data_export",
            Self::Comparison => "comparison",
            Self::BatchProcessing => "batch_processing",
        }
    }

    /// Parse an action name; unknown names yield `None`
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Counter consumed by this action
    pub fn dimension(self) -> Dimension {
        match self {
            Self::Upload => Dimension::Uploads,
            Self::PdfExport => Dimension::PdfDownloads,
            Self::DataExport => Dimension::DataExports,
            Self::Comparison => Dimension::Comparisons,
            Self::BatchProcessing => Dimension::BatchProcessing,
        }
    }

    /// Limit that caps this action
    pub fn limit_field(self) -> LimitField {
        match self {
            Self::Upload => LimitField::ImagesPerSession,
            Self::PdfExport => LimitField::PdfExportsPerDay,
            Self::DataExport => LimitField::DataExportsPerDay,
            Self::Comparison => LimitField::ComparisonsPerDay,
            Self::BatchProcessing => LimitField::BatchProcessingPerDay,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_field_mapping() {
        let expected = [
            (ActionKind::Upload, Dimension::Uploads, LimitField::ImagesPerSession),
            (ActionKind::PdfExport, Dimension::PdfDownloads, LimitField::PdfExportsPerDay),
            (ActionKind::DataExport, Dimension::DataExports, LimitField::DataExportsPerDay),
            (ActionKind::Comparison, Dimension::Comparisons, LimitField::ComparisonsPerDay),
            (
                ActionKind::BatchProcessing,
                Dimension::BatchProcessing,
                LimitField::BatchProcessingPerDay,
            ),
        ];
        for (kind, dimension, field) in expected {
            assert_eq!(kind.dimension(), dimension);
            assert_eq!(kind.limit_field(), field);
        }
    }

    #[test]
    fn test_parse_round_trips_names() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ActionKind::parse("not_a_real_action"), None);
        assert_eq!(ActionKind::parse("PDF_EXPORT"), None);
    }
}
