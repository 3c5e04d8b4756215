use std::collections::BTreeSet;
use std::fmt;

use super::steps::{CLASS_ID_KEY, CLASS_NAME_KEY, CONFIDENCE_KEY};
use crate::pipeline::{BoundingBox, PipelineData};

/// One reported defect
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: usize,
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
}

impl Detection {
    /// Read a detection back from a pipeline item. Full-image items yield None.
    pub fn from_pipeline_data(item: &PipelineData) -> Option<Self> {
        Some(Self {
            class_id: usize::try_from(item.get_int(CLASS_ID_KEY)?).ok()?,
            class_name: item.get_string(CLASS_NAME_KEY)?.to_string(),
            confidence: item.get_float(CONFIDENCE_KEY)?,
            bbox: item.bbox?,
        })
    }
}

/// Inspection outcome: any defect rejects the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => f.write_str("ACCEPT"),
            Verdict::Reject => f.write_str("REJECT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionSummary {
    pub total: usize,
    /// Mean confidence in [0, 1]; None when nothing was detected
    pub average_confidence: Option<f32>,
    pub defect_types: usize,
    pub verdict: Verdict,
}

impl DetectionSummary {
    pub fn from_detections(detections: &[Detection]) -> Self {
        let total = detections.len();
        let average_confidence = if total == 0 {
            None
        } else {
            Some(detections.iter().map(|d| d.confidence).sum::<f32>() / total as f32)
        };
        let defect_types = detections
            .iter()
            .map(|d| d.class_name.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            total,
            average_confidence,
            defect_types,
            verdict: if total == 0 { Verdict::Accept } else { Verdict::Reject },
        }
    }
}

/// `0.8734` → `87.34%`
pub fn format_percent(value: f32) -> String {
    format!("{:.2}%", value * 100.0)
}
