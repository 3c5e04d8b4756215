pub mod model;
pub mod postprocess;
pub mod render;
pub mod steps;
pub mod summary;

use anyhow::Result;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::annotations::Taxonomy;
use crate::config::{CANDIDATE_SCORE_FLOOR, IMAGE_EXTENSIONS};
use crate::pipeline::Pipeline;
use model::DefectModel;
use steps::{ConfidenceFilterStep, InferenceStep, NmsStep};
use summary::{Detection, DetectionSummary};

/// Detection parameters
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub taxonomy: Taxonomy,
    pub debug_out: Option<PathBuf>,
}

/// Result of inspecting one image
#[derive(Debug, Clone)]
pub struct DetectionReport {
    /// Sorted by descending confidence
    pub detections: Vec<Detection>,
    pub summary: DetectionSummary,
}

/// Runs the standard detection pipeline over whole images
pub struct DefectDetector {
    pipeline: Pipeline,
}

impl DefectDetector {
    pub fn new(model: Arc<dyn DefectModel>, config: DetectorConfig) -> Result<Self> {
        let mut pipeline = build_standard_pipeline(model, &config);
        if let Some(debug_dir) = config.debug_out {
            pipeline = pipeline.with_debug(debug_dir)?;
        }
        Ok(Self { pipeline })
    }

    pub fn detect(&self, image: DynamicImage) -> Result<DetectionReport> {
        tracing::debug!("Detecting defects in {}x{} image", image.width(), image.height());

        let mut detections: Vec<Detection> = self
            .pipeline
            .run(image)?
            .iter()
            .filter_map(Detection::from_pipeline_data)
            .collect();
        detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        let summary = DetectionSummary::from_detections(&detections);
        tracing::debug!("{} detections, verdict {}", summary.total, summary.verdict);

        Ok(DetectionReport { detections, summary })
    }
}

/// Inference → confidence filter → NMS
pub fn build_standard_pipeline(model: Arc<dyn DefectModel>, config: &DetectorConfig) -> Pipeline {
    Pipeline::new()
        .add_step(Arc::new(InferenceStep {
            model,
            taxonomy: config.taxonomy.clone(),
            score_floor: CANDIDATE_SCORE_FLOOR.min(config.confidence_threshold),
        }))
        .add_step(Arc::new(ConfidenceFilterStep {
            threshold: config.confidence_threshold,
        }))
        .add_step(Arc::new(NmsStep {
            iou_threshold: config.iou_threshold,
        }))
}

/// Reject anything that is not a jpg, jpeg or png file (case-insensitive)
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
