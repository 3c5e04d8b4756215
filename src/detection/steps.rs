use crate::annotations::Taxonomy;
use crate::detection::model::DefectModel;
use crate::detection::postprocess;
use crate::pipeline::{BoundingBox, MetadataValue, PipelineContext, PipelineData, PipelineStep};
use anyhow::Result;
use std::sync::Arc;

pub const CLASS_ID_KEY: &str = "class_id";
pub const CLASS_NAME_KEY: &str = "class_name";
pub const CONFIDENCE_KEY: &str = "confidence";

/// Run the model on each full image - splits one image into one item per candidate
pub struct InferenceStep {
    pub model: Arc<dyn DefectModel>,
    pub taxonomy: Taxonomy,
    pub score_floor: f32,
}

impl PipelineStep for InferenceStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let (img_width, img_height) = (item.original.width(), item.original.height());
            let candidates = self.model.predict(&item.image, self.score_floor)?;

            for candidate in candidates {
                let Some(bbox) = BoundingBox::from_corners(
                    candidate.x1,
                    candidate.y1,
                    candidate.x2,
                    candidate.y2,
                    img_width,
                    img_height,
                ) else {
                    continue;
                };

                let class_name = self
                    .taxonomy
                    .name(candidate.class_id)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("class_{}", candidate.class_id));

                let cropped = item.original.crop_imm(bbox.x, bbox.y, bbox.width, bbox.height);
                let region = PipelineData::from_region(cropped, item.original.clone(), bbox)
                    .with_metadata(CLASS_ID_KEY, MetadataValue::Int(candidate.class_id as i32))
                    .with_metadata(CLASS_NAME_KEY, MetadataValue::String(class_name))
                    .with_metadata(CONFIDENCE_KEY, MetadataValue::Float(candidate.confidence));

                result.push(region);
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Model Inference"
    }
}

/// Keep detections at or above the confidence threshold
pub struct ConfidenceFilterStep {
    pub threshold: f32,
}

impl PipelineStep for ConfidenceFilterStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        Ok(data
            .into_iter()
            .filter(|item| item.get_float(CONFIDENCE_KEY).unwrap_or(0.0) >= self.threshold)
            .collect())
    }

    fn name(&self) -> &str {
        "Confidence Filter"
    }
}

/// Drop overlapping detections of the same class, keeping the most confident
pub struct NmsStep {
    pub iou_threshold: f32,
}

impl PipelineStep for NmsStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        // Items without a box are full images and never compete
        let (regions, passthrough): (Vec<_>, Vec<_>) = data.into_iter().partition(|item| item.bbox.is_some());

        let boxes: Vec<(BoundingBox, usize, f32)> = regions
            .iter()
            .filter_map(|item| {
                Some((
                    item.bbox?,
                    item.get_int(CLASS_ID_KEY).unwrap_or(-1) as usize,
                    item.get_float(CONFIDENCE_KEY).unwrap_or(0.0),
                ))
            })
            .collect();

        let keep = postprocess::non_max_suppression(&boxes, self.iou_threshold);

        let mut result = passthrough;
        result.extend(keep.into_iter().map(|idx| regions[idx].clone()));
        Ok(result)
    }

    fn name(&self) -> &str {
        "Non-Maximum Suppression"
    }
}
