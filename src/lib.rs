pub mod annotations;
pub mod config;
pub mod detection;
pub mod error;
pub mod pipeline;

pub use annotations::{
    AnnotationRecord, BatchReport, DefectClass, NormalizedBox, Split, Taxonomy, convert_batch, convert_file,
};
pub use detection::{DefectDetector, DetectionReport, DetectorConfig};
pub use error::{ConvertError, ConvertResult};
pub use pipeline::{BoundingBox, MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep};
