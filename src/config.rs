// Default locations and parameters used by the command line tool.

pub const TRAIN_ANNOTATIONS_DIR: &str = "train_annotations";
pub const VALID_ANNOTATIONS_DIR: &str = "valid_annotations";
pub const TRAIN_LABELS_DIR: &str = "labels/train";
pub const VALID_LABELS_DIR: &str = "labels/val";

pub const TRAIN_PROGRESS_INTERVAL: usize = 100;
pub const VALID_PROGRESS_INTERVAL: usize = 50;

pub const DESCRIPTOR_EXTENSION: &str = "xml";
pub const LABEL_EXTENSION: &str = "txt";

// Detection
pub const DEFAULT_MODEL_PATH: &str = "best.rten";
pub const DEFAULT_INPUT_SIZE: u32 = 640;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;
pub const MIN_CONFIDENCE_THRESHOLD: f32 = 0.1;
pub const MAX_CONFIDENCE_THRESHOLD: f32 = 1.0;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;
/// Scores below this never leave the inference step.
pub const CANDIDATE_SCORE_FLOOR: f32 = 0.01;

pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
