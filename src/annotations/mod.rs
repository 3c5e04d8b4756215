//! Pascal VOC → YOLO label conversion.

pub mod convert;
pub mod progress;
pub mod taxonomy;
pub mod voc;

pub use convert::{BatchReport, NormalizedBox, Split, convert_batch, convert_file, label_path_for, normalize_record};
pub use progress::{LogProgress, ProgressObserver, SilentProgress};
pub use taxonomy::{DefectClass, Taxonomy};
pub use voc::{AnnotationRecord, Region};
