mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from steel_defects for tests
pub use steel_defects::annotations::{
    BatchReport, ProgressObserver, SilentProgress, Split, Taxonomy, convert_batch, convert_file,
};
pub use steel_defects::error::ConvertError;
