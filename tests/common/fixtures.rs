use std::path::{Path, PathBuf};

use steel_defects::annotations::{BatchReport, ProgressObserver};
use steel_defects::error::ConvertError;

/// A labeled rectangle for building descriptors: (name, xmin, ymin, xmax, ymax)
pub type TestRegion<'a> = (&'a str, f64, f64, f64, f64);

/// Builds a Pascal VOC descriptor with the given size and regions.
pub fn voc_xml(width: u32, height: u32, regions: &[TestRegion]) -> String {
    let mut xml = format!(
        "<annotation>\n  <folder>IMAGES</folder>\n  <filename>sample.jpg</filename>\n  \
         <source><database>NEU-DET</database></source>\n  \
         <size>\n    <width>{}</width>\n    <height>{}</height>\n    <depth>1</depth>\n  </size>\n  \
         <segmented>0</segmented>\n",
        width, height
    );
    for (name, xmin, ymin, xmax, ymax) in regions {
        xml.push_str(&format!(
            "  <object>\n    <name>{}</name>\n    <pose>Unspecified</pose>\n    <truncated>0</truncated>\n    \
             <difficult>0</difficult>\n    <bndbox>\n      <xmin>{}</xmin>\n      <ymin>{}</ymin>\n      \
             <xmax>{}</xmax>\n      <ymax>{}</ymax>\n    </bndbox>\n  </object>\n",
            name, xmin, ymin, xmax, ymax
        ));
    }
    xml.push_str("</annotation>\n");
    xml
}

/// A descriptor with no size section.
pub fn voc_xml_without_size() -> String {
    "<annotation>\n  <filename>broken.jpg</filename>\n  <object>\n    <name>crazing</name>\n    \
     <bndbox><xmin>1</xmin><ymin>1</ymin><xmax>5</xmax><ymax>5</ymax></bndbox>\n  </object>\n</annotation>\n"
        .to_string()
}

/// Writes `contents` to `dir/name` and returns the path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture file");
    path
}

/// Names of the files in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read directory")
        .map(|entry| entry.expect("Bad directory entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Observer that records every event for assertions.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub started: Vec<(String, usize)>,
    pub processed: Vec<usize>,
    pub failed: Vec<PathBuf>,
    pub finished: Vec<BatchReport>,
}

impl ProgressObserver for RecordingProgress {
    fn on_start(&mut self, split: &str, discovered: usize) {
        self.started.push((split.to_string(), discovered));
    }

    fn on_file_processed(&mut self, _split: &str, processed: usize, _total: usize) {
        self.processed.push(processed);
    }

    fn on_file_failed(&mut self, _split: &str, path: &Path, _error: &ConvertError) {
        self.failed.push(path.to_path_buf());
    }

    fn on_finish(&mut self, report: &BatchReport) {
        self.finished.push(report.clone());
    }
}
