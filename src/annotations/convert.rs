use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::progress::ProgressObserver;
use super::taxonomy::Taxonomy;
use super::voc::{AnnotationRecord, Region};
use crate::config::{DESCRIPTOR_EXTENSION, LABEL_EXTENSION};
use crate::error::{ConvertError, ConvertResult};

/// A region expressed as center and extent, each relative to the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub class_id: usize,
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

impl NormalizedBox {
    pub fn from_region(region: &Region, image_width: u32, image_height: u32) -> Self {
        let img_w = image_width as f64;
        let img_h = image_height as f64;
        Self {
            class_id: region.class_id,
            x_center: (region.xmin + region.xmax) / 2.0 / img_w,
            y_center: (region.ymin + region.ymax) / 2.0 / img_h,
            width: (region.xmax - region.xmin) / img_w,
            height: (region.ymax - region.ymin) / img_h,
        }
    }
}

/// Formats as one label line, without the trailing newline.
impl fmt::Display for NormalizedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.x_center, self.y_center, self.width, self.height
        )
    }
}

/// Normalized boxes for every recognised region of a record, in input order.
pub fn normalize_record(record: &AnnotationRecord) -> Vec<NormalizedBox> {
    record
        .regions
        .iter()
        .map(|region| NormalizedBox::from_region(region, record.image_width, record.image_height))
        .collect()
}

/// Convert one descriptor into a label file.
///
/// Returns `Ok(true)` when the label file was written and `Ok(false)` when no
/// region survived the taxonomy filter, in which case no file is created.
/// The output is fully assembled before anything is written, so a malformed
/// descriptor never leaves a partial file behind.
pub fn convert_file(source: &Path, destination: &Path, taxonomy: &Taxonomy) -> ConvertResult<bool> {
    let record = AnnotationRecord::from_file(source, taxonomy)?;
    let boxes = normalize_record(&record);

    if boxes.is_empty() {
        return Ok(false);
    }

    let mut contents = String::new();
    for normalized in &boxes {
        contents.push_str(&normalized.to_string());
        contents.push('\n');
    }

    fs::write(destination, contents).map_err(|e| ConvertError::io(destination, e))?;
    Ok(true)
}

/// A source/destination directory pair converted together.
#[derive(Debug, Clone)]
pub struct Split {
    pub name: String,
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
}

impl Split {
    pub fn new(
        name: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        destination_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            source_dir: source_dir.into(),
            destination_dir: destination_dir.into(),
        }
    }
}

/// Counters reported after a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub split: String,
    /// Descriptor files found in the source directory.
    pub discovered: usize,
    /// Files for which a label file was written.
    pub converted: usize,
    /// Files that failed to parse or write.
    pub failed: usize,
    /// Label files present in the destination directory afterwards.
    pub verified: usize,
}

/// Convert every descriptor of a split.
///
/// Only failing to create the destination directory aborts the batch; per-file
/// errors are logged, handed to the observer and counted.
pub fn convert_batch(
    split: &Split,
    taxonomy: &Taxonomy,
    progress: &mut dyn ProgressObserver,
) -> ConvertResult<BatchReport> {
    fs::create_dir_all(&split.destination_dir).map_err(|e| ConvertError::CreateDestination {
        path: split.destination_dir.clone(),
        source: e,
    })?;

    let sources = list_files_with_extension(&split.source_dir, DESCRIPTOR_EXTENSION);
    let total = sources.len();
    progress.on_start(&split.name, total);

    let mut converted = 0;
    let mut failed = 0;

    for (i, source) in sources.iter().enumerate() {
        let destination = label_path_for(source, &split.destination_dir);

        match convert_file(source, &destination, taxonomy) {
            Ok(true) => converted += 1,
            Ok(false) => {
                tracing::debug!("No recognised regions in {}", source.display());
            }
            Err(e) => {
                failed += 1;
                tracing::warn!("Error processing {}: {}", source.display(), e);
                progress.on_file_failed(&split.name, source, &e);
            }
        }

        progress.on_file_processed(&split.name, i + 1, total);
    }

    let verified = list_files_with_extension(&split.destination_dir, LABEL_EXTENSION).len();

    let report = BatchReport {
        split: split.name.clone(),
        discovered: total,
        converted,
        failed,
        verified,
    };
    progress.on_finish(&report);

    Ok(report)
}

/// `<destination_dir>/<source file name without .xml>.txt`
pub fn label_path_for(source: &Path, destination_dir: &Path) -> PathBuf {
    let mut name = source.file_stem().unwrap_or(source.as_os_str()).to_os_string();
    name.push(".");
    name.push(LABEL_EXTENSION);
    destination_dir.join(name)
}

/// Regular files in `dir` with the given extension, sorted by path.
/// A missing or unreadable directory yields an empty list.
fn list_files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if dir.exists() {
                tracing::warn!("Cannot list {}: {}", dir.display(), e);
            }
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == extension))
        .collect();
    files.sort();

    files
}
