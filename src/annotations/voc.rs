//! Pascal VOC descriptor parsing.
//!
//! Only the parts of the descriptor the converter needs are read: the `size`
//! section and each `object` entry's `name` and `bndbox`. Everything else in the
//! file (`folder`, `filename`, `pose`, `difficult`, ...) is ignored.

use std::path::Path;

use serde::Deserialize;

use super::taxonomy::Taxonomy;
use crate::error::{ConvertError, ConvertResult};

#[derive(Debug, Deserialize)]
struct VocAnnotation {
    size: Option<VocSize>,
    #[serde(rename = "object", default)]
    objects: Vec<VocObject>,
}

#[derive(Debug, Deserialize)]
struct VocSize {
    width: Option<String>,
    height: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VocObject {
    name: Option<String>,
    bndbox: Option<VocBndBox>,
}

#[derive(Debug, Deserialize)]
struct VocBndBox {
    xmin: Option<String>,
    ymin: Option<String>,
    xmax: Option<String>,
    ymax: Option<String>,
}

/// One labeled rectangle in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub class_id: usize,
    pub class_name: String,
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// A parsed descriptor holding only the regions recognised by the taxonomy,
/// in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub image_width: u32,
    pub image_height: u32,
    pub regions: Vec<Region>,
}

impl AnnotationRecord {
    pub fn from_file(path: &Path, taxonomy: &Taxonomy) -> ConvertResult<Self> {
        let xml = std::fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        Self::parse(&xml, taxonomy)
    }

    pub fn parse(xml: &str, taxonomy: &Taxonomy) -> ConvertResult<Self> {
        let doc: VocAnnotation = quick_xml::de::from_str(xml)?;

        let size = doc.size.ok_or(ConvertError::MissingField("size"))?;
        let image_width: u32 = parse_field("width", size.width)?;
        let image_height: u32 = parse_field("height", size.height)?;
        if image_width == 0 || image_height == 0 {
            return Err(ConvertError::InvalidDimensions {
                width: image_width,
                height: image_height,
            });
        }

        let mut regions = Vec::with_capacity(doc.objects.len());
        for object in doc.objects {
            let class_name = object.name.ok_or(ConvertError::MissingField("name"))?;
            let class_name = class_name.trim().to_string();

            // Unrecognised classes are dropped before their geometry is looked at.
            let Some(class_id) = taxonomy.class_id(&class_name) else {
                continue;
            };

            let bndbox = object.bndbox.ok_or(ConvertError::MissingField("bndbox"))?;
            regions.push(Region {
                class_id,
                class_name,
                xmin: parse_field("xmin", bndbox.xmin)?,
                ymin: parse_field("ymin", bndbox.ymin)?,
                xmax: parse_field("xmax", bndbox.xmax)?,
                ymax: parse_field("ymax", bndbox.ymax)?,
            });
        }

        Ok(Self {
            image_width,
            image_height,
            regions,
        })
    }
}

fn parse_field<T: std::str::FromStr>(field: &'static str, text: Option<String>) -> ConvertResult<T> {
    let text = text.ok_or(ConvertError::MissingField(field))?;
    match text.trim().parse() {
        Ok(value) => Ok(value),
        Err(_) => Err(ConvertError::InvalidNumber { field, value: text }),
    }
}
