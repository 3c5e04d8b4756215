use anyhow::Result;
use image::{DynamicImage, imageops::FilterType};
use rten::Model;
use rten_tensor::NdTensor;
use rten_tensor::prelude::*;
use std::path::Path;

use super::postprocess::{Candidate, decode_yolov5};

/// A detector that turns an image into raw candidates in source image pixels.
pub trait DefectModel: Send + Sync {
    fn predict(&self, image: &DynamicImage, score_floor: f32) -> Result<Vec<Candidate>>;
}

/// YOLOv5 model executed with rten
pub struct YoloV5Model {
    model: Model,
    input_size: u32,
}

impl YoloV5Model {
    /// Load a model file, failing early with a readable message when it is absent.
    pub fn load(path: &Path, input_size: u32) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Model file not found: {}", path.display());
        }

        let model = Model::load_file(path)
            .map_err(|e| anyhow::anyhow!("Error loading model {}: {}", path.display(), e))?;

        Ok(Self { model, input_size })
    }

    /// Resize to the square model input and lay out as NCHW floats in [0, 1].
    fn to_input_tensor(&self, image: &DynamicImage) -> NdTensor<f32, 4> {
        let size = self.input_size;
        let rgb = image.to_rgb8();
        let resized = image::imageops::resize(&rgb, size, size, FilterType::Triangle);

        let mut input = NdTensor::zeros([1, 3, size as usize, size as usize]);
        for (x, y, pixel) in resized.enumerate_pixels() {
            for c in 0..3 {
                input[[0, c, y as usize, x as usize]] = pixel[c] as f32 / 255.0;
            }
        }
        input
    }
}

impl DefectModel for YoloV5Model {
    fn predict(&self, image: &DynamicImage, score_floor: f32) -> Result<Vec<Candidate>> {
        let input = self.to_input_tensor(image);

        let output = self.model.run_one(input.view().into(), None)?;
        let output: NdTensor<f32, 3> = output.try_into()?;

        // [batch, predictions, 5 + classes]
        let [_, _, row_len] = output.shape();
        let rows = output.to_vec();

        let scale_x = image.width() as f32 / self.input_size as f32;
        let scale_y = image.height() as f32 / self.input_size as f32;

        Ok(decode_yolov5(&rows, row_len, scale_x, scale_y, score_floor))
    }
}
