use image::imageops::{self, FilterType};
use ndarray::Array4;

use super::types::ImagingError;

/// Decodes an uploaded image and turns it into the classifier's input tensor.
///
/// The image is converted to RGB, resized to `size` x `size` and its channel
/// values are scaled to `[0, 1]`. The returned tensor has the layout
/// `(batch, height, width, channel)` with a batch of one.
pub fn preprocess(bytes: &[u8], size: u32) -> Result<Array4<f32>, ImagingError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = decoded.to_rgb8();
    let resized = imageops::resize(&rgb, size, size, FilterType::CatmullRom);

    let pixels: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|channel| f32::from(channel) / 255.0)
        .collect();

    let side = size as usize;
    Ok(Array4::from_shape_vec((1, side, side, 3), pixels)?)
}
