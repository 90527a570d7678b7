pub mod deepfake;
pub mod skin;

pub use deepfake::{DeepfakeModel, ImageScorer};
pub use skin::{SkinClassifier, SkinPrediction, SKIN_CLASSES};

use image::imageops::FilterType;
use image::DynamicImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("onnx session error: {0}")]
    Session(#[from] ort::Error),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("model produced no usable output")]
    EmptyOutput,
    #[error("model session lock poisoned")]
    Poisoned,
}

/// CHW float data in [0, 1], bilinear-resized to `side`×`side` — the
/// `Resize` + `ToTensor` preprocessing the models were trained with.
pub(crate) fn chw_unit_pixels(image: &DynamicImage, side: u32) -> Vec<f32> {
    let resized = image.resize_exact(side, side, FilterType::Triangle).to_rgb8();
    let plane = (side as usize) * (side as usize);
    let mut chw = vec![0.0f32; 3 * plane];
    for (i, pixel) in resized.pixels().enumerate() {
        chw[i] = pixel.0[0] as f32 / 255.0;
        chw[plane + i] = pixel.0[1] as f32 / 255.0;
        chw[2 * plane + i] = pixel.0[2] as f32 / 255.0;
    }
    chw
}

/// Per-channel `(x - mean) / std` in place, CHW layout.
pub(crate) fn normalize_chw(chw: &mut [f32], mean: [f32; 3], std: [f32; 3]) {
    let plane = chw.len() / 3;
    for channel in 0..3 {
        for value in &mut chw[channel * plane..(channel + 1) * plane] {
            *value = (*value - mean[channel]) / std[channel];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(r: u8, g: u8, b: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([r, g, b])))
    }

    #[test]
    fn chw_layout_is_plane_per_channel() {
        let chw = chw_unit_pixels(&solid(255, 0, 128), 4);
        assert_eq!(chw.len(), 3 * 4 * 4);
        let plane = 16;
        assert!(chw[..plane].iter().all(|&v| (v - 1.0).abs() < 1e-6));
        assert!(chw[plane..2 * plane].iter().all(|&v| v.abs() < 1e-6));
        assert!(chw[2 * plane..].iter().all(|&v| (v - 128.0 / 255.0).abs() < 1e-6));
    }

    #[test]
    fn normalize_shifts_and_scales_per_channel() {
        let mut chw = chw_unit_pixels(&solid(255, 255, 255), 2);
        normalize_chw(&mut chw, [0.5, 1.0, 0.0], [0.5, 1.0, 2.0]);
        let plane = 4;
        assert!(chw[..plane].iter().all(|&v| (v - 1.0).abs() < 1e-6));
        assert!(chw[plane..2 * plane].iter().all(|&v| v.abs() < 1e-6));
        assert!(chw[2 * plane..].iter().all(|&v| (v - 0.5).abs() < 1e-6));
    }
}
