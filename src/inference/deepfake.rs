use super::{chw_unit_pixels, InferenceError};
use image::DynamicImage;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Scores an image for manipulation; `1.0` means certainly fabricated.
/// Implemented by the ONNX detector in production and by fixed stubs in tests.
pub trait ImageScorer: Send + Sync {
    fn score(&self, image: &DynamicImage) -> Result<f32, InferenceError>;
}

const INPUT_SIDE: u32 = 128;

/// Single-output deepfake detector. The exported graph ends in a sigmoid,
/// so the raw output is already a probability.
pub struct DeepfakeModel {
    session: Mutex<Session>,
    output_name: String,
}

impl DeepfakeModel {
    /// Load the detector from an ONNX file. Blocking; wrap in
    /// `spawn_blocking` from async contexts.
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(path)?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or(InferenceError::EmptyOutput)?;
        info!("deepfake model loaded from {}", path.display());
        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

impl ImageScorer for DeepfakeModel {
    fn score(&self, image: &DynamicImage) -> Result<f32, InferenceError> {
        let side = INPUT_SIDE as usize;
        let pixels = chw_unit_pixels(image, INPUT_SIDE);
        let input = Tensor::from_array(([1usize, 3, side, side], pixels))?;
        let mut session = self.session.lock().map_err(|_| InferenceError::Poisoned)?;
        let outputs = session.run(ort::inputs![input])?;
        let (_, data) = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?;
        data.first().copied().ok_or(InferenceError::EmptyOutput)
    }
}
