use super::{chw_unit_pixels, normalize_chw, InferenceError};
use image::DynamicImage;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

const INPUT_SIDE: u32 = 224;
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// HAM10000 head in training label order: (code, display name).
/// Index i of the logit vector corresponds to entry i here.
pub const SKIN_CLASSES: &[(&str, &str)] = &[
    ("nv", "Melanocytic nevi"),
    ("mel", "Melanoma"),
    ("bkl", "Benign keratosis-like lesions"),
    ("bcc", "Basal cell carcinoma"),
    ("akiec", "Actinic keratoses"),
    ("vasc", "Vascular lesions"),
    ("df", "Dermatofibroma"),
];

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SkinPrediction {
    pub code: String,
    pub condition: String,
    pub confidence: f32,
}

/// Seven-class skin-lesion classifier over ImageNet-normalized 224×224 input.
pub struct SkinClassifier {
    session: Mutex<Session>,
    output_name: String,
}

impl SkinClassifier {
    /// Load the classifier from an ONNX file. Blocking; wrap in
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
        info!("skin model loaded from {}", path.display());
        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }

    pub fn classify(&self, image: &DynamicImage) -> Result<SkinPrediction, InferenceError> {
        let side = INPUT_SIDE as usize;
        let mut pixels = chw_unit_pixels(image, INPUT_SIDE);
        normalize_chw(&mut pixels, IMAGENET_MEAN, IMAGENET_STD);
        let input = Tensor::from_array(([1usize, 3, side, side], pixels))?;
        let mut session = self.session.lock().map_err(|_| InferenceError::Poisoned)?;
        let outputs = session.run(ort::inputs![input])?;
        let (_, data) = outputs[self.output_name.as_str()].try_extract_tensor::<f32>()?;
        if data.len() < SKIN_CLASSES.len() {
            return Err(InferenceError::EmptyOutput);
        }
        let probabilities = softmax(&data[..SKIN_CLASSES.len()]);
        let (index, confidence) = argmax(&probabilities).ok_or(InferenceError::EmptyOutput)?;
        let (code, condition) = SKIN_CLASSES[index];
        Ok(SkinPrediction {
            code: code.to_string(),
            condition: condition.to_string(),
            confidence,
        })
    }
}

pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}

fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
}
