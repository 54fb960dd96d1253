/// On-device inference with the bundled civic-issue model
///
/// A MobileNetV2-style ONNX network, loaded lazily on first use and cached
/// for the lifetime of the process. One forward pass per acquired image;
/// no training, no online learning.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tract_onnx::prelude::*;

use crate::classify::{labels, select_label};
use crate::error::ReportError;
use crate::state::data::ClassificationResult;

type RunnableModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Model singleton; None records a load that already failed
static MODEL: OnceLock<Option<RunnableModel>> = OnceLock::new();

const MODEL_FILE: &str = "civic_issues.onnx";

/// Fixed input geometry of the network
const INPUT_SIZE: u32 = 224;

/// Per-channel normalization constants matched to the model's training regime
/// (ImageNet mean/std)
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Check whether the model asset exists without loading it
pub fn model_available(models_dir: &Path) -> bool {
    models_dir.join(MODEL_FILE).is_file()
}

/// Load the model (lazy initialization)
///
/// Safe to call repeatedly; only the first call does work. A failed load is
/// remembered so later calls fail fast instead of re-reading a broken asset.
pub fn ensure_model_loaded(models_dir: &Path) -> Result<(), ReportError> {
    if let Some(slot) = MODEL.get() {
        return match slot {
            Some(_) => Ok(()),
            None => Err(ReportError::InferenceUnavailable(
                "model failed to load earlier in this session".into(),
            )),
        };
    }

    let model_path = models_dir.join(MODEL_FILE);
    match load_model(&model_path) {
        Ok(model) => {
            let _ = MODEL.set(Some(model));
            println!("🧠 Classification model loaded from {}", model_path.display());
            Ok(())
        }
        Err(reason) => {
            let _ = MODEL.set(None);
            eprintln!("⚠️  Classification unavailable: {}", reason);
            Err(ReportError::InferenceUnavailable(reason))
        }
    }
}

fn load_model(model_path: &PathBuf) -> Result<RunnableModel, String> {
    if !model_path.is_file() {
        return Err(format!("model asset not found: {}", model_path.display()));
    }

    tract_onnx::onnx()
        .model_for_path(model_path)
        .map_err(|e| format!("failed to load model: {}", e))?
        .with_input_fact(
            0,
            f32::fact([1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize]).into(),
        )
        .map_err(|e| format!("failed to set input shape: {}", e))?
        .into_optimized()
        .map_err(|e| format!("failed to optimize model: {}", e))?
        .into_runnable()
        .map_err(|e| format!("failed to make model runnable: {}", e))
}

/// Classify encoded image bytes
///
/// Resizes/normalizes to the fixed input geometry, runs the forward pass,
/// converts scores to probabilities and applies the confidence/margin gate.
pub fn classify_bytes(bytes: &[u8]) -> Result<ClassificationResult, ReportError> {
    let model = MODEL
        .get()
        .and_then(|slot| slot.as_ref())
        .ok_or_else(|| ReportError::InferenceUnavailable("model not loaded".into()))?;

    let img = image::load_from_memory(bytes)
        .map_err(|e| ReportError::InferenceUnavailable(format!("failed to decode image: {}", e)))?;

    let resized = img.resize_exact(INPUT_SIZE, INPUT_SIZE, image::imageops::FilterType::Triangle);
    let rgb = resized.to_rgb8();

    let tensor: Tensor = tract_ndarray::Array4::from_shape_fn(
        (1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize),
        |(_, c, y, x)| {
            let pixel = rgb.get_pixel(x as u32, y as u32);
            let value = pixel[c] as f32 / 255.0;
            (value - MEAN[c]) / STD[c]
        },
    )
    .into();

    let outputs = model
        .run(tvec!(tensor.into()))
        .map_err(|e| ReportError::InferenceUnavailable(format!("inference failed: {}", e)))?;

    let scores = outputs[0]
        .to_array_view::<f32>()
        .map_err(|e| ReportError::InferenceUnavailable(format!("bad model output: {}", e)))?;
    let scores = scores
        .as_slice()
        .ok_or_else(|| ReportError::InferenceUnavailable("non-contiguous model output".into()))?;

    if scores.len() < labels::LABELS.len() {
        return Err(ReportError::InferenceUnavailable(format!(
            "model emitted {} scores for {} labels",
            scores.len(),
            labels::LABELS.len()
        )));
    }

    let probabilities = softmax(&scores[..labels::LABELS.len()]);
    Ok(select_label(&probabilities))
}

/// Numerically stable softmax over the raw score vector
fn softmax(scores: &[f32]) -> Vec<f32> {
    let max = scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp_sum: f32 = scores.iter().map(|s| (s - max).exp()).sum();
    scores.iter().map(|s| (s - max).exp() / exp_sum).collect()
}
