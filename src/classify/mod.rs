/// Image classification module
///
/// This module identifies the civic issue shown in an acquired photo:
/// - The fixed label set (labels.rs)
/// - The bundled ONNX model and preprocessing (model.rs)
/// - Confidence/margin gating and the async entry point (here)
///
/// Classification is advisory. When the engine is unavailable or the answer
/// is gated out, the citizen describes the issue in free text instead; the
/// draft lifecycle is never blocked.

pub mod labels;
pub mod model;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ReportError;
use crate::state::data::{ClassificationResult, ImageResource};

/// Minimum top-1 probability to trust the model's answer
pub const CONFIDENCE_THRESHOLD: f32 = 0.60;

/// Minimum gap between top-1 and top-2; anything closer is a near-tie
/// the model should not be allowed to call
pub const DISTINCTNESS_MARGIN: f32 = 0.15;

/// Gate the probability vector into an accepted label or the sentinel
///
/// The top-1 label is accepted only if its probability meets the threshold
/// AND it clears the runner-up by the margin. On rejection the raw top-1
/// probability is still reported for transparency.
pub fn select_label(probabilities: &[f32]) -> ClassificationResult {
    let mut top1 = (0usize, f32::NEG_INFINITY);
    let mut top2 = f32::NEG_INFINITY;

    for (index, &p) in probabilities.iter().enumerate() {
        if p > top1.1 {
            top2 = top1.1;
            top1 = (index, p);
        } else if p > top2 {
            top2 = p;
        }
    }

    let confidence = top1.1.max(0.0);
    let distinct = top1.1 - top2 >= DISTINCTNESS_MARGIN;

    let label = if confidence >= CONFIDENCE_THRESHOLD && distinct {
        labels::LABELS
            .get(top1.0)
            .copied()
            .unwrap_or(labels::UNRESOLVED)
    } else {
        labels::UNRESOLVED
    };

    ClassificationResult {
        label: label.to_string(),
        confidence,
        distinct,
    }
}

/// Run the classification pass for an acquired image
///
/// Loads the model on first use, then performs one forward pass off the UI
/// thread. Any failure surfaces as `InferenceUnavailable`.
pub async fn classify_image(
    image: &ImageResource,
    models_dir: PathBuf,
) -> Result<ClassificationResult, ReportError> {
    let bytes = Arc::clone(&image.bytes);

    tokio::task::spawn_blocking(move || {
        model::ensure_model_loaded(&models_dir)?;
        model::classify_bytes(&bytes)
    })
    .await
    .map_err(|e| ReportError::InferenceUnavailable(format!("task join error: {}", e)))?
}
