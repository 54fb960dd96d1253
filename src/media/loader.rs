/// File-picker image intake
///
/// Reads a selected file off the UI thread, sniffs the container format and
/// rejects anything that is not an image. The resulting ImageResource is what
/// the location resolver and the classifier both feed on.

use std::path::{Path, PathBuf};
use tokio::task;

use crate::error::ReportError;
use crate::state::data::ImageResource;

/// Load an image file selected by the citizen
///
/// Runs on a blocking task because the file may be a multi-megabyte photo.
pub async fn load_image_file(path: PathBuf) -> Result<ImageResource, ReportError> {
    task::spawn_blocking(move || load_image_file_blocking(&path))
        .await
        .map_err(|e| ReportError::DeviceUnavailable(format!("task join error: {}", e)))?
}

/// Blocking implementation of file intake
fn load_image_file_blocking(path: &Path) -> Result<ImageResource, ReportError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ReportError::DeviceUnavailable(format!("could not read {}: {}", path.display(), e)))?;

    // Sniff the real content; the extension is not trusted
    let format = image::guess_format(&bytes)
        .map_err(|_| ReportError::InvalidFormat(path.display().to_string()))?;

    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    println!("🖼️  Acquired {} ({} KB, {:?})", filename, bytes.len() / 1024, format);

    Ok(ImageResource::new(bytes, format, filename))
}
