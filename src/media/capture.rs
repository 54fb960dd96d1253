/// Camera capture capability
///
/// The camera is abstracted behind a device/stream trait pair so the capture
/// flow never talks to hardware directly. A stream is long-lived until
/// explicitly stopped; dropping it releases the device unconditionally, so a
/// dismissed capture view or a facing toggle can never leak the handle.
///
/// The shipped device is a simulated camera fed from a frames directory —
/// this client has no hardware capture backend — and the trait is the seam
/// a real one would implement.

use std::io::Cursor;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::error::ReportError;
use crate::state::data::ImageResource;

/// Which way the camera points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Front,
    Back,
}

impl Facing {
    pub fn toggled(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }
}

/// A camera that can be opened into a live stream
pub trait CameraDevice: Send + Sync {
    fn open(&self, facing: Facing) -> Result<Box<dyn CameraStream>, ReportError>;
}

/// A live camera stream
///
/// Implementations must release the underlying device on `stop` AND on drop.
pub trait CameraStream: Send {
    fn facing(&self) -> Facing;

    /// The current frame at the stream's native resolution
    fn grab_frame(&mut self) -> Result<image::RgbImage, ReportError>;

    /// Release the device; the stream is dead afterwards
    fn stop(&mut self);

    fn is_live(&self) -> bool;
}

/// Freeze the stream's current frame into a still ImageResource
///
/// This is the explicit "capture" action: the frame is encoded to JPEG at
/// the stream's native resolution. The stream itself stays live; the caller
/// decides when to release it.
pub fn freeze_frame(stream: &mut dyn CameraStream) -> Result<ImageResource, ReportError> {
    let frame = stream.grab_frame()?;

    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(frame)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .map_err(|e| ReportError::DeviceUnavailable(format!("failed to encode frame: {}", e)))?;

    let filename = format!("issue-{}.jpg", chrono::Utc::now().timestamp_millis());
    println!("📷 Captured frame -> {} ({} KB)", filename, bytes.len() / 1024);

    Ok(ImageResource::new(bytes, image::ImageFormat::Jpeg, filename))
}

/// Camera simulated from a directory of frames
///
/// Scans the configured directory recursively for images and serves them as
/// successive "frames". Ward-office test rigs point this at a folder of
/// sample issue photos.
pub struct SimulatedCamera {
    frames_dir: PathBuf,
}

impl SimulatedCamera {
    pub fn new(frames_dir: PathBuf) -> Self {
        Self { frames_dir }
    }
}

const FRAME_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "tif"];

impl CameraDevice for SimulatedCamera {
    fn open(&self, facing: Facing) -> Result<Box<dyn CameraStream>, ReportError> {
        let mut frames: Vec<PathBuf> = WalkDir::new(&self.frames_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| {
                        let ext = ext.to_string_lossy().to_lowercase();
                        FRAME_EXTENSIONS.contains(&ext.as_str())
                    })
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        frames.sort();

        if frames.is_empty() {
            return Err(ReportError::DeviceUnavailable(format!(
                "no frames available in {}",
                self.frames_dir.display()
            )));
        }

        println!("🎥 Camera stream opened ({:?}, {} frames)", facing, frames.len());

        Ok(Box::new(SimulatedStream {
            frames,
            cursor: 0,
            facing,
            live: true,
        }))
    }
}

struct SimulatedStream {
    frames: Vec<PathBuf>,
    cursor: usize,
    facing: Facing,
    live: bool,
}

impl CameraStream for SimulatedStream {
    fn facing(&self) -> Facing {
        self.facing
    }

    fn grab_frame(&mut self) -> Result<image::RgbImage, ReportError> {
        if !self.live {
            return Err(ReportError::DeviceUnavailable("stream already stopped".into()));
        }

        let path = &self.frames[self.cursor];
        self.cursor = (self.cursor + 1) % self.frames.len();

        let img = image::open(path).map_err(|e| {
            ReportError::DeviceUnavailable(format!("failed to read frame {}: {}", path.display(), e))
        })?;

        Ok(img.to_rgb8())
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            println!("🎥 Camera stream released");
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for SimulatedStream {
    fn drop(&mut self) {
        self.stop();
    }
}
