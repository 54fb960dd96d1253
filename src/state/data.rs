/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the intake pipeline, the report log and the UI layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single acquired issue photo
///
/// Immutable once acquired; owned by the active draft and discarded when the
/// draft is reset or successfully submitted. The payload is reference-counted
/// so UI messages can clone the resource cheaply.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageResource {
    /// Encoded image bytes (JPEG/PNG/... as acquired)
    pub bytes: Arc<[u8]>,
    /// Detected container format
    pub format: image::ImageFormat,
    /// Original filename, or a synthetic one for camera captures
    pub filename: String,
    /// When the image was acquired
    pub acquired_at: DateTime<Utc>,
}

impl ImageResource {
    pub fn new(bytes: Vec<u8>, format: image::ImageFormat, filename: String) -> Self {
        Self {
            bytes: bytes.into(),
            format,
            filename,
            acquired_at: Utc::now(),
        }
    }
}

/// A geographic point in WGS84 decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Which strategy produced a coordinate
///
/// `Manual` flips the mandatory-description rule: a hand-pinned location has
/// no GPS corroboration, so the report must carry a written description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// GPS tags embedded in the image itself
    Exif,
    /// One-shot fix from the device's geolocation provider
    Device,
    /// Pin dropped on the map and explicitly confirmed by the citizen
    Manual,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Exif => "exif",
            Provenance::Device => "device",
            Provenance::Manual => "manual",
        }
    }
}

/// A coordinate together with where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub coordinate: Coordinate,
    /// Human-readable address, when one is known
    pub address: Option<String>,
    pub provenance: Provenance,
}

/// Outcome of the on-device classification pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Accepted label, or the `"unresolved"` sentinel when the model's answer
    /// was too weak or too ambiguous to trust
    pub label: String,
    /// Raw top-1 probability, reported even when the label was rejected
    pub confidence: f32,
    /// True only when top-1 cleared the runner-up by the required margin
    pub distinct: bool,
}

/// Urgency level of a reported issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Medium
    }
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::Low, Urgency::Medium, Urgency::High];

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Low => "Low priority",
            Urgency::Medium => "Medium priority",
            Urgency::High => "High priority",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifier handed back by the submission endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A report accepted by the endpoint and recorded in the local log
///
/// Backs the "my reports" listing. Status moves server-side in a real
/// deployment; locally everything starts as 'submitted'.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedReport {
    /// Local database id
    pub id: i64,
    /// Id returned by the submission endpoint
    pub report_id: String,
    pub label: String,
    pub lat: f64,
    pub lng: f64,
    pub provenance: String,
    pub description: String,
    pub urgency: String,
    /// 'submitted', 'in_progress', 'resolved' or 'closed'
    pub status: String,
    pub submitted_at: i64,
}
