/// Report composition and submission
///
/// Gates a finished draft through validation, hands the composed payload to
/// the submission endpoint, and applies the terminal transition: success
/// clears the draft, failure preserves it byte-for-byte so the citizen can
/// retry without redoing capture, location or classification.
///
/// There is no real backend in scope; the shipped endpoint simulates one
/// with a short delay, exactly like the portal this client replaces.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::ReportError;
use crate::state::data::ReportId;
use crate::state::draft::ReportDraft;

/// What the endpoint receives
///
/// The image itself travels out-of-band in a real deployment; the payload
/// carries its identity and size so the endpoint can validate the upload.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    pub image_filename: String,
    pub image_size_bytes: usize,
    pub lat: f64,
    pub lng: f64,
    pub provenance: String,
    pub address: Option<String>,
    /// Accepted classification label, if the model produced one
    pub label: Option<String>,
    pub description: String,
    pub urgency: String,
    pub contact: Option<String>,
}

/// Validate the draft and compose the payload the endpoint will receive
pub fn compose_payload(draft: &ReportDraft) -> Result<ReportPayload, ReportError> {
    draft.validate()?;

    // validate() guarantees both of these
    let image = draft.image.as_ref().expect("validated draft has an image");
    let location = draft.location.as_ref().expect("validated draft has a location");

    Ok(ReportPayload {
        image_filename: image.filename.clone(),
        image_size_bytes: image.bytes.len(),
        lat: location.coordinate.lat,
        lng: location.coordinate.lng,
        provenance: location.provenance.as_str().to_string(),
        address: location.address.clone(),
        label: draft.classification.as_ref().map(|c| c.label.clone()),
        description: draft.description.trim().to_string(),
        urgency: draft.urgency.as_str().to_string(),
        contact: if draft.contact.trim().is_empty() {
            None
        } else {
            Some(draft.contact.trim().to_string())
        },
    })
}

/// Where composed reports go
///
/// `submit` may block (network in a real deployment, a delay here); callers
/// run it on a blocking task.
pub trait SubmissionEndpoint: Send + Sync {
    fn submit(&self, payload: &ReportPayload) -> Result<ReportId, ReportError>;
}

/// Simulated endpoint: accepts after a short delay
pub struct SimulatedEndpoint {
    delay: Duration,
    sequence: AtomicU64,
}

impl SimulatedEndpoint {
    pub fn new() -> Self {
        // The portal this replaces simulated its API with a 2 s wait
        Self::with_delay(Duration::from_secs(2))
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            sequence: AtomicU64::new(1),
        }
    }
}

impl SubmissionEndpoint for SimulatedEndpoint {
    fn submit(&self, payload: &ReportPayload) -> Result<ReportId, ReportError> {
        std::thread::sleep(self.delay);

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let id = ReportId(format!("RPT-{}-{:04}", chrono::Utc::now().format("%Y%m%d"), seq));

        println!(
            "📨 Report accepted: {} ({} at {:.6}, {:.6})",
            id,
            payload.label.as_deref().unwrap_or("unclassified"),
            payload.lat,
            payload.lng,
        );

        Ok(id)
    }
}

/// Validate, compose and submit the active draft
pub async fn submit_report(
    draft: &ReportDraft,
    endpoint: Arc<dyn SubmissionEndpoint>,
) -> Result<ReportId, ReportError> {
    let payload = compose_payload(draft)?;

    tokio::task::spawn_blocking(move || endpoint.submit(&payload))
        .await
        .map_err(|e| ReportError::Submission(format!("task join error: {}", e)))?
}

/// Apply the terminal transition for a submission attempt
pub fn apply_submission_outcome(draft: &mut ReportDraft, outcome: &Result<ReportId, ReportError>) {
    match outcome {
        Ok(_) => draft.mark_submitted(),
        Err(_) => draft.mark_submission_failed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::state::data::{
        ClassificationResult, Coordinate, ImageResource, Provenance, ResolvedLocation, Urgency,
    };
    use crate::state::draft::DraftPhase;

    /// Endpoint that always rejects
    struct FailingEndpoint;

    impl SubmissionEndpoint for FailingEndpoint {
        fn submit(&self, _payload: &ReportPayload) -> Result<ReportId, ReportError> {
            Err(ReportError::Submission("backend unreachable".into()))
        }
    }

    fn ready_draft() -> ReportDraft {
        let mut draft = ReportDraft::new();
        draft.set_image(ImageResource::new(
            vec![0xFF, 0xD8, 0xFF, 0xD9],
            image::ImageFormat::Jpeg,
            "pothole.jpg".into(),
        ));
        draft.set_location(ResolvedLocation {
            coordinate: Coordinate::new(26.4525, 87.2718),
            address: None,
            provenance: Provenance::Exif,
        });
        draft.set_classification(Some(ClassificationResult {
            label: "pothole".into(),
            confidence: 0.92,
            distinct: true,
        }));
        draft.set_description("Deep pothole near the bridge".into());
        draft.set_urgency(Urgency::High);
        draft
    }

    #[test]
    fn compose_rejects_an_empty_draft() {
        let result = compose_payload(&ReportDraft::new());
        assert!(matches!(
            result,
            Err(ReportError::Validation(ValidationError::MissingImage))
        ));
    }

    #[test]
    fn compose_carries_every_field() {
        let mut draft = ready_draft();
        draft.set_contact("  98xxxxxxxx  ".into());

        let payload = compose_payload(&draft).unwrap();
        assert_eq!(payload.image_filename, "pothole.jpg");
        assert_eq!(payload.image_size_bytes, 4);
        assert_eq!(payload.provenance, "exif");
        assert_eq!(payload.label.as_deref(), Some("pothole"));
        assert_eq!(payload.urgency, "high");
        assert_eq!(payload.contact.as_deref(), Some("98xxxxxxxx"));

        // Payloads serialize for the wire
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"provenance\":\"exif\""));
    }

    #[tokio::test]
    async fn simulated_endpoint_accepts_a_valid_draft() {
        let endpoint = Arc::new(SimulatedEndpoint::with_delay(Duration::from_millis(1)));
        let id = submit_report(&ready_draft(), endpoint).await.unwrap();
        assert!(id.0.starts_with("RPT-"));
    }

    #[tokio::test]
    async fn failed_submission_preserves_the_draft_for_retry() {
        let mut draft = ready_draft();
        let outcome = submit_report(&draft, Arc::new(FailingEndpoint)).await;
        assert!(matches!(outcome, Err(ReportError::Submission(_))));

        apply_submission_outcome(&mut draft, &outcome);
        assert_eq!(draft.phase(), DraftPhase::SubmissionFailed);
        assert!(draft.image.is_some());
        assert!(draft.location.is_some());
        assert_eq!(draft.description, "Deep pothole near the bridge");

        // Unchanged draft resubmits fine once the backend recovers
        draft.retry();
        let endpoint = Arc::new(SimulatedEndpoint::with_delay(Duration::from_millis(1)));
        let outcome = submit_report(&draft, endpoint).await;
        assert!(outcome.is_ok());

        apply_submission_outcome(&mut draft, &outcome);
        assert_eq!(draft.phase(), DraftPhase::Empty);
        assert!(draft.image.is_none());
    }

    #[tokio::test]
    async fn validation_failure_never_reaches_the_endpoint() {
        let mut draft = ready_draft();
        // Flip to manual provenance and clear the description
        draft.set_location(ResolvedLocation {
            coordinate: Coordinate::new(26.46, 87.28),
            address: None,
            provenance: Provenance::Manual,
        });
        draft.set_description("   ".into());

        let outcome = submit_report(&draft, Arc::new(FailingEndpoint)).await;
        assert!(matches!(
            outcome,
            Err(ReportError::Validation(ValidationError::MissingDescription))
        ));
    }
}
