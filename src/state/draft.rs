/// The in-progress issue report and its lifecycle
///
/// A single draft is active at a time. Location resolution and classification
/// run concurrently once an image exists and may finish in either order, so
/// every mutation goes through a field-scoped setter: the image write, the
/// location write and the classification write touch disjoint fields and can
/// never clobber each other.
///
/// Lifecycle:
/// Empty -> Gathering (location & classification branches settle independently)
///       -> ReadyToValidate -> submitted (draft cleared) or SubmissionFailed
///       -> ReadyToValidate (retry with the draft intact)

use crate::error::ValidationError;
use crate::state::data::{
    ClassificationResult, ImageResource, Provenance, ResolvedLocation, Urgency,
};

/// Settlement state of one async branch (location or classification)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    /// Work is still in flight (or waiting on the citizen, for manual pins)
    Pending,
    /// The branch produced its result, or explicitly gave up
    Settled,
}

/// Where the draft is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraftPhase {
    /// No image yet; nothing else can happen
    #[default]
    Empty,
    /// Image acquired; the two async branches are settling
    Gathering {
        location: BranchState,
        classification: BranchState,
    },
    /// Both branches settled; the draft can be validated and submitted
    ReadyToValidate,
    /// The endpoint rejected the report; every field is preserved for retry
    SubmissionFailed,
}

/// The single active report draft
#[derive(Debug, Clone, Default)]
pub struct ReportDraft {
    pub image: Option<ImageResource>,
    pub location: Option<ResolvedLocation>,
    pub classification: Option<ClassificationResult>,
    pub description: String,
    pub urgency: Urgency,
    pub contact: String,
    phase: DraftPhase,
}

impl ReportDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    /// Acquiring an image starts both async branches
    ///
    /// Replacing the image of an in-flight draft restarts the lifecycle: the
    /// old location and classification belonged to the old image.
    pub fn set_image(&mut self, image: ImageResource) {
        self.image = Some(image);
        self.location = None;
        self.classification = None;
        self.phase = DraftPhase::Gathering {
            location: BranchState::Pending,
            classification: BranchState::Pending,
        };
    }

    /// Location branch settled with a coordinate
    ///
    /// Ignored when the draft has no image: the settlement belongs to an
    /// image that was discarded (or already submitted) in the meantime.
    pub fn set_location(&mut self, location: ResolvedLocation) {
        if self.image.is_none() {
            return;
        }
        self.location = Some(location);
        self.settle(|loc, _| *loc = BranchState::Settled);
    }

    /// Classification branch settled
    ///
    /// `None` means the inference engine was unavailable and classification
    /// was skipped; that still settles the branch, because classification is
    /// advisory and must never hold up the draft. Like `set_location`, a
    /// settlement arriving after the draft was cleared is ignored.
    pub fn set_classification(&mut self, classification: Option<ClassificationResult>) {
        if self.image.is_none() {
            return;
        }
        self.classification = classification;
        self.settle(|_, class| *class = BranchState::Settled);
    }

    pub fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub fn set_urgency(&mut self, urgency: Urgency) {
        self.urgency = urgency;
    }

    pub fn set_contact(&mut self, contact: String) {
        self.contact = contact;
    }

    /// Mark one branch settled and advance to ReadyToValidate once both are
    fn settle(&mut self, update: impl FnOnce(&mut BranchState, &mut BranchState)) {
        if let DraftPhase::Gathering {
            mut location,
            mut classification,
        } = self.phase
        {
            update(&mut location, &mut classification);
            self.phase = if location == BranchState::Settled
                && classification == BranchState::Settled
            {
                DraftPhase::ReadyToValidate
            } else {
                DraftPhase::Gathering {
                    location,
                    classification,
                }
            };
        }
    }

    /// Check every submission precondition
    ///
    /// Rules: image present; both async branches settled; coordinate present;
    /// if the coordinate was pinned manually, the description must not be
    /// empty or whitespace-only.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.image.is_none() {
            return Err(ValidationError::MissingImage);
        }
        if matches!(self.phase, DraftPhase::Gathering { .. }) {
            return Err(ValidationError::StillGathering);
        }
        let location = self.location.as_ref().ok_or(ValidationError::MissingLocation)?;
        if location.provenance == Provenance::Manual && self.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        Ok(())
    }

    pub fn can_submit(&self) -> bool {
        self.validate().is_ok()
    }

    /// Successful submission is terminal: the draft returns to empty
    pub fn mark_submitted(&mut self) {
        *self = Self::default();
    }

    /// Failed submission preserves every field so the citizen can retry
    /// without redoing capture, location or classification
    pub fn mark_submission_failed(&mut self) {
        self.phase = DraftPhase::SubmissionFailed;
    }

    /// A retry puts the preserved draft back on the validation path
    pub fn retry(&mut self) {
        if self.phase == DraftPhase::SubmissionFailed {
            self.phase = DraftPhase::ReadyToValidate;
        }
    }

    /// Abandon the draft entirely
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Coordinate;

    fn test_image() -> ImageResource {
        ImageResource::new(vec![0xFF, 0xD8, 0xFF], image::ImageFormat::Jpeg, "t.jpg".into())
    }

    fn located(provenance: Provenance) -> ResolvedLocation {
        ResolvedLocation {
            coordinate: Coordinate::new(26.4525, 87.2718),
            address: None,
            provenance,
        }
    }

    #[test]
    fn cannot_submit_without_image_or_location() {
        let mut draft = ReportDraft::new();
        assert!(!draft.can_submit());
        assert_eq!(draft.validate(), Err(ValidationError::MissingImage));

        draft.set_image(test_image());
        assert_eq!(draft.validate(), Err(ValidationError::StillGathering));
        assert!(!draft.can_submit());
    }

    #[test]
    fn cannot_submit_while_a_branch_is_pending() {
        let mut draft = ReportDraft::new();
        draft.set_image(test_image());
        draft.set_location(located(Provenance::Exif));

        // Location settled instantly via EXIF; classification is still in
        // flight, so the draft must not be submittable yet
        assert!(matches!(draft.phase(), DraftPhase::Gathering { .. }));
        assert_eq!(draft.validate(), Err(ValidationError::StillGathering));
        assert!(!draft.can_submit());

        draft.set_classification(None);
        assert!(draft.can_submit());
    }

    #[test]
    fn late_settlements_after_the_draft_clears_are_ignored() {
        let mut draft = ReportDraft::new();
        draft.set_image(test_image());
        draft.set_location(located(Provenance::Exif));
        draft.set_classification(None);
        draft.mark_submitted();

        // A slow classification task may finish after a fast submit; its
        // result belongs to the old image and must not touch the empty draft
        draft.set_classification(Some(ClassificationResult {
            label: "pothole".into(),
            confidence: 0.92,
            distinct: true,
        }));
        draft.set_location(located(Provenance::Device));

        assert_eq!(draft.phase(), DraftPhase::Empty);
        assert!(draft.classification.is_none());
        assert!(draft.location.is_none());
        assert!(!draft.can_submit());
    }

    #[test]
    fn device_provenance_needs_no_description() {
        let mut draft = ReportDraft::new();
        draft.set_image(test_image());
        draft.set_location(located(Provenance::Device));
        draft.set_classification(None);
        assert!(draft.can_submit());
    }

    #[test]
    fn manual_provenance_requires_description() {
        let mut draft = ReportDraft::new();
        draft.set_image(test_image());
        draft.set_location(located(Provenance::Manual));
        draft.set_classification(None);

        assert_eq!(draft.validate(), Err(ValidationError::MissingDescription));

        // Whitespace does not count as a description
        draft.set_description("   \t ".into());
        assert!(!draft.can_submit());

        draft.set_description("Large pothole near the school gate".into());
        assert!(draft.can_submit());
    }

    #[test]
    fn branches_settle_in_either_order() {
        // Location first
        let mut draft = ReportDraft::new();
        draft.set_image(test_image());
        draft.set_location(located(Provenance::Exif));
        assert!(matches!(draft.phase(), DraftPhase::Gathering { .. }));
        draft.set_classification(None);
        assert_eq!(draft.phase(), DraftPhase::ReadyToValidate);

        // Classification first
        let mut draft = ReportDraft::new();
        draft.set_image(test_image());
        draft.set_classification(Some(ClassificationResult {
            label: "pothole".into(),
            confidence: 0.92,
            distinct: true,
        }));
        assert!(matches!(draft.phase(), DraftPhase::Gathering { .. }));
        draft.set_location(located(Provenance::Device));
        assert_eq!(draft.phase(), DraftPhase::ReadyToValidate);
    }

    #[test]
    fn skipped_classification_still_settles_the_branch() {
        let mut draft = ReportDraft::new();
        draft.set_image(test_image());
        draft.set_location(located(Provenance::Device));
        draft.set_classification(None);
        assert_eq!(draft.phase(), DraftPhase::ReadyToValidate);
        assert!(draft.can_submit());
    }

    #[test]
    fn failed_submission_preserves_the_draft() {
        let mut draft = ReportDraft::new();
        draft.set_image(test_image());
        draft.set_location(located(Provenance::Device));
        draft.set_classification(None);
        draft.set_description("Overflowing garbage container".into());

        draft.mark_submission_failed();
        assert_eq!(draft.phase(), DraftPhase::SubmissionFailed);
        assert!(draft.image.is_some());
        assert!(draft.location.is_some());
        assert_eq!(draft.description, "Overflowing garbage container");

        // Retry with the unchanged draft is permitted
        draft.retry();
        assert_eq!(draft.phase(), DraftPhase::ReadyToValidate);
        assert!(draft.can_submit());
    }

    #[test]
    fn successful_submission_clears_the_draft() {
        let mut draft = ReportDraft::new();
        draft.set_image(test_image());
        draft.set_location(located(Provenance::Device));
        draft.set_classification(None);

        draft.mark_submitted();
        assert_eq!(draft.phase(), DraftPhase::Empty);
        assert!(draft.image.is_none());
        assert!(draft.location.is_none());
        assert_eq!(draft.urgency, Urgency::Medium);
    }

    #[test]
    fn replacing_the_image_restarts_the_lifecycle() {
        let mut draft = ReportDraft::new();
        draft.set_image(test_image());
        draft.set_location(located(Provenance::Exif));
        draft.set_classification(None);
        assert_eq!(draft.phase(), DraftPhase::ReadyToValidate);

        draft.set_image(test_image());
        assert!(matches!(
            draft.phase(),
            DraftPhase::Gathering {
                location: BranchState::Pending,
                classification: BranchState::Pending,
            }
        ));
        assert!(draft.location.is_none());
        assert!(draft.classification.is_none());
    }

    #[test]
    fn default_urgency_is_medium() {
        assert_eq!(ReportDraft::new().urgency, Urgency::Medium);
    }
}
