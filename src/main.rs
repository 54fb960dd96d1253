use iced::widget::{button, canvas, column, container, pick_list, row, text, text_input, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::sync::Arc;

mod classify;
mod config;
mod error;
mod location;
mod media;
mod state;
mod submit;
mod ui;

use config::AppConfig;
use error::ReportError;
use location::device::{FixedLocator, GeolocationProvider, UnavailableLocator};
use location::resolver::{self, Resolution};
use media::capture::{self, CameraDevice, CameraStream, Facing, SimulatedCamera};
use state::data::{
    ClassificationResult, Coordinate, ImageResource, Provenance, ReportId, SubmittedReport, Urgency,
};
use state::draft::ReportDraft;
use state::log::ReportLog;
use submit::{SimulatedEndpoint, SubmissionEndpoint};
use ui::map::MapView;

/// Main application state
struct CivicReporter {
    config: AppConfig,
    /// The single active report draft
    draft: ReportDraft,
    /// Local catalog of submitted reports
    log: ReportLog,
    /// Device seams; fakes replace these in tests
    locator: Arc<dyn GeolocationProvider>,
    endpoint: Arc<dyn SubmissionEndpoint>,
    /// Live camera stream while the capture view is open
    camera_stream: Option<Box<dyn CameraStream>>,
    camera_facing: Facing,
    camera_preview: Option<iced::widget::image::Handle>,
    /// Preview of the acquired issue photo
    preview: Option<iced::widget::image::Handle>,
    map: MapView,
    /// Manual pinning is active (automatic strategies came up empty)
    show_map: bool,
    submitting: bool,
    recent: Vec<SubmittedReport>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Choose photo"
    PickImage,
    /// File intake finished
    ImageLoaded(Result<ImageResource, String>),
    /// User discarded the acquired photo (resets the whole draft)
    RemoveImage,

    OpenCamera,
    ToggleFacing,
    /// Advance the simulated stream by one frame
    NextFrame,
    /// Freeze the current frame as the issue photo
    CapturePhoto,
    CloseCamera,

    /// The automatic location tiers settled
    LocationSettled(Resolution),
    MapClicked(Coordinate),
    MapZoomed(f64),
    /// Explicit confirmation of the dropped pin
    ConfirmPin,

    /// The classification branch settled (Err = engine unavailable)
    ClassificationSettled(Result<ClassificationResult, String>),

    DescriptionChanged(String),
    UrgencyPicked(Urgency),
    ContactChanged(String),

    Submit,
    SubmissionFinished(Result<ReportId, String>),
}

impl CivicReporter {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = AppConfig::load();
        if !AppConfig::settings_path().exists() {
            if let Err(e) = config.save() {
                eprintln!("⚠️  Could not write default settings: {}", e);
            }
        }

        // If this fails, we panic because the app cannot function without
        // its local catalog
        let log = ReportLog::new()
            .expect("Failed to initialize report log. Check permissions and disk space.");

        let report_count = log.count().unwrap_or(0);
        println!("🏛️  Civic Reporter initialized with {} past reports", report_count);

        if !classify::model::model_available(&config.resolved_models_dir()) {
            println!("🧠 No classification model installed; issues must be described manually");
        }

        let locator: Arc<dyn GeolocationProvider> = match config.kiosk_position {
            Some(position) => Arc::new(FixedLocator::new(position)),
            None => Arc::new(UnavailableLocator),
        };

        let map = MapView::new(Coordinate::new(
            config.default_center_lat,
            config.default_center_lng,
        ));

        let recent = log.recent(5).unwrap_or_default();
        let status = format!("Ready. {} reports submitted so far.", report_count);

        (
            CivicReporter {
                config,
                draft: ReportDraft::new(),
                log,
                locator,
                endpoint: Arc::new(SimulatedEndpoint::new()),
                camera_stream: None,
                camera_facing: Facing::Back,
                camera_preview: None,
                preview: None,
                map,
                show_map: false,
                submitting: false,
                recent,
                status,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => {
                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select Issue Photo")
                    .add_filter("Images", &["jpg", "jpeg", "png", "tif", "tiff"])
                    .pick_file();

                if let Some(path) = file {
                    self.status = format!("Loading {}...", path.display());
                    return Task::perform(
                        async move {
                            media::loader::load_image_file(path)
                                .await
                                .map_err(|e| e.to_string())
                        },
                        Message::ImageLoaded,
                    );
                }

                Task::none()
            }

            Message::ImageLoaded(Ok(resource)) => self.start_intake(resource),

            Message::ImageLoaded(Err(e)) => {
                self.status = format!("⚠️  {}", e);
                Task::none()
            }

            Message::RemoveImage => {
                self.draft.reset();
                self.preview = None;
                self.map.clear_pin();
                self.show_map = false;
                self.status = "Draft discarded.".into();
                Task::none()
            }

            Message::OpenCamera => {
                let Some(frames_dir) = self.config.camera_frames_dir.clone() else {
                    self.status = "⚠️  No camera configured; use \"Choose photo\" instead.".into();
                    return Task::none();
                };

                let camera = SimulatedCamera::new(frames_dir);
                match camera.open(self.camera_facing) {
                    Ok(stream) => {
                        self.camera_stream = Some(stream);
                        self.refresh_camera_preview();
                    }
                    Err(e) => self.status = format!("⚠️  {}", e),
                }
                Task::none()
            }

            Message::ToggleFacing => {
                // Stop-then-restart: dropping the old stream releases it
                if self.camera_stream.take().is_some() {
                    self.camera_facing = self.camera_facing.toggled();
                    return self.update(Message::OpenCamera);
                }
                Task::none()
            }

            Message::NextFrame => {
                self.refresh_camera_preview();
                Task::none()
            }

            Message::CapturePhoto => {
                let frozen = self
                    .camera_stream
                    .as_mut()
                    .map(|stream| capture::freeze_frame(stream.as_mut()));

                match frozen {
                    Some(Ok(resource)) => {
                        // Capture complete: release the device before intake
                        self.camera_stream = None;
                        self.camera_preview = None;
                        self.start_intake(resource)
                    }
                    Some(Err(e)) => {
                        self.status = format!("⚠️  {}", e);
                        Task::none()
                    }
                    None => Task::none(),
                }
            }

            Message::CloseCamera => {
                // Dropping the stream guarantees the device is released
                self.camera_stream = None;
                self.camera_preview = None;
                Task::none()
            }

            Message::LocationSettled(Resolution::Resolved(location)) => {
                self.map.recenter(location.coordinate);
                self.map.set_pin(location.coordinate);
                self.status = match location.provenance {
                    Provenance::Exif => "📍 Location obtained from image EXIF data".into(),
                    Provenance::Device => "📍 Location obtained from this device".into(),
                    Provenance::Manual => "📍 Location set".into(),
                };
                self.draft.set_location(location);
                Task::none()
            }

            Message::LocationSettled(Resolution::ManualRequired) => {
                self.show_map = true;
                self.map.clear_pin();
                self.status =
                    "📌 Automatic location failed — please pin the issue on the map.".into();
                Task::none()
            }

            Message::MapClicked(coordinate) => {
                self.map.set_pin(coordinate);
                Task::none()
            }

            Message::MapZoomed(delta) => {
                self.map.zoom_by(delta);
                Task::none()
            }

            Message::ConfirmPin => {
                if let Some(pin) = self.map.pin() {
                    let location = resolver::confirm_manual_pin(pin);
                    self.draft.set_location(location);
                    self.show_map = false;
                    self.status =
                        "📍 Location pinned manually — a description is now required.".into();
                }
                Task::none()
            }

            Message::ClassificationSettled(Ok(result)) => {
                self.status = if result.label == classify::labels::UNRESOLVED {
                    format!(
                        "🧠 Could not identify the issue ({:.0}% confidence) — please describe it.",
                        result.confidence * 100.0
                    )
                } else {
                    format!(
                        "🧠 Identified: {} ({:.0}% confidence)",
                        classify::labels::display_name(&result.label),
                        result.confidence * 100.0
                    )
                };
                self.draft.set_classification(Some(result));
                Task::none()
            }

            Message::ClassificationSettled(Err(e)) => {
                // Classification is advisory; the draft moves on without it
                eprintln!("⚠️  Classification skipped: {}", e);
                self.draft.set_classification(None);
                Task::none()
            }

            Message::DescriptionChanged(description) => {
                self.draft.set_description(description);
                Task::none()
            }

            Message::UrgencyPicked(urgency) => {
                self.draft.set_urgency(urgency);
                Task::none()
            }

            Message::ContactChanged(contact) => {
                self.draft.set_contact(contact);
                Task::none()
            }

            Message::Submit => {
                // Submitting again after a rejected attempt is the retry path
                self.draft.retry();

                if let Err(e) = self.draft.validate() {
                    self.status = format!("⚠️  {}", e);
                    return Task::none();
                }

                self.submitting = true;
                self.status = "Submitting report...".into();

                let draft = self.draft.clone();
                let endpoint = Arc::clone(&self.endpoint);
                Task::perform(
                    async move {
                        submit::submit_report(&draft, endpoint)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::SubmissionFinished,
                )
            }

            Message::SubmissionFinished(result) => {
                self.submitting = false;
                let outcome = result.map_err(ReportError::Submission);

                if let Ok(id) = &outcome {
                    // Record before the terminal transition clears the draft
                    if let Err(e) = self.log.record(id, &self.draft) {
                        eprintln!("⚠️  Failed to record report locally: {}", e);
                    }
                    self.status = format!("✅ Report {} submitted successfully.", id);
                    self.preview = None;
                    self.map.clear_pin();
                    self.show_map = false;
                    self.recent = self.log.recent(5).unwrap_or_default();
                } else if let Err(e) = &outcome {
                    self.status = format!("❌ {} — your report was kept; try again.", e);
                }

                submit::apply_submission_outcome(&mut self.draft, &outcome);
                Task::none()
            }
        }
    }

    /// Fan out the intake pipeline for a freshly acquired image
    ///
    /// Location resolution and classification start together and settle
    /// independently, in either order.
    fn start_intake(&mut self, resource: ImageResource) -> Task<Message> {
        self.preview = Some(iced::widget::image::Handle::from_bytes(
            resource.bytes.to_vec(),
        ));
        self.show_map = false;
        self.map.clear_pin();
        self.draft.set_image(resource.clone());
        self.status = "🔍 Resolving location and identifying the issue...".into();

        let locator = Arc::clone(&self.locator);
        let device_timeout = self.config.geolocation_timeout();
        let location_image = resource.clone();
        let locate = Task::perform(
            async move { resolver::resolve(&location_image, locator, device_timeout).await },
            Message::LocationSettled,
        );

        let models_dir = self.config.resolved_models_dir();
        let classify_task = Task::perform(
            async move {
                classify::classify_image(&resource, models_dir)
                    .await
                    .map_err(|e| e.to_string())
            },
            Message::ClassificationSettled,
        );

        Task::batch([locate, classify_task])
    }

    /// Pull the current frame off the live stream for the capture view
    fn refresh_camera_preview(&mut self) {
        if let Some(stream) = self.camera_stream.as_mut() {
            if !stream.is_live() {
                // A stream its backend already stopped cannot serve frames
                self.camera_stream = None;
                self.camera_preview = None;
                return;
            }
            match stream.grab_frame() {
                Ok(frame) => {
                    let (width, height) = frame.dimensions();
                    let rgba = image::DynamicImage::ImageRgb8(frame).into_rgba8().into_raw();
                    self.camera_preview =
                        Some(iced::widget::image::Handle::from_rgba(width, height, rgba));
                }
                Err(e) => {
                    self.status = format!("⚠️  {}", e);
                    self.camera_stream = None;
                    self.camera_preview = None;
                }
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let mut content: Column<Message> = column![text("Report a Civic Issue").size(36)]
            .spacing(16)
            .padding(32)
            .align_x(Alignment::Center);

        // Photo section
        if let Some(preview) = &self.preview {
            content = content.push(
                iced::widget::image(preview.clone())
                    .width(Length::Fixed(420.0))
                    .height(Length::Fixed(280.0)),
            );
            content = content.push(button("Remove photo").on_press(Message::RemoveImage));
        } else if let Some(stream) = &self.camera_stream {
            content = content.push(text(format!("Live camera ({:?})", stream.facing())).size(14));
            if let Some(frame) = &self.camera_preview {
                content = content.push(
                    iced::widget::image(frame.clone())
                        .width(Length::Fixed(420.0))
                        .height(Length::Fixed(280.0)),
                );
            }
            content = content.push(
                row![
                    button("Capture").on_press(Message::CapturePhoto),
                    button("Next frame").on_press(Message::NextFrame),
                    button("Flip camera").on_press(Message::ToggleFacing),
                    button("Close").on_press(Message::CloseCamera),
                ]
                .spacing(12),
            );
        } else {
            content = content.push(
                row![
                    button("Choose photo").on_press(Message::PickImage).padding(10),
                    button("Use camera").on_press(Message::OpenCamera).padding(10),
                ]
                .spacing(12),
            );
        }

        // Location section
        if let Some(location) = &self.draft.location {
            content = content.push(
                text(format!(
                    "Location: {:.6}, {:.6} ({})",
                    location.coordinate.lat,
                    location.coordinate.lng,
                    location.provenance.as_str()
                ))
                .size(14),
            );
        }

        if self.show_map {
            content = content.push(text("Click the map to drop a pin").size(14));
            content = content.push(
                canvas(self.map.clone())
                    .width(Length::Fixed(420.0))
                    .height(Length::Fixed(300.0)),
            );

            let confirm = button("Confirm location");
            content = content.push(if self.map.pin().is_some() {
                confirm.on_press(Message::ConfirmPin)
            } else {
                confirm
            });
        }

        // Classification section
        if let Some(classification) = &self.draft.classification {
            content = content.push(
                text(format!(
                    "Identified issue: {} ({:.0}%)",
                    classify::labels::display_name(&classification.label),
                    classification.confidence * 100.0
                ))
                .size(14),
            );
        }

        // Details
        content = content.push(
            text_input("Describe the issue...", &self.draft.description)
                .on_input(Message::DescriptionChanged)
                .width(Length::Fixed(420.0))
                .padding(8),
        );
        content = content.push(pick_list(
            &Urgency::ALL[..],
            Some(self.draft.urgency),
            Message::UrgencyPicked,
        ));
        content = content.push(
            text_input("Contact (optional)", &self.draft.contact)
                .on_input(Message::ContactChanged)
                .width(Length::Fixed(420.0))
                .padding(8),
        );

        // Submit
        let submit = button(if self.submitting { "Submitting..." } else { "Submit report" })
            .padding(10);
        content = content.push(if self.draft.can_submit() && !self.submitting {
            submit.on_press(Message::Submit)
        } else {
            submit
        });

        content = content.push(text(&self.status).size(16));

        // Recent reports
        if !self.recent.is_empty() {
            content = content.push(text("My recent reports").size(20));
            for report in &self.recent {
                content = content.push(
                    text(format!(
                        "{} — {} ({}, {})",
                        report.report_id,
                        classify::labels::display_name(&report.label),
                        report.urgency,
                        report.status
                    ))
                    .size(13),
                );
            }
        }

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn main() -> iced::Result {
    iced::application(
        "Civic Reporter",
        CivicReporter::update,
        CivicReporter::view,
    )
    .theme(CivicReporter::theme)
    .centered()
    .run_with(CivicReporter::new)
}
