/// Ordered location resolution
///
/// Strategies are tried strictly in order, each only when the previous one
/// yielded nothing:
///
/// - Tier 1: GPS tags embedded in the image (EXIF)
/// - Tier 2: one-shot device fix, bounded by a timeout
/// - Tier 3: manual map pin — the only tier that needs the citizen to act,
///   and the only one that blocks until they confirm
///
/// Resolution never fails outright; the worst case is "waiting for a pin".
/// The winning strategy is surfaced as provenance, because downstream
/// validation and UI messaging depend on it.

use std::sync::Arc;
use std::time::Duration;

use crate::location::device::GeolocationProvider;
use crate::location::exif;
use crate::state::data::{Coordinate, ImageResource, Provenance, ResolvedLocation};

/// Outcome of running the automatic tiers
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedLocation),
    /// Both automatic tiers came up empty; only an explicit pin confirmation
    /// can complete resolution now
    ManualRequired,
}

/// The fixed strategy order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    ExifTags,
    DeviceFix,
    ManualPin,
}

const STRATEGY_ORDER: [Strategy; 3] = [
    Strategy::ExifTags,
    Strategy::DeviceFix,
    Strategy::ManualPin,
];

/// What a single strategy attempt produced
enum Attempt {
    Found(ResolvedLocation),
    NotFound,
    AwaitUser,
}

/// Run the strategy chain for a freshly acquired image
pub async fn resolve(
    image: &ImageResource,
    locator: Arc<dyn GeolocationProvider>,
    device_timeout: Duration,
) -> Resolution {
    for strategy in STRATEGY_ORDER {
        match attempt(strategy, image, &locator, device_timeout).await {
            Attempt::Found(location) => {
                println!(
                    "📍 Location resolved via {}: {:.6}, {:.6}",
                    location.provenance.as_str(),
                    location.coordinate.lat,
                    location.coordinate.lng,
                );
                return Resolution::Resolved(location);
            }
            Attempt::NotFound => continue,
            Attempt::AwaitUser => return Resolution::ManualRequired,
        }
    }

    // ManualPin always returns AwaitUser, so the loop cannot fall through
    Resolution::ManualRequired
}

async fn attempt(
    strategy: Strategy,
    image: &ImageResource,
    locator: &Arc<dyn GeolocationProvider>,
    device_timeout: Duration,
) -> Attempt {
    match strategy {
        Strategy::ExifTags => {
            // EXIF parsing is CPU-bound and the payload can be large
            let bytes = Arc::clone(&image.bytes);
            let parsed = tokio::task::spawn_blocking(move || exif::gps_from_bytes(&bytes)).await;

            match parsed {
                Ok(Some(coordinate)) => Attempt::Found(ResolvedLocation {
                    coordinate,
                    address: None,
                    provenance: Provenance::Exif,
                }),
                // Malformed metadata or a crashed parse is "not found"
                _ => Attempt::NotFound,
            }
        }

        Strategy::DeviceFix => {
            let locator = Arc::clone(locator);
            let fix = tokio::time::timeout(
                device_timeout,
                tokio::task::spawn_blocking(move || locator.locate()),
            )
            .await;

            match fix {
                Ok(Ok(Ok(coordinate))) => Attempt::Found(ResolvedLocation {
                    coordinate,
                    address: None,
                    provenance: Provenance::Device,
                }),
                Ok(Ok(Err(reason))) => {
                    eprintln!("⚠️  Device geolocation failed: {}", reason);
                    Attempt::NotFound
                }
                Ok(Err(_)) => Attempt::NotFound,
                Err(_) => {
                    eprintln!("⚠️  Device geolocation timed out after {:?}", device_timeout);
                    Attempt::NotFound
                }
            }
        }

        Strategy::ManualPin => Attempt::AwaitUser,
    }
}

/// Complete a manual resolution from an explicit pin confirmation
///
/// The address mirrors what the map shows for the pin, since there is no
/// reverse geocoder in scope.
pub fn confirm_manual_pin(coordinate: Coordinate) -> ResolvedLocation {
    ResolvedLocation {
        address: Some(format!(
            "Location: {:.6}, {:.6}",
            coordinate.lat, coordinate.lng
        )),
        coordinate,
        provenance: Provenance::Manual,
    }
}
