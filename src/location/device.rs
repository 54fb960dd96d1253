/// Device geolocation capability
///
/// Second strategy of the resolver: a one-shot position fix from whatever
/// the host environment provides. The trait is the seam a real hardware or
/// OS-service backend would implement; the shipped implementations are a
/// configured fixed position (kiosk installs know where they stand) and an
/// always-unavailable provider for hosts with no location source at all.
///
/// `locate` may block; the resolver runs it on a blocking task and bounds it
/// with a timeout, so a hung provider can never stall the fallback to the
/// manual map pin.

use crate::state::data::Coordinate;

/// Why a device fix did not produce a coordinate
///
/// All of these mean the same thing to the resolver: fall through to the
/// next strategy. A permission prompt dismissed without an explicit deny
/// surfaces as `Unavailable`, which is treated no differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoError {
    PermissionDenied,
    Unavailable,
    TimedOut,
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            GeoError::PermissionDenied => "permission denied",
            GeoError::Unavailable => "no location source available",
            GeoError::TimedOut => "fix timed out",
        };
        f.write_str(reason)
    }
}

/// One-shot position source
pub trait GeolocationProvider: Send + Sync {
    /// Request a single position fix. May block up to the resolver's timeout.
    fn locate(&self) -> Result<Coordinate, GeoError>;
}

/// Provider with a configured, fixed position
///
/// Used for kiosk installs (ward-office terminals) where the device location
/// is known at setup time.
pub struct FixedLocator {
    position: Coordinate,
}

impl FixedLocator {
    pub fn new(position: Coordinate) -> Self {
        Self { position }
    }
}

impl GeolocationProvider for FixedLocator {
    fn locate(&self) -> Result<Coordinate, GeoError> {
        Ok(self.position)
    }
}

/// Provider for hosts without any location source
pub struct UnavailableLocator;

impl GeolocationProvider for UnavailableLocator {
    fn locate(&self) -> Result<Coordinate, GeoError> {
        Err(GeoError::Unavailable)
    }
}

#[cfg(test)]
pub mod fakes {
    use super::*;
    use std::time::Duration;

    /// Always succeeds with the given position
    pub struct OkLocator(pub Coordinate);

    impl GeolocationProvider for OkLocator {
        fn locate(&self) -> Result<Coordinate, GeoError> {
            Ok(self.0)
        }
    }

    /// Citizen denied the permission prompt
    pub struct DeniedLocator;

    impl GeolocationProvider for DeniedLocator {
        fn locate(&self) -> Result<Coordinate, GeoError> {
            Err(GeoError::PermissionDenied)
        }
    }

    /// Blocks longer than any reasonable resolver timeout
    pub struct SlowLocator(pub Duration);

    impl GeolocationProvider for SlowLocator {
        fn locate(&self) -> Result<Coordinate, GeoError> {
            std::thread::sleep(self.0);
            Ok(Coordinate::new(0.0, 0.0))
        }
    }
}
