/// Civic issue label set
///
/// Order matches the output layer of the bundled model; index i of the score
/// vector is LABELS[i].

pub const LABELS: &[&str] = &[
    "pothole",
    "garbage_dump",
    "broken_streetlight",
    "blocked_drain",
    "damaged_traffic_sign",
    "water_leak",
    "damaged_sidewalk",
    "other",
];

/// Sentinel emitted when the model's answer was too weak or too ambiguous.
/// A report carrying this label needs the citizen's own description.
pub const UNRESOLVED: &str = "unresolved";

/// Human-readable form for the UI
pub fn display_name(label: &str) -> &str {
    match label {
        "pothole" => "Pothole in road",
        "garbage_dump" => "Garbage accumulation",
        "broken_streetlight" => "Broken streetlight",
        "blocked_drain" => "Blocked drain",
        "damaged_traffic_sign" => "Damaged traffic sign",
        "water_leak" => "Broken water pipe",
        "damaged_sidewalk" => "Damaged sidewalk",
        "other" => "Other issue",
        UNRESOLVED => "Could not identify (please describe)",
        other => other,
    }
}
