/// Custom widgets
///
/// - Interactive pin map (map.rs)

pub mod map;
