/// Location resolution module
///
/// This module turns an acquired issue photo into a geographic coordinate:
/// - Embedded GPS tag extraction (exif.rs)
/// - Device geolocation capability (device.rs)
/// - The ordered fallback chain and manual pin confirmation (resolver.rs)

pub mod device;
pub mod exif;
pub mod resolver;

#[cfg(test)]
pub mod test_support;
