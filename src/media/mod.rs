/// Media acquisition module
///
/// This module obtains the single issue photo a report is built around:
/// - File-picker intake with format sniffing (loader.rs)
/// - Camera capability, live streams and frame freezing (capture.rs)

pub mod capture;
pub mod loader;
