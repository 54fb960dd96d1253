/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - The active report draft and its lifecycle (draft.rs)
/// - The local catalog of submitted reports (log.rs)

pub mod data;
pub mod draft;
pub mod log;
