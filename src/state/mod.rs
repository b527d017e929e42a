/// State management module
///
/// This module holds the application state that is independent of the
/// widget tree:
/// - Generation request lifecycle and timing constants (request.rs)

pub mod request;
