/// Widget-building module
///
/// View helpers that turn application state into iced elements:
/// - Prompt row, result card and idle/loading/broken cards (panel.rs)
/// - Fullscreen overlay for the expanded image (overlay.rs)

pub mod overlay;
pub mod panel;
