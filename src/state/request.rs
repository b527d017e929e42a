use std::time::Duration;

/// How often the simulated progress advances while loading
pub const PROGRESS_TICK: Duration = Duration::from_millis(200);

/// How much each tick adds to the progress percentage
pub const PROGRESS_STEP: u8 = 10;

/// Fixed delay after which a submission is declared complete
///
/// The delay is cosmetic: it has no relationship to the external
/// service actually finishing, it only paces the progress display.
pub const GENERATION_DELAY: Duration = Duration::from_millis(2000);

/// Lifecycle of one generation attempt
///
/// Exactly one variant is active at a time. The image URL is captured
/// when the attempt is submitted but only becomes observable once the
/// state reaches `Ready`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    /// No attempt submitted yet (or the panel was reset)
    #[default]
    Idle,
    /// An attempt is underway; `progress` is the simulated percentage
    Loading { progress: u8 },
    /// The attempt completed; `image_url` points at the result
    Ready { image_url: String },
}

impl RequestState {
    /// Start a fresh attempt at zero progress
    pub fn begin() -> Self {
        Self::Loading { progress: 0 }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Progress percentage to display: the live value while loading,
    /// 100 once ready, nothing while idle
    pub fn progress(&self) -> Option<u8> {
        match self {
            Self::Idle => None,
            Self::Loading { progress } => Some(*progress),
            Self::Ready { .. } => Some(100),
        }
    }

    /// The result URL, present only once the attempt completed
    pub fn image_url(&self) -> Option<&str> {
        match self {
            Self::Ready { image_url } => Some(image_url),
            _ => None,
        }
    }

    /// Advance the simulated progress by one step, clamped at 100.
    ///
    /// Progress never moves backwards. Outside `Loading` this does
    /// nothing.
    pub fn tick(&mut self) {
        if let Self::Loading { progress } = self {
            *progress = (*progress + PROGRESS_STEP).min(100);
        }
    }

    /// Complete the attempt with the URL captured at submission time
    pub fn finish(&mut self, image_url: String) {
        *self = Self::Ready { image_url };
    }
}
