use iced::keyboard::{self, key::Named, Key, Modifiers};
use iced::widget::image::Handle;
use iced::widget::{column, container, text};
use iced::{event, time, window, Element, Event, Length, Subscription, Task, Theme};
use std::path::PathBuf;

// Declare the application modules
mod api;
mod download;
mod state;
mod ui;

use state::request::{RequestState, GENERATION_DELAY, PROGRESS_TICK};

/// A fetched image prepared for the renderer
#[derive(Debug, Clone)]
struct DisplayedImage {
    handle: Handle,
    width: u32,
    height: u32,
}

/// What the result area currently shows
#[derive(Debug, Clone)]
enum ImageDisplay {
    /// Nothing to show
    None,
    /// The display fetch for the current attempt is in flight
    Fetching,
    /// Decoded and ready to draw
    Visible(DisplayedImage),
    /// The fetch or decode failed; stands in for a broken image
    Broken,
}

/// Main application state
struct PromptStudio {
    /// Prompt text as typed, untrimmed
    prompt: String,
    /// Lifecycle of the current generation attempt
    request: RequestState,
    /// URL for the in-flight attempt, fixed at submission time
    pending_url: Option<String>,
    /// Image shown in the result area
    display: ImageDisplay,
    /// Fullscreen presentation toggle, independent of the request
    expanded: bool,
    /// Counts accepted submissions; results tagged with an older
    /// number belong to a superseded attempt and are dropped
    submission: u64,
    /// Status message to display to the user
    status: String,
    /// Keep download failures off the status line (log them only)
    silent_download_errors: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User edited the prompt text
    PromptChanged(String),
    /// Generate requested (button, Enter in the input, or the shortcut)
    Submit,
    /// Repeating progress timer fired
    ProgressTick,
    /// The fixed generation delay for the tagged submission elapsed
    GenerationElapsed(u64),
    /// Display fetch for the tagged submission finished
    ImageFetched(u64, Result<api::FetchedImage, String>),
    /// User clicked the image
    ToggleExpand,
    /// Escape, the close button, or a backdrop click
    CloseExpanded,
    /// Download requested (button or the shortcut)
    Download,
    /// Save flow finished: the path on success, None when cancelled
    DownloadFinished(Result<Option<PathBuf>, String>),
}

impl PromptStudio {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        log::info!("starting, endpoint {}", api::ENDPOINT);

        (
            PromptStudio {
                prompt: String::new(),
                request: RequestState::Idle,
                pending_url: None,
                display: ImageDisplay::None,
                expanded: false,
                submission: 0,
                status: String::from("Ready."),
                silent_download_errors: false,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PromptChanged(value) => {
                self.prompt = value;
                Task::none()
            }
            Message::Submit => {
                // A second submit while one is running is ignored,
                // same as the disabled generate button.
                if self.prompt.trim().is_empty() || self.request.is_loading() {
                    return Task::none();
                }

                self.submission += 1;
                let id = self.submission;

                // The URL is fixed here, at submission time. Nothing
                // that happens during the delay changes this attempt.
                let url = api::image_url(&self.prompt);
                log::info!("submission {id}: {url}");

                self.pending_url = Some(url);
                self.request = RequestState::begin();
                self.display = ImageDisplay::None;
                self.status = String::from("Generating...");

                // Build the sleep inside the future; the timer driver
                // only exists once the task is polled on the runtime.
                Task::perform(
                    async { tokio::time::sleep(GENERATION_DELAY).await },
                    move |_| Message::GenerationElapsed(id),
                )
            }
            Message::ProgressTick => {
                self.request.tick();
                Task::none()
            }
            Message::GenerationElapsed(id) => {
                if id != self.submission || !self.request.is_loading() {
                    // A timer from a superseded attempt; nothing to
                    // finish.
                    return Task::none();
                }

                let Some(image_url) = self.pending_url.take() else {
                    return Task::none();
                };

                self.request.finish(image_url.clone());
                self.display = ImageDisplay::Fetching;
                self.status = String::from("✅ Generated.");

                Task::perform(api::fetch_image(image_url), move |result| {
                    Message::ImageFetched(id, result.map_err(|e| e.to_string()))
                })
            }
            Message::ImageFetched(id, result) => {
                if id != self.submission {
                    // Result of a superseded attempt; drop it.
                    return Task::none();
                }

                match result {
                    Ok(fetched) => {
                        log::info!("image ready, {}x{} px", fetched.width, fetched.height);
                        self.status = format!(
                            "✅ Image ready ({}×{} px). Click it to expand.",
                            fetched.width, fetched.height
                        );
                        self.display = ImageDisplay::Visible(DisplayedImage {
                            handle: Handle::from_bytes(fetched.bytes),
                            width: fetched.width,
                            height: fetched.height,
                        });
                    }
                    Err(error) => {
                        // The request stays Ready; the broken-image
                        // card is the only visible signal.
                        log::warn!("display fetch failed: {error}");
                        self.display = ImageDisplay::Broken;
                    }
                }

                Task::none()
            }
            Message::ToggleExpand => {
                // Only reachable by clicking a visible image; the
                // guard keeps the flag honest all the same.
                if matches!(self.display, ImageDisplay::Visible(_)) {
                    self.expanded = !self.expanded;
                }
                Task::none()
            }
            Message::CloseExpanded => {
                // Escape with nothing expanded falls through silently
                self.expanded = false;
                Task::none()
            }
            Message::Download => {
                let Some(url) = self.request.image_url() else {
                    // Shortcut fired with no image yet
                    return Task::none();
                };

                let url = url.to_string();
                let file_name = download::file_name_for(&self.prompt);
                log::info!("downloading {url} as {file_name}");
                self.status = String::from("Saving image...");

                Task::perform(download::save_image(url, file_name), |result| {
                    Message::DownloadFinished(result.map_err(|e| e.to_string()))
                })
            }
            Message::DownloadFinished(result) => {
                match result {
                    Ok(Some(path)) => {
                        log::info!("saved to {}", path.display());
                        self.status = format!("✅ Saved to {}.", path.display());
                    }
                    Ok(None) => {
                        self.status = String::from("Save cancelled.");
                    }
                    Err(error) => {
                        // Always logged; kept off the status line when
                        // mirroring the silent behavior.
                        log::error!("download failed: {error}");
                        if !self.silent_download_errors {
                            self.status = format!("⚠️ Download failed: {error}");
                        }
                    }
                }

                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let base = container(
            column![
                ui::panel::heading(),
                ui::panel::prompt_row(&self.prompt, self.request.is_loading()),
                ui::panel::result_card(&self.request, &self.display),
                text(&self.status).size(14),
            ]
            .spacing(24)
            .padding(32)
            .max_width(860.0),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .center_x(Length::Fill);

        if let (true, ImageDisplay::Visible(picture)) = (self.expanded, &self.display) {
            ui::overlay::expanded_view(base.into(), picture)
        } else {
            base.into()
        }
    }

    /// Timers and global shortcuts.
    ///
    /// The progress interval only exists while a request is loading,
    /// so it stops on its own when the state moves on and when the
    /// runtime winds down.
    fn subscription(&self) -> Subscription<Message> {
        let progress = if self.request.is_loading() {
            time::every(PROGRESS_TICK).map(|_| Message::ProgressTick)
        } else {
            Subscription::none()
        };

        Subscription::batch([progress, event::listen_with(filter_event)])
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Feed raw runtime events to the key mapper.
///
/// Capture status is ignored: a focused text input claims most key
/// presses, and the shortcuts must keep working then. A submit the
/// input already fired for the same press is absorbed by the busy
/// guard in `update`.
fn filter_event(event: Event, _status: event::Status, _id: window::Id) -> Option<Message> {
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) => {
            handle_key_press(key, modifiers)
        }
        _ => None,
    }
}

/// Map global key presses to application messages.
///
/// The primary modifier is Ctrl or the platform command key, so the
/// shortcuts behave the same on every OS. Whether the mapped message
/// applies is decided in `update`.
fn handle_key_press(key: Key, modifiers: Modifiers) -> Option<Message> {
    let primary = modifiers.control() || modifiers.logo();

    match key.as_ref() {
        Key::Named(Named::Escape) => Some(Message::CloseExpanded),
        Key::Named(Named::Enter) if primary => Some(Message::Submit),
        Key::Character("s") if primary => Some(Message::Download),
        _ => None,
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application("Prompt Studio", PromptStudio::update, PromptStudio::view)
        .subscription(PromptStudio::subscription)
        .theme(PromptStudio::theme)
        .centered()
        .run_with(PromptStudio::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> PromptStudio {
        PromptStudio::new().0
    }

    /// Drive a prompt through submit and the elapsed timer
    fn ready_app(prompt: &str) -> PromptStudio {
        let mut app = app();
        let _ = app.update(Message::PromptChanged(prompt.to_string()));
        let _ = app.update(Message::Submit);
        let id = app.submission;
        let _ = app.update(Message::GenerationElapsed(id));
        app
    }

    fn sample_picture() -> DisplayedImage {
        DisplayedImage {
            handle: Handle::from_rgba(1, 1, vec![0, 0, 0, 255]),
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_submit_with_blank_prompt_is_ignored() {
        let mut app = app();
        let _ = app.update(Message::PromptChanged("   ".to_string()));
        let _ = app.update(Message::Submit);

        assert_eq!(app.request, RequestState::Idle);
        assert_eq!(app.submission, 0);

        let _ = app.update(Message::PromptChanged(String::new()));
        let _ = app.update(Message::Submit);

        assert_eq!(app.request, RequestState::Idle);
    }

    #[test]
    fn test_submit_starts_loading_at_zero() {
        let mut app = app();
        let _ = app.update(Message::PromptChanged("sunset".to_string()));
        let _ = app.update(Message::Submit);

        assert!(app.request.is_loading());
        assert_eq!(app.request.progress(), Some(0));
        assert_eq!(app.submission, 1);
    }

    #[test]
    fn test_submit_while_loading_is_ignored() {
        let mut app = app();
        let _ = app.update(Message::PromptChanged("sunset".to_string()));
        let _ = app.update(Message::Submit);
        let _ = app.update(Message::ProgressTick);

        let _ = app.update(Message::Submit);

        // Still the first attempt, progress untouched
        assert_eq!(app.submission, 1);
        assert_eq!(app.request.progress(), Some(10));
    }

    #[test]
    fn test_progress_ticks_advance_and_clamp() {
        let mut app = app();
        let _ = app.update(Message::PromptChanged("sunset".to_string()));
        let _ = app.update(Message::Submit);

        let mut last = 0;
        for _ in 0..15 {
            let _ = app.update(Message::ProgressTick);
            let now = app.request.progress().unwrap();
            assert!(now >= last);
            assert!(now <= 100);
            last = now;
        }

        assert_eq!(last, 100);
    }

    #[test]
    fn test_elapsed_completes_and_starts_display_fetch() {
        let app = ready_app("sunset");

        assert!(!app.request.is_loading());
        assert_eq!(app.request.progress(), Some(100));
        assert_eq!(
            app.request.image_url(),
            Some(api::image_url("sunset").as_str())
        );
        assert!(matches!(app.display, ImageDisplay::Fetching));
    }

    #[test]
    fn test_elapsed_uses_url_captured_at_submit() {
        let mut app = app();
        let _ = app.update(Message::PromptChanged("sunset".to_string()));
        let _ = app.update(Message::Submit);

        // The input stays editable mid-flight; the edit lands in the
        // prompt field without changing the running attempt
        let _ = app.update(Message::PromptChanged("volcano".to_string()));
        assert_eq!(app.prompt, "volcano");

        let _ = app.update(Message::GenerationElapsed(1));

        assert_eq!(
            app.request.image_url(),
            Some(api::image_url("sunset").as_str())
        );
    }

    #[test]
    fn test_stale_elapsed_is_ignored() {
        let mut app = ready_app("sunset");
        let _ = app.update(Message::Submit);
        assert_eq!(app.submission, 2);

        // The first attempt's timer fires late
        let _ = app.update(Message::GenerationElapsed(1));

        assert!(app.request.is_loading());
    }

    #[test]
    fn test_elapsed_when_idle_is_ignored() {
        let mut app = app();
        let _ = app.update(Message::GenerationElapsed(0));

        assert_eq!(app.request, RequestState::Idle);
    }

    #[test]
    fn test_image_fetched_shows_picture() {
        let mut app = ready_app("sunset");
        let fetched = api::FetchedImage {
            bytes: vec![1, 2, 3],
            width: 640,
            height: 480,
        };

        let _ = app.update(Message::ImageFetched(1, Ok(fetched)));

        match &app.display {
            ImageDisplay::Visible(picture) => {
                assert_eq!(picture.width, 640);
                assert_eq!(picture.height, 480);
            }
            other => panic!("expected a visible picture, got {other:?}"),
        }
        assert!(app.status.contains("640×480"));
    }

    #[test]
    fn test_image_fetched_failure_marks_broken() {
        let mut app = ready_app("sunset");
        let _ = app.update(Message::ImageFetched(1, Err("boom".to_string())));

        assert!(matches!(app.display, ImageDisplay::Broken));
        // The request itself is still complete
        assert!(app.request.image_url().is_some());
    }

    #[test]
    fn test_stale_image_fetch_is_dropped() {
        let mut app = ready_app("sunset");
        let _ = app.update(Message::Submit);

        let fetched = api::FetchedImage {
            bytes: vec![1, 2, 3],
            width: 640,
            height: 480,
        };
        let _ = app.update(Message::ImageFetched(1, Ok(fetched)));

        // The second attempt is loading; the first attempt's image
        // must not surface
        assert!(matches!(app.display, ImageDisplay::None));
    }

    #[test]
    fn test_toggle_expand_requires_picture() {
        let mut app = app();
        let _ = app.update(Message::ToggleExpand);

        assert!(!app.expanded);
    }

    #[test]
    fn test_toggle_expand_roundtrip() {
        let mut app = app();
        app.display = ImageDisplay::Visible(sample_picture());

        let _ = app.update(Message::ToggleExpand);
        assert!(app.expanded);

        let _ = app.update(Message::ToggleExpand);
        assert!(!app.expanded);
    }

    #[test]
    fn test_escape_without_expansion_is_noop() {
        let mut app = app();
        let status_before = app.status.clone();

        let _ = app.update(Message::CloseExpanded);

        assert!(!app.expanded);
        assert_eq!(app.request, RequestState::Idle);
        assert_eq!(app.status, status_before);
    }

    #[test]
    fn test_escape_collapses_expanded() {
        let mut app = app();
        app.display = ImageDisplay::Visible(sample_picture());
        let _ = app.update(Message::ToggleExpand);
        assert!(app.expanded);

        let _ = app.update(Message::CloseExpanded);

        assert!(!app.expanded);
    }

    #[test]
    fn test_download_without_image_is_ignored() {
        let mut app = app();
        let _ = app.update(Message::Download);

        assert_eq!(app.status, "Ready.");
    }

    #[test]
    fn test_download_finished_reports_saved_path() {
        let mut app = ready_app("sunset");
        let path = PathBuf::from("/tmp/sunset-ai-generated.png");

        let _ = app.update(Message::DownloadFinished(Ok(Some(path))));

        assert!(app.status.contains("Saved to"));
        assert!(app.status.contains("sunset-ai-generated.png"));
    }

    #[test]
    fn test_download_cancelled_is_not_an_error() {
        let mut app = ready_app("sunset");
        let _ = app.update(Message::DownloadFinished(Ok(None)));

        assert_eq!(app.status, "Save cancelled.");
    }

    #[test]
    fn test_download_failure_respects_silent_flag() {
        let mut app = ready_app("sunset");
        let _ = app.update(Message::DownloadFinished(Err("offline".to_string())));
        assert!(app.status.contains("Download failed"));

        let mut app = ready_app("sunset");
        app.silent_download_errors = true;
        let status_before = app.status.clone();
        let _ = app.update(Message::DownloadFinished(Err("offline".to_string())));
        assert_eq!(app.status, status_before);
    }

    #[test]
    fn test_key_shortcuts_map_to_messages() {
        let primary = Modifiers::CTRL;

        assert!(matches!(
            handle_key_press(Key::Named(Named::Enter), primary),
            Some(Message::Submit)
        ));
        assert!(matches!(
            handle_key_press(Key::Named(Named::Enter), Modifiers::LOGO),
            Some(Message::Submit)
        ));
        assert!(matches!(
            handle_key_press(Key::Character("s".into()), primary),
            Some(Message::Download)
        ));
        assert!(matches!(
            handle_key_press(Key::Character("s".into()), Modifiers::LOGO),
            Some(Message::Download)
        ));
        assert!(matches!(
            handle_key_press(Key::Named(Named::Escape), Modifiers::empty()),
            Some(Message::CloseExpanded)
        ));
    }

    #[test]
    fn test_unmatched_keys_map_to_nothing() {
        assert!(handle_key_press(Key::Named(Named::Enter), Modifiers::empty()).is_none());
        assert!(handle_key_press(Key::Character("s".into()), Modifiers::empty()).is_none());
        assert!(handle_key_press(Key::Character("x".into()), Modifiers::CTRL).is_none());
        assert!(handle_key_press(Key::Named(Named::Space), Modifiers::CTRL).is_none());
    }

    #[test]
    fn test_shortcuts_fire_even_when_a_widget_captured_the_key() {
        // A focused input claims the press; the shortcut must survive
        let press = Event::Keyboard(keyboard::Event::KeyPressed {
            key: Key::Character("s".into()),
            modified_key: Key::Character("s".into()),
            physical_key: keyboard::key::Physical::Code(keyboard::key::Code::KeyS),
            location: keyboard::Location::Standard,
            modifiers: Modifiers::CTRL,
            text: None,
        });

        assert!(matches!(
            filter_event(press, event::Status::Captured, window::Id::unique()),
            Some(Message::Download)
        ));
    }

    #[test]
    fn test_non_keyboard_events_map_to_nothing() {
        let entered = Event::Mouse(iced::mouse::Event::CursorEntered);

        assert!(filter_event(entered, event::Status::Ignored, window::Id::unique()).is_none());
    }

    #[test]
    fn test_update_runs_without_async_runtime() {
        // Every arm that spawns background work must build its future
        // lazily, so the whole flow can be driven from a plain test
        let mut app = app();
        let _ = app.update(Message::PromptChanged("sunset".to_string()));
        let _ = app.update(Message::Submit);
        let _ = app.update(Message::ProgressTick);
        let _ = app.update(Message::GenerationElapsed(1));
        let _ = app.update(Message::Download);

        assert!(app.request.image_url().is_some());
        assert_eq!(app.status, "Saving image...");
    }
}
