/// Widgets for the collapsed panel: heading, prompt row and the
/// result card that swaps between hint, progress and picture.

use iced::mouse::Interaction;
use iced::widget::{
    button, column, container, horizontal_space, image, mouse_area, progress_bar, row, text,
    text_input,
};
use iced::{Alignment, ContentFit, Element, Length};

use crate::state::request::RequestState;
use crate::{DisplayedImage, ImageDisplay, Message};

/// Heading and tagline above the prompt row
pub fn heading<'a>() -> Element<'a, Message> {
    column![
        text("What do you want to create?").size(38),
        text("Describe it below and generate an image with AI.").size(16),
    ]
    .spacing(8)
    .width(Length::Fill)
    .align_x(Alignment::Center)
    .into()
}

/// Prompt input plus the generate button.
///
/// The input stays editable while a request runs; edits only shape the
/// next attempt, and a submit fired mid-flight is dropped in `update`.
/// Only the button greys out. Enter inside the input submits, same as
/// the button.
pub fn prompt_row(prompt: &str, busy: bool) -> Element<'_, Message> {
    let input = text_input("Describe the image you want...", prompt)
        .padding(12)
        .size(16)
        .on_input(Message::PromptChanged)
        .on_submit(Message::Submit);

    let can_submit = !busy && !prompt.trim().is_empty();
    let label = if busy { "Generating..." } else { "✨ Generate" };
    let generate = button(text(label).size(16))
        .padding([12, 24])
        .on_press_maybe(can_submit.then_some(Message::Submit));

    row![input, generate]
        .spacing(12)
        .align_y(Alignment::Center)
        .into()
}

/// The area below the prompt: a hint when idle, the progress bar while
/// loading, the picture (or a broken-image stand-in) once ready
pub fn result_card<'a>(
    request: &'a RequestState,
    display: &'a ImageDisplay,
) -> Element<'a, Message> {
    let inner: Element<'a, Message> = match request {
        RequestState::Idle => idle_card(),
        RequestState::Loading { progress } => loading_card(*progress),
        RequestState::Ready { .. } => match display {
            ImageDisplay::Visible(picture) => picture_card(picture),
            ImageDisplay::Broken => broken_card(),
            _ => text("Loading image...").size(14).into(),
        },
    };

    container(inner)
        .width(Length::Fill)
        .height(Length::Fixed(420.0))
        .center_x(Length::Fill)
        .center_y(Length::Fixed(420.0))
        .into()
}

fn idle_card<'a>() -> Element<'a, Message> {
    column![
        text("🖼️").size(52),
        text("Describe an image above and press Generate.").size(16),
    ]
    .spacing(12)
    .align_x(Alignment::Center)
    .into()
}

fn loading_card<'a>(progress: u8) -> Element<'a, Message> {
    column![
        progress_bar(0.0..=100.0, f32::from(progress)),
        text(format!("Generating... {progress}%")).size(14),
    ]
    .spacing(12)
    .align_x(Alignment::Center)
    .into()
}

/// The generated picture; clicking it expands to fullscreen
fn picture_card<'a>(picture: &DisplayedImage) -> Element<'a, Message> {
    let viewer = mouse_area(
        image(picture.handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fixed(340.0)),
    )
    .interaction(Interaction::Pointer)
    .on_press(Message::ToggleExpand);

    let actions = row![
        text(format!("{}×{} px", picture.width, picture.height)).size(13),
        horizontal_space(),
        button(text("⬇ Download").size(14))
            .padding([8, 16])
            .on_press(Message::Download),
    ]
    .align_y(Alignment::Center)
    .width(Length::Fill);

    column![viewer, actions].spacing(12).into()
}

fn broken_card<'a>() -> Element<'a, Message> {
    column![
        text("🖼️").size(52),
        text("The image could not be loaded.").size(16),
    ]
    .spacing(12)
    .align_x(Alignment::Center)
    .into()
}
