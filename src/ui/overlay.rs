/// Fullscreen presentation of the generated image

use iced::widget::{
    button, column, container, horizontal_space, image, mouse_area, opaque, row, stack, text,
};
use iced::{Color, ContentFit, Element, Length, Theme};

use crate::{DisplayedImage, Message};

/// Lay the fullscreen overlay over `base`.
///
/// The dimmed backdrop swallows interactions with the panel
/// underneath. Clicking the backdrop, the close button, or pressing
/// Escape collapses back to the normal view; download stays available
/// without leaving the overlay.
pub fn expanded_view<'a>(
    base: Element<'a, Message>,
    picture: &DisplayedImage,
) -> Element<'a, Message> {
    let controls = row![
        horizontal_space(),
        button(text("⬇ Download").size(14))
            .padding([8, 16])
            .on_press(Message::Download),
        button(text("✕ Close").size(14))
            .padding([8, 16])
            .on_press(Message::CloseExpanded),
    ]
    .spacing(10)
    .width(Length::Fill);

    let viewer = image(picture.handle.clone())
        .content_fit(ContentFit::Contain)
        .width(Length::Fill)
        .height(Length::Fill);

    let sheet = column![controls, viewer]
        .spacing(16)
        .padding(24)
        .width(Length::Fill)
        .height(Length::Fill);

    let backdrop = container(sheet)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_theme: &Theme| container::Style {
            background: Some(Color { a: 0.92, ..Color::BLACK }.into()),
            ..container::Style::default()
        });

    stack![base, opaque(mouse_area(backdrop).on_press(Message::CloseExpanded))].into()
}
