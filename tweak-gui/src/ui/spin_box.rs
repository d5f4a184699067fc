//! # Spin Box
//!
//! A numeric entry with step buttons, standing in for a native spin box.
//! The text field commits on every keystroke that parses; the buttons step
//! by the control's own step and are clamped by the form controller.

use iced::widget::{button, row, text, text_input};
use iced::{Alignment, Element, Length};

use crate::Message;

/// Builds the spin box for `key` showing `draft`.
///
/// `hint` is shown as the input placeholder (range and step).
pub fn spin_box<'a>(key: &str, draft: &'a str, hint: String) -> Element<'a, Message> {
    let on_input = {
        let key = key.to_string();
        move |value: String| Message::DraftChanged(key.clone(), value)
    };

    row![
        text_input(&hint, draft)
            .on_input(on_input)
            .width(Length::Fixed(110.0)),
        button(text("-")).on_press(Message::StepDown(key.to_string())),
        button(text("+")).on_press(Message::StepUp(key.to_string())),
    ]
    .spacing(4)
    .align_y(Alignment::Center)
    .into()
}
