//! # Form View
//!
//! Lays out one row per control: the field name on the left, the checkbox or
//! spin box on the right. Fields the form does not edit are not shown.

use iced::widget::{checkbox, container, row, scrollable, text, Column, Space};
use iced::{Alignment, Element, Length};
use std::collections::HashMap;
use tweak_core::{Control, ControlState, EditorConfig, FormController};

use super::spin_box::spin_box;
use crate::Message;

/// Creates the complete editor view
pub fn create_form_view<'a>(
    form: &'a FormController,
    drafts: &'a HashMap<String, String>,
) -> Element<'a, Message> {
    if form.controls().is_empty() {
        return container(text("No editable fields in this document.").size(16))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into();
    }

    let rows = form
        .controls()
        .iter()
        .map(|control| create_row(control, drafts, form.config()));

    container(scrollable(Column::with_children(rows).spacing(8).padding(15)))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

fn create_row<'a>(
    control: &'a Control,
    drafts: &'a HashMap<String, String>,
    config: &EditorConfig,
) -> Element<'a, Message> {
    let label = text(control.key.as_str()).size(14).width(Length::FillPortion(2));

    let editor: Element<'a, Message> = match control.state {
        ControlState::Toggle(checked) => {
            let key = control.key.clone();
            checkbox("", checked)
                .on_toggle(move |b| Message::Toggled(key.clone(), b))
                .into()
        }
        ControlState::Fractional(_) => spin_box(
            &control.key,
            draft_for(control, drafts),
            format!(
                "{}-{}, step {}",
                config.numeric_min, config.numeric_max, config.float_step
            ),
        ),
        ControlState::Whole(_) => spin_box(
            &control.key,
            draft_for(control, drafts),
            format!(
                "{}-{}, step {}",
                config.numeric_min, config.numeric_max, config.integer_step
            ),
        ),
    };

    row![label, Space::with_width(10), editor]
        .align_y(Alignment::Center)
        .into()
}

fn draft_for<'a>(control: &Control, drafts: &'a HashMap<String, String>) -> &'a str {
    drafts.get(&control.key).map(String::as_str).unwrap_or("")
}
