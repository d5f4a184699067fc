//! # UI Module
//!
//! This module contains all UI components for the tweak parameter editor.

pub mod form_view;
pub mod spin_box;

use tweak_core::ControlState;

/// Text shown inside a numeric control. `None` for toggles.
pub fn format_numeric(state: &ControlState) -> Option<String> {
    match state {
        ControlState::Fractional(v) => Some(format!("{v:.2}")),
        ControlState::Whole(i) => Some(i.to_string()),
        ControlState::Toggle(_) => None,
    }
}

/// Number typed into a numeric control. Text that does not parse, and the
/// non-finite spellings `f64` accepts ("nan", "inf"), yield `None`.
pub fn parse_draft(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
