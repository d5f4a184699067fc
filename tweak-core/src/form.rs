//! # Form Controller
//!
//! Turns the eligible fields of a document into controls and routes every
//! control change through the same pipeline:
//! 1. Write the new value into the document
//! 2. Save the whole document to its file
//! 3. Broadcast the whole document to the peer
//!
//! The controller is headless. The GUI renders `controls()` and feeds user
//! input back through `apply`.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::document::{Document, FieldValue};
use crate::error::FormError;
use crate::sync::Publish;

/// Lifecycle of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// No document loaded yet.
    Uninitialized,
    /// Controls are shown and edits are accepted.
    Editing,
    /// The window was dismissed; nothing is accepted any more.
    Closed,
}

/// What a control currently displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlState {
    /// Checkbox for a boolean field.
    Toggle(bool),
    /// Fractional spin box for a float field.
    Fractional(f64),
    /// Whole-number spin box for an integer field.
    Whole(i64),
}

impl ControlState {
    fn name(&self) -> &'static str {
        match self {
            ControlState::Toggle(_) => "toggle",
            ControlState::Fractional(_) => "fractional spin box",
            ControlState::Whole(_) => "whole spin box",
        }
    }

    fn to_field_value(self) -> FieldValue {
        match self {
            ControlState::Toggle(b) => FieldValue::Boolean(b),
            ControlState::Fractional(f) => FieldValue::Float(f),
            ControlState::Whole(i) => FieldValue::Integer(i),
        }
    }
}

/// One control, tagged with the document key it edits.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub key: String,
    pub state: ControlState,
}

/// User input aimed at a single control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// New checkbox state.
    Checked(bool),
    /// A number typed into a spin box.
    Number(f64),
    /// Spin box up arrow.
    StepUp,
    /// Spin box down arrow.
    StepDown,
}

impl Input {
    fn name(&self) -> &'static str {
        match self {
            Input::Checked(_) => "a checked state",
            Input::Number(_) => "a number",
            Input::StepUp | Input::StepDown => "a step",
        }
    }
}

/// Headless controller for the editor window.
#[derive(Debug)]
pub struct FormController {
    config: EditorConfig,
    state: FormState,
    path: PathBuf,
    document: Document,
    controls: Vec<Control>,
}

impl FormController {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            state: FormState::Uninitialized,
            path: PathBuf::new(),
            document: Document::default(),
            controls: Vec::new(),
        }
    }

    /// Loads the file at `path` and opens the form on it.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), FormError> {
        let path = path.as_ref();
        let document = Document::load(path)?;
        self.open(path.to_path_buf(), document)
    }

    /// Binds the form to a loaded document and builds one control per
    /// eligible field, in document order.
    pub fn open(&mut self, path: PathBuf, document: Document) -> Result<(), FormError> {
        if self.state != FormState::Uninitialized {
            return Err(FormError::AlreadyOpen);
        }

        let controls: Vec<Control> = document
            .fields()
            .map(|field| Control {
                key: field.key.to_string(),
                state: match field.value {
                    FieldValue::Boolean(b) => ControlState::Toggle(b),
                    FieldValue::Float(f) => ControlState::Fractional(self.fit_fractional(f)),
                    FieldValue::Integer(i) => ControlState::Whole(self.fit_whole(i)),
                },
            })
            .collect();

        info!(
            path = %path.display(),
            fields = document.len(),
            controls = controls.len(),
            "form opened"
        );
        self.path = path;
        self.document = document;
        self.controls = controls;
        self.state = FormState::Editing;
        Ok(())
    }

    /// Applies one input to the control bound to `key`.
    ///
    /// When the control's value actually changes, the document is updated,
    /// saved and broadcast, and the committed value is returned. An input that
    /// leaves the value where it was (a step past a bound, the same number
    /// typed again) returns `Ok(None)` and touches nothing.
    ///
    /// A NaN or infinite number is rejected before anything changes.
    ///
    /// A failed save is logged and otherwise ignored: the new value stays in
    /// the document and is still broadcast.
    pub fn apply<P: Publish + ?Sized>(
        &mut self,
        key: &str,
        input: Input,
        sink: &P,
    ) -> Result<Option<FieldValue>, FormError> {
        if self.state != FormState::Editing {
            return Err(FormError::NotEditing);
        }

        let index = self
            .controls
            .iter()
            .position(|c| c.key == key)
            .ok_or_else(|| FormError::UnknownControl(key.to_string()))?;
        if let Input::Number(v) = input {
            if !v.is_finite() {
                return Err(FormError::NonFinite(key.to_string()));
            }
        }
        let current = self.controls[index].state;
        let next = self.next_state(key, current, input)?;
        if next == current {
            debug!(key, "input left the value unchanged");
            return Ok(None);
        }

        let value = next.to_field_value();
        self.document.set_field(key, value)?;
        self.controls[index].state = next;

        if let Err(e) = self.document.save(&self.path) {
            warn!("save failed, keeping the edit in memory: {e}");
        }
        sink.broadcast(&self.document);
        debug!(key, ?value, "field committed");
        Ok(Some(value))
    }

    /// Stops accepting edits. The owner closes the sync channel.
    pub fn close(&mut self) {
        if self.state != FormState::Closed {
            info!("form closed");
            self.state = FormState::Closed;
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control(&self, key: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.key == key)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    fn next_state(
        &self,
        key: &str,
        current: ControlState,
        input: Input,
    ) -> Result<ControlState, FormError> {
        let step = self.config.float_step;
        let whole_step = self.config.integer_step;
        let next = match (current, input) {
            (ControlState::Toggle(_), Input::Checked(b)) => ControlState::Toggle(b),
            (ControlState::Fractional(_), Input::Number(v)) => {
                ControlState::Fractional(self.fit_fractional(v))
            }
            (ControlState::Fractional(v), Input::StepUp) => {
                ControlState::Fractional(self.fit_fractional(v + step))
            }
            (ControlState::Fractional(v), Input::StepDown) => {
                ControlState::Fractional(self.fit_fractional(v - step))
            }
            (ControlState::Whole(_), Input::Number(v)) => {
                ControlState::Whole(self.fit_whole_f64(v.round()))
            }
            (ControlState::Whole(i), Input::StepUp) => {
                ControlState::Whole(self.fit_whole(i.saturating_add(whole_step)))
            }
            (ControlState::Whole(i), Input::StepDown) => {
                ControlState::Whole(self.fit_whole(i.saturating_sub(whole_step)))
            }
            (state, input) => {
                return Err(FormError::InputMismatch {
                    key: key.to_string(),
                    control: state.name(),
                    input: input.name(),
                });
            }
        };
        Ok(next)
    }

    /// Rounds to the configured decimals, then clamps into range.
    fn fit_fractional(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.config.float_decimals as i32);
        let rounded = (value * scale).round() / scale;
        if rounded.is_nan() {
            return self.config.numeric_min;
        }
        let clamped = rounded.clamp(self.config.numeric_min, self.config.numeric_max);
        // -0.0 would be written to disk as "-0.0"
        if clamped == 0.0 { 0.0 } else { clamped }
    }

    fn fit_whole(&self, value: i64) -> i64 {
        let (min, max) = self.whole_bounds();
        value.clamp(min, max)
    }

    fn fit_whole_f64(&self, value: f64) -> i64 {
        let (min, max) = self.whole_bounds();
        if value.is_nan() {
            return min;
        }
        value.clamp(min as f64, max as f64) as i64
    }

    fn whole_bounds(&self) -> (i64, i64) {
        (
            self.config.numeric_min.ceil() as i64,
            self.config.numeric_max.floor() as i64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::fs;

    #[derive(Default)]
    struct Recorder {
        sent: RefCell<Vec<String>>,
    }

    impl Publish for Recorder {
        fn publish(&self, message: String) {
            self.sent.borrow_mut().push(message);
        }
    }

    fn open_form(dir: &tempfile::TempDir, content: &str) -> (FormController, PathBuf) {
        let path = dir.path().join("params.json");
        fs::write(&path, content).unwrap();
        let mut form = FormController::new(EditorConfig::default());
        form.load(&path).unwrap();
        (form, path)
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn builds_controls_for_scalar_fields_only() {
        let dir = tempfile::tempdir().unwrap();
        let (form, _) = open_form(&dir, r#"{"speed": 1.5, "enabled": true, "name": "x"}"#);
        assert_eq!(
            form.controls(),
            &[
                Control {
                    key: "speed".into(),
                    state: ControlState::Fractional(1.5)
                },
                Control {
                    key: "enabled".into(),
                    state: ControlState::Toggle(true)
                },
            ]
        );
    }

    #[test]
    fn string_only_document_has_no_controls() {
        let dir = tempfile::tempdir().unwrap();
        let (form, _) = open_form(&dir, r#"{"a": "x", "b": "y"}"#);
        assert!(form.controls().is_empty());
        assert_eq!(form.state(), FormState::Editing);
    }

    #[test]
    fn toggle_saves_and_broadcasts_full_document() {
        let dir = tempfile::tempdir().unwrap();
        let (mut form, path) = open_form(&dir, r#"{"speed": 1.5, "enabled": true, "name": "x"}"#);
        let sink = Recorder::default();

        let committed = form.apply("enabled", Input::Checked(false), &sink).unwrap();
        assert_eq!(committed, Some(FieldValue::Boolean(false)));

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\n    \"speed\": 1.5,\n    \"enabled\": false,\n    \"name\": \"x\"\n}"
        );
        let sent = sink.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            serde_json::from_str::<Value>(&sent[0]).unwrap(),
            json!({"speed": 1.5, "enabled": false, "name": "x"})
        );
    }

    #[test]
    fn key_order_survives_edit() {
        let dir = tempfile::tempdir().unwrap();
        let (mut form, path) = open_form(&dir, r#"{"b":1,"a":2}"#);
        form.apply("a", Input::Number(5.0), &Recorder::default()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n    \"b\": 1,\n    \"a\": 5\n}");
    }

    #[test]
    fn every_change_is_one_save_and_one_broadcast() {
        let dir = tempfile::tempdir().unwrap();
        let (mut form, path) = open_form(&dir, r#"{"n": 10, "f": 0.5}"#);
        let sink = Recorder::default();

        form.apply("n", Input::StepUp, &sink).unwrap();
        assert_eq!(read_json(&path), json!({"n": 11, "f": 0.5}));
        form.apply("f", Input::StepDown, &sink).unwrap();
        assert_eq!(read_json(&path), json!({"n": 11, "f": 0.49}));
        form.apply("n", Input::Number(42.0), &sink).unwrap();
        assert_eq!(read_json(&path), json!({"n": 42, "f": 0.49}));

        let sent = sink.sent.borrow();
        assert_eq!(sent.len(), 3);
        assert_eq!(
            serde_json::from_str::<Value>(&sent[2]).unwrap(),
            json!({"n": 42, "f": 0.49})
        );
    }

    #[test]
    fn out_of_range_numbers_clamp_to_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let (mut form, path) = open_form(&dir, r#"{"n": 10, "f": 2.5}"#);
        let sink = Recorder::default();

        form.apply("n", Input::Number(1000.0), &sink).unwrap();
        form.apply("f", Input::Number(-3.0), &sink).unwrap();
        assert_eq!(read_json(&path), json!({"n": 300, "f": 0.0}));

        let last: Value = serde_json::from_str(&sink.sent.borrow()[1]).unwrap();
        assert_eq!(last, json!({"n": 300, "f": 0.0}));
    }

    #[test]
    fn unchanged_value_commits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut form, path) = open_form(&dir, r#"{"n": 300, "flag": false}"#);
        let before = fs::read_to_string(&path).unwrap();
        let sink = Recorder::default();

        assert_eq!(form.apply("n", Input::StepUp, &sink).unwrap(), None);
        assert_eq!(form.apply("flag", Input::Checked(false), &sink).unwrap(), None);
        assert!(sink.sent.borrow().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn out_of_range_file_values_display_clamped_until_edited() {
        let dir = tempfile::tempdir().unwrap();
        let (mut form, path) = open_form(&dir, r#"{"hi": 512, "lo": -2.5, "other": 1}"#);
        assert_eq!(form.control("hi").unwrap().state, ControlState::Whole(300));
        assert_eq!(form.control("lo").unwrap().state, ControlState::Fractional(0.0));
        assert_eq!(form.document().get("hi"), Some(&json!(512)));

        form.apply("other", Input::StepUp, &Recorder::default()).unwrap();
        assert_eq!(read_json(&path), json!({"hi": 512, "lo": -2.5, "other": 2}));

        form.apply("hi", Input::StepDown, &Recorder::default()).unwrap();
        assert_eq!(read_json(&path)["hi"], json!(299));
    }

    #[test]
    fn fractional_values_keep_two_decimals() {
        let dir = tempfile::tempdir().unwrap();
        let (mut form, _) = open_form(&dir, r#"{"f": 1.23456}"#);
        assert_eq!(form.control("f").unwrap().state, ControlState::Fractional(1.23));

        form.apply("f", Input::Number(2.005001), &Recorder::default()).unwrap();
        assert_eq!(form.document().field("f"), Some(FieldValue::Float(2.01)));
    }

    #[test]
    fn rejects_mismatched_and_unknown_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let (mut form, _) = open_form(&dir, r#"{"flag": true, "n": 1, "name": "x"}"#);
        let sink = Recorder::default();

        assert!(matches!(
            form.apply("flag", Input::StepUp, &sink),
            Err(FormError::InputMismatch { .. })
        ));
        assert!(matches!(
            form.apply("n", Input::Checked(true), &sink),
            Err(FormError::InputMismatch { .. })
        ));
        assert!(matches!(
            form.apply("name", Input::Number(1.0), &sink),
            Err(FormError::UnknownControl(_))
        ));
        assert!(sink.sent.borrow().is_empty());
    }

    #[test]
    fn non_finite_numbers_commit_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (mut form, path) = open_form(&dir, r#"{"n": 42, "f": 7.5}"#);
        let before = fs::read_to_string(&path).unwrap();
        let sink = Recorder::default();

        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                form.apply("n", Input::Number(v), &sink),
                Err(FormError::NonFinite(ref k)) if k == "n"
            ));
            assert!(matches!(
                form.apply("f", Input::Number(v), &sink),
                Err(FormError::NonFinite(ref k)) if k == "f"
            ));
        }
        assert_eq!(form.control("n").unwrap().state, ControlState::Whole(42));
        assert_eq!(form.control("f").unwrap().state, ControlState::Fractional(7.5));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert!(sink.sent.borrow().is_empty());
    }

    #[test]
    fn save_failure_keeps_value_and_still_broadcasts() {
        let dir = tempfile::tempdir().unwrap();
        let mut form = FormController::new(EditorConfig::default());
        let doc = Document::from(match json!({"n": 1}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        });
        let unwritable = dir.path().join("missing-dir").join("params.json");
        form.open(unwritable.clone(), doc).unwrap();
        let sink = Recorder::default();

        form.apply("n", Input::Number(7.0), &sink).unwrap();
        assert_eq!(form.document().field("n"), Some(FieldValue::Integer(7)));
        assert_eq!(sink.sent.borrow().len(), 1);
        assert!(!unwritable.exists());
    }

    #[test]
    fn lifecycle_gates_edits() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Recorder::default();

        let mut fresh = FormController::new(EditorConfig::default());
        assert_eq!(fresh.state(), FormState::Uninitialized);
        assert!(matches!(
            fresh.apply("n", Input::StepUp, &sink),
            Err(FormError::NotEditing)
        ));

        let (mut form, path) = open_form(&dir, r#"{"n": 1}"#);
        assert!(matches!(form.load(&path), Err(FormError::AlreadyOpen)));
        form.close();
        assert_eq!(form.state(), FormState::Closed);
        assert!(matches!(
            form.apply("n", Input::StepUp, &sink),
            Err(FormError::NotEditing)
        ));
        assert!(sink.sent.borrow().is_empty());
    }

    #[test]
    fn missing_file_leaves_form_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let mut form = FormController::new(EditorConfig::default());
        assert!(matches!(form.load(&path), Err(FormError::Document(_))));
        assert_eq!(form.state(), FormState::Uninitialized);
        assert!(!path.exists());
    }
}
