//! # Tweak - Live Parameter Editor
//!
//! A single-window form for adjusting the numeric and boolean parameters of a
//! running process. The process hands over the path of its JSON parameter file
//! on an IPC socket; every change made here is written back to that file and
//! pushed to the process over the same socket.
//!
//! ## Startup
//! 1. Connect to the parameter peer (fatal if nobody is listening)
//! 2. Block until the peer sends the document path
//! 3. Load the document (fatal if it is missing or not a JSON object)
//! 4. Open the window
//!
//! The sync channel lives in the application state and is closed when the
//! window close request arrives, right before the event loop exits.

mod ui;

use anyhow::Context;
use iced::{window, Element, Size, Subscription, Task, Theme};
use std::collections::HashMap;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use tweak_core::{ControlState, EditorConfig, FormController, Input, SyncChannel};
use ui::form_view::create_form_view;

/// Main entry point for the editor.
///
/// Any startup failure is logged and turned into a non-zero exit code before a
/// window is ever shown.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` when it is set and valid, `info` otherwise.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn run() -> anyhow::Result<()> {
    let config = EditorConfig::default();

    let mut channel = SyncChannel::connect(&config.endpoint)
        .with_context(|| format!("connecting to parameter peer at {}", config.endpoint))?;
    let path = channel
        .receive_path()
        .context("waiting for the document path")?;

    let mut form = FormController::new(config);
    form.load(&path)
        .with_context(|| format!("loading document {path}"))?;

    info!("opening editor window");
    iced::application(EditorApp::title, EditorApp::update, EditorApp::view)
        .subscription(EditorApp::subscription)
        .theme(EditorApp::theme)
        .window(window::Settings {
            size: Size::new(360.0, 480.0),
            exit_on_close_request: false,
            ..window::Settings::default()
        })
        .run_with(move || (EditorApp::new(channel, form), Task::none()))?;

    info!("editor finished");
    Ok(())
}

/// Application message types.
#[derive(Debug, Clone)]
pub enum Message {
    /// Checkbox bound to a boolean field changed.
    Toggled(String, bool),
    /// Text of a spin box changed.
    DraftChanged(String, String),
    /// Spin box up arrow.
    StepUp(String),
    /// Spin box down arrow.
    StepDown(String),
    /// The user asked to close the window.
    CloseRequested(window::Id),
}

/// Main application state.
struct EditorApp {
    channel: SyncChannel,
    form: FormController,
    /// Text shown in each numeric control, keyed by field.
    drafts: HashMap<String, String>,
}

impl EditorApp {
    fn new(channel: SyncChannel, form: FormController) -> Self {
        let drafts = form
            .controls()
            .iter()
            .filter_map(|c| ui::format_numeric(&c.state).map(|text| (c.key.clone(), text)))
            .collect();
        Self {
            channel,
            form,
            drafts,
        }
    }

    fn title(&self) -> String {
        let name = self
            .form
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("tweak - {name}")
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        debug!("received message: {:?}", message);

        match message {
            Message::Toggled(key, checked) => {
                self.commit(&key, Input::Checked(checked));
            }
            Message::DraftChanged(key, text) => {
                // Text that does not parse stays on screen and commits nothing.
                let parsed = ui::parse_draft(&text);
                self.drafts.insert(key.clone(), text);
                if let Some(value) = parsed {
                    self.commit(&key, Input::Number(value));
                    if self.displayed_number(&key) != Some(value) {
                        self.resync_draft(&key);
                    }
                }
            }
            Message::StepUp(key) => {
                self.commit(&key, Input::StepUp);
                self.resync_draft(&key);
            }
            Message::StepDown(key) => {
                self.commit(&key, Input::StepDown);
                self.resync_draft(&key);
            }
            Message::CloseRequested(id) => {
                info!(?id, "window close requested");
                self.form.close();
                self.channel.close();
                return iced::exit();
            }
        }
        Task::none()
    }

    /// Runs one input through the form. Failures are logged only.
    fn commit(&mut self, key: &str, input: Input) {
        if let Err(e) = self.form.apply(key, input, &self.channel) {
            warn!("edit of `{key}` rejected: {e}");
        }
    }

    fn displayed_number(&self, key: &str) -> Option<f64> {
        match self.form.control(key)?.state {
            ControlState::Fractional(v) => Some(v),
            ControlState::Whole(i) => Some(i as f64),
            ControlState::Toggle(_) => None,
        }
    }

    fn resync_draft(&mut self, key: &str) {
        if let Some(text) = self.form.control(key).and_then(|c| ui::format_numeric(&c.state)) {
            self.drafts.insert(key.to_string(), text);
        }
    }

    fn view(&self) -> Element<'_, Message> {
        create_form_view(&self.form, &self.drafts)
    }

    fn subscription(&self) -> Subscription<Message> {
        window::close_requests().map(Message::CloseRequested)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}
