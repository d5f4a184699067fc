//! # Editor Configuration
//!
//! Compiled-in settings shared by the core and the GUI. Nothing here is read
//! from disk, flags or the environment; the values mirror what the parameter
//! peer expects.

use std::time::Duration;

/// Endpoint the parameter peer binds its PAIR socket to.
pub const DEFAULT_ENDPOINT: &str = "ipc:///tmp/tim.ipc";

/// Lower bound for every numeric control.
pub const NUMERIC_MIN: f64 = 0.0;
/// Upper bound for every numeric control.
pub const NUMERIC_MAX: f64 = 300.0;

/// Step used by fractional (float) controls.
pub const FLOAT_STEP: f64 = 0.01;
/// Step used by whole (integer) controls.
pub const INTEGER_STEP: i64 = 1;

/// Number of decimals a fractional control keeps.
pub const FLOAT_DECIMALS: u32 = 2;

/// Indentation used when the document is written back to disk.
pub const SAVE_INDENT: &[u8] = b"    ";

/// Settings the editor runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Sync channel address, `ipc://<path>`.
    pub endpoint: String,
    pub numeric_min: f64,
    pub numeric_max: f64,
    pub float_step: f64,
    pub integer_step: i64,
    pub float_decimals: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            numeric_min: NUMERIC_MIN,
            numeric_max: NUMERIC_MAX,
            float_step: FLOAT_STEP,
            integer_step: INTEGER_STEP,
            float_decimals: FLOAT_DECIMALS,
        }
    }
}

/// How long `close` waits for queued updates to reach a peer that is not
/// reading before the socket is shut down under the writer.
pub const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);
