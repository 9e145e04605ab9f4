// SPDX-License-Identifier: MPL-2.0

//! Error types for the view synthesis front-end

use crate::synthesis::Side;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
///
/// Cloneable so that failures can travel back to the UI inside messages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AppError {
    /// Job parameters rejected before the renderer was started
    #[error("Invalid parameters: {0}")]
    Validation(#[from] ValidationError),
    /// Reading or rewriting a renderer configuration file failed
    #[error("Configuration file {}: {message}", .path.display())]
    ConfigIo { path: PathBuf, message: String },
    /// Renderer invocation errors
    #[error("Renderer error: {0}")]
    Render(#[from] RenderError),
    /// A form field could not be turned into a job parameter
    #[error("Invalid value for {field}: {message}")]
    Form { field: String, message: String },
}

/// Parameter validation failures, reported in check order
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Fewer total views than the configured minimum
    #[error("total view count {total} is below the minimum of {minimum}")]
    TotalViewCountInvalid { total: u32, minimum: u32 },
    /// More left views requested than views in total
    #[error("left view count {left} exceeds total view count {total}")]
    LeftViewCountExceedsTotal { left: u32, total: u32 },
    /// The view fan of one side is wider than the normalized baseline, or the
    /// spacing is not a positive finite number
    #[error("{side} views with spacing {spacing} span {span:.3}; spacing must be positive and the span at most 1.0")]
    ViewSpacingOutOfRange { side: Side, spacing: f64, span: f64 },
}

/// Renderer invocation failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// The renderer executable does not exist
    #[error("renderer executable not found at {}", .0.display())]
    ExecutableMissing(PathBuf),
    /// The renderer process could not be started
    #[error("failed to start renderer: {0}")]
    SpawnFailed(String),
    /// The renderer exited unsuccessfully
    #[error("{side} pass exited with {}: {}", describe_exit(.code), last_line(.stderr))]
    ExitStatus {
        side: Side,
        code: Option<i32>,
        stderr: String,
    },
    /// Another run is already in flight
    #[error("a render is already in progress")]
    AlreadyRunning,
    /// Neither side has any views to synthesize
    #[error("no left or right views requested")]
    NothingToRender,
    /// The background task running the renderer went away
    #[error("render task failed: {0}")]
    TaskFailed(String),
}

impl AppError {
    /// Build a ConfigIo error for a file operation on `path`
    pub fn config_io(path: &Path, err: &std::io::Error) -> Self {
        AppError::ConfigIo {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

fn last_line(stderr: &str) -> &str {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no error output")
}
