// SPDX-License-Identifier: GPL-3.0-only

//! Orchestration of the external view synthesis renderer
//!
//! A [`RenderJob`] is built once per run from the form (or the command line),
//! checked by [`validator`], written into the renderer configuration by
//! [`config_patch`] and executed side by side by [`invoker`].
//!
//! The renderer synthesizes views between two base cameras at view numbers
//! 0 and 1. Right-side views fan out from the first base view, left-side
//! views fan back from the second one.

pub mod camera_params;
pub mod config_patch;
pub mod invoker;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub use invoker::{RenderInvoker, RenderReport, RendererSettings, RunPhase, RunTicket, SideOutcome};
pub use validator::{check, check_views};

/// Which half of the output view fan a renderer pass produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Right,
    Left,
}

impl Side {
    /// Render order used for a job
    pub const ALL: [Side; 2] = [Side::Right, Side::Left];

    /// Lowercase name used in file names and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Right => "right",
            Side::Left => "left",
        }
    }

    /// Number of views the job requests on this side
    pub fn view_count(&self, job: &RenderJob) -> u32 {
        match self {
            Side::Right => job.views.right,
            Side::Left => job.views.left,
        }
    }

    /// The renderer's `start : step : stop` view number triple for this side
    pub fn synth_view_numbers(&self, views: &ViewLayout) -> String {
        let spacing = views.spacing;
        let (start, step, stop) = match self {
            Side::Right => (spacing, spacing, spacing * (f64::from(views.right) + 0.5)),
            Side::Left => (1.0, -spacing, 1.0 - spacing * f64::from(views.left)),
        };
        format!(
            "{} : {} : {}",
            format_view_number(start),
            format_view_number(step),
            format_view_number(stop)
        )
    }

    /// Base name for synthesized output files; the renderer expands `$`
    pub fn output_base_name(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("synth_{}$.yuv", self.as_str()))
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested views and the spacing between neighbouring views
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewLayout {
    pub total: u32,
    pub left: u32,
    pub right: u32,
    /// Normalized distance between adjacent synthesized views
    pub spacing: f64,
}

/// Input video geometry and the frame window to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    /// Frames to render (0 lets the renderer process the whole input)
    pub frames: u32,
    /// Frames to skip at the start of the input
    pub skips: u32,
}

/// Pinhole camera parameters of the source camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub focal_length: f64,
    /// Horizontal principal point shift
    pub camera_shift: f64,
    pub z_near: f64,
    pub z_far: f64,
}

/// Everything one renderer run needs
///
/// Built once, immediately before the run, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderJob {
    pub texture_file: PathBuf,
    pub depth_file: PathBuf,
    pub camera_file: PathBuf,
    pub output_dir: PathBuf,
    pub views: ViewLayout,
    pub geometry: FrameGeometry,
    pub intrinsics: CameraIntrinsics,
}

impl RenderJob {
    /// The same job with every path made absolute against the current directory
    ///
    /// The renderer runs in its own working directory, so relative paths would
    /// resolve somewhere else.
    pub fn into_absolute(self) -> Self {
        Self {
            texture_file: absolute_path(&self.texture_file),
            depth_file: absolute_path(&self.depth_file),
            camera_file: absolute_path(&self.camera_file),
            output_dir: absolute_path(&self.output_dir),
            ..self
        }
    }

    /// Sides that have at least one view, in render order
    pub fn sides(&self) -> Vec<Side> {
        Side::ALL
            .into_iter()
            .filter(|side| side.view_count(self) > 0)
            .collect()
    }
}

/// `path` made absolute against the current directory, without touching the
/// file system; returned unchanged when that is not possible
pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Format a view number the way renderer configs are written by hand
///
/// Rounds to six decimals and strips trailing zeros so binary noise such as
/// `0.07 * 14.5 = 1.0150000000000001` is written as `1.015`.
pub fn format_view_number(value: f64) -> String {
    let formatted = format!("{:.6}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}
