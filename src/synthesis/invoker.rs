// SPDX-License-Identifier: GPL-3.0-only

//! Renderer process invocation
//!
//! Each side of a job is one renderer pass: inject the inputs into the
//! side's configuration file, run the renderer to completion, then strip the
//! injected lines again. Cleanup runs whatever the renderer's exit status.

use super::config_patch::{append_input_lines, remove_injected_lines};
use super::{RenderJob, Side, absolute_path, camera_params};
use crate::constants::{config_keys, renderer_flags, renderer_layout};
use crate::errors::{AppResult, RenderError};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Where the renderer lives and which files it reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererSettings {
    /// Working directory of the renderer process
    pub working_dir: PathBuf,
    pub executable: PathBuf,
    pub right_config: PathBuf,
    pub left_config: PathBuf,
    /// When set, a camera parameter file is generated here from the job's
    /// intrinsics and replaces the job's camera file
    pub generated_camera_file: Option<PathBuf>,
}

impl RendererSettings {
    /// Settings for the standard layout of a renderer installation
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let working_dir = absolute_path(dir.as_ref());
        Self {
            executable: working_dir.join(renderer_layout::EXECUTABLE),
            right_config: working_dir.join(renderer_layout::RIGHT_RENDER_CONFIG),
            left_config: working_dir.join(renderer_layout::LEFT_RENDER_CONFIG),
            generated_camera_file: None,
            working_dir,
        }
    }

    /// The same settings with every path made absolute
    ///
    /// The executable and configuration paths are handed to a process running
    /// in `working_dir`, so they must not depend on the caller's directory.
    pub fn into_absolute(self) -> Self {
        Self {
            working_dir: absolute_path(&self.working_dir),
            executable: absolute_path(&self.executable),
            right_config: absolute_path(&self.right_config),
            left_config: absolute_path(&self.left_config),
            generated_camera_file: self.generated_camera_file.as_deref().map(absolute_path),
        }
    }

    /// Configuration file used for one side
    pub fn config_for(&self, side: Side) -> &Path {
        match side {
            Side::Right => &self.right_config,
            Side::Left => &self.left_config,
        }
    }
}

/// Step of a renderer pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    #[default]
    Idle,
    InjectingConfig,
    Invoking,
    CleaningUp,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Idle => "idle",
            RunPhase::InjectingConfig => "injecting-config",
            RunPhase::Invoking => "invoking",
            RunPhase::CleaningUp => "cleaning-up",
        }
    }
}

/// Result of one successful renderer pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideOutcome {
    pub side: Side,
    pub exit_code: Option<i32>,
    /// Captured standard error, usually empty on success
    pub stderr: String,
    pub elapsed: Duration,
}

/// Result of a complete run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderReport {
    pub job: RenderJob,
    pub outcomes: Vec<SideOutcome>,
}

impl RenderReport {
    pub fn elapsed(&self) -> Duration {
        self.outcomes.iter().map(|o| o.elapsed).sum()
    }
}

/// Proof that the holder owns the invoker for the duration of a run
///
/// Dropping the ticket makes the invoker available again.
#[derive(Debug)]
pub struct RunTicket {
    busy: Arc<AtomicBool>,
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Runs the external renderer for render jobs
///
/// Clones share the run ticket and phase, so a clone handed to a background
/// task still refuses concurrent runs.
#[derive(Debug, Clone)]
pub struct RenderInvoker {
    settings: Arc<RendererSettings>,
    busy: Arc<AtomicBool>,
    phase: Arc<Mutex<RunPhase>>,
}

impl RenderInvoker {
    pub fn new(settings: RendererSettings) -> Self {
        Self {
            settings: Arc::new(settings.into_absolute()),
            busy: Arc::new(AtomicBool::new(false)),
            phase: Arc::new(Mutex::new(RunPhase::Idle)),
        }
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    /// Current step of the pass in flight
    pub fn phase(&self) -> RunPhase {
        self.phase.lock().map(|phase| *phase).unwrap_or_default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claim the invoker for a run
    pub fn try_begin(&self) -> Result<RunTicket, RenderError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RenderError::AlreadyRunning)?;
        Ok(RunTicket {
            busy: Arc::clone(&self.busy),
        })
    }

    /// Run every side of the job that has views, right first
    ///
    /// Stops at the first failing side.
    pub fn run(&self, job: &RenderJob) -> AppResult<RenderReport> {
        let _ticket = self.try_begin()?;

        let sides = job.sides();
        if sides.is_empty() {
            return Err(RenderError::NothingToRender.into());
        }

        let mut outcomes = Vec::with_capacity(sides.len());
        for side in sides {
            outcomes.push(self.run_side(job, side)?);
        }

        info!(passes = outcomes.len(), "Render finished");
        Ok(RenderReport {
            job: job.clone(),
            outcomes,
        })
    }

    /// Run a single renderer pass
    ///
    /// Callers driving sides one at a time hold a [`RunTicket`] across them.
    pub fn run_side(&self, job: &RenderJob, side: Side) -> AppResult<SideOutcome> {
        let config = self.settings.config_for(side);

        self.set_phase(RunPhase::InjectingConfig);
        let prepared = self
            .camera_file(job)
            .and_then(|camera| Ok((camera, append_input_lines(config, job, side)?)));

        let (camera, patch) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                self.set_phase(RunPhase::CleaningUp);
                if config.exists()
                    && let Err(cleanup_err) = remove_injected_lines(config, &config_keys::INJECTED)
                {
                    warn!(error = %cleanup_err, "Cleanup after failed injection also failed");
                }
                self.set_phase(RunPhase::Idle);
                return Err(err);
            }
        };

        self.set_phase(RunPhase::Invoking);
        let result = self.invoke(job, side, config, &camera);

        self.set_phase(RunPhase::CleaningUp);
        let cleanup = patch.revert();
        self.set_phase(RunPhase::Idle);

        match (result, cleanup) {
            (Ok(outcome), Ok(_)) => Ok(outcome),
            (Ok(_), Err(cleanup_err)) => Err(cleanup_err),
            (Err(err), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    warn!(error = %cleanup_err, "Cleanup after failed pass also failed");
                }
                Err(err)
            }
        }
    }

    /// Strip injected lines left behind in both configuration files
    ///
    /// Missing files are skipped. Refused while a run holds the ticket.
    pub fn clean_configs(&self) -> AppResult<usize> {
        let _ticket = self.try_begin()?;

        let mut removed = 0;
        for side in Side::ALL {
            let config = self.settings.config_for(side);
            if !config.exists() {
                debug!(path = %config.display(), "Configuration file not present, skipping");
                continue;
            }
            removed += remove_injected_lines(config, &config_keys::INJECTED)?;
        }
        info!(removed, "Renderer configurations cleaned");
        Ok(removed)
    }

    /// Camera parameter file passed to the renderer, generating it if configured
    fn camera_file(&self, job: &RenderJob) -> AppResult<PathBuf> {
        match &self.settings.generated_camera_file {
            Some(path) => {
                camera_params::write(path, &job.intrinsics, &job.geometry)?;
                Ok(path.clone())
            }
            None => Ok(job.camera_file.clone()),
        }
    }

    fn invoke(&self, job: &RenderJob, side: Side, config: &Path, camera: &Path) -> AppResult<SideOutcome> {
        let executable = &self.settings.executable;
        if !executable.is_file() {
            return Err(RenderError::ExecutableMissing(executable.clone()).into());
        }

        let args = renderer_args(job, config, camera);
        info!(
            executable = %executable.display(),
            %side,
            args = ?args,
            "Starting renderer"
        );

        let started = Instant::now();
        let output = Command::new(executable)
            .args(&args)
            .current_dir(&self.settings.working_dir)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => RenderError::ExecutableMissing(executable.clone()),
                _ => RenderError::SpawnFailed(e.to_string()),
            })?;
        let elapsed = started.elapsed();

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.is_empty() {
            debug!(%side, stdout = %stdout.trim_end(), "Renderer output");
        }
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code();

        if !output.status.success() {
            warn!(%side, ?exit_code, stderr = %stderr.trim_end(), "Renderer failed");
            return Err(RenderError::ExitStatus {
                side,
                code: exit_code,
                stderr,
            }
            .into());
        }

        info!(%side, elapsed_ms = elapsed.as_millis() as u64, "Renderer pass complete");
        Ok(SideOutcome {
            side,
            exit_code,
            stderr,
            elapsed,
        })
    }

    fn set_phase(&self, next: RunPhase) {
        if let Ok(mut phase) = self.phase.lock() {
            info!(from = phase.as_str(), to = next.as_str(), "Run phase");
            *phase = next;
        }
    }
}

/// Command line arguments for one renderer pass
pub fn renderer_args(job: &RenderJob, config: &Path, camera: &Path) -> Vec<OsString> {
    let geometry = &job.geometry;
    vec![
        renderer_flags::CONFIG.into(),
        config.into(),
        renderer_flags::CAMERA_PARAMETERS.into(),
        camera.into(),
        renderer_flags::WIDTH.into(),
        geometry.width.to_string().into(),
        renderer_flags::HEIGHT.into(),
        geometry.height.to_string().into(),
        renderer_flags::FRAMES.into(),
        geometry.frames.to_string().into(),
        renderer_flags::SKIPS.into(),
        geometry.skips.to_string().into(),
    ]
}
