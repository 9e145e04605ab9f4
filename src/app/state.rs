// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::app::fields::{Field, FormFields};
use crate::config::Config;
use crate::errors::AppError;
use crate::synthesis::{RenderInvoker, RenderJob, RunPhase, RunTicket, Side, SideOutcome};
use cosmic::cosmic_config;
use cosmic::widget::about::About;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Render run state machine
///
/// A run walks its sides one background task at a time. The run ticket is
/// held for as long as the state is `Running`.
#[derive(Debug, Default)]
pub enum RenderState {
    #[default]
    Idle,
    Running {
        ticket: RunTicket,
        job: Arc<RenderJob>,
        /// Sides still to render, in order
        pending: Vec<Side>,
        current: Side,
        completed: Vec<SideOutcome>,
        started: Instant,
    },
    Finished {
        job: Arc<RenderJob>,
        outcomes: Vec<SideOutcome>,
    },
    Failed {
        error: AppError,
        completed: Vec<SideOutcome>,
    },
}

impl RenderState {
    pub fn is_running(&self) -> bool {
        matches!(self, RenderState::Running { .. })
    }

    /// Sides finished and sides in total of the run in flight
    pub fn progress(&self) -> Option<(usize, usize)> {
        match self {
            RenderState::Running {
                pending, completed, ..
            } => Some((completed.len(), completed.len() + pending.len() + 1)),
            _ => None,
        }
    }
}

/// Context drawer pages
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ContextPage {
    #[default]
    About,
    Settings,
}

/// The application model stores app-specific state used to describe its interface and
/// drive its logic.
pub struct AppModel {
    /// Application state which is managed by the COSMIC runtime.
    pub core: cosmic::Core,
    /// Display a context drawer with the designated page if defined.
    pub context_page: ContextPage,
    /// About page widget
    pub about: About,
    /// Configuration data that persists between application runs.
    pub config: Config,
    /// Config handler for saving settings
    pub config_handler: Option<cosmic_config::Config>,
    /// Job form
    pub fields: FormFields,
    /// Renderer process runner, rebuilt when the renderer settings change
    pub invoker: RenderInvoker,
    pub render: RenderState,
    /// Step of the pass in flight, refreshed while rendering
    pub phase: RunPhase,
    /// Outcome of the last configuration cleanup, shown in settings
    pub clean_notice: Option<String>,
    pub theme_options: Vec<String>,
    pub min_total_view_options: Vec<String>,
}

/// Messages emitted by the application and its widgets.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== UI Navigation =====
    /// Open external URL
    LaunchUrl(String),
    /// Toggle context drawer page
    ToggleContextPage(ContextPage),

    // ===== Job Form =====
    FieldChanged(Field, String),
    /// Open the native chooser for a path field
    ChooseFile(Field),
    /// Chooser closed; `None` when cancelled
    FileChosen(Field, Option<PathBuf>),
    ResetForm,

    // ===== Rendering =====
    StartRender,
    SideFinished(Result<SideOutcome, AppError>),
    /// Periodic refresh of the run phase
    Tick,
    OpenOutputDir,
    DismissDialog,

    // ===== Settings =====
    UpdateConfig(Config),
    SetAppTheme(usize),
    ChooseRendererDir,
    RendererDirChosen(Option<PathBuf>),
    SelectMinTotalViews(usize),
    SetEnforceValidation(bool),
    SetGenerateCameraFile(bool),
    CleanRendererConfigs,
    RendererConfigsCleaned(Result<usize, AppError>),
}
