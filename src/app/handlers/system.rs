// SPDX-License-Identifier: GPL-3.0-only

//! System handlers
//!
//! Handles navigation, settings and renderer configuration recovery.

use crate::app::state::{AppModel, ContextPage, Message};
use crate::config::AppTheme;
use crate::constants::limits;
use crate::errors::{AppError, RenderError};
use crate::fl;
use crate::synthesis::RenderInvoker;
use cosmic::Task;
use cosmic::cosmic_config::CosmicConfigEntry;
use std::path::PathBuf;
use tracing::{error, info, warn};

impl AppModel {
    // =========================================================================
    // UI Navigation Handlers
    // =========================================================================

    pub(crate) fn handle_launch_url(&self, url: String) -> Task<cosmic::Action<Message>> {
        if let Err(err) = open::that_detached(&url) {
            error!(url = %url, error = %err, "Failed to open URL");
        }
        Task::none()
    }

    pub(crate) fn handle_toggle_context_page(
        &mut self,
        context_page: ContextPage,
    ) -> Task<cosmic::Action<Message>> {
        if self.context_page == context_page {
            self.core.window.show_context = !self.core.window.show_context;
        } else {
            self.context_page = context_page;
            self.core.window.show_context = true;
        }
        Task::none()
    }

    // =========================================================================
    // Settings Handlers
    // =========================================================================

    pub(crate) fn handle_update_config(
        &mut self,
        config: crate::config::Config,
    ) -> Task<cosmic::Action<Message>> {
        info!("UpdateConfig received");
        self.config = config;
        self.refresh_invoker();
        Task::none()
    }

    /// Rebuild the invoker when the renderer settings changed
    ///
    /// Deferred while a run holds the current invoker's ticket.
    pub(crate) fn refresh_invoker(&mut self) {
        let settings = self.config.renderer_settings();
        if *self.invoker.settings() == settings || self.render.is_running() {
            return;
        }
        info!(
            working_dir = %settings.working_dir.display(),
            "Renderer settings changed"
        );
        self.invoker = RenderInvoker::new(settings);
    }

    fn save_config(&self, what: &str) {
        if let Some(handler) = self.config_handler.as_ref()
            && let Err(err) = self.config.write_entry(handler)
        {
            error!(?err, setting = what, "Failed to save setting");
        }
    }

    pub(crate) fn handle_set_app_theme(&mut self, index: usize) -> Task<cosmic::Action<Message>> {
        let Some(app_theme) = AppTheme::ALL.get(index).copied() else {
            return Task::none();
        };

        info!(?app_theme, "Setting application theme");
        self.config.app_theme = app_theme;
        self.save_config("app_theme");

        cosmic::command::set_theme(app_theme.theme())
    }

    pub(crate) fn handle_choose_renderer_dir(&self) -> Task<cosmic::Action<Message>> {
        let current = self.config.renderer_dir.clone();
        let title = fl!("settings-renderer-dir");
        Task::perform(
            async move {
                let mut dialog = rfd::AsyncFileDialog::new().set_title(title);
                if current.is_dir() {
                    dialog = dialog.set_directory(&current);
                }
                dialog
                    .pick_folder()
                    .await
                    .map(|handle| handle.path().to_path_buf())
            },
            |path| cosmic::Action::App(Message::RendererDirChosen(path)),
        )
    }

    pub(crate) fn handle_renderer_dir_chosen(
        &mut self,
        path: Option<PathBuf>,
    ) -> Task<cosmic::Action<Message>> {
        let Some(path) = path else {
            return Task::none();
        };

        info!(path = %path.display(), "Renderer directory chosen");
        self.config.renderer_dir = path;
        self.save_config("renderer_dir");
        self.refresh_invoker();

        if !self.invoker.settings().executable.is_file() {
            warn!(
                executable = %self.invoker.settings().executable.display(),
                "No renderer executable in the chosen directory"
            );
        }
        Task::none()
    }

    pub(crate) fn handle_select_min_total_views(
        &mut self,
        index: usize,
    ) -> Task<cosmic::Action<Message>> {
        if let Some(minimum) = limits::MIN_TOTAL_VIEW_CHOICES.get(index).copied() {
            info!(minimum, "Setting minimum total views");
            self.config.min_total_views = minimum;
            self.save_config("min_total_views");
        }
        Task::none()
    }

    pub(crate) fn handle_set_enforce_validation(
        &mut self,
        enabled: bool,
    ) -> Task<cosmic::Action<Message>> {
        info!(enabled, "Setting validation enforcement");
        self.config.enforce_validation = enabled;
        self.save_config("enforce_validation");
        Task::none()
    }

    pub(crate) fn handle_set_generate_camera_file(
        &mut self,
        enabled: bool,
    ) -> Task<cosmic::Action<Message>> {
        info!(enabled, "Setting camera file generation");
        self.config.generate_camera_file = enabled;
        self.save_config("generate_camera_file");
        self.refresh_invoker();
        Task::none()
    }

    // =========================================================================
    // Recovery Handlers
    // =========================================================================

    pub(crate) fn handle_clean_renderer_configs(&mut self) -> Task<cosmic::Action<Message>> {
        let invoker = self.invoker.clone();
        self.clean_notice = None;
        Task::perform(
            async move {
                tokio::task::spawn_blocking(move || invoker.clean_configs())
                    .await
                    .unwrap_or_else(|err| Err(RenderError::TaskFailed(err.to_string()).into()))
            },
            |result| cosmic::Action::App(Message::RendererConfigsCleaned(result)),
        )
    }

    pub(crate) fn handle_renderer_configs_cleaned(
        &mut self,
        result: Result<usize, AppError>,
    ) -> Task<cosmic::Action<Message>> {
        self.clean_notice = Some(match result {
            Ok(removed) => fl!("settings-clean-done", count = removed),
            Err(err) => {
                error!(error = %err, "Cleaning renderer configurations failed");
                err.to_string()
            }
        });
        Task::none()
    }
}
