// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function acts as a dispatcher, while specific handlers
//! are implemented in the `handlers` submodules organized by concern.
//!
//! # Handler Modules
//!
//! - `handlers::form`: Field edits and native file choosers
//! - `handlers::render`: Starting runs, side completion, result dialogs
//! - `handlers::system`: Navigation, settings, configuration cleanup

use crate::app::state::{AppModel, Message};
use cosmic::Task;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task<cosmic::Action<Message>> {
        match message {
            // ===== UI Navigation =====
            Message::LaunchUrl(url) => self.handle_launch_url(url),
            Message::ToggleContextPage(page) => self.handle_toggle_context_page(page),

            // ===== Job Form =====
            Message::FieldChanged(field, value) => self.handle_field_changed(field, value),
            Message::ChooseFile(field) => self.handle_choose_file(field),
            Message::FileChosen(field, path) => self.handle_file_chosen(field, path),
            Message::ResetForm => self.handle_reset_form(),

            // ===== Rendering =====
            Message::StartRender => self.handle_start_render(),
            Message::SideFinished(result) => self.handle_side_finished(result),
            Message::Tick => {
                self.phase = self.invoker.phase();
                Task::none()
            }
            Message::OpenOutputDir => self.handle_open_output_dir(),
            Message::DismissDialog => self.handle_dismiss_dialog(),

            // ===== Settings =====
            Message::UpdateConfig(config) => self.handle_update_config(config),
            Message::SetAppTheme(index) => self.handle_set_app_theme(index),
            Message::ChooseRendererDir => self.handle_choose_renderer_dir(),
            Message::RendererDirChosen(path) => self.handle_renderer_dir_chosen(path),
            Message::SelectMinTotalViews(index) => self.handle_select_min_total_views(index),
            Message::SetEnforceValidation(enabled) => self.handle_set_enforce_validation(enabled),
            Message::SetGenerateCameraFile(enabled) => {
                self.handle_set_generate_camera_file(enabled)
            }
            Message::CleanRendererConfigs => self.handle_clean_renderer_configs(),
            Message::RendererConfigsCleaned(result) => self.handle_renderer_configs_cleaned(result),
        }
    }
}
