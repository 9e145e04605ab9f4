// SPDX-License-Identifier: GPL-3.0-only

//! Job form handlers
//!
//! Handles field edits and the native file and folder choosers.

use crate::app::fields::{Field, FieldKind, FormFields};
use crate::app::state::{AppModel, Message};
use crate::fl;
use cosmic::Task;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

impl AppModel {
    pub(crate) fn handle_field_changed(
        &mut self,
        field: Field,
        value: String,
    ) -> Task<cosmic::Action<Message>> {
        if self.render.is_running() {
            return Task::none();
        }
        self.fields.set(field, value);
        Task::none()
    }

    pub(crate) fn handle_choose_file(&self, field: Field) -> Task<cosmic::Action<Message>> {
        let start_dir = chooser_start_dir(self.fields.value(field));
        let filters = field.filters();
        let kind = field.kind();
        let title = field.label();

        Task::perform(
            async move {
                let mut dialog = rfd::AsyncFileDialog::new().set_title(title);
                if let Some(dir) = start_dir {
                    dialog = dialog.set_directory(dir);
                }
                for (name, extensions) in filters {
                    dialog = dialog.add_filter(*name, *extensions);
                }

                let handle = match kind {
                    FieldKind::Directory => dialog.pick_folder().await,
                    _ => dialog.pick_file().await,
                };
                handle.map(|handle| handle.path().to_path_buf())
            },
            move |path| cosmic::Action::App(Message::FileChosen(field, path)),
        )
    }

    pub(crate) fn handle_file_chosen(
        &mut self,
        field: Field,
        path: Option<PathBuf>,
    ) -> Task<cosmic::Action<Message>> {
        match path {
            Some(path) => {
                info!(?field, path = %path.display(), "Path chosen");
                self.fields.set(field, path.display().to_string());
            }
            None => debug!(?field, "Chooser cancelled"),
        }
        Task::none()
    }

    pub(crate) fn handle_reset_form(&mut self) -> Task<cosmic::Action<Message>> {
        if self.render.is_running() {
            return Task::none();
        }
        info!("Resetting form to defaults");
        self.fields = FormFields::with_defaults(&self.config.default_camera_file());
        Task::none()
    }

    /// Short hint shown under the form when the views do not pass the checks
    pub(crate) fn views_hint(&self) -> Option<String> {
        let views = self.fields.view_layout()?;
        crate::synthesis::check_views(&views, self.config.min_total_views)
            .err()
            .map(|err| {
                if self.config.enforce_validation {
                    err.to_string()
                } else {
                    fl!("validation-not-enforced", reason = err.to_string())
                }
            })
    }
}

/// Directory the chooser opens in: the current value's directory when it exists
fn chooser_start_dir(value: &str) -> Option<PathBuf> {
    let path = Path::new(value.trim());
    if value.trim().is_empty() {
        return None;
    }
    if path.is_dir() {
        return Some(path.to_path_buf());
    }
    path.parent()
        .filter(|parent| parent.is_dir())
        .map(Path::to_path_buf)
}
