// SPDX-License-Identifier: MPL-2.0

//! Settings drawer view

use crate::app::state::{AppModel, ContextPage, Message};
use crate::config::AppTheme;
use crate::constants::{app_info, limits};
use crate::fl;
use cosmic::Element;
use cosmic::app::context_drawer;
use cosmic::iced::Length;
use cosmic::widget;

impl AppModel {
    /// Create the settings view for the context drawer
    pub fn settings_view(&self) -> context_drawer::ContextDrawer<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let theme_index = AppTheme::ALL
            .iter()
            .position(|theme| *theme == self.config.app_theme);
        let theme_dropdown =
            widget::dropdown(&self.theme_options, theme_index, Message::SetAppTheme);

        let appearance = widget::settings::section()
            .title(fl!("settings-appearance"))
            .add(widget::settings::item::builder(fl!("settings-theme")).control(theme_dropdown));

        let renderer = self.invoker.settings();
        let executable_status = if renderer.executable.is_file() {
            fl!("settings-renderer-found")
        } else {
            fl!(
                "settings-renderer-missing",
                path = renderer.executable.display().to_string()
            )
        };

        let renderer_section = widget::settings::section()
            .title(fl!("settings-renderer"))
            .add(
                widget::settings::item::builder(fl!("settings-renderer-dir"))
                    .description(self.config.renderer_dir.display().to_string())
                    .control(
                        widget::button::standard(fl!("browse"))
                            .on_press(Message::ChooseRendererDir),
                    ),
            )
            .add(widget::settings::item_row(vec![
                widget::text::caption(executable_status).into(),
            ]));

        let min_total_index = limits::MIN_TOTAL_VIEW_CHOICES
            .iter()
            .position(|n| *n == self.config.min_total_views);

        let validation = widget::settings::section()
            .title(fl!("settings-validation"))
            .add(
                widget::settings::item::builder(fl!("settings-enforce-validation"))
                    .description(fl!("settings-enforce-validation-description"))
                    .toggler(self.config.enforce_validation, Message::SetEnforceValidation),
            )
            .add(
                widget::settings::item::builder(fl!("settings-min-total-views")).control(
                    widget::dropdown(
                        &self.min_total_view_options,
                        min_total_index,
                        Message::SelectMinTotalViews,
                    ),
                ),
            )
            .add(
                widget::settings::item::builder(fl!("settings-generate-camera-file"))
                    .description(fl!("settings-generate-camera-file-description"))
                    .toggler(self.config.generate_camera_file, Message::SetGenerateCameraFile),
            );

        let mut clean_row = widget::column()
            .push(
                widget::button::standard(fl!("settings-clean-configs"))
                    .on_press(Message::CleanRendererConfigs),
            )
            .spacing(spacing.space_xxs);
        if let Some(notice) = &self.clean_notice {
            clean_row = clean_row.push(widget::text::caption(notice.as_str()));
        }

        let recovery = widget::settings::section()
            .title(fl!("settings-recovery"))
            .add(
                widget::settings::item::builder(fl!("settings-clean-configs-title"))
                    .description(fl!("settings-clean-configs-description"))
                    .control(clean_row),
            );

        // Version info string
        let version_info = if app_info::is_flatpak() {
            fl!("version-flatpak", version = app_info::version())
        } else {
            fl!("version", version = app_info::version())
        };

        let settings_column: Element<'_, Message> = widget::column()
            .push(appearance)
            .push(renderer_section)
            .push(validation)
            .push(recovery)
            .push(widget::divider::horizontal::default())
            .push(
                widget::text(version_info)
                    .size(12)
                    .class(cosmic::theme::Text::Accent),
            )
            .spacing(spacing.space_m)
            .width(Length::Fill)
            .into();

        context_drawer::context_drawer(
            settings_column,
            Message::ToggleContextPage(ContextPage::Settings),
        )
        .title(fl!("settings"))
    }
}
