// SPDX-License-Identifier: MPL-2.0

//! Main application module
//!
//! # Architecture
//!
//! - `state`: Application state types (AppModel, Message, RenderState)
//! - `fields`: Job form fields and their checks
//! - `handlers`: Message handlers grouped by concern
//! - `settings`: Settings drawer UI
//! - `view`: Main view and dialogs
//! - `update`: Message dispatch

pub mod fields;
mod handlers;
pub mod settings;
mod state;
mod update;
mod view;

use crate::config::{self, AppTheme, Config};
use crate::constants::{app_info, limits};
use crate::fl;
use crate::synthesis::RenderInvoker;
use cosmic::app::context_drawer;
use cosmic::iced::Subscription;
use cosmic::widget::{self, about::About};
use cosmic::{Element, Task};
pub use fields::{Field, FormFields};
pub use state::{AppModel, ContextPage, Message, RenderState};
use std::time::Duration;
use tracing::info;

const APP_ICON: &[u8] = include_bytes!(
    "../../resources/icons/hicolor/scalable/apps/io.github.viewsynthesis.ViewSynthesis.svg"
);

/// How often the progress dialog refreshes the run phase
const PHASE_REFRESH: Duration = Duration::from_millis(250);

impl cosmic::Application for AppModel {
    /// The async executor that will be used to run your application's commands.
    type Executor = cosmic::executor::Default;

    /// Data that your application receives to its init method.
    type Flags = ();

    /// Messages which the application and its widgets will emit.
    type Message = Message;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    const APP_ID: &'static str = app_info::APP_ID;

    fn core(&self) -> &cosmic::Core {
        &self.core
    }

    fn core_mut(&mut self) -> &mut cosmic::Core {
        &mut self.core
    }

    /// Initializes the application with any given flags and startup commands.
    fn init(
        core: cosmic::Core,
        _flags: Self::Flags,
    ) -> (Self, Task<cosmic::Action<Self::Message>>) {
        let about = About::default()
            .name(fl!("app-title"))
            .icon(widget::icon::from_svg_bytes(APP_ICON))
            .version(app_info::version())
            .license(env!("CARGO_PKG_LICENSE"));

        let (config_handler, config) = config::load(Self::APP_ID);
        let invoker = RenderInvoker::new(config.renderer_settings());
        let fields = FormFields::with_defaults(&config.default_camera_file());

        info!(
            renderer = %invoker.settings().executable.display(),
            present = invoker.settings().executable.is_file(),
            "Renderer configured"
        );

        let theme = config.app_theme.theme();
        let app = AppModel {
            core,
            context_page: ContextPage::default(),
            about,
            config,
            config_handler,
            fields,
            invoker,
            render: RenderState::default(),
            phase: Default::default(),
            clean_notice: None,
            theme_options: AppTheme::ALL
                .iter()
                .map(|theme| match theme {
                    AppTheme::System => fl!("theme-system"),
                    AppTheme::Dark => fl!("theme-dark"),
                    AppTheme::Light => fl!("theme-light"),
                })
                .collect(),
            min_total_view_options: limits::MIN_TOTAL_VIEW_CHOICES
                .iter()
                .map(|n| n.to_string())
                .collect(),
        };

        (app, cosmic::command::set_theme(theme))
    }

    /// Elements to pack at the end of the header bar.
    fn header_end(&self) -> Vec<Element<'_, Self::Message>> {
        let settings_button =
            widget::button::icon(widget::icon::from_name("preferences-system-symbolic"));
        let about_button = widget::button::icon(widget::icon::from_name("help-about-symbolic"));

        // Settings change the renderer under a running job
        if self.render.is_running() {
            vec![about_button.into(), settings_button.into()]
        } else {
            vec![
                about_button
                    .on_press(Message::ToggleContextPage(ContextPage::About))
                    .into(),
                settings_button
                    .on_press(Message::ToggleContextPage(ContextPage::Settings))
                    .into(),
            ]
        }
    }

    /// Display a context drawer if the context page is requested.
    fn context_drawer(&self) -> Option<context_drawer::ContextDrawer<'_, Self::Message>> {
        if !self.core.window.show_context {
            return None;
        }

        Some(match self.context_page {
            ContextPage::About => context_drawer::about(
                &self.about,
                |url| Message::LaunchUrl(url.to_string()),
                Message::ToggleContextPage(ContextPage::About),
            ),
            ContextPage::Settings => self.settings_view(),
        })
    }

    /// Modal dialog for the render in flight or its result
    fn dialog(&self) -> Option<Element<'_, Self::Message>> {
        self.render_dialog()
    }

    /// Describes the interface based on the current state of the application model.
    fn view(&self) -> Element<'_, Self::Message> {
        self.view()
    }

    /// Register subscriptions for this application.
    fn subscription(&self) -> Subscription<Self::Message> {
        let config_sub = self
            .core()
            .watch_config::<Config>(Self::APP_ID)
            .map(|update| Message::UpdateConfig(update.config));

        if self.render.is_running() {
            let phase_sub = cosmic::iced::time::every(PHASE_REFRESH).map(|_| Message::Tick);
            Subscription::batch([config_sub, phase_sub])
        } else {
            config_sub
        }
    }

    /// Handles messages emitted by the application and its widgets.
    fn update(&mut self, message: Self::Message) -> Task<cosmic::Action<Self::Message>> {
        self.update(message)
    }
}
