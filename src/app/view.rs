// SPDX-License-Identifier: GPL-3.0-only

//! Main view rendering
//!
//! The window is a single form: input and output paths on top, then view,
//! frame and camera parameters side by side, then the start action. Runs and
//! their results are shown as modal dialogs.

use crate::app::fields::Field;
use crate::app::state::{AppModel, Message, RenderState};
use crate::constants::ui;
use crate::fl;
use crate::synthesis::{RunPhase, Side, SideOutcome};
use cosmic::Element;
use cosmic::iced::{Alignment, Length};
use cosmic::widget;

impl AppModel {
    /// Build the main application view
    pub fn view(&self) -> Element<'_, Message> {
        let spacing = cosmic::theme::spacing();

        let files = Field::FILES.into_iter().fold(
            widget::settings::section().title(fl!("section-files")),
            |section, field| section.add(self.path_row(field)),
        );

        let parameters = widget::row()
            .push(self.numeric_section(fl!("section-views"), Field::VIEWS))
            .push(self.numeric_section(fl!("section-frames"), Field::GEOMETRY))
            .push(self.numeric_section(fl!("section-camera"), Field::CAMERA))
            .spacing(spacing.space_s);

        let running = self.render.is_running();
        let start_button = widget::button::suggested(fl!("start-render"))
            .on_press_maybe((!running).then_some(Message::StartRender));
        let reset_button = widget::button::standard(fl!("reset-form"))
            .on_press_maybe((!running).then_some(Message::ResetForm));

        let mut actions = widget::row()
            .align_y(Alignment::Center)
            .spacing(spacing.space_s);
        if let Some(hint) = self.views_hint() {
            actions = actions.push(
                widget::text(hint)
                    .class(cosmic::theme::Text::Accent)
                    .width(Length::Fill),
            );
        } else {
            actions = actions.push(widget::horizontal_space().width(Length::Fill));
        }
        actions = actions.push(reset_button).push(start_button);

        let content = widget::column()
            .push(files)
            .push(parameters)
            .push(actions)
            .spacing(spacing.space_m)
            .padding(spacing.space_m);

        widget::scrollable(content).into()
    }

    /// Path field with its chooser button
    fn path_row(&self, field: Field) -> Element<'_, Message> {
        let running = self.render.is_running();
        let generated = field == Field::CameraFile && self.config.generate_camera_file;

        let mut input = widget::text_input("", self.fields.value(field)).width(Length::Fill);
        if !running && !generated {
            input = input.on_input(move |value| Message::FieldChanged(field, value));
        }

        let browse = widget::button::standard(fl!("browse"))
            .on_press_maybe((!running && !generated).then_some(Message::ChooseFile(field)));

        widget::settings::item_row(vec![
            widget::text(field.label())
                .width(Length::Fixed(ui::LABEL_WIDTH))
                .into(),
            input.into(),
            self.feedback(field),
            browse.into(),
        ])
        .into()
    }

    fn numeric_section(
        &self,
        title: String,
        fields: [Field; 4],
    ) -> Element<'_, Message> {
        let running = self.render.is_running();
        let section = fields.into_iter().fold(
            widget::settings::section().title(title),
            |section, field| {
                let mut input = widget::text_input("", self.fields.value(field))
                    .width(Length::Fixed(ui::FIELD_WIDTH));
                if !running {
                    input = input.on_input(move |value| Message::FieldChanged(field, value));
                }
                let control = widget::row()
                    .push(input)
                    .push(self.feedback(field))
                    .align_y(Alignment::Center)
                    .spacing(cosmic::theme::spacing().space_xxs);
                section.add(widget::settings::item::builder(field.label()).control(control))
            },
        );
        widget::container(section).width(Length::Fill).into()
    }

    /// Valid/invalid marker next to a field
    fn feedback(&self, field: Field) -> Element<'_, Message> {
        if field == Field::CameraFile && self.config.generate_camera_file {
            return tooltip_icon("document-new-symbolic", fl!("camera-file-generated"));
        }

        match self.fields.status(field) {
            Ok(()) => widget::icon::from_name("emblem-ok-symbolic")
                .size(ui::FEEDBACK_ICON_SIZE)
                .icon()
                .into(),
            Err(problem) => tooltip_icon("dialog-error-symbolic", problem.message()),
        }
    }

    /// Modal dialog for the run in flight or the last result
    pub(crate) fn render_dialog(&self) -> Option<Element<'_, Message>> {
        match &self.render {
            RenderState::Idle => None,
            RenderState::Running { current, .. } => {
                let (done, total) = self.render.progress()?;
                let progress = widget::column()
                    .push(cosmic::iced::widget::progress_bar(
                        0.0..=total as f32,
                        done as f32,
                    ))
                    .push(widget::text::caption(phase_label(self.phase)))
                    .spacing(cosmic::theme::spacing().space_xxs);

                Some(
                    widget::dialog()
                        .title(fl!("render-progress-title"))
                        .body(fl!(
                            "render-progress-body",
                            side = side_label(*current),
                            pass = done + 1,
                            total = total
                        ))
                        .control(progress)
                        .into(),
                )
            }
            RenderState::Finished { job, outcomes } => Some(
                widget::dialog()
                    .title(fl!("render-finished-title"))
                    .body(fl!(
                        "render-finished-body",
                        dir = job.output_dir.display().to_string()
                    ))
                    .control(outcome_list(outcomes))
                    .primary_action(
                        widget::button::suggested(fl!("open-output-dir"))
                            .on_press(Message::OpenOutputDir),
                    )
                    .secondary_action(
                        widget::button::standard(fl!("close")).on_press(Message::DismissDialog),
                    )
                    .into(),
            ),
            RenderState::Failed { error, completed } => Some(
                widget::dialog()
                    .title(fl!("render-failed-title"))
                    .icon(widget::icon::from_name("dialog-error-symbolic").size(32).icon())
                    .body(error.to_string())
                    .control(outcome_list(completed))
                    .primary_action(
                        widget::button::standard(fl!("close")).on_press(Message::DismissDialog),
                    )
                    .into(),
            ),
        }
    }
}

fn tooltip_icon<'a>(name: &'static str, tip: String) -> Element<'a, Message> {
    widget::tooltip(
        widget::icon::from_name(name)
            .size(ui::FEEDBACK_ICON_SIZE)
            .icon(),
        widget::text(tip),
        widget::tooltip::Position::Top,
    )
    .into()
}

fn outcome_list<'a>(outcomes: &[SideOutcome]) -> Element<'a, Message> {
    outcomes
        .iter()
        .fold(widget::column().spacing(4), |column, outcome| {
            column.push(widget::text(fl!(
                "render-side-done",
                side = side_label(outcome.side),
                code = outcome
                    .exit_code
                    .map_or_else(|| "-".to_string(), |code| code.to_string()),
                seconds = format!("{:.1}", outcome.elapsed.as_secs_f64())
            )))
        })
        .into()
}

fn side_label(side: Side) -> String {
    match side {
        Side::Right => fl!("side-right"),
        Side::Left => fl!("side-left"),
    }
}

fn phase_label(phase: RunPhase) -> String {
    match phase {
        RunPhase::Idle => fl!("phase-idle"),
        RunPhase::InjectingConfig => fl!("phase-injecting"),
        RunPhase::Invoking => fl!("phase-invoking"),
        RunPhase::CleaningUp => fl!("phase-cleaning"),
    }
}
