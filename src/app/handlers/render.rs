// SPDX-License-Identifier: GPL-3.0-only

//! Render handlers
//!
//! A run is driven one side at a time: each side is a blocking renderer pass
//! on a background task whose completion arrives as `SideFinished`.

use crate::app::state::{AppModel, Message, RenderState};
use crate::errors::{AppError, RenderError};
use crate::synthesis::{self, RenderJob, Side, SideOutcome};
use cosmic::Task;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

impl AppModel {
    pub(crate) fn handle_start_render(&mut self) -> Task<cosmic::Action<Message>> {
        if self.render.is_running() {
            warn!("Render already in progress, ignoring start");
            return Task::none();
        }

        match self.begin_run() {
            Ok(task) => task,
            Err(err) => {
                error!(error = %err, "Render not started");
                self.render = RenderState::Failed {
                    error: err,
                    completed: Vec::new(),
                };
                Task::none()
            }
        }
    }

    fn begin_run(&mut self) -> Result<Task<cosmic::Action<Message>>, AppError> {
        let job = self.fields.to_job(self.config.generate_camera_file)?;

        if let Err(err) = synthesis::check(&job, self.config.min_total_views) {
            if self.config.enforce_validation {
                return Err(err.into());
            }
            warn!(error = %err, "Parameters fail validation, rendering anyway");
        }

        let mut sides = job.sides();
        if sides.is_empty() {
            return Err(RenderError::NothingToRender.into());
        }
        let current = sides.remove(0);

        let ticket = self.invoker.try_begin()?;
        let job = Arc::new(job);
        info!(
            texture = %job.texture_file.display(),
            output = %job.output_dir.display(),
            passes = sides.len() + 1,
            "Starting render"
        );

        let task = self.spawn_side(Arc::clone(&job), current);
        self.render = RenderState::Running {
            ticket,
            job,
            pending: sides,
            current,
            completed: Vec::new(),
            started: Instant::now(),
        };
        Ok(task)
    }

    fn spawn_side(&self, job: Arc<RenderJob>, side: Side) -> Task<cosmic::Action<Message>> {
        let invoker = self.invoker.clone();
        Task::perform(
            async move {
                tokio::task::spawn_blocking(move || invoker.run_side(&job, side))
                    .await
                    .unwrap_or_else(|err| Err(RenderError::TaskFailed(err.to_string()).into()))
            },
            |result| cosmic::Action::App(Message::SideFinished(result)),
        )
    }

    pub(crate) fn handle_side_finished(
        &mut self,
        result: Result<SideOutcome, AppError>,
    ) -> Task<cosmic::Action<Message>> {
        if !self.render.is_running() {
            warn!("Side finished without a run in progress");
            return Task::none();
        }
        let RenderState::Running {
            ticket,
            job,
            mut pending,
            current,
            mut completed,
            started,
        } = std::mem::take(&mut self.render)
        else {
            return Task::none();
        };

        match result {
            Ok(outcome) => {
                info!(side = %outcome.side, elapsed_ms = outcome.elapsed.as_millis() as u64, "Side finished");
                completed.push(outcome);

                if pending.is_empty() {
                    info!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Render complete"
                    );
                    drop(ticket);
                    self.render = RenderState::Finished {
                        job,
                        outcomes: completed,
                    };
                    self.after_run();
                    return Task::none();
                }

                let next = pending.remove(0);
                let task = self.spawn_side(Arc::clone(&job), next);
                self.render = RenderState::Running {
                    ticket,
                    job,
                    pending,
                    current: next,
                    completed,
                    started,
                };
                task
            }
            Err(err) => {
                error!(side = %current, error = %err, "Render failed");
                drop(ticket);
                self.render = RenderState::Failed {
                    error: err,
                    completed,
                };
                self.after_run();
                Task::none()
            }
        }
    }

    /// Refresh state that depends on the run being over
    fn after_run(&mut self) {
        self.phase = self.invoker.phase();
        self.fields.recheck();
        self.refresh_invoker();
    }

    pub(crate) fn handle_open_output_dir(&mut self) -> Task<cosmic::Action<Message>> {
        if let RenderState::Finished { job, .. } = &self.render {
            let dir = job.output_dir.clone();
            info!(path = %dir.display(), "Opening output directory");
            if let Err(err) = open::that_detached(&dir) {
                error!(error = %err, path = %dir.display(), "Failed to open output directory");
            }
        }
        self.render = RenderState::Idle;
        Task::none()
    }

    pub(crate) fn handle_dismiss_dialog(&mut self) -> Task<cosmic::Action<Message>> {
        if !self.render.is_running() {
            self.render = RenderState::Idle;
        }
        Task::none()
    }
}
