// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for headless operation
//!
//! This module provides command-line functionality for:
//! - Rendering a job without the GUI
//! - Checking a job and printing the renderer command lines
//! - Removing leftover input lines from the renderer configurations

use chrono::Local;
use clap::Args;
use std::path::PathBuf;
use view_synthesis::config::{self, Config};
use view_synthesis::constants::{app_info, defaults};
use view_synthesis::errors::{AppError, RenderError};
use view_synthesis::synthesis::invoker::renderer_args;
use view_synthesis::synthesis::{
    self, CameraIntrinsics, FrameGeometry, RenderInvoker, RenderJob, RenderReport, ViewLayout,
};

/// Parameters of a rendering job
#[derive(Args, Debug)]
pub struct JobArgs {
    /// Texture video (YUV 4:2:0)
    #[arg(short, long)]
    pub texture: PathBuf,

    /// Depth video (YUV 4:2:0)
    #[arg(short, long)]
    pub depth: PathBuf,

    /// Directory receiving the synthesized views
    #[arg(short, long)]
    pub output: PathBuf,

    /// Camera parameter file (default: the one from the settings)
    #[arg(short, long)]
    pub camera: Option<PathBuf>,

    /// Total number of views
    #[arg(long, default_value_t = defaults::TOTAL_VIEWS)]
    pub total: u32,

    /// Views synthesized to the left of the source
    #[arg(long, default_value_t = defaults::LEFT_VIEWS)]
    pub left: u32,

    /// Views synthesized to the right of the source
    #[arg(long, default_value_t = defaults::RIGHT_VIEWS)]
    pub right: u32,

    /// Normalized distance between adjacent views
    #[arg(long, default_value_t = defaults::VIEW_SPACING)]
    pub spacing: f64,

    #[arg(long, default_value_t = defaults::WIDTH)]
    pub width: u32,

    #[arg(long, default_value_t = defaults::HEIGHT)]
    pub height: u32,

    /// Frames to render
    #[arg(long, default_value_t = defaults::FRAMES)]
    pub frames: u32,

    /// Frames to skip at the start of the input
    #[arg(long, default_value_t = defaults::SKIPS)]
    pub skips: u32,

    #[arg(long, default_value_t = defaults::FOCAL_LENGTH)]
    pub focal_length: f64,

    /// Horizontal principal point shift
    #[arg(long, default_value_t = defaults::CAMERA_SHIFT, allow_negative_numbers = true)]
    pub camera_shift: f64,

    #[arg(long, default_value_t = defaults::Z_NEAR, allow_negative_numbers = true)]
    pub z_near: f64,

    #[arg(long, default_value_t = defaults::Z_FAR, allow_negative_numbers = true)]
    pub z_far: f64,
}

impl JobArgs {
    /// The job described by the arguments, with paths made absolute
    fn job(&self, config: &Config) -> RenderJob {
        RenderJob {
            texture_file: self.texture.clone(),
            depth_file: self.depth.clone(),
            camera_file: self
                .camera
                .clone()
                .unwrap_or_else(|| config.default_camera_file()),
            output_dir: self.output.clone(),
            views: ViewLayout {
                total: self.total,
                left: self.left,
                right: self.right,
                spacing: self.spacing,
            },
            geometry: FrameGeometry {
                width: self.width,
                height: self.height,
                frames: self.frames,
                skips: self.skips,
            },
            intrinsics: CameraIntrinsics {
                focal_length: self.focal_length,
                camera_shift: self.camera_shift,
                z_near: self.z_near,
                z_far: self.z_far,
            },
        }
        .into_absolute()
    }
}

/// Overrides of the saved renderer settings
#[derive(Args, Debug, Default)]
pub struct RendererArgs {
    /// Renderer installation directory (default: the one from the settings)
    #[arg(long)]
    pub renderer_dir: Option<PathBuf>,

    /// Smallest accepted total view count
    #[arg(long)]
    pub min_total_views: Option<u32>,

    /// Render even when the parameters fail validation
    #[arg(long)]
    pub no_validate: bool,

    /// Generate the camera parameter file from the camera parameters
    #[arg(long)]
    pub generate_camera_file: bool,
}

impl RendererArgs {
    fn config(&self) -> Config {
        let (_, config) = config::load(app_info::APP_ID);
        self.apply(config)
    }

    fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.renderer_dir {
            config.renderer_dir = dir.clone();
        }
        if let Some(minimum) = self.min_total_views {
            config.min_total_views = minimum;
        }
        if self.no_validate {
            config.enforce_validation = false;
        }
        if self.generate_camera_file {
            config.generate_camera_file = true;
        }
        config
    }
}

/// Render a job with the external renderer
pub fn render(
    job_args: JobArgs,
    renderer: RendererArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = renderer.config();
    render_job(job_args.job(&config), &config, json)
}

fn render_job(
    job: RenderJob,
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    validate(&job, config)?;

    let invoker = RenderInvoker::new(config.renderer_settings());
    if !json {
        println!(
            "Renderer: {}",
            invoker.settings().executable.display()
        );
        println!("Passes: {}", job.sides().len());
    }

    match invoker.run(&job) {
        Ok(report) if json => println!("{}", serde_json::to_string_pretty(&report)?),
        Ok(report) => print_report(&report),
        Err(err) => {
            if let AppError::Render(RenderError::ExitStatus { stderr, .. }) = &err
                && !stderr.trim().is_empty()
            {
                eprintln!("{}", stderr.trim_end());
            }
            return Err(err.into());
        }
    }

    Ok(())
}

/// Validate a job and print the renderer invocations without running them
pub fn check(
    job_args: JobArgs,
    renderer: RendererArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = renderer.config();
    check_job(&job_args.job(&config), &config, json)
}

fn check_job(
    job: &RenderJob,
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let validation = synthesis::check(job, config.min_total_views);
    let settings = config.renderer_settings();
    let camera = settings
        .generated_camera_file
        .clone()
        .unwrap_or_else(|| job.camera_file.clone());

    let passes: Vec<(String, Vec<String>)> = job
        .sides()
        .into_iter()
        .map(|side| {
            let mut command = vec![settings.executable.display().to_string()];
            command.extend(
                renderer_args(job, settings.config_for(side), &camera)
                    .into_iter()
                    .map(|arg| arg.to_string_lossy().into_owned()),
            );
            (side.to_string(), command)
        })
        .collect();

    if json {
        let passes: Vec<_> = passes
            .iter()
            .map(|(side, command)| serde_json::json!({ "side": side, "command": command }))
            .collect();
        let output = serde_json::json!({
            "job": job,
            "valid": validation.is_ok(),
            "error": validation.as_ref().err().map(ToString::to_string),
            "working_dir": settings.working_dir,
            "passes": passes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        match &validation {
            Ok(()) => println!("Parameters are valid."),
            Err(err) => println!("Invalid parameters: {}", err),
        }
        println!("Working directory: {}", settings.working_dir.display());
        for (side, command) in &passes {
            println!("  [{}] {}", side, command.join(" "));
        }
    }

    if config.enforce_validation {
        validation?;
    }
    Ok(())
}

/// Remove leftover input lines from both renderer configurations
pub fn clean(renderer_dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = RendererArgs {
        renderer_dir,
        ..RendererArgs::default()
    }
    .config();
    clean_configs(&config)
}

fn clean_configs(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let invoker = RenderInvoker::new(config.renderer_settings());

    let removed = invoker.clean_configs()?;
    println!(
        "Removed {} line(s) from {} and {}",
        removed,
        invoker.settings().right_config.display(),
        invoker.settings().left_config.display()
    );
    Ok(())
}

fn validate(job: &RenderJob, config: &Config) -> Result<(), AppError> {
    match synthesis::check(job, config.min_total_views) {
        Ok(()) => Ok(()),
        Err(err) if config.enforce_validation => Err(err.into()),
        Err(err) => {
            eprintln!("Warning: {} (continuing, validation disabled)", err);
            Ok(())
        }
    }
}

fn print_report(report: &RenderReport) {
    println!();
    println!(
        "Render finished at {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    for outcome in &report.outcomes {
        println!(
            "  {} views: exit {} in {:.1}s",
            outcome.side,
            outcome
                .exit_code
                .map_or_else(|| "-".to_string(), |code| code.to_string()),
            outcome.elapsed.as_secs_f64()
        );
    }
    println!("  total {:.1}s", report.elapsed().as_secs_f64());
    println!(
        "Output: {}",
        report.job.output_dir.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use view_synthesis::errors::ValidationError;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        job: JobArgs,

        #[command(flatten)]
        renderer: RendererArgs,
    }

    fn parse(args: &[&str]) -> TestCli {
        let base = ["view-synthesis", "-t", "t.yuv", "-d", "d.yuv", "-o", "out"];
        TestCli::try_parse_from(base.iter().chain(args)).expect("parse")
    }

    fn saved_config() -> Config {
        Config {
            renderer_dir: PathBuf::from("/opt/htm"),
            ..Config::default()
        }
    }

    #[test]
    fn test_job_uses_defaults_and_absolute_paths() {
        let cli = parse(&[]);
        let job = cli.job.job(&saved_config());
        let cwd = std::env::current_dir().expect("cwd");

        assert_eq!(job.texture_file, cwd.join("t.yuv"));
        assert_eq!(job.depth_file, cwd.join("d.yuv"));
        assert_eq!(job.output_dir, cwd.join("out"));
        assert_eq!(job.camera_file, PathBuf::from("/opt/htm/cfg/cam.cfg"));
        assert_eq!(job.views.total, defaults::TOTAL_VIEWS);
        assert_eq!(job.views.spacing, defaults::VIEW_SPACING);
        assert_eq!(job.geometry.frames, defaults::FRAMES);
        assert_eq!(job.intrinsics.z_far, defaults::Z_FAR);
    }

    #[test]
    fn test_job_arguments_accept_negative_numbers() {
        let cli = parse(&[
            "--camera",
            "/data/cam.cfg",
            "--total",
            "2",
            "--left",
            "2",
            "--right",
            "0",
            "--z-near",
            "-10.5",
            "--camera-shift",
            "-3",
        ]);
        let job = cli.job.job(&saved_config());

        assert_eq!(job.camera_file, PathBuf::from("/data/cam.cfg"));
        assert_eq!((job.views.total, job.views.left, job.views.right), (2, 2, 0));
        assert_eq!(job.intrinsics.z_near, -10.5);
        assert_eq!(job.intrinsics.camera_shift, -3.0);
    }

    #[test]
    fn test_renderer_args_override_saved_config() {
        let cli = parse(&[
            "--renderer-dir",
            "/srv/renderer",
            "--min-total-views",
            "2",
            "--no-validate",
            "--generate-camera-file",
        ]);
        let config = cli.renderer.apply(saved_config());

        assert_eq!(config.renderer_dir, PathBuf::from("/srv/renderer"));
        assert_eq!(config.min_total_views, 2);
        assert!(!config.enforce_validation);
        assert!(config.generate_camera_file);
    }

    #[test]
    fn test_renderer_args_keep_saved_config_when_absent() {
        let saved = Config {
            min_total_views: 2,
            generate_camera_file: true,
            ..saved_config()
        };
        let config = parse(&[]).renderer.apply(saved.clone());
        assert_eq!(config, saved);
    }

    #[test]
    fn test_validate_blocks_only_when_enforced() {
        let cli = parse(&["--total", "1", "--left", "2", "--right", "0"]);
        let mut config = saved_config();
        let job = cli.job.job(&config);

        assert_eq!(
            validate(&job, &config),
            Err(AppError::Validation(
                ValidationError::LeftViewCountExceedsTotal { left: 2, total: 1 }
            ))
        );

        config.enforce_validation = false;
        assert_eq!(validate(&job, &config), Ok(()));
    }

    #[test]
    fn test_check_fails_for_invalid_job_when_enforced() {
        let mut config = saved_config();
        let invalid = parse(&["--total", "0"]).job.job(&config);
        let valid = parse(&[]).job.job(&config);

        assert!(check_job(&valid, &config, false).is_ok());
        assert!(check_job(&invalid, &config, true).is_err());

        config.enforce_validation = false;
        assert!(check_job(&invalid, &config, false).is_ok());
    }

    #[test]
    fn test_render_refuses_invalid_job_before_starting() {
        let config = saved_config();
        let job = parse(&["--spacing", "NaN"]).job.job(&config);

        let err = render_job(job, &config, false).expect_err("invalid job");
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Validation(ValidationError::ViewSpacingOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_clean_strips_leftover_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("cfg")).expect("cfg dir");
        let right = dir.path().join("cfg/right_render.cfg");
        fs::write(&right, "A : 1\nVideoInputFile_0 : /data/a.yuv\n").expect("write");

        let config = Config {
            renderer_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        clean_configs(&config).expect("clean");

        assert_eq!(fs::read_to_string(&right).expect("read"), "A : 1\n");
        assert!(!dir.path().join("cfg/left_render.cfg").exists());
    }
}
