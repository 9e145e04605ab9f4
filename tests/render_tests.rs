// SPDX-License-Identifier: MPL-2.0

//! Integration tests for renderer invocation
//!
//! A shell script stands in for the renderer. It logs its arguments and
//! copies the configuration file it was given, so the tests can inspect what
//! the renderer saw while the injected lines were present.

#![cfg(unix)]

use serial_test::serial;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use view_synthesis::errors::{AppError, RenderError};
use view_synthesis::synthesis::{
    CameraIntrinsics, FrameGeometry, RenderInvoker, RenderJob, RendererSettings, Side, ViewLayout,
};

const TEMPLATE: &str = "#======== File I/O ========\n\
    SourceWidth : 1920\n\
    SourceHeight : 1088\n\
    \n\
    #======== Rendering ========\n\
    BaseViewCameraNumbers : 0 1\n\
    RenderMode : 0   # 0: synthesis\n";

struct FakeRenderer {
    _dir: TempDir,
    /// Canonical path of the renderer directory
    root: PathBuf,
    settings: RendererSettings,
}

impl FakeRenderer {
    fn new(exit_code: i32) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().canonicalize().expect("canonicalize");
        let settings = RendererSettings::from_dir(&root);

        fs::create_dir_all(root.join("bin")).expect("bin dir");
        fs::create_dir_all(root.join("cfg")).expect("cfg dir");
        fs::create_dir_all(root.join("out")).expect("out dir");
        fs::write(&settings.right_config, TEMPLATE).expect("right config");
        fs::write(&settings.left_config, TEMPLATE).expect("left config");

        let script = format!(
            "#!/bin/sh\n\
             echo \"$@\" >> invocations.log\n\
             cp \"$2\" \"seen_$(basename \"$2\")\"\n\
             echo \"synthesizing\"\n\
             echo \"renderer diagnostics\" >&2\n\
             exit {}\n",
            exit_code
        );
        fs::write(&settings.executable, script).expect("script");
        fs::set_permissions(&settings.executable, fs::Permissions::from_mode(0o755))
            .expect("chmod");

        Self {
            _dir: dir,
            root,
            settings,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.path("invocations.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn job(&self, total: u32, left: u32, right: u32) -> RenderJob {
        RenderJob {
            texture_file: PathBuf::from("/data/PoznanStreet_1920x1088_25_05.yuv"),
            depth_file: PathBuf::from("/data/depth_PoznanStreet_1920x1088_25_05.yuv"),
            camera_file: self.path("cfg/cam.cfg"),
            output_dir: self.path("out"),
            views: ViewLayout {
                total,
                left,
                right,
                spacing: 0.07,
            },
            geometry: FrameGeometry {
                width: 1920,
                height: 1088,
                frames: 50,
                skips: 0,
            },
            intrinsics: CameraIntrinsics {
                focal_length: 1732.875727,
                camera_shift: 943.231169,
                z_near: -34.506386,
                z_far: -2760.510889,
            },
        }
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read")
}

#[test]
#[serial]
fn test_left_only_job_runs_once_and_restores_config() {
    let renderer = FakeRenderer::new(0);
    let invoker = RenderInvoker::new(renderer.settings.clone());

    let report = invoker.run(&renderer.job(2, 2, 0)).expect("render");

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].side, Side::Left);
    assert_eq!(report.outcomes[0].exit_code, Some(0));
    assert_eq!(report.outcomes[0].stderr.trim(), "renderer diagnostics");

    let invocations = renderer.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        invocations[0],
        format!(
            "-c {} -cpf {} -wdt 1920 -hgt 1088 -f 50 -fs 0",
            renderer.settings.left_config.display(),
            renderer.path("cfg/cam.cfg").display()
        )
    );

    let seen = read(&renderer.path("seen_left_render.cfg"));
    assert!(seen.starts_with(TEMPLATE));
    let injected: Vec<&str> = seen[TEMPLATE.len()..].lines().collect();
    assert_eq!(
        injected,
        vec![
            "VideoInputFile_0 : /data/PoznanStreet_1920x1088_25_05.yuv",
            "DepthInputFile_0 : /data/depth_PoznanStreet_1920x1088_25_05.yuv",
            "VideoInputFile_1 : /data/PoznanStreet_1920x1088_25_05.yuv",
            "DepthInputFile_1 : /data/depth_PoznanStreet_1920x1088_25_05.yuv",
            "SynthViewCameraNumbers : 1 : -0.07 : 0.86",
            &format!(
                "SynthOutputFileBaseName : {}",
                renderer.path("out/synth_left$.yuv").display()
            ),
        ]
    );

    assert_eq!(read(&renderer.settings.left_config), TEMPLATE);
    assert_eq!(read(&renderer.settings.right_config), TEMPLATE);
    assert!(!invoker.is_busy());
}

#[test]
#[serial]
fn test_both_sides_render_right_first() {
    let renderer = FakeRenderer::new(0);
    let invoker = RenderInvoker::new(renderer.settings.clone());

    let report = invoker.run(&renderer.job(28, 14, 14)).expect("render");
    let sides: Vec<Side> = report.outcomes.iter().map(|o| o.side).collect();
    assert_eq!(sides, vec![Side::Right, Side::Left]);

    let invocations = renderer.invocations();
    assert_eq!(invocations.len(), 2);
    assert!(invocations[0].contains("right_render.cfg"));
    assert!(invocations[1].contains("left_render.cfg"));

    let seen_right = read(&renderer.path("seen_right_render.cfg"));
    assert!(seen_right.contains("SynthViewCameraNumbers : 0.07 : 0.07 : 1.015\n"));
    assert!(!seen_right.contains("synth_left$"));

    assert_eq!(read(&renderer.settings.right_config), TEMPLATE);
    assert_eq!(read(&renderer.settings.left_config), TEMPLATE);
}

#[test]
#[serial]
fn test_failing_renderer_stops_run_and_restores_config() {
    let renderer = FakeRenderer::new(3);
    let invoker = RenderInvoker::new(renderer.settings.clone());

    let err = invoker.run(&renderer.job(28, 14, 14)).unwrap_err();
    match err {
        AppError::Render(RenderError::ExitStatus { side, code, stderr }) => {
            assert_eq!(side, Side::Right);
            assert_eq!(code, Some(3));
            assert_eq!(stderr.trim(), "renderer diagnostics");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(renderer.invocations().len(), 1);
    assert_eq!(read(&renderer.settings.right_config), TEMPLATE);
    assert_eq!(read(&renderer.settings.left_config), TEMPLATE);
    assert!(!invoker.is_busy());
}

#[test]
#[serial]
fn test_generated_camera_file_is_passed_to_renderer() {
    let renderer = FakeRenderer::new(0);
    let generated = renderer.path("cfg/generated_cam.cfg");
    let settings = RendererSettings {
        generated_camera_file: Some(generated.clone()),
        ..renderer.settings.clone()
    };
    let invoker = RenderInvoker::new(settings);

    invoker.run(&renderer.job(1, 0, 1)).expect("render");

    let invocations = renderer.invocations();
    assert_eq!(invocations.len(), 1);
    assert!(invocations[0].contains(&format!("-cpf {}", generated.display())));

    let camera_lines: Vec<String> = read(&generated)
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    assert_eq!(camera_lines.len(), 2);
    assert!(camera_lines[0].starts_with("0 0 49 1732.875727 0 "));
    assert!(camera_lines[1].starts_with("1 0 49 1732.875727 1 "));
}

#[test]
#[serial]
fn test_missing_config_never_starts_renderer() {
    let renderer = FakeRenderer::new(0);
    fs::remove_file(&renderer.settings.left_config).expect("remove");
    let invoker = RenderInvoker::new(renderer.settings.clone());

    let err = invoker.run(&renderer.job(2, 2, 0)).unwrap_err();
    assert!(matches!(err, AppError::ConfigIo { .. }));
    assert!(renderer.invocations().is_empty());
    assert!(!renderer.settings.left_config.exists());
}

#[test]
#[serial]
fn test_clean_configs_recovers_interrupted_run() {
    let renderer = FakeRenderer::new(0);
    let leftover = format!(
        "{}VideoInputFile_0 : /data/a.yuv\nSynthOutputFileBaseName : /out/synth_right$.yuv\n",
        TEMPLATE
    );
    fs::write(&renderer.settings.right_config, leftover).expect("write");
    let invoker = RenderInvoker::new(renderer.settings.clone());

    assert_eq!(invoker.clean_configs().expect("clean"), 2);
    assert_eq!(read(&renderer.settings.right_config), TEMPLATE);
    assert_eq!(read(&renderer.settings.left_config), TEMPLATE);
}

/// Restores the process working directory when dropped
struct CurrentDirGuard(PathBuf);

impl CurrentDirGuard {
    fn enter(dir: &Path) -> Self {
        let previous = std::env::current_dir().expect("cwd");
        std::env::set_current_dir(dir).expect("chdir");
        Self(previous)
    }
}

impl Drop for CurrentDirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.0);
    }
}

#[test]
#[serial]
fn test_relative_renderer_dir_and_job_paths() {
    let renderer = FakeRenderer::new(0);
    let parent = renderer.root.parent().expect("parent");
    let name = renderer.root.file_name().expect("name");
    let _cwd = CurrentDirGuard::enter(parent);

    let invoker = RenderInvoker::new(RendererSettings::from_dir(name));
    assert_eq!(invoker.settings().working_dir, renderer.root);

    let relative = Path::new(name);
    let job = RenderJob {
        texture_file: relative.join("texture.yuv"),
        depth_file: relative.join("depth.yuv"),
        camera_file: relative.join("cfg/cam.cfg"),
        output_dir: relative.join("out"),
        ..renderer.job(2, 2, 0)
    }
    .into_absolute();

    invoker.run(&job).expect("render");

    let invocations = renderer.invocations();
    assert_eq!(invocations.len(), 1);
    assert!(invocations[0].starts_with(&format!(
        "-c {} -cpf {}",
        renderer.settings.left_config.display(),
        renderer.path("cfg/cam.cfg").display()
    )));

    let seen = read(&renderer.path("seen_left_render.cfg"));
    assert!(seen.contains(&format!(
        "VideoInputFile_0 : {}\n",
        renderer.path("texture.yuv").display()
    )));
    assert!(seen.contains(&format!(
        "SynthOutputFileBaseName : {}\n",
        renderer.path("out/synth_left$.yuv").display()
    )));
    assert_eq!(read(&renderer.settings.left_config), TEMPLATE);
}

#[test]
#[serial]
fn test_line_break_in_input_path_leaves_config_untouched() {
    let renderer = FakeRenderer::new(0);
    let invoker = RenderInvoker::new(renderer.settings.clone());
    let job = RenderJob {
        texture_file: PathBuf::from("/data/a\nb.yuv"),
        ..renderer.job(2, 2, 0)
    };

    let err = invoker.run(&job).unwrap_err();
    assert!(matches!(err, AppError::Form { .. }));
    assert!(renderer.invocations().is_empty());
    assert_eq!(read(&renderer.settings.left_config), TEMPLATE);
    assert!(!invoker.is_busy());
}
