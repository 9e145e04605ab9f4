// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Keys the front-end injects into renderer configuration files
///
/// Cleanup removes every line starting with one of these keys.
pub mod config_keys {
    pub const VIDEO_INPUT_0: &str = "VideoInputFile_0";
    pub const DEPTH_INPUT_0: &str = "DepthInputFile_0";
    pub const VIDEO_INPUT_1: &str = "VideoInputFile_1";
    pub const DEPTH_INPUT_1: &str = "DepthInputFile_1";
    pub const SYNTH_VIEW_CAMERA_NUMBERS: &str = "SynthViewCameraNumbers";
    pub const SYNTH_OUTPUT_FILE_BASE_NAME: &str = "SynthOutputFileBaseName";

    /// Full match set, in the order the lines are written
    pub const INJECTED: [&str; 6] = [
        VIDEO_INPUT_0,
        DEPTH_INPUT_0,
        VIDEO_INPUT_1,
        DEPTH_INPUT_1,
        SYNTH_VIEW_CAMERA_NUMBERS,
        SYNTH_OUTPUT_FILE_BASE_NAME,
    ];
}

/// Renderer command line flags
pub mod renderer_flags {
    pub const CONFIG: &str = "-c";
    pub const CAMERA_PARAMETERS: &str = "-cpf";
    pub const WIDTH: &str = "-wdt";
    pub const HEIGHT: &str = "-hgt";
    pub const FRAMES: &str = "-f";
    pub const SKIPS: &str = "-fs";
}

/// Layout of the renderer installation, relative to its directory
pub mod renderer_layout {
    /// Directory next to the front-end executable holding the renderer
    pub const INSTALL_DIR_NAME: &str = "binary";
    pub const EXECUTABLE: &str = "bin/TAppRendererStatic";
    pub const RIGHT_RENDER_CONFIG: &str = "cfg/right_render.cfg";
    pub const LEFT_RENDER_CONFIG: &str = "cfg/left_render.cfg";
    pub const CAMERA_FILE: &str = "cfg/cam.cfg";
    /// Camera parameter file written from the job's intrinsics
    pub const GENERATED_CAMERA_FILE: &str = "cfg/generated_cam.cfg";
}

/// Starting values of the job form
pub mod defaults {
    pub const TOTAL_VIEWS: u32 = 28;
    pub const LEFT_VIEWS: u32 = 14;
    pub const RIGHT_VIEWS: u32 = 14;
    pub const VIEW_SPACING: f64 = 0.07;

    pub const WIDTH: u32 = 1920;
    pub const HEIGHT: u32 = 1088;
    pub const FRAMES: u32 = 50;
    pub const SKIPS: u32 = 0;

    pub const FOCAL_LENGTH: f64 = 1732.875727;
    pub const CAMERA_SHIFT: f64 = 943.231169;
    pub const Z_NEAR: f64 = -34.506386;
    pub const Z_FAR: f64 = -2760.510889;

    /// Smallest accepted total view count
    pub const MIN_TOTAL_VIEWS: u32 = 1;
}

/// Geometry limits used by the validator
pub mod limits {
    /// Normalized distance between the two base cameras
    pub const MAX_BASELINE: f64 = 1.0;
    /// Choices offered for the minimum total view count
    pub const MIN_TOTAL_VIEW_CHOICES: [u32; 2] = [1, 2];
}

/// File chooser filters
pub mod file_filters {
    /// (filter name, extensions)
    pub type Filter = (&'static str, &'static [&'static str]);

    pub const YUV: Filter = ("YUV (4:2:0) Files", &["yuv"]);
    pub const CFG: Filter = ("Cfg Files", &["cfg"]);
    pub const ALL: Filter = ("All files", &["*"]);
}

/// UI constants
pub mod ui {
    /// Width of numeric input fields
    pub const FIELD_WIDTH: f32 = 140.0;
    /// Width of the field labels
    pub const LABEL_WIDTH: f32 = 110.0;
    /// Size of the field feedback icons
    pub const FEEDBACK_ICON_SIZE: u16 = 16;
    /// Minimum window size
    pub const MIN_WINDOW_WIDTH: f32 = 700.0;
    pub const MIN_WINDOW_HEIGHT: f32 = 400.0;
}

/// Application info
pub mod app_info {
    use std::path::Path;

    /// Unique identifier in RDNN (reverse domain name notation) format.
    pub const APP_ID: &str = "io.github.viewsynthesis.ViewSynthesis";

    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Check if the application is running inside a Flatpak sandbox
    pub fn is_flatpak() -> bool {
        Path::new("/.flatpak-info").exists()
    }
}
