// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{defaults, renderer_layout};
use crate::synthesis::RendererSettings;
use cosmic::cosmic_config::{self, CosmicConfigEntry, cosmic_config_derive::CosmicConfigEntry};
use cosmic::{Theme, theme};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Application theme preference
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum AppTheme {
    /// Follow system theme (dark or light based on system setting)
    #[default]
    System,
    /// Always use dark theme
    Dark,
    /// Always use light theme
    Light,
}

impl AppTheme {
    pub const ALL: [AppTheme; 3] = [AppTheme::System, AppTheme::Dark, AppTheme::Light];

    /// Get the COSMIC theme for this app theme preference
    pub fn theme(&self) -> Theme {
        match self {
            Self::Dark => {
                let mut theme = theme::system_dark();
                theme.theme_type.prefer_dark(Some(true));
                theme
            }
            Self::Light => {
                let mut theme = theme::system_light();
                theme.theme_type.prefer_dark(Some(false));
                theme
            }
            Self::System => theme::system_preference(),
        }
    }
}

#[derive(Debug, Clone, CosmicConfigEntry, PartialEq, Serialize, Deserialize)]
#[version = 1]
pub struct Config {
    /// Application theme preference (System, Dark, Light)
    pub app_theme: AppTheme,
    /// Renderer installation directory, also the renderer's working directory
    pub renderer_dir: PathBuf,
    /// Renderer executable, relative to `renderer_dir` unless absolute
    pub renderer_executable: PathBuf,
    /// Configuration file for right-side passes, relative to `renderer_dir`
    pub right_render_config: PathBuf,
    /// Configuration file for left-side passes, relative to `renderer_dir`
    pub left_render_config: PathBuf,
    /// Camera parameter file preselected in the form
    pub camera_file: PathBuf,
    /// Smallest accepted total view count
    pub min_total_views: u32,
    /// Refuse to start the renderer when the parameters fail validation
    pub enforce_validation: bool,
    /// Write a camera parameter file from the form's intrinsics for each run
    pub generate_camera_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_theme: AppTheme::default(),
            renderer_dir: default_renderer_dir(),
            renderer_executable: PathBuf::from(renderer_layout::EXECUTABLE),
            right_render_config: PathBuf::from(renderer_layout::RIGHT_RENDER_CONFIG),
            left_render_config: PathBuf::from(renderer_layout::LEFT_RENDER_CONFIG),
            camera_file: PathBuf::from(renderer_layout::CAMERA_FILE),
            min_total_views: defaults::MIN_TOTAL_VIEWS,
            enforce_validation: true,
            generate_camera_file: false,
        }
    }
}

impl Config {
    /// Resolve a path stored relative to the renderer directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.renderer_dir.join(path)
        }
    }

    /// Renderer settings for the invoker, with every path absolute
    pub fn renderer_settings(&self) -> RendererSettings {
        RendererSettings {
            working_dir: self.renderer_dir.clone(),
            executable: self.resolve(&self.renderer_executable),
            right_config: self.resolve(&self.right_render_config),
            left_config: self.resolve(&self.left_render_config),
            generated_camera_file: self
                .generate_camera_file
                .then(|| self.resolve(Path::new(renderer_layout::GENERATED_CAMERA_FILE))),
        }
        .into_absolute()
    }

    /// Camera parameter file the form starts with
    pub fn default_camera_file(&self) -> PathBuf {
        self.resolve(&self.camera_file)
    }
}

/// `binary/` next to the running executable, or the user data directory
pub fn default_renderer_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(renderer_layout::INSTALL_DIR_NAME)))
        .or_else(|| {
            dirs::data_dir().map(|dir| dir.join("view-synthesis").join(renderer_layout::INSTALL_DIR_NAME))
        })
        .unwrap_or_else(|| PathBuf::from(renderer_layout::INSTALL_DIR_NAME))
}

/// Load the persisted configuration
///
/// Falls back to defaults when the config store is unavailable; entries that
/// fail to parse keep their default values.
pub fn load(app_id: &str) -> (Option<cosmic_config::Config>, Config) {
    match cosmic_config::Config::new(app_id, Config::VERSION) {
        Ok(handler) => {
            let config = match Config::get_entry(&handler) {
                Ok(config) => config,
                Err((errors, config)) => {
                    error!(?errors, "Errors loading config");
                    config
                }
            };
            info!(renderer_dir = %config.renderer_dir.display(), "Configuration loaded");
            (Some(handler), config)
        }
        Err(err) => {
            error!(%err, "Failed to create config handler");
            (None, Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.min_total_views, 1);
        assert!(config.enforce_validation);
        assert!(!config.generate_camera_file);
        assert!(config.renderer_dir.ends_with("binary"));
    }

    #[test]
    fn test_renderer_settings_resolve_relative_paths() {
        let config = Config {
            renderer_dir: PathBuf::from("/opt/htm"),
            right_render_config: PathBuf::from("/etc/htm/right.cfg"),
            ..Config::default()
        };
        let settings = config.renderer_settings();
        assert_eq!(settings.working_dir, PathBuf::from("/opt/htm"));
        assert_eq!(settings.executable, PathBuf::from("/opt/htm/bin/TAppRendererStatic"));
        assert_eq!(settings.right_config, PathBuf::from("/etc/htm/right.cfg"));
        assert_eq!(settings.left_config, PathBuf::from("/opt/htm/cfg/left_render.cfg"));
        assert_eq!(settings.generated_camera_file, None);
        assert_eq!(config.default_camera_file(), PathBuf::from("/opt/htm/cfg/cam.cfg"));
    }

    #[test]
    fn test_relative_renderer_dir_becomes_absolute() {
        let config = Config {
            renderer_dir: PathBuf::from("binary"),
            ..Config::default()
        };
        let cwd = std::env::current_dir().expect("cwd");
        let settings = config.renderer_settings();
        assert_eq!(settings.working_dir, cwd.join("binary"));
        assert_eq!(settings.executable, cwd.join("binary/bin/TAppRendererStatic"));
        assert!(settings.right_config.is_absolute());
        assert!(settings.left_config.is_absolute());
    }

    #[test]
    fn test_generated_camera_file_setting() {
        let config = Config {
            renderer_dir: PathBuf::from("/opt/htm"),
            generate_camera_file: true,
            ..Config::default()
        };
        assert_eq!(
            config.renderer_settings().generated_camera_file,
            Some(PathBuf::from("/opt/htm/cfg/generated_cam.cfg"))
        );
    }
}
