// SPDX-License-Identifier: GPL-3.0-only

//! Renderer camera parameter files
//!
//! One whitespace separated line per base view:
//! `ViewNumber FirstFrame LastFrame FocalLength Position CameraShift ZNear ZFar`.
//! Lines starting with `#` are comments.

use super::{CameraIntrinsics, FrameGeometry, format_view_number};
use crate::errors::{AppError, AppResult};
use std::fs;
use std::path::Path;
use tracing::info;

/// Base views the renderer interpolates between, as (view number, position)
pub const BASE_VIEWS: [(u32, f64); 2] = [(0, 0.0), (1, 1.0)];

/// Last frame written when the whole input is rendered
const OPEN_LAST_FRAME: u32 = 99_999;

/// Frame range covered by the parameters, inclusive on both ends
pub fn frame_range(geometry: &FrameGeometry) -> (u32, u32) {
    let first = geometry.skips;
    let last = match geometry.frames {
        0 => OPEN_LAST_FRAME.max(first),
        frames => first.saturating_add(frames - 1),
    };
    (first, last)
}

/// Render the file content for the given intrinsics
pub fn render(intrinsics: &CameraIntrinsics, geometry: &FrameGeometry) -> String {
    let (first, last) = frame_range(geometry);
    let mut out = String::from(
        "# ViewNumber FirstFrame LastFrame FocalLength Position CameraShift ZNear ZFar\n",
    );
    for (view, position) in BASE_VIEWS {
        out.push_str(&format!(
            "{} {} {} {} {} {} {} {}\n",
            view,
            first,
            last,
            format_view_number(intrinsics.focal_length),
            format_view_number(position),
            format_view_number(intrinsics.camera_shift),
            format_view_number(intrinsics.z_near),
            format_view_number(intrinsics.z_far),
        ));
    }
    out
}

/// Write a camera parameter file, replacing any earlier one
pub fn write(path: &Path, intrinsics: &CameraIntrinsics, geometry: &FrameGeometry) -> AppResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| AppError::config_io(parent, &e))?;
    }
    fs::write(path, render(intrinsics, geometry)).map_err(|e| AppError::config_io(path, &e))?;
    info!(path = %path.display(), "Wrote camera parameter file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::tests::sample_job;

    #[test]
    fn test_frame_range() {
        let mut geometry = sample_job().geometry;
        assert_eq!(frame_range(&geometry), (0, 49));

        geometry.skips = 10;
        geometry.frames = 1;
        assert_eq!(frame_range(&geometry), (10, 10));

        geometry.frames = 0;
        assert_eq!(frame_range(&geometry), (10, OPEN_LAST_FRAME));
    }

    #[test]
    fn test_render_lines() {
        let job = sample_job();
        let content = render(&job.intrinsics, &job.geometry);
        let lines: Vec<&str> = content.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(
            lines,
            vec![
                "0 0 49 1732.875727 0 943.231169 -34.506386 -2760.510889",
                "1 0 49 1732.875727 1 943.231169 -34.506386 -2760.510889",
            ]
        );
        for line in lines {
            assert_eq!(line.split_whitespace().count(), 8);
        }
    }

    #[test]
    fn test_write_creates_parent_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cfg").join("generated_cam.cfg");
        let job = sample_job();

        write(&path, &job.intrinsics, &job.geometry).expect("write");
        let content = fs::read_to_string(&path).expect("read");
        assert_eq!(content, render(&job.intrinsics, &job.geometry));
    }
}
