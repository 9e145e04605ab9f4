// SPDX-License-Identifier: GPL-3.0-only

//! Transient patching of renderer configuration files
//!
//! The renderer reads its inputs from `Key : value` lines. Before a pass the
//! job's inputs are appended to the side's configuration file, and after the
//! pass every line starting with an injected key is filtered out again, so
//! the file returns to its template content.

use super::{RenderJob, Side};
use crate::constants::config_keys;
use crate::errors::{AppError, AppResult};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Lines appended to a configuration file by one pass
#[derive(Debug)]
#[must_use = "an applied patch must be reverted after the renderer exits"]
pub struct ConfigPatch {
    path: PathBuf,
    /// The template lacked a final newline and one was written before the patch
    separator_added: bool,
}

impl ConfigPatch {
    /// Configuration file this patch was applied to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the injected lines, restoring the template content
    pub fn revert(self) -> AppResult<usize> {
        let removed = remove_injected_lines(&self.path, &config_keys::INJECTED)?;
        if self.separator_added {
            strip_final_newline(&self.path)?;
        }
        Ok(removed)
    }
}

/// The `(key, value)` pairs injected for one side, in write order
///
/// Both input slots carry the same texture/depth pair: the renderer expects
/// two base views and is fed the single source camera twice.
pub fn input_lines(job: &RenderJob, side: Side) -> Vec<(&'static str, String)> {
    let texture = job.texture_file.display().to_string();
    let depth = job.depth_file.display().to_string();

    vec![
        (config_keys::VIDEO_INPUT_0, texture.clone()),
        (config_keys::DEPTH_INPUT_0, depth.clone()),
        (config_keys::VIDEO_INPUT_1, texture),
        (config_keys::DEPTH_INPUT_1, depth),
        (
            config_keys::SYNTH_VIEW_CAMERA_NUMBERS,
            side.synth_view_numbers(&job.views),
        ),
        (
            config_keys::SYNTH_OUTPUT_FILE_BASE_NAME,
            side.output_base_name(&job.output_dir).display().to_string(),
        ),
    ]
}

/// Append the job's input lines for `side` to the configuration file
///
/// The file must already exist. Injected lines left behind by an interrupted
/// run are removed first.
pub fn append_input_lines(path: &Path, job: &RenderJob, side: Side) -> AppResult<ConfigPatch> {
    let lines = input_lines(job, side);
    // A line break inside a value would leave a fragment that no key matches
    if let Some((key, value)) = lines
        .iter()
        .find(|(_, value)| value.contains(['\n', '\r']))
    {
        return Err(AppError::Form {
            field: (*key).to_string(),
            message: format!("{:?} contains a line break", value),
        });
    }

    let existing = fs::read(path).map_err(|e| AppError::config_io(path, &e))?;

    let existing = if contains_injected_lines(&existing, &config_keys::INJECTED) {
        warn!(
            path = %path.display(),
            "Configuration still holds injected lines from an earlier run, removing them"
        );
        remove_injected_lines(path, &config_keys::INJECTED)?;
        fs::read(path).map_err(|e| AppError::config_io(path, &e))?
    } else {
        existing
    };

    let separator_added = existing.last().is_some_and(|&byte| byte != b'\n');

    let mut block = String::new();
    if separator_added {
        block.push('\n');
    }
    for (key, value) in lines {
        block.push_str(key);
        block.push_str(" : ");
        block.push_str(&value);
        block.push('\n');
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| AppError::config_io(path, &e))?;
    file.write_all(block.as_bytes())
        .map_err(|e| AppError::config_io(path, &e))?;

    info!(path = %path.display(), %side, "Injected renderer input lines");
    debug!(block = %block.trim_end(), "Injected block");

    Ok(ConfigPatch {
        path: path.to_path_buf(),
        separator_added,
    })
}

/// Rewrite the file without the lines that start with any of `keys`
///
/// Retained lines keep their order and exact bytes. The file is left
/// untouched when nothing matches. Returns the number of removed lines.
pub fn remove_injected_lines(path: &Path, keys: &[&str]) -> AppResult<usize> {
    let content = fs::read(path).map_err(|e| AppError::config_io(path, &e))?;

    let mut kept = Vec::with_capacity(content.len());
    let mut removed = 0;
    for line in content.split_inclusive(|&byte| byte == b'\n') {
        if line_matches(line, keys) {
            removed += 1;
        } else {
            kept.extend_from_slice(line);
        }
    }

    if removed == 0 {
        debug!(path = %path.display(), "No injected lines to remove");
        return Ok(0);
    }

    fs::write(path, kept).map_err(|e| AppError::config_io(path, &e))?;
    info!(path = %path.display(), removed, "Removed injected lines");
    Ok(removed)
}

fn contains_injected_lines(content: &[u8], keys: &[&str]) -> bool {
    content
        .split_inclusive(|&byte| byte == b'\n')
        .any(|line| line_matches(line, keys))
}

fn line_matches(line: &[u8], keys: &[&str]) -> bool {
    keys.iter().any(|key| line.starts_with(key.as_bytes()))
}

fn strip_final_newline(path: &Path) -> AppResult<()> {
    let mut content = fs::read(path).map_err(|e| AppError::config_io(path, &e))?;
    if content.last() == Some(&b'\n') {
        content.pop();
        fs::write(path, content).map_err(|e| AppError::config_io(path, &e))?;
    }
    Ok(())
}
