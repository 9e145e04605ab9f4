// SPDX-License-Identifier: GPL-3.0-only

//! Job form fields
//!
//! The form keeps the raw text of every input so partially typed values
//! survive, and checks each value as it changes for per-field feedback.
//! A [`RenderJob`] is only assembled when a run starts.

use crate::constants::{defaults, file_filters};
use crate::errors::{AppError, AppResult};
use crate::fl;
use crate::synthesis::{CameraIntrinsics, FrameGeometry, RenderJob, ViewLayout};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Inputs of the job form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    TextureFile,
    DepthFile,
    CameraFile,
    OutputDir,
    TotalViews,
    LeftViews,
    RightViews,
    ViewSpacing,
    Width,
    Height,
    Frames,
    Skips,
    FocalLength,
    CameraShift,
    ZNear,
    ZFar,
}

/// How a field's text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    File,
    Directory,
    Count,
    Real,
}

/// Why a field's current text is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Empty,
    NotANumber,
    NotPositive,
    NoSuchFile,
    NoSuchDirectory,
}

impl Field {
    pub const COUNT: usize = 16;

    pub const FILES: [Field; 4] = [
        Field::TextureFile,
        Field::DepthFile,
        Field::CameraFile,
        Field::OutputDir,
    ];
    pub const VIEWS: [Field; 4] = [
        Field::TotalViews,
        Field::LeftViews,
        Field::RightViews,
        Field::ViewSpacing,
    ];
    pub const GEOMETRY: [Field; 4] = [Field::Width, Field::Height, Field::Frames, Field::Skips];
    pub const CAMERA: [Field; 4] = [
        Field::FocalLength,
        Field::CameraShift,
        Field::ZNear,
        Field::ZFar,
    ];

    pub fn all() -> impl Iterator<Item = Field> {
        Self::FILES
            .into_iter()
            .chain(Self::VIEWS)
            .chain(Self::GEOMETRY)
            .chain(Self::CAMERA)
    }

    fn index(self) -> usize {
        self as usize
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::TextureFile | Field::DepthFile | Field::CameraFile => FieldKind::File,
            Field::OutputDir => FieldKind::Directory,
            Field::TotalViews
            | Field::LeftViews
            | Field::RightViews
            | Field::Width
            | Field::Height
            | Field::Frames
            | Field::Skips => FieldKind::Count,
            Field::ViewSpacing
            | Field::FocalLength
            | Field::CameraShift
            | Field::ZNear
            | Field::ZFar => FieldKind::Real,
        }
    }

    fn must_be_positive(self) -> bool {
        matches!(self, Field::ViewSpacing | Field::Width | Field::Height)
    }

    /// Filters offered by the file chooser for this field
    pub fn filters(self) -> &'static [file_filters::Filter] {
        match self {
            Field::TextureFile | Field::DepthFile => &[file_filters::YUV, file_filters::ALL],
            Field::CameraFile => &[file_filters::CFG, file_filters::ALL],
            _ => &[],
        }
    }

    pub fn label(self) -> String {
        match self {
            Field::TextureFile => fl!("field-texture"),
            Field::DepthFile => fl!("field-depth"),
            Field::CameraFile => fl!("field-camera-file"),
            Field::OutputDir => fl!("field-output-dir"),
            Field::TotalViews => fl!("field-total-views"),
            Field::LeftViews => fl!("field-left-views"),
            Field::RightViews => fl!("field-right-views"),
            Field::ViewSpacing => fl!("field-view-spacing"),
            Field::Width => fl!("field-width"),
            Field::Height => fl!("field-height"),
            Field::Frames => fl!("field-frames"),
            Field::Skips => fl!("field-skips"),
            Field::FocalLength => fl!("field-focal-length"),
            Field::CameraShift => fl!("field-camera-shift"),
            Field::ZNear => fl!("field-z-near"),
            Field::ZFar => fl!("field-z-far"),
        }
    }

    /// Check a raw value for this field
    pub fn check(self, value: &str) -> Result<(), FieldProblem> {
        let value = value.trim();
        if value.is_empty() {
            return Err(FieldProblem::Empty);
        }

        match self.kind() {
            FieldKind::File if !Path::new(value).is_file() => Err(FieldProblem::NoSuchFile),
            FieldKind::Directory if !Path::new(value).is_dir() => {
                Err(FieldProblem::NoSuchDirectory)
            }
            FieldKind::File | FieldKind::Directory => Ok(()),
            FieldKind::Count => {
                let count: u32 = value.parse().map_err(|_| FieldProblem::NotANumber)?;
                if self.must_be_positive() && count == 0 {
                    return Err(FieldProblem::NotPositive);
                }
                Ok(())
            }
            FieldKind::Real => {
                let real: f64 = value.parse().map_err(|_| FieldProblem::NotANumber)?;
                if !real.is_finite() {
                    return Err(FieldProblem::NotANumber);
                }
                if self.must_be_positive() && real <= 0.0 {
                    return Err(FieldProblem::NotPositive);
                }
                Ok(())
            }
        }
    }
}

impl FieldProblem {
    pub fn message(self) -> String {
        match self {
            FieldProblem::Empty => fl!("problem-empty"),
            FieldProblem::NotANumber => fl!("problem-not-a-number"),
            FieldProblem::NotPositive => fl!("problem-not-positive"),
            FieldProblem::NoSuchFile => fl!("problem-no-such-file"),
            FieldProblem::NoSuchDirectory => fl!("problem-no-such-directory"),
        }
    }
}

/// Raw text and check result of every form field
#[derive(Debug, Clone)]
pub struct FormFields {
    values: [String; Field::COUNT],
    statuses: [Result<(), FieldProblem>; Field::COUNT],
}

impl FormFields {
    /// Form prefilled with the default job parameters
    pub fn with_defaults(camera_file: &Path) -> Self {
        let mut fields = Self {
            values: Default::default(),
            statuses: [Err(FieldProblem::Empty); Field::COUNT],
        };

        fields.set(Field::CameraFile, camera_file.display().to_string());
        fields.set(Field::TotalViews, defaults::TOTAL_VIEWS.to_string());
        fields.set(Field::LeftViews, defaults::LEFT_VIEWS.to_string());
        fields.set(Field::RightViews, defaults::RIGHT_VIEWS.to_string());
        fields.set(Field::ViewSpacing, defaults::VIEW_SPACING.to_string());
        fields.set(Field::Width, defaults::WIDTH.to_string());
        fields.set(Field::Height, defaults::HEIGHT.to_string());
        fields.set(Field::Frames, defaults::FRAMES.to_string());
        fields.set(Field::Skips, defaults::SKIPS.to_string());
        fields.set(Field::FocalLength, defaults::FOCAL_LENGTH.to_string());
        fields.set(Field::CameraShift, defaults::CAMERA_SHIFT.to_string());
        fields.set(Field::ZNear, defaults::Z_NEAR.to_string());
        fields.set(Field::ZFar, defaults::Z_FAR.to_string());
        fields
    }

    pub fn value(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn status(&self, field: Field) -> Result<(), FieldProblem> {
        self.statuses[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        self.statuses[field.index()] = field.check(&value);
        self.values[field.index()] = value;
    }

    /// Re-run the checks, picking up files created or removed since
    pub fn recheck(&mut self) {
        for field in Field::FILES {
            self.statuses[field.index()] = field.check(&self.values[field.index()]);
        }
    }

    /// Whether every field the run needs holds an acceptable value
    pub fn is_complete(&self, camera_from_intrinsics: bool) -> bool {
        Field::all()
            .filter(|field| !(camera_from_intrinsics && *field == Field::CameraFile))
            .all(|field| self.status(field).is_ok())
    }

    /// View layout, once all view fields parse
    pub fn view_layout(&self) -> Option<ViewLayout> {
        Some(ViewLayout {
            total: self.parse(Field::TotalViews).ok()?,
            left: self.parse(Field::LeftViews).ok()?,
            right: self.parse(Field::RightViews).ok()?,
            spacing: self.parse(Field::ViewSpacing).ok()?,
        })
    }

    /// Assemble the job for a run
    ///
    /// With `camera_from_intrinsics` the camera file field is not required,
    /// since the parameter file is generated from the intrinsics.
    pub fn to_job(&self, camera_from_intrinsics: bool) -> AppResult<RenderJob> {
        let camera_file = if camera_from_intrinsics {
            PathBuf::from(self.value(Field::CameraFile).trim())
        } else {
            self.path(Field::CameraFile)?
        };

        Ok(RenderJob {
            texture_file: self.path(Field::TextureFile)?,
            depth_file: self.path(Field::DepthFile)?,
            camera_file,
            output_dir: self.path(Field::OutputDir)?,
            views: ViewLayout {
                total: self.parse(Field::TotalViews)?,
                left: self.parse(Field::LeftViews)?,
                right: self.parse(Field::RightViews)?,
                spacing: self.parse(Field::ViewSpacing)?,
            },
            geometry: FrameGeometry {
                width: self.parse(Field::Width)?,
                height: self.parse(Field::Height)?,
                frames: self.parse(Field::Frames)?,
                skips: self.parse(Field::Skips)?,
            },
            intrinsics: CameraIntrinsics {
                focal_length: self.parse(Field::FocalLength)?,
                camera_shift: self.parse(Field::CameraShift)?,
                z_near: self.parse(Field::ZNear)?,
                z_far: self.parse(Field::ZFar)?,
            },
        }
        .into_absolute())
    }

    fn path(&self, field: Field) -> AppResult<PathBuf> {
        let value = self.value(field);
        field.check(value).map_err(|problem| form_error(field, problem))?;
        Ok(PathBuf::from(value.trim()))
    }

    fn parse<T: FromStr>(&self, field: Field) -> AppResult<T> {
        let value = self.value(field);
        field.check(value).map_err(|problem| form_error(field, problem))?;
        value
            .trim()
            .parse()
            .map_err(|_| form_error(field, FieldProblem::NotANumber))
    }
}

fn form_error(field: Field, problem: FieldProblem) -> AppError {
    AppError::Form {
        field: field.label(),
        message: problem.message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct Inputs {
        _dir: tempfile::TempDir,
        texture: PathBuf,
        depth: PathBuf,
        camera: PathBuf,
        output: PathBuf,
    }

    fn inputs() -> Inputs {
        let dir = tempfile::tempdir().expect("tempdir");
        let texture = dir.path().join("texture.yuv");
        let depth = dir.path().join("depth.yuv");
        let camera = dir.path().join("cam.cfg");
        let output = dir.path().join("out");
        fs::write(&texture, b"").expect("texture");
        fs::write(&depth, b"").expect("depth");
        fs::write(&camera, b"").expect("camera");
        fs::create_dir(&output).expect("output");
        Inputs {
            _dir: dir,
            texture,
            depth,
            camera,
            output,
        }
    }

    fn filled(inputs: &Inputs) -> FormFields {
        let mut fields = FormFields::with_defaults(&inputs.camera);
        fields.set(Field::TextureFile, inputs.texture.display().to_string());
        fields.set(Field::DepthFile, inputs.depth.display().to_string());
        fields.set(Field::OutputDir, inputs.output.display().to_string());
        fields
    }

    #[test]
    fn test_field_lists_cover_every_field() {
        let fields: Vec<Field> = Field::all().collect();
        assert_eq!(fields.len(), Field::COUNT);
        for (i, field) in fields.iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn test_numeric_checks() {
        assert_eq!(Field::TotalViews.check("28"), Ok(()));
        assert_eq!(Field::TotalViews.check(" 0 "), Ok(()));
        assert_eq!(Field::TotalViews.check("-1"), Err(FieldProblem::NotANumber));
        assert_eq!(Field::TotalViews.check("2.5"), Err(FieldProblem::NotANumber));
        assert_eq!(Field::Width.check("0"), Err(FieldProblem::NotPositive));
        assert_eq!(Field::ViewSpacing.check("0"), Err(FieldProblem::NotPositive));
        assert_eq!(Field::ViewSpacing.check("NaN"), Err(FieldProblem::NotANumber));
        assert_eq!(Field::ZNear.check("-34.506386"), Ok(()));
        assert_eq!(Field::ZFar.check(""), Err(FieldProblem::Empty));
    }

    #[test]
    fn test_path_checks() {
        let inputs = inputs();
        let texture = inputs.texture.display().to_string();
        let output = inputs.output.display().to_string();
        assert_eq!(Field::TextureFile.check(&texture), Ok(()));
        assert_eq!(Field::TextureFile.check(&output), Err(FieldProblem::NoSuchFile));
        assert_eq!(Field::OutputDir.check(&output), Ok(()));
        assert_eq!(Field::OutputDir.check(&texture), Err(FieldProblem::NoSuchDirectory));
    }

    #[test]
    fn test_defaults_form_a_job_once_paths_are_set() {
        let inputs = inputs();
        let fields = filled(&inputs);
        assert!(fields.is_complete(false));

        let job = fields.to_job(false).expect("job");
        assert_eq!(job.texture_file, inputs.texture);
        assert_eq!(job.camera_file, inputs.camera);
        assert_eq!(job.views.total, defaults::TOTAL_VIEWS);
        assert_eq!(job.views.spacing, defaults::VIEW_SPACING);
        assert_eq!(job.geometry.height, defaults::HEIGHT);
        assert_eq!(job.intrinsics.z_far, defaults::Z_FAR);
    }

    #[test]
    fn test_empty_form_is_incomplete() {
        let fields = FormFields::with_defaults(Path::new("/nonexistent/cam.cfg"));
        assert!(!fields.is_complete(false));
        assert!(matches!(fields.to_job(false), Err(AppError::Form { .. })));
        assert_eq!(fields.status(Field::TextureFile), Err(FieldProblem::Empty));
        assert_eq!(fields.status(Field::TotalViews), Ok(()));
    }

    #[test]
    fn test_invalid_number_rejects_job() {
        let inputs = inputs();
        let mut fields = filled(&inputs);
        fields.set(Field::LeftViews, "fourteen");
        assert_eq!(fields.status(Field::LeftViews), Err(FieldProblem::NotANumber));
        assert!(fields.view_layout().is_none());
        assert!(matches!(fields.to_job(false), Err(AppError::Form { .. })));
    }

    #[test]
    fn test_camera_file_optional_when_generated() {
        let inputs = inputs();
        let mut fields = filled(&inputs);
        fields.set(Field::CameraFile, "/nonexistent/cam.cfg");

        assert!(!fields.is_complete(false));
        assert!(fields.to_job(false).is_err());
        assert!(fields.is_complete(true));
        assert!(fields.to_job(true).is_ok());
    }

    #[test]
    fn test_recheck_sees_new_files() {
        let inputs = inputs();
        let late = inputs.output.join("late.yuv");
        let mut fields = filled(&inputs);
        fields.set(Field::DepthFile, late.display().to_string());
        assert_eq!(fields.status(Field::DepthFile), Err(FieldProblem::NoSuchFile));

        fs::write(&late, b"").expect("write");
        fields.recheck();
        assert_eq!(fields.status(Field::DepthFile), Ok(()));
    }
}
