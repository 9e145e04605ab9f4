// SPDX-License-Identifier: GPL-3.0-only

//! Pre-run parameter checks

use super::{RenderJob, Side, ViewLayout};
use crate::constants::limits::MAX_BASELINE;
use crate::errors::ValidationError;

/// Check a job against the view rules, reporting the first violation
///
/// Rules are applied in a fixed order: total view count, left view count,
/// then the width of each side's view fan.
pub fn check(job: &RenderJob, min_total_views: u32) -> Result<(), ValidationError> {
    check_views(&job.views, min_total_views)
}

/// The view rules alone, for feedback while the form is still being filled in
pub fn check_views(views: &ViewLayout, min_total_views: u32) -> Result<(), ValidationError> {
    if views.total < min_total_views {
        return Err(ValidationError::TotalViewCountInvalid {
            total: views.total,
            minimum: min_total_views,
        });
    }

    if views.left > views.total {
        return Err(ValidationError::LeftViewCountExceedsTotal {
            left: views.left,
            total: views.total,
        });
    }

    // NaN compares false against the baseline, so the spacing itself is
    // checked as well
    let spacing = views.spacing;
    let spacing_valid = spacing.is_finite() && spacing > 0.0;
    for (side, count) in [(Side::Left, views.left), (Side::Right, views.right)] {
        let span = (f64::from(count) - 1.0) * spacing;
        if !spacing_valid || span > MAX_BASELINE {
            return Err(ValidationError::ViewSpacingOutOfRange {
                side,
                spacing,
                span,
            });
        }
    }

    Ok(())
}
