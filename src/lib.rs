// SPDX-License-Identifier: MPL-2.0

//! View Synthesis - a desktop front-end for a depth-image-based view renderer
//!
//! The renderer is an external program that reads its inputs from
//! configuration files. This crate collects the parameters of a rendering
//! job, writes them into the renderer's configuration, runs the renderer and
//! restores the configuration afterwards.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Main application logic and UI
//! - [`synthesis`]: Job model, validation, configuration patching and renderer invocation
//! - [`config`]: User configuration handling
//! - [`errors`]: Error types
//!
//! # Example
//!
//! ```ignore
//! // This is a GUI application, typically run via:
//! // view-synthesis
//! // or headless:
//! // view-synthesis render --texture t.yuv --depth d.yuv --output out/
//! ```

pub mod app;
pub mod config;
pub mod constants;
pub mod errors;
pub mod i18n;
pub mod synthesis;

// Re-export commonly used types
pub use app::{AppModel, Message};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use synthesis::{RenderInvoker, RenderJob, Side};
