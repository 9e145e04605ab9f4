// SPDX-License-Identifier: GPL-3.0-only

//! Settings UI module
//!
//! Renderer location, validation behaviour and configuration recovery.

pub mod view;
