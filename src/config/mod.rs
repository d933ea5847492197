//! Configuration module for thumbtheme
//!
//! This module contains the user settings structure and path management.

pub mod paths;
mod settings;

pub use paths::Paths;
pub use settings::Settings;

/// Theme identifier written into the host editor settings on activation
pub const THEME_ID: &str = "thumbtheme";

/// Smallest accepted thumbnail edge in pixels
pub const ICON_SIZE_MIN: u32 = 8;

/// Largest accepted thumbnail edge in pixels
pub const ICON_SIZE_MAX: u32 = 32;

/// Default quiet interval between the last change trigger and a regeneration
pub const QUIET_PERIOD_MS: u64 = 500;
