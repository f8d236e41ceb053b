//! Configuration for the OwnAura measurement toolkit.
//!
//! One TOML file holds the settings of every pipeline: sample rate,
//! compensation filter design, room analysis, sound pressure calibration
//! and response cropping. Channel roles are named tables rather than bare
//! indices.
//!
//! # Features
//!
//! - **Config file**: [`Config`] with defaults for every field
//! - **Validation**: [`validate_config`] reports every problem at once
//! - **Paths**: `--config` first, then the platform config directory, then defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use ownaura_config::{Config, load_config};
//!
//! // Resolve and validate the configuration
//! let config = load_config(None).unwrap();
//! println!("filter length: {}", config.calibration.filter_length);
//!
//! // Write the defaults for editing
//! Config::default().save("ownaura.toml").unwrap();
//! ```

mod config;
mod error;

/// Platform-specific configuration paths.
pub mod paths;

/// Configuration validation.
pub mod validation;

pub use config::{
    CalibrationChannels, CalibrationConfig, Config, ConvolverChannels, FadeConfig, HatsChannels,
    RoomConfig, SoundPressureConfig, SweepConfig,
};
pub use error::{ConfigError, Result};
pub use paths::{ensure_user_config_dir, find_config, load_config, user_config_dir, user_config_file};
pub use validation::{ValidationError, ValidationResult, validate_config};
