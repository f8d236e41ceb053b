//! Configuration validation.
//!
//! [`validate_config`] checks every section and reports all problems at
//! once, so a broken file can be fixed in one pass.
//!
//! # Example
//!
//! ```rust
//! use ownaura_config::{Config, validate_config};
//!
//! let mut config = Config::default();
//! assert!(validate_config(&config).is_ok());
//!
//! config.calibration.filter_length = 512;
//! assert!(validate_config(&config).is_err());
//! ```

use thiserror::Error;

use crate::config::{Config, FadeConfig};

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Sample rate is zero.
    #[error("sample rate must be positive")]
    ZeroSampleRate,

    /// A filter length that must be odd is even or too short.
    #[error("'{field}' must be an odd number of at least 3 taps, got {value}")]
    FilterLength {
        /// Name of the field.
        field: &'static str,
        /// Configured value.
        value: usize,
    },

    /// A window or count is zero.
    #[error("'{field}' must be positive")]
    Zero {
        /// Name of the field.
        field: &'static str,
    },

    /// A regularization constant is negative or not finite.
    #[error("'{field}' must be a non-negative number, got {value}")]
    Regularization {
        /// Name of the field.
        field: &'static str,
        /// Configured value.
        value: f64,
    },

    /// Two channel roles of one recording share a channel.
    #[error("'{field}' assigns channel {channel} to more than one role")]
    DuplicateChannel {
        /// Name of the channel table.
        field: &'static str,
        /// Channel used twice.
        channel: usize,
    },

    /// Fade edges are negative or out of order.
    #[error("'{field}' edges must be non-negative and increasing")]
    UnorderedWindow {
        /// Name of the window.
        field: &'static str,
    },

    /// A value is outside its meaningful range.
    #[error("'{field}': {reason}")]
    OutOfRange {
        /// Name of the field.
        field: &'static str,
        /// Why the value is rejected.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_odd_length(field: &'static str, value: usize, errors: &mut Vec<ValidationError>) {
    if value < 3 || value % 2 == 0 {
        errors.push(ValidationError::FilterLength { field, value });
    }
}

fn check_positive(field: &'static str, value: usize, errors: &mut Vec<ValidationError>) {
    if value == 0 {
        errors.push(ValidationError::Zero { field });
    }
}

fn check_regularization(field: &'static str, value: f64, errors: &mut Vec<ValidationError>) {
    if !(value >= 0.0 && value.is_finite()) {
        errors.push(ValidationError::Regularization { field, value });
    }
}

fn check_distinct(field: &'static str, channels: &[usize], errors: &mut Vec<ValidationError>) {
    for (i, &a) in channels.iter().enumerate() {
        if channels[i + 1..].contains(&a) {
            errors.push(ValidationError::DuplicateChannel { field, channel: a });
            return;
        }
    }
}

fn edge_ok((start, end): (f64, f64)) -> bool {
    start >= 0.0 && start <= end && end.is_finite()
}

/// Fade edges must be ordered, and a fade-in must end before the fade-out starts.
fn check_window(field: &'static str, window: &FadeConfig, errors: &mut Vec<ValidationError>) {
    let edges_ok = window.fade_in.is_none_or(edge_ok) && window.fade_out.is_none_or(edge_ok);
    let ordered = match (window.fade_in, window.fade_out) {
        (Some((_, rise_end)), Some((fall_start, _))) => rise_end <= fall_start,
        _ => true,
    };
    if !(edges_ok && ordered) {
        errors.push(ValidationError::UnorderedWindow { field });
    }
}

fn check_positive_seconds(field: &'static str, value: f64, errors: &mut Vec<ValidationError>) {
    if !(value > 0.0 && value.is_finite()) {
        errors.push(ValidationError::OutOfRange {
            field,
            reason: format!("must be a positive duration, got {value}"),
        });
    }
}

/// Validate a whole configuration.
///
/// Returns the single error found, or [`ValidationError::Multiple`] when
/// several checks fail.
pub fn validate_config(config: &Config) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if config.sample_rate == 0 {
        errors.push(ValidationError::ZeroSampleRate);
    }
    let nyquist = f64::from(config.sample_rate) / 2.0;

    let sweep = &config.sweep;
    check_positive_seconds("sweep.duration", sweep.duration, &mut errors);
    check_positive("sweep.repetitions", sweep.repetitions, &mut errors);
    if !(sweep.fade >= 0.0 && sweep.post_silence >= 0.0) {
        errors.push(ValidationError::OutOfRange {
            field: "sweep",
            reason: "fade and post_silence must not be negative".to_string(),
        });
    }
    if !(sweep.amplitude > 0.0 && sweep.amplitude <= 1.0) {
        errors.push(ValidationError::OutOfRange {
            field: "sweep.amplitude",
            reason: format!("must be in (0, 1], got {}", sweep.amplitude),
        });
    }
    let start = sweep.start_frequency.unwrap_or(0.0);
    let end = sweep.end_frequency.unwrap_or(nyquist);
    if sweep.start_frequency.is_some_and(|f| f <= 0.0) || start >= end || end > nyquist {
        errors.push(ValidationError::OutOfRange {
            field: "sweep",
            reason: format!("frequencies must satisfy 0 < start < end <= {nyquist} Hz"),
        });
    }

    let cal = &config.calibration;
    check_regularization("calibration.regularization", cal.regularization, &mut errors);
    check_regularization(
        "calibration.direct_regularization",
        cal.direct_regularization,
        &mut errors,
    );
    check_positive("calibration.window_length", cal.window_length, &mut errors);
    check_odd_length("calibration.filter_length", cal.filter_length, &mut errors);
    check_positive("calibration.loudspeakers", cal.loudspeakers, &mut errors);
    check_distinct(
        "calibration.channels",
        &[cal.channels.measurement_mic, cal.channels.headset],
        &mut errors,
    );

    let room = &config.room;
    check_positive_seconds("room.response_seconds", room.response_seconds, &mut errors);
    if !room.regularization_db.is_finite() {
        errors.push(ValidationError::OutOfRange {
            field: "room.regularization_db",
            reason: "must be finite".to_string(),
        });
    }
    if !edge_ok(room.direct_split) {
        errors.push(ValidationError::UnorderedWindow {
            field: "room.direct_split",
        });
    }
    check_window("room.frequency_window", &room.frequency_window, &mut errors);
    check_distinct(
        "room.channels",
        &[
            room.channels.left_ear,
            room.channels.right_ear,
            room.channels.headset,
        ],
        &mut errors,
    );

    let sp = &config.sound_pressure;
    check_positive("sound_pressure.window_length", sp.window_length, &mut errors);
    check_regularization("sound_pressure.regularization", sp.regularization, &mut errors);
    check_distinct(
        "sound_pressure.calibration_channels",
        &[
            sp.calibration_channels.measurement_mic,
            sp.calibration_channels.headset,
        ],
        &mut errors,
    );
    check_distinct(
        "sound_pressure.convolver_channels",
        &[
            sp.convolver_channels.measurement_mic,
            sp.convolver_channels.headset,
        ],
        &mut errors,
    );

    check_window("time_window", &config.time_window, &mut errors);

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
