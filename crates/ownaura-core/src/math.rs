//! Level and time conversions used across the measurement pipelines.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - amplitude ratios (20·log10)
//! - [`power_to_db`] - energy ratios (10·log10)
//!
//! # Time Conversions
//!
//! - [`seconds_to_samples`] / [`samples_to_seconds`]

use libm::{log10, pow, round};

/// Reference sound pressure in air (20 µPa).
pub const P_REF: f64 = 20e-6;

/// Convert decibels to a linear amplitude ratio.
///
/// # Example
/// ```rust
/// use ownaura_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-12);
/// assert!((db_to_linear(-6.0206) - 0.5).abs() < 1e-4);
/// ```
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    pow(10.0, db / 20.0)
}

/// Convert a linear amplitude ratio to decibels.
///
/// Values below 1e-300 are clamped so the result stays finite.
///
/// # Example
/// ```rust
/// use ownaura_core::linear_to_db;
///
/// assert!((linear_to_db(1.0)).abs() < 1e-12);
/// assert!((linear_to_db(10.0) - 20.0).abs() < 1e-12);
/// ```
#[inline]
pub fn linear_to_db(linear: f64) -> f64 {
    20.0 * log10(linear.max(1e-300))
}

/// Convert an energy (power) ratio to decibels.
#[inline]
pub fn power_to_db(power: f64) -> f64 {
    10.0 * log10(power.max(1e-300))
}

/// Convert a duration to the nearest whole number of samples.
///
/// Negative durations map to zero samples.
#[inline]
pub fn seconds_to_samples(seconds: f64, sample_rate: f64) -> usize {
    round(seconds * sample_rate).max(0.0) as usize
}

/// Convert a sample count to seconds.
#[inline]
pub fn samples_to_seconds(samples: f64, sample_rate: f64) -> f64 {
    samples / sample_rate
}
