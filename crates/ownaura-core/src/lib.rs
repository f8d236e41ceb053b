//! OwnAura Core - data model and filter primitives for acoustic measurements
//!
//! This crate holds the pieces shared by every measurement pipeline:
//!
//! ## Data Model
//!
//! - [`MultiChannel`] - Channel-major bank of equal-length signals (filter banks,
//!   loudspeaker responses, multichannel recordings)
//! - [`CalibrationFilter`] - Impulse response plus integer sample shift, the
//!   artifact passed from the compensation designer to the calibration applier
//! - [`ReflectionLevels`] - Per-octave-band direct and reflected sound pressure
//!   levels exported by a room simulation
//!
//! ## Filters
//!
//! - [`Biquad`] - Second-order IIR section with RBJ cookbook coefficients
//! - [`butterworth_q`] - Section Q values for cascaded Butterworth designs
//!
//! ## Utilities
//!
//! - Level conversions: [`db_to_linear`], [`linear_to_db`], [`power_to_db`]
//! - Time conversions: [`seconds_to_samples`], [`samples_to_seconds`]
//!
//! # no_std Support
//!
//! Disable the default `std` feature to use the data model and filters on
//! targets without the standard library:
//!
//! ```toml
//! [dependencies]
//! ownaura-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod math;
pub mod signal;

pub use biquad::{Biquad, Coefficients, butterworth_q, highpass_coefficients, lowpass_coefficients};
pub use math::{
    P_REF, db_to_linear, linear_to_db, power_to_db, samples_to_seconds, seconds_to_samples,
};
pub use signal::{CalibrationFilter, MultiChannel, ReflectionLevels, SignalError};
