//! CLI command implementations.

pub mod align;
pub mod apply_calibration;
pub mod calibration_filter;
pub mod common;
pub mod deconvolve;
pub mod info;
pub mod reverb;
pub mod room_params;
pub mod sound_pressure;
pub mod spl;
pub mod sweep;
pub mod time_window;
pub mod transfer;
