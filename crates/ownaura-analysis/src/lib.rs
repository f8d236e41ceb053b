//! OwnAura Analysis - measurement and calibration DSP for virtual acoustics
//!
//! This crate holds the numerical routines behind every measurement pipeline:
//!
//! - [`fft`] - FFT wrapper with windowing functions
//! - [`conv`] - Linear convolution and FIR filtering
//! - [`sweep`] - Exponential sweep and test signal generation
//! - [`transfer_fn`] - Regularised transfer function estimation
//! - [`spectrum`] - Welch spectral density, cross spectra and coherence
//! - [`xcorr`] - Cross-correlation, delay estimation and time alignment
//! - [`wiener`] - Optimal (Wiener) filter between two recordings
//! - [`window`] - Hann fade windows in time and frequency
//! - [`bands`] - Octave, third-octave and fullband definitions
//! - [`filterbank`] - Butterworth band-pass cascades
//! - [`reverb`] - Schroeder decay analysis and reverberation times
//! - [`room`] - Room gain, voice support and decay from binaural responses
//! - [`fir`] - Least-squares, frequency-sampling and minimum-phase FIR design
//! - [`compensation`] - Compensation filter design
//! - [`calibration`] - Applying a compensation filter to a filter bank
//! - [`spl`] - Sound pressure calibration
//!
//! ## Example Workflow
//!
//! ```rust
//! use ownaura_analysis::sweep::ExponentialSweep;
//! use ownaura_analysis::transfer_fn::{Regularization, transfer_function};
//!
//! // 1. Generate the excitation
//! let sweep = ExponentialSweep::new(0.5, 48000.0)
//!     .start_frequency(100.0)
//!     .end_frequency(8000.0)
//!     .generate()
//!     .unwrap();
//!
//! // 2. Play and record (external); here the system is a pure gain
//! let recording: Vec<f64> = sweep.iter().map(|s| 0.5 * s).collect();
//!
//! // 3. Deconvolve
//! let h = transfer_function(&sweep, &recording, Regularization::default()).unwrap();
//! assert!((h[0] - 0.5).abs() < 1e-9);
//! ```
//!
//! ## Reverberation Time
//!
//! ```rust,ignore
//! use ownaura_analysis::bands::BandSpec;
//! use ownaura_analysis::reverb::{DecayRange, reverberation_time};
//!
//! let t30 = reverberation_time(48000.0, &impulse_response, BandSpec::Octave, DecayRange::T30)?;
//! for band in t30 {
//!     println!("{} Hz: {:?}", band.band.center, band.seconds);
//! }
//! ```

pub mod bands;
pub mod calibration;
pub mod compensation;
pub mod conv;
pub mod error;
pub mod fft;
pub mod filterbank;
pub mod fir;
pub mod reverb;
pub mod room;
pub mod spectrum;
pub mod spl;
pub mod sweep;
pub mod transfer_fn;
pub mod wiener;
pub mod window;
pub mod xcorr;

pub use bands::{Band, BandSpec};
pub use calibration::{CalibratedBank, apply_calibration};
pub use compensation::{
    CompensationDesign, CompensationInputs, CompensationSettings, design_compensation,
    direct_path_response, target_ratio,
};
pub use conv::{convolve, fir_filter};
pub use error::{AnalysisError, Result};
pub use fft::{Fft, Window};
pub use filterbank::BandpassFilter;
pub use reverb::{DecayRange, DecayTime, reverberation_time};
pub use room::{
    BinauralResponse, HatsRecording, RoomParameters, RoomSettings, binaural_response,
    room_parameters,
};
pub use spectrum::{Sides, Spectrum};
pub use spl::{
    SoundPressureCalibration, average_sound_pressure_level, calibrator_gain,
    headset_to_sound_pressure,
};
pub use sweep::ExponentialSweep;
pub use transfer_fn::{Regularization, transfer_function};
pub use wiener::{WienerSettings, wiener_filter};
pub use window::{FadeWindow, crop_time_window, frequency_window, time_window};
pub use xcorr::{Alignment, time_align};
