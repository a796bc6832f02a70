//! Instrument-side models: camera constants, PSF kernels, and
//! calibrated noise realizations.

pub mod camera;
pub mod noise;
pub mod psf;

pub use camera::{Band, Camera, WFC3_IR};
pub use noise::{
    calibrate_noise, noise_significance, CalibratedNoise, NoiseField, MAX_STABILITY_ITERATIONS,
    STABILITY_MIN_PIXELS, STABILITY_THRESHOLD,
};
pub use psf::PsfKernel;
