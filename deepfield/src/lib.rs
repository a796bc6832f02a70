//! Synthetic deep-field imaging of simulated galaxy populations
//!
//! This crate turns star-particle catalogs from cosmological
//! simulations into mock multi-band space-telescope observations and
//! extracts source photometry catalogs from them: flux calibration
//! through stellar population tables, intervening-medium transmission
//! and filter curves, calibrated instrument noise with PSF blur, and a
//! multi-threshold detection sweep.

pub mod algo;
pub mod cosmology;
pub mod detect;
pub mod hardware;
pub mod image_proc;
pub mod io;
pub mod photometry;
pub mod pipeline;

// Re-exports for easier access
pub use detect::{GroupingPolicy, PhotometryExtractor, SourceDetector, SourceMeasurement};
pub use hardware::{Band, Camera, PsfKernel, WFC3_IR};
pub use image_proc::synthesis::{ProjectionAxis, RegionMaps};
pub use photometry::{BandConversion, FilterResponse, LuminosityGrid, TransmissionSurface};
pub use pipeline::{
    CalibrationTables, CatalogWriter, InMemorySnapshot, PipelineError, SnapshotContext,
    SnapshotSource,
};
