//! Snapshot-level orchestration: calibration context, detection sweep,
//! and catalog output.

pub mod context;
pub mod snapshot;
pub mod survey;
pub mod writer;

pub use context::{CalibrationTables, SnapshotContext};
pub use snapshot::{
    partition_slice, InMemorySnapshot, ParticleRegion, SnapshotError, SnapshotSource,
    DOMAIN_EXTENT, PARTITION_STARTS, REGION_EXTENT,
};
pub use survey::{
    survey_region, CatalogBlock, GroupingSpec, ThresholdSpec, DETECTION_THRESHOLDS,
    GROUPING_POLICIES, MIN_SOURCE_PIXELS,
};
pub use writer::CatalogWriter;

use thiserror::Error;

use crate::cosmology::CosmologyError;
use crate::io::TableError;
use crate::photometry::conversion::CalibrationError;
use crate::photometry::filter::FilterError;
use crate::photometry::luminosity::LuminosityError;
use crate::photometry::transmission::TransmissionError;

/// Anything that can stop a snapshot from being processed. Calibration
/// and table failures abort the snapshot; data-quality issues inside a
/// region are filtered, not raised.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error(transparent)]
    Cosmology(#[from] CosmologyError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Luminosity(#[from] LuminosityError),

    #[error(transparent)]
    Transmission(#[from] TransmissionError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Projection axis index must be 0, 1 or 2, got {0}")]
    InvalidAxis(usize),
}
