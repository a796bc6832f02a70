//! Source detection and photometry extraction contracts.
//!
//! The pipeline treats the detector and the per-source extractor as
//! pluggable services: anything implementing [`SourceDetector`] and
//! [`PhotometryExtractor`] can be substituted, in production or in
//! tests. Reference implementations live in [`segmentation`] and
//! [`extraction`].

pub mod extraction;
pub mod segmentation;

pub use extraction::SegmentExtractor;
pub use segmentation::ThresholdDetector;

use ndarray::{Array2, ArrayView2};

/// A labeled segmentation of an image into detected sources.
///
/// `labels` assigns 0 to background pixels and 1..=count to source
/// pixels; `count` is the number of distinct sources.
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub labels: Array2<u32>,
    pub count: usize,
}

impl Segmentation {
    /// A segmentation with no detected sources.
    pub fn empty(shape: (usize, usize)) -> Self {
        Self {
            labels: Array2::zeros(shape),
            count: 0,
        }
    }
}

/// Whether and how detected sources merge into groups before photometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupingPolicy {
    /// Measure every detected source on its own.
    Isolated,
    /// Merge sources whose centers lie within `max_distance` of each
    /// other (in the coordinate units of the supplied axes) and report
    /// one measurement per group.
    Grouped { max_distance: f64 },
}

/// One extracted source (or source group) in one band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceMeasurement {
    /// Center along the x coordinate axis.
    pub x: f64,
    /// Center along the y coordinate axis.
    pub y: f64,
    /// Summed flux over the segment (or group), map units.
    pub flux: f64,
    /// Number of pixels contributing.
    pub area_px: usize,
}

/// Finds sources in a significance map.
pub trait SourceDetector: Send + Sync {
    /// Detect sources above `threshold` covering at least `min_pixels`
    /// connected pixels.
    fn detect(&self, image: &ArrayView2<f64>, threshold: f64, min_pixels: usize) -> Segmentation;
}

/// Measures per-source photometry given a segmentation.
pub trait PhotometryExtractor: Send + Sync {
    /// Extract one measurement per source (or per group, under a
    /// grouped policy) from a flux map.
    ///
    /// # Arguments
    /// * `flux_map` - Convolved, non-normalized flux image
    /// * `segmentation` - Labels and source count from a detector
    /// * `coords_x` - Coordinate of each column center
    /// * `coords_y` - Coordinate of each row center
    /// * `grouping` - Merge policy applied before measurement
    fn extract(
        &self,
        flux_map: &ArrayView2<f64>,
        segmentation: &Segmentation,
        coords_x: &[f64],
        coords_y: &[f64],
        grouping: GroupingPolicy,
    ) -> Vec<SourceMeasurement>;
}
