//! Image-plane operations: histogramming, convolution, and synthesis of
//! per-region mock observations.

pub mod convolve2d;
pub mod histogram;
pub mod synthesis;

pub use convolve2d::{convolve2d, ConvolveMode};
pub use histogram::{histogram2d, pixel_centers, rot90};
pub use synthesis::{synthesize_region, ProjectionAxis, RegionMaps};
