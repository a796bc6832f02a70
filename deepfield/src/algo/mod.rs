//! Numerical building blocks shared across the pipeline.
//!
//! Small, pure routines with typed errors: quadrature and bilinear
//! interpolation over rectilinear grids.

pub mod grid;
pub mod misc;
pub mod quad;

pub use grid::{Grid2d, GridError};
pub use quad::{adaptive_simpson, trapezoid, QuadError};
