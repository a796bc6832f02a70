//! The per-snapshot observation context: everything derived from one
//! redshift, built once and shared read-only by every region worker.

use std::path::Path;

use log::info;
use ndarray::Array2;

use crate::cosmology;
use crate::detect::SourceDetector;
use crate::hardware::{calibrate_noise, Band, CalibratedNoise, Camera, PsfKernel};
use crate::image_proc::histogram::pixel_centers;
use crate::image_proc::synthesis::{synthesize_region, ProjectionAxis, RegionMaps};
use crate::io::read_matrix;
use crate::photometry::{
    BandConversion, FilterResponse, LuminosityGrid, TransmissionSurface,
};

use super::snapshot::ParticleRegion;
use super::PipelineError;

/// The static calibration inputs, loaded once per process run. None of
/// these depend on redshift.
pub struct CalibrationTables {
    pub luminosity: LuminosityGrid,
    pub transmission: TransmissionSurface,

    /// Filter curves indexed by [`Band::index`].
    pub filters: Vec<FilterResponse>,

    /// Oversampled PSF reference images indexed by [`Band::index`].
    pub psf_images: Vec<Array2<f64>>,
}

impl CalibrationTables {
    /// Load the calibration set from its conventional layout: a `drt/`
    /// directory of population tables plus per-band filter and PSF
    /// files next to the transmission grid.
    pub fn load_dir(dir: &Path) -> Result<Self, PipelineError> {
        let luminosity = LuminosityGrid::load_dir(&dir.join("drt"))?;
        let transmission =
            TransmissionSurface::from_path(&dir.join("table_transmition_ISM.dat"))?;

        let mut filters = Vec::with_capacity(Band::ALL.len());
        let mut psf_images = Vec::with_capacity(Band::ALL.len());
        for band in Band::ALL {
            filters.push(FilterResponse::from_path(
                &dir.join(format!("filter_{}.dat", band.filter_stem())),
            )?);
            psf_images.push(read_matrix(
                &dir.join(format!("psf_{}.dat", band.filter_stem())),
                0,
            )?);
        }

        Ok(Self {
            luminosity,
            transmission,
            filters,
            psf_images,
        })
    }
}

/// Everything one snapshot's regions share: band conversions at the
/// snapshot redshift, the detector-sampled PSFs, and the calibrated
/// noise realization at the snapshot's grid resolution.
///
/// Immutable after construction; hand one reference to each region
/// worker.
pub struct SnapshotContext {
    pub camera: Camera,
    pub redshift: f64,

    /// Angular size of one region cell on the sky.
    pub theta_arcsec: f64,

    /// Detector pixels per region image side.
    pub nbins: usize,

    /// Per-band conversion interpolants, indexed by [`Band::index`].
    pub conversions: Vec<BandConversion>,

    /// Per-band PSF kernels, indexed by [`Band::index`].
    pub psfs: Vec<PsfKernel>,

    /// The shared noise realization accepted by the stability search.
    pub noise: CalibratedNoise,
}

impl SnapshotContext {
    /// Build the context for one snapshot.
    ///
    /// Fails if any band has redshifted outside the tabulated coverage;
    /// that is a configuration error, not something a region can
    /// recover from.
    pub fn build(
        camera: Camera,
        redshift: f64,
        region_extent_kpc: f64,
        tables: &CalibrationTables,
        detector: &dyn SourceDetector,
        rng_seed: Option<u64>,
    ) -> Result<Self, PipelineError> {
        let theta_arcsec = cosmology::angular_size_arcsec(region_extent_kpc, redshift)?;
        let nbins = camera.detector_bins(theta_arcsec);
        info!(
            "snapshot context: z = {:.4}, theta = {:.3} arcsec, {} bins",
            redshift, theta_arcsec, nbins
        );

        let conversions: Vec<BandConversion> = Band::ALL
            .iter()
            .map(|&band| {
                BandConversion::build(
                    band,
                    redshift,
                    &tables.luminosity,
                    &tables.transmission,
                    &tables.filters[band.index()],
                )
            })
            .collect::<Result<_, _>>()?;

        let psfs: Vec<PsfKernel> = Band::ALL
            .iter()
            .map(|&band| PsfKernel::rebin(&tables.psf_images[band.index()].view(), &camera))
            .collect();

        let noise = calibrate_noise(&camera, nbins, &psfs, detector, rng_seed);

        Ok(Self {
            camera,
            redshift,
            theta_arcsec,
            nbins,
            conversions,
            psfs,
            noise,
        })
    }

    /// Synthesize the mock observation of one region along a projection
    /// axis. Particles with non-positive age are filtered here, not
    /// treated as errors.
    pub fn observe(&self, region: &ParticleRegion, axis: ProjectionAxis) -> RegionMaps {
        let n = region.len();
        let mut x = Vec::with_capacity(n);
        let mut y = Vec::with_capacity(n);
        let mut z = Vec::with_capacity(n);
        let mut band_fluxes: Vec<Vec<f64>> = self
            .conversions
            .iter()
            .map(|_| Vec::with_capacity(n))
            .collect();

        for i in 0..n {
            let age = region.age_yr[i];
            if age <= 0.0 {
                continue;
            }
            let log_age = age.log10();

            x.push(region.x[i]);
            y.push(region.y[i]);
            z.push(region.z[i]);
            for (conversion, fluxes) in self.conversions.iter().zip(&mut band_fluxes) {
                fluxes
                    .push(conversion.flux_per_mass(region.metallicity[i], log_age) * region.mass[i]);
            }
        }

        let (px, py) = axis.project(&x, &y, &z);
        synthesize_region(
            px,
            py,
            &band_fluxes,
            region.half_extent,
            self.nbins,
            &self.noise.fields,
            &self.psfs,
        )
    }

    /// Angular coordinate of each pixel center, in arcseconds from the
    /// region center; shared by both image axes.
    pub fn pixel_coords(&self) -> Vec<f64> {
        let half = self.theta_arcsec / 2.0;
        pixel_centers(-half, half, self.nbins)
    }
}
