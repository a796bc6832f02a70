//! Snapshot access: the contract a simulation reader must satisfy, and
//! a plain-text backed implementation of it.

use std::path::Path;

use thiserror::Error;

use crate::io::{read_header_line, read_matrix, TableError};

/// Side length of the full simulation domain in code units.
pub const DOMAIN_EXTENT: f64 = 64.0;

/// Side length of one spatial sub-region in code units. The domain
/// splits into a 4 x 4 x 4 grid of these cells.
pub const REGION_EXTENT: f64 = 16.0;

/// Lower corners of the region cells along one axis.
pub const PARTITION_STARTS: [f64; 4] = [0.0, 16.0, 32.0, 48.0];

/// Slice of [`PARTITION_STARTS`] with saturating bounds: reversed or
/// out-of-range `(start, end)` requests yield an empty slice instead of
/// panicking, so a driver given a bad partition range processes zero
/// regions and exits cleanly.
pub fn partition_slice(start: usize, end: usize) -> &'static [f64] {
    let end = end.min(PARTITION_STARTS.len());
    let start = start.min(end);
    &PARTITION_STARTS[start..end]
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot table error: {0}")]
    Table(#[from] TableError),

    #[error("snapshot {path} header must read 'redshift region_extent_kpc'")]
    MalformedHeader { path: String },

    #[error("snapshot particle table must have 6 columns, found {0}")]
    ColumnCount(usize),
}

/// Star particles of one spatial sub-region, positions recentered on
/// the region center.
#[derive(Debug, Clone, Default)]
pub struct ParticleRegion {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,

    /// Stellar mass in solar masses.
    pub mass: Vec<f64>,

    /// Total metallicity in solar units, both enrichment channels
    /// summed.
    pub metallicity: Vec<f64>,

    /// Stellar age in years. Non-positive entries are filtered at
    /// synthesis time, not here.
    pub age_yr: Vec<f64>,

    /// Half-width of the region in the coordinate units of `x`/`y`/`z`.
    pub half_extent: f64,
}

impl ParticleRegion {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// A loaded simulation snapshot at one redshift.
///
/// The raw snapshot format is a collaborator concern; the pipeline only
/// needs the redshift, the physical size of a region cell, and a
/// bounding-box particle query.
pub trait SnapshotSource: Send + Sync {
    /// Redshift of this snapshot.
    fn redshift(&self) -> f64;

    /// Proper size of one region cell in kiloparsecs, used for the
    /// angular footprint.
    fn region_extent_kpc(&self) -> f64;

    /// Particles inside the cube with the given lower corner and
    /// [`REGION_EXTENT`] side length, recentered on the cube center.
    fn query_region(&self, corner: [f64; 3]) -> ParticleRegion;
}

/// Snapshot held fully in memory, loaded from a whitespace table.
#[derive(Debug, Clone)]
pub struct InMemorySnapshot {
    redshift: f64,
    region_extent_kpc: f64,
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    mass: Vec<f64>,
    metallicity: Vec<f64>,
    age_yr: Vec<f64>,
}

impl InMemorySnapshot {
    /// Load from a text file: one header line `redshift
    /// region_extent_kpc`, then one particle per row as
    /// `x y z mass metallicity age_yr`.
    pub fn from_path(path: &Path) -> Result<Self, SnapshotError> {
        let header = read_header_line(path)?;
        let fields: Vec<f64> = header
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|_| SnapshotError::MalformedHeader {
                path: path.display().to_string(),
            })?;
        if fields.len() != 2 {
            return Err(SnapshotError::MalformedHeader {
                path: path.display().to_string(),
            });
        }

        let table = read_matrix(path, 1)?;
        if table.ncols() != 6 {
            return Err(SnapshotError::ColumnCount(table.ncols()));
        }

        let column = |i: usize| table.column(i).to_vec();
        Ok(Self {
            redshift: fields[0],
            region_extent_kpc: fields[1],
            x: column(0),
            y: column(1),
            z: column(2),
            mass: column(3),
            metallicity: column(4),
            age_yr: column(5),
        })
    }

    /// Build directly from particle arrays. Arrays must be equal
    /// length.
    #[allow(clippy::too_many_arguments)]
    pub fn from_particles(
        redshift: f64,
        region_extent_kpc: f64,
        x: Vec<f64>,
        y: Vec<f64>,
        z: Vec<f64>,
        mass: Vec<f64>,
        metallicity: Vec<f64>,
        age_yr: Vec<f64>,
    ) -> Self {
        assert_eq!(x.len(), y.len());
        assert_eq!(x.len(), z.len());
        assert_eq!(x.len(), mass.len());
        assert_eq!(x.len(), metallicity.len());
        assert_eq!(x.len(), age_yr.len());
        Self {
            redshift,
            region_extent_kpc,
            x,
            y,
            z,
            mass,
            metallicity,
            age_yr,
        }
    }
}

impl SnapshotSource for InMemorySnapshot {
    fn redshift(&self) -> f64 {
        self.redshift
    }

    fn region_extent_kpc(&self) -> f64 {
        self.region_extent_kpc
    }

    fn query_region(&self, corner: [f64; 3]) -> ParticleRegion {
        let half = REGION_EXTENT / 2.0;
        let center = [corner[0] + half, corner[1] + half, corner[2] + half];

        let mut region = ParticleRegion {
            half_extent: half,
            ..ParticleRegion::default()
        };

        for i in 0..self.x.len() {
            let inside = (0..3).all(|axis| {
                let p = [self.x[i], self.y[i], self.z[i]][axis];
                p >= corner[axis] && p <= corner[axis] + REGION_EXTENT
            });
            if !inside {
                continue;
            }
            region.x.push(self.x[i] - center[0]);
            region.y.push(self.y[i] - center[1]);
            region.z.push(self.z[i] - center[2]);
            region.mass.push(self.mass[i]);
            region.metallicity.push(self.metallicity[i]);
            region.age_yr.push(self.age_yr[i]);
        }

        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partition_slice_bounds() {
        assert_eq!(partition_slice(0, 4), &PARTITION_STARTS[..]);
        assert_eq!(partition_slice(1, 3), &[16.0, 32.0]);
        // Reversed and out-of-range requests saturate to empty
        assert!(partition_slice(3, 1).is_empty());
        assert!(partition_slice(4, 4).is_empty());
        assert_eq!(partition_slice(2, 99), &[32.0, 48.0]);
        assert!(partition_slice(99, 99).is_empty());
    }

    fn two_particle_snapshot() -> InMemorySnapshot {
        InMemorySnapshot::from_particles(
            7.0,
            120.0,
            vec![8.0, 40.0],
            vec![8.0, 40.0],
            vec![8.0, 40.0],
            vec![1e6, 2e6],
            vec![0.02, 0.1],
            vec![1e8, 5e8],
        )
    }

    #[test]
    fn test_query_region_selects_and_recenters() {
        let snapshot = two_particle_snapshot();
        let region = snapshot.query_region([0.0, 0.0, 0.0]);

        assert_eq!(region.len(), 1);
        // Particle at 8.0 sits exactly on the region center.
        assert_eq!(region.x[0], 0.0);
        assert_eq!(region.mass[0], 1e6);
        assert_eq!(region.half_extent, 8.0);
    }

    #[test]
    fn test_query_region_outside_particles_empty() {
        let snapshot = two_particle_snapshot();
        let region = snapshot.query_region([0.0, 32.0, 0.0]);
        assert!(region.is_empty());
    }

    #[test]
    fn test_partition_covers_domain() {
        assert_eq!(
            PARTITION_STARTS[PARTITION_STARTS.len() - 1] + REGION_EXTENT,
            DOMAIN_EXTENT
        );
    }

    #[test]
    fn test_from_path_round_trip() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "7.5 118.0").expect("write");
        writeln!(file, "1.0 2.0 3.0 1e6 0.02 2e8").expect("write");
        writeln!(file, "4.0 5.0 6.0 3e6 0.05 4e8").expect("write");

        let snapshot = InMemorySnapshot::from_path(file.path()).expect("load");
        assert_eq!(snapshot.redshift(), 7.5);
        assert_eq!(snapshot.region_extent_kpc(), 118.0);

        let region = snapshot.query_region([0.0, 0.0, 0.0]);
        assert_eq!(region.len(), 2);
        assert_eq!(region.age_yr, vec![2e8, 4e8]);
    }

    #[test]
    fn test_from_path_rejects_bad_header() {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "just-a-redshift").expect("write");

        assert!(matches!(
            InMemorySnapshot::from_path(file.path()),
            Err(SnapshotError::MalformedHeader { .. })
        ));
    }
}
