//! Catalog output: per-snapshot info files and append-mode object
//! catalogs, one file per (grouping, band, threshold).

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::hardware::Camera;

use super::survey::{CatalogBlock, DETECTION_THRESHOLDS, MIN_SOURCE_PIXELS};

/// Writes catalog rows for one simulation into one output directory.
///
/// Catalogs open in append mode so successive regions (and successive
/// partition runs over the same simulation) accumulate into the same
/// files. When region synthesis is parallelized, one writer must own
/// all appends so records never interleave.
pub struct CatalogWriter {
    out_dir: PathBuf,
    simulation_name: String,
}

impl CatalogWriter {
    /// Create the output directory (and parents) if needed.
    pub fn create(out_dir: &Path, simulation_name: &str) -> io::Result<Self> {
        fs::create_dir_all(out_dir)?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
            simulation_name: simulation_name.to_owned(),
        })
    }

    /// Append the human-readable snapshot summary to the info file.
    pub fn write_info(
        &self,
        camera: &Camera,
        redshift: f64,
        partition_range: (usize, usize),
        theta_arcsec: f64,
    ) -> io::Result<()> {
        let path = self
            .out_dir
            .join(format!("info_{}.dat", self.simulation_name));
        let mut file = BufWriter::new(OpenOptions::new().create(true).append(true).open(path)?);

        writeln!(file, "--------------------")?;
        writeln!(file, "Telescope: {}", camera.name)?;
        writeln!(file, "Simulation name: {}", self.simulation_name)?;
        writeln!(file, "Redshift: {:.6}", redshift)?;
        writeln!(
            file,
            "N of boxes to process: {}, {}",
            partition_range.0, partition_range.1
        )?;
        writeln!(file, "Theta [arcsec]: {:.6}", theta_arcsec)?;
        let thresholds: Vec<String> = DETECTION_THRESHOLDS
            .iter()
            .map(|t| format!("{:.3}", t.value))
            .collect();
        writeln!(file, "Flux threshold: {}", thresholds.join(", "))?;
        writeln!(file, "Npix: {:.3}", MIN_SOURCE_PIXELS as f64)?;
        file.flush()
    }

    /// Append one region's blocks to their catalog files.
    ///
    /// An empty block still touches its file, so a zero-detection
    /// region leaves the same file set behind as any other.
    pub fn append_blocks(&self, camera: &Camera, blocks: &[CatalogBlock]) -> io::Result<()> {
        for block in blocks {
            let path = self.out_dir.join(format!(
                "objects_{}_{}_{}_{}_{}.dat",
                block.grouping_label,
                self.simulation_name,
                block.band.label(),
                camera.name,
                block.threshold_label,
            ));
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let mut file = BufWriter::new(file);
            for row in &block.rows {
                writeln!(
                    file,
                    "{} {} {} {}",
                    sci(row.x),
                    sci(row.y),
                    sci(row.flux),
                    sci(row.area_px as f64),
                )?;
            }
            file.flush()?;
        }
        Ok(())
    }

    /// Open a fresh handle on one catalog file, mostly for tests.
    pub fn open_catalog(
        &self,
        camera: &Camera,
        grouping_label: &str,
        band_label: &str,
        threshold_label: &str,
    ) -> io::Result<File> {
        File::open(self.out_dir.join(format!(
            "objects_{}_{}_{}_{}_{}.dat",
            grouping_label, self.simulation_name, band_label, camera.name, threshold_label,
        )))
    }
}

/// Fixed-width scientific notation with a signed two-digit exponent,
/// e.g. `1.23456e+04`.
fn sci(value: f64) -> String {
    let formatted = format!("{:.5e}", value);
    let (mantissa, exponent) = formatted
        .split_once('e')
        .expect("float formatting always emits an exponent");
    match exponent.strip_prefix('-') {
        Some(digits) => format!("{}e-{:0>2}", mantissa, digits),
        None => format!("{}e+{:0>2}", mantissa, exponent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::SourceMeasurement;
    use crate::hardware::{Band, WFC3_IR};
    use std::io::Read;
    use tempfile::tempdir;

    fn one_row_block() -> CatalogBlock {
        CatalogBlock {
            band: Band::F125W,
            threshold_label: "0",
            grouping_label: "iso",
            rows: vec![SourceMeasurement {
                x: 1.5,
                y: -0.25,
                flux: 1234.5,
                area_px: 9,
            }],
        }
    }

    fn read_to_string(mut file: File) -> String {
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        text
    }

    #[test]
    fn test_sci_formatting() {
        assert_eq!(sci(1234.5), "1.23450e+03");
        assert_eq!(sci(-0.25), "-2.50000e-01");
        assert_eq!(sci(0.0), "0.00000e+00");
        assert_eq!(sci(9.0), "9.00000e+00");
    }

    #[test]
    fn test_append_accumulates_rows() {
        let dir = tempdir().unwrap();
        let writer = CatalogWriter::create(dir.path(), "3").unwrap();
        let blocks = [one_row_block()];

        writer.append_blocks(&WFC3_IR, &blocks).unwrap();
        writer.append_blocks(&WFC3_IR, &blocks).unwrap();

        let text = read_to_string(
            writer
                .open_catalog(&WFC3_IR, "iso", "125", "0")
                .unwrap(),
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "1.50000e+00 -2.50000e-01 1.23450e+03 9.00000e+00");
        assert_eq!(lines[0], lines[1]);
    }

    #[test]
    fn test_empty_block_touches_file() {
        let dir = tempdir().unwrap();
        let writer = CatalogWriter::create(dir.path(), "0").unwrap();
        let block = CatalogBlock {
            rows: vec![],
            ..one_row_block()
        };

        writer.append_blocks(&WFC3_IR, &[block]).unwrap();
        let text = read_to_string(
            writer
                .open_catalog(&WFC3_IR, "iso", "125", "0")
                .unwrap(),
        );
        assert!(text.is_empty());
    }

    #[test]
    fn test_info_file_contents() {
        let dir = tempdir().unwrap();
        let writer = CatalogWriter::create(dir.path(), "5").unwrap();
        writer.write_info(&WFC3_IR, 7.25, (0, 4), 27.5).unwrap();

        let text = read_to_string(File::open(dir.path().join("info_5.dat")).unwrap());
        assert!(text.contains("Telescope: HST"));
        assert!(text.contains("Simulation name: 5"));
        assert!(text.contains("Redshift: 7.250000"));
        assert!(text.contains("N of boxes to process: 0, 4"));
        assert!(text.contains("Flux threshold: 2.500, 2.750, 3.000, 3.500, 4.000"));
        assert!(text.contains("Npix: 3.000"));
    }
}
