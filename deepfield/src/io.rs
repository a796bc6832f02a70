//! Plain-text table loading for the static calibration inputs.
//!
//! All calibration tables (filter curves, ISM transmission grid, stellar
//! population tables, oversampled PSF images) are whitespace-separated
//! numeric text. Only the parsed content matters downstream; the loaders
//! here keep the on-disk formats out of the science modules.

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use thiserror::Error;

/// Errors raised while loading calibration tables from disk.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path} at line {line}")]
    Parse { path: PathBuf, line: usize },

    #[error("Table {path} is empty")]
    Empty { path: PathBuf },

    #[error("Table {path} has rows of unequal length")]
    Ragged { path: PathBuf },

    #[error("Table {path} is missing its header line")]
    MissingHeader { path: PathBuf },
}

/// Read a whitespace-separated numeric matrix, skipping blank lines and
/// `#` comments.
///
/// # Arguments
///
/// * `path` - File to read
/// * `skip_rows` - Leading non-comment rows to discard (e.g. format headers)
///
/// # Returns
///
/// A dense `Array2<f64>` of the parsed values.
pub fn read_matrix(path: &Path, skip_rows: usize) -> Result<Array2<f64>, TableError> {
    let text = fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut skipped = 0;
    for (line_no, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if skipped < skip_rows {
            skipped += 1;
            continue;
        }
        let row: Result<Vec<f64>, _> = trimmed.split_whitespace().map(str::parse).collect();
        match row {
            Ok(values) => rows.push(values),
            Err(_) => {
                return Err(TableError::Parse {
                    path: path.to_path_buf(),
                    line: line_no + 1,
                })
            }
        }
    }

    if rows.is_empty() {
        return Err(TableError::Empty {
            path: path.to_path_buf(),
        });
    }

    let cols = rows[0].len();
    if rows.iter().any(|r| r.len() != cols) {
        return Err(TableError::Ragged {
            path: path.to_path_buf(),
        });
    }

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    let n_rows = flat.len() / cols;
    Ok(Array2::from_shape_vec((n_rows, cols), flat).expect("row-major reshape cannot fail"))
}

/// Return the first non-blank line of a file, for formats that carry
/// metadata (such as a wavelength) in a text header.
pub fn read_header_line(path: &Path) -> Result<String, TableError> {
    let text = fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    text.lines()
        .find(|l| !l.trim().is_empty())
        .map(str::to_owned)
        .ok_or_else(|| TableError::MissingHeader {
            path: path.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_read_matrix_basic() {
        let file = write_temp("1.0 2.0\n3.0 4.0\n");
        let m = read_matrix(file.path(), 0).unwrap();
        assert_eq!(m.dim(), (2, 2));
        assert_eq!(m[[1, 0]], 3.0);
    }

    #[test]
    fn test_read_matrix_skips_comments_and_header() {
        let file = write_temp("# comment\nheader line is skipped? no, numeric:\n");
        // A non-numeric header must be consumed by skip_rows
        let file2 = write_temp("lambda = 1216\n1.0 2.0\n3.0 4.0\n");
        assert!(read_matrix(file.path(), 0).is_err());
        let m = read_matrix(file2.path(), 1).unwrap();
        assert_eq!(m.dim(), (2, 2));
    }

    #[test]
    fn test_read_matrix_rejects_ragged_rows() {
        let file = write_temp("1.0 2.0\n3.0\n");
        assert!(matches!(
            read_matrix(file.path(), 0),
            Err(TableError::Ragged { .. })
        ));
    }

    #[test]
    fn test_read_matrix_rejects_empty() {
        let file = write_temp("# nothing here\n");
        assert!(matches!(
            read_matrix(file.path(), 0),
            Err(TableError::Empty { .. })
        ));
    }

    #[test]
    fn test_read_header_line() {
        let file = write_temp("\nLambda(A) = 1215.67\n1 2 3\n");
        assert_eq!(read_header_line(file.path()).unwrap(), "Lambda(A) = 1215.67");
    }
}
