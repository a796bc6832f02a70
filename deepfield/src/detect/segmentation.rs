//! Reference detector: thresholding plus connected-component labeling.

use ndarray::ArrayView2;

use super::{Segmentation, SourceDetector};

/// Labels 8-connected components of above-threshold pixels, discarding
/// components smaller than the minimum pixel count.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdDetector;

impl SourceDetector for ThresholdDetector {
    fn detect(&self, image: &ArrayView2<f64>, threshold: f64, min_pixels: usize) -> Segmentation {
        let (rows, cols) = image.dim();
        let mut segmentation = Segmentation::empty((rows, cols));
        let mut visited = vec![false; rows * cols];
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut component: Vec<(usize, usize)> = Vec::new();

        for r in 0..rows {
            for c in 0..cols {
                if visited[r * cols + c] || image[[r, c]] <= threshold {
                    continue;
                }

                // Flood-fill one component.
                component.clear();
                stack.push((r, c));
                visited[r * cols + c] = true;
                while let Some((cr, cc)) = stack.pop() {
                    component.push((cr, cc));
                    for dr in -1i64..=1 {
                        for dc in -1i64..=1 {
                            let nr = cr as i64 + dr;
                            let nc = cc as i64 + dc;
                            if nr < 0 || nc < 0 || nr >= rows as i64 || nc >= cols as i64 {
                                continue;
                            }
                            let (nr, nc) = (nr as usize, nc as usize);
                            if !visited[nr * cols + nc] && image[[nr, nc]] > threshold {
                                visited[nr * cols + nc] = true;
                                stack.push((nr, nc));
                            }
                        }
                    }
                }

                if component.len() >= min_pixels {
                    segmentation.count += 1;
                    let label = segmentation.count as u32;
                    for &(pr, pc) in &component {
                        segmentation.labels[[pr, pc]] = label;
                    }
                }
            }
        }

        segmentation
    }
}
