//! The detection sweep: every threshold crossed with every grouping
//! policy, per band.

use crate::detect::{GroupingPolicy, PhotometryExtractor, SourceDetector, SourceMeasurement};
use crate::hardware::Band;
use crate::image_proc::synthesis::RegionMaps;

/// One detection threshold and the label it carries in catalog file
/// names.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdSpec {
    /// Threshold in summed-significance units.
    pub value: f64,
    pub label: &'static str,
}

/// One grouping policy and its catalog file label.
#[derive(Debug, Clone, Copy)]
pub struct GroupingSpec {
    pub policy: GroupingPolicy,
    pub label: &'static str,
}

/// The detection thresholds every region is swept over, in ascending
/// order.
pub const DETECTION_THRESHOLDS: [ThresholdSpec; 5] = [
    ThresholdSpec { value: 2.5, label: "0" },
    ThresholdSpec { value: 2.75, label: "1" },
    ThresholdSpec { value: 3.0, label: "2" },
    ThresholdSpec { value: 3.5, label: "3" },
    ThresholdSpec { value: 4.0, label: "4" },
];

/// The grouping policies applied to each threshold's segmentation.
/// Grouping distances are in the angular units of the pixel coordinate
/// axes.
pub const GROUPING_POLICIES: [GroupingSpec; 3] = [
    GroupingSpec {
        policy: GroupingPolicy::Isolated,
        label: "iso",
    },
    GroupingSpec {
        policy: GroupingPolicy::Grouped { max_distance: 3.0 },
        label: "gr_3",
    },
    GroupingSpec {
        policy: GroupingPolicy::Grouped { max_distance: 1.0 },
        label: "gr_1",
    },
];

/// Minimum connected pixel count for a catalog detection.
pub const MIN_SOURCE_PIXELS: usize = 3;

/// The extracted rows of one (threshold, grouping, band) cell for one
/// region.
#[derive(Debug, Clone)]
pub struct CatalogBlock {
    pub band: Band,
    pub threshold_label: &'static str,
    pub grouping_label: &'static str,
    pub rows: Vec<SourceMeasurement>,
}

/// Run the full detection sweep over one region's maps.
///
/// Detection runs once per threshold on the combined significance map;
/// photometry runs per band on the convolved (non-normalized) flux
/// maps. Zero detections still produce a block with no rows, so every
/// catalog file advances in step.
pub fn survey_region(
    maps: &RegionMaps,
    coords: &[f64],
    detector: &dyn SourceDetector,
    extractor: &dyn PhotometryExtractor,
) -> Vec<CatalogBlock> {
    let mut blocks =
        Vec::with_capacity(DETECTION_THRESHOLDS.len() * GROUPING_POLICIES.len() * Band::ALL.len());

    for threshold in &DETECTION_THRESHOLDS {
        let segmentation = detector.detect(
            &maps.combined_significance.view(),
            threshold.value,
            MIN_SOURCE_PIXELS,
        );

        for grouping in &GROUPING_POLICIES {
            for band in Band::ALL {
                let rows = extractor.extract(
                    &maps.convolved[band.index()].view(),
                    &segmentation,
                    coords,
                    coords,
                    grouping.policy,
                );
                blocks.push(CatalogBlock {
                    band,
                    threshold_label: threshold.label,
                    grouping_label: grouping.label,
                    rows,
                });
            }
        }
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{SegmentExtractor, ThresholdDetector};
    use ndarray::Array2;

    /// Maps with one bright 3x3 source well above every threshold.
    fn bright_scene(nbins: usize) -> (RegionMaps, Vec<f64>) {
        let mut significance = Array2::zeros((nbins, nbins));
        let mut flux = Array2::zeros((nbins, nbins));
        for r in 5..8 {
            for c in 5..8 {
                significance[[r, c]] = 50.0;
                flux[[r, c]] = 7.0;
            }
        }

        let maps = RegionMaps {
            convolved: vec![flux.clone(), flux.clone(), flux],
            significance: vec![
                significance.clone(),
                significance.clone(),
                significance.clone(),
            ],
            combined_significance: significance,
        };
        let coords: Vec<f64> = (0..nbins).map(|i| i as f64 * 0.13).collect();
        (maps, coords)
    }

    #[test]
    fn test_sweep_emits_full_grid_of_blocks() {
        let (maps, coords) = bright_scene(16);
        let blocks = survey_region(&maps, &coords, &ThresholdDetector, &SegmentExtractor);

        assert_eq!(blocks.len(), 5 * 3 * 3);
        // Every (threshold, grouping, band) cell appears exactly once.
        for threshold in &DETECTION_THRESHOLDS {
            for grouping in &GROUPING_POLICIES {
                for band in Band::ALL {
                    let matching = blocks
                        .iter()
                        .filter(|b| {
                            b.band == band
                                && b.threshold_label == threshold.label
                                && b.grouping_label == grouping.label
                        })
                        .count();
                    assert_eq!(matching, 1);
                }
            }
        }
    }

    #[test]
    fn test_bright_source_detected_at_every_threshold() {
        let (maps, coords) = bright_scene(16);
        let blocks = survey_region(&maps, &coords, &ThresholdDetector, &SegmentExtractor);

        for block in &blocks {
            assert_eq!(block.rows.len(), 1);
            assert!((block.rows[0].flux - 63.0).abs() < 1e-9);
            assert_eq!(block.rows[0].area_px, 9);
        }
    }

    #[test]
    fn test_empty_map_still_yields_all_blocks() {
        let nbins = 12;
        let zeros = Array2::zeros((nbins, nbins));
        let maps = RegionMaps {
            convolved: vec![zeros.clone(), zeros.clone(), zeros.clone()],
            significance: vec![zeros.clone(), zeros.clone(), zeros.clone()],
            combined_significance: zeros,
        };
        let coords: Vec<f64> = (0..nbins).map(|i| i as f64).collect();

        let blocks = survey_region(&maps, &coords, &ThresholdDetector, &SegmentExtractor);
        assert_eq!(blocks.len(), 45);
        assert!(blocks.iter().all(|b| b.rows.is_empty()));
    }

    #[test]
    fn test_thresholds_ascend() {
        for pair in DETECTION_THRESHOLDS.windows(2) {
            assert!(pair[0].value < pair[1].value);
        }
    }
}
