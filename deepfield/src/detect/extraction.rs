//! Reference photometry extractor: segment sums with optional
//! distance-based grouping.

use ndarray::ArrayView2;

use super::{GroupingPolicy, PhotometryExtractor, Segmentation, SourceMeasurement};

/// Sums flux over each labeled segment. Under a grouped policy, sources
/// whose centers lie within the maximum pairwise distance are merged
/// into one measurement with summed flux and area.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentExtractor;

impl SegmentExtractor {
    /// Per-label measurement: summed flux and unweighted pixel centroid
    /// in the supplied coordinate axes.
    fn measure_segments(
        flux_map: &ArrayView2<f64>,
        segmentation: &Segmentation,
        coords_x: &[f64],
        coords_y: &[f64],
    ) -> Vec<SourceMeasurement> {
        let n = segmentation.count;
        let mut flux = vec![0.0; n];
        let mut sum_x = vec![0.0; n];
        let mut sum_y = vec![0.0; n];
        let mut area = vec![0usize; n];

        for ((row, col), &label) in segmentation.labels.indexed_iter() {
            if label == 0 {
                continue;
            }
            let i = (label - 1) as usize;
            flux[i] += flux_map[[row, col]];
            sum_x[i] += coords_x[col];
            sum_y[i] += coords_y[row];
            area[i] += 1;
        }

        (0..n)
            .map(|i| SourceMeasurement {
                x: sum_x[i] / area[i] as f64,
                y: sum_y[i] / area[i] as f64,
                flux: flux[i],
                area_px: area[i],
            })
            .collect()
    }

    /// Merge measurements into groups by single-linkage over pairwise
    /// center distance.
    fn group(sources: Vec<SourceMeasurement>, max_distance: f64) -> Vec<SourceMeasurement> {
        let n = sources.len();
        let mut parent: Vec<usize> = (0..n).collect();

        fn find(parent: &mut Vec<usize>, i: usize) -> usize {
            if parent[i] != i {
                let root = find(parent, parent[i]);
                parent[i] = root;
            }
            parent[i]
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let dx = sources[i].x - sources[j].x;
                let dy = sources[i].y - sources[j].y;
                if (dx * dx + dy * dy).sqrt() <= max_distance {
                    let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                    if ri != rj {
                        parent[ri] = rj;
                    }
                }
            }
        }

        let mut merged: Vec<Option<SourceMeasurement>> = vec![None; n];
        let mut members: Vec<usize> = vec![0; n];
        for i in 0..n {
            let root = find(&mut parent, i);
            let s = &sources[i];
            members[root] += 1;
            match &mut merged[root] {
                Some(m) => {
                    m.flux += s.flux;
                    m.area_px += s.area_px;
                    m.x += s.x;
                    m.y += s.y;
                }
                None => merged[root] = Some(*s),
            }
        }

        merged
            .into_iter()
            .zip(members)
            .filter_map(|(m, count)| {
                m.map(|mut m| {
                    m.x /= count as f64;
                    m.y /= count as f64;
                    m
                })
            })
            .collect()
    }
}

impl PhotometryExtractor for SegmentExtractor {
    fn extract(
        &self,
        flux_map: &ArrayView2<f64>,
        segmentation: &Segmentation,
        coords_x: &[f64],
        coords_y: &[f64],
        grouping: GroupingPolicy,
    ) -> Vec<SourceMeasurement> {
        let sources = Self::measure_segments(flux_map, segmentation, coords_x, coords_y);
        match grouping {
            GroupingPolicy::Isolated => sources,
            GroupingPolicy::Grouped { max_distance } => Self::group(sources, max_distance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    /// Two 2x2 sources of known flux on a 10x10 grid with unit-spaced
    /// coordinates.
    fn two_source_scene() -> (Array2<f64>, Segmentation, Vec<f64>, Vec<f64>) {
        let mut flux = Array2::zeros((10, 10));
        let mut seg = Segmentation::empty((10, 10));
        seg.count = 2;

        for (r, c) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            flux[[r, c]] = 2.0;
            seg.labels[[r, c]] = 1;
        }
        for (r, c) in [(7, 7), (7, 8), (8, 7), (8, 8)] {
            flux[[r, c]] = 3.0;
            seg.labels[[r, c]] = 2;
        }

        let coords: Vec<f64> = (0..10).map(|i| i as f64).collect();
        (flux, seg, coords.clone(), coords)
    }

    #[test]
    fn test_isolated_measurements() {
        let (flux, seg, cx, cy) = two_source_scene();
        let rows = SegmentExtractor.extract(
            &flux.view(),
            &seg,
            &cx,
            &cy,
            GroupingPolicy::Isolated,
        );

        assert_eq!(rows.len(), 2);
        assert_relative_eq!(rows[0].flux, 8.0);
        assert_relative_eq!(rows[0].x, 1.5);
        assert_relative_eq!(rows[0].y, 1.5);
        assert_eq!(rows[0].area_px, 4);
        assert_relative_eq!(rows[1].flux, 12.0);
    }

    #[test]
    fn test_grouping_merges_close_sources() {
        let (flux, seg, cx, cy) = two_source_scene();
        // Centers are (1.5, 1.5) and (7.5, 7.5), ~8.49 apart.
        let rows = SegmentExtractor.extract(
            &flux.view(),
            &seg,
            &cx,
            &cy,
            GroupingPolicy::Grouped { max_distance: 10.0 },
        );

        assert_eq!(rows.len(), 1);
        assert_relative_eq!(rows[0].flux, 20.0);
        assert_eq!(rows[0].area_px, 8);
        assert_relative_eq!(rows[0].x, 4.5);
    }

    #[test]
    fn test_grouping_respects_max_distance() {
        let (flux, seg, cx, cy) = two_source_scene();
        let rows = SegmentExtractor.extract(
            &flux.view(),
            &seg,
            &cx,
            &cy,
            GroupingPolicy::Grouped { max_distance: 1.0 },
        );
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_empty_segmentation_yields_empty_rows() {
        let flux = Array2::zeros((5, 5));
        let seg = Segmentation::empty((5, 5));
        let coords: Vec<f64> = (0..5).map(|i| i as f64).collect();

        for grouping in [
            GroupingPolicy::Isolated,
            GroupingPolicy::Grouped { max_distance: 3.0 },
        ] {
            let rows =
                SegmentExtractor.extract(&flux.view(), &seg, &coords, &coords, grouping);
            assert!(rows.is_empty());
        }
    }
}
