// R-tree nearest-neighbor index over a planar trace

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use super::PlanarPoint;

/// A trace point with its position in the trace.
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    idx: usize,
    x: f64,
    y: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.x, self.y])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.x - point[0];
        let dy = self.y - point[1];
        dx * dx + dy * dy
    }
}

/// Closest trace point to a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub index: usize,
    pub distance_m: f64,
}

pub struct PointIndex {
    tree: RTree<IndexedPoint>,
}

impl PointIndex {
    pub fn build(points: &[PlanarPoint]) -> Self {
        let indexed: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(idx, p)| IndexedPoint {
                idx,
                x: p.x,
                y: p.y,
            })
            .collect();
        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Nearest point, `None` for an empty index. Ties go to whichever the tree visits first.
    pub fn nearest(&self, query: PlanarPoint) -> Option<Nearest> {
        let target = [query.x, query.y];
        self.tree.nearest_neighbor(&target).map(|p| Nearest {
            index: p.idx,
            distance_m: p.distance_2(&target).sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_empty_index_has_no_neighbor() {
        let index = PointIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.nearest(PlanarPoint::new(1.0, 1.0)), None);
    }

    #[test]
    fn test_nearest_returns_trace_position() {
        let points: Vec<PlanarPoint> = (0..20).map(|i| PlanarPoint::new(i as f64 * 5.0, 0.0)).collect();
        let index = PointIndex::build(&points);
        let nearest = index.nearest(PlanarPoint::new(41.0, 3.0)).unwrap();
        assert_eq!(nearest.index, 8);
        assert_relative_eq!(nearest.distance_m, 10.0f64.sqrt());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_matches_linear_scan(
            coords in prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 1..200),
            qx in -600.0f64..600.0,
            qy in -600.0f64..600.0,
        ) {
            let points: Vec<PlanarPoint> = coords.iter().map(|(x, y)| PlanarPoint::new(*x, *y)).collect();
            let query = PlanarPoint::new(qx, qy);
            let best = points
                .iter()
                .map(|p| p.distance_to(&query))
                .fold(f64::INFINITY, f64::min);
            let nearest = PointIndex::build(&points).nearest(query).unwrap();
            prop_assert!((nearest.distance_m - best).abs() < 1e-9);
        }
    }
}
