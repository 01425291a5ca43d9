use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Visvalingam presimplification: tag every vertex of a path with its
/// effective area, the triangle area at which it would be removed when
/// repeatedly deleting the least-important vertex. Endpoints get infinity so
/// filtering can never detach a path from its neighbors.
///
/// Filtering a path at threshold `t` keeps exactly the vertices whose
/// effective area is `>= t`; areas are monotonic along the removal order, so
/// every threshold yields a consistent coarsening of the original path.
pub fn effective_areas(path: &[[f64; 2]]) -> Vec<f64> {
    let n = path.len();
    let mut areas = vec![f64::INFINITY; n];
    if n < 3 {
        return areas;
    }

    let mut prev: Vec<usize> = (0..n).map(|i| i.wrapping_sub(1)).collect();
    let mut next: Vec<usize> = (1..=n).collect();
    // Version counter per vertex for lazy heap invalidation.
    let mut version = vec![0u32; n];

    #[derive(PartialEq)]
    struct Candidate {
        area: f64,
        idx: usize,
        version: u32,
    }
    impl Eq for Candidate {}
    impl Ord for Candidate {
        fn cmp(&self, other: &Self) -> Ordering {
            // Min-heap by area.
            other
                .area
                .total_cmp(&self.area)
                .then_with(|| other.idx.cmp(&self.idx))
        }
    }
    impl PartialOrd for Candidate {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    fn triangle_area(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
        ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])).abs() / 2.0
    }

    let mut heap = BinaryHeap::with_capacity(n);
    for i in 1..n - 1 {
        heap.push(Candidate {
            area: triangle_area(path[i - 1], path[i], path[i + 1]),
            idx: i,
            version: 0,
        });
    }

    let mut last_area = 0.0f64;
    while let Some(c) = heap.pop() {
        if c.version != version[c.idx] {
            continue; // Stale entry for a re-linked vertex.
        }

        // Monotonic effective area: a vertex never scores below one removed
        // before it.
        last_area = last_area.max(c.area);
        areas[c.idx] = last_area;

        // Unlink and rescore the neighbors.
        let p = prev[c.idx];
        let nx = next[c.idx];
        next[p] = nx;
        if nx < n {
            prev[nx] = p;
        }
        for m in [p, nx] {
            if m == 0 || m >= n - 1 {
                continue;
            }
            version[m] += 1;
            heap.push(Candidate {
                area: triangle_area(path[prev[m]], path[m], path[next[m]]),
                idx: m,
                version: version[m],
            });
        }
    }

    areas
}

/// Keep the vertices whose effective area meets the threshold.
pub fn filter_path(path: &[[f64; 2]], areas: &[f64], threshold: f64) -> Vec<[f64; 2]> {
    path.iter()
        .zip(areas)
        .filter(|(_, &a)| a >= threshold)
        .map(|(p, _)| *p)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_always_survive() {
        let path = [[0.0, 0.0], [1.0, 0.1], [2.0, 0.0]];
        let areas = effective_areas(&path);
        assert_eq!(areas[0], f64::INFINITY);
        assert_eq!(areas[2], f64::INFINITY);
        assert!(areas[1].is_finite());
        assert_eq!(filter_path(&path, &areas, f64::MAX).len(), 2);
    }

    #[test]
    fn collinear_vertices_drop_first() {
        let path = [[0.0, 0.0], [1.0, 0.0], [2.0, 1.0], [3.0, 0.0], [4.0, 0.0]];
        let areas = effective_areas(&path);
        // The middle spike has area 1; the collinear shoulders score below it.
        assert!(areas[2] >= areas[1]);
        assert!(areas[2] >= areas[3]);
        let kept = filter_path(&path, &areas, areas[2]);
        assert!(kept.contains(&[2.0, 1.0]));
        assert_eq!(kept.first(), Some(&[0.0, 0.0]));
        assert_eq!(kept.last(), Some(&[4.0, 0.0]));
    }

    #[test]
    fn areas_are_monotonic_over_removal_order() {
        // A jagged path: sorting interior areas must reproduce a valid removal
        // sequence, i.e. filtering at any vertex's area keeps that vertex.
        let path: Vec<[f64; 2]> = (0..20)
            .map(|i| [i as f64, if i % 3 == 0 { 0.0 } else { (i % 7) as f64 }])
            .collect();
        let areas = effective_areas(&path);
        for (i, &a) in areas.iter().enumerate() {
            let kept = filter_path(&path, &areas, a);
            assert!(kept.contains(&path[i]), "vertex {i} filtered out at its own area");
        }
    }

    #[test]
    fn zero_threshold_keeps_everything() {
        let path = [[0.0, 0.0], [1.0, 2.0], [2.0, -1.0], [3.0, 0.0]];
        let areas = effective_areas(&path);
        assert_eq!(filter_path(&path, &areas, 0.0).len(), 4);
    }

    #[test]
    fn short_paths_untouched() {
        let path = [[0.0, 0.0], [1.0, 1.0]];
        let areas = effective_areas(&path);
        assert!(areas.iter().all(|a| a.is_infinite()));
    }
}
