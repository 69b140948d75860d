// spatial.rs - Uniform grid for neighbour queries
//
// Cells are one query radius wide, so every pair closer than the radius sits
// in the same or an adjacent cell. Rebuilt from scratch each draw; buckets are
// reused between rebuilds.

use super::distance;

pub struct SpatialHash {
    cell: f32,
    cols: usize,
    rows: usize,
    // offset so slightly off-surface points still hash
    origin: (f32, f32),
    buckets: Vec<Vec<usize>>,
}

impl SpatialHash {
    pub fn new(cell: f32) -> Self {
        Self { cell: cell.max(1.0), cols: 0, rows: 0, origin: (0.0, 0.0), buckets: Vec::new() }
    }

    /// Bucket every point. Non-finite points are skipped.
    pub fn rebuild(&mut self, points: &[(f32, f32)]) {
        for b in &mut self.buckets { b.clear(); }
        if points.is_empty() { return; }

        let mut lo = (f32::INFINITY, f32::INFINITY);
        let mut hi = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for &(x, y) in points.iter().filter(|p| p.0.is_finite() && p.1.is_finite()) {
            lo = (lo.0.min(x), lo.1.min(y));
            hi = (hi.0.max(x), hi.1.max(y));
        }
        if !lo.0.is_finite() { return; }

        self.origin = lo;
        self.cols = ((hi.0 - lo.0) / self.cell) as usize + 1;
        self.rows = ((hi.1 - lo.1) / self.cell) as usize + 1;
        let cells = self.cols * self.rows;
        if self.buckets.len() < cells {
            self.buckets.resize_with(cells, Vec::new);
        }

        for (i, &p) in points.iter().enumerate() {
            if let Some(c) = self.cell_of(p) {
                self.buckets[c.1 * self.cols + c.0].push(i);
            }
        }
    }

    fn cell_of(&self, (x, y): (f32, f32)) -> Option<(usize, usize)> {
        if !(x.is_finite() && y.is_finite()) { return None; }
        let cx = ((x - self.origin.0) / self.cell) as usize;
        let cy = ((y - self.origin.1) / self.cell) as usize;
        (cx < self.cols && cy < self.rows).then_some((cx, cy))
    }

    /// Visit each unordered pair (i < j) closer than `radius`, with their distance.
    /// `radius` must not exceed the cell size.
    pub fn for_each_pair<F>(&self, points: &[(f32, f32)], radius: f32, mut f: F)
    where
        F: FnMut(usize, usize, f32),
    {
        for (i, &p) in points.iter().enumerate() {
            let Some((cx, cy)) = self.cell_of(p) else { continue };
            for ny in cy.saturating_sub(1)..=(cy + 1).min(self.rows - 1) {
                for nx in cx.saturating_sub(1)..=(cx + 1).min(self.cols - 1) {
                    for &j in &self.buckets[ny * self.cols + nx] {
                        if j <= i { continue; }
                        let d = distance(p, points[j]);
                        if d < radius {
                            f(i, j, d);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn brute(points: &[(f32, f32)], r: f32) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for i in 0..points.len() {
            for j in i + 1..points.len() {
                if distance(points[i], points[j]) < r { out.push((i, j)); }
            }
        }
        out
    }

    #[test]
    fn matches_brute_force() {
        let mut rng = SmallRng::seed_from_u64(11);
        let points: Vec<(f32, f32)> = (0..300)
            .map(|_| (rng.gen_range(-20.0..820.0), rng.gen_range(-20.0..620.0)))
            .collect();

        let mut hash = SpatialHash::new(90.0);
        hash.rebuild(&points);
        let mut found = Vec::new();
        hash.for_each_pair(&points, 90.0, |i, j, _| found.push((i, j)));
        found.sort_unstable();

        assert_eq!(found, brute(&points, 90.0));
    }

    #[test]
    fn rebuild_forgets_old_points() {
        let mut hash = SpatialHash::new(10.0);
        hash.rebuild(&[(0.0, 0.0), (1.0, 1.0)]);
        let fresh = [(0.0, 0.0), (500.0, 500.0)];
        hash.rebuild(&fresh);
        let mut n = 0;
        hash.for_each_pair(&fresh, 10.0, |_, _, _| n += 1);
        assert_eq!(n, 0);
    }

    #[test]
    fn skips_non_finite() {
        let pts = [(f32::NAN, 0.0), (0.0, 0.0), (2.0, 0.0)];
        let mut hash = SpatialHash::new(10.0);
        hash.rebuild(&pts);
        let mut pairs = Vec::new();
        hash.for_each_pair(&pts, 10.0, |i, j, _| pairs.push((i, j)));
        assert_eq!(pairs, vec![(1, 2)]);
    }
}
