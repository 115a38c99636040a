//! Cellular (Worley-style) functions over a jittered unit-cell lattice.
//!
//! Each unit cell owns one feature point placed by an integer hash of the cell
//! coordinates, so the point set is a pure function of the seed.

use super::GradientNoise;

const PRIME_X: u64 = 73_856_093;
const PRIME_Y: u64 = 19_349_663;

const SALT_POINT_X: u64 = 0;
const SALT_POINT_Y: u64 = 0x9E37_79B9;
const SALT_VALUE: u64 = 0x85EB_CA6B;

impl GradientNoise {
    /// Distance from `(x, y)` to the nearest feature point. Zero at a feature
    /// point, at most `sqrt(2)` away in practice.
    pub fn cellular(&self, x: f64, y: f64) -> f64 {
        self.nearest_cell(x, y).1
    }

    /// Pseudo-random value in [0, 1) owned by the cell whose feature point is
    /// nearest to `(x, y)`. Constant across each Voronoi region.
    pub fn voronoi(&self, x: f64, y: f64) -> f64 {
        let ((cx, cy), _) = self.nearest_cell(x, y);
        self.cell_hash(cx, cy, SALT_VALUE)
    }

    fn nearest_cell(&self, x: f64, y: f64) -> ((i64, i64), f64) {
        let base_x = x.floor() as i64;
        let base_y = y.floor() as i64;

        let mut best = (base_x, base_y);
        let mut best_dist_sq = f64::MAX;

        for dy in -1..=1 {
            for dx in -1..=1 {
                let cx = base_x.wrapping_add(dx);
                let cy = base_y.wrapping_add(dy);
                let (px, py) = self.feature_point(cx, cy);
                let ddx = px - x;
                let ddy = py - y;
                let dist_sq = ddx * ddx + ddy * ddy;
                if dist_sq < best_dist_sq {
                    best_dist_sq = dist_sq;
                    best = (cx, cy);
                }
            }
        }

        (best, best_dist_sq.sqrt())
    }

    fn feature_point(&self, cx: i64, cy: i64) -> (f64, f64) {
        (
            cx as f64 + self.cell_hash(cx, cy, SALT_POINT_X),
            cy as f64 + self.cell_hash(cx, cy, SALT_POINT_Y),
        )
    }

    /// Two-prime spatial hash finished with a 64-bit avalanche, mapped to [0, 1).
    fn cell_hash(&self, cx: i64, cy: i64, salt: u64) -> f64 {
        let mut h = (cx as u64).wrapping_mul(PRIME_X)
            ^ (cy as u64).wrapping_mul(PRIME_Y)
            ^ self.seed().wrapping_add(salt);
        h ^= h >> 33;
        h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
        h ^= h >> 33;
        h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        h ^= h >> 33;
        (h >> 11) as f64 / (1u64 << 53) as f64
    }
}
