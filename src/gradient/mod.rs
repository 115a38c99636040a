//! Seeded 2D gradient noise and the fractal functions derived from it.
//!
//! Every function here is a pure function of (seed, x, y). The permutation table
//! is built once in [`GradientNoise::new`] and only read afterwards, so a single
//! instance can be shared across threads without locking.
//!
//! # Example
//!
//! ```
//! use survival_terrain::gradient::GradientNoise;
//!
//! let noise = GradientNoise::new(42);
//! let h = noise.octave_noise(12.5, -3.25, 4, 0.5);
//! assert!((-1.0..=1.0).contains(&h));
//! ```

mod cellular;
mod simplex;

/// Gradient directions for both lattices: the classic 12-vector set with the
/// z component dropped for planar sampling.
pub(crate) const GRADIENTS: [[f64; 2]; 12] = [
    [1.0, 1.0],
    [-1.0, 1.0],
    [1.0, -1.0],
    [-1.0, -1.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [1.0, 0.0],
    [-1.0, 0.0],
    [0.0, 1.0],
    [0.0, -1.0],
    [0.0, 1.0],
    [0.0, -1.0],
];

const TABLE_SIZE: usize = 256;

/// Default frequency multiplier between octaves
pub const DEFAULT_LACUNARITY: f64 = 2.0;

/// Frequency of the two warp lookups relative to the sampled point
const WARP_FREQUENCY: f64 = 0.5;

/// Seeded improved-gradient noise source.
#[derive(Clone)]
pub struct GradientNoise {
    seed: u64,
    /// Shuffled 0..256, stored twice so corner hashing never wraps
    perm: [u8; TABLE_SIZE * 2],
}

impl GradientNoise {
    /// Build the permutation table for `seed` with a linear-congruential shuffle.
    pub fn new(seed: u64) -> Self {
        let mut table = [0u8; TABLE_SIZE];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let mut state = seed;
        for i in (1..TABLE_SIZE).rev() {
            state = lcg_step(state);
            let j = ((state >> 33) % (i as u64 + 1)) as usize;
            table.swap(i, j);
        }

        let mut perm = [0u8; TABLE_SIZE * 2];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i % TABLE_SIZE];
        }

        Self { seed, perm }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub(crate) fn perm(&self, index: usize) -> usize {
        self.perm[index] as usize
    }

    /// Classic improved gradient noise, in [-1, 1].
    pub fn noise(&self, x: f64, y: f64) -> f64 {
        let x0 = x.floor();
        let y0 = y.floor();
        let xi = lattice_index(x0);
        let yi = lattice_index(y0);
        let fx = x - x0;
        let fy = y - y0;

        let u = fade(fx);
        let v = fade(fy);

        let a = self.perm(xi);
        let b = self.perm(xi + 1);
        let aa = self.perm(a + yi);
        let ab = self.perm(a + yi + 1);
        let ba = self.perm(b + yi);
        let bb = self.perm(b + yi + 1);

        let bottom = lerp(u, grad(aa, fx, fy), grad(ba, fx - 1.0, fy));
        let top = lerp(u, grad(ab, fx, fy - 1.0), grad(bb, fx - 1.0, fy - 1.0));

        lerp(v, bottom, top).clamp(-1.0, 1.0)
    }

    /// Multi-octave sum with the default lacunarity of 2, normalized to [-1, 1].
    pub fn octave_noise(&self, x: f64, y: f64, octaves: u32, persistence: f64) -> f64 {
        self.fbm(x, y, octaves, persistence, DEFAULT_LACUNARITY)
    }

    /// Fractal Brownian motion: amplitude scales by `persistence` and frequency by
    /// `lacunarity` each octave. Normalized by the total amplitude.
    pub fn fbm(&self, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            total += self.noise(x * frequency, y * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }

    /// Ridged multifractal in [0, 1]: each octave contributes `(1 - |n|)^2`, so
    /// zero crossings of the base noise become sharp crests.
    pub fn ridged_noise(&self, x: f64, y: f64, octaves: u32, persistence: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..octaves {
            let n = 1.0 - self.noise(x * frequency, y * frequency).abs();
            total += n * n * amplitude;
            max_amplitude += amplitude;
            amplitude *= persistence;
            frequency *= DEFAULT_LACUNARITY;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }

    /// Unnormalized sum of `|noise|` over octaves (amplitude halves, frequency
    /// doubles). Always non-negative, bounded by 2.
    pub fn turbulence(&self, x: f64, y: f64, octaves: u32) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for _ in 0..octaves {
            total += self.noise(x * frequency, y * frequency).abs() * amplitude;
            amplitude *= 0.5;
            frequency *= DEFAULT_LACUNARITY;
        }

        total
    }

    /// Sample after displacing the point by two independent low-frequency lookups.
    pub fn domain_warp(&self, x: f64, y: f64, strength: f64) -> f64 {
        let wx = x * WARP_FREQUENCY;
        let wy = y * WARP_FREQUENCY;
        // Constant offsets decorrelate the two displacement lookups
        let dx = self.noise(wx + 5.2, wy + 1.3);
        let dy = self.noise(wx + 1.7, wy + 9.2);
        self.noise(x + dx * strength, y + dy * strength)
    }
}

impl std::fmt::Debug for GradientNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradientNoise").field("seed", &self.seed).finish()
    }
}

/// Lets a `GradientNoise` plug into combinators from the `noise` crate.
impl ::noise::NoiseFn<f64, 2> for GradientNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.noise(point[0], point[1])
    }
}

#[inline]
fn lcg_step(state: u64) -> u64 {
    state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407)
}

/// Wrap a floored coordinate into the permutation table (handles negatives).
#[inline]
pub(crate) fn lattice_index(floored: f64) -> usize {
    ((floored as i64) & 255) as usize
}

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`
#[inline]
fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

#[inline]
pub(crate) fn grad(hash: usize, x: f64, y: f64) -> f64 {
    let g = GRADIENTS[hash % GRADIENTS.len()];
    g[0] * x + g[1] * y
}
