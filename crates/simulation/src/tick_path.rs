use clmm_keeper_domain::math::price_tick::{MAX_TICK, MIN_TICK};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Produces successive pool ticks.
pub trait TickPathGenerator: Send {
    /// Returns the next tick.
    fn next_tick(&mut self) -> i32;

    /// Returns `steps` ticks.
    fn generate(&mut self, steps: usize) -> Vec<i32> {
        (0..steps).map(|_| self.next_tick()).collect()
    }
}

/// Gaussian random walk in tick space.
///
/// A tick step of `sigma` corresponds to a log-price step of
/// `sigma * ln(1.0001)`, so this is a discretised geometric Brownian motion
/// without drift.
pub struct GaussianTickWalk {
    current: f64,
    normal: Option<Normal<f64>>,
    rng: StdRng,
}

impl GaussianTickWalk {
    /// Creates a walk starting at `start` with per-step standard deviation
    /// `sigma_ticks`. Non-finite or negative sigmas are treated as zero.
    pub fn new(start: i32, sigma_ticks: f64, seed: Option<u64>) -> Self {
        let normal = if sigma_ticks.is_finite() && sigma_ticks > 0.0 {
            Normal::new(0.0, sigma_ticks).ok()
        } else {
            None
        };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            current: f64::from(start),
            normal,
            rng,
        }
    }
}

impl TickPathGenerator for GaussianTickWalk {
    fn next_tick(&mut self) -> i32 {
        if let Some(normal) = &self.normal {
            self.current += normal.sample(&mut self.rng);
        }
        self.current = self
            .current
            .clamp(f64::from(MIN_TICK), f64::from(MAX_TICK));
        self.current.round() as i32
    }
}

/// Replays a fixed list of ticks, then holds the last one.
pub struct ReplayTickPath {
    ticks: Vec<i32>,
    cursor: usize,
}

impl ReplayTickPath {
    /// Creates a replay over recorded ticks.
    pub fn new(ticks: Vec<i32>) -> Self {
        Self { ticks, cursor: 0 }
    }
}

impl TickPathGenerator for ReplayTickPath {
    fn next_tick(&mut self) -> i32 {
        let tick = self
            .ticks
            .get(self.cursor)
            .or_else(|| self.ticks.last())
            .copied()
            .unwrap_or(0);
        self.cursor += 1;
        tick
    }
}
