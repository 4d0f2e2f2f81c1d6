//! Stress-majorization descent over the extended rich graph.
//!
//! Each iteration moves every point to the weighted barycenter of the
//! positions its pairwise target distances prescribe, which monotonically
//! decreases the weighted stress without a step-size search. An optional
//! projection corrects the raw positions after every iteration to satisfy
//! hard separation constraints.

use nalgebra::DMatrix;

use super::project::BoundProjection;

/// Convergence: maximum per-iteration positional delta below this means the
/// layout has settled.
pub const CONVERGENCE_THRESHOLD: f64 = 1e-3;

const COINCIDENT_EPS: f64 = 1e-9;

pub struct Descent {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    targets: DMatrix<f64>,
    /// Pair weight matrix; entries above 1 mark indirect pairs that are
    /// allowed to relax apart once they exceed their target (p-stress).
    pub weights: Option<DMatrix<f64>>,
    pub project: Option<BoundProjection>,
    rng: XorShift64Star,
}

impl Descent {
    pub fn new(x: Vec<f64>, y: Vec<f64>, targets: DMatrix<f64>) -> Descent {
        debug_assert_eq!(x.len(), targets.nrows());
        Descent {
            x,
            y,
            targets,
            weights: None,
            project: None,
            rng: XorShift64Star::new(1),
        }
    }

    /// Run one bounded batch of iterations. Returns true when the maximum
    /// positional delta dropped below [`CONVERGENCE_THRESHOLD`] before the
    /// budget ran out.
    pub fn run(&mut self, iterations: usize) -> bool {
        for _ in 0..iterations {
            if self.step() < CONVERGENCE_THRESHOLD {
                return true;
            }
        }
        false
    }

    /// One majorization sweep plus projection; returns the maximum
    /// displacement over all points. Points update in place (Gauss-Seidel)
    /// rather than from a snapshot, which keeps small systems from
    /// oscillating around their fixed point.
    fn step(&mut self) -> f64 {
        let n = self.x.len();
        let x0 = self.x.clone();
        let y0 = self.y.clone();

        for u in 0..n {
            let mut sx = 0.0;
            let mut sy = 0.0;
            let mut sw = 0.0;

            for v in 0..n {
                if v == u {
                    continue;
                }
                let d = self.targets[(u, v)];
                if !d.is_finite() || d <= 0.0 {
                    continue;
                }

                let mut dx = self.x[u] - self.x[v];
                let mut dy = self.y[u] - self.y[v];
                let mut l = (dx * dx + dy * dy).sqrt();
                if l < COINCIDENT_EPS {
                    // Coincident points get a deterministic pseudo-random
                    // push direction instead of a NaN gradient.
                    let angle = std::f64::consts::TAU * self.rng.next_f64_unit();
                    dx = angle.cos();
                    dy = angle.sin();
                    l = 1.0;
                }

                if let Some(g) = &self.weights {
                    if g[(u, v)] > 1.0 && l > d {
                        continue;
                    }
                }

                let w = 1.0 / (d * d);
                sx += w * (self.x[v] + d * dx / l);
                sy += w * (self.y[v] + d * dy / l);
                sw += w;
            }

            if sw > 0.0 {
                self.x[u] = sx / sw;
                self.y[u] = sy / sw;
            }
        }

        if let Some(projection) = &self.project {
            projection.apply(&mut self.x, &mut self.y);
        }

        let mut max_delta: f64 = 0.0;
        for u in 0..n {
            let dx = self.x[u] - x0[u];
            let dy = self.y[u] - y0[u];
            max_delta = max_delta.max((dx * dx + dy * dy).sqrt());
        }
        max_delta
    }
}

/// xorshift64* with the canonical multiply constant; deterministic across
/// runs so layouts are reproducible.
pub struct XorShift64Star {
    state: u64,
}

impl XorShift64Star {
    pub fn new(seed: u64) -> XorShift64Star {
        XorShift64Star {
            state: seed.max(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    pub fn next_f64_unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(pairs: &[(usize, usize, f64)], n: usize) -> DMatrix<f64> {
        let mut d = DMatrix::from_element(n, n, f64::INFINITY);
        for i in 0..n {
            d[(i, i)] = 0.0;
        }
        for &(a, b, w) in pairs {
            d[(a, b)] = w;
            d[(b, a)] = w;
        }
        d
    }

    #[test]
    fn two_points_settle_at_their_target_distance() {
        let mut descent = Descent::new(
            vec![0.0, 1.0],
            vec![0.0, 0.0],
            targets(&[(0, 1, 100.0)], 2),
        );
        assert!(descent.run(10_000));
        let dist = (descent.x[0] - descent.x[1]).hypot(descent.y[0] - descent.y[1]);
        assert!((dist - 100.0).abs() < 0.1, "distance = {dist}");
    }

    #[test]
    fn coincident_points_at_the_origin_separate_without_nan() {
        let mut descent = Descent::new(
            vec![0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0],
            targets(&[(0, 1, 50.0), (1, 2, 50.0), (0, 2, 50.0)], 3),
        );
        descent.run(5_000);
        for u in 0..3 {
            assert!(descent.x[u].is_finite() && descent.y[u].is_finite());
        }
        let d01 = (descent.x[0] - descent.x[1]).hypot(descent.y[0] - descent.y[1]);
        assert!(d01 > 1.0, "points still coincident: {d01}");
    }

    #[test]
    fn indirect_pairs_beyond_target_are_left_alone() {
        // Pair (0, 2) is indirect (weight 2) and already further apart than
        // its target; p-stress must not pull it back in.
        let mut w = DMatrix::from_element(3, 3, 2.0);
        for i in 0..3 {
            w[(i, i)] = 0.0;
        }
        w[(0, 1)] = 1.0;
        w[(1, 0)] = 1.0;
        w[(1, 2)] = 1.0;
        w[(2, 1)] = 1.0;

        let mut descent = Descent::new(
            vec![0.0, 100.0, 400.0],
            vec![0.0, 0.0, 0.0],
            targets(&[(0, 1, 100.0), (1, 2, 100.0), (0, 2, 150.0)], 3),
        );
        descent.weights = Some(w);
        descent.run(10_000);
        let d02 = (descent.x[0] - descent.x[2]).hypot(descent.y[0] - descent.y[2]);
        assert!(d02 > 150.0, "indirect pair was contracted to {d02}");
    }

    #[test]
    fn disconnected_targets_are_skipped() {
        let mut descent = Descent::new(vec![0.0, 10.0], vec![0.0, 0.0], targets(&[], 2));
        assert!(descent.run(10));
        assert_eq!(descent.x, vec![0.0, 10.0]);
    }

    #[test]
    fn rng_is_deterministic() {
        let mut a = XorShift64Star::new(42);
        let mut b = XorShift64Star::new(42);
        for _ in 0..8 {
            assert_eq!(a.next_f64_unit(), b.next_f64_unit());
        }
    }
}
