//! Hard non-overlap projection over node label boxes.
//!
//! Labels are modeled as horizontal line segments (half spaced width as the
//! segment radius) so that the minimum gap between two labels is the distance
//! between the nearest points of their segments. The projection runs per axis:
//! violated pairs emit one-directional separation constraints that a
//! constraint solver resolves with a least-squares correction, x first, then
//! y with the corrected x coordinates. Only core nodes are constrained; dummy
//! edge midpoints ride along freely.

use nalgebra::DMatrix;

use super::vpsc::{self, Constraint};

const ZERO_LENGTH_EPS: f64 = 1e-12;

pub struct BoundProjection {
    /// Label line radius per core node.
    radii: Vec<f64>,
    /// Required pairwise separation over core nodes.
    separations: DMatrix<f64>,
}

impl BoundProjection {
    pub fn new(radii: Vec<f64>, separations: DMatrix<f64>) -> BoundProjection {
        debug_assert_eq!(radii.len(), separations.nrows());
        BoundProjection { radii, separations }
    }

    /// Correct the core-node coordinates in place so that every violated
    /// label pair regains its required separation along some axis.
    pub fn apply(&self, x: &mut [f64], y: &mut [f64]) {
        let n = self.radii.len();
        debug_assert!(x.len() >= n && y.len() >= n);

        let solved_x = vpsc::solve(&x[..n], &self.constraints(x, y, Axis::X));
        x[..n].copy_from_slice(&solved_x);

        let solved_y = vpsc::solve(&y[..n], &self.constraints(x, y, Axis::Y));
        y[..n].copy_from_slice(&solved_y);
    }

    fn constraints(&self, x: &[f64], y: &[f64], axis: Axis) -> Vec<Constraint> {
        let n = self.radii.len();
        let mut cs = Vec::new();

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dd = self.separations[(i, j)];
                // Rough distance cut; a pair can only be in violation when
                // the required separation exceeds one of its axis gaps.
                if dd <= (y[i] - y[j]).abs() && dd <= (x[i] - x[j]).abs() {
                    continue;
                }

                let ri = self.radii[i];
                let rj = self.radii[j];

                // Midpoint between the two label lines, clamped onto each
                // line to get their nearest points.
                let xm = 0.5
                    * (x[i] + x[j] + if x[i] < x[j] { ri - rj } else { rj - ri });
                let im = (x[i] + ri).min((x[i] - ri).max(xm));
                let jm = (x[j] + rj).min((x[j] - rj).max(xm));

                let vx = jm - im;
                let vy = y[j] - y[i];
                let actual = (vx * vx + vy * vy).sqrt();
                if dd <= actual {
                    continue;
                }

                match axis {
                    Axis::X => {
                        if im != jm {
                            let (left, right) = if x[i] < x[j] { (i, j) } else { (j, i) };
                            cs.push(Constraint {
                                left,
                                right,
                                gap: ri + rj + dd * vx / actual,
                            });
                        }
                    }
                    Axis::Y => {
                        // Coincident segments have no separation direction;
                        // default to pushing apart vertically.
                        let dir_y = if actual < ZERO_LENGTH_EPS {
                            1.0
                        } else {
                            vy / actual
                        };
                        let (left, right) = if y[i] < y[j] { (i, j) } else { (j, i) };
                        cs.push(Constraint {
                            left,
                            right,
                            gap: dd * dir_y,
                        });
                    }
                }
            }
        }

        cs
    }
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}
