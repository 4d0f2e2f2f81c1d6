//! Solver for one-directional separation constraints on a single axis:
//! systems of `pos[left] + gap <= pos[right]`.
//!
//! Variables start as singleton blocks at their desired positions. While a
//! cross-block constraint is violated, the two blocks merge with the
//! constraint held tight and the merged block re-centers at the mean of its
//! variables' desired positions (the least-squares position for fixed
//! internal offsets). Merging is monotone and bounded by n - 1 steps, so the
//! solve always terminates. Blocks are never split; any residual
//! over-constraint washes out because callers regenerate constraints from
//! scratch every iteration.

/// `pos[left] + gap <= pos[right]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub left: usize,
    pub right: usize,
    pub gap: f64,
}

const VIOLATION_EPS: f64 = 1e-7;

/// Project `desired` onto the feasible region of `constraints`, perturbing
/// the coordinates as little as the block structure allows.
pub fn solve(desired: &[f64], constraints: &[Constraint]) -> Vec<f64> {
    let n = desired.len();
    let mut block_of: Vec<usize> = (0..n).collect();
    let mut offset: Vec<f64> = vec![0.0; n];
    let mut blocks: Vec<Block> = desired
        .iter()
        .enumerate()
        .map(|(i, &d)| Block {
            vars: vec![i],
            posn: d,
            sum: d,
        })
        .collect();

    // Each merge reduces the live block count by one, so at most n - 1
    // rounds run before every violated constraint is internal.
    for _ in 0..n.max(1) {
        let mut worst: Option<(usize, f64)> = None;
        for (ci, c) in constraints.iter().enumerate() {
            if block_of[c.left] == block_of[c.right] {
                continue;
            }
            let violation = position(&blocks, &block_of, &offset, c.left) + c.gap
                - position(&blocks, &block_of, &offset, c.right);
            if violation > VIOLATION_EPS && worst.is_none_or(|(_, v)| violation > v) {
                worst = Some((ci, violation));
            }
        }
        let Some((ci, _)) = worst else {
            break;
        };
        merge(&mut blocks, &mut block_of, &mut offset, constraints[ci], desired);
    }

    (0..n)
        .map(|i| position(&blocks, &block_of, &offset, i))
        .collect()
}

#[derive(Debug, Clone)]
struct Block {
    vars: Vec<usize>,
    /// Reference position; variable i sits at `posn + offset[i]`.
    posn: f64,
    /// Sum of (desired - offset) over member variables.
    sum: f64,
}

fn position(blocks: &[Block], block_of: &[usize], offset: &[f64], i: usize) -> f64 {
    blocks[block_of[i]].posn + offset[i]
}

/// Merge the right block into the left block with constraint `c` tight,
/// then re-center at the least-squares position.
fn merge(
    blocks: &mut Vec<Block>,
    block_of: &mut [usize],
    offset: &mut [f64],
    c: Constraint,
    desired: &[f64],
) {
    let lb = block_of[c.left];
    let rb = block_of[c.right];
    let shift = offset[c.left] + c.gap - offset[c.right];

    let moved = std::mem::take(&mut blocks[rb].vars);
    let mut sum = blocks[lb].sum;
    for &v in &moved {
        offset[v] += shift;
        block_of[v] = lb;
        sum += desired[v] - offset[v];
    }
    blocks[lb].vars.extend(moved);
    blocks[lb].sum = sum;
    blocks[lb].posn = sum / blocks[lb].vars.len() as f64;
    blocks[rb].sum = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn satisfied(pos: &[f64], cs: &[Constraint]) -> bool {
        cs.iter()
            .all(|c| pos[c.left] + c.gap <= pos[c.right] + 1e-6)
    }

    #[test]
    fn unviolated_constraints_leave_positions_untouched() {
        let desired = [0.0, 100.0];
        let cs = [Constraint {
            left: 0,
            right: 1,
            gap: 10.0,
        }];
        assert_eq!(solve(&desired, &cs), vec![0.0, 100.0]);
    }

    #[test]
    fn violated_pair_splits_the_correction_evenly() {
        let desired = [0.0, 2.0];
        let cs = [Constraint {
            left: 0,
            right: 1,
            gap: 10.0,
        }];
        let pos = solve(&desired, &cs);
        assert!(satisfied(&pos, &cs));
        // Least squares moves both ends by the same amount.
        assert!((pos[0] - (-4.0)).abs() < 1e-9, "pos = {pos:?}");
        assert!((pos[1] - 6.0).abs() < 1e-9, "pos = {pos:?}");
    }

    #[test]
    fn chain_of_constraints_stacks_feasibly() {
        let desired = [0.0, 0.0, 0.0];
        let cs = [
            Constraint {
                left: 0,
                right: 1,
                gap: 10.0,
            },
            Constraint {
                left: 1,
                right: 2,
                gap: 10.0,
            },
        ];
        let pos = solve(&desired, &cs);
        assert!(satisfied(&pos, &cs));
        // The stack centers on the shared desired position.
        assert!((pos[0] - (-10.0)).abs() < 1e-9, "pos = {pos:?}");
        assert!((pos[1] - 0.0).abs() < 1e-9, "pos = {pos:?}");
        assert!((pos[2] - 10.0).abs() < 1e-9, "pos = {pos:?}");
    }

    #[test]
    fn unrelated_variables_do_not_move() {
        let desired = [5.0, 0.0, 3.0];
        let cs = [Constraint {
            left: 1,
            right: 0,
            gap: 8.0,
        }];
        let pos = solve(&desired, &cs);
        assert!(satisfied(&pos, &cs));
        assert_eq!(pos[2], 3.0);
    }

    #[test]
    fn converging_constraints_on_one_variable_resolve() {
        // Two lefts pushing the same right variable.
        let desired = [0.0, 1.0, 2.0];
        let cs = [
            Constraint {
                left: 0,
                right: 2,
                gap: 10.0,
            },
            Constraint {
                left: 1,
                right: 2,
                gap: 10.0,
            },
        ];
        let pos = solve(&desired, &cs);
        assert!(satisfied(&pos, &cs), "pos = {pos:?}");
    }

    #[test]
    fn empty_system_is_identity() {
        assert_eq!(solve(&[1.0, 2.0], &[]), vec![1.0, 2.0]);
        assert!(solve(&[], &[]).is_empty());
    }
}
