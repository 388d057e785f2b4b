//! Recombining binomial lattice of underlying prices.
//!
//! After `j` up-moves and `i − j` down-moves from spot the underlying is
//!
//! ```text
//! S(i, j) = u^j · d^(i−j) · S₀,   0 ≤ j ≤ i ≤ n
//! ```
//!
//! Nodes are stored level by level in a ragged array, so `(level, up_count)`
//! addresses a node directly. Level `i` holds `i + 1` nodes and an `n`-step
//! lattice holds `(n + 1)(n + 2) / 2` nodes in total.

use serde::{Deserialize, Serialize};

/// Floor applied to the up factor and to `u − d`.
pub const FACTOR_FLOOR: f64 = 1e-7;

/// Up and down multipliers of a binomial lattice.
///
/// Both are floored away from zero on construction (`u, d ≥ 1e-7`), and the
/// spread `u − d` used as a denominator is available through
/// [`spread`](LatticeFactors::spread) with the same floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeFactors {
    up: f64,
    down: f64,
}

impl LatticeFactors {
    /// Factors from explicit multipliers, each floored at [`FACTOR_FLOOR`].
    pub fn new(up: f64, down: f64) -> Self {
        Self {
            up: up.max(FACTOR_FLOOR),
            down: down.max(FACTOR_FLOOR),
        }
    }

    /// Cox-Ross-Rubinstein factors: `u = exp(σ·√dt)`, `d = 1/u`.
    pub fn crr(vol: f64, dt: f64) -> Self {
        let up = (vol * dt.sqrt()).exp().max(FACTOR_FLOOR);
        Self { up, down: 1.0 / up }
    }

    pub fn up(&self) -> f64 {
        self.up
    }

    pub fn down(&self) -> f64 {
        self.down
    }

    /// `u − d`, floored at [`FACTOR_FLOOR`].
    ///
    /// With `σ → 0` the lattice collapses (`u = d = 1`) and the raw spread is
    /// zero; the floor keeps the risk-neutral probability finite.
    pub fn spread(&self) -> f64 {
        (self.up - self.down).max(FACTOR_FLOOR)
    }
}

/// Underlying prices at every node of an `n`-step recombining tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    levels: Vec<Vec<f64>>,
}

impl Lattice {
    /// Build the lattice for `steps` periods from `spot`.
    ///
    /// Within a level, consecutive nodes differ by a factor `u/d`, so each
    /// level is generated by repeated multiplication from its all-down node.
    pub fn build(spot: f64, factors: LatticeFactors, steps: usize) -> Self {
        let u = factors.up();
        let d = factors.down();
        let ratio = u / d;

        let mut levels = Vec::with_capacity(steps + 1);
        let mut lowest = spot;
        for level in 0..=steps {
            let mut nodes = Vec::with_capacity(level + 1);
            let mut s = lowest;
            for _ in 0..=level {
                nodes.push(s);
                s *= ratio;
            }
            levels.push(nodes);
            lowest *= d;
        }
        Self { levels }
    }

    /// Number of periods `n`.
    pub fn steps(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Total number of nodes, `(n + 1)(n + 2) / 2`.
    pub fn node_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// Underlying price after `up_count` up-moves out of `level` moves.
    ///
    /// Returns `None` when `level > n` or `up_count > level`.
    pub fn node(&self, level: usize, up_count: usize) -> Option<f64> {
        self.levels.get(level)?.get(up_count).copied()
    }

    /// All nodes of one level, ordered by increasing up-move count.
    pub fn level(&self, level: usize) -> Option<&[f64]> {
        self.levels.get(level).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn node_matches_closed_form() {
        let f = LatticeFactors::new(1.1, 0.9);
        let lattice = Lattice::build(100.0, f, 6);
        for level in 0..=6 {
            for up in 0..=level {
                let expected = 1.1_f64.powi(up as i32) * 0.9_f64.powi((level - up) as i32) * 100.0;
                let got = lattice.node(level, up).unwrap();
                assert_abs_diff_eq!(got, expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn node_count_is_triangular() {
        let lattice = Lattice::build(10.0, LatticeFactors::crr(0.4, 0.2), 10);
        assert_eq!(lattice.steps(), 10);
        assert_eq!(lattice.node_count(), 11 * 12 / 2);
        for level in 0..=10 {
            assert_eq!(lattice.level(level).unwrap().len(), level + 1);
        }
    }

    #[test]
    fn out_of_range_nodes_are_none() {
        let lattice = Lattice::build(10.0, LatticeFactors::crr(0.4, 0.2), 3);
        assert!(lattice.node(4, 0).is_none());
        assert!(lattice.node(2, 3).is_none());
        assert!(lattice.level(4).is_none());
    }

    #[test]
    fn root_is_spot_and_crr_recombines() {
        let lattice = Lattice::build(10.0, LatticeFactors::crr(0.3, 0.25), 4);
        assert_eq!(lattice.node(0, 0), Some(10.0));
        // one up and one down returns to spot
        assert_abs_diff_eq!(lattice.node(2, 1).unwrap(), 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(lattice.node(4, 2).unwrap(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn crr_factors_are_reciprocal() {
        let f = LatticeFactors::crr(0.4, 0.2);
        assert_abs_diff_eq!(f.up() * f.down(), 1.0, epsilon = 1e-15);
        assert!(f.up() > 1.0);
    }

    #[test]
    fn zero_vol_spread_is_floored() {
        let f = LatticeFactors::crr(0.0, 0.2);
        assert_eq!(f.up(), 1.0);
        assert_eq!(f.down(), 1.0);
        assert_eq!(f.spread(), FACTOR_FLOOR);
    }

    #[test]
    fn factors_are_floored() {
        let f = LatticeFactors::new(0.0, -1.0);
        assert_eq!(f.up(), FACTOR_FLOOR);
        assert_eq!(f.down(), FACTOR_FLOOR);
        assert_eq!(f.spread(), FACTOR_FLOOR);
    }

    #[test]
    fn zero_step_lattice_is_root_only() {
        let lattice = Lattice::build(42.0, LatticeFactors::crr(0.2, 1.0), 0);
        assert_eq!(lattice.steps(), 0);
        assert_eq!(lattice.node_count(), 1);
        assert_eq!(lattice.node(0, 0), Some(42.0));
    }
}
