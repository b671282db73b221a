pub mod monte_carlo;
pub mod policy_iteration;

use crate::common::defs::Continous;

/// Index of the largest value, ties resolved to the first occurrence so that
/// repeated solves stay deterministic.
pub(crate) fn argmax(xs: &[Continous]) -> usize {
    let mut best = 0;
    for (i, &x) in xs.iter().enumerate().skip(1) {
        if x > xs[best] {
            best = i;
        }
    }

    best
}
