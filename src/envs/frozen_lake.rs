use crate::common::defs::*;
use crate::mdps::mdp::Mdp;
use std::rc::Rc;

/// The calibration instance: the classic 4x4 frozen lake. 16 states, 4
/// actions (left/down/right/up). Entering the goal pays 1 and ends the
/// episode; holes end it with nothing. With `slippery` dynamics each move
/// goes as intended or slips to either perpendicular, 1/3 each.
/// Refer: https://gymnasium.farama.org/environments/toy_text/frozen_lake/
pub struct FrozenLake {
    gamma: Continous,
    n_s: usize,
    n_a: usize,
    transitions: Rc<Transitions>,
}

const MAP_4X4: [&str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];

const LEFT: usize = 0;
const DOWN: usize = 1;
const RIGHT: usize = 2;
const UP: usize = 3;

impl FrozenLake {
    pub fn new(gamma: Continous) -> Self {
        Self::with_map(gamma, &MAP_4X4, true)
    }

    pub fn deterministic(gamma: Continous) -> Self {
        Self::with_map(gamma, &MAP_4X4, false)
    }

    pub fn with_map(gamma: Continous, desc: &[&str], slippery: bool) -> Self {
        let n_rows = desc.len();
        let n_cols = desc[0].len();
        let grid: Vec<Vec<u8>> = desc.iter().map(|row| row.bytes().collect()).collect();
        let state_of = |row: usize, col: usize| (row * n_cols + col) as Discrete;

        let shift = |row: usize, col: usize, a: usize| match a {
            LEFT => (row, col.saturating_sub(1)),
            DOWN => ((row + 1).min(n_rows - 1), col),
            RIGHT => (row, (col + 1).min(n_cols - 1)),
            UP => (row.saturating_sub(1), col),
            _ => unreachable!(),
        };

        let mut transitions = Transitions::new();
        for row in 0..n_rows {
            for col in 0..n_cols {
                let s = state_of(row, col);
                for a in 0..4 {
                    let ts = if matches!(grid[row][col], b'G' | b'H') {
                        // Absorbing row: terminal states loop on themselves
                        // with no reward, pinning their value at zero.
                        vec![Transition {
                            next_state: s,
                            probability: 1.,
                            reward: 0.,
                            done: true,
                        }]
                    } else {
                        let slips: &[usize] = if slippery {
                            &[(a + 3) % 4, a, (a + 1) % 4]
                        } else {
                            &[a]
                        };
                        slips
                            .iter()
                            .map(|&b| {
                                let (r2, c2) = shift(row, col, b);
                                let cell = grid[r2][c2];
                                Transition {
                                    next_state: state_of(r2, c2),
                                    probability: 1. / slips.len() as Continous,
                                    reward: if cell == b'G' { 1. } else { 0. },
                                    done: matches!(cell, b'G' | b'H'),
                                }
                            })
                            .collect()
                    };

                    transitions.insert((s, a as Discrete), ts);
                }
            }
        }

        Self {
            gamma,
            n_s: n_rows * n_cols,
            n_a: 4,
            transitions: Rc::new(transitions),
        }
    }
}

impl Mdp for FrozenLake {
    fn n_s(&self) -> usize {
        self.n_s
    }

    fn n_a(&self) -> usize {
        self.n_a
    }

    fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }

    fn gamma(&self) -> Continous {
        self.gamma
    }
}
