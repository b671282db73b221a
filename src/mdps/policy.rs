use super::mdp::MdpSolver;
use super::simulator::{TableSimulator, MAX_EPISODE_STEPS};
use super::solvers::monte_carlo::StateActionValues;
use crate::common::defs::*;
use crate::error::Result;
use rand::prelude::*;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

pub trait Policy {
    fn policy(&self, s: Discrete) -> Discrete;
}

/// Acts greedily per a converged exact solver.
pub struct MdpSolverPolicy {
    pub mdp_solver: Rc<dyn MdpSolver>,
}

impl Policy for MdpSolverPolicy {
    fn policy(&self, s: Discrete) -> Discrete {
        self.mdp_solver.pi_star(s).unwrap_or_default()
    }
}

/// Acts greedily per a learned state-action value matrix.
pub struct GreedyValuesPolicy<'a> {
    pub values: &'a StateActionValues,
}

impl Policy for GreedyValuesPolicy<'_> {
    fn policy(&self, s: Discrete) -> Discrete {
        self.values.greedy_action(s)
    }
}

pub struct RandomPolicy {
    n_a: usize,
    rng: RefCell<StdRng>,
}

impl RandomPolicy {
    pub fn new(n_a: usize, seed: u64) -> Self {
        Self {
            n_a,
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Policy for RandomPolicy {
    fn policy(&self, _s: Discrete) -> Discrete {
        self.rng.borrow_mut().gen_range(0..self.n_a) as Discrete
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EpisodeStats {
    pub episodes: usize,
    pub wins: usize,
    pub win_rate: Continous,
}

/// Drives the simulator under `policy` for `n` episodes and counts the ones
/// that end with a positive reward.
pub fn run_episodes(
    sim: &mut TableSimulator,
    policy: &dyn Policy,
    n: usize,
) -> Result<EpisodeStats> {
    let mut wins = 0;
    for _ in 0..n {
        let mut s = sim.reset();
        let mut reward: Continous = 0.;
        for _ in 0..MAX_EPISODE_STEPS {
            let (next, r, done) = sim.step(policy.policy(s))?;
            reward = reward.max(r);
            if done {
                break;
            }

            s = next;
        }

        if reward > 0. {
            wins += 1;
        }
    }

    Ok(EpisodeStats {
        episodes: n,
        wins,
        win_rate: if n == 0 { 0. } else { wins as Continous / n as Continous },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // Two actions: 0 wins immediately, 1 loses immediately.
    fn one_shot_table() -> Rc<Transitions> {
        Rc::new(HashMap::from([
            (
                (0, 0),
                vec![Transition {
                    next_state: 1,
                    probability: 1.,
                    reward: 1.,
                    done: true,
                }],
            ),
            (
                (0, 1),
                vec![Transition {
                    next_state: 2,
                    probability: 1.,
                    reward: 0.,
                    done: true,
                }],
            ),
        ]))
    }

    struct Always(Discrete);

    impl Policy for Always {
        fn policy(&self, _s: Discrete) -> Discrete {
            self.0
        }
    }

    #[test]
    fn counts_wins_under_a_winning_policy() {
        let sim = &mut TableSimulator::new(one_shot_table(), 2718);
        let stats = run_episodes(sim, &Always(0), 25).unwrap();
        assert_eq!(stats.wins, 25);
        assert_eq!(stats.win_rate, 1.);
    }

    #[test]
    fn counts_no_wins_under_a_losing_policy() {
        let sim = &mut TableSimulator::new(one_shot_table(), 2718);
        let stats = run_episodes(sim, &Always(1), 25).unwrap();
        assert_eq!(stats.wins, 0);
        assert_eq!(stats.win_rate, 0.);
    }

    #[test]
    fn random_policy_stays_in_action_range() {
        let pi = RandomPolicy::new(4, 42);
        for _ in 0..100 {
            let a = pi.policy(0);
            assert!((0..4).contains(&a));
        }
    }
}
