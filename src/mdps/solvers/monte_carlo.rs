use super::argmax;
use crate::common::defs::*;
use crate::error::{Result, RlError};
use crate::mdps::mdp::Mdp;
use crate::mdps::simulator::{TableSimulator, MAX_EPISODE_STEPS};
use itertools::Itertools;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;

/// Seed for both fields of every state-action slot. Keeps the incremental
/// average divisor strictly positive without a per-update guard.
const VALUE_SEED: Continous = 1e-5;

/// Fixed dampening exponent of the softmax weights: exp(value)^0.3.
const SOFTMAX_DAMPENING: Continous = 0.3;

/// The logistic epsilon schedule converges to this exploration floor.
const EPSILON_FLOOR: Continous = 0.05;

/// Uniform-random episodes run before training to seed visitation.
const WARM_UP_EPISODES: usize = 10;

/// Cumulative visit counts and running average rewards, one slot per
/// (state, action) pair.
#[derive(Debug, Clone)]
pub struct StateActionValues {
    n_a: usize,
    visits: Vec<Continous>,
    means: Vec<Continous>,
}

impl StateActionValues {
    pub fn new(n_s: usize, n_a: usize) -> Self {
        Self {
            n_a,
            visits: vec![VALUE_SEED; n_s * n_a],
            means: vec![VALUE_SEED; n_s * n_a],
        }
    }

    pub fn n_actions(&self) -> usize {
        self.n_a
    }

    pub fn visits(&self, s: Discrete, a: Discrete) -> Continous {
        self.visits[self.idx(s, a)]
    }

    pub fn mean(&self, s: Discrete, a: Discrete) -> Continous {
        self.means[self.idx(s, a)]
    }

    /// Current average rewards for every action from `s`.
    pub fn action_values(&self, s: Discrete) -> &[Continous] {
        let base = s as usize * self.n_a;
        &self.means[base..base + self.n_a]
    }

    /// Arg-max action by running average, first index on ties.
    pub fn greedy_action(&self, s: Discrete) -> Discrete {
        argmax(self.action_values(s)) as Discrete
    }

    /// Credits every pair visited in an episode with the episode's reward:
    /// `mean += occ / visits * (reward - mean)`, where `visits` already
    /// includes this episode's occurrences. Pairs visited several times in
    /// one episode get proportionally more of the correction. This
    /// visitation-weighted form is the estimator's defining update; it is
    /// deliberately not a per-visit running mean.
    pub fn apply_episode(
        &mut self,
        counts: &HashMap<(Discrete, Discrete), usize>,
        reward: Continous,
    ) {
        for (&(s, a), &occ) in counts {
            let i = self.idx(s, a);
            let occ = occ as Continous;
            self.visits[i] += occ;
            self.means[i] += occ / self.visits[i] * (reward - self.means[i]);
        }
    }

    fn idx(&self, s: Discrete, a: Discrete) -> usize {
        s as usize * self.n_a + a as usize
    }
}

/// How actions are drawn during training. Resolved once per run, never
/// re-parsed per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationStrategy {
    /// Uniform over actions.
    Random,
    /// Greedy with probability 1 - epsilon, otherwise uniform.
    BoundedGreedy,
    /// Draw proportionally to exp(value)^0.3.
    Softmax,
}

impl FromStr for ExplorationStrategy {
    type Err = RlError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "random" => Ok(Self::Random),
            "bounded_greedy" | "tiny_epsilon" => Ok(Self::BoundedGreedy),
            "softmax" => Ok(Self::Softmax),
            other => Err(RlError::InvalidConfiguration(format!(
                "unknown exploration strategy {other:?}"
            ))),
        }
    }
}

impl ExplorationStrategy {
    pub fn select_action(
        &self,
        values: &StateActionValues,
        s: Discrete,
        epsilon: Continous,
        rng: &mut StdRng,
    ) -> Result<Discrete> {
        match self {
            Self::Random => Ok(rng.gen_range(0..values.n_actions()) as Discrete),
            // gen() is in [0, 1), so epsilon = 0 never explores and
            // epsilon = 1 always does.
            Self::BoundedGreedy => {
                if rng.gen::<Continous>() < epsilon {
                    Ok(rng.gen_range(0..values.n_actions()) as Discrete)
                } else {
                    Ok(values.greedy_action(s))
                }
            }
            Self::Softmax => {
                let weights = values
                    .action_values(s)
                    .iter()
                    .map(|v| (SOFTMAX_DAMPENING * v).exp());
                let dist = WeightedIndex::new(weights)?;
                Ok(dist.sample(rng) as Discrete)
            }
        }
    }
}

/// Training epsilon for episode `i` of `n`: a logistic decay with its
/// midpoint at half the run, converging to the exploration floor.
pub fn decayed_epsilon(i: usize, n: usize) -> Continous {
    if n == 0 {
        return EPSILON_FLOOR;
    }

    let x = 10. * (i as Continous - n as Continous / 2.) / n as Continous;
    EPSILON_FLOOR + (1. - EPSILON_FLOOR) / (1. + x.exp())
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub strategy: ExplorationStrategy,
    pub train_episodes: usize,
    pub train_wins: usize,
    pub train_win_rate: Continous,
    pub test_episodes: usize,
    pub test_wins: usize,
    pub test_win_rate: Continous,
}

/// On-policy Monte Carlo control over sampled episodes. Owns its simulator
/// and value matrix for one training run; the matrix is available to the
/// caller afterwards.
pub struct MonteCarloControl {
    sim: TableSimulator,
    values: StateActionValues,
    rng: StdRng,
}

impl MonteCarloControl {
    pub fn new(mdp: Rc<dyn Mdp>, seed: u64) -> Self {
        Self {
            sim: TableSimulator::new(mdp.transitions(), seed),
            values: StateActionValues::new(mdp.n_s(), mdp.n_a()),
            rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
        }
    }

    pub fn values(&self) -> &StateActionValues {
        &self.values
    }

    /// Plays one episode under `strategy`, then credits every visited
    /// (state, action) pair with the maximum reward seen in the episode
    /// (these environments pay only on terminal success, so this is the
    /// terminal reward). Returns the episode reward and its step count.
    pub fn run_episode(
        &mut self,
        strategy: ExplorationStrategy,
        epsilon: Continous,
    ) -> Result<(Continous, usize)> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(RlError::InvalidConfiguration(format!(
                "epsilon must be in [0, 1], got {epsilon}"
            )));
        }

        let mut s = self.sim.reset();
        let mut visited = Vec::new();
        let mut reward: Continous = 0.;
        let mut steps = 0;
        while steps < MAX_EPISODE_STEPS {
            let a = strategy.select_action(&self.values, s, epsilon, &mut self.rng)?;
            visited.push((s, a));

            let (next, r, done) = self.sim.step(a)?;
            reward = reward.max(r);
            steps += 1;
            if done {
                break;
            }

            s = next;
        }

        let counts = visited.into_iter().counts();
        self.values.apply_episode(&counts, reward);
        Ok((reward, steps))
    }

    /// Warm-up with uniform-random episodes to seed visitation, train under
    /// `strategy` with the decaying epsilon schedule, then measure held-out
    /// performance with pure exploitation (bounded-greedy, epsilon 0).
    pub fn train_and_evaluate(
        &mut self,
        strategy: ExplorationStrategy,
        n_train: usize,
        n_test: usize,
    ) -> Result<TrainReport> {
        for _ in 0..WARM_UP_EPISODES {
            let _ = self.run_episode(ExplorationStrategy::Random, 1.)?;
        }

        let mut train_wins = 0;
        for i in 0..n_train {
            let (r, _) = self.run_episode(strategy, decayed_epsilon(i, n_train))?;
            if r > 0. {
                train_wins += 1;
            }
        }

        let mut test_wins = 0;
        for _ in 0..n_test {
            let (r, _) = self.run_episode(ExplorationStrategy::BoundedGreedy, 0.)?;
            if r > 0. {
                test_wins += 1;
            }
        }

        Ok(TrainReport {
            strategy,
            train_episodes: n_train,
            train_wins,
            train_win_rate: ratio(train_wins, n_train),
            test_episodes: n_test,
            test_wins,
            test_win_rate: ratio(test_wins, n_test),
        })
    }
}

fn ratio(wins: usize, episodes: usize) -> Continous {
    if episodes == 0 {
        0.
    } else {
        wins as Continous / episodes as Continous
    }
}
