use crate::common::defs::*;
use crate::error::Result;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::rc::Rc;

/// Per-episode step bound. A purely greedy policy can pin itself against a
/// wall and never reach a terminal state; episodes that hit the cap end and
/// score as losses.
pub(crate) const MAX_EPISODE_STEPS: usize = 1000;

/// Samples episodes from a known transition table. This is the `reset`/`step`
/// face of the environment model: callers never see the table directly, they
/// only observe sampled outcomes.
pub struct TableSimulator {
    transitions: Rc<Transitions>,
    state: Discrete,
    rng: StdRng,
}

impl TableSimulator {
    pub fn new(transitions: Rc<Transitions>, seed: u64) -> Self {
        Self {
            transitions,
            state: Discrete::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn reset(&mut self) -> Discrete {
        self.state = Discrete::default();
        self.state
    }

    pub fn state(&self) -> Discrete {
        self.state
    }

    /// Picks one weighted outcome of `action` from the current state and
    /// advances to it. Returns (next_state, reward, done).
    pub fn step(&mut self, action: Discrete) -> Result<(Discrete, Continous, bool)> {
        let ts = &self.transitions[&(self.state, action)];
        let dist = WeightedIndex::new(ts.iter().map(|t| t.probability))?;
        let next = &ts[dist.sample(&mut self.rng)];

        self.state = next.next_state;
        Ok((next.next_state, next.reward, next.done))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;
    use std::collections::HashMap;

    fn coin_flip_table() -> Rc<Transitions> {
        Rc::new(HashMap::from([(
            (0, 0),
            vec![
                Transition {
                    next_state: 1,
                    probability: 0.2,
                    reward: 0.,
                    done: true,
                },
                Transition {
                    next_state: 2,
                    probability: 0.8,
                    reward: 1.,
                    done: true,
                },
            ],
        )]))
    }

    #[test]
    fn step_samples_outcomes_by_probability() {
        let sim = &mut TableSimulator::new(coin_flip_table(), 2718);

        let n = 10000;
        let mut hits = 0;
        for _ in 0..n {
            sim.reset();
            let (s, _, done) = sim.step(0).unwrap();
            assert!(done);
            if s == 2 {
                hits += 1;
            }
        }

        assert_float_eq!(hits as Continous / n as Continous, 0.8, abs <= 1e-2);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let sim = &mut TableSimulator::new(coin_flip_table(), 0);
        let _ = sim.step(0).unwrap();
        assert_ne!(sim.state(), 0);
        assert_eq!(sim.reset(), 0);
    }
}
