use super::argmax;
use crate::common::defs::*;
use crate::error::{Result, RlError};
use crate::mdps::mdp::{Mdp, MdpSolver};
use std::rc::Rc;

/// Sweep budget for each evaluation pass inside `exec`. Callers that want a
/// tighter bound use `evaluate_policy` directly.
const EVAL_SWEEP_BUDGET: usize = 10_000;

/// Policy iteration - Sutton & Barto 2018, ch. 4.3.
///
/// Alternates in-place iterative policy evaluation with greedy policy
/// improvement until the greedy policy stops changing.
#[derive(Clone)]
pub struct PolicyIteration {
    mdp: Rc<dyn Mdp>,
    v: Vec<Continous>,
    pi: Vec<Vec<Continous>>,
}

impl PolicyIteration {
    /// Fails fast on a discount factor outside [0, 1]. 1.0 is valid: episodes
    /// end in absorbing terminal states, so undiscounted sums stay finite.
    pub fn new(mdp: Rc<dyn Mdp>) -> Result<Self> {
        let gamma = mdp.gamma();
        if !(0.0..=1.0).contains(&gamma) {
            return Err(RlError::InvalidConfiguration(format!(
                "discount factor must be in [0, 1], got {gamma}"
            )));
        }

        let n_s = mdp.n_s();
        let n_a = mdp.n_a();
        Ok(Self {
            mdp,
            v: vec![0.; n_s],
            pi: vec![vec![1. / n_a as Continous; n_a]; n_s],
        })
    }

    /// Iterative policy evaluation for the current policy. Sweeps all states,
    /// recomputing each value as the policy- and probability-weighted sum of
    /// `reward + gamma * v[next]`, until the largest change in a sweep drops
    /// below `theta`. Updates are in place, so later states in a sweep see
    /// already-refreshed values (Gauss-Seidel acceleration; sweep order
    /// affects speed, not the fixed point).
    ///
    /// Returns the number of sweeps used.
    pub fn evaluate_policy(&mut self, theta: Continous, max_sweeps: usize) -> Result<usize> {
        let transitions = self.mdp.transitions();
        let gamma = self.mdp.gamma();

        for sweep in 0..max_sweeps {
            let mut delta: Continous = 0.;
            for s in 0..self.mdp.n_s() {
                let mut v_s = 0.;
                for (a, &pr_a) in self.pi[s].iter().enumerate() {
                    if pr_a == 0. {
                        continue;
                    }

                    for t in &transitions[&(s as Discrete, a as Discrete)] {
                        v_s += pr_a
                            * t.probability
                            * (t.reward + gamma * self.v[t.next_state as usize]);
                    }
                }

                delta = delta.max((v_s - self.v[s]).abs());
                self.v[s] = v_s;
            }

            if delta < theta {
                return Ok(sweep + 1);
            }
        }

        Err(RlError::NonConvergence {
            stage: "policy evaluation",
            budget: max_sweeps,
        })
    }

    /// One-step lookahead: the expected value of each action from `s` under
    /// the current value function. No mutation.
    pub fn lookahead_action_values(&self, s: Discrete) -> Vec<Continous> {
        let transitions = self.mdp.transitions();
        let gamma = self.mdp.gamma();

        (0..self.mdp.n_a())
            .map(|a| {
                transitions[&(s, a as Discrete)]
                    .iter()
                    .map(|t| t.probability * (t.reward + gamma * self.v[t.next_state as usize]))
                    .sum()
            })
            .collect()
    }
}

impl MdpSolver for PolicyIteration {
    fn v_star(&self, s: Discrete) -> Continous {
        self.v[s as usize]
    }

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous> {
        self.lookahead_action_values(s).get(a as usize).copied()
    }

    fn pi_star(&self, s: Discrete) -> Option<Discrete> {
        Some(argmax(&self.pi[s as usize]) as Discrete)
    }

    /// Full policy iteration. Each round evaluates the current policy and
    /// then makes it greedy per one-step lookahead, one-hot per state with
    /// ties broken to the first action index. Stops when no state changes
    /// action. The default round budget is `n_s * n_a`: improvement is
    /// monotone, so a stable policy must appear within that many rounds.
    fn exec(&mut self, theta: Continous, num_iterations: Option<usize>) -> Result<usize> {
        let budget = num_iterations.unwrap_or(self.mdp.n_s() * self.mdp.n_a());

        for round in 0..budget {
            self.evaluate_policy(theta, EVAL_SWEEP_BUDGET)?;

            let mut stable = true;
            for s in 0..self.mdp.n_s() {
                let q = self.lookahead_action_values(s as Discrete);
                let best = argmax(&q);
                if self.pi[s][best] != 1. {
                    stable = false;
                }

                self.pi[s].fill(0.);
                self.pi[s][best] = 1.;
            }

            if stable {
                return Ok(round + 1);
            }
        }

        Err(RlError::NonConvergence {
            stage: "policy improvement",
            budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;

    const THETA: Continous = 1e-8;

    /// Corridor 0 -> 1 -> 2 -> goal(3). Action 0 advances, action 1 drops
    /// into a lossy absorbing pit (state 4). Entering the goal pays 1.
    struct Corridor {
        gamma: Continous,
        transitions: Rc<Transitions>,
    }

    impl Corridor {
        fn new(gamma: Continous) -> Self {
            let mut transitions = Transitions::new();
            for s in 0..3 {
                transitions.insert(
                    (s, 0),
                    vec![Transition {
                        next_state: s + 1,
                        probability: 1.,
                        reward: if s == 2 { 1. } else { 0. },
                        done: s == 2,
                    }],
                );
                transitions.insert(
                    (s, 1),
                    vec![Transition {
                        next_state: 4,
                        probability: 1.,
                        reward: 0.,
                        done: true,
                    }],
                );
            }
            for s in [3, 4] {
                for a in 0..2 {
                    transitions.insert(
                        (s, a),
                        vec![Transition {
                            next_state: s,
                            probability: 1.,
                            reward: 0.,
                            done: true,
                        }],
                    );
                }
            }

            Self {
                gamma,
                transitions: Rc::new(transitions),
            }
        }
    }

    impl Mdp for Corridor {
        fn n_s(&self) -> usize {
            5
        }

        fn n_a(&self) -> usize {
            2
        }

        fn transitions(&self) -> Rc<Transitions> {
            Rc::clone(&self.transitions)
        }

        fn gamma(&self) -> Continous {
            self.gamma
        }
    }

    #[test]
    fn converges_to_the_shortest_path_policy() {
        let mdp = Rc::new(Corridor::new(0.9)) as Rc<dyn Mdp>;
        let pi = &mut PolicyIteration::new(Rc::clone(&mdp)).unwrap();

        let rounds = pi.exec(THETA, None).unwrap();
        assert!(rounds <= mdp.n_s() * mdp.n_a());

        for s in 0..3 {
            assert_eq!(pi.pi_star(s), Some(0));
        }
        assert_float_eq!(pi.v_star(0), 0.81, abs <= 1e-6);
        assert_float_eq!(pi.v_star(1), 0.9, abs <= 1e-6);
        assert_float_eq!(pi.v_star(2), 1., abs <= 1e-6);
    }

    #[test]
    fn undiscounted_corridor_is_valid() {
        let mdp = Rc::new(Corridor::new(1.)) as Rc<dyn Mdp>;
        let pi = &mut PolicyIteration::new(mdp).unwrap();

        pi.exec(THETA, None).unwrap();
        assert_float_eq!(pi.v_star(0), 1., abs <= 1e-6);
    }

    #[test]
    fn re_evaluating_a_converged_value_function_takes_one_sweep() {
        let mdp = Rc::new(Corridor::new(0.9)) as Rc<dyn Mdp>;
        let pi = &mut PolicyIteration::new(mdp).unwrap();
        pi.exec(THETA, None).unwrap();

        let sweeps = pi.evaluate_policy(THETA, 100).unwrap();
        assert_eq!(sweeps, 1);
    }

    #[test]
    fn bellman_optimality_holds_at_the_fixed_point() {
        let mdp = Rc::new(Corridor::new(0.9)) as Rc<dyn Mdp>;
        let pi = &mut PolicyIteration::new(Rc::clone(&mdp)).unwrap();
        pi.exec(THETA, None).unwrap();

        for s in 0..mdp.n_s() as Discrete {
            let q = pi.lookahead_action_values(s);
            let best = q.iter().cloned().fold(Continous::NEG_INFINITY, Continous::max);
            assert_float_eq!(pi.v_star(s), best, abs <= THETA);
        }
    }

    #[test]
    fn exhausted_sweep_budget_is_an_error() {
        let mdp = Rc::new(Corridor::new(0.9)) as Rc<dyn Mdp>;
        let pi = &mut PolicyIteration::new(mdp).unwrap();

        let err = pi.evaluate_policy(1e-12, 1).unwrap_err();
        assert!(matches!(
            err,
            RlError::NonConvergence {
                stage: "policy evaluation",
                budget: 1
            }
        ));
    }

    #[test]
    fn out_of_range_discount_factor_is_rejected() {
        let mdp = Rc::new(Corridor::new(1.5)) as Rc<dyn Mdp>;
        assert!(matches!(
            PolicyIteration::new(mdp),
            Err(RlError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn equal_actions_tie_break_to_the_first_index() {
        // Both actions behave identically, so the greedy pick must be 0.
        let mut transitions = Transitions::new();
        for a in 0..2 {
            transitions.insert(
                (0, a),
                vec![Transition {
                    next_state: 1,
                    probability: 1.,
                    reward: 1.,
                    done: true,
                }],
            );
            transitions.insert(
                (1, a),
                vec![Transition {
                    next_state: 1,
                    probability: 1.,
                    reward: 0.,
                    done: true,
                }],
            );
        }

        struct Twin(Rc<Transitions>);
        impl Mdp for Twin {
            fn n_s(&self) -> usize {
                2
            }
            fn n_a(&self) -> usize {
                2
            }
            fn transitions(&self) -> Rc<Transitions> {
                Rc::clone(&self.0)
            }
            fn gamma(&self) -> Continous {
                0.9
            }
        }

        let mdp = Rc::new(Twin(Rc::new(transitions))) as Rc<dyn Mdp>;
        let pi = &mut PolicyIteration::new(mdp).unwrap();
        pi.exec(THETA, None).unwrap();
        assert_eq!(pi.pi_star(0), Some(0));
    }
}
