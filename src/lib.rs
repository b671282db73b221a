//! Tabular reinforcement learning on small stochastic grid worlds.
//!
//! Two solvers over the same known transition model: exact policy iteration
//! and sample-based Monte Carlo control with selectable exploration
//! strategies, plus a shared episode runner that measures empirical win
//! rates for either one.

pub mod common;
pub mod envs;
pub mod error;
pub mod mdps;

pub use common::defs::{Continous, Discrete, Transition, Transitions};
pub use envs::frozen_lake::FrozenLake;
pub use error::{Result, RlError};
pub use mdps::mdp::{Mdp, MdpSolver};
pub use mdps::policy::{
    run_episodes, EpisodeStats, GreedyValuesPolicy, MdpSolverPolicy, Policy, RandomPolicy,
};
pub use mdps::simulator::TableSimulator;
pub use mdps::solvers::monte_carlo::{
    decayed_epsilon, ExplorationStrategy, MonteCarloControl, StateActionValues, TrainReport,
};
pub use mdps::solvers::policy_iteration::PolicyIteration;
