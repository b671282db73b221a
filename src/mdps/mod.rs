pub mod mdp;
pub mod policy;
pub mod simulator;
pub mod solvers;
