use crate::common::defs::*;
use crate::error::Result;
use std::rc::Rc;

/// Markov Decision Process - Sutton & Barto 2018.
pub trait Mdp {
    fn n_s(&self) -> usize;

    fn n_a(&self) -> usize;

    fn transitions(&self) -> Rc<Transitions>;

    fn gamma(&self) -> Continous;
}

/// An exact solver over a known `Mdp`. `exec` must run to convergence
/// before the `*_star` accessors are meaningful.
pub trait MdpSolver {
    fn v_star(&self, s: Discrete) -> Continous;

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous>;

    fn pi_star(&self, s: Discrete) -> Option<Discrete>;

    /// Runs the solver, returning the number of outer iterations used.
    fn exec(&mut self, theta: Continous, num_iterations: Option<usize>) -> Result<usize>;
}
