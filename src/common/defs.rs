use std::collections::HashMap;

pub type Discrete = i32;
pub type Continous = f64;

/// One weighted outcome of taking an action in a state.
#[derive(Debug, Clone)]
pub struct Transition {
    pub next_state: Discrete,
    pub probability: Continous,
    pub reward: Continous,
    pub done: bool,
}

/// Full dynamics of a finite MDP: (state, action) -> weighted outcomes.
/// Probabilities for a fixed key sum to 1.
pub type Transitions = HashMap<(Discrete, Discrete), Vec<Transition>>;
