use thiserror::Error;

#[derive(Debug, Error)]
pub enum RlError {
    #[error("{stage} exhausted its budget of {budget} iterations without converging")]
    NonConvergence { stage: &'static str, budget: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("malformed sampling weights: {0}")]
    Weights(#[from] rand::distributions::WeightedError),
}

pub type Result<T> = std::result::Result<T, RlError>;
