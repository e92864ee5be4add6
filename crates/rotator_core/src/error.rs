use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotatorError {
    #[error("flip speed must be greater than zero")]
    ZeroFlipSpeed,
}
