use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown rotation mode '{0}', expected 'wheel' or 'flip'")]
    UnknownMode(String),
    #[error("unknown timing mode '{0}', expected 'fixed' or 'pause'")]
    UnknownTimingMode(String),
}
