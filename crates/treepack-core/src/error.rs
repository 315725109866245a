use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreePackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid block spec on line {line}: {reason}")]
    InvalidBlockSpec { line: usize, reason: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, TreePackError>;
