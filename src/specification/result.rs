use std::{fmt::Display, io};

#[derive(Debug)]
pub enum SpecificationError {
    MalformedFormula { label: String, reason: String },
    UnknownAtom { atom: String, index: usize },
    EmptyTrace,
    IndexOutOfRange { index: usize, length: usize },
    InvalidLasso { lasso: usize, length: usize },
    InconsistentState {
        state: usize,
        expected: usize,
        actual: usize,
    },
    DuplicateLiteral(String),
    InvalidTrace(String),
    MalformedSample(String),
    IO(io::Error),
    Json(serde_json::Error),
}

impl Display for SpecificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecificationError::MalformedFormula { label, reason } => {
                write!(f, "malformed formula at '{}': {}", label, reason)
            }
            SpecificationError::UnknownAtom { atom, index } => write!(
                f,
                "unknown atomic proposition '{}' at index {}",
                atom, index
            ),
            SpecificationError::EmptyTrace => {
                write!(f, "trace has no states")
            }
            SpecificationError::IndexOutOfRange { index, length } => write!(
                f,
                "index {} is out of range for trace of length {}",
                index, length
            ),
            SpecificationError::InvalidLasso { lasso, length } => write!(
                f,
                "lasso index {} is out of range for trace of length {}",
                lasso, length
            ),
            SpecificationError::InconsistentState {
                state,
                expected,
                actual,
            } => write!(
                f,
                "state {} has {} values but the trace declares {} literals",
                state, actual, expected
            ),
            SpecificationError::DuplicateLiteral(literal) => {
                write!(f, "literal '{}' is declared more than once", literal)
            }
            SpecificationError::InvalidTrace(message) => {
                write!(f, "invalid trace: {}", message)
            }
            SpecificationError::MalformedSample(message) => {
                write!(f, "malformed sample: {}", message)
            }
            SpecificationError::IO(error) => error.fmt(f),
            SpecificationError::Json(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for SpecificationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SpecificationError::IO(error) => Some(error),
            SpecificationError::Json(error) => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for SpecificationError {
    fn from(value: io::Error) -> Self {
        SpecificationError::IO(value)
    }
}

impl From<serde_json::Error> for SpecificationError {
    fn from(value: serde_json::Error) -> Self {
        SpecificationError::Json(value)
    }
}

pub type Result<T> = std::result::Result<T, SpecificationError>;
