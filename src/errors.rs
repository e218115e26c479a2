use derive_more::Error;
use std::fmt;

use crate::OperatorKind;

pub type Result<T> = std::result::Result<T, LanczosError>;

/// Fatal configuration and input errors.
/// # Usage
/// Anything that would silently produce wrong physics if ignored ends up here
/// and is propagated to the top of the run. Expected negative outcomes, like
/// an operator leading to an empty sector, are `None` instead.
#[derive(Debug, Clone, Error)]
pub enum LanczosError {
    /// The `Model=` name is not one of the known models.
    UnknownModel { name: String },
    /// The operator cannot be applied by the given basis or model.
    UnsupportedOperator { what: OperatorKind, context: String },
    /// A parameter is out of range or inconsistent with the geometry.
    InvalidParameter { details: String },
    /// Malformed line in an input or geometry file.
    Parse { line: usize, details: String },
    /// Could not read a file.
    Io { details: String },
    /// Csv reader failure.
    Csv { details: String },
    /// The geometry does not fit the requested model.
    Geometry { details: String },
}

impl LanczosError {
    pub fn invalid<S: Into<String>>(details: S) -> Self {
        LanczosError::InvalidParameter { details: details.into() }
    }

    pub fn unsupported<S: Into<String>>(what: OperatorKind, context: S) -> Self {
        LanczosError::UnsupportedOperator { what, context: context.into() }
    }
}

impl fmt::Display for LanczosError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LanczosError::UnknownModel { name } => write!(f, "Unknown model {}.", name),
            LanczosError::UnsupportedOperator { what, context } => {
                write!(f, "Unsupported operator {} in {}.", what, context)
            }
            LanczosError::InvalidParameter { details } => write!(f, "Invalid parameter: {}", details),
            LanczosError::Parse { line, details } => {
                write!(f, "Parsing error at line {}: {}", line, details)
            }
            LanczosError::Io { details } => write!(f, "Io error: {}", details),
            LanczosError::Csv { details } => write!(f, "Csv error: {}", details),
            LanczosError::Geometry { details } => write!(f, "Geometry error: {}", details),
        }
    }
}

impl From<csv::Error> for LanczosError {
    fn from(err: csv::Error) -> Self {
        LanczosError::Csv { details: err.to_string() }
    }
}

impl From<std::io::Error> for LanczosError {
    fn from(err: std::io::Error) -> Self {
        LanczosError::Io { details: err.to_string() }
    }
}
