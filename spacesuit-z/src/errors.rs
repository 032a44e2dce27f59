use spacesuit::errors::{ErrorKind, SpaceSuitError};
use thiserror::Error;

/// Errors raised while describing a space or computing keys in it
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpaceError {
    #[error("Invalid space: {0}")]
    InvalidSpace(String),

    #[error("Coordinate {value} on axis {axis} is outside [{lo}, {hi}]")]
    OutOfBounds { axis: usize, value: f64, lo: f64, hi: f64 },
}

impl From<SpaceError> for SpaceSuitError {
    fn from(err: SpaceError) -> Self {
        match err {
            SpaceError::InvalidSpace(_) => {
                SpaceSuitError::new(&err.to_string(), ErrorKind::InvalidConfiguration)
            }
            SpaceError::OutOfBounds { .. } => {
                SpaceSuitError::new(&err.to_string(), ErrorKind::Extension("space".into()))
            }
        }
    }
}

/// Result type for space operations
pub type SpaceResult<T> = Result<T, SpaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_converts_to_extension_error() {
        let err: SpaceSuitError = SpaceError::OutOfBounds {
            axis: 1,
            value: 200.0,
            lo: -180.0,
            hi: 180.0,
        }
        .into();
        assert_eq!(err.kind(), &ErrorKind::Extension("space".into()));
        assert_eq!(err.message(), "Coordinate 200 on axis 1 is outside [-180, 180]");
    }

    #[test]
    fn invalid_space_converts_to_invalid_configuration() {
        let err: SpaceSuitError = SpaceError::InvalidSpace("no bits".into()).into();
        assert_eq!(err.kind(), &ErrorKind::InvalidConfiguration);
        assert_eq!(err.message(), "Invalid space: no bits");
    }
}
