use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

/// Error kinds for query transformation.
///
/// Every kind describes a permanent, input-driven failure: the caller has to fix the
/// query text, its arguments or the configuration. Nothing is retried internally.
///
/// # Examples
///
/// ```rust
/// use spacesuit::errors::{ErrorKind, SpaceSuitError, SpaceSuitResult};
///
/// fn example() -> SpaceSuitResult<()> {
///     Err(SpaceSuitError::new("Missing left delimiter <<", ErrorKind::MissingDelimiter))
/// }
/// assert!(example().is_err());
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// Empty or colliding delimiters, or an incomplete builder
    InvalidConfiguration,
    /// The query template lacks the left or the right delimiter
    MissingDelimiter,
    /// The query template contains a delimiter more than once
    DuplicateDelimiter,
    /// The invocation text does not have the shape `name(arg, ...)`
    MalformedInvocation,
    /// The invocation names a function that is not registered
    UnknownFunction,
    /// An identifier argument has mismatched quoting
    MalformedIdentifier,
    /// A numeric argument could not be parsed
    InvalidNumber,
    /// Bounds are inverted or fall outside the domain
    OutOfRange,

    // The String names the extension (e.g. "space" for a z-order oracle)
    /// Error raised by a spatial oracle implementation
    Extension(String),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidConfiguration => write!(f, "Invalid configuration"),
            ErrorKind::MissingDelimiter => write!(f, "Missing delimiter"),
            ErrorKind::DuplicateDelimiter => write!(f, "Duplicate delimiter"),
            ErrorKind::MalformedInvocation => write!(f, "Malformed invocation"),
            ErrorKind::UnknownFunction => write!(f, "Unknown function"),
            ErrorKind::MalformedIdentifier => write!(f, "Malformed identifier"),
            ErrorKind::InvalidNumber => write!(f, "Invalid number"),
            ErrorKind::OutOfRange => write!(f, "Out of range"),
            ErrorKind::Extension(name) => write!(f, "{} error", name),
        }
    }
}

/// Error type for every fallible spacesuit operation.
///
/// `SpaceSuitError` carries a message, an [`ErrorKind`], an optional cause and the
/// backtrace of the place it was created.
///
/// # Type alias
///
/// `SpaceSuitResult<T>` is `Result<T, SpaceSuitError>`.
#[derive(Clone)]
pub struct SpaceSuitError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<SpaceSuitError>>,
    backtrace: Backtrace,
}

impl SpaceSuitError {
    /// Creates a new error with the specified message and kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        SpaceSuitError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Backtrace::new(),
        }
    }

    /// Creates a new error wrapping `cause`.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: SpaceSuitError) -> Self {
        SpaceSuitError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Backtrace::new(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&SpaceSuitError> {
        self.cause.as_deref()
    }
}

impl Display for SpaceSuitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for SpaceSuitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // message with stack trace, or the cause chain
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for SpaceSuitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for spacesuit operations.
pub type SpaceSuitResult<T> = Result<T, SpaceSuitError>;

impl From<std::num::ParseFloatError> for SpaceSuitError {
    fn from(err: std::num::ParseFloatError) -> Self {
        SpaceSuitError::new(
            &format!("Float parsing error: {}", err),
            ErrorKind::InvalidNumber,
        )
    }
}
