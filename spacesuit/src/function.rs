//! Pluggable spatial predicate functions and the argument helpers they share.

use crate::constants::IDENTIFIER_QUOTE;
use crate::errors::{ErrorKind, SpaceSuitError, SpaceSuitResult};
use std::ops::Deref;
use std::sync::Arc;

/// Contract for a spatial predicate that can be invoked from a query template.
///
/// A function receives the raw, trimmed argument tokens of its invocation and turns
/// them into SQL boolean-expression fragments, one per key range. The query engine
/// substitutes each fragment for the delimited invocation, producing one query per
/// fragment.
///
/// Implementations hold only immutable configuration, so a single instance serves
/// concurrent transformations.
pub trait SpatialFunctionProvider: Send + Sync {
    /// Converts `arguments` into at most `max_ranges` SQL fragments.
    ///
    /// An empty result is valid and means the predicate matches nothing.
    fn invoke(&self, arguments: &[String], max_ranges: usize) -> SpaceSuitResult<Vec<String>>;
}

/// Cheaply cloneable handle to a [`SpatialFunctionProvider`].
#[derive(Clone)]
pub struct SpatialFunction {
    inner: Arc<dyn SpatialFunctionProvider>,
}

impl SpatialFunction {
    pub fn new<T: SpatialFunctionProvider + 'static>(inner: T) -> Self {
        SpatialFunction {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for SpatialFunction {
    type Target = Arc<dyn SpatialFunctionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Strips the identifier quotes from `argument`.
///
/// The argument is trimmed first. Quotes are optional, but an opening quote needs a
/// closing one and vice versa.
///
/// # Errors
///
/// `MalformedIdentifier` if the argument is empty or its quoting is unbalanced.
pub fn unquote(argument: &str) -> SpaceSuitResult<String> {
    let argument = argument.trim();
    let starts_quoted = argument.starts_with(IDENTIFIER_QUOTE);
    let ends_quoted = argument.ends_with(IDENTIFIER_QUOTE);
    if argument.is_empty() || starts_quoted != ends_quoted {
        return Err(SpaceSuitError::new(
            &format!("Malformed identifier: \"{}\"", argument),
            ErrorKind::MalformedIdentifier,
        ));
    }
    if starts_quoted {
        // a lone quote character both starts and ends the text
        if argument.len() == IDENTIFIER_QUOTE.len_utf8() {
            return Err(SpaceSuitError::new(
                &format!("Malformed identifier: \"{}\"", argument),
                ErrorKind::MalformedIdentifier,
            ));
        }
        let quote = IDENTIFIER_QUOTE.len_utf8();
        return Ok(argument[quote..argument.len() - quote].to_string());
    }
    Ok(argument.to_string())
}

/// Parses a numeric literal argument.
///
/// # Errors
///
/// `InvalidNumber` if the text is not a decimal floating-point literal or denotes a
/// non-finite value.
pub fn parse_number(argument: &str) -> SpaceSuitResult<f64> {
    let argument = argument.trim();
    let value: f64 = argument.parse().map_err(|err: std::num::ParseFloatError| {
        SpaceSuitError::new_with_cause(
            &format!("Invalid number: \"{}\"", argument),
            ErrorKind::InvalidNumber,
            err.into(),
        )
    })?;
    if !value.is_finite() {
        return Err(SpaceSuitError::new(
            &format!("Invalid number: \"{}\" is not finite", argument),
            ErrorKind::InvalidNumber,
        ));
    }
    Ok(value)
}

/// Renders a coordinate bound for a SQL fragment.
///
/// Uses the shortest decimal that round-trips to the same `f64`, always with a
/// fractional part or an exponent: `524287.0`, `0.1`, `1e20`.
pub fn format_number(value: f64) -> String {
    format!("{:?}", value)
}
