//! Invocation parsing and dispatch to registered spatial functions.

use crate::constants::{ARGUMENT_SEPARATOR, INBOX};
use crate::errors::{ErrorKind, SpaceSuitError, SpaceSuitResult};
use crate::function::SpatialFunction;
use crate::inbox::InBox;
use crate::oracle::SpatialOracle;
use std::collections::HashMap;

/// A parsed invocation: `name(arg, arg, ...)`.
///
/// Arguments are kept as raw, trimmed tokens. Unquoting and number parsing are left
/// to the function that receives them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    function_name: String,
    arguments: Vec<String>,
}

impl Invocation {
    /// Parses invocation text.
    ///
    /// The grammar is `name '(' [arg (',' arg)*] ')'`. The first `)` closes the argument
    /// list, so arguments cannot contain parentheses.
    ///
    /// # Errors
    ///
    /// `MalformedInvocation` if a parenthesis is missing or misplaced, if the argument
    /// list contains a nested `(`, or if anything but whitespace follows the closing `)`.
    pub fn parse(text: &str) -> SpaceSuitResult<Self> {
        let text = text.trim();
        let open = text.find('(').ok_or_else(|| malformed(text, "missing '('"))?;
        let close = text.find(')').ok_or_else(|| malformed(text, "missing ')'"))?;
        if close < open {
            return Err(malformed(text, "')' precedes '('"));
        }

        let argument_text = &text[open + 1..close];
        if argument_text.contains('(') {
            return Err(malformed(text, "nested parentheses are not supported"));
        }
        if !text[close + 1..].trim().is_empty() {
            return Err(malformed(text, "unexpected text after ')'"));
        }

        let arguments = if argument_text.trim().is_empty() {
            Vec::new()
        } else {
            argument_text
                .split(ARGUMENT_SEPARATOR)
                .map(|argument| argument.trim().to_string())
                .collect()
        };

        Ok(Invocation {
            function_name: text[..open].to_string(),
            arguments,
        })
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

fn malformed(text: &str, reason: &str) -> SpaceSuitError {
    SpaceSuitError::new(
        &format!("Malformed invocation \"{}\": {}", text, reason),
        ErrorKind::MalformedInvocation,
    )
}

/// Registry of spatial functions keyed by name.
///
/// `inbox` is always registered. More functions can be added while the transformer is
/// being set up with [`Transformer::with_function`]; once shared it is read-only.
#[derive(Clone)]
pub struct Transformer {
    functions: HashMap<String, SpatialFunction>,
}

impl Transformer {
    /// Creates a transformer with the built-in functions bound to `oracle`.
    pub fn new(oracle: SpatialOracle) -> Self {
        let mut functions = HashMap::new();
        functions.insert(INBOX.to_string(), SpatialFunction::new(InBox::new(oracle)));
        Transformer { functions }
    }

    /// Registers `function` under `name`, replacing any function of that name.
    pub fn with_function(mut self, name: &str, function: SpatialFunction) -> Self {
        self.functions.insert(name.to_string(), function);
        self
    }

    /// Returns `true` if a function is registered under `name`.
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Parses `invocation_text` and dispatches it, returning the SQL fragments.
    pub fn transform(&self, invocation_text: &str, max_ranges: usize) -> SpaceSuitResult<Vec<String>> {
        let invocation = Invocation::parse(invocation_text)?;
        self.dispatch(&invocation, max_ranges)
    }

    /// Invokes the function named by `invocation`.
    ///
    /// # Errors
    ///
    /// `UnknownFunction` if no function has that name; otherwise whatever the function
    /// returns.
    pub fn dispatch(&self, invocation: &Invocation, max_ranges: usize) -> SpaceSuitResult<Vec<String>> {
        let function = self
            .functions
            .get(invocation.function_name())
            .ok_or_else(|| {
                SpaceSuitError::new(
                    &format!("Unknown function \"{}\"", invocation.function_name()),
                    ErrorKind::UnknownFunction,
                )
            })?;
        let fragments = function.invoke(invocation.arguments(), max_ranges)?;
        log::trace!(
            "{} produced {} fragments",
            invocation.function_name(),
            fragments.len()
        );
        Ok(fragments)
    }
}
