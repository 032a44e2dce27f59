/// Default left delimiter of the embedded invocation.
pub const DEFAULT_LEFT_DELIMITER: &str = "<<";

/// Default right delimiter of the embedded invocation.
pub const DEFAULT_RIGHT_DELIMITER: &str = ">>";

/// Quote character accepted around identifier arguments.
pub const IDENTIFIER_QUOTE: char = '`';

/// Separates the arguments of an invocation.
pub const ARGUMENT_SEPARATOR: char = ',';

/// Name under which the box-containment predicate is registered.
pub const INBOX: &str = "inbox";
