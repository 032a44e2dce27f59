use crate::constants::{DEFAULT_LEFT_DELIMITER, DEFAULT_RIGHT_DELIMITER};
use crate::errors::{ErrorKind, SpaceSuitError, SpaceSuitResult};
use crate::function::SpatialFunction;
use crate::oracle::{PackedKey, SpatialOracle};
use crate::transformer::Transformer;
use std::sync::Arc;

/// Runs fast spatial searches on a database that has no spatial index.
///
/// A `SpaceSuit` finds the delimited spatial invocation inside a query template and
/// rewrites the template into plain SQL queries, one per key range, whose combined
/// results are the result of the spatial query. It also computes the key to store in
/// the spatial index column for a point.
///
/// Cloning is cheap and all clones share the same immutable configuration, so a
/// single instance can serve concurrent callers.
///
/// # Examples
///
/// ```rust,ignore
/// use spacesuit::SpaceSuit;
/// use spacesuit_z::Space;
///
/// let space = Space::new([0.0, 0.0], [1048576.0, 1048576.0], [20, 20])?;
/// let space_suit = SpaceSuit::new(space.into(), "<<", ">>")?;
///
/// let z = space_suit.spatial_index_key(1048575.0, 1048575.0)?;
/// let queries = space_suit.transform_query(
///     "select id from t where <<inbox(z, x, 10, 20, y, 10, 20)>>",
///     4,
/// )?;
/// ```
#[derive(Clone)]
pub struct SpaceSuit {
    inner: Arc<SpaceSuitInner>,
}

struct SpaceSuitInner {
    oracle: SpatialOracle,
    left_delimiter: String,
    right_delimiter: String,
    transformer: Transformer,
}

impl SpaceSuit {
    /// Creates a `SpaceSuit` over `oracle` using the given delimiters.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if a delimiter is empty or both delimiters are equal.
    pub fn new(oracle: SpatialOracle, left_delimiter: &str, right_delimiter: &str) -> SpaceSuitResult<Self> {
        let transformer = Transformer::new(oracle.clone());
        Self::with_transformer(oracle, left_delimiter, right_delimiter, transformer)
    }

    /// Returns a builder with the default `<<` / `>>` delimiters.
    pub fn builder() -> SpaceSuitBuilder {
        SpaceSuitBuilder::new()
    }

    fn with_transformer(
        oracle: SpatialOracle,
        left_delimiter: &str,
        right_delimiter: &str,
        transformer: Transformer,
    ) -> SpaceSuitResult<Self> {
        validate_delimiters(left_delimiter, right_delimiter)?;
        Ok(SpaceSuit {
            inner: Arc::new(SpaceSuitInner {
                oracle,
                left_delimiter: left_delimiter.to_string(),
                right_delimiter: right_delimiter.to_string(),
                transformer,
            }),
        })
    }

    /// Returns the value to store in the spatial index column for `(x, y)`.
    pub fn spatial_index_key(&self, x: f64, y: f64) -> SpaceSuitResult<PackedKey> {
        self.inner.oracle.key_of(x, y)
    }

    /// Rewrites `query` into standard SQL queries implementing its spatial search.
    ///
    /// `query` must contain exactly one left and one right delimiter around an
    /// invocation such as `inbox(z, x, 1, 2, y, 3, 4)`. Each returned query is `query`
    /// with the delimited span replaced by one fragment. At most `max_ranges` queries are
    /// returned, and none at all when the region covers no key range; an empty result is
    /// a valid outcome.
    ///
    /// # Errors
    ///
    /// - `MissingDelimiter` / `DuplicateDelimiter` for malformed templates
    /// - `MalformedInvocation` if the right delimiter precedes the left one, or the
    ///   invocation cannot be parsed. Only whitespace may follow the invocation's
    ///   closing `)` inside the delimiters, so `<<inbox(..) and x>>` is rejected.
    /// - anything the invoked function reports
    pub fn transform_query(&self, query: &str, max_ranges: usize) -> SpaceSuitResult<Vec<String>> {
        let left = self.inner.left_delimiter.as_str();
        let right = self.inner.right_delimiter.as_str();

        let left_position = query.find(left).ok_or_else(|| {
            SpaceSuitError::new(
                &format!("Missing left delimiter {}", left),
                ErrorKind::MissingDelimiter,
            )
        })?;
        let invocation_start = left_position + left.len();
        if query[invocation_start..].contains(left) {
            return Err(SpaceSuitError::new(
                &format!("Multiple occurrences of left delimiter {}", left),
                ErrorKind::DuplicateDelimiter,
            ));
        }

        let right_position = query.find(right).ok_or_else(|| {
            SpaceSuitError::new(
                &format!("Missing right delimiter {}", right),
                ErrorKind::MissingDelimiter,
            )
        })?;
        let suffix_start = right_position + right.len();
        if query[suffix_start..].contains(right) {
            return Err(SpaceSuitError::new(
                &format!("Multiple occurrences of right delimiter {}", right),
                ErrorKind::DuplicateDelimiter,
            ));
        }

        if right_position < invocation_start {
            return Err(SpaceSuitError::new(
                &format!(
                    "Right delimiter {} must follow left delimiter {}",
                    right, left
                ),
                ErrorKind::MalformedInvocation,
            ));
        }

        let invocation = &query[invocation_start..right_position];
        let fragments = self.inner.transformer.transform(invocation, max_ranges)?;

        let prefix = &query[..left_position];
        let suffix = &query[suffix_start..];
        let rewrites: Vec<String> = fragments
            .iter()
            .map(|fragment| {
                let mut rewrite =
                    String::with_capacity(prefix.len() + fragment.len() + suffix.len());
                rewrite.push_str(prefix);
                rewrite.push_str(fragment);
                rewrite.push_str(suffix);
                rewrite
            })
            .collect();

        log::debug!(
            "Rewrote spatial query into {} queries (max {})",
            rewrites.len(),
            max_ranges
        );
        Ok(rewrites)
    }

    pub fn left_delimiter(&self) -> &str {
        &self.inner.left_delimiter
    }

    pub fn right_delimiter(&self) -> &str {
        &self.inner.right_delimiter
    }

    pub fn oracle(&self) -> &SpatialOracle {
        &self.inner.oracle
    }
}

fn validate_delimiters(left_delimiter: &str, right_delimiter: &str) -> SpaceSuitResult<()> {
    if left_delimiter.is_empty() || right_delimiter.is_empty() || left_delimiter == right_delimiter {
        return Err(SpaceSuitError::new(
            &format!(
                "left delimiter: \"{}\", right delimiter: \"{}\"",
                left_delimiter, right_delimiter
            ),
            ErrorKind::InvalidConfiguration,
        ));
    }
    Ok(())
}

/// Builder for [`SpaceSuit`].
///
/// Setters never fail; the first configuration error is kept and returned by
/// [`SpaceSuitBuilder::build`].
///
/// # Examples
///
/// ```rust,ignore
/// use spacesuit::SpaceSuit;
///
/// let space_suit = SpaceSuit::builder()
///     .oracle(space.into())
///     .delimiters("/*<", ">*/")
///     .function("inradius", SpatialFunction::new(InRadius::new(space.into())))
///     .build()?;
/// ```
pub struct SpaceSuitBuilder {
    error: Option<SpaceSuitError>,
    oracle: Option<SpatialOracle>,
    left_delimiter: String,
    right_delimiter: String,
    functions: Vec<(String, SpatialFunction)>,
}

impl Default for SpaceSuitBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpaceSuitBuilder {
    pub fn new() -> Self {
        SpaceSuitBuilder {
            error: None,
            oracle: None,
            left_delimiter: DEFAULT_LEFT_DELIMITER.to_string(),
            right_delimiter: DEFAULT_RIGHT_DELIMITER.to_string(),
            functions: Vec::new(),
        }
    }

    /// Sets the spatial oracle. Required.
    pub fn oracle(mut self, oracle: SpatialOracle) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Sets the invocation delimiters.
    ///
    /// Invalid delimiters are reported by `build()`.
    pub fn delimiters(mut self, left_delimiter: &str, right_delimiter: &str) -> Self {
        if self.error.is_none() {
            if let Err(e) = validate_delimiters(left_delimiter, right_delimiter) {
                self.error = Some(e);
            }
        }
        self.left_delimiter = left_delimiter.to_string();
        self.right_delimiter = right_delimiter.to_string();
        self
    }

    /// Registers an additional spatial function under `name`.
    pub fn function(mut self, name: &str, function: SpatialFunction) -> Self {
        if self.error.is_none() && name.trim().is_empty() {
            self.error = Some(SpaceSuitError::new(
                "function name must not be empty",
                ErrorKind::InvalidConfiguration,
            ));
        }
        self.functions.push((name.to_string(), function));
        self
    }

    /// Builds the `SpaceSuit`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if a setter failed or no oracle was supplied.
    pub fn build(self) -> SpaceSuitResult<SpaceSuit> {
        if let Some(error) = self.error {
            return Err(error);
        }
        let oracle = self.oracle.ok_or_else(|| {
            SpaceSuitError::new("a spatial oracle is required", ErrorKind::InvalidConfiguration)
        })?;

        let transformer = self
            .functions
            .into_iter()
            .fold(Transformer::new(oracle.clone()), |transformer, (name, function)| {
                transformer.with_function(&name, function)
            });
        SpaceSuit::with_transformer(oracle, &self.left_delimiter, &self.right_delimiter, transformer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::SpatialFunctionProvider;
    use crate::oracle::tests::MockOracle;
    use crate::oracle::KeyRange;
    use std::sync::atomic::Ordering;

    struct Constant(&'static str);

    impl SpatialFunctionProvider for Constant {
        fn invoke(&self, _arguments: &[String], _max_ranges: usize) -> SpaceSuitResult<Vec<String>> {
            Ok(vec![self.0.to_string()])
        }
    }

    fn oracle() -> SpatialOracle {
        SpatialOracle::new(MockOracle::with_ranges(vec![
            KeyRange::new(10, 19),
            KeyRange::new(40, 49),
            KeyRange::new(90, 99),
        ]))
    }

    fn space_suit() -> SpaceSuit {
        SpaceSuit::new(oracle(), "<<", ">>").unwrap()
    }

    #[test]
    fn new_rejects_bad_delimiters() {
        for (left, right) in [("", ">>"), ("<<", ""), ("<<", "<<"), ("", "")] {
            let err = SpaceSuit::new(oracle(), left, right).err().unwrap();
            assert_eq!(err.kind(), &ErrorKind::InvalidConfiguration);
        }
    }

    #[test]
    fn transform_query_splices_each_fragment() {
        let queries = space_suit()
            .transform_query("select id from t where <<inbox(z, x, 1, 2, y, 3, 4)>> order by id", 8)
            .unwrap();
        assert_eq!(
            queries,
            vec![
                "select id from t where (z between 10 and 19 and x between 1.0 and 2.0 and y between 3.0 and 4.0) order by id",
                "select id from t where (z between 40 and 49 and x between 1.0 and 2.0 and y between 3.0 and 4.0) order by id",
                "select id from t where (z between 90 and 99 and x between 1.0 and 2.0 and y between 3.0 and 4.0) order by id",
            ]
        );
    }

    #[test]
    fn transform_query_honours_max_ranges() {
        let queries = space_suit()
            .transform_query("<<inbox(z, x, 1, 2, y, 3, 4)>>", 2)
            .unwrap();
        assert_eq!(queries.len(), 2);
        assert!(space_suit()
            .transform_query("<<inbox(z, x, 1, 2, y, 3, 4)>>", 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn transform_query_missing_delimiters() {
        let err = space_suit().transform_query("select ... >>", 4).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MissingDelimiter);
        let err = space_suit().transform_query("select ... <<", 4).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MissingDelimiter);
    }

    #[test]
    fn transform_query_duplicate_delimiters() {
        let err = space_suit()
            .transform_query("select << ... << ... >>", 4)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DuplicateDelimiter);
        let err = space_suit()
            .transform_query("select << ... >> ... >>", 4)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::DuplicateDelimiter);
    }

    #[test]
    fn transform_query_right_before_left() {
        let err = space_suit()
            .transform_query("select >> inbox(z, x, 1, 2, y, 3, 4) <<", 4)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedInvocation);
    }

    #[test]
    fn transform_query_without_function() {
        let err = space_suit()
            .transform_query("select << ... >> ...", 4)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedInvocation);
    }

    #[test]
    fn transform_query_rejects_text_after_invocation() {
        let err = space_suit()
            .transform_query("select << inbox(z, x, 1, 2, y, 3, 4) and x > 0 >>", 4)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedInvocation);

        let queries = space_suit()
            .transform_query("select << inbox(z, x, 1, 2, y, 3, 4) \t >>", 4)
            .unwrap();
        assert_eq!(queries.len(), 3);
    }

    #[test]
    fn transform_query_with_multibyte_delimiters() {
        let space_suit = SpaceSuit::new(oracle(), "«", "»").unwrap();
        let queries = space_suit
            .transform_query("select é «inbox(z, x, 1, 2, y, 3, 4)» ü", 1)
            .unwrap();
        assert_eq!(
            queries,
            vec!["select é (z between 10 and 19 and x between 1.0 and 2.0 and y between 3.0 and 4.0) ü"]
        );
    }

    #[test]
    fn failed_validation_does_not_reach_oracle() {
        let mock = MockOracle::with_ranges(vec![KeyRange::new(1, 2)]);
        let calls = mock.decompose_calls.clone();
        let space_suit = SpaceSuit::new(SpatialOracle::new(mock), "<<", ">>").unwrap();
        let err = space_suit
            .transform_query("<<inbox(z, x, 5, 1, y, 3, 4)>>", 4)
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::OutOfRange);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn spatial_index_key_delegates_to_oracle() {
        assert_eq!(space_suit().spatial_index_key(3.0, 4.0).unwrap(), 3 * 1024 + 4);
        assert!(space_suit().spatial_index_key(5000.0, 4.0).is_err());
    }

    #[test]
    fn builder_uses_default_delimiters() {
        let space_suit = SpaceSuit::builder().oracle(oracle()).build().unwrap();
        assert_eq!(space_suit.left_delimiter(), "<<");
        assert_eq!(space_suit.right_delimiter(), ">>");
    }

    #[test]
    fn builder_requires_oracle() {
        let err = SpaceSuit::builder().build().err().unwrap();
        assert_eq!(err.kind(), &ErrorKind::InvalidConfiguration);
    }

    #[test]
    fn builder_reports_first_error() {
        let err = SpaceSuit::builder()
            .oracle(oracle())
            .delimiters("[[", "[[")
            .delimiters("[[", "]]")
            .build()
            .err()
            .unwrap();
        assert_eq!(err.kind(), &ErrorKind::InvalidConfiguration);
        assert!(err.message().contains("[["));
    }

    #[test]
    fn builder_registers_functions() {
        let space_suit = SpaceSuit::builder()
            .oracle(oracle())
            .delimiters("/*<", ">*/")
            .function("always", SpatialFunction::new(Constant("1 = 1")))
            .build()
            .unwrap();
        let queries = space_suit
            .transform_query("select * from t where /*< always() >*/", 4)
            .unwrap();
        assert_eq!(queries, vec!["select * from t where 1 = 1"]);
    }

    #[test]
    fn builder_rejects_blank_function_name() {
        let err = SpaceSuit::builder()
            .oracle(oracle())
            .function(" ", SpatialFunction::new(Constant("1 = 1")))
            .build()
            .err()
            .unwrap();
        assert_eq!(err.kind(), &ErrorKind::InvalidConfiguration);
    }
}
