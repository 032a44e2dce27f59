use spacesuit::errors::SpaceSuitResult;
use spacesuit::SpaceSuit;
use spacesuit_z::Space;

/// Side of the test domain: [0, 2^20] on both axes.
pub const SIDE: f64 = (1u64 << 20) as f64;

/// Bits per axis of the test domain.
pub const BITS: u32 = 20;

/// A configured `SpaceSuit` together with the space behind it.
#[derive(Clone)]
pub struct TestContext {
    space: Space,
    space_suit: SpaceSuit,
}

impl TestContext {
    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn space_suit(&self) -> &SpaceSuit {
        &self.space_suit
    }
}

/// Runs `test` against the context made by `before`, then always runs `after`.
///
/// Failures of any phase panic with the phase name and the error's debug output,
/// which includes its backtrace or cause chain.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> SpaceSuitResult<()>,
    B: Fn() -> SpaceSuitResult<TestContext>,
    A: Fn(TestContext) -> SpaceSuitResult<()>,
{
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };
    let result = test(ctx.clone());
    let after_result = after(ctx);
    if let Err(e) = result {
        panic!("Test failed: {:?}", e);
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

/// The 2^20 x 2^20 space with 20 bits per axis and `<<` / `>>` delimiters.
pub fn create_test_context() -> SpaceSuitResult<TestContext> {
    let space = Space::new([0.0, 0.0], [SIDE, SIDE], [BITS, BITS])?;
    create_context_with(space, "<<", ">>")
}

/// A latitude/longitude space with 24 bits per axis.
pub fn create_geo_context() -> SpaceSuitResult<TestContext> {
    let space = Space::new([-90.0, -180.0], [90.0, 180.0], [24, 24])?;
    create_context_with(space, "<<", ">>")
}

pub fn create_context_with(space: Space, left: &str, right: &str) -> SpaceSuitResult<TestContext> {
    let space_suit = SpaceSuit::new(space.clone().into(), left, right)?;
    Ok(TestContext { space, space_suit })
}

/// Nothing is held outside the context; kept for symmetry with `before`.
pub fn cleanup(_ctx: TestContext) -> SpaceSuitResult<()> {
    Ok(())
}

/// The rewritten query expected for a box of `xy_lo..xy_hi` on both axes and one key range.
pub fn expected_query(xy_lo: i64, xy_hi: i64, z_lo: i64, z_hi: i64) -> String {
    format!(
        "select ... (spatialIndexKey between {} and {} and x between {}.0 and {}.0 and y between {}.0 and {}.0) ...",
        z_lo, z_hi, xy_lo, xy_hi, xy_lo, xy_hi
    )
}

/// Splits `query` around the fragment that starts at `fragment_start` and ends at the
/// next `)`, returning the text before and after it.
pub fn prefix_and_suffix<'a>(query: &'a str, fragment_start: &str) -> Option<(&'a str, &'a str)> {
    let start = query.find(fragment_start)?;
    let end = query[start..].find(')')? + start + 1;
    Some((&query[..start], &query[end..]))
}
