//! Properties of query rewriting that hold for any well-formed `inbox` query.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spacesuit::function::format_number;
use spacesuit::{ErrorKind, SpaceSuit};
use spacesuit_int_test::test_util::{
    cleanup, create_geo_context, create_test_context, prefix_and_suffix, run_test, SIDE,
};
use std::thread;

#[ctor::ctor]
fn init() {
    colog::init();
}

const PREFIX: &str = "select id, x, y from t where ";
const SUFFIX: &str = " order by id";

fn template(x_lo: f64, x_hi: f64, y_lo: f64, y_hi: f64) -> String {
    format!(
        "{}<< inbox(z, x, {}, {}, y, {}, {}) >>{}",
        PREFIX, x_lo, x_hi, y_lo, y_hi, SUFFIX
    )
}

fn random_box(rng: &mut StdRng, max_side: f64) -> (f64, f64, f64, f64) {
    let side_x = rng.random_range(0.0..max_side);
    let side_y = rng.random_range(0.0..max_side);
    let x_lo = rng.random_range(0.0..SIDE - side_x);
    let y_lo = rng.random_range(0.0..SIDE - side_y);
    (x_lo, x_lo + side_x, y_lo, y_lo + side_y)
}

/// Pulls the `z between lo and hi` bounds out of a rewritten query.
fn key_range(query: &str) -> (i64, i64) {
    let start = query.find("(z between ").unwrap() + "(z between ".len();
    let mut words = query[start..].split_whitespace();
    let lo = words.next().unwrap().parse().unwrap();
    assert_eq!(words.next(), Some("and"));
    let hi = words.next().unwrap().parse().unwrap();
    (lo, hi)
}

#[test]
fn rewrites_share_prefix_and_suffix() {
    run_test(
        create_test_context,
        |ctx| {
            let mut rng = StdRng::seed_from_u64(1);
            for _ in 0..200 {
                let (x_lo, x_hi, y_lo, y_hi) = random_box(&mut rng, 50_000.0);
                let max_ranges = rng.random_range(1..16);
                let queries = ctx
                    .space_suit()
                    .transform_query(&template(x_lo, x_hi, y_lo, y_hi), max_ranges)?;

                assert!(!queries.is_empty() && queries.len() <= max_ranges);
                let bounds = format!(
                    "and x between {} and {} and y between {} and {})",
                    format_number(x_lo),
                    format_number(x_hi),
                    format_number(y_lo),
                    format_number(y_hi)
                );
                for query in &queries {
                    let (prefix, suffix) = prefix_and_suffix(query, "(z between ").unwrap();
                    assert_eq!(prefix, PREFIX);
                    assert_eq!(suffix, SUFFIX);
                    assert!(query.contains(&bounds), "{} lacks {}", query, bounds);
                }
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn rewriting_is_deterministic() {
    run_test(
        create_test_context,
        |ctx| {
            let query = template(1000.25, 90_000.5, 33_333.0, 444_444.0);
            let first = ctx.space_suit().transform_query(&query, 8)?;
            let second = ctx.space_suit().transform_query(&query, 8)?;
            assert_eq!(first, second);

            let clone = ctx.space_suit().clone();
            assert_eq!(clone.transform_query(&query, 8)?, first);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn key_ranges_cover_every_point_in_the_box() {
    run_test(
        create_geo_context,
        |ctx| {
            let mut rng = StdRng::seed_from_u64(2);
            for _ in 0..50 {
                let lat_lo = rng.random_range(-90.0..80.0);
                let lon_lo = rng.random_range(-180.0..170.0);
                let lat_hi = lat_lo + rng.random_range(0.0..10.0);
                let lon_hi = lon_lo + rng.random_range(0.0..10.0);
                let query = format!(
                    "select * from place where <<inbox(z, lat, {}, {}, lon, {}, {})>>",
                    lat_lo, lat_hi, lon_lo, lon_hi
                );
                let ranges: Vec<(i64, i64)> = ctx
                    .space_suit()
                    .transform_query(&query, 6)?
                    .iter()
                    .map(|q| key_range(q))
                    .collect();

                for _ in 0..50 {
                    let lat = rng.random_range(lat_lo..=lat_hi);
                    let lon = rng.random_range(lon_lo..=lon_hi);
                    let key = ctx.space_suit().spatial_index_key(lat, lon)?;
                    assert!(
                        ranges.iter().any(|&(lo, hi)| lo <= key && key <= hi),
                        "({}, {}) key {} not covered by {:?}",
                        lat,
                        lon,
                        key,
                        ranges
                    );
                }
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn box_inside_one_cell_yields_one_query() {
    run_test(
        create_test_context,
        |ctx| {
            let queries = ctx
                .space_suit()
                .transform_query(&template(77.125, 77.5, 1234.0, 1234.75), 4)?;
            assert_eq!(queries.len(), 1);
            assert!(queries[0]
                .contains("and x between 77.125 and 77.5 and y between 1234.0 and 1234.75)"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn zero_max_ranges_yields_no_queries() {
    run_test(
        create_test_context,
        |ctx| {
            let queries = ctx
                .space_suit()
                .transform_query(&template(10.0, 500_000.0, 10.0, 500_000.0), 0)?;
            assert!(queries.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn truncation_is_not_an_error() {
    run_test(
        create_test_context,
        |ctx| {
            // needs four full-resolution cells, but only one range is allowed
            let queries = ctx.space_suit().transform_query(
                &template(524287.0, 524288.0, 524287.0, 524288.0),
                1,
            )?;
            assert_eq!(queries.len(), 1);
            assert!(queries[0].contains(&format!("(z between 0 and {} and", 0x7fffffffffffffc0i64)));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn huge_max_ranges_is_only_a_cap() {
    run_test(
        create_test_context,
        |ctx| {
            let query = template(524287.0, 524288.0, 524287.0, 524288.0);
            let capped = ctx.space_suit().transform_query(&query, usize::MAX)?;
            assert_eq!(capped.len(), 4);
            assert_eq!(capped, ctx.space_suit().transform_query(&query, 4)?);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn invalid_bounds_are_out_of_range() {
    run_test(
        create_test_context,
        |ctx| {
            for (x_lo, x_hi, y_lo, y_hi) in [
                (20.0, 10.0, 0.0, 1.0),
                (0.0, 1.0, 9.0, 8.0),
                (-0.5, 1.0, 0.0, 1.0),
                (0.0, SIDE + 1.0, 0.0, 1.0),
                (0.0, 1.0, -3.0, 1.0),
                (0.0, 1.0, 0.0, SIDE * 2.0),
            ] {
                let err = ctx
                    .space_suit()
                    .transform_query(&template(x_lo, x_hi, y_lo, y_hi), 4)
                    .unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::OutOfRange);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn malformed_arguments() {
    run_test(
        create_test_context,
        |ctx| {
            let cases = [
                ("<<inbox(`z, x, 1, 2, y, 3, 4)>>", ErrorKind::MalformedIdentifier),
                ("<<inbox(z, x, one, 2, y, 3, 4)>>", ErrorKind::InvalidNumber),
                ("<<inbox(z, x, 1, 2, y, 3)>>", ErrorKind::MalformedInvocation),
                ("<<inbox(z, x, (1), 2, y, 3, 4)>>", ErrorKind::MalformedInvocation),
                ("<<inbox(z, x, 1, 2, y, 3, 4>>", ErrorKind::MalformedInvocation),
            ];
            for (query, kind) in cases {
                let err = ctx.space_suit().transform_query(query, 4).unwrap_err();
                assert_eq!(err.kind(), &kind, "query {}", query);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn concurrent_rewrites_match_serial_ones() {
    run_test(
        create_test_context,
        |ctx| {
            let mut rng = StdRng::seed_from_u64(3);
            let queries: Vec<String> = (0..64)
                .map(|_| {
                    let (x_lo, x_hi, y_lo, y_hi) = random_box(&mut rng, 100_000.0);
                    template(x_lo, x_hi, y_lo, y_hi)
                })
                .collect();
            let serial: Vec<Vec<String>> = queries
                .iter()
                .map(|q| ctx.space_suit().transform_query(q, 6))
                .collect::<Result<_, _>>()?;

            let space_suit: &SpaceSuit = ctx.space_suit();
            thread::scope(|scope| {
                let handles: Vec<_> = (0..8)
                    .map(|_| {
                        scope.spawn(|| {
                            queries
                                .iter()
                                .map(|q| space_suit.transform_query(q, 6).unwrap())
                                .collect::<Vec<_>>()
                        })
                    })
                    .collect();
                for handle in handles {
                    assert_eq!(handle.join().unwrap(), serial);
                }
            });
            Ok(())
        },
        cleanup,
    )
}
