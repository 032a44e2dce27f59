use rand::rngs::StdRng;
use rand::SeedableRng;
use spacesuit::{Region, SpaceSuit};
use spacesuit_bench::config::{geo_space, BenchmarkConfig};
use spacesuit_bench::data_gen::{generate_points, generate_query_boxes, write_places};
use spacesuit_bench::stores::SqliteStore;
use std::io::{BufReader, Seek, SeekFrom};

const ROWS: usize = 20_000;

fn loaded_store(config: &BenchmarkConfig, rng: &mut StdRng) -> SqliteStore {
    let space_suit = config.space_suit().unwrap();
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.create_points_table().unwrap();
    let points = generate_points(rng, config, ROWS);
    store.populate(&space_suit, &points, config.batch_size).unwrap();
    store
}

fn sorted(mut ids: Vec<i64>) -> Vec<i64> {
    ids.sort_unstable();
    ids
}

#[test]
fn test_z_query_rows_equal_plain_query_rows() {
    let config = BenchmarkConfig::quick();
    let space_suit = config.space_suit().unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let store = loaded_store(&config, &mut rng);
    store.add_index("z").unwrap();

    // boxes expected to hold about 10 and about 1000 rows
    let mut boxes = generate_query_boxes(&mut rng, &config, ROWS as u64, 25);
    let mut big = config.clone();
    big.expected_rows = 1_000;
    boxes.extend(generate_query_boxes(&mut rng, &big, ROWS as u64, 5));

    let mut total = 0;
    for region in &boxes {
        let plain = sorted(store.run_plain_query(region).unwrap());
        for max_ranges in [1, 2, 6, 32] {
            let z = store.run_z_query(&space_suit, region, max_ranges).unwrap();
            assert_eq!(z.len(), plain.len(), "duplicate or missing rows for {}", region);
            assert_eq!(sorted(z), plain, "box {} max_ranges {}", region, max_ranges);
        }
        total += plain.len();
    }
    assert!(total > 0);
}

#[test]
fn test_z_query_on_domain_edges() {
    let config = BenchmarkConfig::quick();
    let space_suit = config.space_suit().unwrap();
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.create_points_table().unwrap();
    let points = vec![(0.0, 0.0), (1_000_000.0, 1_000_000.0), (0.0, 1_000_000.0), (500_000.0, 500_000.0)];
    store.populate(&space_suit, &points, 10).unwrap();

    let everything = Region::new(0.0, 1_000_000.0, 0.0, 1_000_000.0);
    assert_eq!(sorted(store.run_z_query(&space_suit, &everything, 4).unwrap()), vec![1, 2, 3, 4]);

    let corner = Region::new(999_999.5, 1_000_000.0, 999_999.5, 1_000_000.0);
    assert_eq!(store.run_z_query(&space_suit, &corner, 4).unwrap(), vec![2]);

    let outside = Region::new(0.0, 1_000_001.0, 0.0, 1.0);
    assert!(store.run_z_query(&space_suit, &outside, 4).is_err());
}

#[test]
fn test_file_store_persists_points() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("points.db");
    let config = BenchmarkConfig::quick();
    let mut rng = StdRng::seed_from_u64(5);
    {
        let space_suit = config.space_suit().unwrap();
        let mut store = SqliteStore::open(&path).unwrap();
        store.create_points_table().unwrap();
        let points = generate_points(&mut rng, &config, 2_500);
        assert_eq!(store.populate(&space_suit, &points, 1_000).unwrap(), 2_500);
    }
    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.count().unwrap(), 2_500);
}

#[test]
fn test_generated_places_round_trip_through_file() {
    let geo_suit = SpaceSuit::new(geo_space().unwrap().into(), "<<", ">>").unwrap();
    let mut rng = StdRng::seed_from_u64(9);
    let mut file = tempfile::tempfile().unwrap();
    write_places(&mut rng, &mut file, 200).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let mut store = SqliteStore::open_in_memory().unwrap();
    store.create_places_table().unwrap();
    assert_eq!(store.load_places(&geo_suit, BufReader::new(file)).unwrap(), 200);

    let world = Region::new(-90.0, 90.0, -180.0, 180.0);
    let results = store.query_places(&geo_suit, &world, 4).unwrap();
    let rows: usize = results.iter().map(|(_, rows)| rows.len()).sum();
    assert_eq!(rows, 200);

    assert!(store
        .query_places(&geo_suit, &Region::new(0.0, 100.0, 0.0, 1.0), 4)
        .is_err());
}
