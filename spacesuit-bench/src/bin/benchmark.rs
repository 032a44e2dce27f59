//! Loads random points into SQLite, then times plain coordinate queries against
//! z-indexed queries over the same boxes.

use anyhow::bail;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use spacesuit::{Region, SpaceSuit};
use spacesuit_bench::config::BenchmarkConfig;
use spacesuit_bench::data_gen::{generate_points, generate_query_boxes};
use spacesuit_bench::stores::{SqliteStore, StoreResult};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "benchmark")]
struct Args {
    /// SQLite database file
    db: PathBuf,

    /// Random seed (0 seeds from entropy)
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recreate table `t` and insert `count` random points
    Load { count: usize },
    /// Run `count` random box queries without an index, with x, x and y, and z indexes
    Query { count: usize },
}

fn main() -> StoreResult<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = if args.seed == 0 {
        StdRng::from_entropy()
    } else {
        StdRng::seed_from_u64(args.seed)
    };
    let mut config = BenchmarkConfig::new();
    let space_suit = config.space_suit()?;
    let mut store = SqliteStore::open(&args.db)?;

    match args.cmd {
        Command::Load { count } => {
            store.create_points_table()?;
            let points = generate_points(&mut rng, &config, count);
            let start = Instant::now();
            store.populate(&space_suit, &points, config.batch_size)?;
            println!("loaded {} points in {:?}", count, start.elapsed());
        }
        Command::Query { count } => {
            config.query_count = count;
            let rows = store.count()?;
            let boxes = generate_query_boxes(&mut rng, &config, rows, config.query_count);
            log::info!("{} rows, query side {}", rows, config.query_side(rows));
            query(&store, &space_suit, &config, &boxes)?;
        }
    }
    Ok(())
}

fn query(
    store: &SqliteStore,
    space_suit: &SpaceSuit,
    config: &BenchmarkConfig,
    boxes: &[Region],
) -> StoreResult<()> {
    let rows = run_queries("no index", boxes, |b| store.run_plain_query(b))?;
    store.add_index("x")?;
    let x_rows = run_queries("x", boxes, |b| store.run_plain_query(b))?;
    store.add_index("y")?;
    let xy_rows = run_queries("xy", boxes, |b| store.run_plain_query(b))?;
    store.drop_index("x")?;
    store.drop_index("y")?;
    store.add_index("z")?;
    let z_rows = run_queries("z", boxes, |b| {
        store.run_z_query(space_suit, b, config.max_z_queries)
    })?;
    store.drop_index("z")?;

    if rows != x_rows || rows != xy_rows || rows != z_rows {
        bail!(
            "rows: {}, x rows: {}, xy rows: {}, z rows: {}",
            rows,
            x_rows,
            xy_rows,
            z_rows
        );
    }
    Ok(())
}

fn run_queries<F>(label: &str, boxes: &[Region], run: F) -> StoreResult<usize>
where
    F: Fn(&Region) -> StoreResult<Vec<i64>>,
{
    let start = Instant::now();
    let mut rows_found = 0;
    for region in boxes {
        rows_found += run(region)?.len();
    }
    let average_msec = start.elapsed().as_secs_f64() * 1000.0 / boxes.len().max(1) as f64;
    println!("{}: {} msec", label, average_msec);
    Ok(rows_found)
}
