//! Prints the places inside a latitude/longitude box, one block per rewritten query.

use clap::Parser;
use spacesuit::{Region, SpaceSuit};
use spacesuit_bench::config::{load_space, MAX_QUERIES};
use spacesuit_bench::stores::{SqliteStore, StoreResult};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "query-db")]
struct Args {
    /// SQLite database file populated by `populate-db`
    db: PathBuf,

    #[arg(allow_negative_numbers = true)]
    min_lat: f64,

    #[arg(allow_negative_numbers = true)]
    max_lat: f64,

    #[arg(allow_negative_numbers = true)]
    min_lon: f64,

    #[arg(allow_negative_numbers = true)]
    max_lon: f64,

    /// JSON space description the database was populated with
    #[arg(long)]
    space_file: Option<PathBuf>,

    /// Maximum number of rewritten queries
    #[arg(long, default_value_t = MAX_QUERIES)]
    max_queries: usize,
}

fn main() -> StoreResult<()> {
    env_logger::init();
    let args = Args::parse();
    let space = load_space(args.space_file.as_deref())?;
    let space_suit = SpaceSuit::new(space.into(), "<<", ">>")?;
    let store = SqliteStore::open(&args.db)?;

    let region = Region::new(args.min_lat, args.max_lat, args.min_lon, args.max_lon);
    for (query, rows) in store.query_places(&space_suit, &region, args.max_queries)? {
        println!("{}", query);
        for row in rows {
            println!(
                "\t{:8.4}\t{:8.4}\t({}):\t{}",
                row.place.latitude, row.place.longitude, row.z, row.place.description
            );
        }
    }
    Ok(())
}
