//! Loads a places file into the `place` table of a SQLite database.
//!
//! Each input line is `latitude longitude description`; the description runs to the end
//! of the line. Keys come from a latitude/longitude space with 24 bits per axis, or from
//! the JSON space description given with `--space-file`.

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use spacesuit::SpaceSuit;
use spacesuit_bench::config::load_space;
use spacesuit_bench::data_gen::write_places;
use spacesuit_bench::stores::{SqliteStore, StoreResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "populate-db")]
struct Args {
    /// Places file to load
    input: PathBuf,

    /// SQLite database file
    db: PathBuf,

    /// JSON space description, e.g. `{"lo": [-90, -180], "hi": [90, 180], "bits": [24, 24]}`
    #[arg(long)]
    space_file: Option<PathBuf>,

    /// Write this many generated places to the input file before loading it
    #[arg(long)]
    generate: Option<usize>,
}

fn main() -> StoreResult<()> {
    env_logger::init();
    let args = Args::parse();
    let space_suit = SpaceSuit::new(load_space(args.space_file.as_deref())?.into(), "<<", ">>")?;

    if let Some(count) = args.generate {
        let mut out = BufWriter::new(
            File::create(&args.input).with_context(|| format!("creating {}", args.input.display()))?,
        );
        write_places(&mut StdRng::from_entropy(), &mut out, count)?;
        out.flush()?;
        log::info!("generated {} places in {}", count, args.input.display());
    }

    let input = File::open(&args.input).with_context(|| format!("opening {}", args.input.display()))?;
    let mut store = SqliteStore::open(&args.db)?;
    store.create_places_table()?;
    let loaded = store.load_places(&space_suit, BufReader::new(input))?;
    println!("loaded {} places into {}", loaded, args.db.display());
    Ok(())
}
