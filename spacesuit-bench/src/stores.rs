//! SQLite stores for benchmarks and the places programs

use crate::config::FILLER;
use anyhow::{bail, Context};
use rusqlite::{params, Connection};
use spacesuit::{Region, SpaceSuit};
use std::io::BufRead;
use std::path::Path;

/// Result type for store operations
pub type StoreResult<T> = anyhow::Result<T>;

const POINTS_SCHEMA: &str = "
    drop table if exists t;
    create table t(id integer primary key,
                   x real not null,
                   y real not null,
                   z integer not null,
                   filler text);";

const PLACES_SCHEMA: &str = "
    create table if not exists place(latitude real not null,
                                     longitude real not null,
                                     description text,
                                     z integer not null);
    create index if not exists idx_place_z on place(z);";

const INSERT_POINT: &str = "insert into t(x, y, z, filler) values (?1, ?2, ?3, ?4)";
const INSERT_PLACE: &str = "insert into place(latitude, longitude, description, z) values (?1, ?2, ?3, ?4)";
const PLAIN_QUERY: &str = "select id, x, y from t where x between ?1 and ?2 and y between ?3 and ?4";
const COUNT: &str = "select count(*) from t";

/// Columns of `t` that can carry a single-column index.
const INDEXABLE_COLUMNS: [&str; 3] = ["x", "y", "z"];

/// A SQLite database holding the point table `t` and the `place` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(SqliteStore {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Drops and recreates the point table.
    pub fn create_points_table(&self) -> StoreResult<()> {
        self.conn.execute_batch(POINTS_SCHEMA)?;
        Ok(())
    }

    /// Inserts `points` with their spatial index keys, committing every `batch_size` rows.
    pub fn populate(
        &mut self,
        space_suit: &SpaceSuit,
        points: &[(f64, f64)],
        batch_size: usize,
    ) -> StoreResult<usize> {
        for batch in points.chunks(batch_size.max(1)) {
            let tx = self.conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(INSERT_POINT)?;
                for &(x, y) in batch {
                    let z = space_suit.spatial_index_key(x, y)?;
                    stmt.execute(params![x, y, z, FILLER])?;
                }
            }
            tx.commit()?;
            log::debug!("committed {} points", batch.len());
        }
        Ok(points.len())
    }

    pub fn count(&self) -> StoreResult<u64> {
        let count: i64 = self.conn.query_row(COUNT, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Creates `idx_<column>` on `t` and refreshes planner statistics.
    pub fn add_index(&self, column: &str) -> StoreResult<()> {
        check_column(column)?;
        self.conn.execute_batch(&format!(
            "create index {} on t({}); analyze t;",
            index_name(column),
            column
        ))?;
        Ok(())
    }

    pub fn drop_index(&self, column: &str) -> StoreResult<()> {
        check_column(column)?;
        self.conn
            .execute_batch(&format!("drop index if exists {}; analyze t;", index_name(column)))?;
        Ok(())
    }

    /// Ids of the points inside `region`, found by comparing coordinates.
    pub fn run_plain_query(&self, region: &Region) -> StoreResult<Vec<i64>> {
        let mut stmt = self.conn.prepare_cached(PLAIN_QUERY)?;
        let ids = stmt
            .query_map(
                params![region.x_lo(), region.x_hi(), region.y_lo(), region.y_hi()],
                |row| row.get(0),
            )?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    /// Ids of the points inside `region`, found through the rewritten `inbox` queries.
    pub fn run_z_query(
        &self,
        space_suit: &SpaceSuit,
        region: &Region,
        max_ranges: usize,
    ) -> StoreResult<Vec<i64>> {
        let template = format!(
            "select id, x, y from t where << inbox(z, x, {}, {}, y, {}, {}) >>",
            region.x_lo(),
            region.x_hi(),
            region.y_lo(),
            region.y_hi()
        );
        let mut ids = Vec::new();
        for query in space_suit.transform_query(&template, max_ranges)? {
            let mut stmt = self.conn.prepare(&query)?;
            let rows = stmt.query_map([], |row| row.get::<_, i64>(0))?;
            for id in rows {
                ids.push(id?);
            }
        }
        Ok(ids)
    }

    /// Creates the `place` table if needed.
    pub fn create_places_table(&self) -> StoreResult<()> {
        self.conn.execute_batch(PLACES_SCHEMA)?;
        Ok(())
    }

    /// Loads `latitude longitude description` lines into `place`. Blank lines are skipped.
    pub fn load_places<R: BufRead>(&mut self, space_suit: &SpaceSuit, input: R) -> StoreResult<usize> {
        let tx = self.conn.transaction()?;
        let mut loaded = 0;
        {
            let mut stmt = tx.prepare_cached(INSERT_PLACE)?;
            for (number, line) in input.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let place = parse_place_line(&line)
                    .with_context(|| format!("line {}", number + 1))?;
                let z = space_suit.spatial_index_key(place.latitude, place.longitude)?;
                stmt.execute(params![place.latitude, place.longitude, place.description, z])?;
                loaded += 1;
            }
        }
        tx.commit()?;
        Ok(loaded)
    }

    /// Runs the rewritten queries for the places inside `region` (latitude on x,
    /// longitude on y). Returns each query with the rows it produced.
    pub fn query_places(
        &self,
        space_suit: &SpaceSuit,
        region: &Region,
        max_ranges: usize,
    ) -> StoreResult<Vec<(String, Vec<PlaceRow>)>> {
        let template = format!(
            "select latitude, longitude, z, description\nfrom place\nwhere << inbox(z, latitude, {}, {}, longitude, {}, {}) >> ",
            region.x_lo(),
            region.x_hi(),
            region.y_lo(),
            region.y_hi()
        );
        let mut results = Vec::new();
        for query in space_suit.transform_query(&template, max_ranges)? {
            let mut stmt = self.conn.prepare(&query)?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(PlaceRow {
                        place: Place {
                            latitude: row.get(0)?,
                            longitude: row.get(1)?,
                            description: row.get(3)?,
                        },
                        z: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            results.push((query, rows));
        }
        Ok(results)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
}

/// A stored place with its spatial index key.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRow {
    pub place: Place,
    pub z: i64,
}

/// Splits a places line into latitude, longitude and the remaining text.
pub fn parse_place_line(line: &str) -> StoreResult<Place> {
    let line = line.trim();
    let (latitude, rest) = split_field(line)
        .with_context(|| format!("missing longitude in {:?}", line))?;
    let (longitude, description) = split_field(rest)
        .with_context(|| format!("missing description in {:?}", line))?;
    Ok(Place {
        latitude: latitude
            .parse()
            .with_context(|| format!("bad latitude {:?}", latitude))?,
        longitude: longitude
            .parse()
            .with_context(|| format!("bad longitude {:?}", longitude))?,
        description: description.to_string(),
    })
}

fn split_field(text: &str) -> Option<(&str, &str)> {
    let end = text.find(char::is_whitespace)?;
    Some((&text[..end], text[end..].trim_start()))
}

fn check_column(column: &str) -> StoreResult<()> {
    if !INDEXABLE_COLUMNS.contains(&column) {
        bail!("no indexable column {:?} on t", column);
    }
    Ok(())
}

fn index_name(column: &str) -> String {
    format!("idx_{}", column)
}
