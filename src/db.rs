use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::error::Result;

pub type DB = SqlitePool;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    id       TEXT PRIMARY KEY,
    date     TEXT,
    part     TEXT,
    exercise TEXT,
    sets     INTEGER NULL,
    reps     INTEGER NULL,
    distance REAL NULL,
    minutes  INTEGER NULL,
    seconds  INTEGER NULL
)
"#;

/// Open (creating if missing) the database at `path`. Accepts a plain file
/// path or any sqlite URL, e.g. `sqlite::memory:`.
pub async fn open(path: &str) -> Result<DB> {
    let opts = SqliteConnectOptions::from_str(path)?.create_if_missing(true);

    // A single connection serializes every write; there is only one writer.
    Ok(SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await?)
}

/// Ensure the `records` table exists.
pub async fn init_schema(pool: &DB) -> Result<()> {
    sqlx::query(SCHEMA).execute(pool).await?;
    Ok(())
}
