//! Objects related to the location records stored in the database
use crate::{Database, Result, Schema};
use serde::{Deserialize, Serialize};
use sqlx::{Connection, QueryBuilder, Sqlite};
use tracing::{debug, warn};

/// The maximum number of records sent in a single `INSERT` statement. Five values
/// are bound per record, which keeps each statement well below SQLite's limit on
/// bound parameters.
const INSERT_CHUNK_SIZE: usize = 100;

/// The numeric columns of the location table
pub const NUMERIC_COLUMNS: [&str; 3] = ["latitude", "longitude", "elevation"];

/// A single geological location. Every field may be missing since empty CSV fields
/// are stored as NULL.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow, Deserialize, Serialize)]
pub struct LocationRecord {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
    pub description: Option<String>,
}

impl LocationRecord {
    pub fn new(
        name: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        elevation: Option<f64>,
        description: Option<String>,
    ) -> Self {
        Self {
            name,
            latitude,
            longitude,
            elevation,
            description,
        }
    }

    /// Returns the coordinates of this location if both of them are known
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// The numeric attributes of this record, in the order of [NUMERIC_COLUMNS]
    pub fn numeric_values(&self) -> [Option<f64>; 3] {
        [self.latitude, self.longitude, self.elevation]
    }

    fn build_query(schema: &Schema) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM {}",
            schema.columns.join(", "),
            schema.table
        ));
        qb.push(" ORDER BY rowid ASC");
        qb
    }

    /// Load every record in the table, in insertion order
    pub async fn fetch_all(schema: &Schema, db: &Database) -> Result<Vec<Self>> {
        let mut conn = db.connection().await?;
        Ok(Self::build_query(schema)
            .build_query_as()
            .fetch_all(&mut *conn)
            .await?)
    }

    /// Append all of the given records to the table. Either every record is
    /// committed or, if anything fails, none of them are. Returns the number of
    /// rows that were inserted.
    pub async fn insert_all(records: &[Self], schema: &Schema, db: &Database) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut conn = db.connection().await?;
        let mut tx = conn.begin().await?;
        let mut inserted = 0;
        for chunk in records.chunks(INSERT_CHUNK_SIZE) {
            let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
                "INSERT INTO {} ({}) ",
                schema.table,
                schema.columns.join(", ")
            ));
            qb.push_values(chunk, |mut b, record| {
                b.push_bind(record.name.clone())
                    .push_bind(record.latitude)
                    .push_bind(record.longitude)
                    .push_bind(record.elevation)
                    .push_bind(record.description.clone());
            });
            match qb.build().execute(&mut *tx).await {
                Ok(res) => inserted += res.rows_affected(),
                Err(e) => {
                    warn!("Bulk insert failed, rolling back: {e}");
                    // the insert error is what gets reported, even if the rollback fails too
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!("Rollback failed: {rollback_err}");
                    }
                    return Err(e.into());
                }
            }
        }
        tx.commit().await?;
        debug!(inserted, table = schema.table, "Committed bulk insert");
        Ok(inserted)
    }
}
