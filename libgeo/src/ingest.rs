//! Ingestion of uploaded CSV files into the location table
use crate::{Database, Error, Result, Schema, location::LocationRecord};
use csv::{ReaderBuilder, Trim};
use serde::Serialize;
use std::io::Read;
use tracing::{debug, info};

/// Options that the user can choose when uploading a file
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    /// Discard the first line of the file instead of treating it as data
    pub skip_header: bool,
}

/// The result of a successful upload
#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub table: String,
    pub inserted: u64,
    pub records: Vec<LocationRecord>,
}

impl UploadReport {
    pub fn message(&self) -> String {
        format!("{} rows inserted into '{}'", self.inserted, self.table)
    }
}

/// Parse headerless CSV data into location records.
///
/// The column count of the file is checked against the schema before the schema's
/// column names are assigned to the fields by position. Every record must have the
/// same number of fields as the first one.
pub fn parse_csv<R: Read>(
    reader: R,
    schema: &Schema,
    options: UploadOptions,
) -> Result<Vec<LocationRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let header = schema.header();
    let mut rows = reader.records();
    if options.skip_header {
        let skipped = rows.next().transpose()?;
        debug!(?skipped, "Skipping header row");
    }

    let mut records: Vec<LocationRecord> = Vec::new();
    for row in rows {
        let row = row?;
        if records.is_empty() {
            schema.check_width(row.len())?;
        } else if row.len() != schema.width() {
            return Err(Error::RaggedRecord {
                line: row.position().map(|p| p.line()).unwrap_or_default(),
                expected: schema.width(),
                found: row.len(),
            });
        }
        records.push(row.deserialize(Some(&header))?);
    }
    if records.is_empty() {
        return Err(Error::EmptyUpload);
    }
    Ok(records)
}

/// Validate the uploaded file and append its rows to the table in one transaction.
/// Nothing is inserted unless the whole file could be parsed.
pub async fn upload_csv(
    contents: &[u8],
    options: UploadOptions,
    schema: &Schema,
    db: &Database,
) -> Result<UploadReport> {
    let records = parse_csv(contents, schema, options)?;
    debug!(rows = records.len(), "Parsed uploaded csv");
    let inserted = LocationRecord::insert_all(&records, schema, db).await?;
    info!(inserted, table = schema.table, "Uploaded csv");
    Ok(UploadReport {
        table: schema.table.to_string(),
        inserted,
        records,
    })
}
