//! This is a library that provides the objects and operations behind the geological
//! location uploader: validating and ingesting CSV uploads into the `location` table,
//! and summarizing the stored records as tables, statistics and charts.

pub mod charts;
pub mod database;
pub mod error;
pub mod ingest;
pub mod location;
pub mod page;
pub mod schema;
pub mod stats;
pub mod viewer;

pub use database::Database;
pub use error::Error;
pub use error::Result;
pub use schema::{LOCATION_SCHEMA, Schema};
