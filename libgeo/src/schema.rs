//! The fixed layout of the table that uploads are stored in
use crate::{Error, Result};
use serde::Serialize;

/// The table name and ordered column list that uploaded data must match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

/// The layout of the `location` table. CSV uploads must have exactly these
/// columns, in this order, without a header row.
pub const LOCATION_SCHEMA: Schema = Schema {
    table: "location",
    columns: &["name", "latitude", "longitude", "elevation", "description"],
};

impl Schema {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.to_string()).collect()
    }

    /// The expected CSV layout as shown to users, e.g. `name, latitude, ...`
    pub fn format_hint(&self) -> String {
        self.columns.join(", ")
    }

    /// The header that is assigned positionally to every headerless record
    pub(crate) fn header(&self) -> csv::StringRecord {
        csv::StringRecord::from(self.columns.to_vec())
    }

    /// Check the raw column count of an upload before any names are assigned to
    /// it. Unnamed columns are labelled by position, starting from 0.
    pub fn check_width(&self, width: usize) -> Result<()> {
        if width == self.width() {
            return Ok(());
        }
        Err(Error::SchemaMismatch {
            expected: self.column_names(),
            actual: (0..width).map(|i| i.to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hint() {
        assert_eq!(
            LOCATION_SCHEMA.format_hint(),
            "name, latitude, longitude, elevation, description"
        );
        assert_eq!(LOCATION_SCHEMA.width(), 5);
    }

    #[test]
    fn test_check_width() {
        assert!(LOCATION_SCHEMA.check_width(5).is_ok());
        match LOCATION_SCHEMA.check_width(4) {
            Err(Error::SchemaMismatch { expected, actual }) => {
                assert_eq!(expected, LOCATION_SCHEMA.column_names());
                assert_eq!(actual, vec!["0", "1", "2", "3"]);
            }
            other => panic!("Expected a schema mismatch, got {other:?}"),
        }
        assert!(matches!(
            LOCATION_SCHEMA.check_width(6),
            Err(Error::SchemaMismatch { .. })
        ));
    }
}
