//! The data viewer: every stored record, its summary statistics and a map
use crate::{
    Database, Result, Schema,
    location::{LocationRecord, NUMERIC_COLUMNS},
    stats::{ColumnSummary, Summary},
};
use serde::Serialize;
use tracing::debug;

/// The initial zoom level of the location map
pub const MAP_ZOOM: u8 = 6;
/// The height of the location map in pixels
pub const MAP_HEIGHT: u32 = 500;
pub const MAP_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// A single marker on the location map along with its hover text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
    pub elevation: Option<f64>,
    pub description: Option<String>,
}

/// A scatter map of locations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub zoom: u8,
    pub height: u32,
    pub tile_url: &'static str,
    pub points: Vec<MapPoint>,
}

impl MapView {
    /// Builds a map with one point per record. Returns `None` if there are no
    /// records, or if any record is missing its latitude or longitude.
    pub fn from_records(records: &[LocationRecord]) -> Option<Self> {
        let points = records
            .iter()
            .map(|r| {
                r.coordinates().map(|(latitude, longitude)| MapPoint {
                    latitude,
                    longitude,
                    name: r.name.clone(),
                    elevation: r.elevation,
                    description: r.description.clone(),
                })
            })
            .collect::<Option<Vec<_>>>()?;
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        Some(Self {
            center_latitude: points.iter().map(|p| p.latitude).sum::<f64>() / n,
            center_longitude: points.iter().map(|p| p.longitude).sum::<f64>() / n,
            zoom: MAP_ZOOM,
            height: MAP_HEIGHT,
            tile_url: MAP_TILE_URL,
            points,
        })
    }
}

/// What the data viewer shows for the current contents of the table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DataView {
    /// The table has no rows. This is not an error.
    Empty,
    Populated {
        records: Vec<LocationRecord>,
        summary: Summary,
        /// only present when every record has coordinates
        map: Option<MapView>,
    },
}

impl DataView {
    pub fn new(records: Vec<LocationRecord>) -> Self {
        if records.is_empty() {
            return DataView::Empty;
        }
        let columns = NUMERIC_COLUMNS
            .into_iter()
            .enumerate()
            .map(|(i, column)| {
                ColumnSummary::describe(column, records.iter().map(|r| r.numeric_values()[i]))
            })
            .collect();
        let map = MapView::from_records(&records);
        debug!(rows = records.len(), has_map = map.is_some(), "Built data view");
        DataView::Populated {
            summary: Summary::new(columns),
            map,
            records,
        }
    }
}

/// Load every record in the table and build the viewer contents from them
pub async fn load_view(schema: &Schema, db: &Database) -> Result<DataView> {
    Ok(DataView::new(LocationRecord::fetch_all(schema, db).await?))
}
