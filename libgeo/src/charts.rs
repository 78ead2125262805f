//! Chart data for the location table: an elevation histogram and a bar chart of
//! how often each location name occurs
use crate::{Database, Result, Schema, location::LocationRecord};
use serde::Serialize;
use std::collections::HashMap;

/// The number of bins in the elevation histogram, independent of the data
pub const HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub title: String,
    pub column: String,
    pub bins: Vec<HistogramBin>,
    pub max_count: usize,
}

impl Histogram {
    /// Sort the non-missing values into `nbins` bins of equal width that span the
    /// range of the values. The last bin includes its upper edge. When every value
    /// is equal, the range is widened by 0.5 on each side; with no values at all
    /// the bins span [0, 1].
    pub fn new<I>(title: &str, column: &str, values: I, nbins: usize) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let values = values
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        let range = values
            .iter()
            .copied()
            .reduce(f64::min)
            .zip(values.iter().copied().reduce(f64::max));
        let (lo, hi) = match range {
            None => (0.0, 1.0),
            Some((lo, hi)) if lo == hi => (lo - 0.5, hi + 0.5),
            Some(range) => range,
        };
        let width = (hi - lo) / nbins as f64;
        let mut bins = (0..nbins)
            .map(|i| HistogramBin {
                start: lo + width * i as f64,
                end: if i + 1 == nbins {
                    hi
                } else {
                    lo + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect::<Vec<_>>();
        for v in values {
            let idx = (((v - lo) / width) as usize).min(nbins - 1);
            bins[idx].count += 1;
        }
        Self {
            title: title.to_string(),
            column: column.to_string(),
            max_count: bins.iter().map(|b| b.count).max().unwrap_or_default(),
            bins,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
    pub max_count: usize,
}

impl BarChart {
    /// Count the records for each distinct name, most frequent first. Names with
    /// equal counts keep the order in which they first appear. Records without a
    /// name are not counted.
    pub fn name_frequency(records: &[LocationRecord]) -> Self {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut bars: Vec<Bar> = Vec::new();
        for name in records.iter().filter_map(|r| r.name.as_deref()) {
            match index.get(name) {
                Some(&i) => bars[i].count += 1,
                None => {
                    index.insert(name, bars.len());
                    bars.push(Bar {
                        label: name.to_string(),
                        count: 1,
                    });
                }
            }
        }
        // stable sort, so ties stay in order of first appearance
        bars.sort_by(|a, b| b.count.cmp(&a.count));
        Self {
            title: "Location Name Frequency".to_string(),
            x_label: "Location Name".to_string(),
            y_label: "Count".to_string(),
            max_count: bars.first().map(|b| b.count).unwrap_or_default(),
            bars,
        }
    }
}

/// What the chart page shows for the current contents of the table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChartsView {
    Empty,
    Populated {
        elevation: Histogram,
        names: BarChart,
    },
}

impl ChartsView {
    pub fn new(records: &[LocationRecord]) -> Self {
        if records.is_empty() {
            return ChartsView::Empty;
        }
        ChartsView::Populated {
            elevation: Histogram::new(
                "Elevation Histogram",
                "elevation",
                records.iter().map(|r| r.elevation),
                HISTOGRAM_BINS,
            ),
            names: BarChart::name_frequency(records),
        }
    }
}

/// Load every record in the table and build both charts from them
pub async fn load_charts(schema: &Schema, db: &Database) -> Result<ChartsView> {
    let records = LocationRecord::fetch_all(schema, db).await?;
    Ok(ChartsView::new(&records))
}
