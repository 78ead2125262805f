//! Descriptive statistics over the numeric columns of the location table
use serde::Serialize;

/// The statistics computed for every numeric column, in display order
pub const STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Descriptive statistics for a single numeric column. Missing values are skipped,
/// and a statistic that cannot be computed from the remaining values is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    /// sample standard deviation (n - 1 degrees of freedom)
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    pub fn describe<I>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut values = values.into_iter().flatten().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        let count = values.len();
        let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count > 1).map(|mean| {
            let ss = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
            (ss / (count - 1) as f64).sqrt()
        });
        Self {
            column: column.to_string(),
            count,
            mean,
            std,
            min: values.first().copied(),
            q25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values.last().copied(),
        }
    }

    /// The value of the statistic at position `index` of [STATISTICS]
    fn statistic(&self, index: usize) -> Option<f64> {
        match index {
            0 => Some(self.count as f64),
            1 => self.mean,
            2 => self.std,
            3 => self.min,
            4 => self.q25,
            5 => self.median,
            6 => self.q75,
            _ => self.max,
        }
    }
}

/// Quantile of already sorted values using linear interpolation between the two
/// closest ranks
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// One line of the summary table: a single statistic across all columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub statistic: &'static str,
    pub values: Vec<Option<f64>>,
}

/// Statistics for a set of numeric columns, laid out with one row per statistic
/// and one column per data column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    pub fn new(columns: Vec<ColumnSummary>) -> Self {
        let rows = STATISTICS
            .into_iter()
            .enumerate()
            .map(|(i, statistic)| SummaryRow {
                statistic,
                values: columns.iter().map(|c| c.statistic(i)).collect(),
            })
            .collect();
        Self {
            columns: columns.into_iter().map(|c| c.column).collect(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_describe() {
        let s = ColumnSummary::describe(
            "elevation",
            [Some(4.0), None, Some(1.0), Some(3.0), Some(2.0)],
        );
        assert_eq!(s.count, 4);
        assert!(close(s.mean, 2.5));
        assert!(close(s.std, (5.0f64 / 3.0).sqrt()));
        assert!(close(s.min, 1.0));
        assert!(close(s.q25, 1.75));
        assert!(close(s.median, 2.5));
        assert!(close(s.q75, 3.25));
        assert!(close(s.max, 4.0));
    }

    #[test]
    fn test_describe_single_value() {
        let s = ColumnSummary::describe("latitude", [Some(44.5)]);
        assert_eq!(s.count, 1);
        assert!(close(s.mean, 44.5));
        assert_eq!(s.std, None);
        assert!(close(s.q25, 44.5));
        assert!(close(s.max, 44.5));
    }

    #[test]
    fn test_describe_no_values() {
        let s = ColumnSummary::describe("longitude", [None, None]);
        assert_eq!(s.count, 0);
        assert_eq!(s.mean, None);
        assert_eq!(s.std, None);
        assert_eq!(s.min, None);
        assert_eq!(s.median, None);
        assert_eq!(s.max, None);
    }

    #[test]
    fn test_summary_layout() {
        let summary = Summary::new(vec![
            ColumnSummary::describe("a", [Some(1.0), Some(3.0)]),
            ColumnSummary::describe("b", [None]),
        ]);
        assert_eq!(summary.columns, vec!["a", "b"]);
        assert_eq!(summary.rows.len(), STATISTICS.len());
        assert_eq!(summary.rows[0].statistic, "count");
        assert_eq!(summary.rows[0].values, vec![Some(2.0), Some(0.0)]);
        assert_eq!(summary.rows[1].values, vec![Some(2.0), None]);
        assert_eq!(summary.rows[7].statistic, "max");
        assert_eq!(summary.rows[7].values, vec![Some(3.0), None]);
    }
}
