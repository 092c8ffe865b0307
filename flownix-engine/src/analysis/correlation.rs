//! Pairwise Pearson correlation between numeric columns.
//!
//! Coefficients are computed over pairwise-complete rows (both cells present)
//! with a two-pass, mean-centred formula. Only pairs whose absolute
//! coefficient strictly exceeds [`CORRELATION_THRESHOLD`] are reported.

use serde::Serialize;
use tracing::debug;

use super::classifier::{Classification, ColumnClass};
use crate::table::{Column, Table};

/// Absolute coefficient a pair must exceed to be reported.
pub const CORRELATION_THRESHOLD: f64 = 0.7;

/// A strongly correlated pair of numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighCorrelation {
    /// Earlier of the two columns in table order
    pub column_a: String,
    pub column_b: String,
    pub coefficient: f64,
}

/// Pearson coefficient of `x` and `y`, which must have equal length.
///
/// Returns `None` for fewer than two observations, for a constant side, or
/// when the result is not finite.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Values of two columns on the rows where both are present.
fn complete_pairs(a: &Column, b: &Column) -> (Vec<f64>, Vec<f64>) {
    a.values()
        .iter()
        .zip(b.values())
        .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
        .unzip()
}

/// Finds every strongly correlated numeric pair, strongest first.
pub fn find_correlations(table: &Table, classification: &Classification) -> Vec<HighCorrelation> {
    let numeric: Vec<&Column> = classification
        .columns_of(ColumnClass::Numeric)
        .into_iter()
        .filter_map(|name| table.column(name))
        .collect();

    let mut found = Vec::new();
    for (i, a) in numeric.iter().enumerate() {
        for b in &numeric[i + 1..] {
            let (x, y) = complete_pairs(a, b);
            if let Some(r) = pearson(&x, &y) {
                if r.abs() > CORRELATION_THRESHOLD {
                    found.push(HighCorrelation {
                        column_a: a.name().to_string(),
                        column_b: b.name().to_string(),
                        coefficient: r,
                    });
                }
            }
        }
    }

    // stable: equal strengths keep pair order
    found.sort_by(|l, r| r.coefficient.abs().total_cmp(&l.coefficient.abs()));

    debug!(
        numeric_columns = numeric.len(),
        high_correlations = found.len(),
        "Computed correlations"
    );

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classifier::classify;

    fn correlations(columns: Vec<Column>) -> Vec<HighCorrelation> {
        let table = Table::try_new(columns).unwrap();
        find_correlations(&table, &classify(&table))
    }

    #[test]
    fn test_perfect_linear_relation() {
        let found = correlations(vec![
            Column::integers("x", [1, 2, 3, 4, 5].map(Some)),
            Column::integers("y", [2, 4, 6, 8, 10].map(Some)),
        ]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].column_a, "x");
        assert_eq!(found[0].column_b, "y");
        assert!((found[0].coefficient - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_inverse_relation() {
        let found = correlations(vec![
            Column::floats("up", [1.0, 2.0, 3.0, 4.0].map(Some)),
            Column::floats("down", [8.0, 6.0, 4.0, 2.0].map(Some)),
        ]);
        assert_eq!(found.len(), 1);
        assert!((found[0].coefficient + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_weak_relation_is_not_reported() {
        let found = correlations(vec![
            Column::integers("x", [1, 2, 3, 4, 5, 6].map(Some)),
            Column::integers("y", [3, 1, 4, 1, 5, 2].map(Some)),
        ]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_constant_column_is_excluded() {
        let found = correlations(vec![
            Column::integers("x", [1, 2, 3].map(Some)),
            Column::integers("k", [7, 7, 7].map(Some)),
        ]);
        assert!(found.is_empty());
        assert_eq!(pearson(&[1.0, 2.0], &[3.0, 3.0]), None);
    }

    #[test]
    fn test_pairwise_complete_rows() {
        // The outlier row is dropped because `y` is missing there
        let found = correlations(vec![
            Column::floats("x", [Some(1.0), Some(2.0), Some(100.0), Some(3.0)]),
            Column::floats("y", [Some(1.0), Some(2.0), None, Some(3.0)]),
        ]);
        assert_eq!(found.len(), 1);
        assert!((found[0].coefficient - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_joint_observations() {
        let found = correlations(vec![
            Column::floats("x", [Some(1.0), None, Some(3.0)]),
            Column::floats("y", [None, Some(2.0), Some(3.0)]),
        ]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_non_numeric_columns_are_ignored() {
        let found = correlations(vec![
            Column::integers("x", [1, 2, 3].map(Some)),
            Column::texts("label", ["a", "b", "c"].map(Some)),
            Column::booleans("flag", [true, false, true].map(Some)),
        ]);
        assert!(found.is_empty());
    }

    #[test]
    fn test_sorted_by_strength() {
        let found = correlations(vec![
            Column::floats("a", [1.0, 2.0, 3.0, 4.0, 5.0].map(Some)),
            Column::floats("b", [1.0, 2.0, 3.0, 5.0, 4.0].map(Some)),
            Column::floats("c", [2.0, 4.0, 6.0, 8.0, 10.0].map(Some)),
        ]);
        assert_eq!(found.len(), 3);
        assert_eq!((found[0].column_a.as_str(), found[0].column_b.as_str()), ("a", "c"));
        assert!(found
            .windows(2)
            .all(|w| w[0].coefficient.abs() >= w[1].coefficient.abs()));
    }
}
