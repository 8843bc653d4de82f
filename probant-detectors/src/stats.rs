//! Contingency tables and the exact test for independence.
//!
//! Tables are built in a single pass over `(row, column)` label pairs;
//! category combinations that never occur keep an explicit zero cell.

use probant_core::ScanError;
use serde::{Deserialize, Serialize};
use statrs::function::factorial::ln_factorial;

/// Relative tolerance when comparing a candidate table's probability
/// against the observed one, in log space.
const LN_P_TOLERANCE: f64 = 1e-7;

/// A cross-tabulation of two categorical variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContingencyTable {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    /// Cross-tabulate `(row, column)` observations.
    ///
    /// Label order is fixed by first appearance, which keeps tables
    /// reproducible for a fixed observation order.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut row_labels: Vec<String> = Vec::new();
        let mut col_labels: Vec<String> = Vec::new();
        let mut observations: Vec<(usize, usize)> = Vec::new();
        for (row, col) in pairs {
            let r = intern(&mut row_labels, row);
            let c = intern(&mut col_labels, col);
            observations.push((r, c));
        }
        let mut counts = vec![vec![0u64; col_labels.len()]; row_labels.len()];
        for (r, c) in observations {
            counts[r][c] += 1;
        }
        Self {
            row_labels,
            col_labels,
            counts,
        }
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    /// Count matrix, `counts()[row][col]`.
    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    /// Cell count by label pair; zero for combinations never observed.
    pub fn count(&self, row: &str, col: &str) -> u64 {
        let r = self.row_labels.iter().position(|l| l == row);
        let c = self.col_labels.iter().position(|l| l == col);
        match (r, c) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn col_totals(&self) -> Vec<u64> {
        (0..self.col_labels.len())
            .map(|c| self.counts.iter().map(|row| row[c]).sum())
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

fn intern(labels: &mut Vec<String>, label: &str) -> usize {
    match labels.iter().position(|l| l == label) {
        Some(i) => i,
        None => {
            labels.push(label.to_string());
            labels.len() - 1
        }
    }
}

/// Result of an exact independence test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExactTestResult {
    /// Sample odds ratio for 2x2 tables; the observed-table probability
    /// for wider tables, where an odds ratio is undefined.
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Two-sided exact test for independence on a 2xk contingency table.
///
/// Fisher's exact test, generalized to any number of columns: every
/// table with the observed margins whose probability does not exceed the
/// observed table's contributes to the p-value. Degenerate shapes (fewer
/// than two rows or columns, a zero-sum margin) are errors.
pub fn fisher_exact(table: &ContingencyTable) -> Result<ExactTestResult, ScanError> {
    let counts = table.counts();
    if counts.len() != 2 {
        return Err(ScanError::statistics(format!(
            "exact test requires a 2xk table, got {} rows",
            counts.len()
        )));
    }
    let cols = table.col_labels().len();
    if cols < 2 {
        return Err(ScanError::statistics(format!(
            "exact test requires at least 2 columns, got {cols}"
        )));
    }
    let row_totals = table.row_totals();
    let col_totals = table.col_totals();
    if row_totals.iter().any(|&t| t == 0) || col_totals.iter().any(|&t| t == 0) {
        return Err(ScanError::statistics(
            "degenerate contingency table: zero-sum margin",
        ));
    }

    // With margins fixed, a table is determined by its first row, and
    // ln P(first row x) = ln_margin - sum_j [ln(x_j!) + ln((c_j - x_j)!)].
    let ln_margin = ln_factorial(row_totals[0]) + ln_factorial(row_totals[1])
        + col_totals.iter().map(|&c| ln_factorial(c)).sum::<f64>()
        - ln_factorial(table.total());
    let ln_observed = ln_margin - ln_cell_term(&counts[0], &col_totals);

    let mut p_value = 0.0;
    let mut first_row = vec![0u64; cols];
    accumulate_tables(
        0,
        row_totals[0],
        &col_totals,
        &mut first_row,
        ln_margin,
        ln_observed,
        &mut p_value,
    );

    let statistic = if cols == 2 {
        odds_ratio(counts)
    } else {
        ln_observed.exp()
    };

    Ok(ExactTestResult {
        statistic,
        p_value: p_value.min(1.0),
    })
}

fn ln_cell_term(first_row: &[u64], col_totals: &[u64]) -> f64 {
    first_row
        .iter()
        .zip(col_totals)
        .map(|(&x, &c)| ln_factorial(x) + ln_factorial(c - x))
        .sum()
}

/// Walk every first row consistent with the margins, accumulating the
/// probability of tables no more likely than the observed one.
fn accumulate_tables(
    col: usize,
    remaining: u64,
    col_totals: &[u64],
    first_row: &mut Vec<u64>,
    ln_margin: f64,
    ln_observed: f64,
    p_value: &mut f64,
) {
    if col == col_totals.len() {
        if remaining == 0 {
            let ln_p = ln_margin - ln_cell_term(first_row, col_totals);
            if ln_p <= ln_observed + LN_P_TOLERANCE {
                *p_value += ln_p.exp();
            }
        }
        return;
    }
    // The remaining columns must be able to absorb what is left.
    let tail_capacity: u64 = col_totals[col + 1..].iter().sum();
    let lo = remaining.saturating_sub(tail_capacity);
    let hi = remaining.min(col_totals[col]);
    for x in lo..=hi {
        first_row[col] = x;
        accumulate_tables(
            col + 1,
            remaining - x,
            col_totals,
            first_row,
            ln_margin,
            ln_observed,
            p_value,
        );
    }
    first_row[col] = 0;
}

fn odds_ratio(counts: &[Vec<u64>]) -> f64 {
    let numerator = (counts[0][0] * counts[1][1]) as f64;
    let denominator = (counts[0][1] * counts[1][0]) as f64;
    if denominator == 0.0 {
        if numerator == 0.0 {
            f64::NAN
        } else {
            f64::INFINITY
        }
    } else {
        numerator / denominator
    }
}
