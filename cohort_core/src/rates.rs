//! Rate matrix construction.
//!
//! Converts the observed discrete annual transition counts into a
//! continuous-time transition-rate matrix, in three steps:
//! 1. row-normalize counts into a one-year transition probability matrix,
//! 2. convert to instantaneous rates and append the background-mortality
//!    column and the absorbing death-state rows,
//! 3. optionally apply the combination-therapy relative risk.
//!
//! All builders are pure and deterministic; a malformed input aborts the
//! whole cohort run at construction time.

use crate::{Error, HealthState, Result};

/// Validated continuous-time transition-rate matrix.
///
/// Square, `HealthState::COUNT` on a side. Entry `(i, j)` with `i != j` is
/// the instantaneous rate of moving from state `i` to state `j`; diagonal
/// entries are unused and held at zero. Rows for the two death states are
/// all zero; every other row has a strictly positive total, so no living
/// state is falsely absorbing.
#[derive(Clone, Debug, PartialEq)]
pub struct RateMatrix {
    rows: Vec<Vec<f64>>,
}

impl RateMatrix {
    /// Build a rate matrix from raw rows, checking the invariants above
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = HealthState::COUNT;
        if rows.len() != n {
            return Err(Error::Matrix(format!(
                "rate matrix must have {} rows, got {}",
                n,
                rows.len()
            )));
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(Error::Matrix(format!(
                    "rate matrix row {} must have {} columns, got {}",
                    i,
                    n,
                    row.len()
                )));
            }
            if row.iter().any(|&r| !(r >= 0.0) || !r.is_finite()) {
                return Err(Error::Matrix(format!(
                    "rate matrix row {} contains a negative or non-finite rate",
                    i
                )));
            }

            let state = HealthState::from_index(i)
                .expect("row index bounded by HealthState::COUNT");
            let total: f64 = row.iter().sum();
            if state.is_death() {
                if total != 0.0 {
                    return Err(Error::Matrix(format!(
                        "absorbing state {:?} has outgoing rates",
                        state
                    )));
                }
            } else if !(total > 0.0) {
                return Err(Error::Matrix(format!(
                    "living state {:?} has zero total outgoing rate",
                    state
                )));
            }
        }

        Ok(Self { rows })
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// Outgoing rates from state `i`
    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.rows[i][j]
    }

    /// Total outgoing rate from state `i` (zero for absorbing states)
    pub fn total_rate(&self, i: usize) -> f64 {
        self.rows[i].iter().sum()
    }
}

/// Normalize a transition-count matrix into a row-stochastic probability
/// matrix. Fails if any row sums to zero.
pub fn trans_prob_matrix(counts: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let mut probs = Vec::with_capacity(counts.len());

    for (i, row) in counts.iter().enumerate() {
        let total: f64 = row.iter().sum();
        if !(total > 0.0) {
            return Err(Error::Matrix(format!(
                "transition count row {} sums to zero; probabilities are undefined",
                i
            )));
        }
        probs.push(row.iter().map(|&c| c / total).collect());
    }

    Ok(probs)
}

/// Convert a one-year transition probability matrix into a continuous-time
/// rate matrix for the full state space.
///
/// For each living state `i` with staying probability `p_ii`, the total exit
/// rate over a unit step is `-ln(p_ii)`, split across destinations in
/// proportion to their one-step probabilities:
/// `rate[i][j] = -ln(p_ii) * p_ij / (1 - p_ii)`. A background-mortality
/// column of `-ln(1 - annual_mortality_prob)` is appended to every living
/// row, and two all-zero rows are appended for the absorbing death states.
pub fn trans_rate_matrix(
    probs: &[Vec<f64>],
    annual_mortality_prob: f64,
) -> Result<RateMatrix> {
    let n = HealthState::COUNT;
    if !(0.0..1.0).contains(&annual_mortality_prob) {
        return Err(Error::Matrix(format!(
            "annual background mortality probability must be in [0, 1), got {}",
            annual_mortality_prob
        )));
    }
    let mortality_rate = -(1.0 - annual_mortality_prob).ln();

    if probs.len() != n - 2 {
        return Err(Error::Matrix(format!(
            "probability matrix must have {} rows (one per living HIV state), got {}",
            n - 2,
            probs.len()
        )));
    }

    let mut rows = Vec::with_capacity(n);
    for (i, prob_row) in probs.iter().enumerate() {
        if prob_row.len() != n - 1 {
            return Err(Error::Matrix(format!(
                "probability matrix row {} must have {} columns, got {}",
                i,
                n - 1,
                prob_row.len()
            )));
        }
        let p_stay = prob_row[i];
        if !(p_stay > 0.0) {
            // A zero staying probability has no finite continuous-time analogue
            return Err(Error::Matrix(format!(
                "state {} has zero staying probability; exit rate is unbounded",
                i
            )));
        }

        let p_out = 1.0 - p_stay;
        let exit_rate = -p_stay.ln();

        let mut row: Vec<f64> = prob_row
            .iter()
            .enumerate()
            .map(|(j, &p)| {
                if j == i || p_out == 0.0 {
                    0.0
                } else {
                    exit_rate * p / p_out
                }
            })
            .collect();
        row.push(mortality_rate);
        rows.push(row);
    }

    // Absorbing rows for HIV death and natural death
    rows.push(vec![0.0; n]);
    rows.push(vec![0.0; n]);

    RateMatrix::from_rows(rows)
}

/// Build the combination-therapy rate matrix from the mono-therapy one.
///
/// Disease-progression rates (entries above the diagonal, excluding the
/// background-mortality column) are scaled by the relative risk; the
/// background-mortality column is carried over unscaled. This relies on the
/// forward-only ordering contract of `HealthState`: every HIV transition
/// moves to a strictly higher index, so progression is exactly the upper
/// triangle.
pub fn trans_rate_matrix_combo(mono: &RateMatrix, relative_risk: f64) -> Result<RateMatrix> {
    if !(relative_risk > 0.0 && relative_risk <= 1.0) {
        return Err(Error::Matrix(format!(
            "relative risk must be in (0, 1], got {}",
            relative_risk
        )));
    }

    let n = mono.size();
    let mortality_col = n - 1;
    let mut rows = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in (i + 1)..mortality_col {
            rows[i][j] = relative_risk * mono.get(i, j);
        }
        rows[i][mortality_col] = mono.get(i, mortality_col);
    }

    RateMatrix::from_rows(rows)
}
