//! Maximum-weight bipartite assignment (Hungarian algorithm).

use color_eyre::eyre::{eyre, Report, Result};

/// Returns the column assigned to each row so that the total weight is maximal.
///
/// Every row is matched to a distinct column while columns remain. When there are more rows than
/// columns, the extra rows are [`None`]. A matched pair may have zero weight, callers decide
/// which pairs to accept.
///
/// ## Examples
///
/// A greedy choice (row 0 takes column 0) would total 1.0, the best assignment totals 1.65.
///
/// ```rust
/// use metacoag::seed::matching::max_weight_assignment;
/// let weights = vec![vec![0.9, 0.8], vec![0.85, 0.1]];
/// assert_eq!(max_weight_assignment(&weights)?, [Some(1), Some(0)]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
///
/// More rows than columns.
///
/// ```rust
/// # use metacoag::seed::matching::max_weight_assignment;
/// let weights = vec![vec![0.2], vec![0.9], vec![0.5]];
/// assert_eq!(max_weight_assignment(&weights)?, [None, Some(0), None]);
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn max_weight_assignment(weights: &[Vec<f64>]) -> Result<Vec<Option<usize>>, Report> {
    let rows = weights.len();
    let Some(cols) = weights.first().map(|w| w.len()) else {
        return Ok(Vec::new());
    };
    if weights.iter().any(|w| w.len() != cols) {
        Err(eyre!("Assignment weights must be a rectangular matrix."))?;
    }
    if weights.iter().flatten().any(|w| !w.is_finite()) {
        Err(eyre!("Assignment weights must be finite."))?;
    }
    if cols == 0 {
        return Ok(vec![None; rows]);
    }

    if rows <= cols {
        return Ok(hungarian(weights).into_iter().map(Some).collect());
    }

    // solve with rows and columns swapped, so that every column is matched
    let transposed: Vec<Vec<f64>> = (0..cols).map(|j| weights.iter().map(|w| w[j]).collect()).collect();
    let mut assignment = vec![None; rows];
    hungarian(&transposed).into_iter().enumerate().for_each(|(j, i)| assignment[i] = Some(j));
    Ok(assignment)
}

/// Minimum-cost assignment on `max - weight`, requires at least one row and `rows <= cols`.
fn hungarian(weights: &[Vec<f64>]) -> Vec<usize> {
    let n = weights.len();
    let m = weights[0].len();
    let max = weights.iter().flatten().copied().fold(f64::MIN, f64::max);
    let cost = |i: usize, j: usize| max - weights[i][j];

    // potentials and matching are 1-indexed, column 0 is a virtual start
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; m + 1];
    let mut matched = vec![0; m + 1];
    let mut way = vec![0; m + 1];

    for i in 1..=n {
        matched[0] = i;
        let mut j0 = 0;
        let mut min_slack = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];
        loop {
            used[j0] = true;
            let i0 = matched[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;
            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let slack = cost(i0 - 1, j - 1) - u[i0] - v[j];
                if slack < min_slack[j] {
                    min_slack[j] = slack;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }
            for j in 0..=m {
                if used[j] {
                    u[matched[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }
            j0 = j1;
            if matched[j0] == 0 {
                break;
            }
        }
        // flip the augmenting path
        loop {
            let j1 = way[j0];
            matched[j0] = matched[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0; n];
    (1..=m).filter(|j| matched[*j] != 0).for_each(|j| assignment[matched[j] - 1] = j - 1);
    assignment
}
