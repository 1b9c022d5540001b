use crate::{matrix::RationalMatrix, ops, row_op::RowOp};
use num_traits::Zero;
use std::{
    fmt::{self, Display, Formatter},
    slice,
};

/// Knobs for [`rref()`] and [`rref_in_place()`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RrefOptions {
    /// The number of trailing columns (e.g. the right-hand side of an
    /// augmented system) which may never hold a pivot.
    pub extra_columns: usize,
    /// Record every row operation performed.
    pub record: bool,
}

impl RrefOptions {
    pub fn new() -> Self { RrefOptions::default() }

    /// Treat the last `extra_columns` columns as augmentation.
    pub fn augmented(self, extra_columns: usize) -> Self {
        RrefOptions {
            extra_columns,
            ..self
        }
    }

    /// Ask for an [`OperationLog`].
    pub fn recording(self) -> Self {
        RrefOptions {
            record: true,
            ..self
        }
    }
}

/// The row operations performed during a reduction, in order.
///
/// Replaying them (e.g. with [`ops::applied_sequence()`] and
/// [`OperationLog::to_strings()`]) against the original matrix reproduces the
/// reduced matrix exactly.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationLog {
    ops: Vec<RowOp>,
}

impl OperationLog {
    pub fn len(&self) -> usize { self.ops.len() }

    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    pub fn iter(&self) -> slice::Iter<'_, RowOp> { self.ops.iter() }

    /// The textual notation for each operation, e.g. `R1*(1/2)=>R1`.
    pub fn to_strings(&self) -> Vec<String> {
        self.ops.iter().map(ToString::to_string).collect()
    }

    fn push(&mut self, op: RowOp) { self.ops.push(op); }
}

/// One operation per line.
impl Display for OperationLog {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            writeln!(f, "{}", op)?;
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a OperationLog {
    type IntoIter = slice::Iter<'a, RowOp>;
    type Item = &'a RowOp;

    fn into_iter(self) -> Self::IntoIter { self.ops.iter() }
}

impl IntoIterator for OperationLog {
    type IntoIter = std::vec::IntoIter<RowOp>;
    type Item = RowOp;

    fn into_iter(self) -> Self::IntoIter { self.ops.into_iter() }
}

/// Reduce a copy of the matrix to reduced row-echelon form.
///
/// See [`rref_in_place()`] for the details.
pub fn rref(
    matrix: &RationalMatrix,
    options: RrefOptions,
) -> (RationalMatrix, Option<OperationLog>) {
    let mut reduced = matrix.clone();
    let log = rref_in_place(&mut reduced, options);

    (reduced, log)
}

/// Reduce a matrix to reduced row-echelon form using Gauss-Jordan
/// elimination.
///
/// For each pivot row `i` (top to bottom) we look for the leftmost column,
/// after the previous pivot and outside the last
/// [`RrefOptions::extra_columns`], which has a nonzero entry in row `i` or
/// below. The first such row is swapped up into row `i` and scaled so the
/// pivot becomes 1. Every other row then has the pivot row added to it, scaled
/// by the negated entry in the pivot column, which clears the rest of that
/// column.
///
/// The elimination step runs for every other row even when its entry is
/// already zero, so the [`OperationLog`] reflects each step of the algorithm.
/// Likewise a pivot which is already 1 still gets scaled by 1.
///
/// Only nonzero entries are ever chosen as pivots, so the reciprocal is always
/// defined and this can't fail.
pub fn rref_in_place(
    matrix: &mut RationalMatrix,
    options: RrefOptions,
) -> Option<OperationLog> {
    let (rows, columns) = matrix.shape();
    let pivot_columns = columns.saturating_sub(options.extra_columns);
    let mut log = if options.record {
        Some(OperationLog::default())
    } else {
        None
    };
    let mut next_column = 0;

    for i in 0..rows {
        let (k, j) = match find_pivot(matrix, i, next_column..pivot_columns) {
            Some(pivot) => pivot,
            None => {
                log::debug!(
                    "No pivot left for row {} within the first {} columns",
                    i + 1,
                    pivot_columns
                );
                break;
            },
        };
        log::debug!("Pivot for row {} found at ({}, {})", i + 1, k + 1, j + 1);

        if k != i {
            step(matrix, RowOp::Swap { first: i, second: k }, &mut log);
        }

        let factor = matrix[(i, j)].recip();
        step(matrix, RowOp::Scale { row: i, factor }, &mut log);

        for k in (0..rows).filter(|&k| k != i) {
            let factor = -matrix[(k, j)].clone();
            let op = RowOp::ScaleAdd {
                source: i,
                target: k,
                factor,
            };
            step(matrix, op, &mut log);
        }

        next_column = j + 1;
    }

    log
}

/// Search the candidate columns left to right, returning the first
/// `(row, column)` at or below `first_row` holding a nonzero value.
fn find_pivot(
    matrix: &RationalMatrix,
    first_row: usize,
    candidate_columns: std::ops::Range<usize>,
) -> Option<(usize, usize)> {
    let rows = matrix.row_count();

    candidate_columns.into_iter().find_map(|column| {
        (first_row..rows)
            .find(|&row| !matrix[(row, column)].is_zero())
            .map(|row| (row, column))
    })
}

fn step(
    matrix: &mut RationalMatrix,
    op: RowOp,
    log: &mut Option<OperationLog>,
) {
    ops::apply(matrix, &op);

    if let Some(recorded) = log {
        log::trace!("Recorded {}", op);
        recorded.push(op);
    }
}

impl RationalMatrix {
    /// Get this matrix's reduced row-echelon form.
    pub fn reduced(&self) -> RationalMatrix {
        let (reduced, _) = rref(self, RrefOptions::new());
        reduced
    }
}
