//! Applying [`RowOp`]s to a [`RationalMatrix`].
//!
//! Every operation comes in two flavours. The in-place version takes a
//! `&mut RationalMatrix` and hands the same matrix back, while the copying
//! version leaves its input alone and returns a modified clone.

use crate::{
    matrix::RationalMatrix,
    parse::{parse, RowOpError},
    row_op::{OpKind, RowOp},
};
use num_rational::BigRational;
use num_traits::One;

/// Apply a single row operation in place.
///
/// Row indices aren't checked beyond the usual slice bounds checks, so an
/// out-of-range row will panic.
pub fn apply<'m>(
    matrix: &'m mut RationalMatrix,
    op: &RowOp,
) -> &'m mut RationalMatrix {
    let (kind, first, second, factor) = op.clone().into_parts();
    execute(matrix, kind, first, second, &factor)
}

/// Perform one elementary row operation given in its flattened
/// `(kind, first, second, factor)` form (see [`RowOp::into_parts()`]).
///
/// - [`OpKind::Swap`] exchanges `first` and `second`, ignoring `factor`
/// - [`OpKind::Scale`] multiplies `first` by `factor`, ignoring `second`
/// - [`OpKind::ScaleAdd`] adds `factor` times `first` into `second`
///
/// A scale-add from a row into itself leaves that row multiplied by
/// `1 + factor`.
///
/// # Panics
///
/// If a row is out of bounds.
pub fn execute<'m>(
    matrix: &'m mut RationalMatrix,
    kind: OpKind,
    first: usize,
    second: usize,
    factor: &BigRational,
) -> &'m mut RationalMatrix {
    match kind {
        OpKind::Swap => matrix.swap_rows(first, second),
        OpKind::Scale => scale(matrix.row_mut(first), factor),
        OpKind::ScaleAdd if first == second => {
            scale(matrix.row_mut(first), &(BigRational::one() + factor));
        },
        OpKind::ScaleAdd => {
            let (source, target) = matrix.row_pair_mut(first, second);

            for (cell, addend) in target.iter_mut().zip(source) {
                *cell = &*cell + factor * addend;
            }
        },
    }

    matrix
}

fn scale(row: &mut [BigRational], factor: &BigRational) {
    for cell in row {
        *cell = &*cell * factor;
    }
}

/// Apply a single row operation to a copy of the matrix.
pub fn applied(matrix: &RationalMatrix, op: &RowOp) -> RationalMatrix {
    let mut copy = matrix.clone();
    apply(&mut copy, op);
    copy
}

/// Parse and apply a sequence of row operations in place.
///
/// Stops at the first operation which fails to parse or refers to a row the
/// matrix doesn't have. Operations applied before the failure stay applied.
pub fn apply_sequence<'m, I, S>(
    matrix: &'m mut RationalMatrix,
    ops: I,
) -> Result<&'m mut RationalMatrix, RowOpError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for text in ops {
        let text = text.as_ref();
        let op = parse(text)?;

        let rows = matrix.row_count();
        if op.max_row() >= rows {
            return Err(RowOpError::RowOutOfRange {
                text: text.to_string(),
                row: op.max_row() + 1,
                rows,
            });
        }

        log::trace!("Applying {}", op);
        apply(matrix, &op);
    }

    Ok(matrix)
}

/// Parse and apply a sequence of row operations to a copy of the matrix.
pub fn applied_sequence<I, S>(
    matrix: &RationalMatrix,
    ops: I,
) -> Result<RationalMatrix, RowOpError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut copy = matrix.clone();
    apply_sequence(&mut copy, ops)?;
    Ok(copy)
}
