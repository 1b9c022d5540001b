use crate::parse::{parse, RowOpError};
use num_rational::BigRational;
use num_traits::Zero;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// An elementary row operation.
///
/// Row indices are zero-based, even though the textual notation numbers rows
/// from 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowOp {
    /// Exchange two rows.
    Swap { first: usize, second: usize },
    /// Multiply a row by a nonzero factor.
    Scale { row: usize, factor: BigRational },
    /// Add `factor` times the `source` row into the `target` row.
    ScaleAdd {
        source: usize,
        target: usize,
        factor: BigRational,
    },
}

/// The three kinds of [`RowOp`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OpKind {
    Swap,
    Scale,
    ScaleAdd,
}

impl RowOp {
    /// Flatten the operation into `(kind, first_row, second_row, factor)`.
    ///
    /// A [`RowOp::Scale`] reports its row twice, and a [`RowOp::Swap`] has a
    /// factor of zero.
    pub fn into_parts(self) -> (OpKind, usize, usize, BigRational) {
        match self {
            RowOp::Swap { first, second } => {
                (OpKind::Swap, first, second, BigRational::zero())
            },
            RowOp::Scale { row, factor } => (OpKind::Scale, row, row, factor),
            RowOp::ScaleAdd {
                source,
                target,
                factor,
            } => (OpKind::ScaleAdd, source, target, factor),
        }
    }

    /// The largest row index this operation touches.
    pub fn max_row(&self) -> usize {
        match *self {
            RowOp::Swap { first, second } => first.max(second),
            RowOp::Scale { row, .. } => row,
            RowOp::ScaleAdd { source, target, .. } => source.max(target),
        }
    }
}

/// Writes the canonical notation, e.g. `R1*(-1/2)+R3=>R3`.
impl Display for RowOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RowOp::Swap { first, second } => {
                write!(f, "R{}<=>R{}", first + 1, second + 1)
            },
            RowOp::Scale { row, factor } => {
                write!(f, "R{}*({})=>R{}", row + 1, factor, row + 1)
            },
            RowOp::ScaleAdd {
                source,
                target,
                factor,
            } => write!(
                f,
                "R{}*({})+R{}=>R{}",
                source + 1,
                factor,
                target + 1,
                target + 1
            ),
        }
    }
}

impl FromStr for RowOp {
    type Err = RowOpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { parse(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(numerator: i64, denominator: i64) -> BigRational {
        BigRational::new(numerator.into(), denominator.into())
    }

    #[test]
    fn display() {
        let inputs = vec![
            (RowOp::Swap { first: 0, second: 1 }, "R1<=>R2"),
            (
                RowOp::Scale {
                    row: 1,
                    factor: ratio(3, 4),
                },
                "R2*(3/4)=>R2",
            ),
            (
                RowOp::Scale {
                    row: 0,
                    factor: ratio(-6, 3),
                },
                "R1*(-2)=>R1",
            ),
            (
                RowOp::ScaleAdd {
                    source: 0,
                    target: 2,
                    factor: ratio(-1, 2),
                },
                "R1*(-1/2)+R3=>R3",
            ),
            (
                RowOp::ScaleAdd {
                    source: 2,
                    target: 0,
                    factor: ratio(0, 1),
                },
                "R3*(0)+R1=>R1",
            ),
        ];

        for (op, should_be) in inputs {
            let got = op.to_string();
            assert_eq!(got, should_be);
        }
    }

    #[test]
    fn displayed_operations_parse_back() {
        let op = RowOp::ScaleAdd {
            source: 3,
            target: 1,
            factor: ratio(-7, 5),
        };

        let round_tripped: RowOp = op.to_string().parse().unwrap();

        assert_eq!(round_tripped, op);
    }

    #[test]
    fn parts() {
        let swap = RowOp::Swap { first: 0, second: 1 };
        let scale = RowOp::Scale {
            row: 1,
            factor: ratio(3, 4),
        };

        assert_eq!(
            swap.into_parts(),
            (OpKind::Swap, 0, 1, BigRational::zero())
        );
        assert_eq!(scale.into_parts(), (OpKind::Scale, 1, 1, ratio(3, 4)));
    }
}
