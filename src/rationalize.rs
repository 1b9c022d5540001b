//! Turning floating point arrays into exact rational matrices.

use crate::{matrix::RationalMatrix, parse};
use nalgebra::{DMatrix, DVector};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{FromPrimitive, One, ToPrimitive, Zero};
use std::mem;

/// The relative error allowed between a float and its rational
/// approximation.
const TOLERANCE: f64 = 1e-15;

/// Give up on finding a "nice" fraction after this many continued fraction
/// terms.
const MAX_TERMS: usize = 64;

/// Decimals with at most this many significant digits are taken as written.
const WRITTEN_DIGITS: usize = f64::DIGITS as usize;

/// A (possibly nested) array of numbers, the input to [`rationalize()`].
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Scalar(f64),
    List(Vec<Array>),
}

impl Array {
    /// The length along each axis, outermost first.
    pub fn shape(&self) -> Result<Vec<usize>, RationalizeError> {
        match self {
            Array::Scalar(_) => Ok(Vec::new()),
            Array::List(items) => {
                let mut items = items.iter();

                let inner = match items.next() {
                    Some(first) => first.shape()?,
                    None => Vec::new(),
                };

                for item in items {
                    let found = item.shape()?;
                    if found != inner {
                        return Err(RationalizeError::Ragged {
                            expected: inner,
                            found,
                        });
                    }
                }

                let mut shape = vec![self.len()];
                shape.extend(inner);
                Ok(shape)
            },
        }
    }

    /// The number of axes.
    pub fn rank(&self) -> Result<usize, RationalizeError> {
        self.shape().map(|shape| shape.len())
    }

    fn len(&self) -> usize {
        match self {
            Array::Scalar(_) => 0,
            Array::List(items) => items.len(),
        }
    }

    fn values(&self) -> Vec<f64> {
        match self {
            Array::Scalar(value) => vec![*value],
            Array::List(items) => items.iter().flat_map(Array::values).collect(),
        }
    }
}

/// Convert an array of numbers into a matrix of exact rationals.
///
/// A 2-D array becomes a matrix with the same shape and a 1-D array becomes a
/// column vector. Each entry goes through [`nsimplify()`], so decimals like
/// `0.5` come out as `1/2` rather than their exact binary value.
pub fn rationalize<A>(array: A) -> Result<RationalMatrix, RationalizeError>
where
    A: Into<Array>,
{
    let array = array.into();
    let shape = array.shape()?;

    let (rows, columns) = match shape.as_slice() {
        [rows, columns] => (*rows, *columns),
        [rows] => (*rows, 1),
        _ => {
            return Err(RationalizeError::InvalidDimension { rank: shape.len() })
        },
    };

    let mut cells = array.values().into_iter().map(nsimplify);
    let rows = (0..rows)
        .map(|_| cells.by_ref().take(columns).collect::<Result<Vec<_>, _>>())
        .collect::<Result<Vec<Vec<BigRational>>, _>>()?;

    Ok(RationalMatrix::from_rows(rows, columns))
}

/// Find the simplest rational number which is (almost) equal to a float.
///
/// A float whose shortest decimal form is short enough to have been written
/// by hand comes back as exactly that decimal, so `0.5` is `1/2` and `7e-15`
/// is `7/10^15`. Anything longer (e.g. `1.0 / 3.0` or `0.1 + 0.2`) walks the
/// value's continued fraction expansion and stops at the first convergent
/// which matches to within a relative error of `1e-15`, giving `1/3` and
/// `3/10`.
pub fn nsimplify(value: f64) -> Result<BigRational, RationalizeError> {
    if !value.is_finite() {
        return Err(RationalizeError::NotFinite { value });
    }

    match written_decimal(value) {
        Some(decimal) => Ok(decimal),
        None => continued_fraction(value),
    }
}

/// The exact value of `value`'s shortest round-trip decimal representation,
/// provided it has at most [`WRITTEN_DIGITS`] significant digits.
fn written_decimal(value: f64) -> Option<BigRational> {
    let text = format!("{:e}", value.abs());
    let (mantissa, exponent) = text.split_once('e')?;
    let exponent: i32 = exponent.parse().ok()?;

    let digits = mantissa.chars().filter(char::is_ascii_digit).count();
    if digits > WRITTEN_DIGITS {
        return None;
    }

    let ten = BigRational::from_integer(BigInt::from(10_u32));
    let magnitude = if exponent >= 0 {
        num_traits::pow(ten, exponent.unsigned_abs() as usize)
    } else {
        num_traits::pow(ten, exponent.unsigned_abs() as usize).recip()
    };
    let decimal = parse::decimal(mantissa) * magnitude;

    if value < 0.0 {
        Some(-decimal)
    } else {
        Some(decimal)
    }
}

fn continued_fraction(value: f64) -> Result<BigRational, RationalizeError> {
    // convergents h/k, seeded with h_{-2}/k_{-2} = 0/1 and h_{-1}/k_{-1} = 1/0
    let (mut h_previous, mut h) = (BigInt::zero(), BigInt::one());
    let (mut k_previous, mut k) = (BigInt::one(), BigInt::zero());
    let mut remainder = value;

    for _ in 0..MAX_TERMS {
        let whole = remainder.floor();
        let term = BigInt::from_f64(whole)
            .ok_or(RationalizeError::NotFinite { value })?;

        let h_next = &term * &h + &h_previous;
        let k_next = &term * &k + &k_previous;
        h_previous = mem::replace(&mut h, h_next);
        k_previous = mem::replace(&mut k, k_next);

        let fraction = remainder - whole;
        if fraction == 0.0 || is_close(&h, &k, value) {
            return Ok(BigRational::new(h, k));
        }

        remainder = 1.0 / fraction;
    }

    log::debug!("No simple fraction for {}, using its exact value", value);
    BigRational::from_float(value).ok_or(RationalizeError::NotFinite { value })
}

fn is_close(numerator: &BigInt, denominator: &BigInt, value: f64) -> bool {
    match (numerator.to_f64(), denominator.to_f64()) {
        (Some(numerator), Some(denominator)) => {
            let approximation = numerator / denominator;
            approximation == value
                || approx::relative_eq!(
                    approximation,
                    value,
                    epsilon = f64::MIN_POSITIVE,
                    max_relative = TOLERANCE
                )
        },
        _ => false,
    }
}

/// Reasons an [`Array`] can't be turned into a matrix.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RationalizeError {
    #[error("input must be an array of dimension at most two, found {rank}")]
    InvalidDimension { rank: usize },
    #[error("ragged array, expected an item of shape {expected:?} but found {found:?}")]
    Ragged {
        expected: Vec<usize>,
        found: Vec<usize>,
    },
    #[error("{value} can't be represented as a fraction")]
    NotFinite { value: f64 },
}

macro_rules! scalar_impls {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Array {
                fn from(value: $ty) -> Array { Array::Scalar(value as f64) }
            }
        )*
    };
}

scalar_impls!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64);

impl<T: Into<Array>> From<Vec<T>> for Array {
    fn from(items: Vec<T>) -> Array {
        Array::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Array>, const N: usize> From<[T; N]> for Array {
    fn from(items: [T; N]) -> Array {
        Array::List(items.into_iter().map(Into::into).collect())
    }
}

impl<'a, T: Into<Array> + Clone> From<&'a [T]> for Array {
    fn from(items: &'a [T]) -> Array {
        Array::List(items.iter().cloned().map(Into::into).collect())
    }
}

impl From<DMatrix<f64>> for Array {
    fn from(matrix: DMatrix<f64>) -> Array {
        let rows = (0..matrix.nrows())
            .map(|row| {
                let row: Vec<f64> =
                    (0..matrix.ncols()).map(|col| matrix[(row, col)]).collect();
                Array::from(row)
            })
            .collect();

        Array::List(rows)
    }
}

impl From<DVector<f64>> for Array {
    fn from(vector: DVector<f64>) -> Array {
        Array::from(vector.iter().copied().collect::<Vec<f64>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(numerator: i64, denominator: i64) -> BigRational {
        BigRational::new(numerator.into(), denominator.into())
    }

    #[test]
    fn simplify_nice_decimals() {
        let inputs = vec![
            (0.0, ratio(0, 1)),
            (2.0, ratio(2, 1)),
            (-7.0, ratio(-7, 1)),
            (0.5, ratio(1, 2)),
            (0.1, ratio(1, 10)),
            (-0.75, ratio(-3, 4)),
            (3.14, ratio(157, 50)),
            (1.0 / 3.0, ratio(1, 3)),
            (-2.0 / 3.0, ratio(-2, 3)),
            (0.1 + 0.2, ratio(3, 10)),
            (0.3333333, ratio(3333333, 10000000)),
            (1e18, ratio(1_000_000_000_000_000_000, 1)),
            (0.33, ratio(33, 100)),
            (1.1e-7, ratio(11, 100_000_000)),
            (7e-15, ratio(7, 1_000_000_000_000_000)),
            (-7e-15, ratio(-7, 1_000_000_000_000_000)),
            (3e-17, ratio(3, 100_000_000_000_000_000)),
            (2.5e-16, ratio(1, 4_000_000_000_000_000)),
        ];

        for (value, should_be) in inputs {
            let got = nsimplify(value).unwrap();
            assert_eq!(got, should_be, "{}", value);
        }
    }

    #[test]
    fn huge_decimals_are_taken_as_written() {
        let avogadro =
            BigInt::from(602) * num_traits::pow(BigInt::from(10), 21);

        let got = nsimplify(6.02e23).unwrap();

        assert_eq!(got, BigRational::from_integer(avogadro));
    }

    #[test]
    fn long_decimals_still_find_the_simple_fraction() {
        let inputs = vec![
            (2.0 / 7.0, ratio(2, 7)),
            (1.0 / 7.0, ratio(1, 7)),
            (-1.0 / 3.0, ratio(-1, 3)),
        ];

        for (value, should_be) in inputs {
            let got = nsimplify(value).unwrap();
            assert_eq!(got, should_be, "{}", value);
        }
    }

    #[test]
    fn infinity_is_not_a_fraction() {
        assert_eq!(
            nsimplify(f64::INFINITY),
            Err(RationalizeError::NotFinite {
                value: f64::INFINITY
            })
        );
        assert!(nsimplify(f64::NAN).is_err());
    }

    #[test]
    fn two_dimensional_arrays_keep_their_shape() {
        let got = rationalize(vec![vec![0.5, 2.0, 1.0], vec![0.25, -1.0, 3.0]])
            .unwrap();

        assert_eq!(got.shape(), (2, 3));
        assert_eq!(got.row(0), &[ratio(1, 2), ratio(2, 1), ratio(1, 1)]);
        assert_eq!(got.row(1), &[ratio(1, 4), ratio(-1, 1), ratio(3, 1)]);
    }

    #[test]
    fn one_dimensional_arrays_become_column_vectors() {
        let got = rationalize([1.5, 2.0, 0.2]).unwrap();

        assert_eq!(got.shape(), (3, 1));
        assert_eq!(got[(2, 0)], ratio(1, 5));
    }

    #[test]
    fn integers_are_accepted() {
        let got = rationalize([[2, 4], [1, 1]]).unwrap();

        assert_eq!(got, RationalMatrix::from_integers([[2, 4], [1, 1]]));
    }

    #[test]
    fn nalgebra_matrices_are_accepted() {
        let matrix = DMatrix::from_row_slice(2, 2, &[0.5, 1.0, 2.0, 0.75]);

        let got = rationalize(matrix).unwrap();

        assert_eq!(got.row(0), &[ratio(1, 2), ratio(1, 1)]);
        assert_eq!(got.row(1), &[ratio(2, 1), ratio(3, 4)]);
    }

    #[test]
    fn nalgebra_vectors_are_accepted() {
        let vector = DVector::from_vec(vec![0.5, 0.25]);

        let got = rationalize(vector).unwrap();

        assert_eq!(got.shape(), (2, 1));
    }

    #[test]
    fn other_ranks_are_rejected() {
        let scalar = rationalize(3.0).unwrap_err();
        let cube = rationalize(vec![vec![vec![1.0]]]).unwrap_err();

        assert_eq!(scalar, RationalizeError::InvalidDimension { rank: 0 });
        assert_eq!(cube, RationalizeError::InvalidDimension { rank: 3 });
        assert_eq!(
            cube.to_string(),
            "input must be an array of dimension at most two, found 3"
        );
    }

    #[test]
    fn ragged_arrays_are_rejected() {
        let got = rationalize(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();

        assert_eq!(
            got,
            RationalizeError::Ragged {
                expected: vec![2],
                found: vec![1]
            }
        );
    }

    #[test]
    fn empty_arrays() {
        let empty: Vec<f64> = Vec::new();

        let got = rationalize(empty).unwrap();

        assert_eq!(got.shape(), (0, 1));
    }

    #[test]
    fn non_finite_entries_are_rejected() {
        let got = rationalize(vec![1.0, f64::NAN]);

        assert!(matches!(got, Err(RationalizeError::NotFinite { .. })));
    }
}
