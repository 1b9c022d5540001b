//! A simplified dense matrix, containing just the operations and trait
//! implementations row reduction needs.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::Index,
};

/// A matrix of exact rationals.
pub type RationalMatrix = Matrix<BigRational>;

/// A general-purpose MxN matrix laid out row by row in memory.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Matrix<T> {
    cells: Box<[T]>,
    rows: usize,
    columns: usize,
}

impl<T> Matrix<T> {
    /// Build a matrix from rows which are already known to share a length.
    pub(crate) fn from_rows(rows: Vec<Vec<T>>, columns: usize) -> Self {
        let row_count = rows.len();
        let cells: Vec<T> = rows.into_iter().flatten().collect();
        debug_assert_eq!(cells.len(), row_count * columns);

        Matrix {
            cells: cells.into_boxed_slice(),
            rows: row_count,
            columns,
        }
    }

    pub fn row_count(&self) -> usize { self.rows }

    pub fn column_count(&self) -> usize { self.columns }

    /// The `(rows, columns)` pair.
    pub fn shape(&self) -> (usize, usize) { (self.rows, self.columns) }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        let rows = self.rows;
        let columns = self.columns;

        (0..rows)
            .map(move |row| row * columns..(row + 1) * columns)
            .map(move |range| &self.cells[range])
    }

    /// Get a row as a slice.
    ///
    /// # Panics
    ///
    /// If `row` is out of bounds.
    pub fn row(&self, row: usize) -> &[T] {
        assert!(row < self.rows, "Row index out of bounds");
        let start = row * self.columns;
        &self.cells[start..start + self.columns]
    }

    /// Get a row as a mutable slice.
    ///
    /// # Panics
    ///
    /// If `row` is out of bounds.
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        assert!(row < self.rows, "Row index out of bounds");
        let start = row * self.columns;
        &mut self.cells[start..start + self.columns]
    }

    /// Borrow one row immutably and a different row mutably at the same time.
    ///
    /// # Panics
    ///
    /// If either row is out of bounds or `source == target`.
    pub fn row_pair_mut(
        &mut self,
        source: usize,
        target: usize,
    ) -> (&[T], &mut [T]) {
        assert_ne!(source, target, "Rows must be distinct");
        assert!(source < self.rows, "Row index out of bounds");
        assert!(target < self.rows, "Row index out of bounds");

        let columns = self.columns;
        let (low, high) = self.cells.split_at_mut(source.max(target) * columns);
        let low = &mut low[source.min(target) * columns..][..columns];
        let high = &mut high[..columns];

        if source < target {
            (&*low, high)
        } else {
            (&*high, low)
        }
    }

    /// Exchange two rows.
    ///
    /// # Panics
    ///
    /// If either row is out of bounds.
    pub fn swap_rows(&mut self, first: usize, second: usize) {
        assert!(first < self.rows, "Row index out of bounds");
        assert!(second < self.rows, "Row index out of bounds");

        if first != second {
            let columns = self.columns;
            let (low, high) =
                self.cells.split_at_mut(first.max(second) * columns);
            low[first.min(second) * columns..][..columns]
                .swap_with_slice(&mut high[..columns]);
        }
    }

    fn offset(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    /// Apply a function to every cell, consuming the matrix.
    pub fn into_map<F, Q>(self, func: F) -> Matrix<Q>
    where
        F: FnMut(T) -> Q,
    {
        let Matrix {
            cells,
            rows,
            columns,
        } = self;

        Matrix {
            cells: cells.into_vec().into_iter().map(func).collect(),
            rows,
            columns,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        let columns = self.columns;

        self.cells
            .iter()
            .enumerate()
            .map(move |(i, value)| (i / columns, i % columns, value))
    }
}

impl Matrix<BigRational> {
    /// Convert an array of integers into a matrix of rationals.
    pub fn from_integers<I, const N: usize, const M: usize>(
        array: [[I; N]; M],
    ) -> Self
    where
        I: Into<BigInt>,
    {
        Matrix::from(array)
            .into_map(|value| BigRational::from_integer(value.into()))
    }

    /// Is every entry in this row exactly zero?
    pub fn is_zero_row(&self, row: usize) -> bool {
        self.row(row).iter().all(Zero::is_zero)
    }

    /// Check whether the matrix is in reduced row-echelon form: every nonzero
    /// row leads with a 1, leading entries move strictly right going down,
    /// pivot columns are zero everywhere else, and zero rows sit at the
    /// bottom.
    pub fn is_rref(&self) -> bool {
        let mut previous_pivot: Option<usize> = None;
        let mut seen_zero_row = false;

        for (i, row) in self.rows().enumerate() {
            let pivot = match row.iter().position(|x| !x.is_zero()) {
                Some(column) => column,
                None => {
                    seen_zero_row = true;
                    continue;
                },
            };

            if seen_zero_row || !row[pivot].is_one() {
                return false;
            }
            if previous_pivot.map_or(false, |previous| pivot <= previous) {
                return false;
            }

            let column_is_clear = (0..self.rows)
                .filter(|&r| r != i)
                .all(|r| self[(r, pivot)].is_zero());
            if !column_is_clear {
                return false;
            }

            previous_pivot = Some(pivot);
        }

        true
    }

    /// The number of nonzero rows in this matrix's reduced row-echelon form.
    pub fn rank(&self) -> usize {
        let reduced = self.reduced();
        (0..reduced.rows)
            .filter(|&row| !reduced.is_zero_row(row))
            .count()
    }
}

impl<T: Debug> Debug for Matrix<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rows()).finish()
    }
}

/// One bracketed row per line, with columns right-aligned.
impl<T: Display> Display for Matrix<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> =
            self.cells.iter().map(ToString::to_string).collect();
        let mut widths = vec![0; self.columns];

        for (i, text) in rendered.iter().enumerate() {
            let column = i % self.columns;
            widths[column] = widths[column].max(text.chars().count());
        }

        for row in 0..self.rows {
            if row > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;

            for column in 0..self.columns {
                if column > 0 {
                    write!(f, ", ")?;
                }
                let text = &rendered[self.offset(row, column)];
                write!(f, "{:>width$}", text, width = widths[column])?;
            }

            write!(f, "]")?;
        }

        Ok(())
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, column): (usize, usize)) -> &Self::Output {
        assert!(column < self.columns, "Column index out of bounds");
        assert!(row < self.rows, "Row index out of bounds");

        &self.cells[self.offset(row, column)]
    }
}

impl<T, const N: usize, const M: usize> From<[[T; N]; M]> for Matrix<T> {
    fn from(other: [[T; N]; M]) -> Self {
        let cells: Vec<T> = other.into_iter().flatten().collect();

        Matrix {
            cells: cells.into_boxed_slice(),
            rows: M,
            columns: N,
        }
    }
}

impl<T: PartialEq, const N: usize, const M: usize> PartialEq<[[T; N]; M]>
    for Matrix<T>
{
    fn eq(&self, other: &[[T; N]; M]) -> bool {
        self.rows == M
            && self.columns == N
            && self
                .cells()
                .all(|(row, column, value)| *value == other[row][column])
    }
}
