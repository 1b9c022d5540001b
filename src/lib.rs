//! Exact rational row reduction for teaching linear algebra.
//!
//! Matrices are made of [`BigRational`](num_rational::BigRational)s, usually
//! created with [`rationalize()`]. Row operations are written in a small
//! notation like `R1*(-1/2)+R3=>R3` and can be applied one at a time (see the
//! [`ops`] module) or found automatically by [`rref()`], which optionally
//! records the operations it used. Finally, [`render_equations()`] typesets a
//! matrix as a system of linear equations.
//!
//! ```rust
//! use rowops::{ops, rref, RationalMatrix, RrefOptions};
//!
//! let matrix = RationalMatrix::from_integers([[2, 4], [1, 1]]);
//!
//! let (reduced, log) = rref(&matrix, RrefOptions::new().recording());
//! let log = log.unwrap();
//!
//! assert_eq!(reduced, RationalMatrix::from_integers([[1, 0], [0, 1]]));
//! assert_eq!(ops::applied_sequence(&matrix, log.to_strings()).unwrap(), reduced);
//! ```

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod equations;
mod matrix;
pub mod ops;
mod parse;
mod rationalize;
mod row_op;
mod rref;

pub use equations::{render_equations, TypesetError, Variables};
pub use matrix::{Matrix, RationalMatrix};
pub use parse::{parse, RowOpError, RowRole, SyntaxError, TokenKind};
pub use rationalize::{nsimplify, rationalize, Array, RationalizeError};
pub use row_op::{OpKind, RowOp};
pub use rref::{rref, rref_in_place, OperationLog, RrefOptions};
