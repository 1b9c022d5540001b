//! Typesetting a matrix as a system of linear equations.

use crate::matrix::RationalMatrix;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use smol_str::SmolStr;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

const GREEK_LETTERS: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta",
    "iota", "kappa", "lambda", "mu", "nu", "xi", "pi", "rho", "sigma", "tau",
    "upsilon", "phi", "chi", "psi", "omega", "Gamma", "Delta", "Theta",
    "Lambda", "Xi", "Pi", "Sigma", "Upsilon", "Phi", "Psi", "Omega",
];

/// The names of the unknowns in a system of equations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variables {
    names: Vec<SmolStr>,
}

impl Variables {
    /// Create a list of variables, making sure each name is an identifier.
    pub fn new<I, S>(names: I) -> Result<Self, TypesetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut variables = Vec::new();

        for name in names {
            let name = name.as_ref();
            if !is_identifier(name) {
                return Err(TypesetError::InvalidVariable {
                    name: SmolStr::new(name),
                });
            }
            variables.push(SmolStr::new(name));
        }

        Ok(Variables { names: variables })
    }

    /// The variables `x1, x2, ..., xn`.
    pub fn numbered(n: usize) -> Self {
        (1..=n).map(|i| SmolStr::new(format!("x{}", i))).collect()
    }

    pub fn len(&self) -> usize { self.names.len() }

    pub fn is_empty(&self) -> bool { self.names.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(SmolStr::as_str)
    }
}

/// Parse a comma and/or whitespace separated list of names, e.g. `"x, y z"`.
impl FromStr for Variables {
    type Err = TypesetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variables::new(
            s.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|name| !name.is_empty()),
        )
    }
}

impl FromIterator<SmolStr> for Variables {
    fn from_iter<T: IntoIterator<Item = SmolStr>>(iter: T) -> Self {
        Variables {
            names: Vec::from_iter(iter),
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        },
        _ => false,
    }
}

/// Render a matrix as an `alignat*` block with one equation per row.
///
/// The last column holds the right-hand side and every other column is the
/// coefficient of the corresponding variable. When no `variables` are given
/// they default to [`Variables::numbered()`].
pub fn render_equations(
    matrix: &RationalMatrix,
    variables: Option<&Variables>,
) -> Result<String, TypesetError> {
    let columns = matrix.column_count();
    let needed = columns.saturating_sub(1);

    let default_variables;
    let variables = match variables {
        Some(v) => v,
        None => {
            default_variables = Variables::numbered(columns);
            &default_variables
        },
    };

    if variables.len() < needed {
        return Err(TypesetError::NotEnoughVariables {
            needed,
            found: variables.len(),
        });
    }

    let symbols: Vec<String> = variables.iter().map(symbol).collect();

    Ok(System { matrix, symbols }.to_string())
}

struct System<'a> {
    matrix: &'a RationalMatrix,
    symbols: Vec<String>,
}

impl<'a> Display for System<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let columns = self.matrix.column_count();
        writeln!(f, "\\begin{{alignat*}}{{{}}}", 2 * columns + 1)?;

        for row in self.matrix.rows() {
            let mut leading = true;

            for (column, a) in row.iter().enumerate() {
                if column + 1 == columns {
                    if leading {
                        write!(f, "0")?;
                    }
                    write!(f, " &{{}}={{}}&{}", Constant(a))?;
                    break;
                }

                let symbol = &self.symbols[column];

                if a.is_zero() {
                    write!(f, "&{{}}{{}}&")?;
                } else if leading {
                    write!(f, "{}", Term(a, symbol))?;
                    leading = false;
                } else {
                    let sign = if a.is_negative() { '-' } else { '+' };
                    let term = Term(&a.abs(), symbol).to_string();
                    write!(f, " &{{}}{}{{}}& {}", sign, term)?;
                }
            }

            writeln!(f, "\\\\ ")?;
        }

        writeln!(f, "\\end{{alignat*}}")
    }
}

/// A coefficient times a variable, e.g. `- \frac{3 x_{1}}{4}`.
struct Term<'a>(&'a BigRational, &'a str);

impl<'a> Display for Term<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Term(coefficient, symbol) = *self;

        if coefficient.is_negative() {
            write!(f, "- ")?;
        }

        let numerator = coefficient.numer().abs();
        let denominator = coefficient.denom();

        match (numerator.is_one(), denominator.is_one()) {
            (true, true) => write!(f, "{}", symbol),
            (false, true) => write!(f, "{} {}", numerator, symbol),
            (true, false) => write!(f, "\\frac{{{}}}{{{}}}", symbol, denominator),
            (false, false) => write!(
                f,
                "\\frac{{{} {}}}{{{}}}",
                numerator, symbol, denominator
            ),
        }
    }
}

struct Constant<'a>(&'a BigRational);

impl<'a> Display for Constant<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let value = self.0;

        if value.is_integer() {
            return write!(f, "{}", value.numer());
        }

        if value.is_negative() {
            write!(f, "- ")?;
        }
        write!(f, "\\frac{{{}}}{{{}}}", value.numer().abs(), value.denom())
    }
}

/// The LaTeX for a variable name, e.g. `x1` becomes `x_{1}` and `alpha`
/// becomes `\alpha`.
fn symbol(name: &str) -> String {
    let (base, subscript) = match name.find('_') {
        Some(index) if index > 0 => (&name[..index], &name[index + 1..]),
        _ => {
            let base = name.trim_end_matches(|c: char| c.is_ascii_digit());
            if base.is_empty() {
                (name, "")
            } else {
                name.split_at(base.len())
            }
        },
    };

    let mut latex = String::new();
    if GREEK_LETTERS.contains(&base) {
        latex.push('\\');
    }
    latex.push_str(base);

    if !subscript.is_empty() {
        latex.push_str("_{");
        latex.push_str(&symbol(subscript));
        latex.push('}');
    }

    latex
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypesetError {
    #[error("{needed} variable names are needed but only {found} were given")]
    NotEnoughVariables { needed: usize, found: usize },
    #[error("\"{name}\" is not a valid variable name")]
    InvalidVariable { name: SmolStr },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_variable_lists() {
        let inputs = vec![
            ("x, y, z", vec!["x", "y", "z"]),
            ("x y z", vec!["x", "y", "z"]),
            ("a1,a2", vec!["a1", "a2"]),
            ("  alpha ,\tbeta  ", vec!["alpha", "beta"]),
            ("", vec![]),
        ];

        for (src, should_be) in inputs {
            let got: Variables = src.parse().unwrap();
            assert_eq!(got.iter().collect::<Vec<_>>(), should_be);
        }
    }

    #[test]
    fn names_must_be_identifiers() {
        let got = "x, 2y".parse::<Variables>().unwrap_err();

        assert_eq!(
            got,
            TypesetError::InvalidVariable {
                name: SmolStr::new("2y")
            }
        );
    }

    #[test]
    fn numbered_variables() {
        let got = Variables::numbered(3);

        assert_eq!(got.iter().collect::<Vec<_>>(), vec!["x1", "x2", "x3"]);
    }

    #[test]
    fn symbols() {
        let inputs = vec![
            ("x", "x"),
            ("x1", "x_{1}"),
            ("x12", "x_{12}"),
            ("a_b", "a_{b}"),
            ("alpha", "\\alpha"),
            ("theta2", "\\theta_{2}"),
            ("Omega", "\\Omega"),
            ("_", "_"),
            ("speed", "speed"),
        ];

        for (name, should_be) in inputs {
            let got = symbol(name);
            assert_eq!(got, should_be, "{}", name);
        }
    }

    #[test]
    fn terms() {
        let inputs = vec![
            ((1, 1), "x_{1}"),
            ((-1, 1), "- x_{1}"),
            ((2, 1), "2 x_{1}"),
            ((-2, 1), "- 2 x_{1}"),
            ((1, 2), "\\frac{x_{1}}{2}"),
            ((3, 4), "\\frac{3 x_{1}}{4}"),
            ((-3, 4), "- \\frac{3 x_{1}}{4}"),
        ];

        for ((numerator, denominator), should_be) in inputs {
            let coefficient =
                BigRational::new(numerator.into(), denominator.into());
            let got = Term(&coefficient, "x_{1}").to_string();
            assert_eq!(got, should_be);
        }
    }

    #[test]
    fn constants() {
        let inputs = vec![
            ((0, 1), "0"),
            ((3, 1), "3"),
            ((-3, 1), "-3"),
            ((1, 2), "\\frac{1}{2}"),
            ((-1, 2), "- \\frac{1}{2}"),
        ];

        for ((numerator, denominator), should_be) in inputs {
            let value = BigRational::new(numerator.into(), denominator.into());
            let got = Constant(&value).to_string();
            assert_eq!(got, should_be);
        }
    }

    #[test]
    fn render_a_system() {
        let matrix = RationalMatrix::from_integers([[1, 2, 3], [0, -1, 4]]);

        let got = render_equations(&matrix, None).unwrap();

        let should_be = "\\begin{alignat*}{7}\n\
                         x_{1} &{}+{}& 2 x_{2} &{}={}&3\\\\ \n\
                         &{}{}&- x_{2} &{}={}&4\\\\ \n\
                         \\end{alignat*}\n";
        assert_eq!(got, should_be);
    }

    #[test]
    fn negative_trailing_terms_get_a_minus_sign() {
        let matrix = RationalMatrix::from_integers([[2, -3, -1]]);
        let variables: Variables = "x y".parse().unwrap();

        let got = render_equations(&matrix, Some(&variables)).unwrap();

        assert_eq!(
            got,
            "\\begin{alignat*}{7}\n2 x &{}-{}& 3 y &{}={}&-1\\\\ \n\\end{alignat*}\n"
        );
    }

    #[test]
    fn zero_rows_have_a_zero_on_the_left() {
        let matrix = RationalMatrix::from_integers([[0, 0, 5]]);

        let got = render_equations(&matrix, None).unwrap();

        assert!(got.contains("&{}{}&&{}{}&0 &{}={}&5\\\\ \n"));
    }

    #[test]
    fn fractions_and_custom_names() {
        let matrix = RationalMatrix::from_rows(
            vec![vec![
                BigRational::new(1.into(), 2.into()),
                BigRational::new((-3).into(), 4.into()),
                BigRational::new((-1).into(), 3.into()),
            ]],
            3,
        );
        let variables: Variables = "alpha, beta_1".parse().unwrap();

        let got = render_equations(&matrix, Some(&variables)).unwrap();

        assert_eq!(
            got,
            "\\begin{alignat*}{7}\n\
             \\frac{\\alpha}{2} &{}-{}& \\frac{3 \\beta_{1}}{4} &{}={}&- \\frac{1}{3}\\\\ \n\
             \\end{alignat*}\n"
        );
    }

    #[test]
    fn too_few_variables() {
        let matrix = RationalMatrix::from_integers([[1, 2, 3, 4]]);
        let variables: Variables = "x, y".parse().unwrap();

        let got = render_equations(&matrix, Some(&variables)).unwrap_err();

        assert_eq!(got, TypesetError::NotEnoughVariables { needed: 3, found: 2 });
    }

    #[test]
    fn extra_variables_are_ignored() {
        let matrix = RationalMatrix::from_integers([[1, 2]]);
        let variables: Variables = "a, b, c".parse().unwrap();

        let got = render_equations(&matrix, Some(&variables)).unwrap();

        assert!(got.contains("a &{}={}&2"));
    }
}
