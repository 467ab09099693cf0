//! Expression tree used by the algebra back end.
//!
//! Subtraction, negation and division have no node of their own: `a - b` is
//! `a + (-1)*b` and `a / b` is `a * b^(-1)`. Sums and products are n-ary so
//! that like terms and like factors sit side by side after flattening.

use std::collections::BTreeSet;
use std::fmt;

/// An algebraic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A numeric literal.
    Num(f64),
    /// A variable or named constant (`x`, `pi`).
    Sym(String),
    /// An n-ary sum.
    Add(Vec<Expr>),
    /// An n-ary product.
    Mul(Vec<Expr>),
    /// `base ^ exponent`.
    Pow(Box<Expr>, Box<Expr>),
    /// A call to a built-in function.
    Func(String, Vec<Expr>),
}

impl Expr {
    pub fn num(value: f64) -> Expr {
        Expr::Num(value)
    }

    pub fn sym(name: impl Into<String>) -> Expr {
        Expr::Sym(name.into())
    }

    pub fn pow(base: Expr, exponent: Expr) -> Expr {
        Expr::Pow(Box::new(base), Box::new(exponent))
    }

    pub fn neg(expr: Expr) -> Expr {
        Expr::Mul(vec![Expr::Num(-1.0), expr])
    }

    pub fn sub(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Add(vec![lhs, Expr::neg(rhs)])
    }

    pub fn div(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Mul(vec![lhs, Expr::pow(rhs, Expr::Num(-1.0))])
    }

    /// The numeric value, if this is a literal.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Expr::Num(v) => Some(*v),
            _ => None,
        }
    }

    /// The integer value, if this is an integral literal.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Expr::Num(v) if v.fract() == 0.0 && v.abs() < 1e15 => Some(*v as i64),
            _ => None,
        }
    }

    /// Whether this is the literal zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Num(v) if *v == 0.0)
    }

    /// All symbol names appearing in the expression.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Num(_) => {}
            Expr::Sym(name) => {
                out.insert(name.clone());
            }
            Expr::Add(items) | Expr::Mul(items) | Expr::Func(_, items) => {
                for item in items {
                    item.collect_symbols(out);
                }
            }
            Expr::Pow(base, exp) => {
                base.collect_symbols(out);
                exp.collect_symbols(out);
            }
        }
    }

    /// Binding strength used when deciding where parentheses are needed.
    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(items) if items.len() > 1 => 1,
            Expr::Num(v) if *v < 0.0 => 2,
            Expr::Mul(items) if starts_negative(items) => 2,
            Expr::Mul(items) if items.len() > 1 => 3,
            Expr::Pow(..) => 4,
            _ => 5,
        }
    }
}

fn starts_negative(factors: &[Expr]) -> bool {
    matches!(factors.first(), Some(Expr::Num(v)) if *v < 0.0)
}

/// Render a number without a trailing `.0` for integral values.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Also folds -0 into 0.
        "0".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn write_wrapped(f: &mut fmt::Formatter<'_>, expr: &Expr, min_precedence: u8) -> fmt::Result {
    if expr.precedence() < min_precedence {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Num(v) => write!(f, "{}", format_number(*v)),
            Expr::Sym(name) => write!(f, "{name}"),
            Expr::Add(terms) => {
                if terms.is_empty() {
                    return write!(f, "0");
                }
                for (i, term) in terms.iter().enumerate() {
                    let rendered = if term.precedence() < 2 && terms.len() > 1 {
                        format!("({term})")
                    } else {
                        term.to_string()
                    };
                    if i > 0 && !rendered.starts_with('-') {
                        write!(f, "+")?;
                    }
                    write!(f, "{rendered}")?;
                }
                Ok(())
            }
            Expr::Mul(factors) => {
                if factors.is_empty() {
                    return write!(f, "1");
                }
                let mut rest = factors.as_slice();
                if let [Expr::Num(c), tail @ ..] = factors.as_slice() {
                    if !tail.is_empty() {
                        if *c == -1.0 {
                            write!(f, "-")?;
                            rest = tail;
                        } else if *c == 1.0 {
                            rest = tail;
                        } else {
                            write!(f, "{}*", format_number(*c))?;
                            rest = tail;
                        }
                    }
                }
                for (i, factor) in rest.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    write_wrapped(f, factor, 4)?;
                }
                Ok(())
            }
            Expr::Pow(base, exp) => {
                write_wrapped(f, base, 5)?;
                write!(f, "^")?;
                write_wrapped(f, exp, 5)
            }
            Expr::Func(name, args) => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}
