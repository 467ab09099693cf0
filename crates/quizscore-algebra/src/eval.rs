//! Numeric evaluation of expressions without variable bindings.

use crate::expr::Expr;
use crate::functions::{constant, FunctionTable};

/// Evaluate an expression to a finite number.
///
/// Returns `None` when the expression contains a free variable, an unknown
/// function, or evaluates to something non-finite (division by zero, `sqrt(-1)`).
pub fn evaluate(expr: &Expr, functions: &FunctionTable) -> Option<f64> {
    let value = eval_inner(expr, functions)?;
    value.is_finite().then_some(value)
}

fn eval_inner(expr: &Expr, functions: &FunctionTable) -> Option<f64> {
    match expr {
        Expr::Num(v) => Some(*v),
        Expr::Sym(name) => constant(name),
        Expr::Add(terms) => terms
            .iter()
            .map(|t| eval_inner(t, functions))
            .sum::<Option<f64>>(),
        Expr::Mul(factors) => factors
            .iter()
            .map(|f| eval_inner(f, functions))
            .product::<Option<f64>>(),
        Expr::Pow(base, exp) => {
            let b = eval_inner(base, functions)?;
            let e = eval_inner(exp, functions)?;
            Some(if e.fract() == 0.0 && e.abs() <= i32::MAX as f64 {
                b.powi(e as i32)
            } else {
                b.powf(e)
            })
        }
        Expr::Func(name, args) => {
            let function = functions.get(name)?;
            let values = args
                .iter()
                .map(|a| eval_inner(a, functions))
                .collect::<Option<Vec<f64>>>()?;
            Some(function.apply(&values))
        }
    }
}

/// Parse a plain decimal number, the way a calculator field would accept it.
pub fn parse_plain_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    // `f64::from_str` also accepts "inf" and "NaN"; those are not answers.
    if trimmed.is_empty()
        || !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
