//! Symbolic equivalence of two free-form expressions.
//!
//! [`SymbolicComparator::check`] layers cheap checks before the symbolic
//! ones and stops at the first success:
//!
//! 1. markup and superscript normalization of both sides
//! 2. case-insensitive text equality
//! 3. independent numeric evaluation, equal within tolerance
//! 4. parse both sides (retrying with full normalization); a side that still
//!    fails to parse makes the pair not equivalent
//! 5. the difference simplifies to zero, expands to zero, or evaluates to
//!    zero; or the expanded, collected, or expanded-then-collected forms of
//!    both sides render identically
//!
//! Without a back end, step 4 onwards is replaced by a comparison of the two
//! fully normalized strings.

use std::fmt;

use serde::Serialize;

use crate::engine::AlgebraEngine;
use crate::eval::parse_plain_number;
use crate::expr::Expr;
use crate::normalize::{normalize, normalize_markup};

/// The comparator step that accepted a pair of expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    ExactText,
    Numeric,
    SimplifiedDifference,
    ExpandedDifference,
    NumericDifference,
    ExpandedForms,
    CollectedForms,
    ExpandedCollectedForms,
    NormalizedText,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::ExactText => "exact-text",
            MatchStrategy::Numeric => "numeric",
            MatchStrategy::SimplifiedDifference => "simplified-difference",
            MatchStrategy::ExpandedDifference => "expanded-difference",
            MatchStrategy::NumericDifference => "numeric-difference",
            MatchStrategy::ExpandedForms => "expanded-forms",
            MatchStrategy::CollectedForms => "collected-forms",
            MatchStrategy::ExpandedCollectedForms => "expanded-collected-forms",
            MatchStrategy::NormalizedText => "normalized-text",
        }
    }
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides whether two expressions are equivalent.
///
/// Holds an optional borrowed back end; `None` is the degraded text-only mode.
#[derive(Debug, Clone, Copy)]
pub struct SymbolicComparator<'a> {
    engine: Option<&'a AlgebraEngine>,
}

impl<'a> SymbolicComparator<'a> {
    pub fn new(engine: Option<&'a AlgebraEngine>) -> Self {
        Self { engine }
    }

    /// True when no algebra back end is available.
    pub fn is_degraded(&self) -> bool {
        self.engine.is_none()
    }

    pub fn equivalent(&self, user: &str, correct: &str, tolerance: f64) -> bool {
        self.check(user, correct, tolerance).is_some()
    }

    /// Compare two expressions, returning the step that accepted them.
    pub fn check(&self, user: &str, correct: &str, tolerance: f64) -> Option<MatchStrategy> {
        let strategy = self.check_inner(user, correct, tolerance);
        match strategy {
            Some(s) => tracing::debug!(user, correct, strategy = %s, "expressions match"),
            None => tracing::debug!(user, correct, "expressions differ"),
        }
        strategy
    }

    fn check_inner(&self, user: &str, correct: &str, tolerance: f64) -> Option<MatchStrategy> {
        let user = normalize_markup(user);
        let correct = normalize_markup(correct);

        if user.to_lowercase() == correct.to_lowercase() {
            return Some(MatchStrategy::ExactText);
        }

        if let (Some(a), Some(b)) = (self.number(&user), self.number(&correct)) {
            if (a - b).abs() < tolerance {
                return Some(MatchStrategy::Numeric);
            }
        }

        let Some(engine) = self.engine else {
            let same = normalize(&user) == normalize(&correct);
            return same.then_some(MatchStrategy::NormalizedText);
        };

        let (lhs, rhs) = match (engine.parse_lenient(&user), engine.parse_lenient(&correct)) {
            (Ok(lhs), Ok(rhs)) => (lhs, rhs),
            (Err(e), _) | (_, Err(e)) => {
                tracing::debug!(user = %user, correct = %correct, "unparsable expression: {e}");
                return None;
            }
        };

        symbolic_match(engine, &lhs, &rhs, tolerance)
    }

    fn number(&self, input: &str) -> Option<f64> {
        match self.engine {
            Some(engine) => engine.evaluate_str(input),
            None => parse_plain_number(input),
        }
    }
}

fn renders_zero(expr: &Expr) -> bool {
    matches!(expr.to_string().as_str(), "0" | "+0" | "-0")
}

fn symbolic_match(
    engine: &AlgebraEngine,
    lhs: &Expr,
    rhs: &Expr,
    tolerance: f64,
) -> Option<MatchStrategy> {
    let difference = engine.simplify(&Expr::sub(lhs.clone(), rhs.clone()));
    if renders_zero(&difference) {
        return Some(MatchStrategy::SimplifiedDifference);
    }

    if engine.expand(&difference).is_some_and(|e| renders_zero(&e)) {
        return Some(MatchStrategy::ExpandedDifference);
    }

    if engine
        .evaluate(&difference)
        .is_some_and(|v| v.abs() < tolerance)
    {
        return Some(MatchStrategy::NumericDifference);
    }

    let expanded = engine.expand(lhs).zip(engine.expand(rhs));
    if let Some((l, r)) = &expanded {
        if l.to_string() == r.to_string() {
            return Some(MatchStrategy::ExpandedForms);
        }
    }

    let mut symbols = lhs.free_symbols();
    symbols.extend(rhs.free_symbols());
    let var = symbols.into_iter().next();
    let collected = |e: &Expr| match &var {
        Some(v) => engine.collect(e, v),
        None => engine.simplify(e),
    };

    if collected(lhs).to_string() == collected(rhs).to_string() {
        return Some(MatchStrategy::CollectedForms);
    }

    if let Some((l, r)) = &expanded {
        if collected(l).to_string() == collected(r).to_string() {
            return Some(MatchStrategy::ExpandedCollectedForms);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AlgebraConfig;

    fn engine() -> AlgebraEngine {
        AlgebraEngine::load(&AlgebraConfig::default()).unwrap()
    }

    fn check(user: &str, correct: &str) -> Option<MatchStrategy> {
        let engine = engine();
        SymbolicComparator::new(Some(&engine)).check(user, correct, 1e-4)
    }

    #[test]
    fn text_match_ignores_case() {
        assert_eq!(check("X+1", "x+1"), Some(MatchStrategy::ExactText));
    }

    #[test]
    fn numbers_compare_within_tolerance() {
        assert_eq!(check("5.0", "5"), Some(MatchStrategy::Numeric));
        assert_eq!(check("1/2", "0.5"), Some(MatchStrategy::Numeric));
        assert_eq!(check(r"\frac{1}{4}", "0.25"), Some(MatchStrategy::Numeric));
        assert_eq!(check("5.1", "5"), None);
    }

    #[test]
    fn like_factors_cancel_in_difference() {
        assert_eq!(check("y*y", "y^2"), Some(MatchStrategy::SimplifiedDifference));
        assert_eq!(check("x + x", "2x"), Some(MatchStrategy::SimplifiedDifference));
    }

    #[test]
    fn distributed_forms_need_expansion() {
        assert_eq!(check("2(x+1)", "2*x+2"), Some(MatchStrategy::ExpandedDifference));
        assert_eq!(check("(x+1)^2", "x^2+2x+1"), Some(MatchStrategy::ExpandedDifference));
        assert_eq!(check("(a-b)(a+b)", "a^2-b^2"), Some(MatchStrategy::ExpandedDifference));
    }

    #[test]
    fn markup_answers_are_compared_symbolically() {
        assert!(check(r"\frac{x}{2}", "x/2").is_some());
        assert!(check(r"2 \cdot x", "x+x").is_some());
        assert!(check("x²", "x*x").is_some());
    }

    #[test]
    fn non_equivalent_expressions_differ() {
        assert_eq!(check("2x+1", "2x+2"), None);
        assert_eq!(check("x^2", "x^3"), None);
        assert_eq!(check("x+y", "x-y"), None);
    }

    #[test]
    fn unparsable_side_is_never_equivalent() {
        assert_eq!(check("(x+", "x"), None);
        assert_eq!(check("x", "sin("), None);
        assert_eq!(check("", "0"), None);
    }

    #[test]
    fn deeply_nested_answer_is_not_equivalent() {
        let deep = format!("{}x{}", "(".repeat(1000), ")".repeat(1000));
        assert_eq!(check(&deep, "x"), None);
        let deep_markup = format!("{}x{}", r"\frac{1}{".repeat(1000), "}".repeat(1000));
        assert_eq!(check(&deep_markup, "x"), None);

        let nested = format!("{}x{}", "(".repeat(20), ")".repeat(20));
        assert!(check(&nested, "x").is_some());
    }

    #[test]
    fn degraded_mode_compares_normalized_text() {
        let comparator = SymbolicComparator::new(None);
        assert!(comparator.is_degraded());
        assert_eq!(
            comparator.check("2x + 1", "2*x+1", 1e-4),
            Some(MatchStrategy::NormalizedText)
        );
        assert_eq!(comparator.check("5.0", "5", 1e-4), Some(MatchStrategy::Numeric));
        // No algebra: distributed forms are not recognized.
        assert_eq!(comparator.check("2(x+1)", "2x+2", 1e-4), None);
    }

    #[test]
    fn equivalence_is_symmetric_on_samples() {
        let engine = engine();
        let comparator = SymbolicComparator::new(Some(&engine));
        let pairs = [("2(x+1)", "2x+2"), ("y*y", "y^2"), ("x/x", "1"), ("a*b", "b*a")];
        for (a, b) in pairs {
            assert!(comparator.equivalent(a, b, 1e-4), "{a} vs {b}");
            assert!(comparator.equivalent(b, a, 1e-4), "{b} vs {a}");
        }
    }

    #[test]
    fn strategy_names_are_kebab_case() {
        assert_eq!(MatchStrategy::ExpandedCollectedForms.to_string(), "expanded-collected-forms");
    }
}
