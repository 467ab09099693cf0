//! Algebraic rewriting: simplification, expansion and term collection.
//!
//! All three produce expressions in a canonical order (terms and factors
//! sorted by their rendered form), so two results can be compared as strings.
//!
//! - [`simplify`] folds constants, flattens sums and products, merges like
//!   terms (`x + x = 2*x`) and like factors (`y*y = y^2`). It never
//!   distributes.
//! - [`expand`] distributes products over sums and integer powers of sums,
//!   then simplifies. It gives up once the term count exceeds a limit.
//! - [`collect`] groups the terms of a simplified sum by powers of one
//!   variable.

use crate::eval::evaluate;
use crate::expr::Expr;
use crate::functions::FunctionTable;

/// Coefficients smaller than this are treated as zero.
const ZERO_EPSILON: f64 = 1e-12;

/// Relative distance under which a float snaps to the nearest integer.
const INTEGER_SNAP: f64 = 1e-10;

/// Largest integer power of a sum that [`expand`] multiplies out.
const MAX_EXPANDED_POWER: i64 = 64;

/// Normalize float noise: tiny values become 0 and near-integers snap.
fn clean(value: f64) -> f64 {
    if value.abs() < ZERO_EPSILON {
        return 0.0;
    }
    let rounded = value.round();
    if (value - rounded).abs() <= INTEGER_SNAP * value.abs().max(1.0) {
        rounded
    } else {
        value
    }
}

/// Simplify an expression without distributing products over sums.
pub fn simplify(expr: &Expr, functions: &FunctionTable) -> Expr {
    match expr {
        Expr::Num(v) => Expr::Num(clean(*v)),
        Expr::Sym(_) => expr.clone(),
        Expr::Add(terms) => simplify_add(terms.iter().map(|t| simplify(t, functions)).collect()),
        Expr::Mul(factors) => {
            simplify_mul(factors.iter().map(|f| simplify(f, functions)).collect())
        }
        Expr::Pow(base, exp) => simplify_pow(simplify(base, functions), simplify(exp, functions)),
        Expr::Func(name, args) => {
            let args: Vec<Expr> = args.iter().map(|a| simplify(a, functions)).collect();
            let call = Expr::Func(name.clone(), args);
            if call.free_symbols().is_empty() {
                if let Some(value) = evaluate(&call, functions) {
                    return Expr::Num(clean(value));
                }
            }
            call
        }
    }
}

/// Split a term into its numeric coefficient and the remaining factor.
fn split_coefficient(term: Expr) -> (f64, Expr) {
    match term {
        Expr::Num(v) => (v, Expr::Num(1.0)),
        Expr::Mul(mut factors) => match factors.first() {
            Some(Expr::Num(c)) => {
                let c = *c;
                factors.remove(0);
                let rest = if factors.len() == 1 {
                    factors.remove(0)
                } else {
                    Expr::Mul(factors)
                };
                (c, rest)
            }
            _ => (1.0, Expr::Mul(factors)),
        },
        other => (1.0, other),
    }
}

/// Rebuild `coefficient * rest` in canonical shape.
fn with_coefficient(coefficient: f64, rest: Expr) -> Expr {
    if coefficient == 1.0 {
        return rest;
    }
    match rest {
        Expr::Mul(mut factors) => {
            factors.insert(0, Expr::Num(coefficient));
            Expr::Mul(factors)
        }
        other => Expr::Mul(vec![Expr::Num(coefficient), other]),
    }
}

fn simplify_add(terms: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(terms.len());
    for term in terms {
        match term {
            Expr::Add(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }

    let mut constant = 0.0;
    // (key, coefficient, rest), in first-seen order until sorted below.
    let mut like_terms: Vec<(String, f64, Expr)> = Vec::new();
    for term in flat {
        if let Expr::Num(v) = term {
            constant += v;
            continue;
        }
        let (coefficient, rest) = split_coefficient(term);
        let key = rest.to_string();
        match like_terms.iter_mut().find(|(k, _, _)| *k == key) {
            Some(entry) => entry.1 += coefficient,
            None => like_terms.push((key, coefficient, rest)),
        }
    }

    like_terms.sort_by(|a, b| a.0.cmp(&b.0));
    let mut out: Vec<Expr> = like_terms
        .into_iter()
        .filter_map(|(_, coefficient, rest)| {
            let coefficient = clean(coefficient);
            (coefficient != 0.0).then(|| with_coefficient(coefficient, rest))
        })
        .collect();

    let constant = clean(constant);
    if constant != 0.0 {
        out.push(Expr::Num(constant));
    }

    match out.len() {
        0 => Expr::Num(0.0),
        1 => out.remove(0),
        _ => Expr::Add(out),
    }
}

fn simplify_mul(factors: Vec<Expr>) -> Expr {
    let mut flat = Vec::with_capacity(factors.len());
    for factor in factors {
        match factor {
            Expr::Mul(inner) => flat.extend(inner),
            other => flat.push(other),
        }
    }

    let mut coefficient = 1.0;
    // (key, base, exponents)
    let mut groups: Vec<(String, Expr, Vec<Expr>)> = Vec::new();
    for factor in flat {
        let (base, exponent) = match factor {
            Expr::Num(v) => {
                coefficient *= v;
                continue;
            }
            Expr::Pow(base, exp) => (*base, *exp),
            other => (other, Expr::Num(1.0)),
        };
        let key = base.to_string();
        match groups.iter_mut().find(|(k, _, _)| *k == key) {
            Some(entry) => entry.2.push(exponent),
            None => groups.push((key, base, vec![exponent])),
        }
    }

    if clean(coefficient) == 0.0 {
        return Expr::Num(0.0);
    }

    let mut out = Vec::with_capacity(groups.len());
    let mut needs_resimplify = false;
    for (_, base, exponents) in groups {
        match simplify_pow(base, simplify_add(exponents)) {
            Expr::Num(v) => coefficient *= v,
            Expr::Mul(inner) => {
                needs_resimplify = true;
                out.extend(inner);
            }
            other => out.push(other),
        }
    }

    if needs_resimplify {
        out.push(Expr::Num(coefficient));
        return simplify_mul(out);
    }

    let coefficient = clean(coefficient);
    if coefficient == 0.0 {
        return Expr::Num(0.0);
    }
    out.sort_by_key(|f| f.to_string());
    match (coefficient == 1.0, out.len()) {
        (_, 0) => Expr::Num(coefficient),
        (true, 1) => out.remove(0),
        (true, _) => Expr::Mul(out),
        (false, _) => {
            out.insert(0, Expr::Num(coefficient));
            Expr::Mul(out)
        }
    }
}

fn simplify_pow(base: Expr, exponent: Expr) -> Expr {
    if let Some(e) = exponent.as_num() {
        if e == 0.0 {
            return Expr::Num(1.0);
        }
        if e == 1.0 {
            return base;
        }
    }

    match (&base, exponent.as_num()) {
        (Expr::Num(b), Some(e)) => {
            let value = if e.fract() == 0.0 && e.abs() <= i32::MAX as f64 {
                b.powi(e as i32)
            } else {
                b.powf(e)
            };
            if value.is_finite() {
                return Expr::Num(clean(value));
            }
        }
        (Expr::Num(b), None) if *b == 1.0 => return Expr::Num(1.0),
        _ => {}
    }

    if let Some(n) = exponent.as_integer() {
        match base {
            // (b^e)^n = b^(e*n) holds for integer n.
            Expr::Pow(inner_base, inner_exp) => {
                let merged = simplify_mul(vec![*inner_exp, Expr::Num(n as f64)]);
                return simplify_pow(*inner_base, merged);
            }
            Expr::Mul(factors) => {
                let powered = factors
                    .into_iter()
                    .map(|f| simplify_pow(f, Expr::Num(n as f64)))
                    .collect();
                return simplify_mul(powered);
            }
            other => return Expr::pow(other, exponent),
        }
    }

    Expr::pow(base, exponent)
}

/// Distribute products and integer powers over sums, then simplify.
///
/// Returns `None` when the expansion would exceed `max_terms` terms.
pub fn expand(expr: &Expr, functions: &FunctionTable, max_terms: usize) -> Option<Expr> {
    let simplified = simplify(expr, functions);
    let expanded = expand_inner(&simplified, max_terms)?;
    Some(simplify(&expanded, functions))
}

fn terms_of(expr: Expr) -> Vec<Expr> {
    match expr {
        Expr::Add(terms) => terms,
        other => vec![other],
    }
}

fn expand_inner(expr: &Expr, max_terms: usize) -> Option<Expr> {
    match expr {
        Expr::Num(_) | Expr::Sym(_) => Some(expr.clone()),
        Expr::Add(terms) => {
            let mut out = Vec::new();
            for term in terms {
                out.extend(terms_of(expand_inner(term, max_terms)?));
            }
            if out.len() > max_terms {
                return None;
            }
            Some(Expr::Add(out))
        }
        Expr::Mul(factors) => {
            let expanded = factors
                .iter()
                .map(|f| expand_inner(f, max_terms))
                .collect::<Option<Vec<_>>>()?;
            distribute(expanded, max_terms)
        }
        Expr::Pow(base, exp) => {
            let base = expand_inner(base, max_terms)?;
            match (exp.as_integer(), &base) {
                (Some(n), Expr::Add(terms))
                    if (2..=MAX_EXPANDED_POWER).contains(&n) && terms.len() > 1 =>
                {
                    distribute(vec![base.clone(); n as usize], max_terms)
                }
                _ => Some(Expr::Pow(Box::new(base), exp.clone())),
            }
        }
        Expr::Func(name, args) => {
            let args = args
                .iter()
                .map(|a| expand_inner(a, max_terms))
                .collect::<Option<Vec<_>>>()?;
            Some(Expr::Func(name.clone(), args))
        }
    }
}

/// Multiply out a list of already-expanded factors.
fn distribute(factors: Vec<Expr>, max_terms: usize) -> Option<Expr> {
    let mut products: Vec<Vec<Expr>> = vec![Vec::new()];
    for factor in factors {
        let terms = terms_of(factor);
        if products.len().saturating_mul(terms.len()) > max_terms {
            return None;
        }
        let mut next = Vec::with_capacity(products.len() * terms.len());
        for product in &products {
            for term in &terms {
                let mut p = product.clone();
                p.push(term.clone());
                next.push(p);
            }
        }
        products = next;
    }
    let terms: Vec<Expr> = products.into_iter().map(Expr::Mul).collect();
    Some(if terms.len() == 1 {
        terms.into_iter().next().unwrap_or(Expr::Num(0.0))
    } else {
        Expr::Add(terms)
    })
}

/// The exponent of `var` in a term, and the term with that factor removed.
fn split_power(term: Expr, var: &str) -> (f64, Expr) {
    let factors = match term {
        Expr::Mul(factors) => factors,
        other => vec![other],
    };
    let mut power = 0.0;
    let mut rest = Vec::with_capacity(factors.len());
    for factor in factors {
        match &factor {
            Expr::Sym(name) if name == var => power += 1.0,
            Expr::Pow(base, exp) => match (base.as_ref(), exp.as_num()) {
                (Expr::Sym(name), Some(e)) if name == var => power += e,
                _ => rest.push(factor),
            },
            _ => rest.push(factor),
        }
    }
    let rest = match rest.len() {
        0 => Expr::Num(1.0),
        1 => rest.remove(0),
        _ => Expr::Mul(rest),
    };
    (power, rest)
}

/// Group the terms of a sum by powers of `var`: `a*x + b*x` becomes `(a+b)*x`.
pub fn collect(expr: &Expr, var: &str, functions: &FunctionTable) -> Expr {
    let simplified = simplify(expr, functions);
    let Expr::Add(terms) = simplified else {
        return simplified;
    };

    let mut groups: Vec<(f64, Vec<Expr>)> = Vec::new();
    for term in terms {
        let (power, coefficient) = split_power(term, var);
        match groups.iter_mut().find(|(p, _)| *p == power) {
            Some(entry) => entry.1.push(coefficient),
            None => groups.push((power, vec![coefficient])),
        }
    }
    groups.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut out: Vec<Expr> = Vec::with_capacity(groups.len());
    for (power, coefficients) in groups {
        let coefficient = simplify_add(coefficients);
        if coefficient.is_zero() {
            continue;
        }
        let var_part = simplify_pow(Expr::sym(var), Expr::Num(power));
        out.push(match (coefficient, var_part) {
            (c, Expr::Num(v)) if v == 1.0 => c,
            (Expr::Num(c), v) => with_coefficient(c, v),
            (c, v) => Expr::Mul(vec![c, v]),
        });
    }

    match out.len() {
        0 => Expr::Num(0.0),
        1 => out.remove(0),
        _ => Expr::Add(out),
    }
}
