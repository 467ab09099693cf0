//! Built-in functions known to the algebra back end.

use std::collections::BTreeMap;

use crate::error::LoadError;

/// A named numeric function.
#[derive(Debug, Clone, Copy)]
pub struct Function {
    pub name: &'static str,
    pub arity: usize,
    apply: fn(&[f64]) -> f64,
}

impl Function {
    /// Apply the function. Callers check arity at parse time.
    pub fn apply(&self, args: &[f64]) -> f64 {
        if args.len() != self.arity {
            return f64::NAN;
        }
        (self.apply)(args)
    }
}

/// Every function the back end can provide.
pub const BUILTIN_FUNCTIONS: &[Function] = &[
    Function { name: "sin", arity: 1, apply: |a: &[f64]| a[0].sin() },
    Function { name: "cos", arity: 1, apply: |a: &[f64]| a[0].cos() },
    Function { name: "tan", arity: 1, apply: |a: &[f64]| a[0].tan() },
    Function { name: "asin", arity: 1, apply: |a: &[f64]| a[0].asin() },
    Function { name: "acos", arity: 1, apply: |a: &[f64]| a[0].acos() },
    Function { name: "atan", arity: 1, apply: |a: &[f64]| a[0].atan() },
    Function { name: "sinh", arity: 1, apply: |a: &[f64]| a[0].sinh() },
    Function { name: "cosh", arity: 1, apply: |a: &[f64]| a[0].cosh() },
    Function { name: "tanh", arity: 1, apply: |a: &[f64]| a[0].tanh() },
    Function { name: "sqrt", arity: 1, apply: |a: &[f64]| a[0].sqrt() },
    Function { name: "cbrt", arity: 1, apply: |a: &[f64]| a[0].cbrt() },
    Function { name: "abs", arity: 1, apply: |a: &[f64]| a[0].abs() },
    Function { name: "exp", arity: 1, apply: |a: &[f64]| a[0].exp() },
    Function { name: "ln", arity: 1, apply: |a: &[f64]| a[0].ln() },
    Function { name: "log", arity: 1, apply: |a: &[f64]| a[0].log10() },
    Function { name: "log2", arity: 1, apply: |a: &[f64]| a[0].log2() },
];

/// Named constants substituted during numeric evaluation.
pub const CONSTANTS: &[(&str, f64)] = &[("pi", std::f64::consts::PI), ("e", std::f64::consts::E)];

/// Look up a constant by name.
pub fn constant(name: &str) -> Option<f64> {
    CONSTANTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| *v)
}

/// The set of functions enabled for one engine instance.
#[derive(Debug, Clone)]
pub struct FunctionTable {
    by_name: BTreeMap<&'static str, Function>,
}

impl FunctionTable {
    /// All built-in functions.
    pub fn builtin() -> Self {
        Self {
            by_name: BUILTIN_FUNCTIONS.iter().map(|f| (f.name, *f)).collect(),
        }
    }

    /// Only the named functions. An empty list means all of them.
    pub fn restricted(names: &[String]) -> Result<Self, LoadError> {
        if names.is_empty() {
            return Ok(Self::builtin());
        }
        let mut by_name = BTreeMap::new();
        for name in names {
            let func = BUILTIN_FUNCTIONS
                .iter()
                .find(|f| f.name == name.trim().to_lowercase())
                .ok_or_else(|| LoadError::UnknownFunction(name.clone()))?;
            by_name.insert(func.name, *func);
        }
        Ok(Self { by_name })
    }

    pub fn get(&self, name: &str) -> Option<&Function> {
        self.by_name.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
