//! The algebra back end and its process-wide holder.
//!
//! An [`AlgebraEngine`] is built once from an [`AlgebraConfig`]. Callers that
//! want a shared instance go through [`init_shared`], which loads the engine
//! at most once per process; concurrent first callers block on the same
//! initialization and all observe the same outcome. A failed load is stored
//! as `None`, and comparisons then run in text-only mode.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, ParseError};
use crate::eval::evaluate;
use crate::expr::Expr;
use crate::functions::FunctionTable;
use crate::normalize::{normalize, repair_operators};
use crate::parser::parse;
use crate::simplify;

static SHARED: OnceCell<Option<AlgebraEngine>> = OnceCell::new();

/// Configuration for the algebra back end.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgebraConfig {
    /// Whether the back end should be loaded at all.
    pub enabled: bool,
    /// Function names to enable. Empty means every built-in function.
    pub functions: Vec<String>,
    /// Upper bound on the number of terms produced by expansion.
    pub max_expansion_terms: usize,
}

impl Default for AlgebraConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            functions: Vec::new(),
            max_expansion_terms: 4096,
        }
    }
}

/// Parser, rewriter and evaluator for learner expressions.
#[derive(Debug, Clone)]
pub struct AlgebraEngine {
    functions: FunctionTable,
    max_expansion_terms: usize,
}

impl AlgebraEngine {
    /// Build an engine from configuration.
    pub fn load(config: &AlgebraConfig) -> Result<Self, LoadError> {
        if !config.enabled {
            return Err(LoadError::Disabled);
        }
        if config.max_expansion_terms == 0 {
            return Err(LoadError::InvalidExpansionLimit);
        }
        let functions = FunctionTable::restricted(&config.functions)?;
        Ok(Self {
            functions,
            max_expansion_terms: config.max_expansion_terms,
        })
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Parse an expression exactly as written.
    pub fn parse(&self, input: &str) -> Result<Expr, ParseError> {
        parse(input, &self.functions)
    }

    /// Parse as written, falling back to the fully normalized form.
    pub fn parse_lenient(&self, input: &str) -> Result<Expr, ParseError> {
        match self.parse(input) {
            Ok(expr) => Ok(expr),
            Err(first) => {
                let normalized = self.normalize(input);
                self.parse(&normalized).map_err(|_| first)
            }
        }
    }

    /// Normalize and check the result parses, repairing doubled operators once
    /// if it does not. Returns the best-effort string either way.
    pub fn normalize(&self, raw: &str) -> String {
        let normalized = normalize(raw);
        if self.parse(&normalized).is_ok() {
            return normalized;
        }
        let repaired = repair_operators(&normalized);
        if repaired != normalized && self.parse(&repaired).is_ok() {
            tracing::debug!(raw, repaired = %repaired, "repaired doubled operators");
            return repaired;
        }
        normalized
    }

    pub fn simplify(&self, expr: &Expr) -> Expr {
        simplify::simplify(expr, &self.functions)
    }

    /// Fully expand, or `None` if the expansion is too large.
    pub fn expand(&self, expr: &Expr) -> Option<Expr> {
        simplify::expand(expr, &self.functions, self.max_expansion_terms)
    }

    pub fn collect(&self, expr: &Expr, var: &str) -> Expr {
        simplify::collect(expr, var, &self.functions)
    }

    pub fn evaluate(&self, expr: &Expr) -> Option<f64> {
        evaluate(expr, &self.functions)
    }

    /// Parse leniently and evaluate; `None` on any failure.
    pub fn evaluate_str(&self, input: &str) -> Option<f64> {
        self.parse_lenient(input)
            .ok()
            .and_then(|expr| self.evaluate(&expr))
    }
}

/// Load the shared engine on first use and return it.
///
/// Only the first caller's configuration is used; later calls return the
/// stored outcome.
pub fn init_shared(config: &AlgebraConfig) -> Option<&'static AlgebraEngine> {
    SHARED
        .get_or_init(|| match AlgebraEngine::load(config) {
            Ok(engine) => {
                tracing::info!(
                    functions = engine.functions.len(),
                    "algebra back end loaded"
                );
                Some(engine)
            }
            Err(e) => {
                tracing::warn!("algebra back end unavailable, comparing normalized text only: {e}");
                None
            }
        })
        .as_ref()
}

/// The shared engine, loading it with default configuration if needed.
pub fn shared() -> Option<&'static AlgebraEngine> {
    init_shared(&AlgebraConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_fails_to_load() {
        let config = AlgebraConfig {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(AlgebraEngine::load(&config).unwrap_err(), LoadError::Disabled);
    }

    #[test]
    fn zero_expansion_limit_fails_to_load() {
        let config = AlgebraConfig {
            max_expansion_terms: 0,
            ..Default::default()
        };
        assert_eq!(
            AlgebraEngine::load(&config).unwrap_err(),
            LoadError::InvalidExpansionLimit
        );
    }

    #[test]
    fn restricted_functions_limit_parsing() {
        let config = AlgebraConfig {
            functions: vec!["sqrt".into()],
            ..Default::default()
        };
        let engine = AlgebraEngine::load(&config).unwrap();
        assert!(engine.parse("sqrt(x)").is_ok());
        assert!(engine.parse("sin(x)").is_err());
    }

    #[test]
    fn normalize_repairs_doubled_operators() {
        let engine = AlgebraEngine::load(&AlgebraConfig::default()).unwrap();
        assert_eq!(engine.normalize("x**2"), "x*2");
        assert_eq!(engine.normalize("2x"), "2*x");
        // Still broken after repair: the normalized text comes back as is.
        assert_eq!(engine.normalize("(x+"), "(x+");
    }

    #[test]
    fn parse_lenient_retries_with_normalization() {
        let engine = AlgebraEngine::load(&AlgebraConfig::default()).unwrap();
        assert!(engine.parse("2(x+1)").is_err());
        assert!(engine.parse_lenient("2(x+1)").is_ok());
        assert!(engine.parse_lenient("((").is_err());
    }

    #[test]
    fn evaluate_str_handles_fractions() {
        let engine = AlgebraEngine::load(&AlgebraConfig::default()).unwrap();
        assert_eq!(engine.evaluate_str("1/2"), Some(0.5));
        assert_eq!(engine.evaluate_str("x"), None);
    }

    #[test]
    fn shared_engine_is_loaded_once() {
        let first = shared().map(|e| e as *const AlgebraEngine);
        let second = init_shared(&AlgebraConfig {
            enabled: false,
            ..Default::default()
        })
        .map(|e| e as *const AlgebraEngine);
        assert_eq!(first, second);
    }

    #[test]
    fn concurrent_first_use_shares_one_engine() {
        let address = |engine: Option<&AlgebraEngine>| engine.map(|e| e as *const _ as usize);
        let pointers: Vec<Option<usize>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    scope.spawn(move || {
                        let config = AlgebraConfig {
                            enabled: i % 2 == 0,
                            ..Default::default()
                        };
                        address(init_shared(&config))
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(pointers.windows(2).all(|w| w[0] == w[1]), "{pointers:?}");
        assert_eq!(pointers[0], address(shared()));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: AlgebraConfig = toml::from_str("enabled = false").unwrap();
        assert!(!config.enabled);
        assert_eq!(config.max_expansion_terms, 4096);
        assert!(config.functions.is_empty());
    }
}
