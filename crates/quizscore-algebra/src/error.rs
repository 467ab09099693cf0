//! Algebra back-end error types.
//!
//! Neither error escapes a comparison: a [`ParseError`] makes the comparison
//! answer "not equivalent", and a [`LoadError`] switches the comparator to
//! its text-only fallback.

use thiserror::Error;

/// Errors produced while tokenizing or parsing an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The input was empty after trimming.
    #[error("empty expression")]
    Empty,

    /// A character the lexer does not recognise.
    #[error("unexpected character at byte {position}: {found:?}")]
    UnexpectedCharacter { position: usize, found: String },

    /// A token that does not fit the grammar at this point.
    #[error("unexpected token at byte {position}: {found:?}")]
    UnexpectedToken { position: usize, found: String },

    /// The input ended in the middle of an expression.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// An identifier was used as a function but is not one.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// A known function was called with the wrong number of arguments.
    #[error("function {name} expects {expected} argument(s), got {found}")]
    WrongArity {
        name: String,
        expected: usize,
        found: usize,
    },

    /// Parentheses, signs or exponents nested past the parser's limit.
    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Errors that prevent the algebra back end from being constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The back end was switched off by configuration.
    #[error("algebra back end disabled by configuration")]
    Disabled,

    /// The configuration asked for a function the back end does not provide.
    #[error("unknown function in algebra configuration: {0}")]
    UnknownFunction(String),

    /// The expansion term limit must be at least 1.
    #[error("max_expansion_terms must be at least 1")]
    InvalidExpansionLimit,
}
