//! quizscore-algebra: Expression normalization and symbolic equivalence.
//!
//! This crate owns everything needed to decide whether a learner's math
//! answer matches a reference answer: rewriting raw (possibly LaTeX-flavoured)
//! input into a parsable form, a small algebra back end (parser, simplifier,
//! expander, numeric evaluator), and the layered comparator built on top.

pub mod compare;
pub mod engine;
pub mod error;
pub mod eval;
pub mod expr;
pub mod functions;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod simplify;

pub use compare::{MatchStrategy, SymbolicComparator};
pub use engine::{init_shared, shared, AlgebraConfig, AlgebraEngine};
pub use error::{LoadError, ParseError};
pub use expr::Expr;
pub use normalize::normalize;
