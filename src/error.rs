//! Error taxonomy for the expert system pipeline.

use std::io;
use thiserror::Error;

/// Errors produced anywhere in the parse → normalize → resolve pipeline.
#[derive(Error, Debug)]
pub enum ExpertError {
    /// Missing file argument, unknown flag, or otherwise malformed invocation.
    #[error("usage error: {0}")]
    Usage(String),

    /// The input file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A lowercase letter, unknown symbol, or malformed token in the source text.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// An operator was missing an operand, or a resolver invariant was violated.
    #[error("internal invariant violated: {0}")]
    Arity(String),

    /// The global truth table has no valid state: the rule base itself is
    /// contradictory, independent of any initial facts.
    #[error("No valid states for the given rules.")]
    ContradictoryRuleBase,

    /// The rule base is satisfiable but no valid state survives the given
    /// initial facts. Non-fatal in interactive mode.
    #[error("No valid states with the given initial facts.")]
    IncompatibleInitialFacts,
}

/// Convenience alias used throughout the crate.
pub type ExpertResult<T> = Result<T, ExpertError>;
