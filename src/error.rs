use std::fmt;

use thiserror::Error;

/// A grammar that cannot be handed to the analyses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("grammar has no productions")]
    EmptyGrammar,
    #[error("start symbol is not set")]
    MissingStartSymbol,
    #[error("nonterminal `{0}` is used but never defined")]
    UndeclaredNonTerminal(String),
    #[error("nonterminal `{0}` has no productions")]
    NoProductions(String),
    #[error("`{0}` is reserved and cannot be declared")]
    ReservedSymbol(String),
    #[error("`{0}` is declared both as a terminal and a nonterminal")]
    DuplicateSymbol(String),
    #[error("symbol `{0}` does not belong to this grammar")]
    UnknownSymbol(String),
    #[error("input contains `{0}`, which is not a terminal of this grammar")]
    UnknownToken(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::ShiftReduce => write!(f, "shift-reduce"),
            ConflictKind::ReduceReduce => write!(f, "reduce-reduce"),
        }
    }
}

/// Two different moves competing for the same table cell.
///
/// Cells are rendered with symbol names so the error can be shown as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableConflict {
    #[error("not LL(1): M[{non_terminal}, {terminal}] gets both `{existing}` and `{incoming}`")]
    Predictive {
        non_terminal: String,
        terminal: String,
        existing: String,
        incoming: String,
    },
    #[error("not SLR(1): {kind} conflict in state {state} on `{terminal}`: `{existing}` vs `{incoming}`")]
    Lr {
        kind: ConflictKind,
        state: usize,
        terminal: String,
        existing: String,
        incoming: String,
    },
}
