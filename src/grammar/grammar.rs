use std::collections::HashMap;

use crate::error::GrammarError;

use super::{END_MARK, EPSILON};

/// A grammar symbol, resolved once when the grammar is built.
///
/// Indices point into [`Grammar::terminals`] and [`Grammar::non_terminals`].
/// The derived ordering puts terminals first and `$` last, which is the
/// column order used by every table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(usize),
    NonTerminal(usize),
    Epsilon,
    EndMark,
}

impl Symbol {
    pub fn non_terminal(&self) -> Option<usize> {
        match self {
            Symbol::NonTerminal(i) => Some(*i),
            _ => None,
        }
    }

    /// Terminals and `$` are what a parser can see as lookahead.
    pub fn is_lookahead(&self) -> bool {
        matches!(self, Symbol::Terminal(_) | Symbol::EndMark)
    }
}

/// Strips the `[ε]` marker body down to the symbols a parser actually sees.
pub fn production_body(production: &[Symbol]) -> &[Symbol] {
    if production == [Symbol::Epsilon] {
        &[]
    } else {
        production
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    pub productions: Vec<Vec<Symbol>>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub(crate) terminals: Vec<String>,
    pub(crate) non_terminals: Vec<NonTerminal>,
    pub(crate) symbol_table: HashMap<String, Symbol>,
    pub(crate) start_symbol: Option<usize>,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar {
    pub fn new() -> Self {
        let mut symbol_table = HashMap::new();
        symbol_table.insert(EPSILON.to_string(), Symbol::Epsilon);
        symbol_table.insert(END_MARK.to_string(), Symbol::EndMark);

        Self {
            terminals: Vec::new(),
            non_terminals: Vec::new(),
            symbol_table,
            start_symbol: None,
        }
    }

    pub fn terminals(&self) -> &[String] {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &[NonTerminal] {
        &self.non_terminals
    }

    pub fn start_symbol(&self) -> Option<usize> {
        self.start_symbol
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.terminals.len()).map(Symbol::Terminal)
    }

    /// Every column a parsing table can have: the terminals, then `$`.
    pub fn lookahead_iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.terminal_iter().chain(std::iter::once(Symbol::EndMark))
    }

    pub fn get_symbol(&self, name: &str) -> Option<Symbol> {
        self.symbol_table.get(name).copied()
    }

    pub fn add_terminal(&mut self, name: &str) -> Result<Symbol, GrammarError> {
        match self.get_symbol(name) {
            Some(s @ Symbol::Terminal(_)) => Ok(s),
            Some(Symbol::NonTerminal(_)) => Err(GrammarError::DuplicateSymbol(name.to_string())),
            Some(_) => Err(GrammarError::ReservedSymbol(name.to_string())),
            None => {
                let s = Symbol::Terminal(self.terminals.len());
                self.terminals.push(name.to_string());
                self.symbol_table.insert(name.to_string(), s);
                Ok(s)
            }
        }
    }

    /// Declares a nonterminal. The first one declared becomes the start symbol.
    pub fn add_non_terminal(&mut self, name: &str) -> Result<usize, GrammarError> {
        match self.get_symbol(name) {
            Some(Symbol::NonTerminal(idx)) => Ok(idx),
            Some(Symbol::Terminal(_)) => Err(GrammarError::DuplicateSymbol(name.to_string())),
            Some(_) => Err(GrammarError::ReservedSymbol(name.to_string())),
            None => {
                let idx = self.non_terminals.len();
                self.non_terminals
                    .push(NonTerminal::new(idx, name.to_string()));
                self.symbol_table
                    .insert(name.to_string(), Symbol::NonTerminal(idx));
                if self.start_symbol.is_none() {
                    self.start_symbol = Some(idx);
                }
                Ok(idx)
            }
        }
    }

    /// Adds `left -> right`. ε inside a longer body is dropped, and an empty
    /// body is stored as `[ε]`.
    pub fn add_production(&mut self, left: usize, right: Vec<Symbol>) -> Result<(), GrammarError> {
        if left >= self.non_terminals.len() {
            return Err(GrammarError::UnknownSymbol(format!("#{}", left)));
        }
        for s in &right {
            match *s {
                Symbol::Terminal(i) if i >= self.terminals.len() => {
                    return Err(GrammarError::UnknownSymbol(format!("terminal #{}", i)))
                }
                Symbol::NonTerminal(i) if i >= self.non_terminals.len() => {
                    return Err(GrammarError::UnknownSymbol(format!("nonterminal #{}", i)))
                }
                Symbol::EndMark => return Err(GrammarError::ReservedSymbol(END_MARK.to_string())),
                _ => {}
            }
        }

        let mut right: Vec<Symbol> = right.into_iter().filter(|s| *s != Symbol::Epsilon).collect();
        if right.is_empty() {
            right.push(Symbol::Epsilon);
        }
        self.non_terminals[left].productions.push(right);
        Ok(())
    }

    /// Checks the invariants the analyses rely on.
    pub fn validate(&self) -> Result<(), GrammarError> {
        if self.non_terminals.is_empty() {
            return Err(GrammarError::EmptyGrammar);
        }
        match self.start_symbol {
            Some(idx) if idx < self.non_terminals.len() => {}
            _ => return Err(GrammarError::MissingStartSymbol),
        }
        if let Some(nt) = self.non_terminals.iter().find(|nt| nt.productions.is_empty()) {
            return Err(GrammarError::NoProductions(nt.name.clone()));
        }
        Ok(())
    }

    pub fn get_symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(i) => self.terminals[i].as_str(),
            Symbol::NonTerminal(i) => self.non_terminals[i].name.as_str(),
            Symbol::Epsilon => EPSILON,
            Symbol::EndMark => END_MARK,
        }
    }

    pub fn production_to_vec_str(&self, production: &[Symbol]) -> Vec<&str> {
        production
            .iter()
            .map(|s| self.get_symbol_name(*s))
            .collect()
    }

    pub fn production_to_string(&self, left: usize, production: usize) -> String {
        format!(
            "{} -> {}",
            self.non_terminals[left].name,
            self.production_to_vec_str(&self.non_terminals[left].productions[production])
                .join(" ")
        )
    }

    pub fn get_symbol_prime_name(&self, mut name: String) -> String {
        while self.symbol_table.contains_key(&name) {
            name.push('\'');
        }
        name
    }
}
