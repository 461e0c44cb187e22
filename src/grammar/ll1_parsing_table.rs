use std::collections::BTreeMap;

use log::debug;

use crate::error::TableConflict;

use super::{
    first_follow::{FirstSets, FollowSets},
    grammar::{production_body, Symbol},
    Grammar,
};

/// Predictive table: for each nonterminal, lookahead -> production index.
///
/// Holds its own copy of the production bodies so parsing needs nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LL1ParsingTable {
    pub(crate) start: usize,
    pub(crate) bodies: Vec<Vec<Vec<Symbol>>>,
    pub(crate) rows: Vec<BTreeMap<Symbol, usize>>,
}

impl LL1ParsingTable {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn get(&self, non_terminal: usize, lookahead: Symbol) -> Option<usize> {
        self.rows.get(non_terminal)?.get(&lookahead).copied()
    }

    pub fn row(&self, non_terminal: usize) -> &BTreeMap<Symbol, usize> {
        &self.rows[non_terminal]
    }

    /// The ε-free body of a production; empty for an ε production.
    pub fn body(&self, non_terminal: usize, production: usize) -> &[Symbol] {
        &self.bodies[non_terminal][production]
    }
}

impl Grammar {
    pub fn generate_ll1_parsing_table(
        &self,
        first: &FirstSets,
        follow: &FollowSets,
    ) -> Result<LL1ParsingTable, TableConflict> {
        let start = self.start_symbol.unwrap_or_default();
        let mut rows: Vec<BTreeMap<Symbol, usize>> =
            vec![BTreeMap::new(); self.non_terminals.len()];

        for nt in &self.non_terminals {
            let row = &mut rows[nt.index];
            for (p, production) in nt.productions.iter().enumerate() {
                let first_of_production = first.first_of_string(production);

                let mut columns: Vec<Symbol> = first_of_production
                    .iter()
                    .filter(|s| s.is_lookahead())
                    .copied()
                    .collect();
                if first_of_production.contains(&Symbol::Epsilon) {
                    columns.extend(follow.of_non_terminal(nt.index).iter().copied());
                }

                for terminal in columns {
                    match row.get(&terminal) {
                        Some(&existing) if existing != p => {
                            let conflict = TableConflict::Predictive {
                                non_terminal: nt.name.clone(),
                                terminal: self.get_symbol_name(terminal).to_string(),
                                existing: self.production_to_string(nt.index, existing),
                                incoming: self.production_to_string(nt.index, p),
                            };
                            debug!("{}", conflict);
                            return Err(conflict);
                        }
                        _ => {
                            row.insert(terminal, p);
                        }
                    }
                }
            }
        }

        let bodies = self
            .non_terminals
            .iter()
            .map(|nt| {
                nt.productions
                    .iter()
                    .map(|production| production_body(production).to_vec())
                    .collect()
            })
            .collect();

        debug!(
            "LL(1) table built: {} cells",
            rows.iter().map(|row| row.len()).sum::<usize>()
        );

        Ok(LL1ParsingTable {
            start,
            bodies,
            rows,
        })
    }
}
