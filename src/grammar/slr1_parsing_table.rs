use std::collections::BTreeMap;

use log::debug;

use crate::error::{ConflictKind, TableConflict};

use super::{
    first_follow::FollowSets,
    grammar::Symbol,
    lr0_fsm::LR0FSM,
};

/// A reduction by `head -> body`, with `len` the ε-free body length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reduction {
    pub head: usize,
    pub production: usize,
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Shift(usize),
    Reduce(Reduction),
    Accept,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SLR1ParsingTable {
    pub(crate) action: Vec<BTreeMap<Symbol, Action>>,
    pub(crate) goto: Vec<BTreeMap<usize, usize>>,
}

impl SLR1ParsingTable {
    pub fn state_count(&self) -> usize {
        self.action.len()
    }

    pub fn action(&self, state: usize, lookahead: Symbol) -> Option<Action> {
        self.action.get(state)?.get(&lookahead).copied()
    }

    pub fn goto(&self, state: usize, non_terminal: usize) -> Option<usize> {
        self.goto.get(state)?.get(&non_terminal).copied()
    }

    pub fn action_row(&self, state: usize) -> &BTreeMap<Symbol, Action> {
        &self.action[state]
    }

    pub fn goto_row(&self, state: usize) -> &BTreeMap<usize, usize> {
        &self.goto[state]
    }
}

impl LR0FSM {
    pub fn describe_action(&self, action: &Action) -> String {
        match action {
            Action::Shift(s) => format!("shift {}", s),
            Action::Reduce(r) => format!(
                "reduce {}",
                self.grammar.grammar.production_to_string(r.head, r.production)
            ),
            Action::Accept => "accept".to_string(),
        }
    }

    fn install(
        &self,
        row: &mut BTreeMap<Symbol, Action>,
        state: usize,
        terminal: Symbol,
        action: Action,
    ) -> Result<(), TableConflict> {
        match row.get(&terminal) {
            Some(existing) if *existing != action => {
                let kind = match (existing, &action) {
                    (Action::Shift(_), _) | (_, Action::Shift(_)) => ConflictKind::ShiftReduce,
                    _ => ConflictKind::ReduceReduce,
                };
                let conflict = TableConflict::Lr {
                    kind,
                    state,
                    terminal: self.grammar.grammar.get_symbol_name(terminal).to_string(),
                    existing: self.describe_action(existing),
                    incoming: self.describe_action(&action),
                };
                debug!("{}", conflict);
                Err(conflict)
            }
            _ => {
                row.insert(terminal, action);
                Ok(())
            }
        }
    }

    /// Fills ACTION and GOTO, reductions taking their lookaheads from FOLLOW.
    /// Any cell asked to hold two different actions aborts the whole table.
    pub fn to_slr1_parsing_table(
        &self,
        follow: &FollowSets,
    ) -> Result<SLR1ParsingTable, TableConflict> {
        let g = &self.grammar;
        let mut action: Vec<BTreeMap<Symbol, Action>> = vec![BTreeMap::new(); self.states.len()];
        let mut goto: Vec<BTreeMap<usize, usize>> = vec![BTreeMap::new(); self.states.len()];

        for (i, state) in self.states.iter().enumerate() {
            let row = &mut action[i];

            for item in state.items.iter().filter(|item| g.is_complete(item)) {
                if item.head == g.start {
                    self.install(row, i, Symbol::EndMark, Action::Accept)?;
                    continue;
                }
                let reduction = Action::Reduce(Reduction {
                    head: item.head,
                    production: item.production,
                    len: item.position,
                });
                for &terminal in follow.of_non_terminal(item.head) {
                    self.install(row, i, terminal, reduction)?;
                }
            }

            for item in &state.items {
                let Some(symbol @ Symbol::Terminal(_)) = g.next_symbol(item) else {
                    continue;
                };
                if let Some(j) = self.goto(i, symbol) {
                    self.install(row, i, symbol, Action::Shift(j))?;
                }
            }

            for (symbol, &j) in &state.edges {
                if let Symbol::NonTerminal(nt) = *symbol {
                    goto[i].insert(nt, j);
                }
            }
        }

        debug!("SLR(1) table built: {} states", action.len());

        Ok(SLR1ParsingTable { action, goto })
    }
}
