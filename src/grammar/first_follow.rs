use std::collections::BTreeSet;

use log::debug;

use super::{grammar::Symbol, Grammar};

/// FIRST of every nonterminal. ε is a member when the nonterminal is nullable.
///
/// Terminals, `$` and ε are not stored: their FIRST set is the symbol itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets {
    non_terminals: Vec<BTreeSet<Symbol>>,
}

impl FirstSets {
    pub fn first(&self, symbol: Symbol) -> BTreeSet<Symbol> {
        match symbol {
            Symbol::NonTerminal(i) => self.non_terminals[i].clone(),
            other => BTreeSet::from([other]),
        }
    }

    pub fn of_non_terminal(&self, idx: usize) -> &BTreeSet<Symbol> {
        &self.non_terminals[idx]
    }

    pub fn is_nullable(&self, idx: usize) -> bool {
        self.non_terminals[idx].contains(&Symbol::Epsilon)
    }

    /// FIRST of a sentential form, ε included when every symbol is nullable.
    /// An empty sequence (or `[ε]`) yields `{ε}`.
    pub fn first_of_string(&self, symbols: &[Symbol]) -> BTreeSet<Symbol> {
        let mut first = BTreeSet::new();
        for symbol in symbols {
            match *symbol {
                Symbol::Epsilon => continue,
                Symbol::NonTerminal(i) => {
                    let set = &self.non_terminals[i];
                    first.extend(set.iter().filter(|s| **s != Symbol::Epsilon).copied());
                    if !set.contains(&Symbol::Epsilon) {
                        return first;
                    }
                }
                terminal => {
                    first.insert(terminal);
                    return first;
                }
            }
        }
        first.insert(Symbol::Epsilon);
        first
    }
}

/// FOLLOW of every nonterminal, over terminals and `$`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets {
    non_terminals: Vec<BTreeSet<Symbol>>,
}

impl FollowSets {
    pub fn of_non_terminal(&self, idx: usize) -> &BTreeSet<Symbol> {
        &self.non_terminals[idx]
    }
}

impl Grammar {
    pub fn compute_first(&self) -> FirstSets {
        let mut first = FirstSets {
            non_terminals: vec![BTreeSet::new(); self.non_terminals.len()],
        };

        let mut passes = 1;
        while self.first_pass(&mut first) {
            passes += 1;
        }
        debug!("FIRST converged after {} passes", passes);

        first
    }

    /// One full pass over every production. Returns whether any set grew.
    pub(crate) fn first_pass(&self, first: &mut FirstSets) -> bool {
        let mut changed = false;
        for nt in &self.non_terminals {
            for production in &nt.productions {
                let addition = first.first_of_string(production);
                let set = &mut first.non_terminals[nt.index];
                for s in addition {
                    changed |= set.insert(s);
                }
            }
        }
        changed
    }

    pub fn compute_follow(&self, first: &FirstSets) -> FollowSets {
        let mut follow = FollowSets {
            non_terminals: vec![BTreeSet::new(); self.non_terminals.len()],
        };
        if let Some(start_idx) = self.start_symbol {
            follow.non_terminals[start_idx].insert(Symbol::EndMark);
        }

        let mut passes = 1;
        while self.follow_pass(first, &mut follow) {
            passes += 1;
        }
        debug!("FOLLOW converged after {} passes", passes);

        follow
    }

    pub(crate) fn follow_pass(&self, first: &FirstSets, follow: &mut FollowSets) -> bool {
        let mut changed = false;
        for left in &self.non_terminals {
            for production in &left.productions {
                for (i, symbol) in production.iter().enumerate() {
                    let Symbol::NonTerminal(b) = *symbol else {
                        continue;
                    };

                    let rest = first.first_of_string(&production[i + 1..]);
                    let mut addition: Vec<Symbol> = rest
                        .iter()
                        .filter(|s| **s != Symbol::Epsilon)
                        .copied()
                        .collect();
                    if rest.contains(&Symbol::Epsilon) {
                        addition.extend(follow.non_terminals[left.index].iter().copied());
                    }

                    let set = &mut follow.non_terminals[b];
                    for s in addition {
                        changed |= set.insert(s);
                    }
                }
            }
        }
        changed
    }
}
