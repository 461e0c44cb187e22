use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use log::debug;

use crate::error::GrammarError;

use super::{
    grammar::{production_body, Symbol},
    Grammar,
};

/// An LR(0) item: production `production` of `head` with the dot before
/// symbol `position` of its ε-free body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub head: usize,
    pub production: usize,
    pub position: usize,
}

pub type ItemSet = BTreeSet<Item>;

/// The grammar plus `S' -> S`. `S'` is the last nonterminal, so indices of
/// the original nonterminals are unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentedGrammar {
    pub grammar: Grammar,
    pub start: usize,
    pub real_start: usize,
}

impl Grammar {
    pub fn augment(&self) -> Result<AugmentedGrammar, GrammarError> {
        let real_start = self.start_symbol.ok_or(GrammarError::MissingStartSymbol)?;

        let mut grammar = self.clone();
        let dummy_start =
            grammar.get_symbol_prime_name(self.non_terminals[real_start].name.clone());
        let start = grammar.add_non_terminal(&dummy_start)?;
        grammar.add_production(start, vec![Symbol::NonTerminal(real_start)])?;
        grammar.start_symbol = Some(start);

        Ok(AugmentedGrammar {
            grammar,
            start,
            real_start,
        })
    }
}

impl AugmentedGrammar {
    pub fn body(&self, item: &Item) -> &[Symbol] {
        production_body(&self.grammar.non_terminals[item.head].productions[item.production])
    }

    pub fn next_symbol(&self, item: &Item) -> Option<Symbol> {
        self.body(item).get(item.position).copied()
    }

    pub fn is_complete(&self, item: &Item) -> bool {
        item.position == self.body(item).len()
    }

    /// Kernel items are the ones not introduced by closure.
    pub fn is_kernel(&self, item: &Item) -> bool {
        item.position > 0 || item.head == self.start
    }

    pub fn initial_item(&self) -> Item {
        Item {
            head: self.start,
            production: 0,
            position: 0,
        }
    }

    pub fn closure(&self, items: ItemSet) -> ItemSet {
        let mut closure = items;
        let mut q: VecDeque<usize> = closure
            .iter()
            .filter_map(|item| self.next_symbol(item)?.non_terminal())
            .collect();
        let mut expanded: HashSet<usize> = HashSet::new();

        while let Some(nt) = q.pop_front() {
            if !expanded.insert(nt) {
                continue;
            }
            for production in 0..self.grammar.non_terminals[nt].productions.len() {
                let item = Item {
                    head: nt,
                    production,
                    position: 0,
                };
                if closure.insert(item) {
                    if let Some(Symbol::NonTerminal(next)) = self.next_symbol(&item) {
                        q.push_back(next);
                    }
                }
            }
        }

        closure
    }

    /// Empty when no item has `symbol` right after its dot.
    pub fn goto(&self, items: &ItemSet, symbol: Symbol) -> ItemSet {
        let moved: ItemSet = items
            .iter()
            .filter(|item| self.next_symbol(item) == Some(symbol))
            .map(|item| Item {
                position: item.position + 1,
                ..*item
            })
            .collect();

        if moved.is_empty() {
            moved
        } else {
            self.closure(moved)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LR0State {
    pub items: ItemSet,
    pub edges: BTreeMap<Symbol, usize>,
}

impl LR0State {
    fn new(items: ItemSet) -> Self {
        Self {
            items,
            edges: BTreeMap::new(),
        }
    }
}

/// The canonical collection of LR(0) item sets. State 0 is the start state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LR0FSM {
    pub grammar: AugmentedGrammar,
    pub states: Vec<LR0State>,
}

impl LR0FSM {
    pub fn goto(&self, state: usize, symbol: Symbol) -> Option<usize> {
        self.states.get(state)?.edges.get(&symbol).copied()
    }
}

impl Grammar {
    pub fn to_lr0_fsm(&self) -> Result<LR0FSM, GrammarError> {
        let g = self.augment()?;

        let start_state = g.closure(ItemSet::from([g.initial_item()]));
        let mut index: HashMap<ItemSet, usize> = HashMap::from([(start_state.clone(), 0)]);
        let mut states = vec![LR0State::new(start_state)];

        let mut u = 0;
        while u < states.len() {
            let symbols: BTreeSet<Symbol> = states[u]
                .items
                .iter()
                .filter_map(|item| g.next_symbol(item))
                .collect();

            for symbol in symbols {
                let next = g.goto(&states[u].items, symbol);
                let v = match index.get(&next) {
                    Some(&v) => v,
                    None => {
                        let v = states.len();
                        index.insert(next.clone(), v);
                        states.push(LR0State::new(next));
                        v
                    }
                };
                states[u].edges.insert(symbol, v);
            }
            u += 1;
        }

        debug!("LR(0) automaton: {} states", states.len());

        Ok(LR0FSM { grammar: g, states })
    }
}
