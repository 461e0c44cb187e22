use log::trace;

use super::{grammar::Symbol, ll1_parsing_table::LL1ParsingTable};

/// Drops one trailing `$` so callers may pass input with or without it.
pub(crate) fn strip_end_mark(input: &[Symbol]) -> &[Symbol] {
    match input.split_last() {
        Some((Symbol::EndMark, rest)) => rest,
        _ => input,
    }
}

impl LL1ParsingTable {
    /// Runs the predictive stack machine over a terminal sequence.
    pub fn parse(&self, input: &[Symbol]) -> bool {
        let input = strip_end_mark(input);
        let mut stack = vec![Symbol::EndMark, Symbol::NonTerminal(self.start)];
        let mut cursor = 0;

        while let Some(top) = stack.pop() {
            let lookahead = input.get(cursor).copied().unwrap_or(Symbol::EndMark);
            match top {
                Symbol::EndMark => {
                    let accepted = cursor == input.len();
                    trace!("LL(1) reached $ at {}: {}", cursor, accepted);
                    return accepted;
                }
                Symbol::NonTerminal(nt) => match self.get(nt, lookahead) {
                    Some(p) => {
                        trace!("LL(1) expand #{} by production {} on {:?}", nt, p, lookahead);
                        stack.extend(self.body(nt, p).iter().rev());
                    }
                    None => {
                        trace!("LL(1) no entry for #{} on {:?}", nt, lookahead);
                        return false;
                    }
                },
                Symbol::Epsilon => {}
                terminal => {
                    if terminal != lookahead {
                        trace!("LL(1) expected {:?}, found {:?}", terminal, lookahead);
                        return false;
                    }
                    trace!("LL(1) match {:?}", terminal);
                    cursor += 1;
                }
            }
        }

        false
    }
}
