use log::trace;

use super::{
    grammar::Symbol,
    ll1_parser::strip_end_mark,
    slr1_parsing_table::{Action, SLR1ParsingTable},
};

impl SLR1ParsingTable {
    /// Runs the shift-reduce machine over a terminal sequence.
    pub fn parse(&self, input: &[Symbol]) -> bool {
        let input = strip_end_mark(input);
        let mut stack: Vec<usize> = vec![0];
        let mut cursor = 0;

        while let Some(&state) = stack.last() {
            let lookahead = input.get(cursor).copied().unwrap_or(Symbol::EndMark);
            match self.action(state, lookahead) {
                None => {
                    trace!("SLR(1) no action in state {} on {:?}", state, lookahead);
                    return false;
                }
                Some(Action::Shift(next)) => {
                    trace!("SLR(1) shift {:?}, goto {}", lookahead, next);
                    stack.push(next);
                    cursor += 1;
                }
                Some(Action::Reduce(r)) => {
                    if stack.len() <= r.len {
                        return false;
                    }
                    stack.truncate(stack.len() - r.len);
                    let top = stack[stack.len() - 1];
                    match self.goto(top, r.head) {
                        Some(next) => {
                            trace!(
                                "SLR(1) reduce #{} production {}, goto {}",
                                r.head,
                                r.production,
                                next
                            );
                            stack.push(next);
                        }
                        None => return false,
                    }
                }
                Some(Action::Accept) => {
                    let accepted = cursor == input.len();
                    trace!("SLR(1) accept at {}: {}", cursor, accepted);
                    return accepted;
                }
            }
        }

        false
    }
}
