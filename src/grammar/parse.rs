use std::{cmp::Reverse, collections::HashSet};

use crate::error::GrammarError;

use super::{grammar::Symbol, Grammar, END_MARK, EPSILON, EPSILON_ALIAS};

fn syntax_error(line: usize, message: impl Into<String>) -> GrammarError {
    GrammarError::Syntax {
        line,
        message: message.into(),
    }
}

fn is_non_terminal_name(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_uppercase())
}

impl Grammar {
    /// Reads `Head -> alt | alt` rules, one head per line.
    ///
    /// The text may start with the number of rule lines that follow. A line
    /// starting with `|` adds alternatives to the previous head. Symbols are
    /// whitespace separated; uppercase-initial names are nonterminals, `e`
    /// is ε. The first head is the start symbol.
    pub fn parse(grammar: &str) -> Result<Self, GrammarError> {
        let mut lines = grammar
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line))
            .filter(|(_, line)| !line.chars().all(|c| c.is_whitespace()))
            .peekable();

        let count = match lines.peek() {
            Some((_, line)) => line.trim().parse::<usize>().ok(),
            None => return Err(GrammarError::EmptyGrammar),
        };
        let lines: Vec<(usize, &str)> = match count {
            Some(n) => {
                let (line_no, _) = lines.next().unwrap_or_default();
                let rules: Vec<(usize, &str)> = lines.take(n).collect();
                if rules.len() < n {
                    return Err(syntax_error(
                        line_no,
                        format!("expected {} rules, found {}", n, rules.len()),
                    ));
                }
                rules
            }
            None => lines.collect(),
        };

        let mut g = Self::new();
        let mut raw_productions: Vec<(usize, usize, &str)> = Vec::new();

        let mut previous_left: Option<usize> = None;
        for (line_no, line) in lines {
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(syntax_error(line_no, "too many \"->\""));
            }
            let (left, rights): (usize, &str) = if parts.len() == 2 {
                let left_str = parts[0].trim();
                if left_str.is_empty() {
                    return Err(syntax_error(line_no, "empty left side"));
                } else if left_str.split_whitespace().count() != 1 {
                    return Err(syntax_error(line_no, "left side contains whitespace"));
                } else if !is_non_terminal_name(left_str) {
                    return Err(syntax_error(
                        line_no,
                        format!("left side `{}` must start with an uppercase letter", left_str),
                    ));
                }
                (g.add_non_terminal(left_str)?, parts[1].trim())
            } else {
                match (previous_left, parts[0].trim().strip_prefix('|')) {
                    (Some(idx), Some(rest)) => (idx, rest.trim()),
                    _ => return Err(syntax_error(line_no, "cannot find left side")),
                }
            };

            previous_left = Some(left);
            raw_productions.push((line_no, left, rights));
        }

        for (line_no, left, rights) in raw_productions {
            for right in rights.split('|') {
                if right.trim().is_empty() {
                    return Err(syntax_error(line_no, "empty alternative, write `e` for ε"));
                }
                let symbols = right
                    .split_whitespace()
                    .map(|s| match s {
                        EPSILON_ALIAS | EPSILON => Ok(Symbol::Epsilon),
                        END_MARK => Err(GrammarError::ReservedSymbol(s.to_string())),
                        _ if is_non_terminal_name(s) => g
                            .get_symbol(s)
                            .filter(|sym| sym.non_terminal().is_some())
                            .ok_or_else(|| GrammarError::UndeclaredNonTerminal(s.to_string())),
                        _ => g.add_terminal(s),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                g.add_production(left, symbols)?;
            }
        }

        g.validate()?;
        Ok(g)
    }

    /// Splits an input string into terminals of this grammar.
    ///
    /// Whitespace separates chunks and each chunk is cut into terminal names,
    /// so `"baa"` and `"b a a"` read the same. Longer names are tried first
    /// and the search backtracks when a cut leaves an unmatchable tail. `$` is
    /// kept as [`Symbol::EndMark`].
    pub fn tokenize(&self, input: &str) -> Result<Vec<Symbol>, GrammarError> {
        let mut symbols = Vec::new();
        for chunk in input.split_whitespace() {
            let mut dead = HashSet::new();
            let mut furthest = 0;
            if !self.segment(chunk, 0, &mut dead, &mut furthest, &mut symbols) {
                return Err(GrammarError::UnknownToken(
                    chunk[furthest..].chars().take(1).collect(),
                ));
            }
        }
        Ok(symbols)
    }

    /// Depth-first cut of `chunk[at..]`. `dead` remembers offsets with no
    /// valid cut, `furthest` the deepest offset any cut reached.
    fn segment(
        &self,
        chunk: &str,
        at: usize,
        dead: &mut HashSet<usize>,
        furthest: &mut usize,
        out: &mut Vec<Symbol>,
    ) -> bool {
        if at == chunk.len() {
            return true;
        }
        if dead.contains(&at) {
            return false;
        }
        *furthest = (*furthest).max(at);

        let rest = &chunk[at..];
        let mut candidates: Vec<(Symbol, usize)> = self
            .terminals
            .iter()
            .enumerate()
            .filter(|(_, t)| rest.starts_with(t.as_str()))
            .map(|(i, t)| (Symbol::Terminal(i), t.len()))
            .collect();
        if rest.starts_with(END_MARK) {
            candidates.push((Symbol::EndMark, END_MARK.len()));
        }
        candidates.sort_by_key(|&(_, len)| Reverse(len));

        for (symbol, len) in candidates {
            out.push(symbol);
            if self.segment(chunk, at + len, dead, furthest, out) {
                return true;
            }
            out.pop();
        }
        dead.insert(at);
        false
    }
}
