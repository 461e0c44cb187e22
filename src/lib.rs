extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

use grammar::pretty_print::error_to_json;

pub mod error;
pub mod grammar;
pub use error::{ConflictKind, GrammarError, TableConflict};
pub use grammar::analysis::{Analysis, Classification, ParserKind};
pub use grammar::{Grammar, Symbol};

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => {
            let first = g.compute_first();
            let follow = g.compute_follow(&first);
            g.to_non_terminal_output_vec(&first, &follow).to_json()
        }
        Err(e) => error_to_json(e),
    }
}

#[wasm_bindgen]
pub fn analyze_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar).and_then(|g| g.analyze().map(|a| (g, a))) {
        Ok((g, analysis)) => analysis.to_output(&g).to_json(),
        Err(e) => error_to_json(e),
    }
}

#[cfg(test)]
mod test_util {
    use std::collections::BTreeSet;

    use crate::{Grammar, Symbol};

    pub fn names(g: &Grammar, set: &BTreeSet<Symbol>) -> Vec<String> {
        let mut v: Vec<String> = set
            .iter()
            .map(|s| g.get_symbol_name(*s).to_string())
            .collect();
        v.sort();
        v
    }

    pub fn nt(g: &Grammar, name: &str) -> usize {
        g.get_symbol(name).and_then(|s| s.non_terminal()).unwrap()
    }

    pub fn tokens(g: &Grammar, input: &str) -> Vec<Symbol> {
        g.tokenize(input).unwrap()
    }

    pub const EXPR: &str = "E -> T E'\nE' -> + T E' | e\nT -> F T'\nT' -> * F T' | e\nF -> ( E ) | id";
}

#[cfg(test)]
mod parse_tests {
    use crate::grammar::Symbol;
    use crate::GrammarError;

    #[test]
    fn simple_parse() {
        let g = crate::Grammar::parse("S -> a").unwrap();

        let s = g.get_symbol("S").unwrap();
        let a = g.get_symbol("a").unwrap();

        assert_eq!(g.get_symbol_name(s), "S");
        assert_eq!(g.get_symbol_name(a), "a");
        assert_eq!(g.start_symbol(), s.non_terminal());
        assert_eq!(g.non_terminals()[0].productions[0], vec![a]);
    }

    #[test]
    fn simple_parse_with_space_and_newline() {
        let g = crate::Grammar::parse("  S -> a \n | b c").unwrap();

        let a = g.get_symbol("a").unwrap();
        let b = g.get_symbol("b").unwrap();
        let c = g.get_symbol("c").unwrap();

        assert_eq!(g.non_terminals()[0].productions[0], vec![a]);
        assert_eq!(g.non_terminals()[0].productions[1], vec![b, c]);
    }

    #[test]
    fn leading_rule_count() {
        let g = crate::Grammar::parse("2\nS -> A b | e\nA -> a\n").unwrap();
        assert_eq!(g.non_terminals().len(), 2);
        assert_eq!(g.non_terminals()[0].productions[1], vec![Symbol::Epsilon]);
        assert_eq!(g.terminals(), ["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn leading_rule_count_too_large() {
        assert!(matches!(
            crate::Grammar::parse("3\nS -> a\n"),
            Err(GrammarError::Syntax { line: 1, .. })
        ));
    }

    #[test]
    fn epsilon_inside_body_is_dropped() {
        let g = crate::Grammar::parse("S -> a e b").unwrap();
        assert_eq!(g.non_terminals()[0].productions[0].len(), 2);
    }

    #[test]
    fn empty_parse() {
        assert_eq!(
            crate::Grammar::parse("  \n  "),
            Err(GrammarError::EmptyGrammar)
        );
    }

    #[test]
    fn two_rightarrows_parse() {
        assert!(matches!(
            crate::Grammar::parse("S -> a -> b"),
            Err(GrammarError::Syntax { line: 1, .. })
        ));
    }

    #[test]
    fn no_previous_left_parse() {
        assert!(crate::Grammar::parse("| a b\n S -> a").is_err());
    }

    #[test]
    fn left_contain_space() {
        assert!(crate::Grammar::parse("S a S -> x").is_err());
    }

    #[test]
    fn lowercase_left_side() {
        assert!(matches!(
            crate::Grammar::parse("s -> a"),
            Err(GrammarError::Syntax { .. })
        ));
    }

    #[test]
    fn undeclared_non_terminal() {
        assert_eq!(
            crate::Grammar::parse("S -> a B"),
            Err(GrammarError::UndeclaredNonTerminal("B".to_string()))
        );
    }

    #[test]
    fn end_mark_is_reserved() {
        assert_eq!(
            crate::Grammar::parse("S -> a $"),
            Err(GrammarError::ReservedSymbol("$".to_string()))
        );
    }

    #[test]
    fn tokenize_longest_match() {
        let g = crate::Grammar::parse(super::test_util::EXPR).unwrap();
        let id = g.get_symbol("id").unwrap();
        let plus = g.get_symbol("+").unwrap();

        assert_eq!(g.tokenize("id+id").unwrap(), vec![id, plus, id]);
        assert_eq!(g.tokenize(" id  + id ").unwrap(), vec![id, plus, id]);
        assert_eq!(
            g.tokenize("id$").unwrap(),
            vec![id, Symbol::EndMark]
        );
        assert_eq!(
            g.tokenize("id - id"),
            Err(GrammarError::UnknownToken("-".to_string()))
        );
        assert!(g.tokenize("").unwrap().is_empty());
    }

    #[test]
    fn tokenize_backtracks_over_shared_prefixes() {
        let g = crate::Grammar::parse("S -> a bc | ab").unwrap();
        let a = g.get_symbol("a").unwrap();
        let bc = g.get_symbol("bc").unwrap();
        let ab = g.get_symbol("ab").unwrap();

        assert_eq!(g.tokenize("abc").unwrap(), vec![a, bc]);
        assert_eq!(g.tokenize("ab").unwrap(), vec![ab]);
        assert_eq!(g.tokenize("abc$").unwrap(), vec![a, bc, Symbol::EndMark]);
        assert_eq!(
            g.tokenize("abcb"),
            Err(GrammarError::UnknownToken("b".to_string()))
        );

        let analysis = g.analyze().unwrap();
        let input = g.tokenize("abc").unwrap();
        assert_eq!(analysis.parse(crate::ParserKind::LL1, &input), Some(true));
        assert_eq!(analysis.parse(crate::ParserKind::SLR1, &input), Some(true));
    }
}



#[cfg(test)]
mod ll1_tests {
    use super::test_util::{nt, tokens, EXPR};
    use crate::grammar::{ll1_parsing_table::LL1ParsingTable, Symbol};
    use crate::{Grammar, TableConflict};

    fn ll1(text: &str) -> (Grammar, Result<LL1ParsingTable, TableConflict>) {
        let g = Grammar::parse(text).unwrap();
        let first = g.compute_first();
        let follow = g.compute_follow(&first);
        let table = g.generate_ll1_parsing_table(&first, &follow);
        (g, table)
    }

    #[test]
    fn scenario_balanced() {
        let (g, table) = ll1("S -> a S b | e");
        let table = table.unwrap();
        let s = nt(&g, "S");
        let a = g.get_symbol("a").unwrap();
        let b = g.get_symbol("b").unwrap();

        assert_eq!(table.get(s, a), Some(0));
        assert_eq!(table.get(s, b), Some(1));
        assert_eq!(table.get(s, Symbol::EndMark), Some(1));

        assert!(table.parse(&tokens(&g, "ab")));
        assert!(table.parse(&tokens(&g, "aabb")));
        assert!(!table.parse(&tokens(&g, "aab")));
        assert!(!table.parse(&tokens(&g, "ba")));
        assert!(table.parse(&tokens(&g, "")));
        assert!(table.parse(&tokens(&g, "ab$")));
    }

    #[test]
    fn expression_grammar() {
        let (g, table) = ll1(EXPR);
        let table = table.unwrap();

        assert!(table.parse(&tokens(&g, "id + id * id")));
        assert!(table.parse(&tokens(&g, "(id+id)*id")));
        assert!(!table.parse(&tokens(&g, "id +")));
        assert!(!table.parse(&tokens(&g, "(id")));
        assert!(!table.parse(&tokens(&g, "")));
    }

    #[test]
    fn left_recursion_is_not_ll1() {
        let (_, table) = ll1("A -> A a | b");
        match table {
            Err(TableConflict::Predictive {
                non_terminal,
                terminal,
                existing,
                incoming,
            }) => {
                assert_eq!(non_terminal, "A");
                assert_eq!(terminal, "b");
                assert_eq!(existing, "A -> A a");
                assert_eq!(incoming, "A -> b");
            }
            other => panic!("expected a conflict, got {:?}", other),
        }
    }

    #[test]
    fn common_prefix_is_not_ll1() {
        let (_, table) = ll1("S -> a b | a c");
        assert!(table.is_err());
    }

    #[test]
    fn first_follow_overlap_is_not_ll1() {
        let (_, table) = ll1("S -> A a\nA -> a | e");
        assert!(table.is_err());
    }

    #[test]
    fn end_mark_in_the_middle_rejects() {
        let (g, table) = ll1("S -> a S b | e");
        let table = table.unwrap();
        let mut input = tokens(&g, "ab");
        input.insert(1, Symbol::EndMark);
        assert!(!table.parse(&input));
    }
}

#[cfg(test)]
mod lr0_tests {
    use super::test_util::EXPR;
    use crate::grammar::{
        lr0_fsm::{Item, ItemSet},
        Symbol,
    };
    use crate::Grammar;

    #[test]
    fn balanced_automaton() {
        let g = Grammar::parse("S -> a S b | e").unwrap();
        let fsm = g.to_lr0_fsm().unwrap();
        let a = g.get_symbol("a").unwrap();
        let b = g.get_symbol("b").unwrap();
        let s = Symbol::NonTerminal(0);

        // I0: S' -> .S, S -> .a S b, S -> .
        assert_eq!(fsm.states[0].items.len(), 3);
        let i1 = fsm.goto(0, s).unwrap();
        let i2 = fsm.goto(0, a).unwrap();
        assert_eq!(fsm.goto(i2, a), Some(i2));
        let i3 = fsm.goto(i2, s).unwrap();
        let i4 = fsm.goto(i3, b).unwrap();
        assert!(fsm.states[i1].edges.is_empty());
        assert!(fsm.states[i4].edges.is_empty());
        assert_eq!(fsm.states.len(), 5);
    }

    #[test]
    fn closure_is_idempotent() {
        let g = Grammar::parse(EXPR).unwrap();
        let aug = g.augment().unwrap();

        let once = aug.closure(ItemSet::from([aug.initial_item()]));
        let twice = aug.closure(once.clone());
        assert_eq!(once, twice);
        // S' -> .E, E -> .T E', T -> .F T', F -> .( E ), F -> .id
        assert_eq!(once.len(), 5);
    }

    #[test]
    fn goto_on_absent_symbol_is_empty() {
        let g = Grammar::parse(EXPR).unwrap();
        let aug = g.augment().unwrap();
        let i0 = aug.closure(ItemSet::from([aug.initial_item()]));
        assert!(aug.goto(&i0, g.get_symbol("+").unwrap()).is_empty());
    }

    #[test]
    fn states_are_distinct() {
        let g = Grammar::parse(EXPR).unwrap();
        let fsm = g.to_lr0_fsm().unwrap();
        for (i, a) in fsm.states.iter().enumerate() {
            for b in &fsm.states[i + 1..] {
                assert_ne!(a.items, b.items);
            }
        }
    }

    #[test]
    fn shared_goto_targets_are_merged() {
        // both `a` edges lead to the same item set {A -> a.}
        let g = Grammar::parse("S -> x A | y A\nA -> a").unwrap();
        let fsm = g.to_lr0_fsm().unwrap();
        let x = g.get_symbol("x").unwrap();
        let y = g.get_symbol("y").unwrap();
        let a = g.get_symbol("a").unwrap();

        let after_x = fsm.goto(0, x).unwrap();
        let after_y = fsm.goto(0, y).unwrap();
        assert_ne!(after_x, after_y);
        assert_eq!(fsm.goto(after_x, a), fsm.goto(after_y, a));
        assert_eq!(
            fsm.states[fsm.goto(after_x, a).unwrap()].items,
            ItemSet::from([Item {
                head: 1,
                production: 0,
                position: 1
            }])
        );
    }
}

#[cfg(test)]
mod slr1_tests {
    use super::test_util::{tokens, EXPR};
    use crate::grammar::slr1_parsing_table::{Action, SLR1ParsingTable};
    use crate::{ConflictKind, Grammar, TableConflict};

    fn slr1(text: &str) -> (Grammar, Result<SLR1ParsingTable, TableConflict>) {
        let g = Grammar::parse(text).unwrap();
        let first = g.compute_first();
        let follow = g.compute_follow(&first);
        let table = g.to_lr0_fsm().unwrap().to_slr1_parsing_table(&follow);
        (g, table)
    }

    #[test]
    fn left_recursion_is_slr1() {
        let (g, table) = slr1("A -> A a | b");
        let table = table.unwrap();

        assert!(table.parse(&tokens(&g, "baa")));
        assert!(table.parse(&tokens(&g, "b")));
        assert!(!table.parse(&tokens(&g, "a")));
        assert!(!table.parse(&tokens(&g, "")));
        assert!(!table.parse(&tokens(&g, "bab")));
    }

    #[test]
    fn balanced() {
        let (g, table) = slr1("S -> a S b | e");
        let table = table.unwrap();

        assert!(table.parse(&tokens(&g, "ab")));
        assert!(table.parse(&tokens(&g, "")));
        assert!(table.parse(&tokens(&g, "aaabbb$")));
        assert!(!table.parse(&tokens(&g, "aab")));
        assert!(!table.parse(&tokens(&g, "abb")));
    }

    #[test]
    fn classic_expression_grammar() {
        let (g, table) = slr1("E -> E + T | T\nT -> T * F | F\nF -> ( E ) | id");
        let table = table.unwrap();

        assert_eq!(table.state_count(), 12);
        assert!(table.parse(&tokens(&g, "id+id*id")));
        assert!(table.parse(&tokens(&g, "((id))")));
        assert!(!table.parse(&tokens(&g, "id+*id")));
        assert!(!table.parse(&tokens(&g, "(id))")));
    }

    #[test]
    fn accept_only_on_end_mark() {
        let (g, table) = slr1(EXPR);
        let table = table.unwrap();
        let accepting: Vec<usize> = (0..table.state_count())
            .filter(|&s| {
                table
                    .action_row(s)
                    .values()
                    .any(|a| *a == Action::Accept)
            })
            .collect();
        assert_eq!(accepting.len(), 1);
        assert_eq!(
            table.action(accepting[0], crate::Symbol::EndMark),
            Some(Action::Accept)
        );
        assert!(table.parse(&tokens(&g, "id*(id+id)")));
    }

    #[test]
    fn dangling_else_conflicts() {
        let (_, table) = slr1("S -> i S | i S t S | a");
        match table {
            Err(TableConflict::Lr { kind, terminal, .. }) => {
                assert_eq!(kind, ConflictKind::ShiftReduce);
                assert_eq!(terminal, "t");
            }
            other => panic!("expected a conflict, got {:?}", other),
        }
    }

    #[test]
    fn reduce_reduce_conflicts() {
        let (_, table) = slr1("S -> A | B\nA -> a\nB -> a");
        assert!(matches!(
            table,
            Err(TableConflict::Lr {
                kind: ConflictKind::ReduceReduce,
                ..
            })
        ));
    }

    #[test]
    fn classic_non_slr1_grammar() {
        // L-values: SLR(1) sees a shift-reduce conflict on `=`
        let (_, table) = slr1("S -> L = R | R\nL -> * R | id\nR -> L");
        assert!(matches!(
            table,
            Err(TableConflict::Lr {
                kind: ConflictKind::ShiftReduce,
                ..
            })
        ));
    }
}

#[cfg(test)]
mod analysis_tests {
    use super::test_util::tokens;
    use crate::{Classification, Grammar, ParserKind};

    #[test]
    fn classification() {
        let cases = [
            ("S -> a S b | e", Classification::Both),
            ("A -> A a | b", Classification::SLR1),
            ("S -> i S | i S t S | a", Classification::Neither),
            ("S -> A a | b\nA -> c | e", Classification::Both),
        ];
        for (text, expected) in cases {
            let g = Grammar::parse(text).unwrap();
            assert_eq!(g.analyze().unwrap().classification(), expected, "{}", text);
        }
    }

    #[test]
    fn nullable_start_accepts_empty_input() {
        for (text, nullable) in [
            ("S -> A B\nA -> a | e\nB -> b | e", true),
            ("S -> A b\nA -> a | e", false),
        ] {
            let g = Grammar::parse(text).unwrap();
            let analysis = g.analyze().unwrap();
            assert_eq!(analysis.first.is_nullable(0), nullable);
            assert_eq!(analysis.parse(ParserKind::LL1, &[]), Some(nullable));
            assert_eq!(analysis.parse(ParserKind::SLR1, &[]), Some(nullable));
        }
    }

    #[test]
    fn parse_without_table() {
        let g = Grammar::parse("A -> A a | b").unwrap();
        let analysis = g.analyze().unwrap();
        assert!(!analysis.is_ll1());
        assert_eq!(analysis.parse(ParserKind::LL1, &tokens(&g, "b")), None);
        assert_eq!(analysis.parse(ParserKind::SLR1, &tokens(&g, "b")), Some(true));
    }
}
