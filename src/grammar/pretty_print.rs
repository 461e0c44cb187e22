use std::collections::{BTreeMap, HashSet};

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    analysis::{Analysis, Classification},
    first_follow::{FirstSets, FollowSets},
    grammar::{production_body, Symbol},
    ll1_parsing_table::LL1ParsingTable,
    lr0_fsm::{AugmentedGrammar, Item, LR0State, LR0FSM},
    slr1_parsing_table::{Action, SLR1ParsingTable},
    Grammar, EPSILON,
};

fn align_columns(output: &[Vec<String>]) -> String {
    let width: Vec<usize> = (0..output[0].len())
        .map(|j| output.iter().map(|row| row[j].chars().count()).max().unwrap_or(0))
        .collect();

    output
        .iter()
        .map(|line| {
            line.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `{"error": ..}`, the JSON shape of every failure.
pub(crate) fn error_to_json(e: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

fn symbol_to_latex(s: &str, terminal_set: &HashSet<&str>) -> String {
    if s == EPSILON {
        "\\epsilon".to_string()
    } else if terminal_set.contains(s) {
        format!("\\text{{{}}}", escape::tex(s))
    } else {
        escape::tex(s).to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.join(" "))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool, terminal_set: &HashSet<&str>) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|s| symbol_to_latex(s, terminal_set))
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        left + &right
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
    #[serde(skip)]
    terminals: HashSet<&'a str>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(
                self.productions
                    .iter()
                    .map(|s| s.to_latex(true, &self.terminals)),
            )
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec<'_> {
        let productions = self
            .non_terminals
            .iter()
            .map(|nt| ProductionOutput {
                left: nt.name.as_str(),
                rights: nt
                    .productions
                    .iter()
                    .map(|production| self.production_to_vec_str(production))
                    .collect(),
            })
            .collect();
        ProductionOutputVec {
            productions,
            terminals: self.terminals.iter().map(|t| t.as_str()).collect(),
        }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &[&str]) -> String {
            a.iter()
                .map(|s| {
                    if *s == EPSILON {
                        r"$\epsilon$".to_string()
                    } else {
                        escape::tex(*s).to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(r"\ ")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(error_to_json)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    pub fn to_non_terminal_output_vec<'a>(
        &'a self,
        first: &FirstSets,
        follow: &FollowSets,
    ) -> NonTerminalOutputVec<'a> {
        let data = self
            .non_terminals
            .iter()
            .map(|nt| NonTerminalOutput {
                name: nt.name.as_str(),
                nullable: first.is_nullable(nt.index),
                first: first
                    .of_non_terminal(nt.index)
                    .iter()
                    .map(|s| self.get_symbol_name(*s))
                    .collect(),
                follow: follow
                    .of_non_terminal(nt.index)
                    .iter()
                    .map(|s| self.get_symbol_name(*s))
                    .collect(),
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[derive(Serialize)]
pub struct LL1ParsingTableOutput<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<ProductionOutput<'a>>)>,
}

impl LL1ParsingTableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|&t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(
                row.iter()
                    .map(|production| production.to_plaintext(left.chars().count(), false)),
            );
            output.push(line);
        }

        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape::tex(t))),
        );
        let header = header.join(" & ");

        let terminal_set: HashSet<&str> = self.terminals.iter().cloned().collect();
        let output = self
            .rows
            .iter()
            .map(|(left, row)| {
                std::iter::once(escape::tex(*left).to_string())
                    .chain(
                        row.iter()
                            .map(|production| production.to_latex(false, &terminal_set)),
                    )
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

impl LL1ParsingTable {
    pub fn to_output<'a>(&self, g: &'a Grammar) -> LL1ParsingTableOutput<'a> {
        let columns: Vec<Symbol> = g.lookahead_iter().collect();
        let terminals = columns.iter().map(|s| g.get_symbol_name(*s)).collect();

        let rows = g
            .non_terminals
            .iter()
            .map(|nt| {
                let left = nt.name.as_str();
                let row = columns
                    .iter()
                    .map(|terminal| ProductionOutput {
                        left,
                        rights: self
                            .get(nt.index, *terminal)
                            .map(|p| vec![g.production_to_vec_str(&nt.productions[p])])
                            .unwrap_or_default(),
                    })
                    .collect();
                (left, row)
            })
            .collect();

        LL1ParsingTableOutput { terminals, rows }
    }
}

impl AugmentedGrammar {
    pub fn item_to_plaintext(&self, item: &Item) -> String {
        let nt = &self.grammar.non_terminals[item.head];
        let mut right: Vec<&str> = self.grammar.production_to_vec_str(self.body(item));
        right.insert(item.position, ".");
        format!("{} -> {}", nt.name, right.join(" "))
    }

    pub fn item_to_latex(&self, item: &Item) -> String {
        let nt = &self.grammar.non_terminals[item.head];
        let mut right: Vec<String> = self
            .body(item)
            .iter()
            .map(|s| escape::tex(self.grammar.get_symbol_name(*s)).to_string())
            .collect();
        right.insert(item.position, ".".to_string());
        format!("${} \\rightarrow {}$", escape::tex(nt.name.as_str()), right.join(" "))
    }
}

#[derive(Serialize)]
struct LR0StateOutput {
    kernel: Vec<String>,
    closure: Vec<String>,
    edges: BTreeMap<String, usize>,
}

#[derive(Serialize)]
pub struct LR0FSMOutput {
    states: Vec<LR0StateOutput>,
    start: usize,
}

impl LR0FSMOutput {
    pub fn to_plaintext(&self) -> String {
        let states = self
            .states
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let closure = if s.closure.is_empty() {
                    String::new()
                } else {
                    format!("\n---\n{}", s.closure.join("\n"))
                };
                let edges = if s.edges.is_empty() {
                    String::new()
                } else {
                    format!(
                        "\n===\n{}",
                        s.edges
                            .iter()
                            .map(|(k, v)| format!("- {} -> {}", k, v))
                            .collect::<Vec<_>>()
                            .join("\n")
                    )
                };
                format!("I{}\n{}{}{}", i, s.kernel.join("\n"), closure, edges)
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!("{}\n\nstart: {}", states, self.start)
    }
}

impl LR0FSM {
    pub fn to_output(&self) -> LR0FSMOutput {
        let g = &self.grammar;
        let states = self
            .states
            .iter()
            .map(|state| LR0StateOutput {
                kernel: state
                    .items
                    .iter()
                    .filter(|item| g.is_kernel(item))
                    .map(|item| g.item_to_plaintext(item))
                    .collect(),
                closure: state
                    .items
                    .iter()
                    .filter(|item| !g.is_kernel(item))
                    .map(|item| g.item_to_plaintext(item))
                    .collect(),
                edges: state
                    .edges
                    .iter()
                    .map(|(s, v)| (g.grammar.get_symbol_name(*s).to_string(), *v))
                    .collect(),
            })
            .collect();
        LR0FSMOutput { states, start: 0 }
    }

    pub fn to_plaintext(&self) -> String {
        self.to_output().to_plaintext()
    }

    fn node_to_latex(&self, state: &LR0State, id: usize) -> String {
        let content = state
            .items
            .iter()
            .map(|e| self.grammar.item_to_latex(e))
            .collect::<Vec<_>>()
            .join(" \\\\ \n");
        format!(
            "\\node [block] (I_{}){}\n{{\n$I_{}$\\\\\n{}\n}};",
            id,
            if id > 0 {
                if id % 2 == 0 {
                    format!(" [below of = I_{}] ", id - 2)
                } else {
                    format!(" [right of = I_{}] ", id - 1)
                }
            } else {
                String::new()
            },
            id,
            content
        )
    }

    fn edge_to_latex(&self, state: &LR0State, id: usize) -> String {
        state
            .edges
            .iter()
            .map(|(e, v)| {
                format!(
                    "\\path [->] (I_{}) edge {} node [above]{{{}}} (I_{});",
                    id,
                    if id == *v { "[loop left]" } else { "[right]" },
                    escape::tex(self.grammar.grammar.get_symbol_name(*e)),
                    v
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        format!(
            "\\begin{{tikzpicture}}[node distance=5cm,block/.style={{state, rectangle, text width=6em}}]\n{}\n\\end{{tikzpicture}}",
            self.states
                .iter()
                .enumerate()
                .map(|(i, s)| self.node_to_latex(s, i))
                .chain(self.states.iter().enumerate().map(|(i, s)| self.edge_to_latex(s, i)))
                .collect::<Vec<_>>()
                .join("\n")
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum ActionOutput<'a> {
    Shift(usize),
    Reduce(&'a str, Vec<&'a str>),
    Accept,
}

impl ActionOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        match self {
            ActionOutput::Reduce(left, right) => format!("r({} -> {})", left, right.join(" ")),
            ActionOutput::Shift(s) => format!("s{}", s),
            ActionOutput::Accept => "acc".to_string(),
        }
    }

    pub fn to_latex(&self, terminal_set: &HashSet<&str>) -> String {
        match self {
            ActionOutput::Reduce(left, right) => format!(
                "reduce ${} \\rightarrow {}$",
                escape::tex(*left),
                right
                    .iter()
                    .map(|s| symbol_to_latex(s, terminal_set))
                    .collect::<Vec<_>>()
                    .join(" \\  ")
            ),
            ActionOutput::Shift(s) => format!("shift {}", s),
            ActionOutput::Accept => "accept".to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct SLR1ParsingTableOutput<'a> {
    terminals: Vec<&'a str>,
    non_terminals: Vec<&'a str>,
    action: Vec<Vec<Option<ActionOutput<'a>>>>,
    goto: Vec<Vec<Option<usize>>>,
}

impl SLR1ParsingTableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut output: Vec<Vec<String>> = vec![std::iter::once(String::new())
            .chain(
                self.terminals
                    .iter()
                    .chain(self.non_terminals.iter())
                    .map(|s| s.to_string()),
            )
            .collect()];

        for (i, (r1, r2)) in self.action.iter().zip(self.goto.iter()).enumerate() {
            let row: Vec<String> = std::iter::once(i.to_string())
                .chain(r1.iter().map(|action| {
                    action
                        .as_ref()
                        .map(|a| a.to_plaintext())
                        .unwrap_or_default()
                }))
                .chain(r2.iter().map(|goto| goto.map(|g| g.to_string()).unwrap_or_default()))
                .collect();
            output.push(row);
        }

        align_columns(&output)
    }

    pub fn to_latex(&self) -> String {
        let header: String = format!(
            "\\begin{{tabular}}{{c{}}}\n & \\multicolumn{{{}}}{{c}}{{action}} & \\multicolumn{{{}}}{{|c}}{{goto}}\\\\",
            "|l".repeat(self.terminals.len() + self.non_terminals.len()),
            self.terminals.len(),
            self.non_terminals.len(),
        );

        let first_row = std::iter::once(String::new())
            .chain(
                self.terminals
                    .iter()
                    .chain(self.non_terminals.iter())
                    .map(|s| escape::tex(*s).to_string()),
            )
            .collect::<Vec<_>>()
            .join(" & ");

        let terminal_set: HashSet<&str> = self.terminals.iter().cloned().collect();

        let content = self
            .action
            .iter()
            .zip(self.goto.iter())
            .enumerate()
            .map(|(i, (r1, r2))| {
                std::iter::once(i.to_string())
                    .chain(r1.iter().map(|action| {
                        action
                            .as_ref()
                            .map(|a| a.to_latex(&terminal_set))
                            .unwrap_or_default()
                    }))
                    .chain(r2.iter().map(|goto| goto.map(|g| g.to_string()).unwrap_or_default()))
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join(" \\\\\n");

        format!(
            "{}\n{} \\\\\\hline\n{}\n\\end{{tabular}}",
            header, first_row, content
        )
    }
}

impl SLR1ParsingTable {
    pub fn to_output<'a>(&self, g: &'a Grammar) -> SLR1ParsingTableOutput<'a> {
        let columns: Vec<Symbol> = g.lookahead_iter().collect();

        let action = (0..self.state_count())
            .map(|state| {
                columns
                    .iter()
                    .map(|terminal| {
                        self.action(state, *terminal).map(|action| match action {
                            Action::Shift(s) => ActionOutput::Shift(s),
                            Action::Reduce(r) => {
                                let nt = &g.non_terminals[r.head];
                                ActionOutput::Reduce(
                                    nt.name.as_str(),
                                    g.production_to_vec_str(production_body(
                                        &nt.productions[r.production],
                                    )),
                                )
                            }
                            Action::Accept => ActionOutput::Accept,
                        })
                    })
                    .collect()
            })
            .collect();

        let goto = (0..self.state_count())
            .map(|state| {
                let row = self.goto_row(state);
                (0..g.non_terminals.len())
                    .map(|nt| row.get(&nt).copied())
                    .collect::<Vec<_>>()
            })
            .collect();

        SLR1ParsingTableOutput {
            terminals: columns.iter().map(|s| g.get_symbol_name(*s)).collect(),
            non_terminals: g.non_terminals.iter().map(|nt| nt.name.as_str()).collect(),
            action,
            goto,
        }
    }
}

#[derive(Serialize)]
pub struct AnalysisOutput<'a> {
    classification: Classification,
    ll1: bool,
    slr1: bool,
    ll1_conflict: Option<String>,
    slr1_conflict: Option<String>,
    non_terminals: NonTerminalOutputVec<'a>,
}

impl AnalysisOutput<'_> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(error_to_json)
    }
}

impl Analysis {
    pub fn to_output<'a>(&self, g: &'a Grammar) -> AnalysisOutput<'a> {
        AnalysisOutput {
            classification: self.classification(),
            ll1: self.is_ll1(),
            slr1: self.is_slr1(),
            ll1_conflict: self.ll1.as_ref().err().map(|e| e.to_string()),
            slr1_conflict: self.slr1.as_ref().err().map(|e| e.to_string()),
            non_terminals: g.to_non_terminal_output_vec(&self.first, &self.follow),
        }
    }
}
