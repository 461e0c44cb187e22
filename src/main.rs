use std::io::{self, BufRead, Read, Write};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ll1_slr1_helper::{Analysis, Classification, Grammar, ParserKind};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Output {
    /// Productions
    Prod,
    /// FIRST and FOLLOW sets
    Ff,
    /// LL(1) parsing table
    Ll1,
    /// LR(0) automaton
    Lr0fsm,
    /// SLR(1) parsing table
    Slr1,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What to print
    #[arg(value_enum)]
    outputs: Vec<Output>,

    /// Print in LaTeX format
    #[arg(short, long, conflicts_with = "json")]
    latex: bool,

    /// Print in JSON format
    #[arg(short, long)]
    json: bool,

    /// Strings to check with every parser the grammar admits
    #[arg(short, long = "string")]
    strings: Vec<String>,

    /// Pick a parser and check strings read from stdin
    #[arg(short, long, requires = "grammar")]
    interactive: bool,

    /// Grammar file, stdin when absent
    #[arg(short, long)]
    grammar: Option<String>,
}

enum OutputFormat {
    Plain,
    LaTeX,
    JSON,
}

fn read_grammar(path: Option<&str>) -> anyhow::Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("can't read {:?}", path))
        }
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn print_outputs(
    g: &Grammar,
    analysis: &Analysis,
    outputs: &[Output],
    format: &OutputFormat,
) -> anyhow::Result<()> {
    for output in outputs {
        let text = match output {
            Output::Prod => {
                let t = g.to_production_output_vec();
                match format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => serde_json::to_string(&t)?,
                }
            }
            Output::Ff => {
                let t = g.to_non_terminal_output_vec(&analysis.first, &analysis.follow);
                match format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::LaTeX => t.to_latex(),
                    OutputFormat::JSON => t.to_json(),
                }
            }
            Output::Ll1 => match &analysis.ll1 {
                Ok(table) => {
                    let t = table.to_output(g);
                    match format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::JSON => serde_json::to_string(&t)?,
                    }
                }
                Err(e) => e.to_string(),
            },
            Output::Lr0fsm => {
                let fsm = &analysis.lr0_fsm;
                match format {
                    OutputFormat::Plain => fsm.to_plaintext(),
                    OutputFormat::LaTeX => fsm.to_latex(),
                    OutputFormat::JSON => serde_json::to_string(&fsm.to_output())?,
                }
            }
            Output::Slr1 => match &analysis.slr1 {
                Ok(table) => {
                    let t = table.to_output(g);
                    match format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::JSON => serde_json::to_string(&t)?,
                    }
                }
                Err(e) => e.to_string(),
            },
        };
        println!("{}", text);
    }
    Ok(())
}

fn check(g: &Grammar, analysis: &Analysis, kind: ParserKind, input: &str) -> bool {
    match g.tokenize(input) {
        Ok(symbols) => analysis.parse(kind, &symbols).unwrap_or(false),
        Err(e) => {
            log::debug!("{}", e);
            false
        }
    }
}

fn yes_no(accepted: bool) -> &'static str {
    if accepted {
        "yes"
    } else {
        "no"
    }
}

/// Reads strings until an empty line or EOF, answering each one.
fn check_lines<R: BufRead>(
    g: &Grammar,
    analysis: &Analysis,
    kind: ParserKind,
    lines: &mut io::Lines<R>,
) -> anyhow::Result<()> {
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        println!("{}", yes_no(check(g, analysis, kind, &line)));
    }
    Ok(())
}

fn interactive(g: &Grammar, analysis: &Analysis) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    match analysis.classification() {
        Classification::Neither => println!("Grammar is neither LL(1) nor SLR(1)."),
        Classification::LL1 => {
            println!("Grammar is LL(1).");
            check_lines(g, analysis, ParserKind::LL1, &mut lines)?;
        }
        Classification::SLR1 => {
            println!("Grammar is SLR(1).");
            check_lines(g, analysis, ParserKind::SLR1, &mut lines)?;
        }
        Classification::Both => loop {
            print!("Select a parser (T: for LL(1), B: for SLR(1), Q: quit): ");
            io::stdout().flush()?;
            let choice = match lines.next() {
                Some(line) => line?,
                None => break,
            };
            match choice.trim() {
                "T" | "t" => check_lines(g, analysis, ParserKind::LL1, &mut lines)?,
                "B" | "b" => check_lines(g, analysis, ParserKind::SLR1, &mut lines)?,
                "Q" | "q" => break,
                other => println!("Unknown option {:?}", other),
            }
        },
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let output_format = if args.latex {
        OutputFormat::LaTeX
    } else if args.json {
        OutputFormat::JSON
    } else {
        OutputFormat::Plain
    };

    let input = read_grammar(args.grammar.as_deref())?;
    let g = Grammar::parse(&input).context("invalid grammar")?;
    let analysis = g.analyze()?;

    print_outputs(&g, &analysis, &args.outputs, &output_format)?;

    if !args.strings.is_empty() {
        let kinds: Vec<(ParserKind, &str)> =
            [(ParserKind::LL1, "LL(1)"), (ParserKind::SLR1, "SLR(1)")]
                .into_iter()
                .filter(|(kind, _)| analysis.supports(*kind))
                .collect();
        if kinds.is_empty() {
            println!("Grammar is neither LL(1) nor SLR(1).");
        }
        for s in &args.strings {
            for (kind, name) in &kinds {
                let accepted = check(&g, &analysis, *kind, s);
                println!("{} {:?}: {}", name, s, yes_no(accepted));
            }
        }
    }

    if args.interactive {
        interactive(&g, &analysis)?;
    } else if args.outputs.is_empty() && args.strings.is_empty() {
        let verdict = match analysis.classification() {
            Classification::Both => "Grammar is LL(1) and SLR(1).",
            Classification::LL1 => "Grammar is LL(1).",
            Classification::SLR1 => "Grammar is SLR(1).",
            Classification::Neither => "Grammar is neither LL(1) nor SLR(1).",
        };
        println!("{}", verdict);
    }

    Ok(())
}
