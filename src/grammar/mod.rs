pub mod analysis;
pub mod first_follow;
pub mod grammar;
pub mod ll1_parser;
pub mod ll1_parsing_table;
pub mod lr0_fsm;
pub mod parse;
pub mod pretty_print;
pub mod slr1_parser;
pub mod slr1_parsing_table;
pub use grammar::{Grammar, Symbol};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";
/// How the loader spells ε in grammar text.
pub const EPSILON_ALIAS: &str = "e";
