//! # langkit-lr
//!
//! SLR(1) parser generation and a driven parser on top of it (§4.5): read a
//! grammar file ([grammar]), compute FIRST/FOLLOW sets ([first_follow]),
//! build the canonical collection and its action/goto tables ([table]), then
//! drive a token stream ([langkit::lexer::Scanner]) through that table
//! ([driver]) to produce a parse tree ([tree]).
//!
//! ```
//! use langkit::lexer::{self, parse as lexer_parse};
//! use langkit_lr::{driver, first_follow::FirstFollow, grammar, table::Table};
//!
//! let (_, parsed_lexer) = lexer_parse::token_spec("\"ab\"\na \"a\"\nb \"b\"\n").unwrap();
//! let lexer = lexer::Lexer::compile(parsed_lexer).unwrap();
//!
//! let (_, parsed_grammar) = grammar::grammar_file("a b\n%%\nS : A B\nA : a\nB : b\n").unwrap();
//! let grammar: grammar::Grammar = parsed_grammar.try_into().unwrap();
//! let first_follow = FirstFollow::compute(&grammar);
//! let table = Table::build(&grammar, &first_follow).unwrap();
//!
//! let mut scanner = lexer.scan("a b");
//! let tree = driver::parse(&grammar, &table, &mut scanner).unwrap();
//! let labels: Vec<&str> = tree.preorder().iter().map(|s| s.as_ref()).collect();
//! assert_eq!(labels, vec!["S", "A", "a", "B", "b"]);
//! ```
pub mod driver;
pub mod first_follow;
pub mod grammar;
pub mod table;
pub mod tree;

pub use driver::ParseError;
pub use first_follow::FirstFollow;
pub use grammar::{Grammar, GrammarFileError};
pub use table::{Table, TableError};
pub use tree::Node;
