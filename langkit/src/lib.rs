//! # langkit
//!
//! `langkit` compiles regular expressions down through NFAs to DFAs, and
//! compiles a list of named token classes into a maximal-munch lexer, all
//! driven by small text file formats.
//!
//! ## Usage
//!
//! ```rust
//! use langkit::dfa::Dfa;
//!
//! fn main() {
//!     let raw_dfa = "3\nabc\n\
//!         1 'a' 2\n1 'b' 1\n1 'c' 3\n\
//!         2 'a' 2\n2 'b' 2\n2 'c' 2\n\
//!         3 'a' 3\n3 'b' 3\n3 'c' 3\n\
//!         1\n1 3";
//!     // First pass parses without checking validity of the DFA
//!     let (_, parsed_dfa) = langkit::dfa::parse::dfa(raw_dfa).unwrap();
//!     // Second step checks the existence of all mentioned states and
//!     // the existence of an initial state
//!     let dfa: Dfa = parsed_dfa.try_into().unwrap();
//!     assert!(dfa.simulate(&["a", "b", "c", "c", "a"]) == Ok(true));
//!     assert!(dfa.simulate(&["c", "b", "a"]) == Ok(true));
//!     assert!(dfa.simulate(&["b", "b"]) == Ok(false));
//! }
//! ```
//!
//! ## Modules
//!
//! * [dfa] — deterministic finite automata: a dense, total transition table,
//!   [simulation](dfa::Dfa::simulate), and [file parsing](dfa::parse).
//! * [nfa] — nondeterministic finite automata with ε-moves, subset
//!   construction ([nfa::Nfa::to_dfa]), and [file parsing](nfa::parse).
//! * [regex] — a regex syntax tree, a shunting-yard compiler
//!   ([regex::parser]), and Thompson construction to NFA ([regex::Regex::to_nfa]).
//! * [lexer] — compiles an ordered list of `(class name, regex)` pairs into a
//!   maximal-munch scanner over a source string.
//!
//! ## Operations
//!
//! This library supports:
//!
//! * [Parsing](dfa::parse::dfa) and validating DFAs, and the same for
//!   [NFAs](nfa::parse::nfa) (with and without epsilon moves)
//! * Generating a file suitable for re-parsing of [DFAs](dfa::Dfa::to_table)
//!   and [NFAs](nfa::Nfa::to_table)
//! * Converting [DFAs to NFAs](dfa::Dfa::to_nfa), and [NFAs to DFAs](nfa::Nfa::to_dfa)
//! * [Checking whether two DFAs or two NFAs are equivalent](dfa::Dfa::equivalent_to)
//! * Checking if a string is accepted by a [DFA](dfa::Dfa::simulate) or [NFA](nfa::Nfa::accepts)
//! * [Step-by-step evaluation of a string](dfa::Dfa::evaluator)
//! * [Identifying and removing unreachable states from a DFA](dfa::Dfa::unreachable_states)
//! * [Identifying and merging non-distinguishable states from a DFA](dfa::Dfa::state_equivalence_classes)
//! * [Minimizing a DFA](dfa::Dfa::minimize) (by executing the two above-mentioned steps)
//! * [Parsing regular expressions](regex::parser) and [compiling them to NFAs](regex::Regex::to_nfa)
//! * [Compiling and running a maximal-munch lexer](lexer::Lexer)

pub mod dfa;
pub mod lexer;
pub mod nfa;
pub mod regex;
mod util;

#[cfg(test)]
mod tests;
