//! Shift/reduce driver (§4.5.5): walks a token stream against a [Table],
//! building a [Node] parse tree.
use crate::grammar::Grammar;
use crate::table::{Action, Table};
use crate::tree::Node;
use langkit::lexer::{LexError, Scanner, Token, END_OF_INPUT};
use std::rc::Rc;
use thiserror::Error;

/// Errors raised while driving a token stream through a [Table].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("unexpected {found} token {lexeme:?} in state {state} (no shift, reduce or accept applies)")]
    SourceFileSyntaxError {
        state: usize,
        found: String,
        lexeme: String,
    },
}

/// One driver-stack entry: the state reached, and the subtree that pushed us
/// there (`None` only for the initial entry, which is never popped).
struct Entry {
    state: usize,
    node: Option<Node>,
}

fn next_driver_token(scanner: &mut Scanner) -> Result<(Rc<str>, String), ParseError> {
    match scanner.next_token()? {
        Some(Token { class, lexeme }) => Ok((class, lexeme)),
        None => Ok((Rc::from(END_OF_INPUT), String::new())),
    }
}

/// Drives `scanner`'s token stream against `table`, producing the parse tree
/// rooted at the grammar's start symbol (§4.5.5). The ε-rule escape hatch:
/// if no table action applies but the current state contains an item for an
/// ε-rule, that rule is reduced unconditionally regardless of lookahead —
/// this is a known imprecision carried over from the reference driver rather
/// than a real SLR(1) action, preserved deliberately (see the ε-rule Open
/// Question resolution).
pub fn parse(grammar: &Grammar, table: &Table, scanner: &mut Scanner) -> Result<Node, ParseError> {
    let mut stack = vec![Entry {
        state: 0,
        node: None,
    }];
    let (mut class, mut lexeme) = next_driver_token(scanner)?;

    loop {
        let state = stack.last().unwrap().state;
        let action = table.states[state].action.get(class.as_ref()).copied();

        let action = match action {
            Some(action) => action,
            None => match eps_rule_in_state(grammar, table, state) {
                Some(rule_id) => Action::Reduce(rule_id),
                None => {
                    return Err(ParseError::SourceFileSyntaxError {
                        state,
                        found: class.to_string(),
                        lexeme,
                    })
                }
            },
        };

        match action {
            Action::Shift(target) => {
                stack.push(Entry {
                    state: target,
                    node: Some(Node::leaf(class.clone())),
                });
                (class, lexeme) = next_driver_token(scanner)?;
            }
            Action::Reduce(rule_id) => {
                let rule = &grammar.rules[rule_id];
                let children = if rule.rhs.is_empty() {
                    vec![Node::leaf(Rc::from(crate::grammar::EPS_KEYWORD))]
                } else {
                    let mut popped = Vec::with_capacity(rule.rhs.len());
                    for _ in 0..rule.rhs.len() {
                        popped.push(stack.pop().unwrap().node.unwrap());
                    }
                    popped.reverse();
                    popped
                };
                let below = stack.last().unwrap().state;
                let target = table.states[below].goto[&rule.lhs];
                stack.push(Entry {
                    state: target,
                    node: Some(Node::new(rule.lhs.clone(), children)),
                });
            }
            Action::Accept => {
                return Ok(stack.pop().unwrap().node.unwrap());
            }
        }
    }
}

fn eps_rule_in_state(grammar: &Grammar, table: &Table, state: usize) -> Option<usize> {
    table.states[state]
        .items
        .iter()
        .map(|item| item.rule_id)
        .find(|&rule_id| grammar.rules[rule_id].rhs.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first_follow::FirstFollow;
    use crate::grammar::grammar_file;
    use langkit::lexer::parse::token_spec;
    use langkit::lexer::Lexer;

    fn build(lexer_spec: &str, grammar_spec: &str) -> (Grammar, Table, Lexer) {
        let (_, parsed_lexer) = token_spec(lexer_spec).unwrap();
        let lexer = Lexer::compile(parsed_lexer).unwrap();
        let (_, parsed_grammar) = grammar_file(grammar_spec).unwrap();
        let grammar: Grammar = parsed_grammar.try_into().unwrap();
        let ff = FirstFollow::compute(&grammar);
        let table = Table::build(&grammar, &ff).unwrap();
        (grammar, table, lexer)
    }

    #[test]
    fn concatenation_grammar_parses_to_expected_tree() {
        let (grammar, table, lexer) =
            build("\"ab\"\na \"a\"\nb \"b\"\n", "a b\n%%\nS : A B\nA : a\nB : b\n");
        let mut scanner = lexer.scan("a b");
        let tree = parse(&grammar, &table, &mut scanner).unwrap();
        let labels: Vec<&str> = tree.preorder().iter().map(|s| s.as_ref()).collect();
        assert_eq!(labels, vec!["S", "A", "a", "B", "b"]);
    }

    #[test]
    fn eps_recursive_grammar_parses_empty_input() {
        let (grammar, table, lexer) = build(
            "\"ab\"\na \"a\"\nb \"b\"\n",
            "a b\n%%\nS : a S b\nS : eps\n",
        );
        let mut scanner = lexer.scan("");
        let tree = parse(&grammar, &table, &mut scanner).unwrap();
        let labels: Vec<&str> = tree.preorder().iter().map(|s| s.as_ref()).collect();
        assert_eq!(labels, vec!["S", "eps"]);
    }

    #[test]
    fn eps_recursive_grammar_parses_balanced_pair() {
        let (grammar, table, lexer) = build(
            "\"ab\"\na \"a\"\nb \"b\"\n",
            "a b\n%%\nS : a S b\nS : eps\n",
        );
        let mut scanner = lexer.scan("a b");
        let tree = parse(&grammar, &table, &mut scanner).unwrap();
        let labels: Vec<&str> = tree.preorder().iter().map(|s| s.as_ref()).collect();
        assert_eq!(labels, vec!["S", "a", "S", "eps", "b"]);
    }

    #[test]
    fn unbalanced_input_is_a_syntax_error() {
        let (grammar, table, lexer) = build(
            "\"ab\"\na \"a\"\nb \"b\"\n",
            "a b\n%%\nS : a S b\nS : eps\n",
        );
        let mut scanner = lexer.scan("a a b");
        let result = parse(&grammar, &table, &mut scanner);
        assert!(matches!(
            result,
            Err(ParseError::SourceFileSyntaxError { .. })
        ));
    }
}
