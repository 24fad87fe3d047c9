//! Tokenizes and parses the regex surface syntax described in the
//! [module docs](super), producing a [Regex].
//!
//! Parsing happens in three passes: [tokenize] turns the raw text into a flat
//! list of [Token]s (atoms, `(`, `)`, `|`, `*`), [insert_concat] walks that
//! list and inserts an explicit [Token::Concat] wherever two tokens are
//! juxtaposed with nothing between them, and [shunting_yard] then runs a
//! textbook shunting-yard algorithm over the result to build the tree.
use super::{Regex, RegexTree};
use nom::character::complete::{anychar, char as nomchar};
use nom::combinator::value;
use nom::multi::many0;
use nom::sequence::preceded;
use nom::IResult;
use std::rc::Rc;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// Characters with special meaning in the surface syntax; all must be
/// escaped with `\` to match literally.
const RESERVED: [char; 7] = ['(', ')', '∅', 'e', '|', '*', '\\'];

fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Atom(RegexTree),
    LParen,
    RParen,
    Union,
    Star,
    Concat,
}

/// Errors raised while parsing a regex.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// The text isn't a well-formed regular expression.
    #[error("invalid regular expression: {0}")]
    InvalidExpression(String),
}

/// Parses `input` as a regular expression.
///
/// ```
/// use langkit::regex::parser;
///
/// let regex = parser::regex("a(b|c)*").unwrap();
/// let nfa = regex.to_nfa();
/// assert!(nfa.accepts_graphemes("abcbc"));
/// assert!(!nfa.accepts_graphemes("bc"));
/// ```
pub fn regex(input: &str) -> Result<Regex, RegexError> {
    let trimmed = input.trim();
    let (rest, tokens) = tokenize(trimmed)
        .map_err(|e| RegexError::InvalidExpression(format!("could not tokenize: {e}")))?;
    if !rest.is_empty() {
        return Err(RegexError::InvalidExpression(format!(
            "unexpected trailing input: {rest:?}"
        )));
    }
    let tokens = insert_concat(tokens);
    let tree = shunting_yard(tokens)?;
    Ok(Regex { tree })
}

fn tokenize(input: &str) -> IResult<&str, Vec<Token>> {
    many0(token)(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    nom::branch::alt((
        value(Token::LParen, nomchar('(')),
        value(Token::RParen, nomchar(')')),
        value(Token::Union, nomchar('|')),
        value(Token::Star, nomchar('*')),
        value(Token::Atom(RegexTree::Union(vec![])), nomchar('∅')),
        value(Token::Atom(RegexTree::Empty), nomchar('e')),
        nom::combinator::map(preceded(nomchar('\\'), anychar), |c| {
            Token::Atom(RegexTree::Leaf(Rc::from(c.to_string())))
        }),
        nom::combinator::map(none_of_reserved, |s: &str| {
            Token::Atom(RegexTree::Leaf(Rc::from(s)))
        }),
    ))(input)
}

/// Consumes exactly one grapheme cluster that isn't a reserved character.
fn none_of_reserved(input: &str) -> IResult<&str, &str> {
    let mut graphemes = input.grapheme_indices(true);
    match graphemes.next() {
        Some((_, g)) if !(g.chars().count() == 1 && is_reserved(g.chars().next().unwrap())) => {
            let len = g.len();
            Ok((&input[len..], &input[..len]))
        }
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        ))),
    }
}

/// Returns true if a token can end an expression fragment (can appear on the
/// left of an implicit concatenation).
fn ends_fragment(t: &Token) -> bool {
    matches!(t, Token::Atom(_) | Token::RParen | Token::Star)
}

/// Returns true if a token can begin an expression fragment (can appear on
/// the right of an implicit concatenation).
fn starts_fragment(t: &Token) -> bool {
    matches!(t, Token::Atom(_) | Token::LParen)
}

fn insert_concat(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() * 2);
    let mut iter = tokens.into_iter().peekable();
    while let Some(tok) = iter.next() {
        let needs_concat = match iter.peek() {
            Some(next) => ends_fragment(&tok) && starts_fragment(next),
            None => false,
        };
        out.push(tok);
        if needs_concat {
            out.push(Token::Concat);
        }
    }
    out
}

fn precedence(t: &Token) -> i32 {
    match t {
        Token::Star => 2,
        Token::Concat => 1,
        Token::Union => 0,
        Token::LParen => -1,
        _ => unreachable!("precedence only queried for operators"),
    }
}

fn apply(op: Token, output: &mut Vec<RegexTree>) -> Result<(), RegexError> {
    match op {
        Token::Star => {
            let child = output
                .pop()
                .ok_or_else(|| RegexError::InvalidExpression("'*' has no operand".into()))?;
            output.push(RegexTree::Star(Box::new(child)));
        }
        Token::Concat => {
            let rhs = output.pop().ok_or_else(|| {
                RegexError::InvalidExpression("concatenation is missing an operand".into())
            })?;
            let lhs = output.pop().ok_or_else(|| {
                RegexError::InvalidExpression("concatenation is missing an operand".into())
            })?;
            let children = match lhs {
                RegexTree::Concat(mut v) => {
                    v.push(rhs);
                    v
                }
                other => vec![other, rhs],
            };
            output.push(RegexTree::Concat(children));
        }
        Token::Union => {
            let rhs = output
                .pop()
                .ok_or_else(|| RegexError::InvalidExpression("'|' is missing an operand".into()))?;
            let lhs = output
                .pop()
                .ok_or_else(|| RegexError::InvalidExpression("'|' is missing an operand".into()))?;
            let children = match lhs {
                RegexTree::Union(mut v) => {
                    v.push(rhs);
                    v
                }
                other => vec![other, rhs],
            };
            output.push(RegexTree::Union(children));
        }
        _ => unreachable!("apply only called for binary/unary operators"),
    }
    Ok(())
}

fn shunting_yard(tokens: Vec<Token>) -> Result<RegexTree, RegexError> {
    let mut operators: Vec<Token> = Vec::new();
    let mut output: Vec<RegexTree> = Vec::new();

    for tok in tokens {
        match tok {
            Token::Atom(tree) => output.push(tree),
            Token::LParen => operators.push(Token::LParen),
            Token::RParen => {
                loop {
                    match operators.pop() {
                        Some(Token::LParen) => break,
                        Some(op) => apply(op, &mut output)?,
                        None => {
                            return Err(RegexError::InvalidExpression(
                                "unmatched ')'".to_string(),
                            ))
                        }
                    }
                }
            }
            op => {
                let p = precedence(&op);
                while let Some(top) = operators.last() {
                    if matches!(top, Token::LParen) || precedence(top) < p {
                        break;
                    }
                    let top = operators.pop().unwrap();
                    apply(top, &mut output)?;
                }
                operators.push(op);
            }
        }
    }

    while let Some(op) = operators.pop() {
        if matches!(op, Token::LParen) {
            return Err(RegexError::InvalidExpression("unmatched '('".to_string()));
        }
        apply(op, &mut output)?;
    }

    if output.len() != 1 {
        return Err(RegexError::InvalidExpression(
            "expression doesn't reduce to a single tree".to_string(),
        ));
    }
    Ok(output.pop().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literal_concatenation() {
        let r = regex("ab").unwrap();
        assert_eq!(
            r.tree,
            RegexTree::Concat(vec![
                RegexTree::Leaf(Rc::from("a")),
                RegexTree::Leaf(Rc::from("b")),
            ])
        );
    }

    #[test]
    fn parses_union() {
        let r = regex("a|b").unwrap();
        assert_eq!(
            r.tree,
            RegexTree::Union(vec![
                RegexTree::Leaf(Rc::from("a")),
                RegexTree::Leaf(Rc::from("b")),
            ])
        );
    }

    #[test]
    fn star_binds_tighter_than_concat_and_union() {
        let r = regex("ab*|c").unwrap();
        assert_eq!(
            r.tree,
            RegexTree::Union(vec![
                RegexTree::Concat(vec![
                    RegexTree::Leaf(Rc::from("a")),
                    RegexTree::Star(Box::new(RegexTree::Leaf(Rc::from("b")))),
                ]),
                RegexTree::Leaf(Rc::from("c")),
            ])
        );
    }

    #[test]
    fn empty_set_and_empty_string_atoms() {
        assert_eq!(regex("e").unwrap().tree, RegexTree::Empty);
        assert_eq!(regex("∅").unwrap().tree, RegexTree::Union(vec![]));
    }

    #[test]
    fn escaped_reserved_char_is_literal() {
        let r = regex("\\(").unwrap();
        assert_eq!(r.tree, RegexTree::Leaf(Rc::from("(")));
    }

    #[test]
    fn unmatched_paren_is_rejected() {
        assert!(regex("(a").is_err());
        assert!(regex("a)").is_err());
    }

    #[test]
    fn accepts_expected_language() {
        let nfa = regex("(ab)*").unwrap().to_nfa();
        for word in ["", "ab", "abab", "ababab"] {
            assert!(nfa.accepts_graphemes(word), "should accept {word:?}");
        }
        for word in ["a", "aba", "abb"] {
            assert!(!nfa.accepts_graphemes(word), "should reject {word:?}");
        }
    }

    #[test]
    fn zero_or_one_via_union_with_epsilon() {
        let nfa = regex("0*1(0|e)").unwrap().to_nfa();
        for word in ["1", "10", "01", "0001"] {
            assert!(nfa.accepts_graphemes(word), "should accept {word:?}");
        }
        assert!(!nfa.accepts_graphemes("11"));
        assert!(!nfa.accepts_graphemes(""));
    }
}
