//! Parser for the §6 token-spec file format.
//!
//! ```text
//! "<alphabet, as a raw run of characters>"
//! CLASS_NAME "<regex>"
//! CLASS_NAME "<regex>"
//! ...
//! ```
//!
//! Classes are compiled to DFAs in the order they're declared — that order
//! is the lexer's maximal-munch tie-break, so [token_spec] preserves it.
use crate::lexer::Lexer;
use crate::regex::parser::{self, RegexError};
use nom::character::complete::{char as nomchar, line_ending, none_of, space1};
use nom::combinator::{map, opt, recognize};
use nom::multi::many0;
use nom::sequence::{delimited, terminated, tuple};
use nom::IResult;
use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

/// One `CLASS_NAME "regex"` declaration, still as raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTokenClass {
    pub name: String,
    pub regex: String,
}

/// The result of [token_spec], prior to compiling each class's regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTokenSpec {
    pub alphabet: Vec<char>,
    pub classes: Vec<ParsedTokenClass>,
}

/// Errors raised while compiling a [ParsedTokenSpec] into a [Lexer].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenSpecError {
    #[error("token class {0:?} is declared more than once")]
    DuplicateClassName(String),
    #[error("token class {0:?}'s regex is invalid: {1}")]
    InvalidRegex(String, RegexError),
}

/// Parses the textual token-spec file format. Doesn't compile the regexes or
/// check for duplicate class names; see [Lexer::compile].
pub fn token_spec(input: &str) -> IResult<&str, ParsedTokenSpec> {
    let (input, alphabet) = terminated(quoted, opt(line_ending))(input)?;
    let (input, classes) = many0(terminated(class_line, opt(line_ending)))(input)?;
    Ok((
        input,
        ParsedTokenSpec {
            alphabet: alphabet.chars().collect(),
            classes,
        },
    ))
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(nomchar('"'), recognize(many0(none_of("\""))), nomchar('"'))(input)
}

fn class_line(input: &str) -> IResult<&str, ParsedTokenClass> {
    map(
        tuple((
            nom::bytes::complete::take_while1(|c: char| !c.is_whitespace()),
            space1,
            quoted,
        )),
        |(name, _, regex): (&str, &str, &str)| ParsedTokenClass {
            name: name.to_string(),
            regex: regex.to_string(),
        },
    )(input)
}

impl Lexer {
    /// Validates a [ParsedTokenSpec] and compiles each class's regex to a
    /// DFA (§4.4: C3 → C2 → C1), in declaration order.
    pub fn compile(spec: ParsedTokenSpec) -> Result<Lexer, TokenSpecError> {
        let mut seen = HashSet::new();
        let mut classes = Vec::with_capacity(spec.classes.len());
        for class in spec.classes {
            if !seen.insert(class.name.clone()) {
                return Err(TokenSpecError::DuplicateClassName(class.name));
            }
            let regex = parser::regex(&class.regex)
                .map_err(|e| TokenSpecError::InvalidRegex(class.name.clone(), e))?;
            let mut dfa = regex.to_nfa().to_dfa();
            dfa.minimize();
            classes.push((class.name.into(), dfa));
        }
        Ok(Lexer {
            alphabet: spec.alphabet.iter().map(|c| Rc::from(c.to_string())).collect(),
            classes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_spec() {
        let text = "\"abc\"\nA \"a\"\nB \"b\"\nAB \"(a|b)(a|b)*\"\n";
        let (rest, parsed) = token_spec(text).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed.alphabet, vec!['a', 'b', 'c']);
        assert_eq!(parsed.classes.len(), 3);
        assert_eq!(parsed.classes[0].name, "A");
        assert_eq!(parsed.classes[2].regex, "(a|b)(a|b)*");
    }

    #[test]
    fn rejects_duplicate_class_name() {
        let text = "\"ab\"\nA \"a\"\nA \"b\"\n";
        let (_, parsed) = token_spec(text).unwrap();
        let result = Lexer::compile(parsed);
        assert_eq!(
            result,
            Err(TokenSpecError::DuplicateClassName("A".to_string()))
        );
    }
}
