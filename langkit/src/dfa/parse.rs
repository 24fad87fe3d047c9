//! Parser for the §6 DFA spec file format.
//!
//! ```text
//! numStates
//! <alphabet, written as a raw run of characters>
//! <numStates * |alphabet| lines of "from 'sym' to">
//! <start state>
//! <space-separated accept states, possibly empty>
//! ```
//!
//! States are written as 1-based integers; [dfa] parses the file into a
//! [ParsedDfa] and [Dfa::try_from] validates it into a dense, total [Dfa].
use crate::dfa::{Dfa, DfaState};
use nom::character::complete::{char as nomchar, digit1, line_ending, none_of, space0, space1};
use nom::combinator::{map, map_res, opt};
use nom::multi::{many0, many1, separated_list0};
use nom::sequence::{delimited, terminated, tuple};
use nom::IResult;
use std::rc::Rc;
use thiserror::Error;

/// One `from 'sym' to` line of a DFA spec file, still in raw 1-based form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDfaTransition {
    pub from: usize,
    pub symbol: char,
    pub to: usize,
}

/// The result of [dfa], prior to validation into a [Dfa].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDfa {
    pub num_states: usize,
    pub alphabet: Vec<char>,
    pub transitions: Vec<ParsedDfaTransition>,
    pub start_state: usize,
    pub accept_states: Vec<usize>,
}

/// Errors raised while validating a [ParsedDfa] into a [Dfa].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DfaFileError {
    #[error("'{0}' appears twice in the alphabet")]
    DuplicateAlphabetSymbol(char),
    #[error("state {0} is out of range (there are {1} states)")]
    StateOutOfRange(usize, usize),
    #[error("expected {0} transitions (numStates * |alphabet|), found {1}")]
    WrongNumberOfTransitions(usize, usize),
    #[error("transition from state {0} on '{1}' is defined more than once")]
    DuplicateTransition(usize, char),
    #[error("state {0} has no transition defined for '{1}'")]
    MissingTransition(usize, char),
}

/// Parses the textual DFA spec file format. Doesn't validate state bounds or
/// transition totality; see [Dfa::try_from].
pub fn dfa(input: &str) -> IResult<&str, ParsedDfa> {
    let (input, num_states) = terminated(number, line_ending)(input)?;
    let (input, alphabet) = terminated(many1(none_of("\r\n")), line_ending)(input)?;
    let (input, transitions) =
        many0(terminated(transition_line, line_ending))(input)?;
    let (input, start_state) = terminated(number, opt(line_ending))(input)?;
    let (input, accept_states) = opt_accept_line(input)?;
    Ok((
        input,
        ParsedDfa {
            num_states,
            alphabet,
            transitions,
            start_state,
            accept_states,
        },
    ))
}

fn opt_accept_line(input: &str) -> IResult<&str, Vec<usize>> {
    separated_list0(space1, number)(input)
}

fn transition_line(input: &str) -> IResult<&str, ParsedDfaTransition> {
    map(
        tuple((
            delimited(space0, number, space1),
            delimited(nomchar('\''), none_of("'"), nomchar('\'')),
            delimited(space1, number, space0),
        )),
        |(from, symbol, to)| ParsedDfaTransition { from, symbol, to },
    )(input)
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

impl TryFrom<ParsedDfa> for Dfa {
    type Error = DfaFileError;

    fn try_from(value: ParsedDfa) -> Result<Self, Self::Error> {
        use DfaFileError::*;
        let ParsedDfa {
            num_states,
            alphabet,
            transitions,
            start_state,
            accept_states,
        } = value;

        {
            let mut seen = std::collections::HashSet::new();
            for &c in &alphabet {
                if !seen.insert(c) {
                    return Err(DuplicateAlphabetSymbol(c));
                }
            }
        }

        let check_state = |s: usize| -> Result<usize, DfaFileError> {
            if s == 0 || s > num_states {
                Err(StateOutOfRange(s, num_states))
            } else {
                Ok(s - 1)
            }
        };

        if transitions.len() != num_states * alphabet.len() {
            return Err(WrongNumberOfTransitions(
                num_states * alphabet.len(),
                transitions.len(),
            ));
        }

        let mut table = vec![vec![None; alphabet.len()]; num_states];
        for t in &transitions {
            let from = check_state(t.from)?;
            let to = check_state(t.to)?;
            let col = alphabet
                .iter()
                .position(|&c| c == t.symbol)
                .ok_or(MissingTransition(t.from, t.symbol))?;
            if table[from][col].is_some() {
                return Err(DuplicateTransition(t.from, t.symbol));
            }
            table[from][col] = Some(to);
        }

        let mut states = Vec::with_capacity(num_states);
        let accept_set: std::collections::HashSet<usize> = accept_states
            .iter()
            .map(|&s| check_state(s))
            .collect::<Result<_, _>>()?;
        let start = check_state(start_state)?;

        for (idx, row) in table.into_iter().enumerate() {
            let mut resolved = Vec::with_capacity(alphabet.len());
            for (col, cell) in row.into_iter().enumerate() {
                resolved.push(cell.ok_or(MissingTransition(idx + 1, alphabet[col]))?);
            }
            states.push(DfaState {
                name: Rc::from(format!("{}", idx + 1)),
                initial: idx == start,
                accepting: accept_set.contains(&idx),
                transitions: resolved,
            });
        }

        Ok(Dfa {
            alphabet: alphabet.iter().map(|c| Rc::from(c.to_string())).collect(),
            states,
            initial_state: start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_dfa() {
        let text = "2\nab\n1 'a' 2\n1 'b' 1\n2 'a' 2\n2 'b' 1\n1\n2";
        let (rest, parsed) = dfa(text).unwrap();
        assert!(rest.is_empty());
        let dfa: Dfa = parsed.try_into().unwrap();
        assert_eq!(dfa.states().len(), 2);
        assert_eq!(dfa.simulate(&["a"]), Ok(true));
        assert_eq!(dfa.simulate(&["b"]), Ok(false));
    }

    #[test]
    fn empty_accept_line_is_allowed() {
        let text = "1\na\n1 'a' 1\n1\n";
        let (_, parsed) = dfa(text).unwrap();
        let dfa: Dfa = parsed.try_into().unwrap();
        assert!(dfa.states().iter().all(|s| !s.is_accepting()));
    }

    #[test]
    fn rejects_duplicate_alphabet_symbol() {
        let text = "1\naa\n1 'a' 1\n1\n1";
        let (_, parsed) = dfa(text).unwrap();
        let result: Result<Dfa, _> = parsed.try_into();
        assert_eq!(result, Err(DfaFileError::DuplicateAlphabetSymbol('a')));
    }
}
