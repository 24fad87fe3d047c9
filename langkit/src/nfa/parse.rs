//! Parser for the §6 NFA spec file format.
//!
//! ```text
//! numStates
//! <alphabet, written as a raw run of characters>
//! <blank-line-terminated block of "from 'sym' to" lines, 'e' spelling ε>
//!
//! <space-separated start states>
//! <space-separated accept states, possibly empty>
//! ```
//!
//! [nfa] parses the file into a [ParsedNfa] and [Nfa::try_from] validates it.
//! If the start-state line names more than one state, a synthetic state is
//! added with ε-edges to each of them — the same technique [Nfa::union] uses
//! to join two automata's initial states.
use crate::nfa::{Nfa, NfaState};
use nom::character::complete::{char as nomchar, digit1, line_ending, none_of, space0, space1};
use nom::combinator::{map, map_res, opt};
use nom::multi::{many0, separated_list0};
use nom::sequence::{delimited, terminated, tuple};
use nom::IResult;
use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

/// One `from 'sym' to` line of an NFA spec file, still in raw 1-based form. `symbol` is `None` for ε.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedNfaTransition {
    pub from: usize,
    pub symbol: Option<char>,
    pub to: usize,
}

/// The result of [nfa], prior to validation into an [Nfa].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNfa {
    pub num_states: usize,
    pub alphabet: Vec<char>,
    pub transitions: Vec<ParsedNfaTransition>,
    pub start_states: Vec<usize>,
    pub accept_states: Vec<usize>,
}

/// Errors raised while validating a [ParsedNfa] into an [Nfa].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NfaFileError {
    #[error("'{0}' appears twice in the alphabet")]
    DuplicateAlphabetSymbol(char),
    #[error("state {0} is out of range (there are {1} states)")]
    StateOutOfRange(usize, usize),
    #[error("there must be at least one start state")]
    MissingStartState,
    #[error("transition on '{0}' uses a symbol outside the declared alphabet")]
    UnknownSymbol(char),
}

/// Parses the textual NFA spec file format. Doesn't validate state bounds;
/// see [Nfa::try_from].
pub fn nfa(input: &str) -> IResult<&str, ParsedNfa> {
    let (input, num_states) = terminated(number, line_ending)(input)?;
    let (input, alphabet) = terminated(many0(none_of("\r\n")), line_ending)(input)?;
    let (input, transitions) = many0(terminated(transition_line, line_ending))(input)?;
    let (input, _) = opt(line_ending)(input)?;
    let (input, start_states) = terminated(separated_list0(space1, number), opt(line_ending))(input)?;
    let (input, accept_states) = separated_list0(space1, number)(input)?;
    Ok((
        input,
        ParsedNfa {
            num_states,
            alphabet,
            transitions,
            start_states,
            accept_states,
        },
    ))
}

fn transition_line(input: &str) -> IResult<&str, ParsedNfaTransition> {
    map(
        tuple((
            delimited(space0, number, space1),
            delimited(nomchar('\''), none_of("'"), nomchar('\'')),
            delimited(space1, number, space0),
        )),
        |(from, symbol, to)| ParsedNfaTransition {
            from,
            symbol: (symbol != 'e').then_some(symbol),
            to,
        },
    )(input)
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

impl TryFrom<ParsedNfa> for Nfa {
    type Error = NfaFileError;

    fn try_from(value: ParsedNfa) -> Result<Self, Self::Error> {
        use NfaFileError::*;
        let ParsedNfa {
            num_states,
            alphabet,
            transitions,
            start_states,
            accept_states,
        } = value;

        {
            let mut seen = HashSet::new();
            for &c in &alphabet {
                if !seen.insert(c) {
                    return Err(DuplicateAlphabetSymbol(c));
                }
            }
        }

        if start_states.is_empty() {
            return Err(MissingStartState);
        }

        let check_state = |s: usize| -> Result<usize, NfaFileError> {
            if s == 0 || s > num_states {
                Err(StateOutOfRange(s, num_states))
            } else {
                Ok(s - 1)
            }
        };

        let accept_set: HashSet<usize> = accept_states
            .iter()
            .map(|&s| check_state(s))
            .collect::<Result<_, _>>()?;
        let start_set: Vec<usize> = start_states
            .iter()
            .map(|&s| check_state(s))
            .collect::<Result<_, _>>()?;

        let mut epsilon_transitions = vec![Vec::new(); num_states];
        let mut transition_table = vec![vec![Vec::new(); alphabet.len()]; num_states];
        for t in &transitions {
            let from = check_state(t.from)?;
            let to = check_state(t.to)?;
            match t.symbol {
                None => epsilon_transitions[from].push(to),
                Some(sym) => {
                    let col = alphabet
                        .iter()
                        .position(|&c| c == sym)
                        .ok_or(UnknownSymbol(sym))?;
                    transition_table[from][col].push(to);
                }
            }
        }

        let mut states: Vec<NfaState> = (0..num_states)
            .map(|idx| NfaState {
                name: Rc::from(format!("{}", idx + 1)),
                initial: start_set.len() == 1 && start_set[0] == idx,
                accepting: accept_set.contains(&idx),
                epsilon_transitions: std::mem::take(&mut epsilon_transitions[idx]),
                transitions: std::mem::take(&mut transition_table[idx]),
            })
            .collect();

        let initial_state = if start_set.len() == 1 {
            start_set[0]
        } else {
            let new_idx = states.len();
            states.push(NfaState {
                name: Rc::from(format!("{}", new_idx + 1)),
                initial: true,
                accepting: false,
                epsilon_transitions: start_set,
                transitions: vec![Vec::new(); alphabet.len()],
            });
            new_idx
        };

        Ok(Nfa {
            alphabet: alphabet.iter().map(|c| Rc::from(c.to_string())).collect(),
            states,
            initial_state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_nfa() {
        let text = "2\nab\n1 'a' 1\n1 'a' 2\n1 'b' 1\n2 'a' 1\n1\n2";
        let (rest, parsed) = nfa(text).unwrap();
        assert!(rest.is_empty());
        let nfa: Nfa = parsed.try_into().unwrap();
        assert_eq!(nfa.states().len(), 2);
    }

    #[test]
    fn multiple_start_states_get_synthesized() {
        let text = "2\na\n1 'a' 1\n2 'a' 2\n1 2\n2";
        let (_, parsed) = nfa(text).unwrap();
        let nfa: Nfa = parsed.try_into().unwrap();
        assert_eq!(nfa.states().len(), 3);
        assert_eq!(nfa.initial_state_index(), 2);
    }

    #[test]
    fn rejects_out_of_range_start_state() {
        let text = "1\na\n1 'a' 1\n5\n";
        let (_, parsed) = nfa(text).unwrap();
        let result: Result<Nfa, _> = parsed.try_into();
        assert_eq!(result, Err(NfaFileError::StateOutOfRange(5, 1)));
    }
}
