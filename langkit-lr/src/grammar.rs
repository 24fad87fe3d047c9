//! Parser for the §6 grammar file format.
//!
//! ```text
//! term1 term2 term3
//! term4
//! %%
//! S : A B
//! A : a
//! B : b
//! ```
//!
//! Terminals are whitespace-delimited, possibly spread across several lines,
//! up to a line containing exactly `%%`. Every line after that is one rule
//! `LHS : SYM SYM …`; a single-symbol rhs of `eps` denotes an ε-rule. [grammar_file]
//! parses this into a [ParsedGrammar]; [Grammar::try_from] synthesizes the
//! `dummy_start`/`r0` rule and the `END_OF_INPUT` terminal and validates that
//! every rhs symbol is declared somewhere.
use langkit::lexer::END_OF_INPUT;
use nom::character::complete::{line_ending, not_line_ending, space1};
use nom::combinator::opt;
use nom::error::{Error as NomError, ErrorKind};
use nom::multi::separated_list1;
use nom::sequence::terminated;
use nom::{Err as NomErr, IResult};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

/// The rhs keyword that denotes an ε-rule.
pub const EPS_KEYWORD: &str = "eps";
/// The nonterminal synthesized as the root of every grammar (`r0 : dummy_start -> S`).
pub const DUMMY_START: &str = "dummy_start";

/// One `LHS : SYM SYM …` rule, still as raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRule {
    pub lhs: String,
    pub rhs: Vec<String>,
}

/// The result of [grammar_file], prior to `dummy_start`/`END_OF_INPUT` synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGrammar {
    pub terminals: Vec<String>,
    pub rules: Vec<ParsedRule>,
}

/// Errors raised while parsing or validating a grammar file.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarFileError {
    #[error("grammar file has no `%%` section separator")]
    MissingSeparator,
    #[error("grammar file declares no rules")]
    NoRules,
    #[error("rule line {0:?} is malformed (expected `LHS : SYM SYM ...`)")]
    MalformedRule(String),
    #[error("symbol {0:?} appears on a right-hand side but is neither a declared terminal nor the left-hand side of any rule")]
    UndefinedSymbol(String),
    #[error("symbol {0:?} is used as both a terminal and a nonterminal")]
    AmbiguousSymbol(String),
}

/// Parses the textual grammar file format. Doesn't synthesize `dummy_start`
/// or validate symbol usage; see [Grammar::try_from].
pub fn grammar_file(input: &str) -> IResult<&str, ParsedGrammar> {
    let (input, terminals) = terminals_section(input)?;
    let (input, rules) = rules_section(input)?;
    Ok((input, ParsedGrammar { terminals, rules }))
}

fn terminals_section(mut input: &str) -> IResult<&str, Vec<String>> {
    let mut terminals = Vec::new();
    loop {
        let (rest, line) = terminated(not_line_ending, opt(line_ending))(input)?;
        input = rest;
        if line.trim() == "%%" {
            return Ok((input, terminals));
        }
        terminals.extend(line.split_whitespace().map(|s| s.to_string()));
        if input.is_empty() {
            return Err(NomErr::Error(NomError::new(input, ErrorKind::Eof)));
        }
    }
}

fn rules_section(mut input: &str) -> IResult<&str, Vec<ParsedRule>> {
    let mut rules = Vec::new();
    while !input.is_empty() {
        let (rest, line) = terminated(not_line_ending, opt(line_ending))(input)?;
        input = rest;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "%%" {
            break;
        }
        let (rule_rest, rule) = rule_line(trimmed)?;
        if !rule_rest.trim().is_empty() {
            return Err(NomErr::Error(NomError::new(input, ErrorKind::Eof)));
        }
        rules.push(rule);
    }
    Ok((input, rules))
}

fn rule_line(line: &str) -> IResult<&str, ParsedRule> {
    let (rest, lhs) = nom::bytes::complete::take_while1(|c: char| !c.is_whitespace())(line)?;
    let (rest, _) = space1(rest)?;
    let (rest, _) = nom::character::complete::char(':')(rest)?;
    let (rest, _) = space1(rest)?;
    let (rest, rhs) = separated_list1(
        space1,
        nom::bytes::complete::take_while1(|c: char| !c.is_whitespace()),
    )(rest)?;
    Ok((
        rest,
        ParsedRule {
            lhs: lhs.to_string(),
            rhs: rhs.into_iter().map(|s| s.to_string()).collect(),
        },
    ))
}

/// One grammar rule: `lhs -> rhs`. An empty `rhs` denotes an ε-rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub lhs: Rc<str>,
    pub rhs: Vec<Rc<str>>,
}

/// A validated grammar: terminals (with `END_OF_INPUT` injected),
/// nonterminals (with `dummy_start` injected), the rule list (with the
/// synthesized `r0` at index 0), and the lhs-to-rule-ids index the item
/// closure walks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    pub terminals: HashSet<Rc<str>>,
    pub nonterminals: HashSet<Rc<str>>,
    pub rules: Vec<Rule>,
    pub rules_by_lhs: HashMap<Rc<str>, Vec<usize>>,
}

impl Grammar {
    pub fn is_terminal(&self, symbol: &str) -> bool {
        self.terminals.contains(symbol)
    }

    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.nonterminals.contains(symbol)
    }

    /// The user's start symbol `S`, i.e. the rhs of the synthesized `r0`.
    pub fn start_symbol(&self) -> &Rc<str> {
        &self.rules[0].rhs[0]
    }
}

impl TryFrom<ParsedGrammar> for Grammar {
    type Error = GrammarFileError;

    fn try_from(value: ParsedGrammar) -> Result<Self, GrammarFileError> {
        if value.rules.is_empty() {
            return Err(GrammarFileError::NoRules);
        }

        let mut terminals: HashSet<Rc<str>> =
            value.terminals.iter().map(|t| Rc::from(t.as_str())).collect();
        terminals.insert(Rc::from(END_OF_INPUT));

        let mut nonterminals: HashSet<Rc<str>> = HashSet::new();
        nonterminals.insert(Rc::from(DUMMY_START));

        let mut rules = Vec::with_capacity(value.rules.len() + 1);
        let mut rules_by_lhs: HashMap<Rc<str>, Vec<usize>> = HashMap::new();

        let start: Rc<str> = Rc::from(value.rules[0].lhs.as_str());
        rules.push(Rule {
            lhs: Rc::from(DUMMY_START),
            rhs: vec![start.clone()],
        });
        rules_by_lhs.insert(Rc::from(DUMMY_START), vec![0]);

        for parsed in value.rules {
            if parsed.lhs.is_empty() || parsed.rhs.is_empty() {
                return Err(GrammarFileError::MalformedRule(parsed.lhs));
            }
            let lhs: Rc<str> = Rc::from(parsed.lhs.as_str());
            let rhs: Vec<Rc<str>> = if parsed.rhs.len() == 1 && parsed.rhs[0] == EPS_KEYWORD {
                vec![]
            } else {
                parsed.rhs.iter().map(|s| Rc::from(s.as_str())).collect()
            };
            nonterminals.insert(lhs.clone());
            let id = rules.len();
            rules_by_lhs.entry(lhs.clone()).or_default().push(id);
            rules.push(Rule { lhs, rhs });
        }

        for symbol in terminals.intersection(&nonterminals) {
            return Err(GrammarFileError::AmbiguousSymbol(symbol.to_string()));
        }

        for rule in &rules {
            for symbol in &rule.rhs {
                if !terminals.contains(symbol) && !nonterminals.contains(symbol) {
                    return Err(GrammarFileError::UndefinedSymbol(symbol.to_string()));
                }
            }
        }

        Ok(Grammar {
            terminals,
            nonterminals,
            rules,
            rules_by_lhs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_grammar() {
        let text = "a b\n%%\nS : A B\nA : a\nB : b\n";
        let (rest, parsed) = grammar_file(text).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed.terminals, vec!["a", "b"]);
        assert_eq!(parsed.rules.len(), 3);
        let grammar: Grammar = parsed.try_into().unwrap();
        assert_eq!(grammar.rules[0].lhs.as_ref(), DUMMY_START);
        assert_eq!(grammar.rules[0].rhs[0].as_ref(), "S");
        assert_eq!(grammar.start_symbol().as_ref(), "S");
        assert!(grammar.is_terminal(END_OF_INPUT));
    }

    #[test]
    fn eps_rule_has_empty_rhs() {
        let text = "a b\n%%\nS : a S b\nS : eps\n";
        let (_, parsed) = grammar_file(text).unwrap();
        let grammar: Grammar = parsed.try_into().unwrap();
        assert!(grammar.rules.iter().any(|r| r.lhs.as_ref() == "S" && r.rhs.is_empty()));
    }

    #[test]
    fn rejects_undefined_symbol() {
        let text = "a\n%%\nS : a B\n";
        let (_, parsed) = grammar_file(text).unwrap();
        let result: Result<Grammar, _> = parsed.try_into();
        assert_eq!(
            result,
            Err(GrammarFileError::UndefinedSymbol("B".to_string()))
        );
    }
}
