//! FIRST/FOLLOW fixed-point computation (§4.5.2, §4.5.3).
use crate::grammar::{Grammar, DUMMY_START};
use langkit::lexer::END_OF_INPUT;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// FIRST of a single symbol, or of a sequence of symbols: the terminals that
/// can begin a derived string, plus `None` standing in for ε if the whole
/// sequence can derive the empty string.
pub type FirstSet = HashSet<Option<Rc<str>>>;

/// FIRST and FOLLOW tables for every symbol of a [Grammar].
#[derive(Debug, Clone)]
pub struct FirstFollow {
    pub first: HashMap<Rc<str>, FirstSet>,
    pub follow: HashMap<Rc<str>, HashSet<Rc<str>>>,
}

impl FirstFollow {
    pub fn compute(grammar: &Grammar) -> FirstFollow {
        let first = compute_first(grammar);
        let follow = compute_follow(grammar, &first);
        FirstFollow { first, follow }
    }

    pub fn first_of(&self, symbol: &str) -> &FirstSet {
        &self.first[symbol]
    }

    pub fn follow_of(&self, symbol: &str) -> &HashSet<Rc<str>> {
        &self.follow[symbol]
    }
}

/// FIRST of a sequence of symbols, per §4.5.2: non-ε members of `FIRST(X1)`,
/// then of `FIRST(X2)` while `X1` can derive ε, and so on; ε itself only if
/// every symbol in the sequence can derive ε (vacuously true of the empty
/// sequence, which is how FOLLOW's "last symbol of rhs" case falls out for
/// free below).
fn first_of_sequence(first: &HashMap<Rc<str>, FirstSet>, symbols: &[Rc<str>]) -> FirstSet {
    let mut result = FirstSet::new();
    for symbol in symbols {
        let symbol_first = &first[symbol];
        for entry in symbol_first {
            if let Some(terminal) = entry {
                result.insert(Some(terminal.clone()));
            }
        }
        if !symbol_first.contains(&None) {
            return result;
        }
    }
    result.insert(None);
    result
}

fn compute_first(grammar: &Grammar) -> HashMap<Rc<str>, FirstSet> {
    let mut first: HashMap<Rc<str>, FirstSet> = HashMap::new();
    for terminal in &grammar.terminals {
        first.insert(terminal.clone(), [Some(terminal.clone())].into_iter().collect());
    }
    for nonterminal in &grammar.nonterminals {
        first.entry(nonterminal.clone()).or_default();
    }
    for rule in &grammar.rules {
        if rule.rhs.is_empty() {
            first.get_mut(&rule.lhs).unwrap().insert(None);
        }
    }

    loop {
        let mut changed = false;
        for rule in &grammar.rules {
            if rule.rhs.is_empty() {
                continue;
            }
            let rhs_first = first_of_sequence(&first, &rule.rhs);
            let entry = first.get_mut(&rule.lhs).unwrap();
            for symbol in rhs_first {
                changed |= entry.insert(symbol);
            }
        }
        if !changed {
            break;
        }
    }

    first
}

fn compute_follow(
    grammar: &Grammar,
    first: &HashMap<Rc<str>, FirstSet>,
) -> HashMap<Rc<str>, HashSet<Rc<str>>> {
    let mut follow: HashMap<Rc<str>, HashSet<Rc<str>>> = grammar
        .nonterminals
        .iter()
        .map(|a| (a.clone(), HashSet::new()))
        .collect();
    follow
        .get_mut(DUMMY_START)
        .unwrap()
        .insert(Rc::from(END_OF_INPUT));

    loop {
        let mut changed = false;
        for rule in &grammar.rules {
            for i in 0..rule.rhs.len() {
                let symbol = &rule.rhs[i];
                if !grammar.is_nonterminal(symbol) {
                    continue;
                }
                let remainder_first = first_of_sequence(first, &rule.rhs[i + 1..]);
                {
                    let entry = follow.get_mut(symbol).unwrap();
                    for terminal in remainder_first.iter().flatten() {
                        changed |= entry.insert(terminal.clone());
                    }
                }
                if remainder_first.contains(&None) {
                    let lhs_follow = follow.get(&rule.lhs).unwrap().clone();
                    let entry = follow.get_mut(symbol).unwrap();
                    for terminal in lhs_follow {
                        changed |= entry.insert(terminal);
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }

    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{grammar_file, Grammar};

    fn grammar(text: &str) -> Grammar {
        let (_, parsed) = grammar_file(text).unwrap();
        parsed.try_into().unwrap()
    }

    #[test]
    fn first_of_terminal_is_itself() {
        let g = grammar("a b\n%%\nS : A B\nA : a\nB : b\n");
        let ff = FirstFollow::compute(&g);
        assert_eq!(
            ff.first_of("a"),
            &[Some(Rc::from("a"))].into_iter().collect()
        );
    }

    #[test]
    fn eps_rule_contributes_epsilon_to_first() {
        let g = grammar("a b\n%%\nS : a S b\nS : eps\n");
        let ff = FirstFollow::compute(&g);
        assert!(ff.first_of("S").contains(&None));
        assert!(ff.first_of("S").contains(&Some(Rc::from("a"))));
    }

    #[test]
    fn follow_of_start_symbol_includes_end_of_input() {
        let g = grammar("a b\n%%\nS : A B\nA : a\nB : b\n");
        let ff = FirstFollow::compute(&g);
        assert!(ff.follow_of("B").contains(END_OF_INPUT));
    }
}
