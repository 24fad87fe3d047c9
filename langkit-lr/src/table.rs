//! Canonical LR(0) item-set collection and SLR action/goto table filling
//! (§4.5.4).
use crate::first_follow::FirstFollow;
use crate::grammar::Grammar;
use langkit::lexer::END_OF_INPUT;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;
use thiserror::Error;

/// A single `(rule_id, dot_pos)` pair. `dot_pos == rhs.len()` marks a
/// complete item (including the trivially-complete item of an ε-rule, whose
/// `rhs` is empty and whose only item already has `dot_pos == 0 ==
/// rhs.len()`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub rule_id: usize,
    pub dot_pos: usize,
}

/// One of the three LR driver actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
}

/// A state of the canonical collection: its defining item-set, plus the
/// `action`/`goto` dictionaries filled in by [Table::build].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub items: BTreeSet<Item>,
    pub action: HashMap<Rc<str>, Action>,
    pub goto: HashMap<Rc<str>, usize>,
}

/// Errors raised while filling the action/goto tables — the grammar is not
/// an SLR(1) grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("state {0} has conflicting actions on {1:?} (grammar is not LR)")]
    ActionConflict(usize, String),
    #[error("state {0} has conflicting shift/goto entries on {1:?} (grammar is not LR)")]
    ShiftGotoConflict(usize, String),
}

/// The canonical collection of LR states, with action/goto tables filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub states: Vec<State>,
}

/// Saturates `items` under the rule "dot before a nonterminal `B` ⇒ add
/// every `(B -> ., 0)`", per §4.5.4's `closure`.
fn closure(grammar: &Grammar, mut items: BTreeSet<Item>) -> BTreeSet<Item> {
    loop {
        let mut additions = Vec::new();
        for item in &items {
            let rule = &grammar.rules[item.rule_id];
            if item.dot_pos < rule.rhs.len() {
                let symbol = &rule.rhs[item.dot_pos];
                if grammar.is_nonterminal(symbol) {
                    for &rule_id in &grammar.rules_by_lhs[symbol] {
                        let candidate = Item { rule_id, dot_pos: 0 };
                        if !items.contains(&candidate) {
                            additions.push(candidate);
                        }
                    }
                }
            }
        }
        if additions.is_empty() {
            return items;
        }
        items.extend(additions);
    }
}

/// `GOTO(items, symbol)`: shift the dot past `symbol` in every item that
/// allows it, then close.
fn goto(grammar: &Grammar, items: &BTreeSet<Item>, symbol: &str) -> BTreeSet<Item> {
    let shifted: BTreeSet<Item> = items
        .iter()
        .filter_map(|item| {
            let rule = &grammar.rules[item.rule_id];
            if item.dot_pos < rule.rhs.len() && rule.rhs[item.dot_pos].as_ref() == symbol {
                Some(Item {
                    rule_id: item.rule_id,
                    dot_pos: item.dot_pos + 1,
                })
            } else {
                None
            }
        })
        .collect();
    closure(grammar, shifted)
}

impl Table {
    /// Builds the canonical collection and fills its action/goto tables.
    /// State identity is item-set equality (§3); state ids and the order
    /// states are discovered in are deterministic given a fixed grammar,
    /// since every set this function iterates (`BTreeSet<Item>`,
    /// `BTreeMap<Rc<str>, _>`) is ordered rather than hash-ordered (§5).
    pub fn build(grammar: &Grammar, first_follow: &FirstFollow) -> Result<Table, TableError> {
        let start_items = closure(grammar, BTreeSet::from([Item { rule_id: 0, dot_pos: 0 }]));
        let mut index_of: HashMap<BTreeSet<Item>, usize> = HashMap::new();
        index_of.insert(start_items.clone(), 0);
        let mut states = vec![State {
            items: start_items,
            action: HashMap::new(),
            goto: HashMap::new(),
        }];

        let mut i = 0;
        while i < states.len() {
            let items = states[i].items.clone();

            for item in &items {
                if item.rule_id == 0 && item.dot_pos == 1 {
                    if states[i].action.contains_key(END_OF_INPUT) {
                        return Err(TableError::ActionConflict(i, END_OF_INPUT.to_string()));
                    }
                    states[i].action.insert(Rc::from(END_OF_INPUT), Action::Accept);
                }
            }

            let mut by_symbol: BTreeMap<Rc<str>, Vec<Item>> = BTreeMap::new();
            for &item in &items {
                let rule = &grammar.rules[item.rule_id];
                if item.dot_pos < rule.rhs.len() {
                    by_symbol
                        .entry(rule.rhs[item.dot_pos].clone())
                        .or_default()
                        .push(item);
                } else {
                    for terminal in first_follow.follow_of(&rule.lhs) {
                        match states[i].action.get(terminal) {
                            None => {
                                states[i]
                                    .action
                                    .insert(terminal.clone(), Action::Reduce(item.rule_id));
                            }
                            Some(Action::Accept) => {}
                            Some(_) => {
                                return Err(TableError::ActionConflict(i, terminal.to_string()))
                            }
                        }
                    }
                }
            }

            for (symbol, symbol_items) in by_symbol {
                if states[i].action.contains_key(&symbol) || states[i].goto.contains_key(&symbol) {
                    return Err(TableError::ShiftGotoConflict(i, symbol.to_string()));
                }
                let shifted: BTreeSet<Item> = symbol_items
                    .iter()
                    .map(|item| Item {
                        rule_id: item.rule_id,
                        dot_pos: item.dot_pos + 1,
                    })
                    .collect();
                let target_items = closure(grammar, shifted);
                let target = match index_of.get(&target_items) {
                    Some(&idx) => idx,
                    None => {
                        let idx = states.len();
                        index_of.insert(target_items.clone(), idx);
                        states.push(State {
                            items: target_items,
                            action: HashMap::new(),
                            goto: HashMap::new(),
                        });
                        idx
                    }
                };
                if grammar.is_terminal(&symbol) {
                    states[i].action.insert(symbol, Action::Shift(target));
                } else {
                    states[i].goto.insert(symbol, target);
                }
            }

            i += 1;
        }

        Ok(Table { states })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::grammar_file;

    fn table(text: &str) -> Result<Table, TableError> {
        let (_, parsed) = grammar_file(text).unwrap();
        let grammar = parsed.try_into().unwrap();
        let ff = FirstFollow::compute(&grammar);
        Table::build(&grammar, &ff)
    }

    #[test]
    fn simple_concatenation_grammar_builds() {
        let t = table("a b\n%%\nS : A B\nA : a\nB : b\n").unwrap();
        assert!(!t.states.is_empty());
        assert!(t.states[0].action.contains_key("a"));
    }

    #[test]
    fn action_and_goto_never_share_a_key() {
        let t = table("a b\n%%\nS : A B\nA : a\nB : b\n").unwrap();
        for state in &t.states {
            for key in state.action.keys() {
                assert!(!state.goto.contains_key(key));
            }
        }
    }

    #[test]
    fn reduce_reduce_conflict_is_non_lr() {
        // Two distinct nonterminals reduce to the same state on 'x', and
        // both are followed by 'a' in the grammar, so the state straight
        // after shifting 'x' has two competing Reduce actions on 'a'.
        let result = table("x a\n%%\nS : A a\nS : B a\nA : x\nB : x\n");
        assert!(matches!(result, Err(TableError::ActionConflict(_, _))));
    }
}
