//! # Regular expressions
//!
//! A regular expression here is a tree of five node kinds: [RegexTree::Leaf]
//! (one literal grapheme), [RegexTree::Empty] (matches only the empty
//! string), [RegexTree::Star] (Kleene closure), [RegexTree::Concat]
//! (sequencing) and [RegexTree::Union] (alternation). The empty *language*
//! (∅, matching nothing) is the degenerate case `Union` of zero branches, so
//! no sixth node kind is needed for it.
//!
//! ## Syntax
//!
//! Regular expressions are written in a UTF-8 encoded string. Each unicode
//! extended grapheme cluster is one atom (no normalization is applied).
//! Sequencing is written by concatenating atoms next to each other — there is
//! no explicit concatenation operator in the surface syntax, it is inserted
//! during parsing (see [parser]). The reserved characters are `(`, `)`, `∅`,
//! `e`, `|`, `*` and `\`; all of these (besides `\`, which always escapes the
//! next character literally) need to be escaped with `\` to be matched as
//! themselves. `∅` denotes the empty language, `e` denotes the empty string,
//! `|` denotes alternation and `*` is Kleene star. Leading and trailing
//! whitespace is ignored; internal whitespace is a literal atom like any
//! other character.
//!
//! * `(ab)*` matches the empty string, `ab`, `abab`, `ababab`, ...
//! * `0*1(0|e)` matches `1`, `10`, `0001` and any other string containing
//!   exactly one `1`.
//!
//! ## Operations
//! The only operation on a [Regex] is [lowering it to an NFA](Regex::to_nfa)
//! via Thompson's construction. From there you can do anything an [Nfa]
//! supports — convert it to a [Dfa](crate::dfa::Dfa), enumerate its words, or
//! combine it with other automata.
//!
//! ```
//! use langkit::regex::parser;
//!
//! let regex1 = parser::regex("(ab)*").unwrap();
//! let regex2 = parser::regex("0*1(0|e)").unwrap();
//!
//! let nfa1 = regex1.to_nfa();
//! let nfa2 = regex2.to_nfa();
//!
//! assert!(["", "ab", "abab"].iter().all(|s| nfa1.accepts_graphemes(s)));
//! assert!(["1", "10", "0001"].iter().all(|s| nfa2.accepts_graphemes(s)));
//! assert!(!nfa2.accepts_graphemes("11"));
//! ```

use crate::nfa::{Nfa, NfaState};
use std::collections::HashMap;
use std::rc::Rc;

pub mod parser;

/// A regular expression, as a syntax tree of five node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Regex {
    pub tree: RegexTree,
}

/// One node of a [Regex] syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexTree {
    /// A single literal grapheme.
    Leaf(Rc<str>),
    /// Matches only the empty string.
    Empty,
    /// Kleene closure: zero or more repetitions.
    Star(Box<RegexTree>),
    /// Sequencing, left to right.
    Concat(Vec<RegexTree>),
    /// Alternation. An empty `Union` is the empty language (∅).
    Union(Vec<RegexTree>),
}

/// A fragment of an in-progress NFA lowering: one entry state and the set of
/// states that are currently exit points, with everything in between already
/// built into `states`. Composing fragments never revisits a node's own
/// states from the outside — each combinator only adds epsilon edges (plus,
/// for [RegexTree::Union], one new entry state).
struct Fragment {
    start: usize,
    ends: Vec<usize>,
}

/// Allocates fresh, sequential NFA state indices while lowering a regex.
struct StateBuilder {
    states: Vec<NfaState>,
}

impl StateBuilder {
    fn new() -> Self {
        Self { states: Vec::new() }
    }

    fn fresh(&mut self) -> usize {
        let idx = self.states.len();
        self.states.push(NfaState {
            name: Rc::from(idx.to_string()),
            initial: false,
            accepting: false,
            epsilon_transitions: vec![],
            transitions: vec![],
        });
        idx
    }

    fn add_epsilon(&mut self, from: usize, to: usize) {
        self.states[from].epsilon_transitions.push(to);
    }
}

impl Regex {
    /// Lowers this regular expression to an [Nfa] via Thompson's
    /// construction. The tree is walked post-order with an explicit stack
    /// (rather than recursively), so lowering doesn't blow the call stack on
    /// deeply nested expressions.
    pub fn to_nfa(self) -> Nfa {
        let mut builder = StateBuilder::new();
        let mut grapheme_idx: HashMap<Rc<str>, usize> = HashMap::new();
        let mut next_alphabet_idx = 0usize;

        // Post-order iteration over the tree using an explicit work stack.
        // `Visit` schedules a subtree for its first visit; `Build` fires
        // once all of a node's children have already produced a `Fragment`.
        enum Work {
            Visit(RegexTree),
            BuildConcat(usize),
            BuildUnion(usize),
            BuildStar,
        }

        let mut work = vec![Work::Visit(self.tree)];
        let mut fragments: Vec<Fragment> = Vec::new();

        while let Some(item) = work.pop() {
            match item {
                Work::Visit(RegexTree::Leaf(g)) => {
                    let start = builder.fresh();
                    let end = builder.fresh();
                    let col = *grapheme_idx.entry(g).or_insert_with(|| {
                        let i = next_alphabet_idx;
                        next_alphabet_idx += 1;
                        i
                    });
                    let mut row = vec![vec![]; col + 1];
                    row[col] = vec![end];
                    builder.states[start].transitions = row;
                    fragments.push(Fragment {
                        start,
                        ends: vec![end],
                    });
                }
                Work::Visit(RegexTree::Empty) => {
                    // One-state trivial NFA: q0 = F = {this state}.
                    let state = builder.fresh();
                    fragments.push(Fragment {
                        start: state,
                        ends: vec![state],
                    });
                }
                Work::Visit(RegexTree::Star(inner)) => {
                    work.push(Work::BuildStar);
                    work.push(Work::Visit(*inner));
                }
                Work::Visit(RegexTree::Concat(children)) => {
                    let n = children.len();
                    work.push(Work::BuildConcat(n));
                    for child in children.into_iter().rev() {
                        work.push(Work::Visit(child));
                    }
                }
                Work::Visit(RegexTree::Union(children)) => {
                    let n = children.len();
                    work.push(Work::BuildUnion(n));
                    for child in children.into_iter().rev() {
                        work.push(Work::Visit(child));
                    }
                }
                Work::BuildStar => {
                    // No new states: every accept state of the child gets an
                    // epsilon edge back to the child's start, and the
                    // child's start becomes accepting too (for zero reps).
                    let inner = fragments.pop().expect("star has one child fragment");
                    for &end in &inner.ends {
                        builder.add_epsilon(end, inner.start);
                    }
                    let mut ends = inner.ends;
                    if !ends.contains(&inner.start) {
                        ends.push(inner.start);
                    }
                    fragments.push(Fragment {
                        start: inner.start,
                        ends,
                    });
                }
                Work::BuildConcat(n) => {
                    let at = fragments.len() - n;
                    let children: Vec<Fragment> = fragments.split_off(at);
                    if children.is_empty() {
                        // Concat of nothing is the empty string.
                        let state = builder.fresh();
                        fragments.push(Fragment {
                            start: state,
                            ends: vec![state],
                        });
                    } else {
                        for pair in children.windows(2) {
                            for &end in &pair[0].ends {
                                builder.add_epsilon(end, pair[1].start);
                            }
                        }
                        fragments.push(Fragment {
                            start: children.first().unwrap().start,
                            ends: children.into_iter().last().unwrap().ends,
                        });
                    }
                }
                Work::BuildUnion(n) => {
                    let at = fragments.len() - n;
                    let children: Vec<Fragment> = fragments.split_off(at);
                    let start = builder.fresh();
                    let mut ends = Vec::new();
                    for child in children {
                        builder.add_epsilon(start, child.start);
                        ends.extend(child.ends);
                    }
                    fragments.push(Fragment { start, ends });
                }
            }
        }

        let root = fragments.pop().expect("exactly one fragment after lowering");
        debug_assert!(fragments.is_empty());

        builder.states[root.start].initial = true;
        for end in root.ends {
            builder.states[end].accepting = true;
        }

        let alphabet_len = next_alphabet_idx;
        builder
            .states
            .iter_mut()
            .for_each(|s| s.transitions.resize(alphabet_len, vec![]));

        let mut alphabet_vec = vec![Rc::from(""); alphabet_len];
        for (g, idx) in grapheme_idx {
            alphabet_vec[idx] = g;
        }

        Nfa {
            alphabet: alphabet_vec.into(),
            states: builder.states,
            initial_state: root.start,
        }
    }
}
