use crate::dfa::{self, Dfa, DfaState};
use crate::nfa::{self, Nfa, NfaState};
use crate::regex::parser;
use ::regex::Regex as LibRegex;
use proptest::prelude::*;
use std::collections::HashSet;
use std::rc::Rc;

proptest! {
    /// A DFA turned into a table with [Dfa::to_table] parses back to the
    /// *very same* DFA (not just an equivalent one).
    #[test]
    fn dfa_table_reparse(dfa in dfa(50, 50)) {
        let (_, parsed) = dfa::parse::dfa(&dfa.to_table()).unwrap();
        let parsed_dfa: Dfa = parsed.try_into().unwrap();
        assert_eq!(dfa, parsed_dfa);
    }

    /// Minimizing a DFA keeps it equivalent to the original.
    #[test]
    fn dfa_minimize_eq(dfa in dfa(25, 25)) { // This size is adequate, larger size takes too long time
        let mut minimized_dfa = dfa.clone();
        minimized_dfa.minimize();
        assert!(minimized_dfa.equivalent_to(&dfa), "Minimized DFA should be equivalent to original");
        assert!(dfa.equivalent_to(&minimized_dfa), "Original DFA should be equivalent to original");
    }

    /// A DFA converted to an NFA and back is still equivalent to the original.
    #[test]
    fn dfa_to_nfa_to_dfa(dfa in dfa(50, 50)) {
        let converted = dfa.clone().to_nfa().to_dfa();
        assert!(dfa.equivalent_to(&converted), "DFA should be equivalent to DFA->NFA->DFA");
        assert!(converted.equivalent_to(&dfa), "DFA->NFA->DFA should be equivalent to DFA");
    }

    /// An NFA turned into a table with [Nfa::to_table] parses back to the
    /// *very same* NFA, as long as it only had a single start state (multiple
    /// start states get collapsed into a synthesized one on reparse).
    #[test]
    fn nfa_table_reparse(nfa in nfa(50, 50)) {
        let (_, parsed) = nfa::parse::nfa(&nfa.to_table()).unwrap();
        let parsed_nfa: Nfa = parsed.try_into().unwrap();
        assert_eq!(nfa, parsed_nfa);
    }

    /// An NFA converted to a DFA and back is still equivalent to the original.
    #[test]
    fn nfa_to_dfa_to_nfa(nfa in nfa(25, 25)) {
        let converted = nfa.to_dfa().to_nfa();
        assert!(nfa.equivalent_to(&converted), "NFA should be equivalent to NFA->DFA->NFA");
        assert!(converted.equivalent_to(&nfa), "NFA->DFA->NFA should be equivalent to NFA");
    }

    #[test]
    fn binary_dfa_ops(
        dfa1 in fixed_alphabet_dfa(20, 'a'..='f'),
        dfa2 in fixed_alphabet_dfa(20, 'a'..='f'),
        tests in prop::collection::vec("[a-f]+", 100)
    ) {
        let intersection = dfa1.intersection(&dfa2).unwrap();
        let union = dfa1.union(&dfa2).unwrap();
        let difference = dfa1.difference(&dfa2).unwrap();
        let symmetric_difference = dfa1.symmetric_difference(&dfa2).unwrap();
        for test in tests.iter() {
            let r1 = dfa1.accepts_graphemes(test);
            let r2 = dfa2.accepts_graphemes(test);
            assert_eq!(intersection.accepts_graphemes(test), r1 && r2);
            assert_eq!(union.accepts_graphemes(test), r1 || r2);
            assert_eq!(difference.accepts_graphemes(test), r1 && !r2);
            assert_eq!(symmetric_difference.accepts_graphemes(test), r1 != r2);
        }
    }

    #[test]
    fn dfa_self_union(dfa in fixed_alphabet_dfa(20, 'a'..='z')) {
        let union = dfa.union(&dfa).unwrap();
        assert!(union.equivalent_to(&dfa));
    }

    #[test]
    fn dfa_self_intersection(dfa in fixed_alphabet_dfa(20, 'a'..='z')) {
        let intersection = dfa.intersection(&dfa).unwrap();
        assert!(intersection.equivalent_to(&dfa));
    }

    #[test]
    fn dfa_inversion_tautologies(
        dfa in fixed_alphabet_dfa(20, 'a'..='f'),
        tests in prop::collection::vec("[a-f]+", 100)
    ) {
        let inv_dfa = {
            let mut dfa = dfa.clone();
            dfa.invert();
            dfa
        };
        let union = dfa.union(&inv_dfa).unwrap();
        let intersection = dfa.intersection(&inv_dfa).unwrap();
        tests.iter().for_each(|test| {
            assert!(union.accepts_graphemes(test));
            assert!(union.has_reachable_accepting_state());
            assert!(!intersection.accepts_graphemes(test));
            assert!(!intersection.has_reachable_accepting_state());
        });
    }

    /// A compiled regex accepts exactly the same strings as an independent
    /// regex engine, standing in as an oracle.
    #[test]
    fn regex(
        regex_str in random_regex(),
        tests in prop::collection::vec("[a-df-z]+", 20)
    ) {
        let regex = parser::regex(&regex_str).unwrap();
        let mut dfa = regex.to_nfa().to_dfa();
        dfa.minimize();
        let lib_regex = LibRegex::new(&format!("^({regex_str})$")).unwrap();

        let accepted_chars = regex_str.chars().collect::<HashSet<_>>();

        tests.iter().for_each(|test|{
            // Only feed characters that appear in the regex, since the
            // derived DFA's alphabet won't recognize any others.
            let s = test.chars().filter(|c| accepted_chars.contains(c)).collect::<String>();
            assert_eq!(dfa.accepts_graphemes(&s), lib_regex.is_match(&s));
        })
    }
}

prop_compose! {
    fn nfa(max_states: usize, max_alphabet_size: usize)
        (num_states in 1..max_states, alphabet_size in 1..max_alphabet_size)
        (
            alphabet in alphabet_elems(alphabet_size),
            initial_state in 0..num_states,
            accepting_states in prop::collection::vec(any::<bool>(), num_states..=num_states),
            epsilon_transitions in prop::collection::vec(epsilon_transitions(num_states), num_states..=num_states),
            transitions in prop::collection::vec(nfa_transitions(num_states, alphabet_size), num_states..=num_states)
        )
    -> Nfa {
        let states = accepting_states.into_iter().zip(
            transitions.into_iter().zip(epsilon_transitions)
        ).enumerate().map(|(idx, (accepting, (transitions, epsilon_transitions)))|
            NfaState {
                name: Rc::from((idx + 1).to_string()),
                initial: idx == initial_state,
                accepting,
                epsilon_transitions,
                transitions
            }
        ).collect();

        Nfa {
            alphabet: alphabet.iter().map(|&c| Rc::from(c.to_string())).collect(),
            states,
            initial_state
        }
    }
}

prop_compose! {
    fn fixed_alphabet_dfa(max_states: usize, alphabet: std::ops::RangeInclusive<char>)
        (num_states in 1..max_states)
        (
            initial_state in 0..num_states,
            accepting_states in prop::collection::vec(any::<bool>(), num_states..=num_states),
            transitions in prop::collection::vec(dfa_transitions(num_states, alphabet.clone().count()), num_states..=num_states),
        )
    -> Dfa {
        let states = accepting_states.into_iter().zip(transitions).enumerate().map(|(idx, (accepting, transitions))|
            DfaState {
                name: Rc::from((idx + 1).to_string()),
                initial: idx == initial_state,
                accepting,
                transitions
            }
        ).collect();

        let alphabet: Rc<[Rc<str>]> = alphabet.clone().map(|c| Rc::from(c.to_string())).collect();

        Dfa {
            alphabet,
            states,
            initial_state
        }
    }
}

prop_compose! {
    fn dfa(max_states: usize, max_alphabet_size: usize)
        (num_states in 1..max_states, alphabet_size in 1..max_alphabet_size)
        (
            alphabet in alphabet_elems(alphabet_size),
            initial_state in 0..num_states,
            accepting_states in prop::collection::vec(any::<bool>(), num_states..=num_states),
            transitions in prop::collection::vec(dfa_transitions(num_states, alphabet_size), num_states..=num_states)
        )
    -> Dfa {
        let states = accepting_states.into_iter().zip(transitions).enumerate().map(|(idx, (accepting, transitions))|
            DfaState {
                name: Rc::from((idx + 1).to_string()),
                initial: idx == initial_state,
                accepting,
                transitions
            }
        ).collect();

        Dfa {
            alphabet: alphabet.iter().map(|&c| Rc::from(c.to_string())).collect(),
            states,
            initial_state
        }
    }
}

prop_compose! {
    fn dfa_transitions(states: usize, alphabet_size: usize)
        (transitions in prop::collection::vec(0..states, alphabet_size..=alphabet_size))
    -> Vec<usize> {
        transitions
    }
}

prop_compose! {
    fn epsilon_transitions(states: usize)
        (transitions in prop::collection::vec(any::<bool>(), states..=states))
    -> Vec<usize> {
        transitions.into_iter()
            .enumerate()
            .filter_map(|(idx, b)| b.then_some(idx))
            .collect()
    }
}

prop_compose! {
    fn nfa_transitions(states: usize, alphabet_size: usize)
        (transitions in prop::collection::vec(
            prop::collection::vec(any::<bool>(), states..=states),
            alphabet_size..=alphabet_size
        ))
    -> Vec<Vec<usize>> {
        transitions.into_iter()
            .map(|row| row.into_iter()
                .enumerate()
                .filter_map(|(idx, b)| b.then_some(idx))
                .collect())
            .collect()
    }
}

/// Non-quote, non-whitespace printable ASCII characters. The file formats
/// spell each alphabet symbol as a single raw character, so symbols used in
/// generated automata can't be wider than that, and `'` would be
/// unrepresentable inside a `'sym'` transition line.
fn alphabet_chars() -> Vec<char> {
    (0x21u8..=0x7eu8)
        .map(|b| b as char)
        .filter(|&c| c != '\'')
        .collect()
}

prop_compose! {
    fn alphabet_elems(count: usize)
        (chars in prop::collection::hash_set(prop::sample::select(alphabet_chars()), count..=count))
    -> HashSet<char> {
        chars
    }
}

fn random_regex() -> impl Strategy<Value = String> {
    "[a-df-z]".prop_recursive(20, 1024, 20, |inner| {
        prop_oneof![
            10 => prop::collection::vec(inner.clone(), 1..20)
                .prop_map(|vec| format!("({})", vec.join(""))),
            10 => prop::collection::vec(inner.clone(), 1..20).prop_map(|vec| vec.join("|")),
            3 => inner.clone().prop_map(|r| format!("({r})*")),
        ]
    })
}
