//! # Lexer
//!
//! A [Lexer] compiles an ordered list of `(token class name, regex)` pairs —
//! the token-spec file format described in [parse] — into one DFA per class,
//! then tokenizes a source string by repeatedly taking the longest prefix
//! accepted by any class ("maximal munch"). Ties between classes that accept
//! a prefix of the same maximal length are broken in favor of whichever
//! class was declared first.
//!
//! ```
//! use langkit::lexer::{self, parse};
//!
//! let spec_text = "\"abc\"\nA \"a\"\nB \"b\"\nAB \"(a|b)(a|b)*\"\n";
//! let (_, parsed) = parse::token_spec(spec_text).unwrap();
//! let lexer = lexer::Lexer::compile(parsed).unwrap();
//!
//! let tokens = lexer.tokenize("aab").unwrap();
//! assert_eq!(tokens[0].class.as_ref(), "AB");
//! assert_eq!(tokens[0].lexeme, "aab");
//!
//! let tokens = lexer.tokenize("a b").unwrap();
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[0].class.as_ref(), "A");
//! assert_eq!(tokens[1].class.as_ref(), "B");
//! ```
use crate::dfa::Dfa;
use std::rc::Rc;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

pub mod parse;

/// A single scanned token: the name of the class that matched, and the
/// matched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub class: Rc<str>,
    pub lexeme: String,
}

/// The reserved end-of-input token class name, injected by the consuming
/// parser rather than ever matched by a [Lexer] itself.
pub const END_OF_INPUT: &str = "END_OF_INPUT";

/// Errors raised while scanning.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    /// No declared class accepted any non-empty prefix at this grapheme
    /// offset, or the grapheme there isn't in the lexer's alphabet at all.
    #[error("no token class matches the input at grapheme offset {0}")]
    InvalidToken(usize),
}

/// A compiled token-spec: one DFA per class, in declaration order.
pub struct Lexer {
    pub(crate) alphabet: Rc<[Rc<str>]>,
    pub(crate) classes: Vec<(Rc<str>, Dfa)>,
}

impl Lexer {
    /// Tokenizes the entire source string, buffering the result. For a
    /// streaming contract that doesn't allocate an up-front `Vec`, use
    /// [Lexer::scan] and its [Scanner::next_token] directly.
    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>, LexError> {
        let mut scanner = self.scan(source);
        let mut tokens = Vec::new();
        while let Some(token) = scanner.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Starts a scan over `source`. The returned [Scanner] holds only the
    /// source's graphemes and a cursor — it never looks behind the cursor or
    /// ahead past whatever length it's currently testing.
    pub fn scan<'a>(&'a self, source: &'a str) -> Scanner<'a> {
        Scanner {
            lexer: self,
            graphemes: source.graphemes(true).collect(),
            pos: 0,
        }
    }
}

/// Whitespace runs (spaces, tabs, newlines) between tokens are skipped and
/// are not themselves a token class.
fn is_skipped(grapheme: &str) -> bool {
    grapheme.chars().all(|c| c == ' ' || c == '\t' || c == '\n' || c == '\r')
}

/// Cursor over one scan of a source string.
pub struct Scanner<'a> {
    lexer: &'a Lexer,
    graphemes: Vec<&'a str>,
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Returns the next token, or `Ok(None)` once the source is exhausted.
    /// Implements §4.4's maximal-munch rule: for each class (in declaration
    /// order) step its DFA one grapheme at a time from the current
    /// position, remembering the longest prefix-length at which it was
    /// accepting; the longest such length across all classes wins, ties
    /// broken by declaration order.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        while self.pos < self.graphemes.len() && is_skipped(self.graphemes[self.pos]) {
            self.pos += 1;
        }
        if self.pos >= self.graphemes.len() {
            return Ok(None);
        }

        let mut best: Option<(usize, usize)> = None; // (class index, length)
        for (class_idx, (_, dfa)) in self.lexer.classes.iter().enumerate() {
            let mut eval = dfa.evaluator();
            let mut longest = None;
            for (offset, &grapheme) in self.graphemes[self.pos..].iter().enumerate() {
                if eval.step(grapheme).is_none() {
                    break;
                }
                if eval.is_accepting() {
                    longest = Some(offset + 1);
                }
            }
            if let Some(len) = longest {
                let replace = match best {
                    Some((_, best_len)) => len > best_len,
                    None => true,
                };
                if replace {
                    best = Some((class_idx, len));
                }
            }
        }

        match best {
            Some((class_idx, len)) => {
                let lexeme: String = self.graphemes[self.pos..self.pos + len].concat();
                let class = Rc::clone(&self.lexer.classes[class_idx].0);
                self.pos += len;
                Ok(Some(Token { class, lexeme }))
            }
            None => Err(LexError::InvalidToken(self.pos)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(spec: &str) -> Lexer {
        let (_, parsed) = parse::token_spec(spec).unwrap();
        Lexer::compile(parsed).unwrap()
    }

    #[test]
    fn maximal_munch_prefers_longest_then_first_declared() {
        let lexer = compile("\"abc\"\nA \"a\"\nB \"b\"\nAB \"(a|b)(a|b)*\"\n");
        let tokens = lexer.tokenize("aab").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].class.as_ref(), "AB");
        assert_eq!(tokens[0].lexeme, "aab");
    }

    #[test]
    fn whitespace_separates_tokens_without_becoming_one() {
        let lexer = compile("\"abc\"\nA \"a\"\nB \"b\"\nAB \"(a|b)(a|b)*\"\n");
        let tokens = lexer.tokenize("a b").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].class.as_ref(), "A");
        assert_eq!(tokens[1].class.as_ref(), "B");
    }

    #[test]
    fn unmatchable_character_is_an_error() {
        let lexer = compile("\"ab\"\nA \"a\"\n");
        assert_eq!(lexer.tokenize("ac"), Err(LexError::InvalidToken(1)));
    }
}
