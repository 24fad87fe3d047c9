use clap::Parser;
use langkit::lexer::{self, parse as lexer_parse, LexError, TokenSpecError};
use langkit_lr::driver::ParseError;
use langkit_lr::first_follow::FirstFollow;
use langkit_lr::grammar::{self, GrammarFileError};
use langkit_lr::table::{Table, TableError};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

/// Compiles a lexer spec and a grammar spec, then parses a source file and
/// prints its pre-order parse-tree sequence.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct CliArgs {
    /// Token-spec file (§6 "Lexer spec file").
    lexer_spec: PathBuf,
    /// Grammar file (§6 "Grammar file").
    grammar_spec: PathBuf,
    /// Source file to parse.
    source: PathBuf,
    /// Suppress progress output; only the parse tree or error is printed.
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("FileFormatError: {0}")]
    SpecFileSyntax(String),
    #[error("FileFormatError")]
    TokenSpecFile(#[source] TokenSpecError),
    #[error("InvalidToken")]
    Lex(#[source] LexError),
    #[error("FileFormatError")]
    GrammarFile(#[source] GrammarFileError),
    #[error("NonLRGrammarError")]
    Table(#[source] TableError),
    #[error("SourceFileSyntaxError")]
    SyntaxError(#[source] ParseError),
}

fn read(path: &PathBuf) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|e| CliError::Io {
        path: path.clone(),
        source: e,
    })
}

fn run(args: &CliArgs) -> Result<Vec<String>, CliError> {
    let log = |s: &str| {
        if !args.quiet {
            println!("{s}")
        }
    };
    macro_rules! log {
        ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
    }

    let lexer_spec_text = read(&args.lexer_spec)?;
    let (_, parsed_lexer) = lexer_parse::token_spec(&lexer_spec_text)
        .map_err(|e| CliError::SpecFileSyntax(format!("{e:?}")))?;
    let lexer = lexer::Lexer::compile(parsed_lexer).map_err(CliError::TokenSpecFile)?;
    log!("Lexer spec loaded from {}", args.lexer_spec.display());

    let grammar_spec_text = read(&args.grammar_spec)?;
    let (_, parsed_grammar) = grammar::grammar_file(&grammar_spec_text)
        .map_err(|e| CliError::SpecFileSyntax(format!("{e:?}")))?;
    let grammar: grammar::Grammar = parsed_grammar.try_into().map_err(CliError::GrammarFile)?;
    log!("Grammar loaded from {}", args.grammar_spec.display());

    let first_follow = FirstFollow::compute(&grammar);
    let table = Table::build(&grammar, &first_follow).map_err(CliError::Table)?;
    log!("SLR(1) table built: {} states", table.states.len());

    let source_text = read(&args.source)?;
    let mut scanner = lexer.scan(&source_text);
    let tree = langkit_lr::driver::parse(&grammar, &table, &mut scanner).map_err(|e| match e {
        ParseError::Lex(lex_error) => CliError::Lex(lex_error),
        syntax_error @ ParseError::SourceFileSyntaxError { .. } => {
            CliError::SyntaxError(syntax_error)
        }
    })?;

    Ok(tree
        .preorder()
        .into_iter()
        .map(|label| label.to_string())
        .collect())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args) {
        Ok(labels) => {
            println!("{}", labels.join(" "));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
