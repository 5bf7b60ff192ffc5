//! Command-line interface for statelex
//! Loads grammar files and dumps the token streams they produce, for writing and debugging grammars.
//!
//! Usage:
//!   statelex tokenize -g `<grammar>`... [-l `<lexer>`] [-f text|json] [-c `<options>`] `<input>`  - Dump tokens
//!   statelex check -g `<grammar>`...                                                 - Validate grammars
//!   statelex kinds                                                                 - List token kinds

use clap::{Arg, ArgAction, ArgMatches, Command};
use statelex::loader::{load_grammars, load_options};
use statelex::{EngineOptions, TableSet, Token, TokenKind};
use std::io::{self, BufWriter, Read, Write};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let grammars = Arg::new("grammar")
        .long("grammar")
        .short('g')
        .help("Grammar file (YAML or JSON); repeat for lexers that delegate to each other")
        .action(ArgAction::Append)
        .required(true);

    let matches = Command::new("statelex")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run state-machine lexers defined in grammar files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more (repeat for trace output); RUST_LOG overrides")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("tokenize")
                .about("Tokenize a file and print the tokens")
                .arg(grammars.clone())
                .arg(
                    Arg::new("lexer")
                        .long("lexer")
                        .short('l')
                        .help("Lexer name or alias to start with (default: the first grammar)"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .help("Engine options file (YAML)"),
                )
                .arg(
                    Arg::new("input")
                        .help("File to tokenize, or '-' for stdin")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Compile grammars and report construction errors")
                .arg(grammars),
        )
        .subcommand(Command::new("kinds").about("List all token kinds"))
        .get_matches();

    init_logging(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("tokenize", tokenize_matches)) => handle_tokenize_command(tokenize_matches),
        Some(("check", check_matches)) => handle_check_command(check_matches),
        Some(("kinds", _)) => handle_kinds_command(),
        _ => unreachable!(),
    }
}

fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn build_set(matches: &ArgMatches, options: EngineOptions) -> TableSet {
    let paths: Vec<&String> = matches
        .get_many::<String>("grammar")
        .map(|values| values.collect())
        .unwrap_or_default();
    let grammars = load_grammars(paths).unwrap_or_else(|e| fail(e));
    TableSet::builder()
        .grammars(grammars)
        .options(options)
        .build()
        .unwrap_or_else(|e| fail(e))
}

/// Handle the tokenize command
fn handle_tokenize_command(matches: &ArgMatches) {
    let options = match matches.get_one::<String>("config") {
        Some(path) => load_options(path).unwrap_or_else(|e| fail(e)),
        None => EngineOptions::default(),
    };
    let set = build_set(matches, options);

    let id = match matches.get_one::<String>("lexer") {
        Some(name) => set
            .id(name)
            .unwrap_or_else(|| fail(format!("no lexer named '{}'", name))),
        None => match set.tables().next() {
            Some((id, _)) => id,
            None => fail("no grammars given"),
        },
    };

    let input = match matches.get_one::<String>("input").map(String::as_str) {
        Some("-") | None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .unwrap_or_else(|e| fail(format!("reading stdin: {}", e)));
            text
        }
        Some(path) => std::fs::read_to_string(path)
            .unwrap_or_else(|e| fail(format!("reading {}: {}", path, e))),
    };

    let json = matches.get_one::<String>("format").map(String::as_str) == Some("json");
    let mut out = BufWriter::new(io::stdout().lock());
    for token in set.tokenize(id, &input) {
        let written = if json {
            write_json(&mut out, &token)
        } else {
            write_text(&mut out, &token)
        };
        if written.is_err() {
            // Reader went away (e.g. piped into `head`)
            return;
        }
    }
    let _ = out.flush();
}

fn write_text(out: &mut impl Write, token: &Token<'_>) -> io::Result<()> {
    writeln!(out, "{:>6} {:<24} {:?}", token.start, token.kind.name(), token.text)
}

fn write_json(out: &mut impl Write, token: &Token<'_>) -> io::Result<()> {
    serde_json::to_writer(&mut *out, token)?;
    writeln!(out)
}

/// Handle the check command
fn handle_check_command(matches: &ArgMatches) {
    let set = build_set(matches, EngineOptions::default());
    for (_, table) in set.tables() {
        let rules: usize = table.states().map(|(_, state)| state.rules().len()).sum();
        let aliases = if table.aliases().is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", table.aliases().join(", "))
        };
        println!(
            "{}{}: {} states, {} rules",
            table.name(),
            aliases,
            table.states().count(),
            rules
        );
    }
}

/// Handle the kinds command
fn handle_kinds_command() {
    for kind in TokenKind::ALL {
        println!("{}{}", "  ".repeat(kind.depth()), kind.name());
    }
}
