//! Grammars loaded from the fixture files
//!
//! The fixtures are small but realistic lexers (SQL, shell, Brainfuck,
//! Befunge) written in the file format, so these tests cover loading,
//! compilation and scanning together.

use rstest::rstest;
use statelex::loader::{load_grammar, load_grammars, load_options};
use statelex::testing::{assert_total_coverage, pairs, render};
use statelex::{BuildError, Lexer, TableSet, Token, TokenKind};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn lexer(name: &str) -> Lexer {
    Lexer::new(load_grammar(fixture(name)).unwrap()).unwrap()
}

fn dump(lexer: &Lexer, text: &str) -> String {
    let tokens: Vec<Token> = lexer.tokenize(text).collect();
    assert_total_coverage(text, &tokens);
    render(tokens)
}

#[test]
fn sql_statement() {
    let sql = lexer("sql.yaml");
    insta::assert_snapshot!(dump(&sql, "select name, 'it''s' from users -- all\n"), @r###"
    Keyword          "select"
    Text             " "
    Name             "name"
    Punctuation      ","
    Text             " "
    String.Single    "'it''s'"
    Text             " "
    Keyword          "from"
    Text             " "
    Name             "users"
    Text             " "
    Comment.Single   "-- all"
    Text             "\n"
    "###);
}

#[test]
fn sql_keywords_ignore_case_and_need_a_boundary() {
    let sql = lexer("sql.yaml");
    assert_eq!(
        pairs(sql.tokenize("SeLeCt Ordering")),
        vec![
            (TokenKind::Keyword, "SeLeCt"),
            (TokenKind::Text, " "),
            (TokenKind::Name, "Ordering"),
        ]
    );
}

#[test]
fn sql_comment_marker_beats_minus() {
    let sql = lexer("sql.yaml");
    assert_eq!(
        pairs(sql.tokenize("1-2--3")),
        vec![
            (TokenKind::NumberInteger, "1"),
            (TokenKind::Operator, "-"),
            (TokenKind::NumberInteger, "2"),
            (TokenKind::CommentSingle, "--3"),
        ]
    );
}

#[test]
fn sql_nested_block_comments() {
    let sql = lexer("sql.yaml");
    insta::assert_snapshot!(dump(&sql, "/* a /* b */ c */x"), @r###"
    Comment.Multiline "/*"
    Comment.Multiline " a "
    Comment.Multiline "/*"
    Comment.Multiline " b "
    Comment.Multiline "*/"
    Comment.Multiline " c "
    Comment.Multiline "*/"
    Name             "x"
    "###);
}

#[test]
fn brainfuck_loops() {
    let bf = lexer("brainfuck.yaml");
    insta::assert_snapshot!(dump(&bf, "++[>+[-]<]]."), @r###"
    Name.Builtin     "++"
    Keyword          "["
    Name.Variable    ">"
    Name.Builtin     "+"
    Keyword          "["
    Name.Builtin     "-"
    Keyword          "]"
    Name.Variable    "<"
    Keyword          "]"
    Error            "]"
    Name.Tag         "."
    "###);
}

#[test]
fn shell_backticks_reuse_the_shell_lexer() {
    let sh = lexer("shell.yaml");
    insta::assert_snapshot!(dump(&sh, "x=`echo $HOME`"), @r###"
    Name.Variable    "x"
    Operator         "="
    String.Backtick  "`"
    Name.Builtin     "echo"
    Text             " "
    Name.Variable    "$HOME"
    String.Backtick  "`"
    "###);
}

#[test]
fn shell_parameter_expansion() {
    let sh = lexer("shell.yaml");
    assert_eq!(
        pairs(sh.tokenize("${x:-y}")),
        vec![
            (TokenKind::Keyword, "${"),
            (TokenKind::NameVariable, "x"),
            (TokenKind::Keyword, ":-"),
            (TokenKind::NameVariable, "y"),
            (TokenKind::Keyword, "}"),
        ]
    );
}

#[test]
fn shell_command_substitution() {
    let sh = lexer("shell.yaml");
    assert_eq!(
        pairs(sh.tokenize("if $(test -f a); then")),
        vec![
            (TokenKind::Keyword, "if"),
            (TokenKind::Text, " "),
            (TokenKind::Keyword, "$("),
            (TokenKind::NameBuiltin, "test"),
            (TokenKind::Text, " "),
            (TokenKind::Text, "-f"),
            (TokenKind::Text, " "),
            (TokenKind::Text, "a"),
            (TokenKind::Keyword, ")"),
            (TokenKind::Text, ";"),
            (TokenKind::Text, " "),
            (TokenKind::Keyword, "then"),
        ]
    );
}

#[test]
fn json_grammars_load_too() {
    let befunge = lexer("befunge.json");
    assert_eq!(befunge.name(), "befunge");
    assert_eq!(
        pairs(befunge.tokenize("1\"hi\",@")),
        vec![
            (TokenKind::Number, "1"),
            (TokenKind::StringDouble, "\"hi\""),
            (TokenKind::NameBuiltin, ","),
            (TokenKind::Keyword, "@"),
        ]
    );
}

#[rstest]
#[case("sql", "sql")]
#[case("shell", "shell")]
#[case("sh", "shell")]
#[case("bash", "shell")]
#[case("bf", "brainfuck")]
#[case("befunge", "befunge")]
fn one_set_serves_every_fixture(#[case] lookup: &str, #[case] name: &str) {
    let grammars = load_grammars(
        ["sql.yaml", "shell.yaml", "brainfuck.yaml", "befunge.json"].map(fixture),
    )
    .unwrap();
    let set = TableSet::builder().grammars(grammars).build().unwrap();
    assert_eq!(set.get(lookup).map(|table| table.name()), Some(name));
}

#[test]
fn options_file_configures_guards() {
    let options = load_options(fixture("options.yaml")).unwrap();
    assert_eq!(options.max_empty_steps, 8);
    assert_eq!(options.max_delegation_depth, 4);
}

#[test]
fn include_cycles_are_reported_with_their_path() {
    let grammar = load_grammar(fixture("cycle.yaml")).unwrap();
    let error = Lexer::new(grammar).unwrap_err();
    assert_eq!(
        error,
        BuildError::IncludeCycle {
            grammar: "broken".into(),
            cycle: vec!["a".into(), "b".into(), "a".into()],
        }
    );
    assert_eq!(error.to_string(), "grammar 'broken': include cycle a -> b -> a");
}

#[rstest]
#[case("name: x\nstates: { main: [] }", "no 'root' state")]
#[case("name: x\nstates: { root: [ { match: 'a', token: Text, next: nowhere } ] }", "unknown state 'nowhere'")]
#[case("name: x\nstates: { root: [ { match: '(a', token: Text } ] }", "invalid pattern '(a'")]
#[case("name: x\nstates: { root: [ { match: 'a*', token: Text } ] }", "can match the empty string")]
#[case("name: x\nstates: { root: [ { match: '\\b', token: Text }, { match: '\\w+', token: Name } ] }", "can match the empty string")]
#[case("name: x\nstates: { root: [ { match: '.', using: other } ] }", "unknown lexer 'other'")]
fn construction_errors_explain_themselves(#[case] yaml: &str, #[case] message: &str) {
    let grammar = statelex::loader::from_yaml(yaml).unwrap();
    let error = Lexer::new(grammar).unwrap_err();
    assert!(
        error.to_string().contains(message),
        "{error} does not mention {message}"
    );
}
