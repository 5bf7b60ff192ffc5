//! Hierarchical token classification
//!
//! Every token produced by the engine carries a [`TokenKind`]. Kinds form a tree
//! rooted at [`TokenKind::Token`]: `String.Single` is-a `String` is-a `Token`.
//! Classification queries walk that tree, so asking whether a token is a comment
//! succeeds for `Comment.Single`, `Comment.Multiline`, and so on.
//!
//! The set is closed. Grammar files name kinds by their dotted name, e.g.
//! `Name.Variable.Instance`, optionally prefixed with `Token.`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! token_kinds {
    ($($variant:ident = $name:literal $(=> $parent:ident)?,)*) => {
        /// A classification tag attached to a span of text
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TokenKind {
            $($variant,)*
        }

        impl TokenKind {
            /// Every kind, parents listed before their children
            pub const ALL: &'static [TokenKind] = &[$(TokenKind::$variant,)*];

            /// The dotted name of this kind, e.g. `"Name.Builtin"`
            pub fn name(self) -> &'static str {
                match self {
                    $(TokenKind::$variant => $name,)*
                }
            }

            /// The direct parent, `None` only for the generic [`TokenKind::Token`]
            pub fn parent(self) -> Option<TokenKind> {
                match self {
                    $(TokenKind::$variant => token_kinds!(@parent $($parent)?),)*
                }
            }
        }
    };
    (@parent) => { None };
    (@parent $parent:ident) => { Some(TokenKind::$parent) };
}

token_kinds! {
    Token = "Token",

    Text = "Text" => Token,
    TextWhitespace = "Text.Whitespace" => Text,
    Whitespace = "Whitespace" => Token,
    Escape = "Escape" => Token,
    Error = "Error" => Token,
    Other = "Other" => Token,

    Keyword = "Keyword" => Token,
    KeywordConstant = "Keyword.Constant" => Keyword,
    KeywordDeclaration = "Keyword.Declaration" => Keyword,
    KeywordNamespace = "Keyword.Namespace" => Keyword,
    KeywordPseudo = "Keyword.Pseudo" => Keyword,
    KeywordReserved = "Keyword.Reserved" => Keyword,
    KeywordType = "Keyword.Type" => Keyword,

    Name = "Name" => Token,
    NameAttribute = "Name.Attribute" => Name,
    NameBuiltin = "Name.Builtin" => Name,
    NameBuiltinPseudo = "Name.Builtin.Pseudo" => NameBuiltin,
    NameClass = "Name.Class" => Name,
    NameConstant = "Name.Constant" => Name,
    NameDecorator = "Name.Decorator" => Name,
    NameEntity = "Name.Entity" => Name,
    NameException = "Name.Exception" => Name,
    NameFunction = "Name.Function" => Name,
    NameFunctionMagic = "Name.Function.Magic" => NameFunction,
    NameProperty = "Name.Property" => Name,
    NameLabel = "Name.Label" => Name,
    NameNamespace = "Name.Namespace" => Name,
    NameOther = "Name.Other" => Name,
    NameTag = "Name.Tag" => Name,
    NameVariable = "Name.Variable" => Name,
    NameVariableClass = "Name.Variable.Class" => NameVariable,
    NameVariableGlobal = "Name.Variable.Global" => NameVariable,
    NameVariableInstance = "Name.Variable.Instance" => NameVariable,
    NameVariableMagic = "Name.Variable.Magic" => NameVariable,

    Literal = "Literal" => Token,
    LiteralDate = "Literal.Date" => Literal,

    String = "String" => Token,
    StringAffix = "String.Affix" => String,
    StringBacktick = "String.Backtick" => String,
    StringChar = "String.Char" => String,
    StringDelimiter = "String.Delimiter" => String,
    StringDoc = "String.Doc" => String,
    StringDouble = "String.Double" => String,
    StringEscape = "String.Escape" => String,
    StringHeredoc = "String.Heredoc" => String,
    StringInterpol = "String.Interpol" => String,
    StringOther = "String.Other" => String,
    StringRegex = "String.Regex" => String,
    StringSingle = "String.Single" => String,
    StringSymbol = "String.Symbol" => String,

    Number = "Number" => Token,
    NumberBin = "Number.Bin" => Number,
    NumberFloat = "Number.Float" => Number,
    NumberHex = "Number.Hex" => Number,
    NumberInteger = "Number.Integer" => Number,
    NumberIntegerLong = "Number.Integer.Long" => NumberInteger,
    NumberOct = "Number.Oct" => Number,

    Operator = "Operator" => Token,
    OperatorWord = "Operator.Word" => Operator,

    Punctuation = "Punctuation" => Token,

    Comment = "Comment" => Token,
    CommentHashbang = "Comment.Hashbang" => Comment,
    CommentMultiline = "Comment.Multiline" => Comment,
    CommentPreproc = "Comment.Preproc" => Comment,
    CommentPreprocFile = "Comment.PreprocFile" => Comment,
    CommentSingle = "Comment.Single" => Comment,
    CommentSpecial = "Comment.Special" => Comment,

    Generic = "Generic" => Token,
    GenericDeleted = "Generic.Deleted" => Generic,
    GenericEmph = "Generic.Emph" => Generic,
    GenericError = "Generic.Error" => Generic,
    GenericHeading = "Generic.Heading" => Generic,
    GenericInserted = "Generic.Inserted" => Generic,
    GenericOutput = "Generic.Output" => Generic,
    GenericPrompt = "Generic.Prompt" => Generic,
    GenericStrong = "Generic.Strong" => Generic,
    GenericSubheading = "Generic.Subheading" => Generic,
    GenericTraceback = "Generic.Traceback" => Generic,
}

impl TokenKind {
    /// Iterate from this kind up to (and including) [`TokenKind::Token`]
    pub fn ancestors(self) -> Ancestors {
        Ancestors { next: Some(self) }
    }

    /// True if `self` is `other` or one of its descendants
    pub fn is_a(self, other: TokenKind) -> bool {
        self.ancestors().any(|kind| kind == other)
    }

    /// Distance from the root; `Token` is 0, `Name` is 1, `Name.Builtin` is 2
    pub fn depth(self) -> usize {
        self.ancestors().count() - 1
    }

    /// The child of [`TokenKind::Token`] this kind descends from
    ///
    /// Returns `Token` for the root itself.
    pub fn top_level(self) -> TokenKind {
        let mut current = self;
        while let Some(parent) = current.parent() {
            if parent == TokenKind::Token {
                return current;
            }
            current = parent;
        }
        current
    }
}

/// Iterator over a kind and its parents
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<TokenKind>,
}

impl Iterator for Ancestors {
    type Item = TokenKind;

    fn next(&mut self) -> Option<TokenKind> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

/// Error returned when a dotted name does not denote a known kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown token kind '{0}'")]
pub struct TokenKindError(pub std::string::String);

impl FromStr for TokenKind {
    type Err = TokenKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = match trimmed.strip_prefix("Token.") {
            Some(rest) => rest,
            None => trimmed,
        };

        TokenKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| TokenKindError(s.to_string()))
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TokenKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = std::string::String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
