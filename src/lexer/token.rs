use std::fmt::{self, Display, Formatter};

use crate::common::Spanned;

/// A numeric literal, split by lexical shape rather than value so the
/// parser can hand each to the right `xs:` constructor (spec §4.2: integer,
/// decimal, and double literals are distinct lexical forms).
#[derive(Debug, Clone, PartialEq)]
pub enum NumberLit {
    Integer(i64),
    Decimal(f64),
    Double(f64),
}

impl Display for NumberLit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            NumberLit::Integer(n) => write!(f, "{}", n),
            NumberLit::Decimal(n) => write!(f, "{}", n),
            NumberLit::Double(n) => write!(f, "{}", n),
        }
    }
}

/// A (possibly prefixed) name, or one of the 3.0+ wildcard/braced-URI forms
/// (spec §4.2: `*`, `pfx:*`, `*:local`, `Q{uri}local`).
#[derive(Debug, Clone, PartialEq)]
pub enum NameToken {
    /// `local`, or `prefix:local`.
    QName { prefix: Option<String>, local: String },
    /// `*`
    Wildcard,
    /// `prefix:*`
    PrefixWildcard(String),
    /// `*:local`
    LocalWildcard(String),
    /// `Q{uri}local` (3.0+ braced URI literal).
    BracedUri { uri: String, local: String },
}

/// The lexical tokens recognized by the XPath grammar, shared across all
/// four dialects (spec §4.2). Which tokens a given version's parser
/// actually *registers* a meaning for is the dialect's concern, not the
/// lexer's — the lexer recognizes the full surface grammar and leaves
/// unrecognized-in-this-version tokens to raise `XPST0003` at the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(NumberLit),
    /// A string literal's decoded contents (quote style and doubled-quote
    /// escapes already resolved).
    String(String),
    Name(NameToken),
    /// A `$`-prefixed variable reference name (without the `$`).
    Variable(NameToken),
    /// Any operator/punctuation symbol, e.g. `+`, `//`, `!=`, `=>`, `||`.
    Op(String),
    /// `(` `)` `[` `]` `{` `}`
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    /// A context-sensitive reserved word, e.g. `if`, `for`, `return`,
    /// `instance`, `of`, `div`. These lex identically to `Name` until the
    /// kernel's lookahead window disambiguates keyword-vs-identifier use.
    Keyword(String),
    Eof,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number `{}`", n),
            Token::String(s) => write!(f, "string literal {:?}", s),
            Token::Name(n) => write!(f, "name `{}`", display_name(n)),
            Token::Variable(n) => write!(f, "variable `${}`", display_name(n)),
            Token::Op(o) => write!(f, "operator `{}`", o),
            Token::LParen => write!(f, "`(`"),
            Token::RParen => write!(f, "`)`"),
            Token::LBracket => write!(f, "`[`"),
            Token::RBracket => write!(f, "`]`"),
            Token::LBrace => write!(f, "`{{`"),
            Token::RBrace => write!(f, "`}}`"),
            Token::Keyword(k) => write!(f, "keyword `{}`", k),
            Token::Eof => write!(f, "end of expression"),
        }
    }
}

fn display_name(n: &NameToken) -> String {
    match n {
        NameToken::QName { prefix: Some(p), local } => format!("{}:{}", p, local),
        NameToken::QName { prefix: None, local } => local.clone(),
        NameToken::Wildcard => "*".to_string(),
        NameToken::PrefixWildcard(p) => format!("{}:*", p),
        NameToken::LocalWildcard(l) => format!("*:{}", l),
        NameToken::BracedUri { uri, local } => format!("Q{{{}}}{}", uri, local),
    }
}

pub type Tokens = Vec<Spanned<Token>>;

/// The set of words the lexer treats as "keyword-shaped" — a superset over
/// all dialects. A given dialect's parser only gives `nud`/`led` meaning to
/// the subset it registers; an unregistered keyword used as an identifier
/// is accepted by the lexer and rejected (or accepted as a plain name,
/// version-dependent) by the parser.
pub const KEYWORDS: &[&str] = &[
    "if", "then", "else", "for", "let", "return", "some", "every", "in", "satisfies",
    "cast", "castable", "treat", "instance", "of", "as", "to", "div", "idiv", "mod",
    "union", "intersect", "except", "and", "or", "eq", "ne", "lt", "le", "gt", "ge",
    "is", "child", "descendant", "descendant-or-self", "self", "parent", "ancestor",
    "ancestor-or-self", "following-sibling", "preceding-sibling", "following",
    "preceding", "attribute", "namespace", "node", "text", "comment",
    "processing-instruction", "document-node", "element", "schema-element",
    "schema-attribute", "namespace-node", "item", "function", "map", "array",
    "empty-sequence",
];
