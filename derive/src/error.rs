use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, DeriveError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DeriveError {
    MissingGrammarSource,
    MultipleGrammarSources,
    NotAString(String),
    ReadFile { path: String, message: String },
    Notation(ebnf::Error),
    Grammar(packrat::GrammarError),
    InvalidRuleName(String),
    Syn(String),
}

impl Display for DeriveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeriveError::MissingGrammarSource => write!(f, "No grammar source provided"),
            DeriveError::MultipleGrammarSources => {
                write!(f, "At most one grammar source can be provided")
            }
            DeriveError::NotAString(attr) => {
                write!(f, "Attribute `{}` must be a string, e.g. #[{} = \"...\"]", attr, attr)
            }
            DeriveError::ReadFile { path, message } => {
                write!(f, "Failed to read ebnf file {}: {}", path, message)
            }
            DeriveError::Notation(e) => write!(f, "Invalid grammar: {}", e),
            DeriveError::Grammar(e) => write!(f, "Invalid grammar: {}", e),
            DeriveError::InvalidRuleName(name) => {
                write!(f, "Rule name `{}` is not a valid Rust identifier", name)
            }
            DeriveError::Syn(s) => write!(f, "syn error: {}", s),
        }
    }
}

impl From<syn::Error> for DeriveError {
    fn from(e: syn::Error) -> DeriveError {
        DeriveError::Syn(e.to_string())
    }
}

impl From<ebnf::Error> for DeriveError {
    fn from(e: ebnf::Error) -> DeriveError {
        DeriveError::Notation(e)
    }
}

impl From<packrat::GrammarError> for DeriveError {
    fn from(e: packrat::GrammarError) -> DeriveError {
        DeriveError::Grammar(e)
    }
}
