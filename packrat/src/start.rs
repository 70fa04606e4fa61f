use std::convert::TryFrom;
use std::fmt::{self, Display};
use std::str::FromStr;

use crate::error::ParseError;

/// The top-level rule a parse starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartRule {
    /// A whole module.
    FileInput,
    /// One interactive statement.
    SingleInput,
    /// A single expression.
    EvalInput,
    /// A function type comment, `(int, str) -> bool`.
    FuncTypeInput,
}

impl StartRule {
    pub const ALL: [StartRule; 4] = [
        StartRule::FileInput,
        StartRule::SingleInput,
        StartRule::EvalInput,
        StartRule::FuncTypeInput,
    ];

    /// The grammar rule run for this mode.
    pub fn rule_name(self) -> &'static str {
        match self {
            StartRule::FileInput => "file",
            StartRule::SingleInput => "interactive",
            StartRule::EvalInput => "eval",
            StartRule::FuncTypeInput => "func_type",
        }
    }

    /// The conventional name of the mode.
    pub fn mode_name(self) -> &'static str {
        match self {
            StartRule::FileInput => "exec",
            StartRule::SingleInput => "single",
            StartRule::EvalInput => "eval",
            StartRule::FuncTypeInput => "func_type",
        }
    }
}

impl Display for StartRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mode_name())
    }
}

impl FromStr for StartRule {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "exec" | "file" => StartRule::FileInput,
            "single" => StartRule::SingleInput,
            "eval" => StartRule::EvalInput,
            "func_type" => StartRule::FuncTypeInput,
            _ => return Err(ParseError::InvalidStartRule(s.to_owned())),
        })
    }
}

impl TryFrom<i32> for StartRule {
    type Error = ParseError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(StartRule::FileInput),
            1 => Ok(StartRule::SingleInput),
            2 => Ok(StartRule::EvalInput),
            3 => Ok(StartRule::FuncTypeInput),
            _ => Err(ParseError::InvalidStartRule(code.to_string())),
        }
    }
}
