//! The flat, exit-code-keyed error taxonomy.
//!
//! One variant per error family; `exit_code` is the single source of truth
//! mapping a variant to the process exit code. Kept as a hand-rolled enum
//! with a manual `Display`/`std::error::Error` impl rather than pulling in a
//! derive crate for a taxonomy this small and flat.

use std::{error, fmt, path::PathBuf};

use crate::opcode::Opcode;

/// Where in the program an error was raised, for the one-line diagnostic.
#[derive(Debug, Clone, Copy)]
pub struct At {
    pub opcode: Opcode,
    pub order: i64,
}

#[derive(Debug)]
pub enum Error {
    /// 10 — CLI usage violation (bad flag combination, missing value, ...).
    CliUsage(String),
    /// 11 — a source or input file named on the command line could not be opened.
    FileOpen { path: PathBuf, source: std::io::Error },
    /// 31 — the source document is not well-formed XML.
    XmlParse(String),
    /// 32 — well-formed XML but structurally/lexically invalid IPPcode22.
    Structural(String, Option<At>),
    /// 52 — redefinition of a variable/label already declared, or reference
    /// to an undeclared label.
    Redefinition(String, Option<At>),
    /// 53 — operand type error.
    TypeMismatch(String, Option<At>),
    /// 54 — reference to an undeclared variable.
    UndefinedVariable(String, Option<At>),
    /// 55 — access through an inactive frame.
    InactiveFrame(String, Option<At>),
    /// 56 — read of an uninitialized value, or pop of an empty stack.
    MissingValue(String, Option<At>),
    /// 57 — a well-typed operand with a disallowed value (division by zero,
    /// an out-of-range `EXIT` code).
    BadOperandValue(String, Option<At>),
    /// 58 — string indexing operation out of range.
    StringIndexOutOfRange(String, Option<At>),
    /// 99 — internal error: a state the interpreter itself should never reach.
    Internal(String),
}

impl Error {
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CliUsage(_) => 10,
            Error::FileOpen { .. } => 11,
            Error::XmlParse(_) => 31,
            Error::Structural(..) => 32,
            Error::Redefinition(..) => 52,
            Error::TypeMismatch(..) => 53,
            Error::UndefinedVariable(..) => 54,
            Error::InactiveFrame(..) => 55,
            Error::MissingValue(..) => 56,
            Error::BadOperandValue(..) => 57,
            Error::StringIndexOutOfRange(..) => 58,
            Error::Internal(_) => 99,
        }
    }

    fn at(&self) -> Option<At> {
        match self {
            Error::Structural(_, at)
            | Error::Redefinition(_, at)
            | Error::TypeMismatch(_, at)
            | Error::UndefinedVariable(_, at)
            | Error::InactiveFrame(_, at)
            | Error::MissingValue(_, at)
            | Error::BadOperandValue(_, at)
            | Error::StringIndexOutOfRange(_, at) => *at,
            _ => None,
        }
    }

    /// Attach instruction context if none is already present. Used by the
    /// executor's dispatch loop, which knows the current instruction but the
    /// opcode handlers that raise these errors generally don't bother.
    pub fn with_context(mut self, at: At) -> Self {
        match &mut self {
            Error::Structural(_, slot)
            | Error::Redefinition(_, slot)
            | Error::TypeMismatch(_, slot)
            | Error::UndefinedVariable(_, slot)
            | Error::InactiveFrame(_, slot)
            | Error::MissingValue(_, slot)
            | Error::BadOperandValue(_, slot)
            | Error::StringIndexOutOfRange(_, slot) => {
                if slot.is_none() {
                    *slot = Some(at);
                }
            }
            _ => {}
        }
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(at) = self.at() {
            write!(f, "instruction: {} {}\n", at.opcode, at.order)?;
        }
        match self {
            Error::CliUsage(msg) => write!(f, "{msg}"),
            Error::FileOpen { path, source } => {
                write!(f, "couldn't open file `{}`: {source}", path.display())
            }
            Error::XmlParse(msg) => write!(f, "malformed XML: {msg}"),
            Error::Structural(msg, _) => write!(f, "{msg}"),
            Error::Redefinition(msg, _) => write!(f, "{msg}"),
            Error::TypeMismatch(msg, _) => write!(f, "{msg}"),
            Error::UndefinedVariable(msg, _) => write!(f, "{msg}"),
            Error::InactiveFrame(msg, _) => write!(f, "{msg}"),
            Error::MissingValue(msg, _) => write!(f, "{msg}"),
            Error::BadOperandValue(msg, _) => write!(f, "{msg}"),
            Error::StringIndexOutOfRange(msg, _) => write!(f, "{msg}"),
            Error::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_the_spec_table() {
        let cases: &[(Error, i32)] = &[
            (Error::CliUsage(String::new()), 10),
            (
                Error::FileOpen {
                    path: PathBuf::from("x"),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                },
                11,
            ),
            (Error::XmlParse(String::new()), 31),
            (Error::Structural(String::new(), None), 32),
            (Error::Redefinition(String::new(), None), 52),
            (Error::TypeMismatch(String::new(), None), 53),
            (Error::UndefinedVariable(String::new(), None), 54),
            (Error::InactiveFrame(String::new(), None), 55),
            (Error::MissingValue(String::new(), None), 56),
            (Error::BadOperandValue(String::new(), None), 57),
            (Error::StringIndexOutOfRange(String::new(), None), 58),
            (Error::Internal(String::new()), 99),
        ];
        for (err, code) in cases {
            assert_eq!(err.exit_code(), *code, "{err:?}");
        }
    }
}
