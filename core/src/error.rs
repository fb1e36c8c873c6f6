//! Error types for schema construction and parsing.
//!
//! [`SchemaError`] is raised while a command tree is being built;
//! [`ParseError`] is the single category for everything that can go wrong
//! while a token sequence is parsed. Both carry the offending names and
//! counts as structured data, so callers can render their own messages.

use std::fmt;

use thiserror::Error;

use crate::{NArgs, ParseMode};

/// Errors raised while building a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// An operand was added to a `COMMAND` node or a subcommand to an
    /// `OPERAND` node.
    #[error("{children} are not allowed in {mode} parse mode")]
    ParseMode {
        children: &'static str,
        mode: ParseMode,
    },
    /// An operand was added after one with symbolic arity.
    #[error("cannot add operands after a non-deterministic operand: {0}")]
    OperandAfterNonDeterministicOperand(String),
    /// Neither a long nor a short name was given.
    #[error("option must define at least one long or short name")]
    MissingOptionName,
    /// A short name is not exactly one character.
    #[error("short name must be exactly one character: {0:?}")]
    InvalidShortName(String),
    /// The action needs a present value and none was given.
    #[error("missing 'present' value for action: {0:?}")]
    MissingPresentValue(&'static str),
    /// An operand was declared with `nargs` of zero.
    #[error("operand nargs cannot be zero: {0}")]
    ZeroOperandNargs(String),
}

/// Positional lookup past the last declared operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operand index {index} out of range ({len} declared)")]
pub struct OperandIndexOutOfRange {
    pub index: usize,
    pub len: usize,
}

/// Whether an arity failure belongs to an option or an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    Option,
    Operand,
}

/// An option or operand received fewer values than its arity requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingArguments {
    pub kind: ArgumentKind,
    /// Option token as written, or operand name.
    pub name: String,
    pub expected: NArgs,
    pub received: usize,
}

impl MissingArguments {
    pub fn option(token: impl Into<String>, expected: NArgs, received: usize) -> Self {
        Self {
            kind: ArgumentKind::Option,
            name: token.into(),
            expected,
            received,
        }
    }

    pub fn operand(name: impl Into<String>, expected: NArgs, received: usize) -> Self {
        Self {
            kind: ArgumentKind::Operand,
            name: name.into(),
            expected,
            received,
        }
    }
}

fn arguments(count: usize) -> &'static str {
    if count == 1 { "argument" } else { "arguments" }
}

impl fmt::Display for MissingArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ArgumentKind::Option => "option",
            ArgumentKind::Operand => "operand",
        };
        write!(f, "{kind} {:?} expected ", self.name)?;
        match self.expected {
            NArgs::Exact(n) => write!(f, "{n} {}", arguments(n))?,
            NArgs::OneOrMore => f.write_str("at least 1 argument")?,
            NArgs::Optional => f.write_str("at most 1 argument")?,
            NArgs::ZeroOrMore => f.write_str("any number of arguments")?,
        }
        write!(f, ", got {} {}", self.received, arguments(self.received))
    }
}

impl std::error::Error for MissingArguments {}

/// Errors raised while parsing a token sequence.
///
/// Parsing is fail-fast: the first error aborts the call and no partial
/// namespace is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("unknown long option: --{0}")]
    UnknownLongOption(String),

    #[error("unknown short option: -{0}")]
    UnknownShortOption(String),

    #[error("unknown short option {name:?} in group {group:?}")]
    UnknownShortOptionInGroup { name: char, group: String },

    /// Grouped short options may only be zero-argument flags.
    #[error("argument-taking option {name:?} is not allowed in short option group {group:?}")]
    OptionInGroupTakesArguments { name: char, group: String },

    #[error("option {option:?} takes no arguments, got an explicit argument: {value}")]
    OptionTakesNoArgument { option: String, value: String },

    #[error(transparent)]
    MissingArguments(#[from] MissingArguments),

    #[error("unexpected extra operand: {0}")]
    ExtraOperand(String),

    /// The converter rejected a token.
    #[error("invalid value {value:?} for {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("invalid choice {value:?} for {name} (choose from {})", .choices.join(", "))]
    InvalidChoice {
        name: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("missing required option: {0}")]
    MissingRequiredOption(String),

    #[error("option {option} is mutually exclusive with {conflicting}")]
    MutuallyExclusive { option: String, conflicting: String },

    #[error("one of the options {} is required", .0.join(", "))]
    MutexGroupRequired(Vec<String>),

    #[error("missing subcommand for command: {0}")]
    MissingSubcommand(String),

    #[error("unbalanced quotes in argument string")]
    UnbalancedQuotes,
}

impl ParseError {
    /// Returns `true` for the unknown-option family.
    pub fn is_unknown_option(&self) -> bool {
        matches!(
            self,
            Self::UnknownLongOption(_)
                | Self::UnknownShortOption(_)
                | Self::UnknownShortOptionInGroup { .. }
        )
    }
}
