//! Declarative command-line argument parsing.
//!
//! This crate defines a schema model for command-line interfaces and the
//! engine that parses raw tokens against it:
//!
//! - [`CommandSchema`]: a command node holding options, mutex groups, and
//!   either subcommands or positional operands (see [`ParseMode`]).
//! - [`OptionSchema`]: a `--long` / `-s` option with arity, default,
//!   converter, choices, and a reducer [`Action`].
//! - [`OperandSchema`]: a positional operand matched by position.
//! - [`MutexGroup`]: options of which at most one may be supplied.
//! - [`Namespace`]: the ordered, nested result of a parse.
//!
//! Parsing ([`parse_arguments`], [`parse_line`]) is a synchronous, fail-fast
//! reduction over the token sequence: it returns a complete [`Namespace`] or
//! the first [`ParseError`]. The schema is only borrowed, so one schema can
//! serve any number of parse calls.
//!
//! # Example
//!
//! ```
//! use argkit_core::*;
//!
//! let mut root = CommandSchema::new("mycli");
//! root.add_option(
//!     OptionSchema::builder()
//!         .long("verbose")
//!         .short("v")
//!         .action(Action::CountPresence)
//!         .build()?,
//! );
//! root.add_option(
//!     OptionSchema::builder()
//!         .long("tag")
//!         .action(Action::ExtendValue)
//!         .nargs(NArgs::ZeroOrMore)
//!         .build()?,
//! );
//!
//! let mut build = CommandSchema::with_parse_mode("build", ParseMode::Operand);
//! build.add_operand(OperandSchema::new("target"))?;
//! root.add_subcommand(build)?;
//!
//! let ns = root.parse_line("--tag a b --tag c -vv build main.c").unwrap();
//! assert_eq!(ns.get("verbose"), Some(&Value::Int(2)));
//! assert_eq!(
//!     ns.get("tag"),
//!     Some(&Value::List(vec!["a".into(), "b".into(), "c".into()]))
//! );
//! assert_eq!(ns.to_string(), "Namespace(tag=[a, b, c], verbose=2, build=Namespace(target=main.c))");
//! # Ok::<(), SchemaError>(())
//! ```

mod action;
mod context;
mod error;
mod namespace;
mod parser;
mod schema;
mod token_stream;
mod types;

pub use action::{Action, Argument, ReduceFn};
pub use error::{
    ArgumentKind, MissingArguments, OperandIndexOutOfRange, ParseError, SchemaError,
};
pub use namespace::Namespace;
pub use parser::{
    END_OF_OPTIONS, EXPLICIT_ARGUMENT, LONG_PREFIX, SHORT_PREFIX, parse_arguments, parse_line,
};
pub use schema::{
    CommandSchema, MutexGroup, OperandBuilder, OperandSchema, OptionBuilder, OptionSchema,
    program_name,
};
pub use token_stream::TokenStream;
pub use types::{ConvertFn, Converter, InvalidNArgs, NArgs, ParseMode, Value};
