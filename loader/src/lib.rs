//! Schema documents for argkit command trees.
//!
//! Command trees can be written as YAML or JSON documents and turned into a
//! runtime [`CommandSchema`](argkit_core::CommandSchema):
//!
//! ```no_run
//! use argkit_loader::load_schema;
//!
//! let schema = load_schema("cli.yaml").unwrap();
//! let ns = schema.parse_arguments(std::env::args().skip(1)).unwrap();
//! println!("{ns}");
//! ```
//!
//! The document format is chosen by file extension (see [`DocumentFormat`]).

mod document;
mod error;

use std::path::Path;

use argkit_core::CommandSchema;

pub use document::{
    ActionKind, CommandDocument, DocumentFormat, MutexGroupDocument, OperandDocument,
    OptionDocument, ValueKind,
};
pub use error::{LoaderError, Result};

/// Loads a document from `path` and builds its schema tree.
///
/// # Errors
///
/// Any [`LoaderError`] from [`CommandDocument::load`] or
/// [`CommandDocument::to_schema`].
pub fn load_schema(path: impl AsRef<Path>) -> Result<CommandSchema> {
    CommandDocument::load(path)?.to_schema()
}
