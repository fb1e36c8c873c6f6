//! Serializable schema documents.
//!
//! A [`CommandDocument`] is the on-disk form of a
//! [`CommandSchema`](argkit_core::CommandSchema) tree. Documents are plain
//! data: every field except the command and operand names is optional, and
//! building the runtime schema with [`CommandDocument::to_schema`] is where
//! definition-time rules are enforced.
//!
//! Name lists (`long`, `short`, `aliases`) accept either a single string or a
//! sequence:
//!
//! ```
//! use argkit_loader::CommandDocument;
//!
//! let doc = CommandDocument::from_yaml_str(
//!     r#"
//! name: tool
//! options:
//!   - long: verbose
//!     short: [v]
//!     action: count_presence
//! "#,
//! )
//! .unwrap();
//! assert_eq!(doc.options[0].long, vec!["verbose"]);
//! assert_eq!(doc.options[0].short, vec!["v"]);
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use argkit_core::{
    Action, CommandSchema, Converter, MutexGroup, NArgs, OperandSchema, OptionSchema, ParseMode,
    SchemaError, Value,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{LoaderError, Result};

/// On-disk encoding of a document, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Maps `.json` to [`Json`](Self::Json) and `.yaml`/`.yml` to
    /// [`Yaml`](Self::Yaml).
    ///
    /// # Errors
    ///
    /// [`LoaderError::UnsupportedFormat`] for any other extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use argkit_loader::DocumentFormat;
    ///
    /// assert_eq!(DocumentFormat::from_path("cli.yml").unwrap(), DocumentFormat::Yaml);
    /// assert_eq!(DocumentFormat::from_path("cli.JSON").unwrap(), DocumentFormat::Json);
    /// assert!(DocumentFormat::from_path("cli.toml").is_err());
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(LoaderError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Reducer names as written in documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[default]
    StoreValue,
    StorePresent,
    StoreTrue,
    StoreFalse,
    AppendPresent,
    AppendValue,
    ExtendValue,
    CountPresence,
}

impl From<ActionKind> for Action {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::StoreValue => Action::StoreValue,
            ActionKind::StorePresent => Action::StorePresent,
            ActionKind::StoreTrue => Action::StoreTrue,
            ActionKind::StoreFalse => Action::StoreFalse,
            ActionKind::AppendPresent => Action::AppendPresent,
            ActionKind::AppendValue => Action::AppendValue,
            ActionKind::ExtendValue => Action::ExtendValue,
            ActionKind::CountPresence => Action::CountPresence,
        }
    }
}

/// Built-in converters as written in documents (`type:`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    #[default]
    String,
    Integer,
    Float,
    Boolean,
}

impl From<ValueKind> for Converter {
    fn from(kind: ValueKind) -> Self {
        match kind {
            ValueKind::String => Converter::String,
            ValueKind::Integer => Converter::Integer,
            ValueKind::Float => Converter::Float,
            ValueKind::Boolean => Converter::Boolean,
        }
    }
}

/// A command node and its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDocument {
    pub name: String,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub parse_mode: ParseMode,
    #[serde(default, skip_serializing_if = "is_false")]
    pub subcommand_required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mutex_groups: Vec<MutexGroupDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operands: Vec<OperandDocument>,
}

/// An option definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionDocument {
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub long: Vec<String>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub short: Vec<String>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,
    #[serde(default)]
    pub action: ActionKind,
    /// Falls back to the action's default arity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nargs: Option<NArgs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present: Option<Value>,
    #[serde(default, rename = "type")]
    pub value_type: ValueKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
}

/// A group of options of which at most one may be supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutexGroupDocument {
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<OptionDocument>,
}

/// A positional operand definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperandDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nargs: Option<NArgs>,
    #[serde(default)]
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, rename = "type")]
    pub value_type: ValueKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Value>,
}

impl CommandDocument {
    /// An empty command document in [`ParseMode::Command`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            parse_mode: ParseMode::Command,
            subcommand_required: false,
            options: Vec::new(),
            mutex_groups: Vec::new(),
            subcommands: Vec::new(),
            operands: Vec::new(),
        }
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a document, decoding by file extension.
    ///
    /// # Errors
    ///
    /// [`UnsupportedFormat`](LoaderError::UnsupportedFormat) for an unknown
    /// extension, [`Io`](LoaderError::Io) if the file cannot be read, or
    /// [`Json`](LoaderError::Json) / [`Yaml`](LoaderError::Yaml) if it does
    /// not decode.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)?;
        let reader = BufReader::new(std::fs::File::open(path)?);
        let document: Self = match format {
            DocumentFormat::Json => serde_json::from_reader(reader)?,
            DocumentFormat::Yaml => serde_yaml::from_reader(reader)?,
        };
        debug!(path = %path.display(), command = %document.name, "Loaded schema document");
        Ok(document)
    }

    /// Saves the document, encoding by file extension.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load), for writing.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path)?;
        let writer = BufWriter::new(std::fs::File::create(path)?);
        match format {
            DocumentFormat::Json => serde_json::to_writer_pretty(writer, self)?,
            DocumentFormat::Yaml => serde_yaml::to_writer(writer, self)?,
        }
        debug!(path = %path.display(), command = %self.name, "Saved schema document");
        Ok(())
    }

    /// Builds the runtime schema tree.
    ///
    /// # Errors
    ///
    /// [`LoaderError::Schema`] naming the innermost command whose definition
    /// is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use argkit_loader::CommandDocument;
    /// use argkit_core::Value;
    ///
    /// let doc = CommandDocument::from_json_str(
    ///     r#"{
    ///         "name": "tool",
    ///         "options": [{"long": "jobs", "short": "j", "type": "integer", "default": 1}]
    ///     }"#,
    /// )
    /// .unwrap();
    /// let schema = doc.to_schema().unwrap();
    /// let ns = schema.parse_line("-j 4").unwrap();
    /// assert_eq!(ns.get("jobs"), Some(&Value::Int(4)));
    /// ```
    pub fn to_schema(&self) -> Result<CommandSchema> {
        let invalid = |source: SchemaError| LoaderError::Schema {
            command: self.name.clone(),
            source,
        };

        let mut command = CommandSchema::with_parse_mode(&self.name, self.parse_mode)
            .with_subcommand_required(self.subcommand_required);
        for alias in &self.aliases {
            command = command.with_alias(alias);
        }

        for option in &self.options {
            command.add_option(option.to_schema().map_err(invalid)?);
        }
        for group in &self.mutex_groups {
            command.add_mutex_group(group.to_schema().map_err(invalid)?);
        }
        for subcommand in &self.subcommands {
            command
                .add_subcommand(subcommand.to_schema()?)
                .map_err(invalid)?;
        }
        for operand in &self.operands {
            command
                .add_operand(operand.to_schema().map_err(invalid)?)
                .map_err(invalid)?;
        }
        Ok(command)
    }
}

impl OptionDocument {
    pub fn to_schema(&self) -> std::result::Result<OptionSchema, SchemaError> {
        let mut builder = OptionSchema::builder()
            .action(self.action.into())
            .converter(self.value_type.into())
            .choices(self.choices.iter().cloned())
            .required(self.required);
        for long in &self.long {
            builder = builder.long(long);
        }
        for short in &self.short {
            builder = builder.short(short);
        }
        for alias in &self.aliases {
            builder = builder.alias(alias);
        }
        if let Some(store_name) = &self.store_name {
            builder = builder.store_name(store_name);
        }
        if let Some(nargs) = self.nargs {
            builder = builder.nargs(nargs);
        }
        if let Some(default) = &self.default {
            builder = builder.default_value(default.clone());
        }
        if let Some(present) = &self.present {
            builder = builder.present(present.clone());
        }
        builder.build()
    }
}

impl MutexGroupDocument {
    pub fn to_schema(&self) -> std::result::Result<MutexGroup, SchemaError> {
        let mut group = MutexGroup::new(self.required);
        for option in &self.options {
            group.add_option(option.to_schema()?);
        }
        Ok(group)
    }
}

impl OperandDocument {
    pub fn to_schema(&self) -> std::result::Result<OperandSchema, SchemaError> {
        let mut builder = OperandSchema::builder(&self.name)
            .action(self.action.into())
            .converter(self.value_type.into())
            .choices(self.choices.iter().cloned());
        if let Some(nargs) = self.nargs {
            builder = builder.nargs(nargs);
        }
        if let Some(default) = &self.default {
            builder = builder.default_value(default.clone());
        }
        builder.build()
    }
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(name) => vec![name],
        OneOrMany::Many(names) => names,
    })
}

fn is_false(value: &bool) -> bool {
    !*value
}
