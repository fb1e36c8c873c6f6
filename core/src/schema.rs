//! Schema model: commands, options, operands, and mutex groups.
//!
//! A schema is built once, ahead of parsing, and is only borrowed immutably by
//! the engine. Options and operands are created through their builders,
//! which enforce the construction-time invariants and fill in defaults
//! (store-name, arity); commands check parse-mode and operand-ordering rules
//! as children are added.
//!
//! # Examples
//!
//! ```
//! use argkit_core::*;
//!
//! let mut root = CommandSchema::new("tool");
//! root.add_option(
//!     OptionSchema::builder()
//!         .long("verbose")
//!         .short("v")
//!         .action(Action::CountPresence)
//!         .build()?,
//! );
//!
//! let mut build = CommandSchema::with_parse_mode("build", ParseMode::Operand);
//! build.add_operand(OperandSchema::new("target"))?;
//! root.add_subcommand(build)?;
//!
//! assert!(root.get_option("v").is_some());
//! assert_eq!(root.get_subcommand("build").map(CommandSchema::name), Some("build"));
//! # Ok::<(), SchemaError>(())
//! ```

use std::path::Path;

use crate::{
    Action, Converter, NArgs, Namespace, OperandIndexOutOfRange, ParseError, ParseMode,
    SchemaError, Value,
};

/// A named, prefix-flagged argument.
#[derive(Debug, Clone)]
pub struct OptionSchema {
    long_names: Vec<String>,
    short_names: Vec<String>,
    aliases: Vec<String>,
    store_name: String,
    action: Action,
    nargs: NArgs,
    default: Option<Value>,
    present: Option<Value>,
    converter: Converter,
    choices: Vec<Value>,
    required: bool,
}

impl OptionSchema {
    pub fn builder() -> OptionBuilder {
        OptionBuilder::default()
    }

    pub fn long_names(&self) -> &[String] {
        &self.long_names
    }

    pub fn short_names(&self) -> &[String] {
        &self.short_names
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Short names, then long names, then aliases.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.short_names
            .iter()
            .chain(&self.long_names)
            .chain(&self.aliases)
            .map(String::as_str)
    }

    pub fn matches(&self, name: &str) -> bool {
        self.all_names().any(|n| n == name)
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn nargs(&self) -> NArgs {
        self.nargs
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn present(&self) -> Option<&Value> {
        self.present.as_ref()
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn choices(&self) -> &[Value] {
        &self.choices
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// `true` for a positive fixed arity or any symbolic arity.
    pub fn takes_arguments(&self) -> bool {
        match self.nargs {
            NArgs::Exact(n) => n > 0,
            _ => true,
        }
    }

    /// Prefixed name used in messages: the first long name, else the
    /// first short name.
    pub fn display_name(&self) -> String {
        match (self.long_names.first(), self.short_names.first()) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => self.store_name.clone(),
        }
    }
}

/// Builder for [`OptionSchema`].
///
/// # Examples
///
/// ```
/// use argkit_core::{Action, NArgs, OptionSchema, SchemaError};
///
/// let tag = OptionSchema::builder()
///     .long("tag")
///     .short("t")
///     .action(Action::ExtendValue)
///     .nargs(NArgs::ZeroOrMore)
///     .build()
///     .unwrap();
/// assert_eq!(tag.store_name(), "tag");
/// assert!(tag.takes_arguments());
///
/// let flag = OptionSchema::builder().short("q").action(Action::StoreTrue).build().unwrap();
/// assert_eq!(flag.store_name(), "q");
/// assert_eq!(flag.nargs(), NArgs::Exact(0));
///
/// assert_eq!(
///     OptionSchema::builder().build().unwrap_err(),
///     SchemaError::MissingOptionName
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptionBuilder {
    long_names: Vec<String>,
    short_names: Vec<String>,
    aliases: Vec<String>,
    store_name: Option<String>,
    action: Option<Action>,
    nargs: Option<NArgs>,
    default: Option<Value>,
    present: Option<Value>,
    converter: Option<Converter>,
    choices: Vec<Value>,
    required: bool,
}

impl OptionBuilder {
    pub fn long(mut self, name: impl Into<String>) -> Self {
        self.long_names.push(name.into());
        self
    }

    pub fn short(mut self, name: impl Into<String>) -> Self {
        self.short_names.push(name.into());
        self
    }

    pub fn alias(mut self, name: impl Into<String>) -> Self {
        self.aliases.push(name.into());
        self
    }

    pub fn store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = Some(name.into());
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub fn nargs(mut self, nargs: NArgs) -> Self {
        self.nargs = Some(nargs);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn present(mut self, value: impl Into<Value>) -> Self {
        self.present = Some(value.into());
        self
    }

    pub fn converter(mut self, converter: Converter) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Validates names and the present value, then fills in the store-name
    /// and arity defaults.
    ///
    /// # Errors
    ///
    /// [`SchemaError::MissingOptionName`] without any long or short name,
    /// [`SchemaError::InvalidShortName`] for a short name that is not one
    /// character, and [`SchemaError::MissingPresentValue`] for
    /// [`Action::AppendPresent`] without a present value.
    pub fn build(self) -> Result<OptionSchema, SchemaError> {
        let store_name = match (self.store_name, self.long_names.first(), self.short_names.first()) {
            (_, None, None) => return Err(SchemaError::MissingOptionName),
            (Some(name), _, _) => name,
            (None, Some(long), _) => long.clone(),
            (None, None, Some(short)) => short.clone(),
        };

        if let Some(bad) = self.short_names.iter().find(|s| s.chars().count() != 1) {
            return Err(SchemaError::InvalidShortName(bad.clone()));
        }

        let action = self.action.unwrap_or_default();
        if matches!(action, Action::AppendPresent) && self.present.is_none() {
            return Err(SchemaError::MissingPresentValue(action.name()));
        }
        let nargs = self.nargs.unwrap_or_else(|| action.default_nargs());

        Ok(OptionSchema {
            long_names: self.long_names,
            short_names: self.short_names,
            aliases: self.aliases,
            store_name,
            action,
            nargs,
            default: self.default,
            present: self.present,
            converter: self.converter.unwrap_or_default(),
            choices: self.choices,
            required: self.required,
        })
    }
}

/// A positional argument matched by position.
#[derive(Debug, Clone)]
pub struct OperandSchema {
    name: String,
    action: Action,
    nargs: NArgs,
    default: Option<Value>,
    converter: Converter,
    choices: Vec<Value>,
}

impl OperandSchema {
    /// Single-valued string operand with the store-value action.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: Action::StoreValue,
            nargs: NArgs::Exact(1),
            default: None,
            converter: Converter::String,
            choices: Vec::new(),
        }
    }

    pub fn builder(name: impl Into<String>) -> OperandBuilder {
        OperandBuilder {
            operand: Self::new(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn nargs(&self) -> NArgs {
        self.nargs
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn choices(&self) -> &[Value] {
        &self.choices
    }

    /// Symbolic arity makes the operand non-deterministic: it must be the
    /// last one declared on its command.
    pub fn is_non_deterministic(&self) -> bool {
        self.nargs.is_symbolic()
    }

    /// Whether values beyond the operand's own token are consumed.
    pub fn takes_arguments(&self) -> bool {
        match self.nargs {
            NArgs::Exact(n) => n > 1,
            NArgs::Optional => false,
            NArgs::ZeroOrMore | NArgs::OneOrMore => true,
        }
    }
}

/// Builder for [`OperandSchema`].
#[derive(Debug, Clone)]
pub struct OperandBuilder {
    operand: OperandSchema,
}

impl OperandBuilder {
    pub fn action(mut self, action: Action) -> Self {
        self.operand.action = action;
        self
    }

    pub fn nargs(mut self, nargs: NArgs) -> Self {
        self.operand.nargs = nargs;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.operand.default = Some(value.into());
        self
    }

    pub fn converter(mut self, converter: Converter) -> Self {
        self.operand.converter = converter;
        self
    }

    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.operand.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// # Errors
    ///
    /// [`SchemaError::ZeroOperandNargs`] for `NArgs::Exact(0)`.
    pub fn build(self) -> Result<OperandSchema, SchemaError> {
        if self.operand.nargs == NArgs::Exact(0) {
            return Err(SchemaError::ZeroOperandNargs(self.operand.name));
        }
        Ok(self.operand)
    }
}

/// Options of which at most one (exactly one if required) may be supplied.
#[derive(Debug, Clone, Default)]
pub struct MutexGroup {
    required: bool,
    options: Vec<OptionSchema>,
}

impl MutexGroup {
    pub fn new(required: bool) -> Self {
        Self {
            required,
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, option: OptionSchema) -> Self {
        self.options.push(option);
        self
    }

    pub fn add_option(&mut self, option: OptionSchema) {
        self.options.push(option);
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn options(&self) -> &[OptionSchema] {
        &self.options
    }

    /// Identity check: is this exact option owned by the group?
    pub fn contains(&self, option: &OptionSchema) -> bool {
        self.options.iter().any(|o| std::ptr::eq(o, option))
    }

    pub fn display_names(&self) -> Vec<String> {
        self.options.iter().map(OptionSchema::display_name).collect()
    }
}

/// A command node: options, mutex groups, and either subcommands or
/// operands depending on its [`ParseMode`].
#[derive(Debug, Clone)]
pub struct CommandSchema {
    name: String,
    aliases: Vec<String>,
    parse_mode: ParseMode,
    subcommand_required: bool,
    options: Vec<OptionSchema>,
    mutex_groups: Vec<MutexGroup>,
    subcommands: Vec<CommandSchema>,
    operands: Vec<OperandSchema>,
    non_deterministic_operand: Option<usize>,
}

impl CommandSchema {
    /// Creates a `COMMAND`-mode node.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_parse_mode(name, ParseMode::Command)
    }

    pub fn with_parse_mode(name: impl Into<String>, parse_mode: ParseMode) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            parse_mode,
            subcommand_required: false,
            options: Vec::new(),
            mutex_groups: Vec::new(),
            subcommands: Vec::new(),
            operands: Vec::new(),
            non_deterministic_operand: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Makes a parse that stops on this command without entering a
    /// subcommand fail with [`ParseError::MissingSubcommand`].
    pub fn with_subcommand_required(mut self, required: bool) -> Self {
        self.subcommand_required = required;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub fn parse_mode(&self) -> ParseMode {
        self.parse_mode
    }

    pub fn is_subcommand_required(&self) -> bool {
        self.subcommand_required
    }

    pub fn options(&self) -> &[OptionSchema] {
        &self.options
    }

    pub fn mutex_groups(&self) -> &[MutexGroup] {
        &self.mutex_groups
    }

    pub fn subcommands(&self) -> &[CommandSchema] {
        &self.subcommands
    }

    pub fn operands(&self) -> &[OperandSchema] {
        &self.operands
    }

    pub fn non_deterministic_operand(&self) -> Option<&OperandSchema> {
        self.non_deterministic_operand.map(|i| &self.operands[i])
    }

    pub fn add_option(&mut self, option: OptionSchema) {
        self.options.push(option);
    }

    /// Builds an option and adds it, returning the stored option.
    pub fn option(&mut self, builder: OptionBuilder) -> Result<&OptionSchema, SchemaError> {
        self.options.push(builder.build()?);
        Ok(&self.options[self.options.len() - 1])
    }

    pub fn add_mutex_group(&mut self, group: MutexGroup) {
        self.mutex_groups.push(group);
    }

    /// # Errors
    ///
    /// [`SchemaError::ParseMode`] on an `OPERAND`-mode node.
    pub fn add_subcommand(&mut self, subcommand: CommandSchema) -> Result<(), SchemaError> {
        if self.parse_mode != ParseMode::Command {
            return Err(SchemaError::ParseMode {
                children: "subcommands",
                mode: self.parse_mode,
            });
        }
        self.subcommands.push(subcommand);
        Ok(())
    }

    /// Adds an empty subcommand and returns it for further building.
    pub fn subcommand(
        &mut self,
        name: impl Into<String>,
        parse_mode: ParseMode,
    ) -> Result<&mut CommandSchema, SchemaError> {
        self.add_subcommand(CommandSchema::with_parse_mode(name, parse_mode))?;
        let last = self.subcommands.len() - 1;
        Ok(&mut self.subcommands[last])
    }

    /// # Errors
    ///
    /// [`SchemaError::ParseMode`] on a `COMMAND`-mode node, and
    /// [`SchemaError::OperandAfterNonDeterministicOperand`] once an operand
    /// with symbolic arity has been added.
    pub fn add_operand(&mut self, operand: OperandSchema) -> Result<(), SchemaError> {
        if self.parse_mode != ParseMode::Operand {
            return Err(SchemaError::ParseMode {
                children: "operands",
                mode: self.parse_mode,
            });
        }
        if let Some(existing) = self.non_deterministic_operand() {
            return Err(SchemaError::OperandAfterNonDeterministicOperand(
                existing.name().to_string(),
            ));
        }
        if operand.is_non_deterministic() {
            self.non_deterministic_operand = Some(self.operands.len());
        }
        self.operands.push(operand);
        Ok(())
    }

    /// Own options first, then the members of each mutex group, in
    /// declaration order.
    pub fn all_options(&self) -> impl Iterator<Item = &OptionSchema> {
        self.options
            .iter()
            .chain(self.mutex_groups.iter().flat_map(|g| g.options.iter()))
    }

    /// First option recognizing `name` (short, long, or alias).
    pub fn get_option(&self, name: &str) -> Option<&OptionSchema> {
        self.all_options().find(|option| option.matches(name))
    }

    /// The mutex group owning this exact option, if any.
    pub fn mutex_group_of(&self, option: &OptionSchema) -> Option<&MutexGroup> {
        self.mutex_groups.iter().find(|g| g.contains(option))
    }

    pub fn get_subcommand(&self, name: &str) -> Option<&CommandSchema> {
        self.subcommands
            .iter()
            .find(|sub| sub.all_names().any(|n| n == name))
    }

    pub fn get_operand(&self, name: &str) -> Option<&OperandSchema> {
        self.operands.iter().find(|operand| operand.name == name)
    }

    /// Bounds-checked positional lookup.
    pub fn get_operand_by_index(&self, index: usize) -> Result<&OperandSchema, OperandIndexOutOfRange> {
        self.operands.get(index).ok_or(OperandIndexOutOfRange {
            index,
            len: self.operands.len(),
        })
    }

    /// Parses tokens against this command. See [`parse_arguments`](crate::parse_arguments).
    pub fn parse_arguments<I, S>(&self, arguments: I) -> Result<Namespace, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        crate::parse_arguments(arguments, self)
    }

    /// Splits `line` shell-style and parses it. See [`parse_line`](crate::parse_line).
    pub fn parse_line(&self, line: &str) -> Result<Namespace, ParseError> {
        crate::parse_line(line, self)
    }
}

/// Derives a command name from an externally supplied `argv[0]`.
///
/// Returns the final path component of `argv0`, or `fallback` when it is
/// absent or has no file name.
///
/// # Examples
///
/// ```
/// use argkit_core::program_name;
///
/// assert_eq!(program_name(Some("/usr/local/bin/tool"), "app"), "tool");
/// assert_eq!(program_name(None, "app"), "app");
/// assert_eq!(program_name(Some(""), "app"), "app");
/// ```
pub fn program_name(argv0: Option<&str>, fallback: &str) -> String {
    argv0
        .and_then(|arg| Path::new(arg).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
