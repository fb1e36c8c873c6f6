//! Per-invocation cursor state for the parsing engine.
//!
//! A [`ParseContext`] owns one [`Scope`] per command entered so far. Only the
//! innermost scope is active; its parents are frozen once the parse descends
//! and are folded back together by [`ParseContext::finish`].

use tracing::debug;

use crate::{CommandSchema, Namespace, OptionSchema, ParseError, ParseMode, Value};

/// One command's slice of a parse.
#[derive(Debug)]
struct Scope<'a> {
    command: &'a CommandSchema,
    namespace: Namespace,
    matched: Vec<&'a OptionSchema>,
}

impl<'a> Scope<'a> {
    fn new(command: &'a CommandSchema) -> Self {
        Self {
            command,
            namespace: Namespace::new(),
            matched: Vec::new(),
        }
    }

    fn was_matched(&self, option: &OptionSchema) -> bool {
        self.matched.iter().any(|m| std::ptr::eq(*m, option))
    }

    /// Required checks, then defaults for everything left unset.
    fn finish(&mut self) -> Result<(), ParseError> {
        let command = self.command;

        if let Some(missing) = command
            .all_options()
            .find(|option| option.is_required() && !self.was_matched(option))
        {
            return Err(ParseError::MissingRequiredOption(missing.display_name()));
        }

        if let Some(group) = command
            .mutex_groups()
            .iter()
            .find(|group| group.is_required() && !group.options().iter().any(|o| self.was_matched(o)))
        {
            return Err(ParseError::MutexGroupRequired(group.display_names()));
        }

        for option in command.all_options() {
            if let Some(default) = option.default() {
                self.fill_default(option.store_name(), default);
            }
        }
        for operand in command.operands() {
            if let Some(default) = operand.default() {
                self.fill_default(operand.name(), default);
            }
        }
        Ok(())
    }

    fn fill_default(&mut self, key: &str, default: &Value) {
        if !self.namespace.contains_key(key) {
            debug!(command = self.command.name(), key, "Filling default");
            self.namespace.insert(key, default.clone());
        }
    }
}

/// Mutable state of one parse call.
#[derive(Debug)]
pub(crate) struct ParseContext<'a> {
    scope: Scope<'a>,
    parents: Vec<Scope<'a>>,
    /// Latched by the `--` sentinel.
    pub(crate) end_of_options: bool,
    /// Index of the next operand expected on the active command.
    pub(crate) operand_index: usize,
}

impl<'a> ParseContext<'a> {
    pub(crate) fn new(command: &'a CommandSchema) -> Self {
        Self {
            scope: Scope::new(command),
            parents: Vec::new(),
            end_of_options: false,
            operand_index: 0,
        }
    }

    pub(crate) fn command(&self) -> &'a CommandSchema {
        self.scope.command
    }

    pub(crate) fn namespace_mut(&mut self) -> &mut Namespace {
        &mut self.scope.namespace
    }

    /// Records a matched option, failing if another member of its mutex
    /// group was already matched on this command.
    pub(crate) fn record_match(&mut self, option: &'a OptionSchema) -> Result<(), ParseError> {
        if let Some(group) = self.scope.command.mutex_group_of(option) {
            if let Some(other) = self
                .scope
                .matched
                .iter()
                .find(|m| !std::ptr::eq(**m, option) && group.contains(m))
            {
                return Err(ParseError::MutuallyExclusive {
                    option: option.display_name(),
                    conflicting: other.display_name(),
                });
            }
        }
        if !self.scope.was_matched(option) {
            self.scope.matched.push(option);
        }
        Ok(())
    }

    /// Finishes the active scope and descends into `subcommand`.
    pub(crate) fn enter(&mut self, subcommand: &'a CommandSchema) -> Result<(), ParseError> {
        self.scope.finish()?;
        let parent = std::mem::replace(&mut self.scope, Scope::new(subcommand));
        self.parents.push(parent);
        self.operand_index = 0;
        Ok(())
    }

    /// Finishes the active scope and nests every namespace under its parent,
    /// keyed by the subcommand's primary name.
    pub(crate) fn finish(mut self) -> Result<Namespace, ParseError> {
        self.scope.finish()?;

        let last = self.scope.command;
        if last.parse_mode() == ParseMode::Command
            && last.is_subcommand_required()
            && !last.subcommands().is_empty()
        {
            return Err(ParseError::MissingSubcommand(last.name().to_string()));
        }

        let mut namespace = self.scope.namespace;
        let mut name = last.name();
        while let Some(parent) = self.parents.pop() {
            let mut outer = parent.namespace;
            outer.insert(name, Value::Namespace(namespace));
            namespace = outer;
            name = parent.command.name();
        }
        Ok(namespace)
    }
}
