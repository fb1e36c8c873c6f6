//! Token-driven parsing engine.
//!
//! Each token is classified in a fixed order: the end-of-options sentinel,
//! then long options, then short options (single or grouped), and finally a
//! subcommand name or operand depending on the active command's
//! [`ParseMode`]. Matched options and operands pull their argument values
//! from the stream, are checked against their arity, and fold the values
//! into the active namespace through their [`Action`](crate::Action).
//!
//! Consumption is eager but bounded: a value run stops at the arity limit
//! or at the next `-`-prefixed token, and no token is ever reconsidered.

use tracing::{debug, trace};

use crate::context::ParseContext;
use crate::{
    Argument, CommandSchema, Converter, MissingArguments, NArgs, Namespace, OptionSchema,
    ParseError, ParseMode, TokenStream, Value,
};

/// Token that turns off option recognition for the rest of the input.
pub const END_OF_OPTIONS: &str = "--";
pub const LONG_PREFIX: &str = "--";
pub const SHORT_PREFIX: &str = "-";
/// Separates an option name from an inline value (`--name=value`).
pub const EXPLICIT_ARGUMENT: char = '=';

/// Parses `arguments` against `command`.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; no partial namespace is
/// produced.
///
/// # Examples
///
/// ```
/// use argkit_core::*;
///
/// let mut root = CommandSchema::new("tool");
/// root.add_option(
///     OptionSchema::builder().long("verbose").short("v").action(Action::CountPresence).build()?,
/// );
/// let mut build = CommandSchema::with_parse_mode("build", ParseMode::Operand);
/// build.add_operand(OperandSchema::new("target"))?;
/// root.add_subcommand(build)?;
///
/// let ns = parse_arguments(["-v", "-v", "build", "main.c"], &root).unwrap();
/// assert_eq!(ns.get("verbose"), Some(&Value::Int(2)));
/// assert_eq!(
///     ns.get_namespace("build").and_then(|b| b.get("target")),
///     Some(&Value::from("main.c"))
/// );
///
/// let err = parse_arguments(["push"], &root).unwrap_err();
/// assert_eq!(err, ParseError::UnknownCommand("push".into()));
/// # Ok::<(), SchemaError>(())
/// ```
pub fn parse_arguments<I, S>(arguments: I, command: &CommandSchema) -> Result<Namespace, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let tokens = TokenStream::new(arguments.into_iter().map(Into::<String>::into));
    Parser {
        context: ParseContext::new(command),
        tokens,
    }
    .run()
}

/// Splits `line` with shell quoting rules, then parses the tokens.
///
/// # Errors
///
/// [`ParseError::UnbalancedQuotes`] if the line cannot be split, otherwise
/// as [`parse_arguments`].
///
/// # Examples
///
/// ```
/// use argkit_core::*;
///
/// let mut root = CommandSchema::new("tool");
/// root.add_option(OptionSchema::builder().long("message").short("m").build()?);
///
/// let ns = parse_line(r#"-m "hello world""#, &root).unwrap();
/// assert_eq!(ns.get("message"), Some(&Value::from("hello world")));
/// assert_eq!(parse_line("-m 'open", &root), Err(ParseError::UnbalancedQuotes));
/// # Ok::<(), SchemaError>(())
/// ```
pub fn parse_line(line: &str, command: &CommandSchema) -> Result<Namespace, ParseError> {
    let tokens = shlex::split(line).ok_or(ParseError::UnbalancedQuotes)?;
    parse_arguments(tokens, command)
}

struct Parser<'a, I: Iterator<Item = String>> {
    context: ParseContext<'a>,
    tokens: TokenStream<I>,
}

impl<'a, I: Iterator<Item = String>> Parser<'a, I> {
    fn run(mut self) -> Result<Namespace, ParseError> {
        while let Some(token) = self.tokens.consume() {
            trace!(token = %token, command = self.context.command().name(), "Classifying token");

            if !self.context.end_of_options {
                if token == END_OF_OPTIONS {
                    self.context.end_of_options = true;
                    continue;
                }
                if let Some(body) = token.strip_prefix(LONG_PREFIX) {
                    self.parse_long_option(&token, body)?;
                    continue;
                }
                if let Some(body) = token.strip_prefix(SHORT_PREFIX) {
                    self.parse_short_option(&token, body)?;
                    continue;
                }
            }

            match self.context.command().parse_mode() {
                ParseMode::Command => self.parse_command(token)?,
                ParseMode::Operand => self.parse_operand(token)?,
            }
        }

        self.context.finish()
    }

    fn parse_long_option(&mut self, token: &str, body: &str) -> Result<(), ParseError> {
        let (name, explicit) = split_explicit_argument(body);
        let option = self
            .context
            .command()
            .get_option(name)
            .ok_or_else(|| ParseError::UnknownLongOption(name.to_string()))?;

        let display = format!("{LONG_PREFIX}{name}");
        let values = self.option_arguments(option, token, &display, explicit)?;
        self.apply_option(option, values)
    }

    fn parse_short_option(&mut self, token: &str, body: &str) -> Result<(), ParseError> {
        let (name, explicit) = split_explicit_argument(body);
        if name.chars().count() > 1 {
            return self.parse_short_option_group(token, name, explicit);
        }

        let option = self
            .context
            .command()
            .get_option(name)
            .ok_or_else(|| ParseError::UnknownShortOption(name.to_string()))?;

        let display = format!("{SHORT_PREFIX}{name}");
        let values = self.option_arguments(option, token, &display, explicit)?;
        self.apply_option(option, values)
    }

    /// `-abc`: every member must be a known zero-argument option.
    fn parse_short_option_group(
        &mut self,
        token: &str,
        group: &str,
        explicit: Option<&str>,
    ) -> Result<(), ParseError> {
        let command = self.context.command();
        for ch in group.chars() {
            let option = command
                .get_option(ch.encode_utf8(&mut [0; 4]))
                .ok_or_else(|| ParseError::UnknownShortOptionInGroup {
                    name: ch,
                    group: group.to_string(),
                })?;
            if option.takes_arguments() {
                return Err(ParseError::OptionInGroupTakesArguments {
                    name: ch,
                    group: group.to_string(),
                });
            }
            self.apply_option(option, Vec::new())?;
        }

        if let Some(value) = explicit {
            let option = token.split_once(EXPLICIT_ARGUMENT).map_or(token, |(head, _)| head);
            return Err(ParseError::OptionTakesNoArgument {
                option: option.to_string(),
                value: value.to_string(),
            });
        }
        Ok(())
    }

    fn option_arguments(
        &mut self,
        option: &'a OptionSchema,
        token: &str,
        display: &str,
        explicit: Option<&str>,
    ) -> Result<Vec<Value>, ParseError> {
        let convert = |raw: &str| convert_value(display, option.converter(), option.choices(), raw);

        let values = match (option.takes_arguments(), explicit) {
            (false, Some(value)) => {
                return Err(ParseError::OptionTakesNoArgument {
                    option: display.to_string(),
                    value: value.to_string(),
                });
            }
            (false, None) => Vec::new(),
            (true, Some(value)) => vec![convert(value)?],
            (true, None) => self.consume_arguments(option.nargs(), Vec::new(), convert)?,
        };

        if !option.nargs().is_satisfied(values.len()) {
            return Err(MissingArguments::option(token, option.nargs(), values.len()).into());
        }
        Ok(values)
    }

    fn apply_option(&mut self, option: &'a OptionSchema, values: Vec<Value>) -> Result<(), ParseError> {
        self.context.record_match(option)?;
        self.context.namespace_mut().fold(option.store_name(), |previous| {
            option
                .action()
                .reduce(Argument::Option(option), values, previous)
        });
        Ok(())
    }

    fn parse_command(&mut self, token: String) -> Result<(), ParseError> {
        let subcommand = self
            .context
            .command()
            .get_subcommand(&token)
            .ok_or(ParseError::UnknownCommand(token))?;

        debug!(command = subcommand.name(), "Entering subcommand");
        self.context.enter(subcommand)
    }

    fn parse_operand(&mut self, token: String) -> Result<(), ParseError> {
        let command = self.context.command();
        let Ok(operand) = command.get_operand_by_index(self.context.operand_index) else {
            return Err(ParseError::ExtraOperand(token));
        };

        let convert = |raw: &str| convert_value(operand.name(), operand.converter(), operand.choices(), raw);

        let mut values = vec![convert(&token)?];
        if operand.takes_arguments() {
            values = self.consume_arguments(operand.nargs(), values, convert)?;
        }

        if !operand.nargs().is_satisfied(values.len()) {
            return Err(MissingArguments::operand(operand.name(), operand.nargs(), values.len()).into());
        }

        debug!(operand = operand.name(), count = values.len(), "Matched operand");
        self.context.namespace_mut().fold(operand.name(), |previous| {
            operand
                .action()
                .reduce(Argument::Operand(operand), values, previous)
        });
        self.context.operand_index += 1;
        Ok(())
    }

    /// Pulls values onto `values` until the arity bound or a `-`-prefixed
    /// token (before end-of-options) is reached.
    fn consume_arguments(
        &mut self,
        nargs: NArgs,
        mut values: Vec<Value>,
        convert: impl Fn(&str) -> Result<Value, ParseError>,
    ) -> Result<Vec<Value>, ParseError> {
        while let Some(next) = self.tokens.peek() {
            if !self.context.end_of_options && next.starts_with(SHORT_PREFIX) {
                break;
            }
            match nargs {
                NArgs::Exact(n) if values.len() >= n => break,
                NArgs::Optional if !values.is_empty() => break,
                _ => {}
            }

            values.push(convert(next)?);
            self.tokens.consume();
        }
        Ok(values)
    }
}

fn split_explicit_argument(body: &str) -> (&str, Option<&str>) {
    match body.split_once(EXPLICIT_ARGUMENT) {
        Some((name, value)) => (name, Some(value)),
        None => (body, None),
    }
}

fn convert_value(name: &str, converter: &Converter, choices: &[Value], raw: &str) -> Result<Value, ParseError> {
    let value = converter
        .convert(raw)
        .map_err(|reason| ParseError::InvalidValue {
            name: name.to_string(),
            value: raw.to_string(),
            reason,
        })?;

    if !choices.is_empty() && !choices.contains(&value) {
        return Err(ParseError::InvalidChoice {
            name: name.to_string(),
            value: raw.to_string(),
            choices: choices.iter().map(ToString::to_string).collect(),
        });
    }
    Ok(value)
}
