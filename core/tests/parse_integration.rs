use argkit_core::{
    Action, CommandSchema, Converter, MissingArguments, MutexGroup, NArgs, Namespace,
    OperandSchema, OptionSchema, ParseError, ParseMode, Value, parse_arguments,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn flag(long: &str, short: &str) -> OptionSchema {
    OptionSchema::builder()
        .long(long)
        .short(short)
        .action(Action::StoreTrue)
        .build()
        .unwrap()
}

fn valued(long: &str, short: &str, nargs: NArgs) -> OptionSchema {
    OptionSchema::builder()
        .long(long)
        .short(short)
        .nargs(nargs)
        .action(Action::StoreValue)
        .build()
        .unwrap()
}

fn strs(items: &[&str]) -> Value {
    Value::List(items.iter().copied().map(Value::from).collect())
}

fn parse(command: &CommandSchema, tokens: &[&str]) -> Result<Namespace, ParseError> {
    parse_arguments(tokens.iter().copied(), command)
}

/// `tool [-v] [--tag ...] build <target>` plus a `cp <sources>... ` leaf.
fn sample_tree() -> CommandSchema {
    let mut root = CommandSchema::new("tool");
    root.add_option(
        OptionSchema::builder()
            .long("verbose")
            .short("v")
            .action(Action::CountPresence)
            .build()
            .unwrap(),
    );

    let mut build = CommandSchema::with_parse_mode("build", ParseMode::Operand).with_alias("b");
    build.add_option(flag("release", "r"));
    build.add_operand(OperandSchema::new("target")).unwrap();
    root.add_subcommand(build).unwrap();

    let mut cp = CommandSchema::with_parse_mode("cp", ParseMode::Operand);
    cp.add_operand(OperandSchema::new("dest")).unwrap();
    cp.add_operand(
        OperandSchema::builder("sources")
            .nargs(NArgs::OneOrMore)
            .action(Action::ExtendValue)
            .build()
            .unwrap(),
    )
    .unwrap();
    root.add_subcommand(cp).unwrap();

    root
}

// ---------------------------------------------------------------------------
// Arity
// ---------------------------------------------------------------------------

#[test]
fn exact_arity_consumes_exactly_n_tokens() {
    let mut command = CommandSchema::with_parse_mode("tool", ParseMode::Operand);
    command.add_option(
        OptionSchema::builder()
            .long("point")
            .nargs(NArgs::Exact(3))
            .action(Action::AppendValue)
            .build()
            .unwrap(),
    );
    command.add_operand(OperandSchema::new("file")).unwrap();

    let ns = parse(&command, &["--point", "1", "2", "3", "out.svg"]).unwrap();
    assert_eq!(ns.get("point"), Some(&Value::List(vec![strs(&["1", "2", "3"])])));
    assert_eq!(ns.get("file"), Some(&Value::from("out.svg")));
}

#[test]
fn exact_arity_short_by_one_reports_expected_and_received() {
    let mut command = CommandSchema::new("tool");
    command.add_option(valued("point", "p", NArgs::Exact(3)));

    let err = parse(&command, &["--point", "1", "2"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingArguments(MissingArguments::option("--point", NArgs::Exact(3), 2))
    );

    let err = parse(&command, &["-p", "1", "2"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingArguments(MissingArguments::option("-p", NArgs::Exact(3), 2))
    );
}

#[test]
fn one_or_more_requires_a_value() {
    let mut command = CommandSchema::new("tool");
    command.add_option(valued("include", "I", NArgs::OneOrMore));

    let err = parse(&command, &["--include", "-I"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingArguments(MissingArguments::option("--include", NArgs::OneOrMore, 0))
    );
}

#[test]
fn optional_arity_takes_at_most_one_value() {
    let mut command = CommandSchema::with_parse_mode("tool", ParseMode::Operand);
    command.add_option(valued("color", "c", NArgs::Optional));
    command.add_operand(OperandSchema::new("file")).unwrap();

    let ns = parse(&command, &["--color", "always", "a.txt"]).unwrap();
    assert_eq!(ns.get("color"), Some(&Value::from("always")));
    assert_eq!(ns.get("file"), Some(&Value::from("a.txt")));

    let ns = parse(&command, &["--color"]).unwrap();
    assert_eq!(ns.get("color"), Some(&Value::None));
}

#[test]
fn inline_value_is_still_arity_checked() {
    let mut command = CommandSchema::new("tool");
    command.add_option(valued("pair", "p", NArgs::Exact(2)));

    let err = parse(&command, &["--pair=a", "b"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingArguments(MissingArguments::option("--pair=a", NArgs::Exact(2), 1))
    );
}

// ---------------------------------------------------------------------------
// Option forms
// ---------------------------------------------------------------------------

#[test]
fn long_and_short_forms_store_identically() {
    let mut command = CommandSchema::new("tool");
    command.add_option(valued("name", "n", NArgs::Exact(1)));

    let long = parse(&command, &["--name", "value"]).unwrap();
    let short = parse(&command, &["-n", "value"]).unwrap();
    let inline = parse(&command, &["--name=value"]).unwrap();
    assert_eq!(long, short);
    assert_eq!(long, inline);
    assert_eq!(long.get("name"), Some(&Value::from("value")));
}

#[test]
fn aliases_resolve_to_the_same_store_name() {
    let mut command = CommandSchema::new("tool");
    command.add_option(
        OptionSchema::builder()
            .long("colour")
            .alias("color")
            .build()
            .unwrap(),
    );

    let ns = parse(&command, &["--color", "red"]).unwrap();
    assert_eq!(ns.get("colour"), Some(&Value::from("red")));
}

#[test]
fn short_group_matches_individual_flags() {
    let mut command = CommandSchema::new("tool");
    command.add_option(flag("all", "a"));
    command.add_option(flag("brief", "b"));
    command.add_option(flag("color", "c"));

    let grouped = parse(&command, &["-abc"]).unwrap();
    let separate = parse(&command, &["-a", "-b", "-c"]).unwrap();
    assert_eq!(grouped, separate);
    assert_eq!(grouped.len(), 3);
}

#[test]
fn short_group_rejects_argument_taking_member() {
    let mut command = CommandSchema::new("tool");
    command.add_option(flag("all", "a"));
    command.add_option(valued("block", "b", NArgs::Exact(1)));

    let err = parse(&command, &["-ab"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::OptionInGroupTakesArguments {
            name: 'b',
            group: "ab".into()
        }
    );
}

#[test]
fn short_group_rejects_unknown_member() {
    let mut command = CommandSchema::new("tool");
    command.add_option(flag("all", "a"));

    let err = parse(&command, &["-az"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::UnknownShortOptionInGroup {
            name: 'z',
            group: "az".into()
        }
    );
    assert!(err.is_unknown_option());
}

#[test]
fn unknown_options_are_reported_by_family() {
    let command = CommandSchema::new("tool");
    assert_eq!(
        parse(&command, &["--nope=1"]).unwrap_err(),
        ParseError::UnknownLongOption("nope".into())
    );
    assert_eq!(
        parse(&command, &["-x"]).unwrap_err(),
        ParseError::UnknownShortOption("x".into())
    );
}

// ---------------------------------------------------------------------------
// End of options
// ---------------------------------------------------------------------------

#[test]
fn end_of_options_treats_option_shaped_tokens_as_operands() {
    let mut command = CommandSchema::with_parse_mode("rm", ParseMode::Operand);
    command.add_option(flag("exclude", "x"));
    command.add_operand(OperandSchema::new("path")).unwrap();

    let ns = parse(&command, &["--", "-x"]).unwrap();
    assert_eq!(ns.get("path"), Some(&Value::from("-x")));
    assert!(!ns.contains_key("exclude"));
}

#[test]
fn end_of_options_lets_values_start_with_dash() {
    let mut command = CommandSchema::with_parse_mode("grep", ParseMode::Operand);
    command.add_operand(
        OperandSchema::builder("patterns")
            .nargs(NArgs::ZeroOrMore)
            .action(Action::ExtendValue)
            .build()
            .unwrap(),
    )
    .unwrap();

    let ns = parse(&command, &["--", "-a", "--", "b"]).unwrap();
    assert_eq!(ns.get("patterns"), Some(&strs(&["-a", "--", "b"])));
}

#[test]
fn end_of_options_in_command_mode_resolves_subcommands() {
    let root = sample_tree();
    let err = parse(&root, &["--", "-v"]).unwrap_err();
    assert_eq!(err, ParseError::UnknownCommand("-v".into()));
}

// ---------------------------------------------------------------------------
// Reducers through the engine
// ---------------------------------------------------------------------------

#[test]
fn repeated_extend_option_accumulates_in_order() {
    let mut command = CommandSchema::new("tool");
    command.add_option(
        OptionSchema::builder()
            .long("tag")
            .nargs(NArgs::ZeroOrMore)
            .action(Action::ExtendValue)
            .build()
            .unwrap(),
    );

    let ns = parse(&command, &["--tag", "a", "b", "--tag", "c"]).unwrap();
    assert_eq!(ns.get("tag"), Some(&strs(&["a", "b", "c"])));
}

#[test]
fn count_presence_counts_occurrences() {
    let root = sample_tree();
    let ns = parse(&root, &["-v", "-v", "-v"]).unwrap();
    assert_eq!(ns.get("verbose"), Some(&Value::Int(3)));

    let ns = parse(&root, &["-vvv"]).unwrap();
    assert_eq!(ns.get("verbose"), Some(&Value::Int(3)));
}

#[test]
fn append_present_and_store_flags() {
    let mut command = CommandSchema::new("tool");
    command.add_option(
        OptionSchema::builder()
            .short("d")
            .store_name("debug")
            .action(Action::AppendPresent)
            .present("d")
            .build()
            .unwrap(),
    );
    command.add_option(
        OptionSchema::builder()
            .long("no-cache")
            .store_name("cache")
            .action(Action::StoreFalse)
            .build()
            .unwrap(),
    );
    command.add_option(
        OptionSchema::builder()
            .long("fast")
            .store_name("mode")
            .action(Action::StorePresent)
            .present("fast")
            .build()
            .unwrap(),
    );

    let ns = parse(&command, &["-dd", "--no-cache", "--fast"]).unwrap();
    assert_eq!(ns.get("debug"), Some(&strs(&["d", "d"])));
    assert_eq!(ns.get("cache"), Some(&Value::Bool(false)));
    assert_eq!(ns.get("mode"), Some(&Value::from("fast")));
}

#[test]
fn store_value_overwrites() {
    let mut command = CommandSchema::new("tool");
    command.add_option(valued("output", "o", NArgs::Exact(1)));

    let ns = parse(&command, &["-o", "a", "-o", "b"]).unwrap();
    assert_eq!(ns.get("output"), Some(&Value::from("b")));
}

#[test]
fn custom_reducer_is_invoked_with_previous_value() {
    let mut command = CommandSchema::new("tool");
    command.add_option(
        OptionSchema::builder()
            .long("add")
            .converter(Converter::Integer)
            .action(Action::custom(|_, values, previous| {
                let sum: i64 = values.iter().filter_map(Value::as_int).sum();
                Value::Int(previous.and_then(|p| p.as_int()).unwrap_or(0) + sum)
            }))
            .build()
            .unwrap(),
    );

    let ns = parse(&command, &["--add", "2", "--add=5"]).unwrap();
    assert_eq!(ns.get("add"), Some(&Value::Int(7)));
}

// ---------------------------------------------------------------------------
// Subcommands and operands
// ---------------------------------------------------------------------------

#[test]
fn subcommand_results_nest_under_primary_name() {
    let root = sample_tree();

    let ns = parse(&root, &["build", "main.c"]).unwrap();
    let expected: Namespace = [(
        "build",
        Value::Namespace([("target", "main.c")].into_iter().collect()),
    )]
    .into_iter()
    .collect();
    assert_eq!(ns, expected);

    let via_alias = parse(&root, &["b", "main.c"]).unwrap();
    assert_eq!(via_alias, expected);
}

#[test]
fn options_resolve_against_the_current_command() {
    let root = sample_tree();

    let ns = parse(&root, &["-v", "build", "-r", "main.c"]).unwrap();
    assert_eq!(ns.get("verbose"), Some(&Value::Int(1)));
    let build = ns.get_namespace("build").unwrap();
    assert_eq!(build.get("release"), Some(&Value::Bool(true)));

    let err = parse(&root, &["build", "-v", "main.c"]).unwrap_err();
    assert_eq!(err, ParseError::UnknownShortOption("v".into()));
}

#[test]
fn extra_operand_fails_on_the_surplus_token() {
    let root = sample_tree();
    let err = parse(&root, &["build", "main.c", "extra.c"]).unwrap_err();
    assert_eq!(err, ParseError::ExtraOperand("extra.c".into()));
}

#[test]
fn non_deterministic_operand_collects_the_rest() {
    let root = sample_tree();
    let ns = parse(&root, &["cp", "/tmp", "a", "b", "c"]).unwrap();
    let cp = ns.get_namespace("cp").unwrap();
    assert_eq!(cp.get("dest"), Some(&Value::from("/tmp")));
    assert_eq!(cp.get("sources"), Some(&strs(&["a", "b", "c"])));
}

#[test]
fn fixed_operand_arity_counts_its_own_token() {
    let mut command = CommandSchema::with_parse_mode("mv", ParseMode::Operand);
    command
        .add_operand(
            OperandSchema::builder("pair")
                .nargs(NArgs::Exact(2))
                .action(Action::ExtendValue)
                .build()
                .unwrap(),
        )
        .unwrap();
    command.add_operand(OperandSchema::new("dest")).unwrap();

    let ns = parse(&command, &["a", "b", "c"]).unwrap();
    assert_eq!(ns.get("pair"), Some(&strs(&["a", "b"])));
    assert_eq!(ns.get("dest"), Some(&Value::from("c")));

    let err = parse(&command, &["a", "-"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingArguments(MissingArguments::operand("pair", NArgs::Exact(2), 1))
    );
}

#[test]
fn unknown_subcommand() {
    let root = sample_tree();
    assert_eq!(
        parse(&root, &["deploy"]).unwrap_err(),
        ParseError::UnknownCommand("deploy".into())
    );
}

#[test]
fn required_subcommand_must_be_entered() {
    let mut root = CommandSchema::new("git").with_subcommand_required(true);
    root.add_option(flag("version", "V"));
    root.add_subcommand(CommandSchema::new("status")).unwrap();

    assert_eq!(
        parse(&root, &["-V"]).unwrap_err(),
        ParseError::MissingSubcommand("git".into())
    );
    let ns = parse(&root, &["status"]).unwrap();
    assert_eq!(ns.get_namespace("status"), Some(&Namespace::new()));
}

// ---------------------------------------------------------------------------
// Conversion, choices, defaults, required
// ---------------------------------------------------------------------------

#[test]
fn values_are_converted_and_validated() {
    let mut command = CommandSchema::new("tool");
    command.add_option(
        OptionSchema::builder()
            .long("jobs")
            .short("j")
            .converter(Converter::Integer)
            .build()
            .unwrap(),
    );
    command.add_option(
        OptionSchema::builder()
            .long("format")
            .choices(["json", "yaml"])
            .build()
            .unwrap(),
    );

    let ns = parse(&command, &["-j", "8", "--format=yaml"]).unwrap();
    assert_eq!(ns.get("jobs"), Some(&Value::Int(8)));
    assert_eq!(ns.get("format"), Some(&Value::from("yaml")));

    let err = parse(&command, &["--jobs", "many"]).unwrap_err();
    assert!(matches!(err, ParseError::InvalidValue { ref name, ref value, .. } if name == "--jobs" && value == "many"));

    let err = parse(&command, &["--format", "toml"]).unwrap_err();
    assert_eq!(
        err,
        ParseError::InvalidChoice {
            name: "--format".into(),
            value: "toml".into(),
            choices: vec!["json".into(), "yaml".into()]
        }
    );
}

#[test]
fn defaults_fill_unset_keys_only() {
    let mut command = CommandSchema::with_parse_mode("serve", ParseMode::Operand);
    command.add_option(
        OptionSchema::builder()
            .long("port")
            .converter(Converter::Integer)
            .default_value(8080)
            .build()
            .unwrap(),
    );
    command.add_option(
        OptionSchema::builder()
            .long("host")
            .default_value("127.0.0.1")
            .build()
            .unwrap(),
    );
    command
        .add_operand(OperandSchema::builder("root").default_value(".").build().unwrap())
        .unwrap();

    let ns = parse(&command, &["--port", "9000"]).unwrap();
    assert_eq!(ns.get("port"), Some(&Value::Int(9000)));
    assert_eq!(ns.get("host"), Some(&Value::from("127.0.0.1")));
    assert_eq!(ns.get("root"), Some(&Value::from(".")));
    assert_eq!(ns.keys().collect::<Vec<_>>(), vec!["port", "host", "root"]);
}

#[test]
fn required_option_must_be_supplied() {
    let mut command = CommandSchema::new("deploy");
    command.add_option(
        OptionSchema::builder()
            .long("env")
            .required(true)
            .build()
            .unwrap(),
    );
    command.add_subcommand(CommandSchema::new("now")).unwrap();

    assert_eq!(
        parse(&command, &[]).unwrap_err(),
        ParseError::MissingRequiredOption("--env".into())
    );
    assert_eq!(
        parse(&command, &["now"]).unwrap_err(),
        ParseError::MissingRequiredOption("--env".into())
    );
    assert!(parse(&command, &["--env", "prod", "now"]).is_ok());
}

#[test]
fn mutex_group_allows_one_member() {
    let mut command = CommandSchema::new("export");
    command.add_mutex_group(
        MutexGroup::new(true)
            .with_option(flag("json", "j"))
            .with_option(flag("yaml", "y")),
    );

    let ns = parse(&command, &["--json", "-j"]).unwrap();
    assert_eq!(ns.get("json"), Some(&Value::Bool(true)));

    assert_eq!(
        parse(&command, &["--json", "--yaml"]).unwrap_err(),
        ParseError::MutuallyExclusive {
            option: "--yaml".into(),
            conflicting: "--json".into()
        }
    );
    assert_eq!(
        parse(&command, &["-jy"]).unwrap_err(),
        ParseError::MutuallyExclusive {
            option: "--yaml".into(),
            conflicting: "--json".into()
        }
    );
    assert_eq!(
        parse(&command, &[]).unwrap_err(),
        ParseError::MutexGroupRequired(vec!["--json".into(), "--yaml".into()])
    );
}

// ---------------------------------------------------------------------------
// Purity
// ---------------------------------------------------------------------------

#[test]
fn parsing_twice_yields_equal_namespaces() {
    let root = sample_tree();
    let tokens = ["-vv", "cp", "/tmp", "x", "y"];
    let first = parse(&root, &tokens).unwrap();
    let second = parse(&root, &tokens).unwrap();
    assert_eq!(first, second);
}

#[test]
fn schema_is_shareable_across_threads() {
    let root = std::sync::Arc::new(sample_tree());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let root = std::sync::Arc::clone(&root);
            std::thread::spawn(move || parse(&root, &["build", "main.c"]).unwrap())
        })
        .collect();
    for handle in handles {
        let ns = handle.join().unwrap();
        assert!(ns.get_namespace("build").is_some());
    }
}
