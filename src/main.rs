//! predicates - parse and evaluate typed infix expressions

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser as ClapParser;
use predicates::expression::{functions, supported_functions};
use predicates::{DataType, ExpressionParser, Parameter, Value};
use std::collections::HashMap;
use std::str::FromStr;

/// Parse an infix expression over typed parameters and evaluate it
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Expression text, e.g. "x >= 1 && x < 5"
    #[arg(required_unless_present = "functions")]
    expression: Option<String>,

    /// Declare a parameter, optionally binding a value
    #[arg(short, long = "param", value_name = "NAME:TYPE[=VALUE]")]
    params: Vec<ParamSpec>,

    /// Convert the result to this type
    #[arg(short, long, value_name = "TYPE")]
    output: Option<DataType>,

    /// Print the built expression and its parameters without evaluating
    #[arg(long)]
    explain: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,

    /// List the registered functions and exit
    #[arg(long)]
    functions: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// `NAME:TYPE` or `NAME:TYPE=VALUE`
#[derive(Debug, Clone)]
struct ParamSpec {
    parameter: Parameter,
    value: Option<Value>,
}

impl FromStr for ParamSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (declaration, value) = match s.split_once('=') {
            Some((declaration, value)) => (declaration, Some(value)),
            None => (s, None),
        };
        let (name, type_name) = declaration
            .split_once(':')
            .ok_or_else(|| anyhow!("expected NAME:TYPE[=VALUE], got '{}'", s))?;

        let name = name.trim();
        if name.is_empty() {
            bail!("missing parameter name in '{}'", s);
        }
        let data_type: DataType = type_name.trim().parse()?;
        let value = value
            .map(|text| Value::parse_as(text, data_type))
            .transpose()?;

        Ok(Self {
            parameter: Parameter::new(name, data_type),
            value,
        })
    }
}

fn print_functions() {
    for name in supported_functions() {
        let Some(function) = functions::lookup(name) else {
            continue;
        };
        let parameters: Vec<String> = function
            .parameter_types
            .iter()
            .map(|t| t.to_string())
            .collect();
        let ellipsis = if function.variadic { "..." } else { "" };
        println!(
            "{}({}{}) -> {}",
            name,
            parameters.join(", "),
            ellipsis,
            function.return_type
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if args.functions {
        print_functions();
        return Ok(());
    }
    let text = args
        .expression
        .as_deref()
        .context("No expression given")?;

    let mut values: HashMap<String, Value> = HashMap::new();
    for spec in &args.params {
        if let Some(value) = &spec.value {
            values.insert(spec.parameter.name.clone(), value.clone());
        }
    }

    let mut parser = ExpressionParser::new(args.params.iter().map(|spec| spec.parameter.clone()));
    if let Some(output_type) = args.output {
        parser = parser.with_output_type(output_type);
    }
    let result = parser
        .parse(text)
        .with_context(|| format!("Failed to parse '{}'", text))?;
    log::debug!("{} -> {}", result.expression(), result.output_type());

    let outcome = if args.explain {
        None
    } else {
        let arguments = result
            .parameters()
            .iter()
            .map(|parameter| {
                values
                    .get(&parameter.name)
                    .cloned()
                    .with_context(|| format!("No value bound for parameter '{}'", parameter.name))
            })
            .collect::<Result<Vec<_>>>()?;
        let value = result
            .compile()
            .call(&arguments)
            .with_context(|| format!("Failed to evaluate '{}'", text))?;
        Some(value)
    };

    if args.json {
        let report = serde_json::json!({
            "expression": result.expression().to_string(),
            "parameters": result.parameters(),
            "output_type": result.output_type(),
            "result": outcome,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to encode JSON")?
        );
        return Ok(());
    }

    match outcome {
        Some(value) => println!("{}", value),
        None => {
            let constant = if result.expression().is_constant() {
                " (constant)"
            } else {
                ""
            };
            println!(
                "{} : {}{}",
                result.expression(),
                result.output_type(),
                constant
            );
            for parameter in result.parameters() {
                println!(
                    "  ${} {} : {}",
                    parameter.position, parameter.name, parameter.data_type
                );
            }
        }
    }
    Ok(())
}
