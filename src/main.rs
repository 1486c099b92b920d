//! mamdani - Mamdani fuzzy inference
//!
//! Command-line interface for running the built-in demonstration model or a
//! model assembled from definition lines.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::{debug, info, warn};

use mamdani::error::{ErrorCode, FuzzyError, FuzzyResult};
use mamdani::{
    demo, fuzzy_ensure, parse_assignment, parse_fuzzy_set, parse_rule, parse_variable,
    CrispValues, FuzzySystem, InferenceReport, LogLevel, MamdaniConfig, OutputFormat,
};

#[derive(Parser)]
#[command(name = "mamdani")]
#[command(author = "mamdani authors")]
#[command(version = env!("MAMDANI_VERSION"))]
#[command(about = "Mamdani fuzzy inference engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (skips the default search path)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Result format
    #[arg(short, long, global = true, value_enum)]
    format: Option<FormatArg>,

    /// Decimal places for text results
    #[arg(long, global = true, value_name = "N")]
    precision: Option<usize>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Reject rules whose operators are not and / or / and_not
    #[arg(long, global = true)]
    strict_operators: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Run the built-in project risk model
    Demo {
        /// Override a default input (repeatable)
        #[arg(short, long = "input", value_name = "NAME=VALUE")]
        inputs: Vec<String>,
    },
    /// Build a model from definition lines and run it
    Run {
        /// Variable definition, e.g. "risk OUT [0, 100]"
        #[arg(long = "var", value_name = "LINE")]
        variables: Vec<String>,

        /// Fuzzy set definition, e.g. "risk low TRI 0 25 50"
        #[arg(long = "set", value_name = "LINE")]
        sets: Vec<String>,

        /// Rule definition, e.g. "exp_level expert => risk low"
        #[arg(long = "rule", value_name = "LINE")]
        rules: Vec<String>,

        /// Crisp input value (repeatable)
        #[arg(short, long = "input", value_name = "NAME=VALUE")]
        inputs: Vec<String>,

        /// Model name
        #[arg(long, default_value = "cli")]
        name: String,

        /// Model description
        #[arg(long, default_value = "")]
        description: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// "The predicted <var> is <value>" lines
    Text,
    /// Full run report as JSON
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(err.code.exit_code());
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(config.general.log_level.tracing_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    debug!(
        log_level = config.general.log_level.as_str(),
        format = config.general.format.as_str(),
        precision = config.general.precision,
        strict_operators = config.engine.strict_operators,
        "configuration resolved"
    );

    if let Err(err) = execute(&cli, &config) {
        let code = err
            .downcast_ref::<FuzzyError>()
            .map(|e| e.code.exit_code())
            .unwrap_or(1);

        match (config.general.format, err.downcast_ref::<FuzzyError>()) {
            (OutputFormat::Json, Some(e)) => eprintln!("{}", e.to_json_pretty()),
            (OutputFormat::Json, None) => eprintln!("{}", json!({ "error": format!("{:#}", err) })),
            (OutputFormat::Text, _) => eprintln!("Error: {:#}", err),
        }
        process::exit(code);
    }
}

/// Config file (explicit or searched), then environment, then flags
fn load_config(cli: &Cli) -> FuzzyResult<MamdaniConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = MamdaniConfig::load_from_file(path)?;
            config.apply_env_overrides();
            config
        }
        None => MamdaniConfig::load()?,
    };

    if let Some(format) = cli.format {
        config.general.format = format.into();
    }
    if let Some(precision) = cli.precision {
        config.general.precision = precision;
    }
    if cli.strict_operators {
        config.engine.strict_operators = true;
    }
    if cli.quiet {
        config.general.log_level = LogLevel::Quiet;
    } else if cli.verbose >= 2 {
        config.general.log_level = LogLevel::Debug;
    } else if cli.verbose == 1 {
        config.general.log_level = LogLevel::Verbose;
    }

    Ok(config)
}

fn execute(cli: &Cli, config: &MamdaniConfig) -> Result<()> {
    let (system, inputs) = match &cli.command {
        Command::Demo { inputs } => {
            let system = demo::system().context("Failed to build the demonstration model")?;
            let mut values = demo::default_inputs();
            values.extend(parse_inputs(inputs)?);
            (system, values)
        }
        Command::Run {
            variables,
            sets,
            rules,
            inputs,
            name,
            description,
        } => {
            let system = build_system(
                name,
                description,
                variables,
                sets,
                rules,
                config.engine.strict_operators,
            )?;
            (system, parse_inputs(inputs)?)
        }
    };

    info!(
        system = system.name(),
        variables = system.variables().count(),
        rules = system.rules().len(),
        "running model"
    );

    for (name, value) in &inputs {
        if let Some((set, degree)) = system.variable(name).and_then(|v| v.dominant_set(*value)) {
            info!(variable = %name, value, set, degree, "input is mostly in set");
        }
    }

    for name in system.missing_inputs(&inputs) {
        warn!(variable = name, "no value supplied for input variable; its clauses read as 0");
    }

    let report = system.run_detailed(&inputs)?;
    print_report(&system, &inputs, &report, config)
}

fn build_system(
    name: &str,
    description: &str,
    variables: &[String],
    sets: &[String],
    rules: &[String],
    strict_operators: bool,
) -> FuzzyResult<FuzzySystem> {
    fuzzy_ensure!(
        !rules.is_empty(),
        ErrorCode::EmptyRuleBase,
        "A model needs at least one --rule to run"
    );

    let mut builder = FuzzySystem::builder(name)
        .description(description)
        .strict_operators(strict_operators);

    for line in variables {
        parse_variable(line)
            .map_err(|e| FuzzyError::from(e).at(format!("--var '{}'", line)))?
            .apply(&mut builder)?;
    }
    for line in sets {
        parse_fuzzy_set(line)
            .map_err(|e| FuzzyError::from(e).at(format!("--set '{}'", line)))?
            .apply(&mut builder)?;
    }
    for line in rules {
        let rule = parse_rule(line)
            .map_err(|e| FuzzyError::from(e).at(format!("--rule '{}'", line)))?;
        builder.add_rule(rule)?;
    }

    builder.build()
}

fn parse_inputs(assignments: &[String]) -> FuzzyResult<CrispValues> {
    let mut values = CrispValues::with_capacity(assignments.len());
    for line in assignments {
        let (name, value) = parse_assignment(line)
            .map_err(|e| FuzzyError::from(e).at(format!("--input '{}'", line)))?;
        values.insert(name, value);
    }
    Ok(values)
}

fn print_report(
    system: &FuzzySystem,
    inputs: &CrispValues,
    report: &InferenceReport,
    config: &MamdaniConfig,
) -> Result<()> {
    match config.general.format {
        OutputFormat::Text => {
            let precision = config.general.precision;
            for (name, value) in &report.results {
                println!("The predicted {} is {:.*}", name, precision, value);
            }
        }
        OutputFormat::Json => {
            let document = json!({
                "system": system.name(),
                "description": system.description(),
                "inputs": inputs,
                "outputs": report.results,
                "report": report,
            });
            let rendered =
                serde_json::to_string_pretty(&document).context("Failed to serialize report")?;
            println!("{}", rendered);
        }
    }
    Ok(())
}
