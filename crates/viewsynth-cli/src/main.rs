use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use viewsynth::{CancellationToken, InstantiationMethod, LearningMethod, Options, PruningMethod};
use viewsynth_core::ViewSynthError;
use viewsynth_io::{InputFormat, NumericType};

#[derive(Parser, Debug)]
#[command(name = "viewsynth", about = "Layout-constraint synthesis from example screens")]
struct Cli {
    /// JSON file of example view trees. Reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Write the synthesized constraints here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = CliInputFormat::Default)]
    input_format: CliInputFormat,

    #[arg(long, value_enum, default_value_t = CliNumericType::N)]
    numeric_type: CliNumericType,

    #[arg(long, value_enum, default_value_t = CliInstantiationMethod::Numpy)]
    instantiation_method: CliInstantiationMethod,

    #[arg(long, value_enum, default_value_t = CliLearningMethod::Noisetolerant)]
    learning_method: CliLearningMethod,

    #[arg(long, value_enum, default_value_t = CliPruningMethod::Hierarchical)]
    pruning_method: CliPruningMethod,

    /// Truncate the example list to this many trees.
    #[arg(long)]
    num_examples: Option<usize>,

    /// Global synthesis deadline, in seconds.
    #[arg(long)]
    timeout_seconds: Option<u64>,

    #[arg(long)]
    min_width: Option<i64>,
    #[arg(long)]
    min_height: Option<i64>,
    #[arg(long)]
    max_width: Option<i64>,
    #[arg(long)]
    max_height: Option<i64>,

    #[arg(long)]
    emit_after_visibility: bool,
    #[arg(long)]
    emit_after_instantiation: bool,
    #[arg(long)]
    emit_after_learning: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliInputFormat {
    Default,
    Bench,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliNumericType {
    N,
    R,
    Q,
    Z,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliInstantiationMethod {
    Numpy,
    Prolog,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliLearningMethod {
    Simple,
    Heuristic,
    Noisetolerant,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliPruningMethod {
    None,
    Baseline,
    Hierarchical,
}

fn options_from_cli(cli: &Cli) -> Options {
    let mut opts = Options::default();
    opts.input_format = match cli.input_format {
        CliInputFormat::Default => InputFormat::Default,
        CliInputFormat::Bench => InputFormat::Bench,
    };
    opts.numeric_type = match cli.numeric_type {
        CliNumericType::N => NumericType::N,
        CliNumericType::R => NumericType::R,
        CliNumericType::Q => NumericType::Q,
        CliNumericType::Z => NumericType::Z,
    };
    opts.instantiation_method = match cli.instantiation_method {
        CliInstantiationMethod::Numpy => InstantiationMethod::Numpy,
        CliInstantiationMethod::Prolog => InstantiationMethod::Prolog,
    };
    opts.learning_method = match cli.learning_method {
        CliLearningMethod::Simple => LearningMethod::Simple,
        CliLearningMethod::Heuristic => LearningMethod::Heuristic,
        CliLearningMethod::Noisetolerant => LearningMethod::NoiseTolerant,
    };
    opts.pruning_method = match cli.pruning_method {
        CliPruningMethod::None => PruningMethod::None,
        CliPruningMethod::Baseline => PruningMethod::Baseline,
        CliPruningMethod::Hierarchical => PruningMethod::Hierarchical,
    };
    opts.pruning_bounds.min_width = cli.min_width.map(viewsynth_core::Rational::from_integer);
    opts.pruning_bounds.min_height = cli.min_height.map(viewsynth_core::Rational::from_integer);
    opts.pruning_bounds.max_width = cli.max_width.map(viewsynth_core::Rational::from_integer);
    opts.pruning_bounds.max_height = cli.max_height.map(viewsynth_core::Rational::from_integer);
    opts.num_examples = cli.num_examples;
    opts.timeout_seconds = cli.timeout_seconds;
    opts.emit_after_visibility = cli.emit_after_visibility;
    opts.emit_after_instantiation = cli.emit_after_instantiation;
    opts.emit_after_learning = cli.emit_after_learning;
    opts
}

fn read_input(path: &Option<PathBuf>) -> std::io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => std::io::read_to_string(std::io::stdin()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let json = match read_input(&cli.input) {
        Ok(json) => json,
        Err(err) => {
            tracing::error!(%err, "failed to read input");
            return ExitCode::from(2);
        }
    };

    let opts = options_from_cli(&cli);
    let cancel = CancellationToken::new();

    let result = match viewsynth::synthesize(&json, &opts, &cancel) {
        Ok(result) => result,
        Err(ViewSynthError::InvalidInput(msg)) => {
            tracing::error!(%msg, "invalid input");
            return ExitCode::from(2);
        }
        Err(ViewSynthError::GlobalTimeout) => {
            tracing::error!("synthesis deadline exceeded");
            return ExitCode::from(3);
        }
        Err(err) => {
            tracing::error!(%err, "unexpected synthesis failure");
            return ExitCode::from(1);
        }
    };

    for diag in &result.diagnostics {
        tracing::warn!(context = %diag.context, error = %diag.error, "synthesis diagnostic");
    }

    let payload: Vec<_> = result
        .constraints
        .iter()
        .map(viewsynth_io::candidate_to_json)
        .collect();
    let rendered = match serde_json::to_string_pretty(&payload) {
        Ok(rendered) => rendered,
        Err(err) => {
            tracing::error!(%err, "failed to serialize synthesis output");
            return ExitCode::from(1);
        }
    };

    let write_result = match &cli.output {
        Some(path) => fs::write(path, rendered),
        None => {
            println!("{rendered}");
            Ok(())
        }
    };
    if let Err(err) = write_result {
        tracing::error!(%err, "failed to write synthesis output");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
