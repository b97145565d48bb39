//! credquery - evaluate a CBOR-encoded credential query.
//!
//! Reads a query and, optionally, a parameter table and a data-element table,
//! all CBOR-encoded, and prints the boolean result.
//!
//! # Usage
//!
//! ```text
//! credquery <query.cbor> [parameters.cbor] [data-elements.cbor]
//! ```
//!
//! The exit status is `0` when the query holds, `1` when it does not and `2`
//! when it cannot be evaluated.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CREDQUERY_MAX_TOKENS` | `1024` | Maximum number of tokens in a query |
//! | `CREDQUERY_MAX_STACK_DEPTH` | `256` | Maximum evaluation stack depth |
//! | `LOG_LEVEL` | `warn` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use credquery_core::{InMemoryDataSet, ParameterSet, QueryConfig, QueryExecutor};
use credquery_model::cbor;

const USAGE: &str = "usage: credquery <query.cbor> [parameters.cbor] [data-elements.cbor]";

/// Input files named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Inputs {
    query: PathBuf,
    parameters: Option<PathBuf>,
    data_elements: Option<PathBuf>,
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to `log_level`. Output goes to
/// stderr so stdout only ever carries the result.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn log_level() -> String {
    std::env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_owned())
}

fn parse_args(args: &[String]) -> Result<Inputs> {
    match args {
        [query, rest @ ..] if rest.len() <= 2 && !query.starts_with('-') => Ok(Inputs {
            query: PathBuf::from(query),
            parameters: rest.first().map(PathBuf::from),
            data_elements: rest.get(1).map(PathBuf::from),
        }),
        _ => bail!("{USAGE}"),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Decode the three inputs and evaluate the query.
///
/// Missing tables are treated as empty.
fn evaluate(
    query: &[u8],
    parameters: Option<&[u8]>,
    data_elements: Option<&[u8]>,
    config: QueryConfig,
) -> Result<bool> {
    let query = cbor::decode_query(query).context("failed to decode query")?;
    let parameters = match parameters {
        Some(bytes) => ParameterSet::from(
            cbor::decode_parameters(bytes).context("failed to decode parameters")?,
        ),
        None => ParameterSet::new(),
    };
    let data_elements = match data_elements {
        Some(bytes) => InMemoryDataSet::from(
            cbor::decode_data_elements(bytes).context("failed to decode data elements")?,
        ),
        None => InMemoryDataSet::new(),
    };

    info!(
        tokens = query.len(),
        parameters = parameters.len(),
        data_elements = data_elements.len(),
        "evaluating query",
    );

    let executor = QueryExecutor::new(config);
    executor
        .evaluate(&query, &parameters, &data_elements)
        .context("query evaluation failed")
}

fn run(args: &[String]) -> Result<bool> {
    let inputs = parse_args(args)?;
    let config = QueryConfig::from_env();
    debug!(config = %serde_json::to_string(&config)?, "loaded configuration");

    let query = read_file(&inputs.query)?;
    let parameters = inputs.parameters.as_deref().map(read_file).transpose()?;
    let data_elements = inputs.data_elements.as_deref().map(read_file).transpose()?;

    evaluate(
        &query,
        parameters.as_deref(),
        data_elements.as_deref(),
        config,
    )
}

fn main() -> ExitCode {
    if let Err(e) = init_tracing(&log_level()) {
        eprintln!("error: {e:#}");
        return ExitCode::from(2);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(result) => {
            println!("{result}");
            if result {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "evaluation failed");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
