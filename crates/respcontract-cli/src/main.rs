//! respcontract CLI - check recorded responses against OpenAPI contracts

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use respcontract_core::{Config, ContractViolation, ExpectationRecord};
use respcontract_validator::load::parse_document;
use respcontract_validator::{
    ResponseContractChecker, load_declarations, load_response, load_spec,
};

#[derive(Parser)]
#[command(name = "respcontract")]
#[command(about = "Check recorded HTTP responses against OpenAPI response contracts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Config file (default: .respcontract.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (e.g. "warn", "respcontract=debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Check one recorded response against its declarations
    Check {
        /// OpenAPI / Swagger document (default: `spec` from config)
        #[arg(short, long)]
        spec: Option<PathBuf>,

        /// Declaration file listing the expected responses
        #[arg(short, long)]
        declarations: PathBuf,

        /// Recorded response (JSON)
        #[arg(short, long)]
        response: PathBuf,

        /// Only check the declaration for this status code
        #[arg(long)]
        code: Option<String>,
    },

    /// Print the self-contained schema a body would be validated against
    Bundle {
        /// OpenAPI / Swagger document (default: `spec` from config)
        #[arg(short, long)]
        spec: Option<PathBuf>,

        /// Body schema (JSON or YAML)
        #[arg(long)]
        schema: PathBuf,

        /// Apply strict mode
        #[arg(long)]
        strict: bool,
    },

    /// Initialize config file
    Init,

    /// Export JSON Schema for the declaration file format
    Schema {
        /// Describe the recorded response format instead
        #[arg(long)]
        response: bool,
    },
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

/// Result of one declaration
struct Outcome {
    code: String,
    result: Result<(), ContractViolation>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let cfg = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    Ok(cfg)
}

fn spec_path(arg: Option<PathBuf>, cfg: &Config) -> Result<PathBuf> {
    arg.or_else(|| cfg.spec.clone())
        .context("no API document: pass --spec or set `spec` in the config file")
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Check {
            spec,
            declarations,
            response,
            code,
        } => {
            let cfg = load_config(cli.config.as_deref())?;
            let spec_path = spec_path(spec, &cfg)?;
            let spec = load_spec(&spec_path)?;
            let declarations = load_declarations(&declarations)?;
            let response = load_response(&response)?;

            let checker = ResponseContractChecker::new();
            let expectations: Vec<ExpectationRecord> = declarations
                .responses
                .into_iter()
                .map(|d| checker.resolve(d, &cfg))
                .collect();

            tracing::debug!(
                spec = %spec_path.display(),
                version = %spec.version,
                declarations = expectations.len(),
                "inputs loaded"
            );

            let target = code.unwrap_or_else(|| response.code.clone());
            let mut selected: Vec<&ExpectationRecord> =
                expectations.iter().filter(|e| e.matches_code(&target)).collect();
            if selected.is_empty() {
                // Nothing declared for this code: report against the first declaration
                let Some(first) = expectations.first() else {
                    bail!("declaration file lists no responses");
                };
                selected.push(first);
            }

            let outcomes: Vec<Outcome> = selected
                .into_iter()
                .map(|exp| Outcome {
                    code: exp.code.clone(),
                    result: checker.check(exp, &spec, &response),
                })
                .collect();
            let failed = outcomes.iter().filter(|o| o.result.is_err()).count();

            match cli.output {
                OutputFormat::Terminal => {
                    for o in &outcomes {
                        match &o.result {
                            Ok(()) => println!("PASS {}", o.code),
                            Err(v) => println!("FAIL {} [{}]: {v}", o.code, v.kind()),
                        }
                    }
                    println!(
                        "\n{}: {} checked, {} failed",
                        if failed == 0 { "PASS" } else { "FAIL" },
                        outcomes.len(),
                        failed
                    );
                }
                OutputFormat::Json => {
                    let results: Vec<serde_json::Value> = outcomes
                        .iter()
                        .map(|o| match &o.result {
                            Ok(()) => serde_json::json!({"code": o.code, "status": "PASS"}),
                            Err(v) => serde_json::json!({
                                "code": o.code,
                                "status": "FAIL",
                                "kind": v.kind(),
                                "message": v.to_string(),
                            }),
                        })
                        .collect();
                    let json_output = serde_json::json!({
                        "verdict": if failed == 0 { "PASS" } else { "FAIL" },
                        "spec": spec_path.display().to_string(),
                        "results": results,
                    });
                    println!("{}", serde_json::to_string_pretty(&json_output)?);
                }
                OutputFormat::Silent => {}
            }

            Ok(if failed == 0 { 0 } else { 1 })
        }

        Commands::Bundle {
            spec,
            schema,
            strict,
        } => {
            let cfg = load_config(cli.config.as_deref())?;
            let spec = load_spec(&spec_path(spec, &cfg)?)?;
            let content = std::fs::read_to_string(&schema)
                .with_context(|| format!("cannot read {}", schema.display()))?;
            let body_schema: serde_json::Value = parse_document(&schema, &content)?;

            let exp = ExpectationRecord::new("bundle")
                .with_schema(body_schema)
                .with_strict(strict);
            let checker = ResponseContractChecker::new();
            if let Some(tree) = checker.bundled_schema(&exp, &spec) {
                if cli.output != OutputFormat::Silent {
                    println!("{}", serde_json::to_string_pretty(&tree)?);
                }
            }
            Ok(0)
        }

        Commands::Init => {
            let config_path = ".respcontract.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(1);
            }

            std::fs::write(config_path, Config::example())?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - spec: path to your OpenAPI document");
            println!("  - strict: default strictness for response bodies");
            Ok(0)
        }

        Commands::Schema { response } => {
            let schema = if response {
                respcontract_core::schema::generate_response_schema()
            } else {
                respcontract_core::schema::generate_schema()
            };
            println!("{schema}");
            Ok(0)
        }
    }
}
