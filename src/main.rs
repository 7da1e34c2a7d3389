//! asthma-severity: command-line front-end for severity screening.
//!
//! Reads a patient record (JSON object, or `-` for stdin), validates it,
//! derives risk factors and, when a model is available, interprets the
//! model's prediction.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use asthma_severity::adapters::LogisticModel;
use asthma_severity::application::{screen_json, Assessment, AssessmentService, Screening};
use asthma_severity::config::AppConfig;
use asthma_severity::{
    AsthmaError, InputValidator, PatientRecord, RiskFactorCalculator, RiskFactors,
    SeverityInterpretation, SeverityInterpreter, ValidationResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "asthma-severity",
    version,
    about = "Asthma severity screening: validate records, derive risk factors, interpret predictions"
)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a patient record against the required-field and range rules
    Validate {
        /// Patient record JSON file (`-` for stdin)
        record: PathBuf,
    },

    /// Derive display risk factors from a patient record
    Risk {
        /// Patient record JSON file (`-` for stdin)
        record: PathBuf,
    },

    /// Interpret a raw classifier output
    #[command(allow_negative_numbers = true)]
    Interpret {
        /// Predicted class index (0 = mild, 1 = moderate, 2 = severe)
        class: i64,

        /// Probability of the predicted class (0.0 to 1.0)
        probability: f64,
    },

    /// Validate, derive risk factors and run the model on a patient record
    Assess {
        /// Patient record JSON file (`-` for stdin)
        record: PathBuf,

        /// Exported model JSON (defaults to ASTHMA_MODEL_PATH)
        #[arg(short, long, value_name = "MODEL")]
        model: Option<PathBuf>,
    },
}

fn init_logging(config: &AppConfig, verbose: u8) -> Result<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let (writer, guard) = if config.log_to_file() {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: a missing directory surfaces as an open error below.
            let _ = fs::create_dir_all(parent);
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("cannot open log file {}", config.log_file.display()))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(io::stderr())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(!config.log_to_file()),
        )
        .init();

    Ok(guard)
}

fn read_payload(path: &Path) -> Result<serde_json::Value> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read record from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read record {}", path.display()))?
    };
    serde_json::from_str(&text).context("record is not valid JSON")
}

fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    render: impl FnOnce(&T) -> String,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{}", render(value)),
    }
    Ok(())
}

fn render_validation(v: &ValidationResult) -> String {
    let status = if v.is_valid { "VALID" } else { "INVALID" };
    format!("{status}: {}", v.message)
}

fn render_risk(r: &RiskFactors) -> String {
    format!(
        "Age group:        {}\n\
         BMI category:     {}\n\
         Smoking status:   {}\n\
         Lifestyle risk:   {:.1} / 100 ({})",
        r.age_risk_group, r.bmi_category, r.smoking_status, r.lifestyle_risk_score, r.risk_category
    )
}

fn render_interpretation(i: &SeverityInterpretation) -> String {
    let mut out = format!(
        "Predicted severity: {}\nConfidence:         {} ({})\nRecommendations:",
        i.severity_level, i.confidence, i.confidence_score
    );
    for (n, rec) in i.recommendations.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}", n + 1, rec));
    }
    out
}

fn render_screening(s: &Screening) -> String {
    let mut out = render_validation(&s.validation);
    if let Some(risk) = &s.risk_factors {
        out.push_str("\n\n");
        out.push_str(&render_risk(risk));
        out.push_str("\n\nNo model configured; severity prediction skipped.");
    }
    out
}

fn render_assessment(a: &Assessment) -> String {
    format!(
        "Assessment {}\n\n{}\n\n{}",
        a.id,
        render_risk(&a.risk_factors),
        render_interpretation(&a.interpretation)
    )
}

fn run(cli: Cli, config: AppConfig) -> Result<ExitCode> {
    let format = cli.format;
    match cli.command {
        Command::Validate { record } => {
            let result = InputValidator::validate_json(&read_payload(&record)?);
            emit(format, &result, render_validation)?;
            Ok(if result.is_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Risk { record } => {
            let payload = read_payload(&record)?;
            let record = PatientRecord::from_json_value(&payload)
                .context("record is not a JSON object of field values")?;
            emit(format, &RiskFactorCalculator::calculate(&record), render_risk)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Interpret { class, probability } => {
            let interpretation = SeverityInterpreter::interpret(class, probability);
            emit(format, &interpretation, render_interpretation)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Assess { record, model } => {
            let payload = read_payload(&record)?;
            let config = match model {
                Some(path) => config.with_model_path(path),
                None => config,
            };

            let Some(model_path) = config.model_path else {
                tracing::info!("No model configured, running validation and risk factors only");
                let screening = screen_json(&payload);
                emit(format, &screening, render_screening)?;
                return Ok(if screening.validation.is_valid {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                });
            };

            let model = LogisticModel::load(&model_path)
                .with_context(|| format!("failed to load model {}", model_path.display()))?;
            let service = AssessmentService::new(Arc::new(model));

            match service.assess_json(&payload) {
                Ok(assessment) => {
                    emit(format, &assessment, render_assessment)?;
                    Ok(ExitCode::SUCCESS)
                }
                Err(AsthmaError::Validation(message)) => {
                    let rejected = ValidationResult {
                        is_valid: false,
                        message,
                    };
                    emit(format, &rejected, render_validation)?;
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = match &cli.log_file {
        Some(path) => AppConfig::from_env().with_log_file(path.clone()),
        None => AppConfig::from_env(),
    };
    let _guard = init_logging(&config, cli.verbose)?;

    tracing::debug!("Starting asthma-severity: {:?}", cli.command);
    run(cli, config)
}
