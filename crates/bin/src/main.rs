//! Churn CLI binary.
//!
//! Scores customer records against a fitted encoder registry and classifier.

use churn::batch::{self, BatchSummary};
use churn::export::{ExportFormat, Exporter};
use churn::fit;
use churn::registry::FrequencyTable;
use churn::{ChurnConfig, EncoderRegistry, Predictor, RawRecord};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "churn")]
#[command(about = "Churn: telecom customer churn prediction", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./churn.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Encoder registry JSON, overriding the configuration
    #[arg(long, global = true)]
    registry: Option<PathBuf>,

    /// Classifier artifact JSON, overriding the configuration
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Decision threshold, overriding the configuration
    #[arg(long, global = true)]
    threshold: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict churn for one customer
    Predict {
        /// Record as a JSON object
        #[arg(long)]
        record: Option<PathBuf>,

        /// Start from the registry's default record
        #[arg(long)]
        template: bool,

        /// Field assignments applied last, e.g. --set REGION=DAKAR
        #[arg(long = "set", value_name = "KEY=VALUE")]
        assignments: Vec<String>,

        /// Show the encoded feature vector
        #[arg(long)]
        explain: bool,

        /// Output format (json or text)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Score every row of a CSV file
    Batch {
        /// Input CSV with attribute names as headers
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Output format: csv, json or pretty-json (guessed from --output)
        #[arg(long)]
        format: Option<String>,
    },

    /// Describe the loaded encoder registry
    Inspect {
        /// Output format (json or text)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print a default record built from the registry's input domains
    Template,

    /// Fit an encoder registry from training data
    Fit {
        /// Layout JSON naming the classifier columns
        #[arg(long)]
        layout: PathBuf,

        /// Training CSV
        #[arg(long)]
        training: PathBuf,

        /// Where to write the registry JSON
        #[arg(long, short)]
        output: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "churn=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = ChurnConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.registry {
        config.registry_path = path;
    }
    if let Some(path) = cli.model {
        config.model_path = path;
    }
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    config.validate()?;
    debug!(?config, "Effective configuration");

    match cli.command {
        Commands::Predict {
            record,
            template,
            assignments,
            explain,
            format,
        } => {
            let predictor = Predictor::from_config(&config)?;
            let record = assemble_record(&predictor, record.as_deref(), template, &assignments)?;
            predict(&predictor, &record, explain, format)?;
        }
        Commands::Batch {
            input,
            output,
            format,
        } => {
            run_batch(&config, &input, output.as_deref(), format.as_deref())?;
        }
        Commands::Inspect { format } => {
            let registry = EncoderRegistry::load(&config.registry_path)?;
            inspect(&registry, format)?;
        }
        Commands::Template => {
            let registry = EncoderRegistry::load(&config.registry_path)?;
            let template = RawRecord::template(&registry);
            println!("{}", serde_json::to_string_pretty(&template)?);
        }
        Commands::Fit {
            layout,
            training,
            output,
        } => {
            let registry = fit::fit_registry_from_paths(&layout, &training)?;
            registry.save(&output)?;
            info!(path = %output.display(), "Wrote registry");
            println!(
                "Fitted registry '{}' with {} features -> {}",
                registry.name(),
                registry.feature_order().len(),
                output.display()
            );
        }
    }

    Ok(())
}

/// Record from a JSON file or the template, with assignments applied on top.
fn assemble_record(
    predictor: &Predictor,
    path: Option<&Path>,
    template: bool,
    assignments: &[String],
) -> Result<RawRecord, Box<dyn std::error::Error>> {
    let base = match path {
        Some(path) => RawRecord::from_json_str(&std::fs::read_to_string(path)?)?,
        None if template => RawRecord::template(predictor.registry()),
        None => RawRecord::new(),
    };
    let overrides = RawRecord::from_assignments(assignments)?;
    Ok(base
        .iter()
        .chain(overrides.iter())
        .map(|(field, value)| (field, value.clone()))
        .collect())
}

fn predict(
    predictor: &Predictor,
    record: &RawRecord,
    explain: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let prediction = predictor.explain(record)?;

    match format {
        OutputFormat::Json => {
            let output = if explain {
                prediction.export_to_string(ExportFormat::PrettyJson)?
            } else {
                prediction.result.export_to_string(ExportFormat::PrettyJson)?
            };
            println!("{}", output);
        }
        OutputFormat::Text => {
            if explain {
                println!("\nEncoded features:");
                println!("{}", "─".repeat(40));
                for (name, value) in prediction.features.iter() {
                    println!("  {:<24} {:>12.6}", name, value);
                }
                println!("{}", "─".repeat(40));
            }
            println!("{}", prediction.result);
            if predictor.threshold() != churn::scoring::DEFAULT_THRESHOLD {
                println!("  (threshold {:.2})", predictor.threshold());
            }
        }
    }
    Ok(())
}

fn run_batch(
    config: &ChurnConfig,
    input: &Path,
    output: Option<&Path>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = match (format, output) {
        (Some(format), _) => format.parse::<ExportFormat>()?,
        (None, Some(path)) => ExportFormat::from_path(path),
        (None, None) => ExportFormat::Csv,
    };

    let predictor = Predictor::from_config(config)?;
    let rows = batch::read_records_from_path(input)?;
    let outcomes = batch::score_records(&predictor, rows);

    match output {
        Some(path) => outcomes.export_to_file(path, format)?,
        None => print!("{}", outcomes.export_to_string(format)?),
    }

    let summary = BatchSummary::from_outcomes(&outcomes);
    eprintln!(
        "Scored {}/{} rows ({} failed, {} predicted to churn)",
        summary.scored, summary.total, summary.failed, summary.churners
    );
    Ok(())
}

fn inspect(
    registry: &EncoderRegistry,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if format == OutputFormat::Json {
        let features: Vec<_> = registry
            .feature_order()
            .iter()
            .map(|f| {
                json!({
                    "name": f.name,
                    "transform": f.transform,
                    "source": f.source,
                    "category": f.category,
                    "scaling": registry.scale_params(&f.name).map(|p| p.kind()),
                })
            })
            .collect();
        let tables: serde_json::Map<String, serde_json::Value> = frequency_tables(registry)
            .map(|(source, table)| {
                let categories: Vec<&str> = table.categories().collect();
                (source.to_string(), json!(categories))
            })
            .collect();
        let summary = json!({
            "name": registry.name(),
            "schema_version": registry.schema_version(),
            "fitted_at": registry.fitted_at(),
            "tenure_labels": registry.tenure_table().labels_by_rank(),
            "features": features,
            "frequency_tables": tables,
            "optional_fields": registry.optional_fields().collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("ENCODER REGISTRY: {}", registry.name()));
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Schema version: {}", registry.schema_version());
    match registry.fitted_at() {
        Some(at) => println!("Fitted at:      {}", at),
        None => println!("Fitted at:      unknown"),
    }

    println!("\nTenure vocabulary:");
    for (label, rank) in registry.tenure_table().iter() {
        println!("  {:>2}  {}", rank, label);
    }

    println!("\nFeatures ({}):", registry.feature_order().len());
    println!(
        "  {:<4} {:<20} {:<10} {:<16} {}",
        "#", "Column", "Transform", "Source", "Parameters"
    );
    println!("  {}", "─".repeat(70));
    for (i, feature) in registry.feature_order().iter().enumerate() {
        let params = match registry.scale_params(&feature.name) {
            Some(params) => params.kind().to_string(),
            None => feature.category.clone().unwrap_or_default(),
        };
        println!(
            "  {:<4} {:<20} {:<10} {:<16} {}",
            i, feature.name, feature.transform, feature.source, params
        );
    }

    let mut tables = frequency_tables(registry).peekable();
    if tables.peek().is_some() {
        println!("\nFrequency tables:");
        for (source, table) in tables {
            let categories: Vec<&str> = table.categories().take(5).collect();
            let more = if table.len() > categories.len() { ", ..." } else { "" };
            println!(
                "  {:<16} {:>4} categories: {}{}",
                source,
                table.len(),
                categories.join(", "),
                more
            );
        }
    }

    let optional: Vec<&str> = registry.optional_fields().collect();
    if !optional.is_empty() {
        println!("\nOptional fields: {}", optional.join(", "));
    }
    Ok(())
}

/// Fitted frequency tables, one per source field, in source order.
fn frequency_tables(
    registry: &EncoderRegistry,
) -> impl Iterator<Item = (&str, &FrequencyTable)> {
    registry
        .feature_order()
        .iter()
        .map(|f| f.source.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter_map(move |source| Some((source, registry.frequency_table(source)?)))
}
