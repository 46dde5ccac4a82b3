use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use vendor_enrich::config::{EnricherConfig, DEFAULT_CONFIG_PATH};
use vendor_enrich::loader;
use vendor_enrich::logging;
use vendor_enrich::pipeline::{EnrichmentPipeline, PipelineStep};

#[derive(Parser)]
#[command(name = "vendor_enrich")]
#[command(about = "Post-process imported procurement vendor records")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Also write JSON logs to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich vendor records from a CSV or JSON file
    Enrich {
        /// Input file (.csv or .json)
        #[arg(long)]
        input: PathBuf,
        /// Output JSON file; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
        /// Steps to run (comma-separated). Available: object_id, buyer_contact, booleans, region
        #[arg(long)]
        steps: Option<String>,
    },
    /// Load and validate the configuration, then list its regions
    CheckConfig,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = EnricherConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    logging::init_logging(cli.log_dir.as_deref(), config.is_production());

    match cli.command {
        Commands::Enrich {
            input,
            output,
            steps,
        } => run_enrich(&config, input, output, steps),
        Commands::CheckConfig => {
            check_config(&config);
            Ok(())
        }
    }
}

fn run_enrich(
    config: &EnricherConfig,
    input: PathBuf,
    output: Option<PathBuf>,
    steps: Option<String>,
) -> Result<()> {
    let steps = match steps {
        Some(list) => PipelineStep::parse_list(&list)?,
        None => PipelineStep::ALL.to_vec(),
    };

    let mut records = loader::load_records(&input, &config.csv)
        .with_context(|| format!("reading vendor records from {}", input.display()))?;

    let span = tracing::info_span!("enrich", input = %input.display());
    let _enter = span.enter();

    let pipeline = EnrichmentPipeline::with_steps(config, steps);
    let summary = pipeline.run(&mut records);

    for failure in &summary.failures {
        warn!(
            index = failure.index,
            step = %failure.step,
            error = %failure.error,
            "Record not fully enriched"
        );
    }

    match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output file {}", path.display()))?;
            loader::write_json(BufWriter::new(file), &records)?;
            info!(path = %path.display(), "Wrote enriched records");
        }
        None => loader::write_json(io::stdout().lock(), &records)?,
    }

    eprintln!("\n📊 Enrichment Results:");
    eprintln!("   Total records: {}", summary.total_records);
    eprintln!("   Region tagged: {}", summary.tagged_records);
    eprintln!("   Records with errors: {}", summary.failed_records());

    Ok(())
}

fn check_config(config: &EnricherConfig) {
    println!("Contact field:  {}", config.property_buyer_contact);
    println!("Zip code field: {}", config.property_supplier_zip_code);
    println!("Boolean fields: {}", config.boolean_fields.join(", "));
    println!("Regions ({}):", config.regions.len());
    for region in &config.regions {
        println!(
            "   {} ({} zip codes)",
            region.name(),
            region.len()
        );
    }
}
