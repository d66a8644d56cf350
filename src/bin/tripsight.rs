//! Tripsight CLI - Command-line interface for the tripsight pipeline
//!
//! Commands:
//! - precompute: Run the full pipeline and emit a snapshot payload
//! - validate: Type-check raw trip records and report drops
//! - schema: Print schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tripsight::pipeline::SnapshotProcessor;
use tripsight::schema::{IngestReport, RawTripAdapter, SCHEMA_VERSION};
use tripsight::{PipelineConfig, SnapshotEncoder, SNAPSHOT_VERSION, TRIPSIGHT_VERSION};

/// Tripsight - classification and aggregation engine for trip records
#[derive(Parser)]
#[command(name = "tripsight")]
#[command(version = TRIPSIGHT_VERSION)]
#[command(about = "Precompute dashboard artifacts from raw trip records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline and emit a trip.snapshot.v1 payload
    Precompute {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format (defaults to pretty JSON on a terminal)
        #[arg(long)]
        output_format: Option<OutputFormat>,

        /// Pipeline configuration file (JSON; missing fields use defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Type-check raw trip records and report dropped rows
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output the ingest report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },

    /// Print the effective pipeline configuration
    Config {
        /// Configuration file to resolve (JSON; omit for defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (trip.raw_record.v1)
    Input,
    /// Output schema (trip.snapshot.v1)
    Output,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), TripsightCliError> {
    match cli.command {
        Commands::Precompute {
            input,
            output,
            input_format,
            output_format,
            config,
        } => cmd_precompute(
            &input,
            &output,
            input_format,
            output_format,
            config.as_deref(),
        ),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),

        Commands::Config { config } => cmd_config(config.as_deref()),
    }
}

fn cmd_precompute(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: Option<OutputFormat>,
    config_path: Option<&Path>,
) -> Result<(), TripsightCliError> {
    let config = load_config(config_path)?;
    let records = parse_records(&read_input(input)?, &input_format)?;
    if records.is_empty() {
        return Err(TripsightCliError::NoRecords);
    }

    let (table, report) = RawTripAdapter::to_table(&records);
    let processor = SnapshotProcessor::new(config.clone());
    let result = processor.run(&table);

    let encoder = SnapshotEncoder::new();
    let payload = encoder.encode(&result, &report, &config);

    let to_stdout = output.to_string_lossy() == "-";
    // Pretty by default when a person is looking at the output
    let format = output_format.unwrap_or_else(|| {
        if to_stdout && atty::is(atty::Stream::Stdout) {
            OutputFormat::JsonPretty
        } else {
            OutputFormat::Json
        }
    });

    let payload_json = match format {
        OutputFormat::Json => serde_json::to_string(&payload)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&payload)?,
    };

    if to_stdout {
        println!("{}", payload_json);
    } else {
        fs::write(output, payload_json)?;
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), TripsightCliError> {
    let records = parse_records(&read_input(input)?, &input_format)?;
    let (_, report) = RawTripAdapter::to_table(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.rows_dropped > 0 {
        return Err(TripsightCliError::ValidationFailed(report.rows_dropped));
    }
    Ok(())
}

fn print_report(report: &IngestReport) {
    println!("Rows read:    {}", report.rows_read);
    println!("Rows kept:    {}", report.rows_kept);
    println!("Rows dropped: {}", report.rows_dropped);
    if !report.drops.is_empty() {
        println!("\nDrops by column:");
        for (column, count) in &report.drops {
            println!("  {}: {}", column, count);
        }
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), TripsightCliError> {
    match schema_type {
        SchemaType::Input => {
            println!("Input schema: {}", SCHEMA_VERSION);
            println!();
            println!("One JSON object per trip. All fields optional; a present but");
            println!("unparseable value drops the row at ingest.");
            println!();
            println!("Fields:");
            println!("  schema_version              string (const \"{}\")", SCHEMA_VERSION);
            println!("  trip_id                     string");
            println!("  origin_lat, origin_lon      number (both required to place an origin)");
            println!("  modes_used                  string, free-text mode descriptor");
            println!("  bike_duration_min           number");
            println!("  walk_transit_duration_min   number");
            println!("  multimodal_duration_min     number");
            println!("  trip_duration_min           number");
            println!("  start_hour                  integer 0-23");
            println!("  weekday, month, season      string");
            println!("  weekday_type                string");
            println!("  trip_purpose                string");
            println!("  near_transit                boolean (also accepts 0/1, yes/no)");
            println!("  start_station               string");
        }
        SchemaType::Output => {
            println!("Output schema: {}", SNAPSHOT_VERSION);
            println!();
            println!("One JSON object per pipeline run.");
            println!();
            println!("Fields:");
            println!("  snapshot_version   string (const \"{}\")", SNAPSHOT_VERSION);
            println!("  producer           name, version, instance_id");
            println!("  provenance         computed_at_utc, row counts, active filters");
            println!("  artifacts          purpose_distribution, hour_weekday_grid,");
            println!("                     longest_trips, kpis, mode_counts, mode_points");
            println!();
            println!("Each artifact carries status \"available\" or \"unavailable\" with");
            println!("a reason; one degraded artifact never blocks the others.");
        }
    }
    Ok(())
}

fn cmd_config(config_path: Option<&Path>) -> Result<(), TripsightCliError> {
    let config = load_config(config_path)?;
    println!("{}", config.to_json()?);
    Ok(())
}

fn read_input(input: &Path) -> Result<String, TripsightCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_records(
    data: &str,
    format: &InputFormat,
) -> Result<Vec<tripsight::RawTripRecord>, TripsightCliError> {
    let records = match format {
        InputFormat::Ndjson => RawTripAdapter::parse_ndjson(data)?,
        InputFormat::Json => RawTripAdapter::parse_array(data)?,
    };
    Ok(records)
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, TripsightCliError> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            Ok(PipelineConfig::from_json(&json)?)
        }
        None => Ok(PipelineConfig::default()),
    }
}

// Error types

#[derive(Debug)]
enum TripsightCliError {
    Io(io::Error),
    Pipeline(tripsight::PipelineError),
    Json(serde_json::Error),
    NoRecords,
    ValidationFailed(usize),
}

impl From<io::Error> for TripsightCliError {
    fn from(e: io::Error) -> Self {
        TripsightCliError::Io(e)
    }
}

impl From<tripsight::PipelineError> for TripsightCliError {
    fn from(e: tripsight::PipelineError) -> Self {
        TripsightCliError::Pipeline(e)
    }
}

impl From<serde_json::Error> for TripsightCliError {
    fn from(e: serde_json::Error) -> Self {
        TripsightCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TripsightCliError> for CliError {
    fn from(e: TripsightCliError) -> Self {
        match e {
            TripsightCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            TripsightCliError::Pipeline(e) => CliError {
                code: "PIPELINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(format!("Ensure input matches the {} schema", SCHEMA_VERSION)),
            },
            TripsightCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            TripsightCliError::NoRecords => CliError {
                code: "NO_RECORDS".to_string(),
                message: "No records found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            TripsightCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} rows failed typing", count),
                hint: Some("Run with --json for per-column drop counts".to_string()),
            },
        }
    }
}
