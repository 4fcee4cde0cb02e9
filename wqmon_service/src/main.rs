/// `wqmon` — command line front end for the water quality service.
///
/// Subcommands:
///   submit    append one record from the given field values
///   report    print the dashboard for a region/year selection
///   verify    check the collection is reachable and usable
///   pipeline  run the four-stage processing pipeline once

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use wqmon_service::analysis::filters::Selection;
use wqmon_service::config::{self, Config};
use wqmon_service::ingest::{SubmissionForm, submit};
use wqmon_service::logging::{self, Component};
use wqmon_service::normalize::normalize_with_stats;
use wqmon_service::pipeline::{StageOutcome, run_pipeline};
use wqmon_service::report::{build_report, render_text};
use wqmon_service::store::{self, MemoryStore, RecordStore};
use wqmon_service::verify::{VerificationStatus, print_summary, verify_store};

#[derive(Debug, Parser)]
#[clap(name = "wqmon", about = "Water quality record ingestion and reporting")]
struct Cli {
    /// Path to the TOML configuration file
    #[clap(long = "config", default_value = "wqmon.toml")]
    config: PathBuf,

    /// Connection string for the record store
    #[clap(long = "database-url", env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Use an empty in-process store instead of the database
    #[clap(long = "memory", default_value_t = false)]
    memory: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a new water quality record
    Submit(SubmitArgs),
    /// Print the dashboard report
    Report(ReportArgs),
    /// Check that the collection is reachable and its values parse
    Verify,
    /// Run start → check_data_available → process_water_quality_data → end
    Pipeline,
}

#[derive(Debug, Args)]
struct SubmitArgs {
    #[clap(long)]
    station: Option<String>,
    #[clap(long)]
    location: Option<String>,
    /// State / region label
    #[clap(long)]
    region: Option<String>,
    #[clap(long)]
    year: Option<i32>,
    /// Temperature in °C
    #[clap(long)]
    temperature: Option<f64>,
    #[clap(long)]
    ph: Option<f64>,
    /// Dissolved oxygen in mg/l
    #[clap(long = "do")]
    dissolved_oxygen: Option<f64>,
    /// Conductivity in µmhos/cm
    #[clap(long)]
    conductivity: Option<f64>,
    /// Biochemical oxygen demand in mg/l
    #[clap(long)]
    bod: Option<f64>,
    /// Nitrate + nitrite in mg/l
    #[clap(long)]
    nitrate: Option<f64>,
    /// Fecal coliform in MPN/100ml
    #[clap(long = "fecal")]
    fecal_coliform: Option<f64>,
    /// Total coliform in MPN/100ml
    #[clap(long = "total-coliform")]
    total_coliform: Option<f64>,
}

impl From<SubmitArgs> for SubmissionForm {
    fn from(args: SubmitArgs) -> Self {
        SubmissionForm {
            station: args.station,
            location: args.location,
            region: args.region,
            year: args.year,
            temperature: args.temperature,
            ph: args.ph,
            dissolved_oxygen: args.dissolved_oxygen,
            conductivity: args.conductivity,
            bod: args.bod,
            nitrate: args.nitrate,
            fecal_coliform: args.fecal_coliform,
            total_coliform: args.total_coliform,
        }
    }
}

#[derive(Debug, Args)]
struct ReportArgs {
    /// Region to filter by (defaults to the first region alphabetically)
    #[clap(long)]
    region: Option<String>,
    /// Year to filter by (defaults to the earliest year for the region)
    #[clap(long)]
    year: Option<i32>,
    /// Do not fill in default selections; report on the whole collection
    #[clap(long = "all", default_value_t = false)]
    all: bool,
    /// Emit the report as JSON
    #[clap(long = "json", default_value_t = false)]
    json: bool,
}

fn open_store(cli: &Cli, config: &Config) -> Result<Box<dyn RecordStore>, Box<dyn Error>> {
    if cli.memory {
        logging::info(Component::Store, None, "Using in-process store; nothing will be persisted");
        return Ok(Box::new(MemoryStore::new()));
    }

    let target = config::database_url(cli.database_url.as_deref())?;
    let handle = store::connect(&target, &config.store.collection).inspect_err(|e| {
        logging::log_store_failure(None, "connect", e);
    })?;
    Ok(Box::new(handle))
}

fn run(cli: Cli) -> Result<bool, Box<dyn Error>> {
    let config = Config::load(&cli.config)?;
    logging::init_logger(
        config.log_level()?,
        config.logging.file.as_deref(),
        config.logging.timestamps,
    );

    let mut store = open_store(&cli, &config)?;

    match cli.command {
        Command::Submit(args) => {
            let form = SubmissionForm::from(args);
            submit(store.as_mut(), &form)?;
            println!("✅ New record added to the database!");
            Ok(true)
        }
        Command::Report(args) => {
            let docs = store.fetch_all().inspect_err(|e| {
                logging::log_store_failure(None, "fetch_all", e);
            })?;
            let (records, stats) = normalize_with_stats(&docs);
            logging::log_normalize_summary(&stats);

            let requested = Selection::new(args.region, args.year);
            let selection = if args.all {
                requested
            } else {
                requested.with_defaults(&records)
            };

            let report = build_report(&records, &selection, &config.trend_fields()?);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_text(&report));
            }
            Ok(true)
        }
        Command::Verify => {
            let report = verify_store(store.as_mut(), &config.store.collection);
            print_summary(&report);
            Ok(report.status != VerificationStatus::Failed)
        }
        Command::Pipeline => {
            let run = run_pipeline(store.as_mut());
            for (stage, outcome) in &run.outcomes {
                match outcome {
                    StageOutcome::Completed(detail) => println!("  ✓ {:<28} {}", stage, detail),
                    StageOutcome::Failed(reason) => println!("  ✗ {:<28} {}", stage, reason),
                    StageOutcome::Skipped => println!("  - {:<28} skipped", stage),
                }
            }
            Ok(run.succeeded())
        }
    }
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            logging::error(Component::System, None, &e.to_string());
            eprintln!("wqmon: {}", e);
            ExitCode::FAILURE
        }
    }
}
