use clap::Parser;
use hk_carpark::{
    api::{Client, Lang, VehicleType},
    config::{Config, RetryPolicy},
    output::OutputFormat,
    pipeline,
};
use std::{path::PathBuf, process::ExitCode, time::Duration, time::Instant};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "hk-carpark",
    version,
    about = "Download Hong Kong carpark info and vacancy as flat tables"
)]
struct Args {
    /// Directory the tables are written to
    #[arg(long, default_value = "./data")]
    output_dir: PathBuf,

    /// Response language: en_US, zh_TW or zh_CN
    #[arg(long, default_value = "zh_TW")]
    lang: Lang,

    /// Vehicle type to fetch, repeat for several
    #[arg(long = "vehicle-type", default_value = "privateCar")]
    vehicle_types: Vec<VehicleType>,

    /// Output format (csv, sqlite, json), repeat for several
    #[arg(long = "format", default_value = "csv")]
    formats: Vec<OutputFormat>,

    /// Only fetch these carparks
    #[arg(long, value_delimiter = ',')]
    carpark_ids: Vec<String>,

    /// Bounding box passed through to the API
    #[arg(long)]
    extent: Option<String>,

    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Retries on timeouts and 5xx responses
    #[arg(long, default_value_t = 2)]
    retries: u32,

    /// Also fetch the public holiday table
    #[arg(long)]
    holidays: bool,

    #[arg(long, default_value_t = 2025)]
    holiday_year: i32,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let mut vehicle_types = Vec::with_capacity(args.vehicle_types.len());
        for vehicle_type in args.vehicle_types {
            if !vehicle_types.contains(&vehicle_type) {
                vehicle_types.push(vehicle_type);
            }
        }
        let mut formats = Vec::with_capacity(args.formats.len());
        for format in args.formats {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }

        Config {
            lang: args.lang,
            vehicle_types,
            carpark_ids: args.carpark_ids,
            extent: args.extent,
            output_dir: args.output_dir,
            formats,
            timeout: Duration::from_secs(args.timeout_secs),
            retry: RetryPolicy {
                max_retries: args.retries,
                ..Default::default()
            },
            holiday_year: args.holiday_year,
            ..Default::default()
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let holidays = args.holidays;
    let config = Config::from(args);

    let now = Instant::now();
    let client = match Client::new(&config) {
        Ok(client) => client,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let summaries = match pipeline::run(&config, &client) {
        Ok(summaries) => summaries,
        Err(err) => {
            error!("Run failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    for summary in &summaries {
        if summary.skipped > 0 {
            warn!(
                "{} {} carparks were skipped",
                summary.skipped, summary.vehicle_type
            );
        }
    }

    if holidays {
        if let Err(err) = pipeline::run_holidays(&config, &client) {
            error!("Holiday fetch failed: {err}");
            return ExitCode::FAILURE;
        }
    }

    info!("Done in {:?}", now.elapsed());
    ExitCode::SUCCESS
}
