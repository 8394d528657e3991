//! End to end run: fetch both datasets, normalize, write every category.

use std::{path::PathBuf, time::Instant};
use tracing::{debug, info};

use crate::{
    Config, Error,
    api::{Client, Dataset, Query, VehicleType},
    holiday,
    normalize::{ChargeBucket, ChargeKind, Tables, normalize_feed},
    output::{self, Writer},
};

pub const PUBLIC_HOLIDAYS: &str = "public_holidays";

/// Outcome of one vehicle type.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub vehicle_type: VehicleType,
    pub carparks: usize,
    pub skipped: usize,
    pub dir: PathBuf,
}

/// Runs every configured vehicle type in order, stopping at the first error.
pub fn run(config: &Config, client: &Client) -> Result<Vec<Summary>, Error> {
    config
        .vehicle_types
        .iter()
        .map(|vehicle_type| run_vehicle_type(config, client, *vehicle_type))
        .collect()
}

pub fn run_vehicle_type(
    config: &Config,
    client: &Client,
    vehicle_type: VehicleType,
) -> Result<Summary, Error> {
    info!("Fetching {vehicle_type} carparks...");
    let now = Instant::now();
    let query = Query::new(Dataset::Info, vehicle_type, config.lang)
        .carpark_ids(config.carpark_ids.iter().cloned())
        .extent(config.extent.clone());
    let info = client.fetch(&query)?;
    let vacancy = client.fetch(&query.dataset(Dataset::Vacancy))?;

    let tables = normalize_feed(&info, &vacancy, vehicle_type);

    let dir = config.output_dir_for(vehicle_type);
    let mut writer = Writer::new(&dir, &config.formats, vehicle_type.as_str())?;
    write_tables(&mut writer, &tables)?;

    info!(
        "Wrote {} {} carparks to {} in {:?}",
        tables.len(),
        vehicle_type,
        dir.display(),
        now.elapsed()
    );
    Ok(Summary {
        vehicle_type,
        carparks: tables.len(),
        skipped: tables.skipped,
        dir,
    })
}

/// Writes every category, empty ones included so stale files get replaced.
pub fn write_tables(writer: &mut Writer, tables: &Tables) -> Result<(), output::Error> {
    let now = Instant::now();
    writer.write("basic_info", &tables.basic_info)?;
    writer.write("address", &tables.address)?;
    writer.write("grace_periods", &tables.grace_periods)?;
    writer.write("height_limits", &tables.height_limits)?;
    writer.write("opening_hours", &tables.opening_hours)?;
    writer.write("vehicle_space", &tables.vehicle_space)?;
    writer.write("vacancy", &tables.vacancy)?;
    writer.write(ChargeKind::Hourly.table(), &tables.hourly_charges)?;
    writer.write(ChargeKind::Monthly.table(), &tables.monthly_charges)?;
    writer.write(ChargeKind::DayNight.table(), &tables.day_night_parks)?;
    writer.write(ChargeKind::Privilege.table(), &tables.privileges)?;
    writer.write(ChargeKind::Unloading.table(), &tables.unloadings)?;
    writer.write(ChargeBucket::Weekdays.table(), &tables.charges_weekdays)?;
    writer.write(ChargeBucket::Weekend.table(), &tables.charges_weekend)?;
    writer.write(ChargeBucket::AllTime.table(), &tables.charges_all_time)?;
    debug!("Writing all tables took {:?}", now.elapsed());
    Ok(())
}

/// Fetches the holiday page for the configured year and writes
/// `public_holidays` into the output directory.
pub fn run_holidays(config: &Config, client: &Client) -> Result<usize, Error> {
    let url = config.holiday_url();
    info!("Fetching public holidays from {url}...");
    let holidays = holiday::fetch_public_holidays(client, &url, config.holiday_year)?;

    let mut writer = Writer::new(&config.output_dir, &config.formats, PUBLIC_HOLIDAYS)?;
    writer.write(PUBLIC_HOLIDAYS, &holidays)?;
    info!("Wrote {} public holidays", holidays.len());
    Ok(holidays.len())
}
