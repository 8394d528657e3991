use serde::Deserialize;
use serde_json::Value;
use std::{collections::HashMap, time::Instant};
use thiserror::Error;
use tracing::{debug, trace, warn};

mod charges;
mod records;
pub use charges::*;
pub use records::*;

use crate::{
    api::{RawCarpark, RawVacancy, VehicleType},
    shared::{InvalidArgument, join_tags},
};

#[derive(Error, Debug)]
pub enum Error {
    #[error(
        "Missing required field `{field}` in carpark {}",
        .park_id.as_deref().unwrap_or("<unknown>")
    )]
    MissingField {
        field: &'static str,
        park_id: Option<String>,
    },
    #[error(
        "Carpark {} is malformed: {source}",
        .park_id.as_deref().unwrap_or("<unknown>")
    )]
    Malformed {
        park_id: Option<String>,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}

/// Reads one raw `info` record. Only scalar type mismatches fail here.
pub fn parse_carpark(value: &Value) -> Result<RawCarpark, Error> {
    RawCarpark::deserialize(value).map_err(|source| Error::Malformed {
        park_id: raw_park_id(value),
        source,
    })
}

pub fn parse_vacancy(value: &Value) -> Result<RawVacancy, Error> {
    RawVacancy::deserialize(value).map_err(|source| Error::Malformed {
        park_id: raw_park_id(value),
        source,
    })
}

fn raw_park_id(value: &Value) -> Option<String> {
    value
        .get("park_Id")
        .and_then(Value::as_str)
        .and_then(clean_park_id)
        .map(str::to_string)
}

/// Park ids are join keys between the two feeds, stray whitespace is dropped
/// everywhere they are read.
fn clean_park_id(park_id: &str) -> Option<&str> {
    Some(park_id.trim()).filter(|park_id| !park_id.is_empty())
}

fn required<'a>(
    value: Option<&'a str>,
    field: &'static str,
    park_id: Option<&str>,
) -> Result<&'a str, Error> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::MissingField {
            field,
            park_id: park_id.map(str::to_string),
        })
}

/// Flattens one `info` record into per category rows.
///
/// Construction checks the required keys (`park_Id`, `name`); every
/// extraction after that is infallible and treats absent sub-objects as
/// "no data".
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    raw: &'a RawCarpark,
    park_id: &'a str,
    name: &'a str,
}

impl<'a> Normalizer<'a> {
    pub fn new(raw: &'a RawCarpark) -> Result<Self, Error> {
        let park_id = required(raw.park_id.as_deref(), "park_Id", None)?;
        let name = required(raw.name.as_deref(), "name", Some(park_id))?;
        Ok(Self { raw, park_id, name })
    }

    pub fn park_id(&self) -> &'a str {
        self.park_id
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn extract_basic_info(&self) -> BasicInfo {
        let raw = self.raw;
        let mut info = BasicInfo {
            park_id: self.park_id.to_string(),
            name: self.name.to_string(),
            nature: raw.nature.clone(),
            carpark_type: raw.carpark_type.clone(),
            full_address: raw.display_address.clone(),
            district: raw.district.clone(),
            latitude: raw.latitude,
            longitude: raw.longitude,
            contact_no: raw.contact_no.clone(),
            opening_status: raw.opening_status.clone(),
            facilities: raw.facilities.as_deref().map(join_tags),
            payment_methods: raw.payment_methods.as_deref().map(join_tags),
            creation_date: raw.creation_date.clone(),
            modified_date: raw.modified_date.clone(),
            published_date: raw.published_date.clone(),
            lang: raw.lang.clone(),
            website: raw.website.clone(),
            ..Default::default()
        };

        if let Some(address) = &raw.address {
            info.floor = address.floor.clone();
            info.building_name = address.building_name.clone();
            info.street_name = address.street_name.clone();
            info.building_no = address.building_no.clone();
            info.sub_district = address.sub_district.clone();
            info.dc_district = address.dc_district.clone();
            info.region = address.region.clone();
        }

        if let Some(urls) = &raw.rendition_urls {
            info.square = urls.square.clone();
            info.thumbnail = urls.thumbnail.clone();
            info.banner = urls.banner.clone();
            info.carpark_photo = urls.carpark_photo.clone();
        }

        info
    }

    pub fn extract_address(&self) -> Address {
        let mut value = Address {
            park_id: self.park_id.to_string(),
            full_address: self.raw.display_address.clone(),
            ..Default::default()
        };
        if let Some(address) = &self.raw.address {
            value.unit_no = address.unit_no.clone();
            value.unit_descriptor = address.unit_descriptor.clone();
            value.floor = address.floor.clone();
            value.block_no = address.block_no.clone();
            value.block_descriptor = address.block_descriptor.clone();
            value.building_name = address.building_name.clone();
            value.phase = address.phase.clone();
            value.estate_name = address.estate_name.clone();
            value.village_name = address.village_name.clone();
            value.street_name = address.street_name.clone();
            value.building_no = address.building_no.clone();
            value.sub_district = address.sub_district.clone();
            value.dc_district = address.dc_district.clone();
            value.region = address.region.clone();
        }
        value
    }

    pub fn extract_grace_periods(&self) -> Vec<GracePeriod> {
        self.raw
            .grace_periods
            .iter()
            .flatten()
            .map(|period| GracePeriod {
                park_id: self.park_id.to_string(),
                minutes: period.minutes,
                remark: period.remark.clone(),
            })
            .collect()
    }

    pub fn extract_height_limits(&self) -> Vec<HeightLimit> {
        self.raw
            .height_limits
            .iter()
            .flatten()
            .map(|limit| HeightLimit {
                park_id: self.park_id.to_string(),
                height: limit.height,
                remark: limit.remark.clone(),
            })
            .collect()
    }

    pub fn extract_opening_hours(&self) -> Vec<OpeningHour> {
        self.raw
            .opening_hours
            .iter()
            .flatten()
            .map(|hour| OpeningHour {
                park_id: self.park_id.to_string(),
                weekdays: hour.weekdays.as_deref().map(join_tags),
                exclude_public_holiday: hour.exclude_public_holiday,
                period_start: hour.period_start.clone(),
                period_end: hour.period_end.clone(),
            })
            .collect()
    }

    pub fn space_count(&self, vehicle_type: VehicleType) -> SpaceCount {
        self.raw
            .vehicle(vehicle_type)
            .map(|vehicle| SpaceCount {
                space: vehicle.space,
                space_dis: vehicle.space_dis,
                space_ev: vehicle.space_ev,
                space_unl: vehicle.space_unl,
            })
            .unwrap_or_default()
    }

    pub fn extract_vehicle_space(&self, vehicle_type: VehicleType) -> VehicleSpace {
        VehicleSpace {
            park_id: self.park_id.to_string(),
            vehicle_type,
            space: self.space_count(vehicle_type),
        }
    }

    pub fn extract_charges(&self, vehicle_type: VehicleType, kind: ChargeKind) -> Vec<Charge> {
        let Some(vehicle) = self.raw.vehicle(vehicle_type) else {
            return Vec::new();
        };
        let park_id = self.park_id;
        let space = self.space_count(vehicle_type);

        match kind {
            ChargeKind::Hourly => vehicle
                .hourly_charges
                .iter()
                .flatten()
                .map(|raw| {
                    Charge::Hourly(HourlyCharge::from_raw(park_id, vehicle_type, space, raw))
                })
                .collect(),
            ChargeKind::Monthly => vehicle
                .monthly_charges
                .iter()
                .flatten()
                .map(|raw| {
                    Charge::Monthly(MonthlyCharge {
                        park_id: park_id.to_string(),
                        vehicle_type,
                        charge_type: raw.charge_type.clone(),
                        price: raw.price,
                        ranges: raw.ranges.clone(),
                        covered: raw.covered.clone(),
                        reserved: raw.reserved.clone(),
                        remark: raw.remark.clone(),
                        space,
                    })
                })
                .collect(),
            ChargeKind::DayNight => vehicle
                .day_night_parks
                .iter()
                .flatten()
                .map(|raw| {
                    Charge::DayNight(DayNightPark {
                        park_id: park_id.to_string(),
                        vehicle_type,
                        charge_type: raw.charge_type.clone(),
                        weekdays: raw.weekdays.clone().unwrap_or_default(),
                        exclude_public_holiday: raw.exclude_public_holiday,
                        period_start: raw.period_start.clone(),
                        period_end: raw.period_end.clone(),
                        valid_until: raw.valid_until.clone(),
                        valid_until_end: raw.valid_until_end.clone(),
                        price: raw.price,
                        covered: raw.covered.clone(),
                        remark: raw.remark.clone(),
                        space,
                    })
                })
                .collect(),
            ChargeKind::Privilege => vehicle
                .privileges
                .iter()
                .flatten()
                .map(|raw| {
                    Charge::Privilege(Privilege {
                        park_id: park_id.to_string(),
                        vehicle_type,
                        weekdays: raw.weekdays.clone().unwrap_or_default(),
                        exclude_public_holiday: raw.exclude_public_holiday,
                        period_start: raw.period_start.clone(),
                        period_end: raw.period_end.clone(),
                        description: raw.description.clone(),
                        space,
                    })
                })
                .collect(),
            ChargeKind::Unloading => vehicle
                .unloadings
                .iter()
                .flatten()
                .map(|raw| {
                    Charge::Unloading(Unloading {
                        park_id: park_id.to_string(),
                        vehicle_type,
                        charge_type: raw.charge_type.clone(),
                        price: raw.price,
                        usage_thresholds: raw.usage_thresholds.clone(),
                        remark: raw.remark.clone(),
                        space,
                    })
                })
                .collect(),
        }
    }

    /// Like [`Normalizer::extract_charges`] with the kind given by its JSON
    /// key (`hourlyCharges`, `monthlyCharges`, ...).
    pub fn extract_charges_named(
        &self,
        vehicle_type: VehicleType,
        kind: &str,
    ) -> Result<Vec<Charge>, Error> {
        let kind: ChargeKind = kind.parse()?;
        Ok(self.extract_charges(vehicle_type, kind))
    }

    pub fn extract_hourly_buckets(&self, vehicle_type: VehicleType) -> HourlyBuckets {
        let charges = self
            .extract_charges(vehicle_type, ChargeKind::Hourly)
            .into_iter()
            .filter_map(|charge| match charge {
                Charge::Hourly(charge) => Some(charge),
                _ => None,
            });
        let buckets = HourlyBuckets::from_charges(charges);

        for bucket in [
            ChargeBucket::Weekdays,
            ChargeBucket::Weekend,
            ChargeBucket::AllTime,
        ] {
            let displaced = buckets.displaced_in(bucket);
            if displaced > 0 {
                warn!(
                    "Carpark {} has {} extra {} hourly charges for {}, only the last one is kept",
                    self.park_id, displaced, bucket, vehicle_type
                );
            }
        }
        if buckets.unclassified > 0 {
            warn!(
                "Carpark {} has {} {} hourly charges matching no weekday bucket, they are left out of the buckets",
                self.park_id, buckets.unclassified, vehicle_type
            );
        }
        buckets
    }

    /// Every category for one vehicle type, plus the matching vacancy.
    pub fn normalize(&self, vacancy: Option<&RawVacancy>, vehicle_type: VehicleType) -> Carpark {
        trace!("Normalizing carpark {}", self.park_id);
        let charges = ChargeKind::ALL
            .into_iter()
            .flat_map(|kind| self.extract_charges(vehicle_type, kind))
            .collect();
        Carpark {
            basic_info: self.extract_basic_info(),
            address: self.extract_address(),
            grace_periods: self.extract_grace_periods(),
            height_limits: self.extract_height_limits(),
            opening_hours: self.extract_opening_hours(),
            vehicle_space: self.extract_vehicle_space(vehicle_type),
            vacancy: vacancy.and_then(|vacancy| extract_vacancy(vacancy, vehicle_type)),
            charges,
            hourly_buckets: self.extract_hourly_buckets(vehicle_type),
        }
    }
}

/// Vacancy of one vehicle category, `None` when the record has no entry for
/// it. A present entry with a zero count stays `Some`.
pub fn extract_vacancy(raw: &RawVacancy, vehicle_type: VehicleType) -> Option<Vacancy> {
    let park_id = raw.park_id.as_deref().and_then(clean_park_id)?;
    let entry = raw.entries(vehicle_type).first()?;
    Some(Vacancy {
        park_id: park_id.to_string(),
        vehicle_type,
        vacancy_type: entry.vacancy_type.clone(),
        vacancy: entry.vacancy,
        last_update: entry.last_update.clone(),
    })
}

/// All rows derived from one carpark.
#[derive(Debug, Clone)]
pub struct Carpark {
    pub basic_info: BasicInfo,
    pub address: Address,
    pub grace_periods: Vec<GracePeriod>,
    pub height_limits: Vec<HeightLimit>,
    pub opening_hours: Vec<OpeningHour>,
    pub vehicle_space: VehicleSpace,
    pub vacancy: Option<Vacancy>,
    pub charges: Vec<Charge>,
    pub hourly_buckets: HourlyBuckets,
}

/// Rows of a whole feed, one list per output category.
#[derive(Debug, Default)]
pub struct Tables {
    pub basic_info: Vec<BasicInfo>,
    pub address: Vec<Address>,
    pub grace_periods: Vec<GracePeriod>,
    pub height_limits: Vec<HeightLimit>,
    pub opening_hours: Vec<OpeningHour>,
    pub vehicle_space: Vec<VehicleSpace>,
    pub vacancy: Vec<Vacancy>,
    pub hourly_charges: Vec<HourlyCharge>,
    pub monthly_charges: Vec<MonthlyCharge>,
    pub day_night_parks: Vec<DayNightPark>,
    pub privileges: Vec<Privilege>,
    pub unloadings: Vec<Unloading>,
    pub charges_weekdays: Vec<BucketedCharge>,
    pub charges_weekend: Vec<BucketedCharge>,
    pub charges_all_time: Vec<BucketedCharge>,
    /// Records dropped because they failed to normalize.
    pub skipped: usize,
}

impl Tables {
    /// Number of carparks that made it into the tables.
    pub fn len(&self) -> usize {
        self.basic_info.len()
    }

    pub fn is_empty(&self) -> bool {
        self.basic_info.is_empty()
    }

    pub fn push(&mut self, carpark: Carpark) {
        let name = carpark.basic_info.name.clone();
        self.basic_info.push(carpark.basic_info);
        self.address.push(carpark.address);
        self.grace_periods.extend(carpark.grace_periods);
        self.height_limits.extend(carpark.height_limits);
        self.opening_hours.extend(carpark.opening_hours);
        self.vehicle_space.push(carpark.vehicle_space);
        self.vacancy.extend(carpark.vacancy);

        for charge in carpark.charges {
            match charge {
                Charge::Hourly(charge) => self.hourly_charges.push(charge),
                Charge::Monthly(charge) => self.monthly_charges.push(charge),
                Charge::DayNight(charge) => self.day_night_parks.push(charge),
                Charge::Privilege(charge) => self.privileges.push(charge),
                Charge::Unloading(charge) => self.unloadings.push(charge),
            }
        }

        for record in carpark.hourly_buckets.into_records(&name) {
            match record.bucket {
                ChargeBucket::Weekdays => self.charges_weekdays.push(record),
                ChargeBucket::Weekend => self.charges_weekend.push(record),
                ChargeBucket::AllTime => self.charges_all_time.push(record),
            }
        }
    }
}

/// Normalizes one raw `info` record together with its vacancy, if any.
pub fn normalize_record(
    value: &Value,
    vacancy: Option<&RawVacancy>,
    vehicle_type: VehicleType,
) -> Result<Carpark, Error> {
    let raw = parse_carpark(value)?;
    let normalizer = Normalizer::new(&raw)?;
    Ok(normalizer.normalize(vacancy, vehicle_type))
}

/// Normalizes a whole `info` feed, pairing records with the `vacancy` feed
/// by park id. Carparks that fail are logged and left out.
pub fn normalize_feed(info: &[Value], vacancy: &[Value], vehicle_type: VehicleType) -> Tables {
    debug!("Normalizing {} carparks...", info.len());
    let now = Instant::now();
    let vacancies = index_vacancy(vacancy);

    let mut tables = Tables::default();
    for (i, value) in info.iter().enumerate() {
        let park_id = raw_park_id(value);
        let vacancy = park_id.as_deref().and_then(|id| vacancies.get(id));
        if vacancy.is_none() {
            debug!(
                "No vacancy record for carpark {}",
                park_id.as_deref().unwrap_or("<unknown>")
            );
        }
        match normalize_record(value, vacancy, vehicle_type) {
            Ok(carpark) => tables.push(carpark),
            Err(err) => {
                warn!("Skipping record {i}: {err}");
                tables.skipped += 1;
            }
        }
    }

    debug!(
        "Normalizing {} carparks took {:?} ({} skipped)",
        tables.len(),
        now.elapsed(),
        tables.skipped
    );
    tables
}

fn index_vacancy(vacancy: &[Value]) -> HashMap<String, RawVacancy> {
    let mut lookup = HashMap::with_capacity(vacancy.len());
    for value in vacancy {
        match parse_vacancy(value) {
            Ok(raw) => match raw
                .park_id
                .as_deref()
                .and_then(clean_park_id)
                .map(str::to_string)
            {
                Some(park_id) => {
                    lookup.insert(park_id, raw);
                }
                None => warn!("Vacancy record without park_Id, ignoring it"),
            },
            Err(err) => warn!("Ignoring vacancy record: {err}"),
        }
    }
    lookup
}
