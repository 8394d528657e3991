use serde::Serialize;
use std::{collections::HashSet, fmt, str::FromStr};

use crate::{
    api::{RawHourlyCharge, VehicleType},
    normalize::records::SpaceCount,
    shared::{Cell, InvalidArgument, Record, join_tags},
};

/// The charge lists a vehicle category block can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargeKind {
    Hourly,
    Monthly,
    DayNight,
    Privilege,
    Unloading,
}

impl ChargeKind {
    pub const ALL: [ChargeKind; 5] = [
        ChargeKind::Hourly,
        ChargeKind::Monthly,
        ChargeKind::DayNight,
        ChargeKind::Privilege,
        ChargeKind::Unloading,
    ];

    pub const NAMES: &'static [&'static str] = &[
        "hourlyCharges",
        "monthlyCharges",
        "dayNightParks",
        "privileges",
        "unloadings",
    ];

    /// JSON key of the list on the vehicle block.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChargeKind::Hourly => "hourlyCharges",
            ChargeKind::Monthly => "monthlyCharges",
            ChargeKind::DayNight => "dayNightParks",
            ChargeKind::Privilege => "privileges",
            ChargeKind::Unloading => "unloadings",
        }
    }

    /// Output category name.
    pub const fn table(&self) -> &'static str {
        match self {
            ChargeKind::Hourly => "hourly_charges",
            ChargeKind::Monthly => "monthly_charges",
            ChargeKind::DayNight => "day_night_parks",
            ChargeKind::Privilege => "privileges",
            ChargeKind::Unloading => "unloadings",
        }
    }
}

impl FromStr for ChargeKind {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChargeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| InvalidArgument::new("charge kind", s, Self::NAMES))
    }
}

impl fmt::Display for ChargeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized charge entry, one variant per charge list.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Charge {
    Hourly(HourlyCharge),
    Monthly(MonthlyCharge),
    DayNight(DayNightPark),
    Privilege(Privilege),
    Unloading(Unloading),
}

impl Charge {
    pub fn kind(&self) -> ChargeKind {
        match self {
            Charge::Hourly(_) => ChargeKind::Hourly,
            Charge::Monthly(_) => ChargeKind::Monthly,
            Charge::DayNight(_) => ChargeKind::DayNight,
            Charge::Privilege(_) => ChargeKind::Privilege,
            Charge::Unloading(_) => ChargeKind::Unloading,
        }
    }

    pub fn park_id(&self) -> &str {
        match self {
            Charge::Hourly(charge) => &charge.park_id,
            Charge::Monthly(charge) => &charge.park_id,
            Charge::DayNight(charge) => &charge.park_id,
            Charge::Privilege(charge) => &charge.park_id,
            Charge::Unloading(charge) => &charge.park_id,
        }
    }

    pub fn space(&self) -> &SpaceCount {
        match self {
            Charge::Hourly(charge) => &charge.space,
            Charge::Monthly(charge) => &charge.space,
            Charge::DayNight(charge) => &charge.space,
            Charge::Privilege(charge) => &charge.space,
            Charge::Unloading(charge) => &charge.space,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HourlyCharge {
    pub park_id: String,
    pub vehicle_type: VehicleType,
    pub charge_type: Option<String>,
    /// Day tokens as the feed lists them (`MON`, `SAT`, `PH`, ...).
    pub weekdays: Vec<String>,
    pub exclude_public_holiday: Option<bool>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub price: Option<f64>,
    pub usage_thresholds: Option<serde_json::Value>,
    pub usage_minimum: Option<f64>,
    pub covered: Option<String>,
    pub remark: Option<String>,
    #[serde(flatten)]
    pub space: SpaceCount,
}

impl HourlyCharge {
    pub fn from_raw(
        park_id: &str,
        vehicle_type: VehicleType,
        space: SpaceCount,
        raw: &RawHourlyCharge,
    ) -> Self {
        Self {
            park_id: park_id.to_string(),
            vehicle_type,
            charge_type: raw.charge_type.clone(),
            weekdays: raw.weekdays.clone().unwrap_or_default(),
            exclude_public_holiday: raw.exclude_public_holiday,
            period_start: raw.period_start.clone(),
            period_end: raw.period_end.clone(),
            price: raw.price,
            usage_thresholds: raw.usage_thresholds.clone(),
            usage_minimum: raw.usage_minimum,
            covered: raw.covered.clone(),
            remark: raw.remark.clone(),
            space,
        }
    }

    pub fn bucket(&self) -> Option<ChargeBucket> {
        classify_weekdays(&self.weekdays)
    }

    /// Cells after `park_id`, shared with [`BucketedCharge`].
    fn detail_cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            self.vehicle_type.as_str().into(),
            self.charge_type.as_deref().into(),
            join_tags(&self.weekdays).into(),
            self.exclude_public_holiday.into(),
            self.period_start.as_deref().into(),
            self.period_end.as_deref().into(),
            self.price.into(),
            Cell::json(self.usage_thresholds.as_ref()),
            self.usage_minimum.into(),
            self.covered.as_deref().into(),
            self.remark.as_deref().into(),
        ];
        cells.extend(self.space.cells());
        cells
    }
}

impl Record for HourlyCharge {
    fn columns() -> &'static [&'static str] {
        &[
            "park_id",
            "vehicle_type",
            "type",
            "weekdays",
            "exclude_public_holiday",
            "period_start",
            "period_end",
            "price",
            "usage_thresholds",
            "usage_minimum",
            "covered",
            "remark",
            "space",
            "space_dis",
            "space_ev",
            "space_unl",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![self.park_id.as_str().into()];
        cells.extend(self.detail_cells());
        cells
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MonthlyCharge {
    pub park_id: String,
    pub vehicle_type: VehicleType,
    pub charge_type: Option<String>,
    pub price: Option<f64>,
    pub ranges: Option<serde_json::Value>,
    pub covered: Option<String>,
    pub reserved: Option<String>,
    pub remark: Option<String>,
    #[serde(flatten)]
    pub space: SpaceCount,
}

impl Record for MonthlyCharge {
    fn columns() -> &'static [&'static str] {
        &[
            "park_id",
            "vehicle_type",
            "type",
            "price",
            "ranges",
            "covered",
            "reserved",
            "remark",
            "space",
            "space_dis",
            "space_ev",
            "space_unl",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            self.park_id.as_str().into(),
            self.vehicle_type.as_str().into(),
            self.charge_type.as_deref().into(),
            self.price.into(),
            Cell::json(self.ranges.as_ref()),
            self.covered.as_deref().into(),
            self.reserved.as_deref().into(),
            self.remark.as_deref().into(),
        ];
        cells.extend(self.space.cells());
        cells
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DayNightPark {
    pub park_id: String,
    pub vehicle_type: VehicleType,
    pub charge_type: Option<String>,
    pub weekdays: Vec<String>,
    pub exclude_public_holiday: Option<bool>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub valid_until: Option<String>,
    pub valid_until_end: Option<String>,
    pub price: Option<f64>,
    pub covered: Option<String>,
    pub remark: Option<String>,
    #[serde(flatten)]
    pub space: SpaceCount,
}

impl Record for DayNightPark {
    fn columns() -> &'static [&'static str] {
        &[
            "park_id",
            "vehicle_type",
            "type",
            "weekdays",
            "exclude_public_holiday",
            "period_start",
            "period_end",
            "valid_until",
            "valid_until_end",
            "price",
            "covered",
            "remark",
            "space",
            "space_dis",
            "space_ev",
            "space_unl",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            self.park_id.as_str().into(),
            self.vehicle_type.as_str().into(),
            self.charge_type.as_deref().into(),
            join_tags(&self.weekdays).into(),
            self.exclude_public_holiday.into(),
            self.period_start.as_deref().into(),
            self.period_end.as_deref().into(),
            self.valid_until.as_deref().into(),
            self.valid_until_end.as_deref().into(),
            self.price.into(),
            self.covered.as_deref().into(),
            self.remark.as_deref().into(),
        ];
        cells.extend(self.space.cells());
        cells
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Privilege {
    pub park_id: String,
    pub vehicle_type: VehicleType,
    pub weekdays: Vec<String>,
    pub exclude_public_holiday: Option<bool>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub space: SpaceCount,
}

impl Record for Privilege {
    fn columns() -> &'static [&'static str] {
        &[
            "park_id",
            "vehicle_type",
            "weekdays",
            "exclude_public_holiday",
            "period_start",
            "period_end",
            "description",
            "space",
            "space_dis",
            "space_ev",
            "space_unl",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            self.park_id.as_str().into(),
            self.vehicle_type.as_str().into(),
            join_tags(&self.weekdays).into(),
            self.exclude_public_holiday.into(),
            self.period_start.as_deref().into(),
            self.period_end.as_deref().into(),
            self.description.as_deref().into(),
        ];
        cells.extend(self.space.cells());
        cells
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Unloading {
    pub park_id: String,
    pub vehicle_type: VehicleType,
    pub charge_type: Option<String>,
    pub price: Option<f64>,
    pub usage_thresholds: Option<serde_json::Value>,
    pub remark: Option<String>,
    #[serde(flatten)]
    pub space: SpaceCount,
}

impl Record for Unloading {
    fn columns() -> &'static [&'static str] {
        &[
            "park_id",
            "vehicle_type",
            "type",
            "price",
            "usage_thresholds",
            "remark",
            "space",
            "space_dis",
            "space_ev",
            "space_unl",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            self.park_id.as_str().into(),
            self.vehicle_type.as_str().into(),
            self.charge_type.as_deref().into(),
            self.price.into(),
            Cell::json(self.usage_thresholds.as_ref()),
            self.remark.as_deref().into(),
        ];
        cells.extend(self.space.cells());
        cells
    }
}

/// Which part of the week an hourly charge applies to.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChargeBucket {
    Weekdays,
    Weekend,
    AllTime,
}

impl ChargeBucket {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChargeBucket::Weekdays => "weekdays",
            ChargeBucket::Weekend => "weekend",
            ChargeBucket::AllTime => "all_time",
        }
    }

    pub const fn table(&self) -> &'static str {
        match self {
            ChargeBucket::Weekdays => "charges_weekdays",
            ChargeBucket::Weekend => "charges_weekend",
            ChargeBucket::AllTime => "charges_all_time",
        }
    }
}

impl fmt::Display for ChargeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const WORKING_DAYS: [&str; 5] = ["mon", "tue", "wed", "thu", "fri"];
const REST_DAYS: [&str; 3] = ["sat", "sun", "ph"];

/// Classifies a weekday set, ignoring case.
///
/// A set covering all eight tokens is all-time. Otherwise any working day
/// makes it weekdays, checked before weekend, so a mixed set such as
/// `MON, SAT` lands in weekdays. A set with neither is `None`.
pub fn classify_weekdays<S: AsRef<str>>(days: &[S]) -> Option<ChargeBucket> {
    let days: HashSet<String> = days
        .iter()
        .map(|day| day.as_ref().trim().to_lowercase())
        .collect();
    let working = WORKING_DAYS
        .iter()
        .filter(|day| days.contains(**day))
        .count();
    let rest = REST_DAYS.iter().filter(|day| days.contains(**day)).count();

    if working + rest == WORKING_DAYS.len() + REST_DAYS.len() {
        Some(ChargeBucket::AllTime)
    } else if working > 0 {
        Some(ChargeBucket::Weekdays)
    } else if rest > 0 {
        Some(ChargeBucket::Weekend)
    } else {
        None
    }
}

/// At most one hourly charge per bucket for one carpark and vehicle type.
///
/// When several entries fall in the same bucket the last one wins. The ones
/// it replaced are kept in `displaced` so the caller can report them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyBuckets {
    pub weekdays: Option<HourlyCharge>,
    pub weekend: Option<HourlyCharge>,
    pub all_time: Option<HourlyCharge>,
    pub displaced: Vec<(ChargeBucket, HourlyCharge)>,
    /// Entries whose weekday set matched no bucket.
    pub unclassified: usize,
}

impl HourlyBuckets {
    pub fn from_charges<I>(charges: I) -> Self
    where
        I: IntoIterator<Item = HourlyCharge>,
    {
        let mut buckets = Self::default();
        for charge in charges {
            match charge.bucket() {
                Some(bucket) => buckets.insert(bucket, charge),
                None => buckets.unclassified += 1,
            }
        }
        buckets
    }

    fn insert(&mut self, bucket: ChargeBucket, charge: HourlyCharge) {
        let previous = self.slot_mut(bucket).replace(charge);
        if let Some(previous) = previous {
            self.displaced.push((bucket, previous));
        }
    }

    fn slot_mut(&mut self, bucket: ChargeBucket) -> &mut Option<HourlyCharge> {
        match bucket {
            ChargeBucket::Weekdays => &mut self.weekdays,
            ChargeBucket::Weekend => &mut self.weekend,
            ChargeBucket::AllTime => &mut self.all_time,
        }
    }

    pub fn get(&self, bucket: ChargeBucket) -> Option<&HourlyCharge> {
        match bucket {
            ChargeBucket::Weekdays => self.weekdays.as_ref(),
            ChargeBucket::Weekend => self.weekend.as_ref(),
            ChargeBucket::AllTime => self.all_time.as_ref(),
        }
    }

    pub fn displaced_in(&self, bucket: ChargeBucket) -> usize {
        self.displaced.iter().filter(|(b, _)| *b == bucket).count()
    }

    pub fn into_records(self, name: &str) -> Vec<BucketedCharge> {
        [
            (ChargeBucket::Weekdays, self.weekdays),
            (ChargeBucket::Weekend, self.weekend),
            (ChargeBucket::AllTime, self.all_time),
        ]
        .into_iter()
        .filter_map(|(bucket, charge)| {
            charge.map(|charge| BucketedCharge {
                name: name.to_string(),
                bucket,
                charge,
            })
        })
        .collect()
    }
}

/// Row of the `charges_weekdays` / `charges_weekend` / `charges_all_time`
/// tables.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BucketedCharge {
    pub name: String,
    pub bucket: ChargeBucket,
    #[serde(flatten)]
    pub charge: HourlyCharge,
}

impl Record for BucketedCharge {
    fn columns() -> &'static [&'static str] {
        &[
            "park_id",
            "name",
            "bucket",
            "vehicle_type",
            "type",
            "weekdays",
            "exclude_public_holiday",
            "period_start",
            "period_end",
            "price",
            "usage_thresholds",
            "usage_minimum",
            "covered",
            "remark",
            "space",
            "space_dis",
            "space_ev",
            "space_unl",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![
            self.charge.park_id.as_str().into(),
            self.name.as_str().into(),
            self.bucket.as_str().into(),
        ];
        cells.extend(self.charge.detail_cells());
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly(weekdays: &[&str]) -> HourlyCharge {
        HourlyCharge {
            park_id: "1".into(),
            vehicle_type: VehicleType::PrivateCar,
            charge_type: Some("hourly".into()),
            weekdays: weekdays.iter().map(|day| day.to_string()).collect(),
            exclude_public_holiday: None,
            period_start: None,
            period_end: None,
            price: None,
            usage_thresholds: None,
            usage_minimum: None,
            covered: None,
            remark: None,
            space: SpaceCount::default(),
        }
    }

    #[test]
    fn columns_line_up_with_cells() {
        let charge = hourly(&["MON"]);
        assert_eq!(HourlyCharge::columns().len(), charge.cells().len());
        let bucketed = BucketedCharge {
            name: "A".into(),
            bucket: ChargeBucket::Weekdays,
            charge,
        };
        assert_eq!(BucketedCharge::columns().len(), bucketed.cells().len());
        assert_eq!(
            &HourlyCharge::columns()[1..],
            &BucketedCharge::columns()[3..]
        );
    }

    #[test]
    fn charge_kind_round_trip_names() {
        for kind in ChargeKind::ALL {
            assert_eq!(kind.as_str().parse::<ChargeKind>(), Ok(kind));
        }
        assert!("weeklyCharges".parse::<ChargeKind>().is_err());
    }

    #[test]
    fn unclassified_are_counted() {
        let buckets = HourlyBuckets::from_charges([hourly(&[]), hourly(&["holiday"])]);
        assert_eq!(buckets.unclassified, 2);
        assert!(buckets.into_records("A").is_empty());
    }
}
