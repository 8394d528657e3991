use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    api::VehicleType,
    shared::{lenient, lenient_vec},
};

/// One record of the `info` dataset.
///
/// Top-level scalars are strict. Nested objects go through `lenient` and
/// lists through `lenient_vec`, so a malformed sub-object reads as absent and
/// a malformed list entry is dropped on its own, neither fails the carpark.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawCarpark {
    #[serde(rename = "park_Id")]
    pub park_id: Option<String>,
    pub name: Option<String>,
    pub nature: Option<String>,
    #[serde(rename = "carpark_Type")]
    pub carpark_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub address: Option<RawAddress>,
    pub display_address: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contact_no: Option<String>,
    #[serde(rename = "opening_status")]
    pub opening_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub facilities: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub payment_methods: Option<Vec<String>>,
    pub creation_date: Option<String>,
    pub modified_date: Option<String>,
    pub published_date: Option<String>,
    pub lang: Option<String>,
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rendition_urls: Option<RawRenditionUrls>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub opening_hours: Option<Vec<RawOpeningHour>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub grace_periods: Option<Vec<RawGracePeriod>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub height_limits: Option<Vec<RawHeightLimit>>,
    #[serde(default, deserialize_with = "lenient")]
    pub private_car: Option<RawVehicle>,
    #[serde(rename = "LGV", default, deserialize_with = "lenient")]
    pub lgv: Option<RawVehicle>,
    #[serde(rename = "HGV", default, deserialize_with = "lenient")]
    pub hgv: Option<RawVehicle>,
    #[serde(rename = "CV", default, deserialize_with = "lenient")]
    pub cv: Option<RawVehicle>,
    #[serde(default, deserialize_with = "lenient")]
    pub coach: Option<RawVehicle>,
    #[serde(default, deserialize_with = "lenient")]
    pub motor_cycle: Option<RawVehicle>,
}

impl RawCarpark {
    pub fn vehicle(&self, vehicle_type: VehicleType) -> Option<&RawVehicle> {
        match vehicle_type {
            VehicleType::PrivateCar => self.private_car.as_ref(),
            VehicleType::Lgv => self.lgv.as_ref(),
            VehicleType::Hgv => self.hgv.as_ref(),
            VehicleType::Cv => self.cv.as_ref(),
            VehicleType::Coach => self.coach.as_ref(),
            VehicleType::MotorCycle => self.motor_cycle.as_ref(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawAddress {
    pub unit_no: Option<String>,
    pub unit_descriptor: Option<String>,
    pub floor: Option<String>,
    pub block_no: Option<String>,
    pub block_descriptor: Option<String>,
    pub building_name: Option<String>,
    pub phase: Option<String>,
    pub estate_name: Option<String>,
    pub village_name: Option<String>,
    pub street_name: Option<String>,
    pub building_no: Option<String>,
    pub sub_district: Option<String>,
    pub dc_district: Option<String>,
    pub region: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawRenditionUrls {
    pub square: Option<String>,
    pub thumbnail: Option<String>,
    pub banner: Option<String>,
    pub carpark_photo: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawOpeningHour {
    pub weekdays: Option<Vec<String>>,
    pub exclude_public_holiday: Option<bool>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawGracePeriod {
    pub minutes: Option<i64>,
    pub remark: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawHeightLimit {
    pub height: Option<f64>,
    pub remark: Option<String>,
}

/// Per vehicle category block of an info record. Space counts are lenient
/// too, a bad count must not take the charge lists down with it.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawVehicle {
    #[serde(default, deserialize_with = "lenient")]
    pub space: Option<i64>,
    #[serde(rename = "spaceDIS", default, deserialize_with = "lenient")]
    pub space_dis: Option<i64>,
    #[serde(rename = "spaceEV", default, deserialize_with = "lenient")]
    pub space_ev: Option<i64>,
    #[serde(rename = "spaceUNL", default, deserialize_with = "lenient")]
    pub space_unl: Option<i64>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub hourly_charges: Option<Vec<RawHourlyCharge>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub monthly_charges: Option<Vec<RawMonthlyCharge>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub day_night_parks: Option<Vec<RawDayNightPark>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub privileges: Option<Vec<RawPrivilege>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub unloadings: Option<Vec<RawUnloading>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawHourlyCharge {
    #[serde(rename = "type")]
    pub charge_type: Option<String>,
    pub weekdays: Option<Vec<String>>,
    pub exclude_public_holiday: Option<bool>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub price: Option<f64>,
    pub usage_thresholds: Option<Value>,
    pub usage_minimum: Option<f64>,
    pub covered: Option<String>,
    pub remark: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawMonthlyCharge {
    #[serde(rename = "type")]
    pub charge_type: Option<String>,
    pub price: Option<f64>,
    pub ranges: Option<Value>,
    pub covered: Option<String>,
    pub reserved: Option<String>,
    pub remark: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawDayNightPark {
    #[serde(rename = "type")]
    pub charge_type: Option<String>,
    pub weekdays: Option<Vec<String>>,
    pub exclude_public_holiday: Option<bool>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub valid_until: Option<String>,
    pub valid_until_end: Option<String>,
    pub price: Option<f64>,
    pub covered: Option<String>,
    pub remark: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawPrivilege {
    pub weekdays: Option<Vec<String>>,
    pub exclude_public_holiday: Option<bool>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawUnloading {
    #[serde(rename = "type")]
    pub charge_type: Option<String>,
    pub price: Option<f64>,
    pub usage_thresholds: Option<Value>,
    pub remark: Option<String>,
}

/// One record of the `vacancy` dataset.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawVacancy {
    #[serde(rename = "park_Id")]
    pub park_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub private_car: Option<Vec<RawVacancyEntry>>,
    #[serde(rename = "LGV", default, deserialize_with = "lenient_vec")]
    pub lgv: Option<Vec<RawVacancyEntry>>,
    #[serde(rename = "HGV", default, deserialize_with = "lenient_vec")]
    pub hgv: Option<Vec<RawVacancyEntry>>,
    #[serde(rename = "CV", default, deserialize_with = "lenient_vec")]
    pub cv: Option<Vec<RawVacancyEntry>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub coach: Option<Vec<RawVacancyEntry>>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub motor_cycle: Option<Vec<RawVacancyEntry>>,
}

impl RawVacancy {
    pub fn entries(&self, vehicle_type: VehicleType) -> &[RawVacancyEntry] {
        let entries = match vehicle_type {
            VehicleType::PrivateCar => &self.private_car,
            VehicleType::Lgv => &self.lgv,
            VehicleType::Hgv => &self.hgv,
            VehicleType::Cv => &self.cv,
            VehicleType::Coach => &self.coach,
            VehicleType::MotorCycle => &self.motor_cycle,
        };
        entries.as_deref().unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RawVacancyEntry {
    pub vacancy_type: Option<String>,
    pub vacancy: Option<i64>,
    #[serde(rename = "lastupdate")]
    pub last_update: Option<String>,
}
