use serde::Serialize;

use crate::{
    api::VehicleType,
    shared::{Cell, Record},
};

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct BasicInfo {
    pub park_id: String,
    pub name: String,
    pub nature: Option<String>,
    pub carpark_type: Option<String>,
    pub full_address: Option<String>,
    pub district: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contact_no: Option<String>,
    pub opening_status: Option<String>,
    pub facilities: Option<String>,
    pub payment_methods: Option<String>,
    pub creation_date: Option<String>,
    pub modified_date: Option<String>,
    pub published_date: Option<String>,
    pub lang: Option<String>,
    pub website: Option<String>,
    // From `address`, when present
    pub floor: Option<String>,
    pub building_name: Option<String>,
    pub street_name: Option<String>,
    pub building_no: Option<String>,
    pub sub_district: Option<String>,
    pub dc_district: Option<String>,
    pub region: Option<String>,
    // From `renditionUrls`, when present
    pub square: Option<String>,
    pub thumbnail: Option<String>,
    pub banner: Option<String>,
    pub carpark_photo: Option<String>,
}

impl BasicInfo {
    /// True when none of the address derived fields were filled in.
    pub fn has_no_address_fields(&self) -> bool {
        [
            &self.floor,
            &self.building_name,
            &self.street_name,
            &self.building_no,
            &self.sub_district,
            &self.dc_district,
            &self.region,
        ]
        .iter()
        .all(|field| field.is_none())
    }
}

impl Record for BasicInfo {
    fn columns() -> &'static [&'static str] {
        &[
            "park_id",
            "name",
            "nature",
            "carpark_type",
            "full_address",
            "district",
            "latitude",
            "longitude",
            "contact_no",
            "opening_status",
            "facilities",
            "payment_methods",
            "creation_date",
            "modified_date",
            "published_date",
            "lang",
            "website",
            "floor",
            "building_name",
            "street_name",
            "building_no",
            "sub_district",
            "dc_district",
            "region",
            "square",
            "thumbnail",
            "banner",
            "carpark_photo",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.park_id.as_str().into(),
            self.name.as_str().into(),
            self.nature.as_deref().into(),
            self.carpark_type.as_deref().into(),
            self.full_address.as_deref().into(),
            self.district.as_deref().into(),
            self.latitude.into(),
            self.longitude.into(),
            self.contact_no.as_deref().into(),
            self.opening_status.as_deref().into(),
            self.facilities.as_deref().into(),
            self.payment_methods.as_deref().into(),
            self.creation_date.as_deref().into(),
            self.modified_date.as_deref().into(),
            self.published_date.as_deref().into(),
            self.lang.as_deref().into(),
            self.website.as_deref().into(),
            self.floor.as_deref().into(),
            self.building_name.as_deref().into(),
            self.street_name.as_deref().into(),
            self.building_no.as_deref().into(),
            self.sub_district.as_deref().into(),
            self.dc_district.as_deref().into(),
            self.region.as_deref().into(),
            self.square.as_deref().into(),
            self.thumbnail.as_deref().into(),
            self.banner.as_deref().into(),
            self.carpark_photo.as_deref().into(),
        ]
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub park_id: String,
    pub full_address: Option<String>,
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

impl Record for Address {
    fn columns() -> &'static [&'static str] {
        &[
            "park_id",
            "full_address",
            "unit_no",
            "unit_descriptor",
            "floor",
            "block_no",
            "block_descriptor",
            "building_name",
            "phase",
            "estate_name",
            "village_name",
            "street_name",
            "building_no",
            "sub_district",
            "dc_district",
            "region",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.park_id.as_str().into(),
            self.full_address.as_deref().into(),
            self.unit_no.as_deref().into(),
            self.unit_descriptor.as_deref().into(),
            self.floor.as_deref().into(),
            self.block_no.as_deref().into(),
            self.block_descriptor.as_deref().into(),
            self.building_name.as_deref().into(),
            self.phase.as_deref().into(),
            self.estate_name.as_deref().into(),
            self.village_name.as_deref().into(),
            self.street_name.as_deref().into(),
            self.building_no.as_deref().into(),
            self.sub_district.as_deref().into(),
            self.dc_district.as_deref().into(),
            self.region.as_deref().into(),
        ]
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct GracePeriod {
    pub park_id: String,
    pub minutes: Option<i64>,
    pub remark: Option<String>,
}

impl Record for GracePeriod {
    fn columns() -> &'static [&'static str] {
        &["park_id", "minutes", "remark"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.park_id.as_str().into(),
            self.minutes.into(),
            self.remark.as_deref().into(),
        ]
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct HeightLimit {
    pub park_id: String,
    /// Metres
    pub height: Option<f64>,
    pub remark: Option<String>,
}

impl Record for HeightLimit {
    fn columns() -> &'static [&'static str] {
        &["park_id", "height", "remark"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.park_id.as_str().into(),
            self.height.into(),
            self.remark.as_deref().into(),
        ]
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct OpeningHour {
    pub park_id: String,
    pub weekdays: Option<String>,
    pub exclude_public_holiday: Option<bool>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
}

impl Record for OpeningHour {
    fn columns() -> &'static [&'static str] {
        &[
            "park_id",
            "weekdays",
            "exclude_public_holiday",
            "period_start",
            "period_end",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.park_id.as_str().into(),
            self.weekdays.as_deref().into(),
            self.exclude_public_holiday.into(),
            self.period_start.as_deref().into(),
            self.period_end.as_deref().into(),
        ]
    }
}

/// Space counts of one vehicle category. Every count is `None` when the
/// carpark has no block for that category.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceCount {
    pub space: Option<i64>,
    pub space_dis: Option<i64>,
    pub space_ev: Option<i64>,
    pub space_unl: Option<i64>,
}

impl SpaceCount {
    pub const COLUMNS: [&'static str; 4] = ["space", "space_dis", "space_ev", "space_unl"];

    pub fn is_empty(&self) -> bool {
        self.space.is_none()
            && self.space_dis.is_none()
            && self.space_ev.is_none()
            && self.space_unl.is_none()
    }

    pub fn cells(&self) -> [Cell; 4] {
        [
            self.space.into(),
            self.space_dis.into(),
            self.space_ev.into(),
            self.space_unl.into(),
        ]
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VehicleSpace {
    pub park_id: String,
    pub vehicle_type: VehicleType,
    #[serde(flatten)]
    pub space: SpaceCount,
}

impl Record for VehicleSpace {
    fn columns() -> &'static [&'static str] {
        &[
            "park_id",
            "vehicle_type",
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
        ];
        cells.extend(self.space.cells());
        cells
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Vacancy {
    pub park_id: String,
    pub vehicle_type: VehicleType,
    pub vacancy_type: Option<String>,
    pub vacancy: Option<i64>,
    pub last_update: Option<String>,
}

impl Record for Vacancy {
    fn columns() -> &'static [&'static str] {
        &[
            "park_id",
            "vehicle_type",
            "vacancy_type",
            "vacancy",
            "last_update",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.park_id.as_str().into(),
            self.vehicle_type.as_str().into(),
            self.vacancy_type.as_deref().into(),
            self.vacancy.into(),
            self.last_update.as_deref().into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_aligned<R: Record>(record: &R) {
        assert_eq!(R::columns().len(), record.cells().len());
        assert_eq!(R::columns()[0], "park_id");
    }

    #[test]
    fn columns_line_up_with_cells() {
        assert_aligned(&BasicInfo::default());
        assert_aligned(&Address::default());
        assert_aligned(&GracePeriod::default());
        assert_aligned(&HeightLimit::default());
        assert_aligned(&OpeningHour::default());
        assert_aligned(&VehicleSpace {
            park_id: "1".into(),
            vehicle_type: VehicleType::Coach,
            space: SpaceCount::default(),
        });
        assert_aligned(&Vacancy {
            park_id: "1".into(),
            vehicle_type: VehicleType::Coach,
            vacancy_type: None,
            vacancy: Some(0),
            last_update: None,
        });
    }

    #[test]
    fn space_columns_match_vehicle_space() {
        assert_eq!(&VehicleSpace::columns()[2..], &SpaceCount::COLUMNS);
    }
}
