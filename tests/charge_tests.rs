use hk_carpark::{
    api::VehicleType,
    normalize::{
        ChargeBucket, ChargeKind, HourlyBuckets, HourlyCharge, SpaceCount, classify_weekdays,
    },
};

fn hourly(weekdays: &[&str], price: f64) -> HourlyCharge {
    HourlyCharge {
        park_id: "10".into(),
        vehicle_type: VehicleType::PrivateCar,
        charge_type: Some("hourly".into()),
        weekdays: weekdays.iter().map(|day| day.to_string()).collect(),
        exclude_public_holiday: None,
        period_start: None,
        period_end: None,
        price: Some(price),
        usage_thresholds: None,
        usage_minimum: None,
        covered: None,
        remark: None,
        space: SpaceCount::default(),
    }
}

#[test]
fn all_eight_tokens_is_all_time() {
    let days = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN", "PH"];
    assert_eq!(classify_weekdays(&days), Some(ChargeBucket::AllTime));
}

#[test]
fn all_time_ignores_case_and_order() {
    let days = ["ph", "Sun", "sat", "FRI", "thu", "Wed", "tue", "mon"];
    assert_eq!(classify_weekdays(&days), Some(ChargeBucket::AllTime));
}

#[test]
fn working_days_are_weekdays() {
    assert_eq!(
        classify_weekdays(&["Mon", "Wed", "Fri"]),
        Some(ChargeBucket::Weekdays)
    );
}

#[test]
fn rest_days_are_weekend() {
    assert_eq!(
        classify_weekdays(&["Sat", "Sun", "PH"]),
        Some(ChargeBucket::Weekend)
    );
    assert_eq!(classify_weekdays(&["ph"]), Some(ChargeBucket::Weekend));
}

#[test]
fn mixed_set_is_weekdays() {
    assert_eq!(
        classify_weekdays(&["Mon", "Sat"]),
        Some(ChargeBucket::Weekdays)
    );
    let seven = ["MON", "TUE", "WED", "THU", "FRI", "SAT", "SUN"];
    assert_eq!(classify_weekdays(&seven), Some(ChargeBucket::Weekdays));
}

#[test]
fn unknown_tokens_are_unclassified() {
    assert_eq!(classify_weekdays::<&str>(&[]), None);
    assert_eq!(classify_weekdays(&["holiday", "daily"]), None);
}

#[test]
fn last_charge_wins_per_bucket() {
    let buckets = HourlyBuckets::from_charges([
        hourly(&["MON"], 10.0),
        hourly(&["SAT"], 30.0),
        hourly(&["TUE", "WED"], 12.0),
        hourly(&["THU"], 14.0),
    ]);
    assert_eq!(buckets.get(ChargeBucket::Weekdays).unwrap().price, Some(14.0));
    assert_eq!(buckets.get(ChargeBucket::Weekend).unwrap().price, Some(30.0));
    assert!(buckets.get(ChargeBucket::AllTime).is_none());

    assert_eq!(buckets.displaced_in(ChargeBucket::Weekdays), 2);
    assert_eq!(buckets.displaced_in(ChargeBucket::Weekend), 0);
    let displaced = buckets
        .displaced
        .iter()
        .map(|(_, charge)| charge.price)
        .collect::<Vec<_>>();
    assert_eq!(displaced, vec![Some(10.0), Some(12.0)]);
}

#[test]
fn bucket_records_carry_name() {
    let buckets = HourlyBuckets::from_charges([hourly(&["SUN"], 8.0), hourly(&["FRI"], 9.0)]);
    let records = buckets.into_records("Kwai Fong Plaza Car Park");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].bucket, ChargeBucket::Weekdays);
    assert_eq!(records[1].bucket, ChargeBucket::Weekend);
    assert!(records.iter().all(|record| record.name == "Kwai Fong Plaza Car Park"));
}

#[test]
fn bucket_tables() {
    assert_eq!(ChargeBucket::Weekdays.table(), "charges_weekdays");
    assert_eq!(ChargeBucket::Weekend.table(), "charges_weekend");
    assert_eq!(ChargeBucket::AllTime.table(), "charges_all_time");
}

#[test]
fn invalid_charge_kind() {
    let err = "parkingFees".parse::<ChargeKind>().unwrap_err();
    assert_eq!(err.got, "parkingFees");
    assert_eq!(err.expected, ChargeKind::NAMES);
    assert_eq!("dayNightParks".parse::<ChargeKind>(), Ok(ChargeKind::DayNight));
}
