use hk_carpark::{
    api::VehicleType,
    normalize::{BasicInfo, Vacancy, normalize_feed},
    output::{OutputFormat, Writer, read_csv_park_ids, write_csv, write_json, write_sqlite},
    pipeline::write_tables,
    shared::Record,
};
use rusqlite::Connection;
use serde_json::Value;
use std::{collections::HashSet, fs};

fn basic_info(park_id: &str, name: &str) -> BasicInfo {
    BasicInfo {
        park_id: park_id.into(),
        name: name.into(),
        district: Some("Wan Chai District".into()),
        latitude: Some(22.28),
        ..Default::default()
    }
}

fn vacancy(park_id: &str, count: Option<i64>) -> Vacancy {
    Vacancy {
        park_id: park_id.into(),
        vehicle_type: VehicleType::PrivateCar,
        vacancy_type: Some("A".into()),
        vacancy: count,
        last_update: None,
    }
}

#[test]
fn csv_round_trip_keeps_park_ids() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![
        basic_info("10", "Kwai Fong Plaza"),
        basic_info("H1", "Harbour Road, \"Wan Chai\""),
        basic_info("20", "中環停車場"),
    ];
    let path = write_csv(dir.path(), "basic_info", &records).unwrap();
    assert_eq!(path, dir.path().join("basic_info.csv"));

    let ids = read_csv_park_ids(&path).unwrap();
    assert_eq!(ids.len(), records.len());
    let ids = ids.into_iter().collect::<HashSet<_>>();
    let expected = records
        .iter()
        .map(|record| record.park_id.clone())
        .collect::<HashSet<_>>();
    assert_eq!(ids, expected);
}

#[test]
fn csv_starts_with_bom_and_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(dir.path(), "vacancy", &[vacancy("10", Some(0))]).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));

    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("park_id,vehicle_type,vacancy_type,vacancy,last_update")
    );
    assert_eq!(lines.next(), Some("10,privateCar,A,0,"));
    assert_eq!(lines.next(), None);
}

#[test]
fn empty_list_writes_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv::<BasicInfo>(dir.path(), "basic_info", &[]).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let text = text.trim_start_matches('\u{feff}');
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with("park_id,name,"));
    assert!(read_csv_park_ids(&path).unwrap().is_empty());
}

#[test]
fn csv_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    write_csv(dir.path(), "basic_info", &[basic_info("1", "A"), basic_info("2", "B")]).unwrap();
    let path = write_csv(dir.path(), "basic_info", &[basic_info("3", "C")]).unwrap();
    assert_eq!(read_csv_park_ids(&path).unwrap(), vec!["3"]);
}

#[test]
fn sqlite_table_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("privateCar.db");
    write_sqlite(&path, "vacancy", &[vacancy("1", Some(3)), vacancy("2", None)]).unwrap();
    write_sqlite(&path, "vacancy", &[vacancy("3", Some(0))]).unwrap();

    let conn = Connection::open(&path).unwrap();
    let rows = conn
        .prepare("SELECT park_id, vacancy FROM vacancy")
        .unwrap()
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<i64>>(1)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(rows, vec![("3".to_string(), Some(0))]);
}

#[test]
fn sqlite_keeps_nulls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("privateCar.db");
    write_sqlite(&path, "vacancy", &[vacancy("1", None)]).unwrap();

    let conn = Connection::open(&path).unwrap();
    let count: Option<i64> = conn
        .query_row("SELECT vacancy FROM vacancy", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, None);
}

#[test]
fn json_is_pretty_printed() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_json(dir.path(), "vacancy", &[vacancy("10", Some(5))]).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains('\n'));

    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value[0]["park_id"], "10");
    assert_eq!(value[0]["vehicle_type"], "privateCar");
    assert_eq!(value[0]["vacancy"], 5);
    assert!(value[0]["last_update"].is_null());
}

#[test]
fn writer_writes_every_format() {
    let dir = tempfile::tempdir().unwrap();
    let formats = [OutputFormat::Csv, OutputFormat::Sqlite, OutputFormat::Json];
    let out = dir.path().join("nested/privateCar");
    let mut writer = Writer::new(&out, &formats, "privateCar").unwrap();
    writer.write("basic_info", &[basic_info("10", "A")]).unwrap();

    assert!(out.join("basic_info.csv").exists());
    assert!(out.join("basic_info.json").exists());
    assert_eq!(writer.database_path(), out.join("privateCar.db"));

    let conn = Connection::open(writer.database_path()).unwrap();
    let name: String = conn
        .query_row("SELECT name FROM basic_info WHERE park_id = '10'", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(name, "A");
}

#[test]
fn all_tables_written_for_empty_feed() {
    let dir = tempfile::tempdir().unwrap();
    let tables = normalize_feed(&[], &[], VehicleType::PrivateCar);
    let mut writer = Writer::new(dir.path(), &[OutputFormat::Csv], "privateCar").unwrap();
    write_tables(&mut writer, &tables).unwrap();

    for category in [
        "basic_info",
        "address",
        "grace_periods",
        "height_limits",
        "opening_hours",
        "vehicle_space",
        "vacancy",
        "hourly_charges",
        "monthly_charges",
        "day_night_parks",
        "privileges",
        "unloadings",
        "charges_weekdays",
        "charges_weekend",
        "charges_all_time",
    ] {
        let path = dir.path().join(format!("{category}.csv"));
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1, "{category}");
    }
    assert!(!dir.path().join("privateCar.db").exists());
}

#[test]
fn columns_start_with_park_id() {
    assert_eq!(BasicInfo::columns()[0], "park_id");
    assert_eq!(Vacancy::columns()[0], "park_id");
}
