use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::{sync::LazyLock, time::Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    api::{Client, FetchError},
    shared::{Cell, Record},
};

static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("hardcoded selector"));
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("hardcoded selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("hardcoded selector"));

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("No table found in holiday page")]
    TableNotFound,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PublicHoliday {
    pub name: String,
    pub date: Option<NaiveDate>,
    /// Date cell as printed on the page.
    pub date_text: String,
    pub weekday: String,
}

impl Record for PublicHoliday {
    fn columns() -> &'static [&'static str] {
        &["name", "date", "date_text", "weekday"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.name.as_str().into(),
            self.date.map(|date| date.to_string()).into(),
            self.date_text.as_str().into(),
            self.weekday.as_str().into(),
        ]
    }
}

fn text(cell: ElementRef) -> String {
    cell.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a "day month" cell such as `1 January` against `year`.
pub fn parse_holiday_date(text: &str, year: i32) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(&format!("{text} {year}"), "%d %B %Y") {
        Ok(date) => Some(date),
        Err(err) => {
            warn!("Unparseable holiday date {text:?}: {err}");
            None
        }
    }
}

/// Reads the first table of the page. Only rows with exactly three `td`
/// cells (name, date, weekday) are holidays, header rows use `th` or span
/// the table and are skipped.
pub fn parse_public_holidays(html: &str, year: i32) -> Result<Vec<PublicHoliday>, Error> {
    let document = Html::parse_document(html);
    let table = document.select(&TABLE).next().ok_or(Error::TableNotFound)?;

    let holidays = table
        .select(&ROW)
        .filter_map(|row| {
            let cells = row.select(&CELL).map(text).collect::<Vec<_>>();
            let [name, date_text, weekday] = <[String; 3]>::try_from(cells).ok()?;
            Some(PublicHoliday {
                date: parse_holiday_date(&date_text, year),
                name,
                date_text,
                weekday,
            })
        })
        .collect();
    Ok(holidays)
}

pub fn fetch_public_holidays(
    client: &Client,
    url: &str,
    year: i32,
) -> Result<Vec<PublicHoliday>, Error> {
    let now = Instant::now();
    let html = client.get_text(url)?;
    let holidays = parse_public_holidays(&html, year)?;
    debug!(
        "Fetching {} public holidays took {:?}",
        holidays.len(),
        now.elapsed()
    );
    Ok(holidays)
}

#[test]
fn blank_date_is_kept_without_a_date() {
    assert_eq!(parse_holiday_date("", 2025), None);
    assert_eq!(
        parse_holiday_date("1 January", 2025),
        NaiveDate::from_ymd_opt(2025, 1, 1)
    );
    assert_eq!(parse_holiday_date("31 February", 2025), None);
}
