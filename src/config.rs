use std::{path::PathBuf, time::Duration};

use crate::{
    api::{Lang, VehicleType},
    output::OutputFormat,
};

pub const DEFAULT_BASE_URL: &str = "https://api.data.gov.hk/v1/carpark-info-vacancy";
pub const DEFAULT_HOLIDAY_URL: &str = "https://www.gov.hk/en/about/abouthk/holiday";

/// Settings for one run. Built once up front and only read afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    /// Holiday page directory, the year page (`<year>.htm`) is appended.
    pub holiday_base_url: String,
    pub holiday_year: i32,
    pub lang: Lang,
    pub vehicle_types: Vec<VehicleType>,
    pub carpark_ids: Vec<String>,
    pub extent: Option<String>,
    pub output_dir: PathBuf,
    pub formats: Vec<OutputFormat>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            holiday_base_url: DEFAULT_HOLIDAY_URL.into(),
            holiday_year: 2025,
            lang: Lang::ZhTw,
            vehicle_types: vec![VehicleType::PrivateCar],
            carpark_ids: Vec::new(),
            extent: None,
            output_dir: PathBuf::from("./data"),
            formats: vec![OutputFormat::Csv],
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    pub fn holiday_url(&self) -> String {
        format!(
            "{}/{}.htm",
            self.holiday_base_url.trim_end_matches('/'),
            self.holiday_year
        )
    }

    /// Directory a vehicle type writes into. A single vehicle type writes
    /// straight into `output_dir`, several get one sub directory each.
    pub fn output_dir_for(&self, vehicle_type: VehicleType) -> PathBuf {
        if self.vehicle_types.len() > 1 {
            self.output_dir.join(vehicle_type.as_str())
        } else {
            self.output_dir.clone()
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Backoff before retry number `attempt` (1 based), doubling each time.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[test]
fn backoff_doubles_until_cap() {
    let policy = RetryPolicy {
        max_retries: 5,
        initial_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_millis(500),
    };
    assert_eq!(policy.backoff(1), Duration::from_millis(100));
    assert_eq!(policy.backoff(2), Duration::from_millis(200));
    assert_eq!(policy.backoff(3), Duration::from_millis(400));
    assert_eq!(policy.backoff(4), Duration::from_millis(500));
}

#[test]
fn holiday_url_for_year() {
    let config = Config {
        holiday_year: 2026,
        ..Default::default()
    };
    assert_eq!(
        config.holiday_url(),
        "https://www.gov.hk/en/about/abouthk/holiday/2026.htm"
    );
}
