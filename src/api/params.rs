use serde::Serialize;
use std::{fmt, str::FromStr};

use crate::shared::InvalidArgument;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Info,
    Vacancy,
}

impl Dataset {
    pub const NAMES: &'static [&'static str] = &["info", "vacancy"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Dataset::Info => "info",
            Dataset::Vacancy => "vacancy",
        }
    }
}

impl FromStr for Dataset {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Dataset::Info),
            "vacancy" => Ok(Dataset::Vacancy),
            _ => Err(InvalidArgument::new("data", s, Self::NAMES)),
        }
    }
}

/// Vehicle classes the API reports. The string form doubles as the JSON key
/// of the per vehicle sub-object in info and vacancy records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VehicleType {
    #[serde(rename = "privateCar")]
    PrivateCar,
    #[serde(rename = "LGV")]
    Lgv,
    #[serde(rename = "HGV")]
    Hgv,
    #[serde(rename = "CV")]
    Cv,
    #[serde(rename = "coach")]
    Coach,
    #[serde(rename = "motorCycle")]
    MotorCycle,
}

impl VehicleType {
    pub const ALL: [VehicleType; 6] = [
        VehicleType::PrivateCar,
        VehicleType::Lgv,
        VehicleType::Hgv,
        VehicleType::Cv,
        VehicleType::Coach,
        VehicleType::MotorCycle,
    ];

    pub const NAMES: &'static [&'static str] =
        &["privateCar", "LGV", "HGV", "CV", "coach", "motorCycle"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            VehicleType::PrivateCar => "privateCar",
            VehicleType::Lgv => "LGV",
            VehicleType::Hgv => "HGV",
            VehicleType::Cv => "CV",
            VehicleType::Coach => "coach",
            VehicleType::MotorCycle => "motorCycle",
        }
    }
}

impl FromStr for VehicleType {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleType::ALL
            .into_iter()
            .find(|vehicle_type| vehicle_type.as_str() == s)
            .ok_or_else(|| InvalidArgument::new("vehicleTypes", s, Self::NAMES))
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lang {
    EnUs,
    #[default]
    ZhTw,
    ZhCn,
}

impl Lang {
    pub const NAMES: &'static [&'static str] = &["en_US", "zh_TW", "zh_CN"];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Lang::EnUs => "en_US",
            Lang::ZhTw => "zh_TW",
            Lang::ZhCn => "zh_CN",
        }
    }
}

impl FromStr for Lang {
    type Err = InvalidArgument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en_US" => Ok(Lang::EnUs),
            "zh_TW" => Ok(Lang::ZhTw),
            "zh_CN" => Ok(Lang::ZhCn),
            _ => Err(InvalidArgument::new("lang", s, Self::NAMES)),
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query parameters of one API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub dataset: Dataset,
    pub vehicle_type: VehicleType,
    pub lang: Lang,
    pub carpark_ids: Vec<String>,
    pub extent: Option<String>,
}

impl Query {
    pub fn new(dataset: Dataset, vehicle_type: VehicleType, lang: Lang) -> Self {
        Self {
            dataset,
            vehicle_type,
            lang,
            carpark_ids: Vec::new(),
            extent: None,
        }
    }

    pub fn dataset(mut self, dataset: Dataset) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn carpark_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.carpark_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn extent(mut self, extent: Option<String>) -> Self {
        self.extent = extent.filter(|extent| !extent.is_empty());
        self
    }

    /// Key value pairs in request order. Optional parameters only show up
    /// when they were given.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("data", self.dataset.as_str().to_string()),
            ("vehicleTypes", self.vehicle_type.as_str().to_string()),
            ("lang", self.lang.as_str().to_string()),
        ];
        if !self.carpark_ids.is_empty() {
            pairs.push(("carparkIds", self.carpark_ids.join(",")));
        }
        if let Some(extent) = &self.extent {
            pairs.push(("extent", extent.clone()));
        }
        pairs
    }

    pub fn to_url(&self, base_url: &str) -> Result<url::Url, url::ParseError> {
        url::Url::parse_with_params(base_url, self.pairs())
    }
}

#[test]
fn parse_known_values() {
    assert_eq!("vacancy".parse::<Dataset>(), Ok(Dataset::Vacancy));
    assert_eq!("motorCycle".parse::<VehicleType>(), Ok(VehicleType::MotorCycle));
    assert_eq!("CV".parse::<VehicleType>(), Ok(VehicleType::Cv));
    assert_eq!("en_US".parse::<Lang>(), Ok(Lang::EnUs));
}

#[test]
fn parse_is_case_sensitive() {
    let err = "privatecar".parse::<VehicleType>().unwrap_err();
    assert_eq!(err.name, "vehicleTypes");
    assert_eq!(err.got, "privatecar");
    assert!("EN_us".parse::<Lang>().is_err());
    assert!("all".parse::<Dataset>().is_err());
}

#[test]
fn query_without_optionals() {
    let query = Query::new(Dataset::Info, VehicleType::PrivateCar, Lang::ZhTw);
    let url = query
        .to_url("https://api.data.gov.hk/v1/carpark-info-vacancy")
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://api.data.gov.hk/v1/carpark-info-vacancy?data=info&vehicleTypes=privateCar&lang=zh_TW"
    );
}

#[test]
fn query_with_optionals() {
    let query = Query::new(Dataset::Vacancy, VehicleType::Lgv, Lang::EnUs)
        .carpark_ids(["10", "11"])
        .extent(Some("114.1,22.2,114.3,22.4".into()));
    let pairs = query.pairs();
    assert_eq!(pairs[3], ("carparkIds", "10,11".to_string()));
    assert_eq!(pairs[4], ("extent", "114.1,22.2,114.3,22.4".to_string()));
}
