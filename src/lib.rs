pub mod api;
pub mod config;
pub mod holiday;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod shared;

use thiserror::Error;

pub use config::Config;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] api::Error),
    #[error(transparent)]
    Normalize(#[from] normalize::Error),
    #[error(transparent)]
    Output(#[from] output::Error),
    #[error(transparent)]
    Holiday(#[from] holiday::Error),
}

pub mod prelude {
    pub use crate::{
        Config, Error,
        api::{Client, Dataset, Lang, Query, VehicleType},
        holiday::PublicHoliday,
        normalize::{
            Carpark, Charge, ChargeBucket, ChargeKind, Normalizer, Tables, classify_weekdays,
            normalize_feed,
        },
        output::{OutputFormat, Writer},
        shared::{Cell, Record},
    };
}
