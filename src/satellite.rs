use crate::error::GoesFetchError;
use chrono::{naive::NaiveDateTime, NaiveDate};
use std::str::FromStr;
use strum::{EnumString, IntoStaticStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum Satellite {
    #[strum(serialize = "goes-16", serialize = "goes16", serialize = "G16")]
    GOES16,
    #[strum(serialize = "goes-17", serialize = "goes17", serialize = "G17")]
    GOES17,
    #[strum(serialize = "goes-18", serialize = "goes18", serialize = "G18")]
    GOES18,
}

impl Satellite {
    /// Name of the public NOAA bucket this satellite publishes to.
    pub fn bucket_name(&self) -> &'static str {
        match *self {
            Satellite::GOES16 => "noaa-goes16",
            Satellite::GOES17 => "noaa-goes17",
            Satellite::GOES18 => "noaa-goes18",
        }
    }

    pub fn earliest_operational_date(&self) -> NaiveDateTime {
        let (y, m, d) = match *self {
            Satellite::GOES16 => (2017, 2, 28),
            Satellite::GOES17 => (2018, 8, 28),
            Satellite::GOES18 => (2022, 7, 28),
        };

        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or(NaiveDateTime::MIN)
    }

    pub fn parse(name: &str) -> Result<Self, GoesFetchError> {
        Satellite::from_str(&name.to_lowercase()).or_else(|_| {
            Satellite::from_str(name).map_err(|_| {
                log::error!("Unknown satellite: {}", name);
                GoesFetchError::config(&format!("Unknown satellite: {}", name))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_satellite_names() {
        assert_eq!(Satellite::parse("goes-16").unwrap(), Satellite::GOES16);
        assert_eq!(Satellite::parse("GOES-17").unwrap(), Satellite::GOES17);
        assert_eq!(Satellite::parse("G18").unwrap(), Satellite::GOES18);
    }

    #[test]
    fn test_parse_unknown_satellite() {
        let err = Satellite::parse("himawari-8").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_bucket_names() {
        assert_eq!(Satellite::GOES16.bucket_name(), "noaa-goes16");
        assert_eq!(Satellite::GOES18.bucket_name(), "noaa-goes18");
    }
}
