use crate::error::GoesFetchError;
use chrono::{naive::NaiveDateTime, Duration, Timelike};
use std::str::FromStr;
use strum::{EnumString, IntoStaticStr};

/// Spatial coverage mode of the ABI scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, IntoStaticStr)]
pub enum Sector {
    #[strum(serialize = "meso1")]
    Meso1,
    #[strum(serialize = "meso2")]
    Meso2,
    #[strum(serialize = "conus")]
    Conus,
    #[strum(serialize = "full")]
    FullDisk,
}

impl Sector {
    pub fn parse(name: &str) -> Result<Self, GoesFetchError> {
        Sector::from_str(name).map_err(|_| {
            log::error!("Not yet set up to do specified sector: {}", name);
            GoesFetchError::config(&format!("Unsupported scan sector: {}", name))
        })
    }

    /// Scan-sector code as it appears in ABI file names, e.g. `RadM1`.
    pub fn code(&self) -> &'static str {
        match *self {
            Sector::Meso1 => "M1",
            Sector::Meso2 => "M2",
            Sector::Conus => "C",
            Sector::FullDisk => "F",
        }
    }

    /// Suffix of the ABI L1b product directory, e.g. `ABI-L1b-RadM`.
    pub fn product_letter(&self) -> char {
        match *self {
            Sector::Meso1 | Sector::Meso2 => 'M',
            Sector::Conus => 'C',
            Sector::FullDisk => 'F',
        }
    }

    /// Substring that pins a key to this sector's radiance product.
    pub fn filter(&self) -> String {
        format!("Rad{}-", self.code())
    }

    /// Number of trailing GLM files kept per hour in real-time mode.
    pub fn glm_keep_count(&self) -> usize {
        match *self {
            Sector::Meso1 | Sector::Meso2 => 10,
            Sector::Conus => 15,
            Sector::FullDisk => 30,
        }
    }

    /// Moves `now` back far enough that the latest scan for this sector has been published.
    pub fn publication_lag(&self, now: NaiveDateTime) -> NaiveDateTime {
        match *self {
            Sector::FullDisk if now.minute() < 10 => now - Duration::minutes(10),
            Sector::Conus if now.minute() < 4 => now - Duration::minutes(5),
            _ => now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2021, 4, 14)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_sector_codes_are_table_lookups() {
        for (name, code, letter) in [
            ("meso1", "M1", 'M'),
            ("meso2", "M2", 'M'),
            ("conus", "C", 'C'),
            ("full", "F", 'F'),
        ]
        .iter()
        {
            let sector = Sector::parse(name).unwrap();
            assert_eq!(sector.code(), *code);
            assert_eq!(sector.product_letter(), *letter);
            assert_eq!(Sector::parse(name).unwrap(), sector);
        }
    }

    #[test]
    fn test_unknown_sector_is_config_error() {
        for bad in ["meso", "meso3", "CONUS", "", "fulldisk"].iter() {
            let err = Sector::parse(bad).unwrap_err();
            assert!(err.is_config(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_glm_keep_counts() {
        assert_eq!(Sector::Meso1.glm_keep_count(), 10);
        assert_eq!(Sector::Meso2.glm_keep_count(), 10);
        assert_eq!(Sector::Conus.glm_keep_count(), 15);
        assert_eq!(Sector::FullDisk.glm_keep_count(), 30);
    }

    #[test]
    fn test_publication_lag() {
        assert_eq!(Sector::FullDisk.publication_lag(at(12, 5)), at(11, 55));
        assert_eq!(Sector::FullDisk.publication_lag(at(12, 15)), at(12, 15));
        assert_eq!(Sector::Conus.publication_lag(at(12, 3)), at(11, 58));
        assert_eq!(Sector::Conus.publication_lag(at(12, 4)), at(12, 4));
        assert_eq!(Sector::Meso2.publication_lag(at(12, 0)), at(12, 0));
    }
}
