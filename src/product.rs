use crate::{remote::RemoteArchive, sector::Sector};
use chrono::{naive::NaiveDateTime, Datelike, Timelike};
use std::error::Error;
use strum::IntoStaticStr;

const GLM_PRODUCT: &str = "GLM-L2-LCFA";

/// Output category, also the name of the local sub-directory it is saved in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoStaticStr)]
pub enum Category {
    #[strum(serialize = "ir")]
    Ir,
    #[strum(serialize = "vis")]
    Vis,
    #[strum(serialize = "ir_diff")]
    IrDiff,
    #[strum(serialize = "glm")]
    Glm,
}

impl Category {
    /// ABI channel code, `None` for lightning data.
    pub fn channel(&self) -> Option<&'static str> {
        match *self {
            Category::Ir => Some("C13"),
            Category::Vis => Some("C02"),
            Category::IrDiff => Some("C08"),
            Category::Glm => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match *self {
            Category::Ir => "IR C13",
            Category::Vis => "VIS C02",
            Category::IrDiff => "6.2 micron IR C08",
            Category::Glm => "GLM",
        }
    }
}

/// A listing filter: keys under `prefix` that contain every one of `required`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductQuery {
    pub bucket: String,
    pub prefix: String,
    pub required: Vec<String>,
}

impl ProductQuery {
    pub fn image(bucket: &str, cat: Category, sector: Sector, valid_hour: NaiveDateTime) -> Self {
        let prod = format!("ABI-L1b-Rad{}", sector.product_letter());

        let mut required = vec![];
        if let Some(channel) = cat.channel() {
            required.push(channel.to_owned());
        }
        required.push(scan_start_hour(valid_hour));
        required.push(sector.filter());

        ProductQuery {
            bucket: bucket.to_owned(),
            prefix: hour_prefix(&prod, valid_hour),
            required,
        }
    }

    pub fn glm(bucket: &str, valid_hour: NaiveDateTime) -> Self {
        ProductQuery {
            bucket: bucket.to_owned(),
            prefix: hour_prefix(GLM_PRODUCT, valid_hour),
            required: vec!["GLM".to_owned(), scan_start_hour(valid_hour)],
        }
    }

    /// Narrow the query to a single scan.
    pub fn with_batch_id(mut self, batch_id: &str) -> Self {
        self.required.push(batch_id.to_owned());
        self
    }

    pub fn matches(&self, key: &str) -> bool {
        key.starts_with(&self.prefix) && self.required.iter().all(|s| key.contains(s.as_str()))
    }

    /// List matching keys in ascending scan-start order.
    pub fn list<RA: RemoteArchive>(&self, remote: &RA) -> Result<Vec<String>, Box<dyn Error>> {
        let mut keys: Vec<String> = remote
            .list_blobs(&self.bucket, &self.prefix)?
            .into_iter()
            .filter(|key| self.matches(key))
            .collect();

        // Stable; keys without a parsable scan start sort first, in listing order.
        keys.sort_by(|a, b| batch_id(a).cmp(&batch_id(b)));

        log::debug!(
            "{} keys match {:?} under {}/{}",
            keys.len(),
            self.required,
            self.bucket,
            self.prefix
        );

        Ok(keys)
    }
}

/// Remote directory for one hour of a product, e.g. `GLM-L2-LCFA/2020/153/00/`.
pub fn hour_prefix(prod: &str, valid_hour: NaiveDateTime) -> String {
    format!(
        "{}/{}/{:03}/{:02}/",
        prod,
        valid_hour.year(),
        valid_hour.ordinal(),
        valid_hour.hour()
    )
}

fn scan_start_hour(valid_hour: NaiveDateTime) -> String {
    format!(
        "s{}{:03}{:02}",
        valid_hour.year(),
        valid_hour.ordinal(),
        valid_hour.hour()
    )
}

pub fn basename(key: &str) -> &str {
    match key.rfind('/') {
        Some(i) => &key[(i + 1)..],
        None => key,
    }
}

/// Scan-start token of a GOES file name, the fourth field when split on `_s` and `_`.
///
/// `OR_ABI-L1b-RadM1-M6C13_G16_s20201530000270_e20201530000327_c20201530000375.nc` yields
/// `20201530000270`.
pub fn batch_id(key: &str) -> Option<&str> {
    let fname = basename(key);

    fname
        .split('_')
        .enumerate()
        .map(|(i, field)| match i {
            0 => field,
            _ => field.strip_prefix('s').unwrap_or(field),
        })
        .nth(3)
        .filter(|field| !field.is_empty())
}
