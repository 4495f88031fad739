use crate::{
    error::GoesFetchError, poll::PollPolicy, product::Category, satellite::Satellite,
    sector::Sector, window::TimeWindow,
};
use chrono::naive::NaiveDateTime;

/// Output root used when none is given to [`crate::Archive::connect`] by the command line.
pub const DEFAULT_OUTROOT: &str = "../../../goes-data/";

/// Everything a run needs to know. Strings are validated by [`FetchConfig::validate`].
///
/// The output root is not part of the configuration; it belongs to the [`crate::Archive`].
#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub start: Option<String>,
    pub end: Option<String>,
    pub satellite: String,
    pub sector: String,
    pub no_ir: bool,
    pub no_vis: bool,
    pub no_irdiff: bool,
    pub no_glm: bool,
    pub mirror_bucket: Option<String>,
    /// Only copy into the mirror bucket, never save locally.
    pub skip_local: bool,
    pub poll: PollPolicy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            start: None,
            end: None,
            satellite: "goes-16".to_owned(),
            sector: "meso2".to_owned(),
            no_ir: false,
            no_vis: false,
            no_irdiff: true,
            no_glm: false,
            mirror_bucket: None,
            skip_local: false,
            poll: PollPolicy::default(),
        }
    }
}

/// A [`FetchConfig`] with its strings parsed.
#[derive(Clone, Debug)]
pub struct ValidConfig {
    pub satellite: Satellite,
    pub sector: Sector,
    pub categories: Vec<Category>,
    pub mirror_bucket: Option<String>,
    pub keep_local: bool,
    pub poll: PollPolicy,
}

impl FetchConfig {
    pub fn dates<S: Into<String>>(mut self, start: S, end: Option<S>) -> Self {
        self.start = Some(start.into());
        self.end = end.map(Into::into);
        self
    }

    pub fn satellite(mut self, satellite: &str) -> Self {
        self.satellite = satellite.to_owned();
        self
    }

    pub fn sector(mut self, sector: &str) -> Self {
        self.sector = sector.to_owned();
        self
    }

    /// Set which categories are fetched; anything not listed is excluded.
    pub fn only(mut self, categories: &[Category]) -> Self {
        self.no_ir = !categories.contains(&Category::Ir);
        self.no_vis = !categories.contains(&Category::Vis);
        self.no_irdiff = !categories.contains(&Category::IrDiff);
        self.no_glm = !categories.contains(&Category::Glm);
        self
    }

    pub fn mirror_bucket(mut self, bucket: &str, skip_local: bool) -> Self {
        self.mirror_bucket = Some(bucket.to_owned());
        self.skip_local = skip_local;
        self
    }

    pub fn poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn validate(&self) -> Result<ValidConfig, GoesFetchError> {
        let satellite = Satellite::parse(&self.satellite)?;
        let sector = Sector::parse(&self.sector)?;

        if self.skip_local && self.mirror_bucket.is_none() {
            log::warn!("Local copies are skipped and no mirror bucket is set, nothing will be saved");
        }

        let categories = [
            (Category::Ir, self.no_ir),
            (Category::Vis, self.no_vis),
            (Category::IrDiff, self.no_irdiff),
            (Category::Glm, self.no_glm),
        ]
        .iter()
        .filter(|(_, excluded)| !*excluded)
        .map(|(cat, _)| *cat)
        .collect();

        Ok(ValidConfig {
            satellite,
            sector,
            categories,
            mirror_bucket: self.mirror_bucket.clone(),
            keep_local: !self.skip_local,
            poll: self.poll,
        })
    }

    pub fn time_window(&self, now: NaiveDateTime) -> Result<TimeWindow, GoesFetchError> {
        let valid = self.validate()?;
        TimeWindow::from_strings(
            valid.satellite,
            valid.sector,
            self.start.as_deref(),
            self.end.as_deref(),
            now,
        )
    }
}

impl ValidConfig {
    pub fn wants(&self, cat: Category) -> bool {
        self.categories.contains(&cat)
    }
}
