use crate::{error::GoesFetchError, satellite::Satellite, sector::Sector};
use chrono::{naive::NaiveDateTime, Duration};

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Span of hours to fetch. Real-time windows start and end at the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
    real_time: bool,
}

impl TimeWindow {
    pub fn historical(
        sat: Satellite,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Self, GoesFetchError> {
        let (start, end) = validate_dates(sat, start, end)?;

        Ok(TimeWindow {
            start,
            end,
            real_time: false,
        })
    }

    pub fn real_time(sector: Sector, now: NaiveDateTime) -> Self {
        let now = sector.publication_lag(now);
        log::info!("Downloading in real-time: {}", now);

        TimeWindow {
            start: now,
            end: now,
            real_time: true,
        }
    }

    /// Build a window from `"%Y-%m-%d %H:%M:%S"` strings. `None` for the start selects
    /// real-time mode anchored at `now`; `None` for the end means a single hour.
    pub fn from_strings(
        sat: Satellite,
        sector: Sector,
        start: Option<&str>,
        end: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<Self, GoesFetchError> {
        let start = match start {
            Some(start) => parse_date(start)?,
            None => return Ok(Self::real_time(sector, now)),
        };

        let end = match end {
            Some(end) => parse_date(end)?,
            None => start,
        };

        Self::historical(sat, start, end)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn is_real_time(&self) -> bool {
        self.real_time
    }

    /// Every cursor position from `start` to `end` inclusive, one hour apart.
    pub fn hours(&self) -> impl Iterator<Item = NaiveDateTime> {
        let start = self.start;
        let end = self.end;

        (0..)
            .map(move |i| start + Duration::hours(i))
            .take_while(move |time| *time <= end)
    }
}

pub fn parse_date(text: &str) -> Result<NaiveDateTime, GoesFetchError> {
    NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT).map_err(|err| {
        log::error!("Unable to parse date {:?}: {}", text, err);
        GoesFetchError::config(&format!(
            "Invalid date '{}', expected YYYY-MM-DD HH:MM:SS",
            text
        ))
    })
}

fn validate_dates(
    sat: Satellite,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<(NaiveDateTime, NaiveDateTime), GoesFetchError> {
    log::info!("Downloading dates: {} - {}", start, end);

    if end < start {
        log::error!("End before start: start - {} end - {}", start, end);
        return Err(GoesFetchError::config("Invalid dates: end before start."));
    }

    let earliest = sat.earliest_operational_date();
    let valid_start = if start < earliest { earliest } else { start };

    if valid_start != start {
        log::warn!("valid start time was adjusted to start - {}", valid_start);
    }

    if end < valid_start {
        log::error!("End before start: start - {} end - {}", valid_start, end);
        Err(GoesFetchError::config(
            "Invalid dates: end before satellite was operational.",
        ))
    } else {
        Ok((valid_start, end))
    }
}
